pub mod dashboard;
pub mod drawer;
pub mod query;

pub use dashboard::{HomeStats, StatusCard, StatusCounts};
pub use drawer::{save_ticket, SaveOutcome, SavePlan, TicketDetail, TicketForm, TicketUpdates};
pub use query::{DateRange, FilterBy, ListFilters, TicketListRequest, TicketQuery};
