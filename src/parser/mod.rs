pub mod aliases;
pub mod deserializers;
pub mod pipeline;
pub mod status;
pub mod types;

pub use pipeline::{normalize, normalize_page, normalize_value};
pub use status::TicketStatus;
pub use types::{CanonicalTicket, RawTicket, TicketPage};
