use super::user_error;
use crate::analyzer::drawer::{save_ticket as run_save, SaveOutcome, TicketDetail, TicketForm};
use crate::analyzer::TicketQuery;
use crate::parser::{normalize_page, CanonicalTicket, TicketPage};
use crate::state::AppState;

const FETCH_FAILED: &str = "Something went wrong while fetching tickets!";

/// One page of the ticket list, newest first.
pub async fn list_tickets(state: &AppState, query: TicketQuery) -> Result<TicketPage, String> {
    let client = state.client()?;
    let body = client
        .list_tickets(&query.to_request())
        .await
        .map_err(|e| {
            log::error!("list_tickets: {}", e);
            FETCH_FAILED.to_string()
        })?;

    let page = normalize_page(body);
    if page.tickets.is_empty() {
        log::info!("no tickets for page {}", query.page);
    }
    Ok(page)
}

pub fn open_ticket(ticket: &CanonicalTicket) -> TicketDetail {
    TicketDetail::open(ticket)
}

/// Save the drawer form: status update, then the remark when one was typed.
pub async fn save_ticket(
    state: &AppState,
    detail: &TicketDetail,
    form: TicketForm,
) -> Result<SaveOutcome, String> {
    let plan = detail.save_plan(&form).map_err(user_error("save_ticket"))?;
    let client = state.client()?;
    run_save(&client, &plan).await.map_err(user_error("save_ticket"))
}
