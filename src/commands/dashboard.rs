use super::user_error;
use crate::analyzer::{HomeStats, StatusCard, StatusCounts};
use crate::api::models::ExportFilters;
use crate::state::AppState;

/// Status cards above the ticket list.
pub async fn get_status_counts(state: &AppState) -> Result<Vec<StatusCard>, String> {
    let body = state
        .client()?
        .ticket_counts()
        .await
        .map_err(user_error("get_status_counts"))?;
    Ok(StatusCounts::from_value(&body).cards())
}

/// Home charts over every uploaded row. An unreachable backend shows empty charts.
pub async fn get_home_stats(state: &AppState) -> Result<HomeStats, String> {
    let client = state.client()?;
    match client.fetch_upload_data(&ExportFilters::default()).await {
        Ok(rows) => Ok(HomeStats::from_rows(&rows)),
        Err(e) => {
            log::warn!("home statistics unavailable: {}", e);
            Ok(HomeStats::default())
        }
    }
}
