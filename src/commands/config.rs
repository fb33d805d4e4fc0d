use crate::config::AppConfig;
use crate::state::{AppState, DbAccess};

pub async fn get_config(state: &AppState) -> Result<AppConfig, String> {
    state.db(|conn| crate::config::get_config_from_db(conn))
}

pub async fn update_config(state: &AppState, config: AppConfig) -> Result<(), String> {
    state.db(|conn| crate::config::update_config_in_db(conn, &config))?;
    log::info!("configuration updated (api: {})", config.api_base_url);
    Ok(())
}
