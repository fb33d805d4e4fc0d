use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::export::{EncodeOptions, DEFAULT_COLUMN_WIDTH, DEFAULT_SHEET_NAME};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub api_base_url: String,
    pub ticket_path: String,
    pub auth_path: String,
    pub upload_path: String,
    pub page_size: u32,
    pub export_column_width: f64,
    pub export_sheet_name: String,
    pub request_timeout_secs: u64,
    pub logout_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: "http://localhost:3000".into(),
            ticket_path: "/api/ticket-master".into(),
            auth_path: "/auth".into(),
            upload_path: "/upload-data".into(),
            page_size: 10,
            export_column_width: DEFAULT_COLUMN_WIDTH,
            export_sheet_name: DEFAULT_SHEET_NAME.into(),
            request_timeout_secs: 60,
            logout_timeout_ms: 2000,
        }
    }
}

impl AppConfig {
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            sheet_name: self.export_sheet_name.clone(),
            column_width: self.export_column_width,
        }
    }
}

pub fn get_config_from_db(conn: &Connection) -> Result<AppConfig, rusqlite::Error> {
    let mut stmt = conn.prepare_cached("SELECT key, value FROM config")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let defaults = AppConfig::default();
    let mut config = defaults.clone();

    for row in rows {
        let (key, value) = row?;
        match key.as_str() {
            "api_base_url" => config.api_base_url = value,
            "ticket_path" => config.ticket_path = value,
            "auth_path" => config.auth_path = value,
            "upload_path" => config.upload_path = value,
            "page_size" => config.page_size = value.parse().unwrap_or(defaults.page_size),
            "export_column_width" => {
                config.export_column_width = value.parse().unwrap_or(defaults.export_column_width)
            }
            "export_sheet_name" => config.export_sheet_name = value,
            "request_timeout_secs" => {
                config.request_timeout_secs =
                    value.parse().unwrap_or(defaults.request_timeout_secs)
            }
            "logout_timeout_ms" => {
                config.logout_timeout_ms = value.parse().unwrap_or(defaults.logout_timeout_ms)
            }
            _ => {}
        }
    }

    Ok(config)
}

pub fn update_config_in_db(conn: &Connection, config: &AppConfig) -> Result<(), rusqlite::Error> {
    let pairs: Vec<(&str, String)> = vec![
        ("api_base_url", config.api_base_url.clone()),
        ("ticket_path", config.ticket_path.clone()),
        ("auth_path", config.auth_path.clone()),
        ("upload_path", config.upload_path.clone()),
        ("page_size", config.page_size.to_string()),
        ("export_column_width", config.export_column_width.to_string()),
        ("export_sheet_name", config.export_sheet_name.clone()),
        ("request_timeout_secs", config.request_timeout_secs.to_string()),
        ("logout_timeout_ms", config.logout_timeout_ms.to_string()),
    ];

    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO config (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
    )?;

    for (key, value) in pairs {
        stmt.execute(rusqlite::params![key, value])?;
    }

    Ok(())
}
