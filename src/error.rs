use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote API answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("No data available to export.")]
    EmptyInput,

    #[error("Failed to export Excel: {0}")]
    Serialization(String),

    #[error("Failed to process exported data: {0}")]
    BufferFormat(String),

    #[error("Invalid ticket identifier. Cannot save.")]
    InvalidTicketId,

    #[error("{0}")]
    Validation(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    Custom(String),
}

impl AppError {
    /// Builds an `Api` error from a backend error body. A `message` array is
    /// joined with ", "; a missing message falls back to `fallback`.
    pub fn from_api_body(status: u16, body: &serde_json::Value, fallback: &str) -> Self {
        let message = match body.get("message") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            _ => fallback.to_string(),
        };
        AppError::Api { status, message }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
