use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use super::user_error;
use crate::api::message_or;
use crate::api::models::FileRecord;
use crate::error::AppError;
use crate::export::XLSX_MIME_TYPE;
use crate::state::{lock, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub message: String,
    pub record: FileRecord,
}

/// Reload the upload history from the backend.
pub async fn fetch_upload_history(state: &AppState) -> Result<Vec<FileRecord>, String> {
    let files = state
        .client()?
        .fetch_files()
        .await
        .map_err(|e| {
            log::error!("fetch_upload_history: {}", e);
            "Failed to load upload history.".to_string()
        })?;

    *lock(&state.uploads) = files.clone();
    Ok(files)
}

/// History as currently shown, including local additions and removals.
pub fn upload_history(state: &AppState) -> Vec<FileRecord> {
    lock(&state.uploads).clone()
}

pub async fn upload_file(state: &AppState, path: Option<PathBuf>) -> Result<UploadResult, String> {
    let path = path.ok_or_else(|| {
        AppError::Validation("Please select a file to upload.".into()).to_string()
    })?;

    let contents = tokio::fs::read(&path)
        .await
        .map_err(|e| user_error("upload_file")(e.into()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let size = contents.len() as u64;
    let mimetype = guess_mime_type(&name);

    let response = state
        .client()?
        .upload_file(&name, contents, mimetype)
        .await
        .map_err(user_error("upload_file"))?;

    let record = FileRecord {
        id: response.file_id,
        name,
        size,
        mimetype: mimetype.map(String::from),
        uploaded_at: Some(Utc::now()),
    };
    lock(&state.uploads).insert(0, record.clone());
    log::info!("uploaded {} ({} bytes)", record.name, record.size);

    Ok(UploadResult {
        message: response
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "File uploaded!".into()),
        record,
    })
}

pub async fn delete_file(state: &AppState, id: String) -> Result<String, String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::Validation("File ID not found".into()).to_string());
    }

    let body = state
        .client()?
        .delete_file(id)
        .await
        .map_err(user_error("delete_file"))?;

    lock(&state.uploads).retain(|f| f.id != id);
    Ok(message_or(&body, "File deleted!"))
}

fn guess_mime_type(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some("text/csv"),
        "xlsx" => Some(XLSX_MIME_TYPE),
        "xls" => Some("application/vnd.ms-excel"),
        "json" => Some("application/json"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}
