use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

use super::user_error;
use crate::analyzer::ListFilters;
use crate::export::{
    export_rows, normalize_buffer, DirectorySaveTarget, ExportFile, ExportRow, SaveTarget,
    SavedFile, WriterOutput, XlsxSheetWriter, EXPORT_FILENAME, XLSX_MIME_TYPE,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub path: String,
    pub size_bytes: u64,
    pub duration_ms: u64,
}

impl ExportResult {
    fn from_saved(saved: SavedFile, start: Instant) -> Self {
        ExportResult {
            path: saved.path,
            size_bytes: saved.size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Rows of the export table for the current filters.
pub async fn fetch_export_rows(
    state: &AppState,
    filters: ListFilters,
) -> Result<Vec<ExportRow>, String> {
    let rows = state
        .client()?
        .fetch_upload_data(&filters.to_export_filters())
        .await
        .map_err(|e| {
            log::error!("fetch_export_rows: {}", e);
            "Error fetching data!".to_string()
        })?;

    if rows.is_empty() {
        log::info!("no upload rows match the export filters");
    }
    Ok(rows)
}

/// Build `UploadedData.xlsx` from the rows on screen and save it under `dir`.
pub async fn export_excel(
    state: &AppState,
    rows: Vec<ExportRow>,
    dir: PathBuf,
) -> Result<ExportResult, String> {
    let start = Instant::now();
    let options = state.config()?.encode_options();
    let target = DirectorySaveTarget::new(dir);

    let saved = export_rows(
        &rows,
        &XlsxSheetWriter,
        &options,
        &target,
        &state.export_progress,
    )
    .map_err(user_error("export_excel"))?;

    log::info!("exported {} rows to {}", rows.len(), saved.path);
    Ok(ExportResult::from_saved(saved, start))
}

/// Let the backend build the workbook for `filters` and save it under `dir`.
pub async fn export_excel_server(
    state: &AppState,
    filters: ListFilters,
    dir: PathBuf,
) -> Result<ExportResult, String> {
    let start = Instant::now();
    let client = state.client()?;
    let _guard = state.export_progress.begin();

    let bytes = client
        .export_server_side(&filters.to_export_filters())
        .await
        .map_err(user_error("export_excel_server"))?;
    let contents =
        normalize_buffer(&WriterOutput::RawBuffer(bytes)).map_err(user_error("export_excel_server"))?;

    let saved = DirectorySaveTarget::new(dir)
        .save(ExportFile {
            filename: EXPORT_FILENAME,
            mime_type: XLSX_MIME_TYPE,
            contents,
        })
        .map_err(user_error("export_excel_server"))?;

    Ok(ExportResult::from_saved(saved, start))
}

pub fn is_exporting(state: &AppState) -> bool {
    state.export_progress.is_exporting()
}
