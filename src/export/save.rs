use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;
use crate::export::buffer::EncodedWorkbook;

/// A finished document ready to hand to the host's save facility.
#[derive(Debug)]
pub struct ExportFile {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub contents: EncodedWorkbook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFile {
    pub path: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Where exported documents end up (download folder, dialog-chosen directory).
pub trait SaveTarget {
    fn save(&self, file: ExportFile) -> Result<SavedFile, AppError>;
}

/// Saves documents under a fixed directory, replacing any previous file.
#[derive(Debug, Clone)]
pub struct DirectorySaveTarget {
    dir: PathBuf,
}

impl DirectorySaveTarget {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        DirectorySaveTarget {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl SaveTarget for DirectorySaveTarget {
    fn save(&self, file: ExportFile) -> Result<SavedFile, AppError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file.filename);
        let size_bytes = file.contents.len() as u64;
        std::fs::write(&path, file.contents.into_bytes())?;

        Ok(SavedFile {
            path: path.to_string_lossy().into_owned(),
            filename: file.filename.to_string(),
            mime_type: file.mime_type.to_string(),
            size_bytes,
        })
    }
}
