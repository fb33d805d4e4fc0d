use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::api::models::FileRecord;
use crate::api::ConsoleClient;
use crate::auth::{PasswordResetWizard, SessionStore};
use crate::config::{get_config_from_db, AppConfig};
use crate::db::setup::init_db;
use crate::error::AppError;
use crate::export::ExportProgress;

/// Everything the console's commands share for the lifetime of the process.
pub struct AppState {
    pub db: Mutex<Option<Connection>>,
    pub session: Arc<SessionStore>,
    pub export_progress: ExportProgress,
    pub reset_wizard: Mutex<PasswordResetWizard>,
    /// Upload history as last shown in the upload panel.
    pub uploads: Mutex<Vec<FileRecord>>,
}

impl AppState {
    /// Open the local store at `path` and restore the saved session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = init_db(path)?;
        Self::with_connection(conn)
    }

    pub fn with_connection(conn: Connection) -> Result<Self, AppError> {
        let session = SessionStore::load(&conn)?;
        Ok(AppState {
            db: Mutex::new(Some(conn)),
            session: Arc::new(session),
            export_progress: ExportProgress::default(),
            reset_wizard: Mutex::new(PasswordResetWizard::default()),
            uploads: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> Result<AppConfig, String> {
        self.db(get_config_from_db)
    }

    /// API client for the current configuration and session.
    pub fn client(&self) -> Result<ConsoleClient, String> {
        let config = self.config()?;
        Ok(ConsoleClient::new(&config, Arc::clone(&self.session)))
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub trait DbAccess {
    fn db<F, T>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>;

    fn db_mut<F, T>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&mut Connection) -> Result<T, rusqlite::Error>;
}

impl DbAccess for AppState {
    fn db<F, T>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let guard = self.db.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        let conn = guard.as_ref().ok_or("Database not initialised")?;
        f(conn).map_err(|e| format!("SQLite error: {}", e))
    }

    fn db_mut<F, T>(&self, f: F) -> Result<T, String>
    where
        F: FnOnce(&mut Connection) -> Result<T, rusqlite::Error>,
    {
        let mut guard = self.db.lock().map_err(|e| format!("Mutex poisoned: {}", e))?;
        let conn = guard.as_mut().ok_or("Database not initialised")?;
        f(conn).map_err(|e| format!("SQLite error: {}", e))
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::migrations::run_migrations(&conn).unwrap();
    AppState::with_connection(conn).unwrap()
}
