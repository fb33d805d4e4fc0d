pub mod auth;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod tickets;
pub mod upload;

use crate::error::AppError;

/// Log a failed command and turn the error into its notification text.
pub(crate) fn user_error(command: &'static str) -> impl Fn(AppError) -> String {
    move |e| {
        log::error!("{}: {}", command, e);
        e.to_string()
    }
}
