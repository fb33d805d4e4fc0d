use std::time::Duration;

use tokio::sync::watch;

use super::user_error;
use crate::api::message_or;
use crate::auth::{AuthState, ResetStep};
use crate::error::AppError;
use crate::state::{lock, AppState, DbAccess};

pub async fn login(state: &AppState, email: String, password: String) -> Result<AuthState, String> {
    let client = state.client()?;
    let response = client
        .login(email.trim(), &password)
        .await
        .map_err(user_error("login"))?;

    let access = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| user_error("login")(AppError::NotAuthenticated))?;

    state.db(|conn| {
        state
            .session
            .login(conn, &access, response.refresh_token.as_deref())
    })?;
    log::info!("signed in as {}", email.trim());
    Ok(state.session.state())
}

/// Best-effort server logout bounded by `logout_timeout_ms`. The local session
/// is cleared whatever the server answers.
pub async fn logout(state: &AppState) -> Result<(), String> {
    let config = state.config()?;
    let client = state.client()?;
    let limit = Duration::from_millis(config.logout_timeout_ms);

    match tokio::time::timeout(limit, client.logout(state.session.refresh_token())).await {
        Ok(Ok(())) => log::info!("server session closed"),
        Ok(Err(e)) => log::warn!("server logout failed (ignored): {}", e),
        Err(_) => log::warn!(
            "server logout still pending after {} ms, clearing local session",
            config.logout_timeout_ms
        ),
    }

    state.db(|conn| state.session.clear(conn))
}

/// Route guard. A rejected or unreachable validation drops the access token.
pub async fn validate_session(state: &AppState) -> Result<bool, String> {
    let client = state.client()?;
    match client.validate_token().await {
        Ok(()) => Ok(true),
        Err(e) => {
            log::warn!("session validation failed: {}", e);
            state.db(|conn| state.session.clear_access_token(conn))?;
            Ok(false)
        }
    }
}

pub fn auth_state(state: &AppState) -> AuthState {
    state.session.state()
}

/// Change feed for views that must react to a login or logout elsewhere.
pub fn subscribe_auth(state: &AppState) -> watch::Receiver<AuthState> {
    state.session.subscribe()
}

// ─── Forgot password ─────────────────────────────────────────────────────────

pub fn password_reset_step(state: &AppState) -> ResetStep {
    lock(&state.reset_wizard).step().clone()
}

pub fn restart_password_reset(state: &AppState) {
    *lock(&state.reset_wizard) = Default::default();
}

pub async fn request_password_otp(state: &AppState, email: String) -> Result<String, String> {
    let request = lock(&state.reset_wizard)
        .otp_request(&email)
        .map_err(|e| e.to_string())?;

    let body = state
        .client()?
        .send_otp(&request)
        .await
        .map_err(user_error("request_password_otp"))?;

    lock(&state.reset_wizard).otp_request_accepted(request);
    Ok(message_or(&body, "OTP sent to your registered email"))
}

pub async fn verify_password_otp(state: &AppState, otp: String) -> Result<String, String> {
    let request = lock(&state.reset_wizard)
        .verify_request(&otp)
        .map_err(|e| e.to_string())?;

    let body = state
        .client()?
        .verify_otp(&request)
        .await
        .map_err(user_error("verify_password_otp"))?;

    lock(&state.reset_wizard).verify_request_accepted(request);
    Ok(message_or(&body, "OTP verified successfully"))
}

pub async fn reset_password(
    state: &AppState,
    new_password: String,
    confirm_password: String,
) -> Result<String, String> {
    let request = lock(&state.reset_wizard)
        .reset_request(&new_password, &confirm_password)
        .map_err(|e| e.to_string())?;

    let body = state
        .client()?
        .reset_password(&request)
        .await
        .map_err(user_error("reset_password"))?;

    lock(&state.reset_wizard).reset_request_accepted();
    Ok(message_or(&body, "Password updated successfully"))
}
