use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::api::models::{
    DeleteFileRequest, ExportFilters, FileRecord, ForgotPasswordRequest, LoginRequest,
    LoginResponse, LogoutRequest, RemarkPayload, RemarkUpdate, ResetPasswordRequest,
    ServerExportRequest, StatusUpdate, UploadResponse, VerifyOtpRequest,
};
use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::export::ExportRow;

/// HTTP client for the console's REST backend (auth, tickets, upload data).
/// Attaches the session's bearer token to every request when one is stored.
pub struct ConsoleClient {
    client: Client,
    base_url: String,
    ticket_path: String,
    auth_path: String,
    upload_path: String,
    session: Arc<SessionStore>,
}

impl ConsoleClient {
    pub fn new(config: &AppConfig, session: Arc<SessionStore>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("http client builder failed, using defaults without timeouts: {}", e);
                Client::new()
            });

        ConsoleClient {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            ticket_path: config.ticket_path.clone(),
            auth_path: config.auth_path.clone(),
            upload_path: config.upload_path.clone(),
            session,
        }
    }

    fn url(&self, prefix: &str, endpoint: &str) -> String {
        format!("{}{}/{}", self.base_url, prefix.trim_end_matches('/'), endpoint)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<reqwest::Response, AppError> {
        let resp = self.authorize(request).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        Err(AppError::from_api_body(status.as_u16(), &body, fallback))
    }

    async fn json_body(resp: reqwest::Response) -> Result<Value, AppError> {
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        url: String,
        body: &B,
        fallback: &str,
    ) -> Result<Value, AppError> {
        let resp = self.send(self.client.post(url).json(body), fallback).await?;
        Self::json_body(resp).await
    }

    async fn get(&self, url: String, fallback: &str) -> Result<Value, AppError> {
        let resp = self.send(self.client.get(url), fallback).await?;
        Self::json_body(resp).await
    }

    // ── Auth ─────────────────────────────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let url = self.url(&self.auth_path, "login");
        let body = self.post(url, &LoginRequest { email, password }, "Login failed").await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    pub async fn logout(&self, refresh_token: Option<String>) -> Result<(), AppError> {
        let url = self.url(&self.auth_path, "logout");
        self.post(url, &LogoutRequest { refresh_token }, "Logout failed")
            .await
            .map(|_| ())
    }

    pub async fn validate_token(&self) -> Result<(), AppError> {
        let url = self.url(&self.auth_path, "validate");
        self.get(url, "Session expired").await.map(|_| ())
    }

    pub async fn send_otp(&self, request: &ForgotPasswordRequest) -> Result<Value, AppError> {
        let url = self.url(&self.auth_path, "forgot-password");
        self.post(url, request, "Failed to send OTP").await
    }

    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Value, AppError> {
        let url = self.url(&self.auth_path, "verify-otp");
        self.post(url, request, "OTP verification failed").await
    }

    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<Value, AppError> {
        let url = self.url(&self.auth_path, "reset-password");
        self.post(url, request, "Failed to reset password").await
    }

    // ── Tickets ──────────────────────────────────────────────────────────────

    pub async fn ticket_counts(&self) -> Result<Value, AppError> {
        let url = self.url(&self.ticket_path, "counts");
        self.get(url, "Failed to load ticket counts").await
    }

    /// Raw listing response; see `parser::normalize_page`.
    pub async fn list_tickets<B: Serialize + ?Sized>(&self, request: &B) -> Result<Value, AppError> {
        let url = self.url(&self.ticket_path, "get");
        self.post(url, request, "Something went wrong while fetching tickets!")
            .await
    }

    pub async fn update_ticket_status(&self, id: &str, status: &str, by: &str) -> Result<Value, AppError> {
        let url = self.url(&self.ticket_path, "updateById");
        self.post(url, &StatusUpdate { id, status, by }, "Error updating ticket")
            .await
    }

    pub async fn add_remark(&self, id: &str, text: &str, by: &str) -> Result<Value, AppError> {
        let url = self.url(&self.ticket_path, "updateById");
        let body = RemarkUpdate {
            id,
            remarks: vec![RemarkPayload { text, by }],
        };
        self.post(url, &body, "Error adding remark").await
    }

    // ── Upload data ──────────────────────────────────────────────────────────

    pub async fn fetch_files(&self) -> Result<Vec<FileRecord>, AppError> {
        let url = self.url(&self.upload_path, "fetch-files");
        let body = self
            .post(url, &serde_json::Map::new(), "Failed to load upload history.")
            .await?;
        Ok(data_array(body)
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect())
    }

    pub async fn upload_file(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<UploadResponse, AppError> {
        let mut part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_string());
        if let Some(mime) = mime_type {
            part = part.mime_str(mime)?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = self.url(&self.upload_path, "upload");
        let resp = self
            .send(self.client.post(url).multipart(form), "Upload failed!")
            .await?;
        let body = Self::json_body(resp).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    pub async fn delete_file(&self, id: &str) -> Result<Value, AppError> {
        let url = self.url(&self.upload_path, "deleteById");
        self.post(url, &DeleteFileRequest { id }, "Failed to delete file")
            .await
    }

    /// Rows for the export table; a missing `data` array is no rows.
    pub async fn fetch_upload_data(&self, filters: &ExportFilters) -> Result<Vec<ExportRow>, AppError> {
        let url = self.url(&self.upload_path, "fetch");
        let body = self.post(url, filters, "Error fetching data!").await?;
        Ok(data_array(body)
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect())
    }

    /// Spreadsheet produced by the backend for the same filters.
    pub async fn export_server_side(&self, filters: &ExportFilters) -> Result<Vec<u8>, AppError> {
        let url = self.url(&self.upload_path, "export");
        let body = ServerExportRequest {
            filters,
            format: "excel",
        };
        let resp = self
            .send(self.client.post(url).json(&body), "Failed to export Excel!")
            .await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

/// `data` array of a response body, or nothing.
fn data_array(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Backend `message` of a success body, or `default`.
pub fn message_or(body: &Value, default: &str) -> String {
    match body.get("message") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => default.to_string(),
    }
}
