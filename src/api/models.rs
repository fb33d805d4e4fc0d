use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::deserializers::de;

// ── Auth ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl std::fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .field("otp", &"••••")
            .field("new_password", &"••••••")
            .field("confirm_password", &"••••••")
            .finish()
    }
}

// ── Tickets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate<'a> {
    pub id: &'a str,
    pub status: &'a str,
    pub by: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemarkPayload<'a> {
    pub text: &'a str,
    pub by: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemarkUpdate<'a> {
    pub id: &'a str,
    pub remarks: Vec<RemarkPayload<'a>>,
}

// ── Upload data ──────────────────────────────────────────────────────────────

/// Entry of the upload history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(rename = "_id", default, deserialize_with = "de::lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "de::lenient_u64")]
    pub size: u64,
    #[serde(default, deserialize_with = "de::lenient_string_opt")]
    pub mimetype: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_timestamp_opt")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub file_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteFileRequest<'a> {
    pub id: &'a str,
}

/// Filters sent to the upload-data `fetch` and `export` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_ref_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ServerExportRequest<'a> {
    #[serde(flatten)]
    pub filters: &'a ExportFilters,
    pub format: &'static str,
}
