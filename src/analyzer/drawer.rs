//! Ticket detail drawer: selection, history, edit form and save.
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ConsoleClient;
use crate::error::AppError;
use crate::parser::deserializers::{de, parse_timestamp, scalar_to_string};
use crate::parser::{CanonicalTicket, RawTicket, TicketStatus};

/// Author recorded on status and remark updates made from the console.
pub const SUPPORT_AUTHOR: &str = "Support Team";
const SYSTEM_AUTHOR: &str = "System";
/// Placeholder some list rows carry instead of a real identifier.
const PLACEHOLDER_ID: &str = "ID";

pub const SAVE_SUCCESS_MESSAGE: &str = "Ticket updated successfully";
pub const REMARK_FAILED_MESSAGE: &str = "Status updated but remark failed to save.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub updated_by: String,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "de::lenient_timestamp_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub remark: String,
}

impl HistoryEntry {
    fn from_remark(remark: &Value) -> Self {
        let field = |key: &str| remark.get(key).filter(|v| !v.is_null());
        HistoryEntry {
            updated_by: field("by")
                .and_then(scalar_to_string)
                .unwrap_or_else(|| SYSTEM_AUTHOR.to_string()),
            status: String::new(),
            updated_at: field("createdAt").and_then(parse_timestamp),
            remark: field("text").and_then(scalar_to_string).unwrap_or_default(),
        }
    }
}

/// Editable fields of the drawer form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketForm {
    #[serde(default)]
    pub ticket_ref_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub remark: String,
}

/// Drawer contents for one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetail {
    /// Source record with `_id` filled from the first known identifier.
    pub record: RawTicket,
    pub history: Vec<HistoryEntry>,
    pub form: TicketForm,
}

impl TicketDetail {
    pub fn open(ticket: &CanonicalTicket) -> Self {
        let mut record = ticket.raw.clone();
        let id = non_null(&record, "_id")
            .or_else(|| non_null(&record, "id"))
            .cloned()
            .or_else(|| ticket.id.clone().map(Value::String));
        match id {
            Some(id) => record.insert("_id".into(), id),
            None => record.remove("_id"),
        };

        TicketDetail {
            history: history_of(&record),
            form: TicketForm {
                ticket_ref_id: ticket.ticket_ref_id.clone(),
                category: ticket.category.clone(),
                sub_category: ticket.sub_category.clone(),
                status: ticket.status,
                description: ticket.description.clone(),
                remark: String::new(),
            },
            record,
        }
    }

    /// Identifier used for updates: `_id`, then `id`, then `ticketRefId`.
    /// Only non-blank strings other than the `ID` placeholder are accepted.
    pub fn save_id(&self) -> Result<String, AppError> {
        let candidate = non_null(&self.record, "_id")
            .or_else(|| non_null(&self.record, "id"))
            .or_else(|| non_null(&self.record, "ticketRefId"));
        match candidate {
            Some(Value::String(id)) if !id.trim().is_empty() && id != PLACEHOLDER_ID => {
                Ok(id.clone())
            }
            _ => Err(AppError::InvalidTicketId),
        }
    }

    pub fn save_plan(&self, form: &TicketForm) -> Result<SavePlan, AppError> {
        let remark = form.remark.trim();
        Ok(SavePlan {
            id: self.save_id()?,
            status: form.status.backend_value(),
            remark: (!remark.is_empty()).then(|| remark.to_string()),
        })
    }
}

fn non_null<'a>(record: &'a RawTicket, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| !v.is_null())
}

/// History rows: from a non-empty `remarks` array, else a `history` array.
fn history_of(record: &RawTicket) -> Vec<HistoryEntry> {
    match (record.get("remarks"), record.get("history")) {
        (Some(Value::Array(remarks)), _) if !remarks.is_empty() => {
            remarks.iter().map(HistoryEntry::from_remark).collect()
        }
        (_, Some(Value::Array(history))) => history
            .iter()
            .map(|entry| serde_json::from_value(entry.clone()).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

/// Remote calls issued by a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    pub id: String,
    pub status: &'static str,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum SaveOutcome {
    Saved { message: String },
    /// Status stored, remark rejected.
    PartiallySaved { warning: String },
}

pub trait TicketUpdates {
    fn update_status(
        &self,
        id: &str,
        status: &str,
        by: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn add_remark(
        &self,
        id: &str,
        text: &str,
        by: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

impl TicketUpdates for ConsoleClient {
    async fn update_status(&self, id: &str, status: &str, by: &str) -> Result<(), AppError> {
        self.update_ticket_status(id, status, by).await.map(|_| ())
    }

    async fn add_remark(&self, id: &str, text: &str, by: &str) -> Result<(), AppError> {
        ConsoleClient::add_remark(self, id, text, by).await.map(|_| ())
    }
}

/// Status update first; the remark follows only once the status is stored.
pub async fn save_ticket<U: TicketUpdates + ?Sized>(
    updates: &U,
    plan: &SavePlan,
) -> Result<SaveOutcome, AppError> {
    updates
        .update_status(&plan.id, plan.status, SUPPORT_AUTHOR)
        .await?;

    if let Some(remark) = &plan.remark {
        if let Err(e) = updates.add_remark(&plan.id, remark, SUPPORT_AUTHOR).await {
            log::warn!("remark for ticket {} not saved: {}", plan.id, e);
            return Ok(SaveOutcome::PartiallySaved {
                warning: REMARK_FAILED_MESSAGE.to_string(),
            });
        }
    }

    Ok(SaveOutcome::Saved {
        message: SAVE_SUCCESS_MESSAGE.to_string(),
    })
}
