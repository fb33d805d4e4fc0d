use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::TicketStatus;

/// Ticket as the API returns it. The shape varies between backend schemas.
pub type RawTicket = serde_json::Map<String, Value>;

/// Fixed-shape ticket record rendered by the ticket list.
/// Built fresh for every fetch; a refetch replaces the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTicket {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub ticket_ref_id: Option<String>,
    pub serial_number: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub status: TicketStatus,
    pub remark: String,
    /// Untouched source record, kept for edits.
    #[serde(rename = "__raw", default)]
    pub raw: RawTicket,
}

impl CanonicalTicket {
    /// Flat row for the spreadsheet export: the canonical fields in display
    /// order, timestamps as RFC 3339 text, the source record left out.
    pub fn to_export_row(&self) -> serde_json::Map<String, Value> {
        let text = |v: &Option<String>| v.clone().map_or(Value::Null, Value::String);
        let time = |v: &Option<DateTime<Utc>>| {
            v.map_or(Value::Null, |t| Value::String(t.to_rfc3339()))
        };

        let mut row = serde_json::Map::new();
        row.insert("_id".into(), text(&self.id));
        row.insert("ticketRefId".into(), text(&self.ticket_ref_id));
        row.insert("serialNumber".into(), text(&self.serial_number));
        row.insert("category".into(), text(&self.category));
        row.insert("subCategory".into(), text(&self.sub_category));
        row.insert("description".into(), text(&self.description));
        row.insert("createdAt".into(), time(&self.created_at));
        row.insert("updatedAt".into(), time(&self.updated_at));
        row.insert("status".into(), Value::String(self.status.label().into()));
        row.insert("remark".into(), Value::String(self.remark.clone()));
        row
    }
}

/// One page of the ticket list.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPage {
    pub tickets: Vec<CanonicalTicket>,
    /// Total reported by the backend, when it reports one.
    pub total: Option<u64>,
}
