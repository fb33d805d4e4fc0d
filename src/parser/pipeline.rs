use std::cmp::Reverse;

use serde_json::Value;

use crate::parser::aliases::{self, AliasSet};
use crate::parser::deserializers::{parse_timestamp, scalar_to_string};
use crate::parser::status::TicketStatus;
use crate::parser::types::{CanonicalTicket, RawTicket, TicketPage};

/// Keys under which a listing response may carry its ticket array, in order.
const PAGE_ARRAY_KEYS: &[&str] = &["data", "items", "tickets"];

/// Normalize one raw ticket. Never fails: missing or oddly typed fields
/// degrade to `None`, an empty remark or the `Raised` status.
pub fn normalize(raw: RawTicket) -> CanonicalTicket {
    let text = |set: AliasSet| set.resolve(&raw).and_then(scalar_to_string);
    let timestamp = |set: AliasSet| set.resolve(&raw).and_then(parse_timestamp);

    CanonicalTicket {
        id: text(aliases::ID),
        ticket_ref_id: text(aliases::REF_ID),
        serial_number: text(aliases::SERIAL_NUMBER),
        category: text(aliases::CATEGORY),
        sub_category: text(aliases::SUB_CATEGORY),
        description: text(aliases::DESCRIPTION),
        created_at: timestamp(aliases::CREATED_AT),
        updated_at: timestamp(aliases::UPDATED_AT),
        status: TicketStatus::from_raw(aliases::STATUS.resolve(&raw)),
        remark: resolve_remark(&raw),
        raw,
    }
}

/// Normalize a JSON value that should be a ticket object.
/// Non-object entries become an empty record.
pub fn normalize_value(value: Value) -> CanonicalTicket {
    match value {
        Value::Object(raw) => normalize(raw),
        other => {
            log::debug!("ticket entry is not an object: {}", other);
            normalize(RawTicket::new())
        }
    }
}

/// Latest remark text.
///
/// Priority: last element of a non-empty `remarks` array (`text`, then
/// `action`), a truthy scalar `remark`, a non-empty string `remarks`.
pub fn resolve_remark(raw: &RawTicket) -> String {
    if let Some(Value::Array(entries)) = raw.get("remarks") {
        if let Some(last) = entries.last() {
            return match last {
                Value::Object(entry) => aliases::REMARK_TEXT
                    .resolve(entry)
                    .and_then(scalar_to_string)
                    .unwrap_or_default(),
                _ => String::new(),
            };
        }
    }

    if let Some(remark) = raw.get("remark").and_then(truthy_text) {
        return remark;
    }

    match raw.get("remarks") {
        Some(Value::String(remarks)) if !remarks.is_empty() => remarks.clone(),
        _ => String::new(),
    }
}

/// Text of a scalar that counts as set: non-empty strings, non-zero numbers
/// and `true`. Null, `false`, `0`, `""` and containers give None.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}

/// Pull the ticket array and optional total out of a listing response.
/// Accepts a bare array or an object carrying `data`, `items` or `tickets`.
pub fn extract_page(body: Value) -> (Vec<Value>, Option<u64>) {
    match body {
        Value::Array(items) => (items, None),
        Value::Object(mut obj) => {
            let total = obj.get("total").and_then(Value::as_u64);
            for key in PAGE_ARRAY_KEYS {
                if let Some(Value::Array(items)) = obj.remove(*key) {
                    return (items, total);
                }
            }
            (Vec::new(), None)
        }
        _ => (Vec::new(), None),
    }
}

/// Normalize a listing response into a page, newest first.
/// Tickets without a creation date sort as the epoch; ties keep response order.
pub fn normalize_page(body: Value) -> TicketPage {
    let (items, total) = extract_page(body);
    let mut tickets: Vec<CanonicalTicket> = items.into_iter().map(normalize_value).collect();
    tickets.sort_by_key(|t| Reverse(t.created_at.map(|d| d.timestamp_millis()).unwrap_or(0)));
    TicketPage { tickets, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawTicket {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_scenario_string_remarks() {
        let t = normalize(raw(json!({"_id": "t1", "status": "open", "remarks": "just a string"})));
        assert_eq!(t.id.as_deref(), Some("t1"));
        assert_eq!(t.status, TicketStatus::Raised);
        assert_eq!(t.remark, "just a string");
        assert_eq!(t.raw.get("_id"), Some(&json!("t1")));
    }

    #[test]
    fn test_missing_status_is_raised() {
        let t = normalize(raw(json!({"id": 5})));
        assert_eq!(t.status, TicketStatus::Raised);
        assert_eq!(t.id.as_deref(), Some("5"));
    }

    #[test]
    fn test_id_prefers_underscore() {
        let t = normalize(raw(json!({"id": "legacy", "_id": "mongo"})));
        assert_eq!(t.id.as_deref(), Some("mongo"));
    }

    #[test]
    fn test_last_remark_wins() {
        let t = normalize(raw(json!({"remarks": [{"text": "a"}, {"text": "b"}]})));
        assert_eq!(t.remark, "b");
    }

    #[test]
    fn test_remark_action_fallback() {
        let t = normalize(raw(json!({"remarks": [{"text": "a"}, {"action": "escalated", "by": "ops"}]})));
        assert_eq!(t.remark, "escalated");
        let t = normalize(raw(json!({"remarks": [{"by": "ops"}]})));
        assert_eq!(t.remark, "");
    }

    #[test]
    fn test_empty_remarks_uses_scalar_remark() {
        let t = normalize(raw(json!({"remarks": [], "remark": "manual note"})));
        assert_eq!(t.remark, "manual note");
    }

    #[test]
    fn test_numeric_scalar_remark() {
        let t = normalize(raw(json!({"remarks": [], "remark": 42})));
        assert_eq!(t.remark, "42");
        let t = normalize(raw(json!({"remark": true})));
        assert_eq!(t.remark, "true");
    }

    #[test]
    fn test_falsy_scalar_remark_falls_through() {
        let t = normalize(raw(json!({"remark": 0, "remarks": "from remarks"})));
        assert_eq!(t.remark, "from remarks");
        let t = normalize(raw(json!({"remark": false})));
        assert_eq!(t.remark, "");
        let t = normalize(raw(json!({"remark": {"text": "nested"}})));
        assert_eq!(t.remark, "");
    }

    #[test]
    fn test_no_remark_anywhere() {
        let t = normalize(raw(json!({"remarks": [], "remark": ""})));
        assert_eq!(t.remark, "");
        let t = normalize(raw(json!({})));
        assert_eq!(t.remark, "");
    }

    #[test]
    fn test_legacy_schema_aliases() {
        let t = normalize(raw(json!({
            "id": "42",
            "refId": "REF-42",
            "serialNo": "SN-1",
            "department": "Billing",
            "sub_category": "Refund",
            "desc": "double charge",
            "created": "2025-02-01T08:00:00Z",
            "updated": 1_738_400_000_000i64,
            "status": "DONE"
        })));
        assert_eq!(t.ticket_ref_id.as_deref(), Some("REF-42"));
        assert_eq!(t.serial_number.as_deref(), Some("SN-1"));
        assert_eq!(t.category.as_deref(), Some("Billing"));
        assert_eq!(t.sub_category.as_deref(), Some("Refund"));
        assert_eq!(t.description.as_deref(), Some("double charge"));
        assert!(t.created_at.is_some());
        assert!(t.updated_at.is_some());
        assert_eq!(t.status, TicketStatus::Resolved);
    }

    #[test]
    fn test_created_date_priority() {
        let t = normalize(raw(json!({
            "createdAt": "2020-01-01T00:00:00Z",
            "createdDate": "2025-01-01T00:00:00Z"
        })));
        assert_eq!(t.created_at.unwrap().format("%Y").to_string(), "2025");
    }

    #[test]
    fn test_malformed_fields_degrade() {
        let t = normalize(raw(json!({
            "_id": {"$oid": "x"},
            "createdAt": "yesterday",
            "category": ["a"]
        })));
        assert_eq!(t.id, None);
        assert_eq!(t.created_at, None);
        assert_eq!(t.category, None);
    }

    #[test]
    fn test_non_object_entry() {
        let t = normalize_value(json!("garbage"));
        assert_eq!(t.status, TicketStatus::Raised);
        assert!(t.raw.is_empty());
    }

    #[test]
    fn test_extract_page_shapes() {
        let (items, total) = extract_page(json!([{"_id": "a"}]));
        assert_eq!((items.len(), total), (1, None));

        let (items, total) = extract_page(json!({"data": [{}, {}], "total": 12}));
        assert_eq!((items.len(), total), (2, Some(12)));

        let (items, total) = extract_page(json!({"items": [{}], "total": "3"}));
        assert_eq!((items.len(), total), (1, None));

        let (items, _) = extract_page(json!({"tickets": [{}, {}, {}]}));
        assert_eq!(items.len(), 3);

        let (items, total) = extract_page(json!({"message": "nope"}));
        assert!(items.is_empty());
        assert_eq!(total, None);
    }

    #[test]
    fn test_page_sorted_newest_first() {
        let page = normalize_page(json!({"data": [
            {"_id": "old", "createdAt": "2024-01-01T00:00:00Z"},
            {"_id": "none"},
            {"_id": "new", "createdAt": "2025-06-01T00:00:00Z"},
            {"_id": "none2"}
        ], "total": 4}));
        let ids: Vec<_> = page.tickets.iter().map(|t| t.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["new", "old", "none", "none2"]);
        assert_eq!(page.total, Some(4));
    }

    #[test]
    fn test_canonical_serialization_keys() {
        let t = normalize(raw(json!({"_id": "t1", "status": "closed"})));
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["_id"], json!("t1"));
        assert_eq!(v["status"], json!("Rejected"));
        assert_eq!(v["createdAt"], Value::Null);
        assert_eq!(v["__raw"]["status"], json!("closed"));
    }
}
