use serde_json::Value;

use super::types::RawTicket;

/// Ordered list of equivalent field names for one canonical field.
/// The first key holding a non-null value wins.
#[derive(Debug, Clone, Copy)]
pub struct AliasSet {
    pub field: &'static str,
    pub keys: &'static [&'static str],
}

impl AliasSet {
    pub const fn new(field: &'static str, keys: &'static [&'static str]) -> Self {
        AliasSet { field, keys }
    }

    /// First present, non-null value in priority order.
    pub fn resolve<'a>(&self, raw: &'a RawTicket) -> Option<&'a Value> {
        let (pos, key, value) = self
            .keys
            .iter()
            .enumerate()
            .filter_map(|(pos, key)| raw.get(*key).map(|value| (pos, *key, value)))
            .find(|(_, _, value)| !value.is_null())?;
        if pos > 0 {
            log::debug!("{} resolved from alias {}", self.field, key);
        }
        Some(value)
    }
}

pub const ID: AliasSet = AliasSet::new("_id", &["_id", "id"]);
pub const REF_ID: AliasSet = AliasSet::new("ticketRefId", &["ticketRefId", "ticketRef", "refId"]);
pub const SERIAL_NUMBER: AliasSet = AliasSet::new("serialNumber", &["serialNumber", "serialNo"]);
pub const CATEGORY: AliasSet = AliasSet::new("category", &["category", "department"]);
pub const SUB_CATEGORY: AliasSet =
    AliasSet::new("subCategory", &["subCategory", "sub_category", "subCat"]);
pub const DESCRIPTION: AliasSet = AliasSet::new("description", &["description", "desc"]);
pub const CREATED_AT: AliasSet = AliasSet::new("createdAt", &["createdDate", "createdAt", "created"]);
pub const UPDATED_AT: AliasSet = AliasSet::new("updatedAt", &["updatedDate", "updatedAt", "updated"]);
pub const STATUS: AliasSet = AliasSet::new("status", &["status"]);

/// Text of a remark entry: `text`, then `action`.
pub const REMARK_TEXT: AliasSet = AliasSet::new("remark", &["text", "action"]);

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
    fn test_priority_order() {
        let r = raw(json!({"id": "b", "_id": "a"}));
        assert_eq!(ID.resolve(&r), Some(&json!("a")));
    }

    #[test]
    fn test_null_falls_through() {
        let r = raw(json!({"_id": null, "id": 7}));
        assert_eq!(ID.resolve(&r), Some(&json!(7)));
    }

    #[test]
    fn test_absent() {
        let r = raw(json!({"other": 1}));
        assert_eq!(REF_ID.resolve(&r), None);
    }

    #[test]
    fn test_later_alias() {
        let r = raw(json!({"refId": "R-9"}));
        assert_eq!(REF_ID.resolve(&r), Some(&json!("R-9")));
    }

    #[test]
    fn test_canonical_field_names() {
        assert_eq!(ID.field, "_id");
        assert_eq!(CREATED_AT.field, "createdAt");
        assert_eq!(CREATED_AT.keys[0], "createdDate");
    }
}
