//! Dashboard figures: status cards for the ticket list and the home charts.
use serde::Serialize;
use serde_json::Value;

use crate::export::ExportRow;
use crate::parser::deserializers::scalar_to_string;
use crate::parser::TicketStatus;

const UNKNOWN_STATUS: &str = "Unknown";

// ─── Status cards ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCounts {
    pub processing: u64,
    pub raised: u64,
    pub resolved: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCard {
    pub status: TicketStatus,
    pub count: u64,
    pub color: &'static str,
}

impl StatusCounts {
    /// Read the `counts` response. Missing or non-numeric entries count as 0.
    pub fn from_value(body: &Value) -> Self {
        let count = |status: TicketStatus| body.get(status.label()).map_or(0, as_count);
        StatusCounts {
            processing: count(TicketStatus::Processing),
            raised: count(TicketStatus::Raised),
            resolved: count(TicketStatus::Resolved),
            rejected: count(TicketStatus::Rejected),
        }
    }

    pub fn get(&self, status: TicketStatus) -> u64 {
        match status {
            TicketStatus::Processing => self.processing,
            TicketStatus::Raised => self.raised,
            TicketStatus::Resolved => self.resolved,
            TicketStatus::Rejected => self.rejected,
        }
    }

    pub fn total(&self) -> u64 {
        TicketStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }

    pub fn cards(&self) -> Vec<StatusCard> {
        TicketStatus::ALL
            .into_iter()
            .map(|status| StatusCard {
                status,
                count: self.get(status),
                color: status.color(),
            })
            .collect()
    }
}

fn as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

// ─── Home charts ─────────────────────────────────────────────────────────────

/// Upload-data rows grouped by `status`, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeStats {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl HomeStats {
    pub fn from_rows(rows: &[ExportRow]) -> Self {
        let mut stats = HomeStats::default();
        for row in rows {
            let status = row
                .get("status")
                .and_then(scalar_to_string)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

            match stats.labels.iter().position(|l| *l == status) {
                Some(i) => stats.values[i] += 1,
                None => {
                    stats.labels.push(status);
                    stats.values.push(1);
                }
            }
        }
        stats
    }

    pub fn count(&self, label: &str) -> u64 {
        self.labels
            .iter()
            .position(|l| l == label)
            .map_or(0, |i| self.values[i])
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::rows;
    use serde_json::json;

    #[test]
    fn test_counts_default_to_zero() {
        let counts = StatusCounts::from_value(&json!({
            "Processing": 3,
            "Raised": "many",
            "Resolved": 7.0
        }));
        assert_eq!(
            counts,
            StatusCounts {
                processing: 3,
                raised: 0,
                resolved: 7,
                rejected: 0
            }
        );
        assert_eq!(counts.total(), 10);
        assert_eq!(StatusCounts::from_value(&Value::Null), StatusCounts::default());
    }

    #[test]
    fn test_cards_in_canonical_order() {
        let counts = StatusCounts::from_value(&json!({"Rejected": 2}));
        let cards = counts.cards();
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].status, TicketStatus::Processing);
        assert_eq!(cards[3].count, 2);
        assert_eq!(cards[3].color, "#FF4D4F");
    }

    #[test]
    fn test_counts_serialize_with_labels() {
        let v = serde_json::to_value(StatusCounts {
            raised: 1,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(v, json!({"Processing": 0, "Raised": 1, "Resolved": 0, "Rejected": 0}));
    }

    #[test]
    fn test_home_stats_grouping() {
        let data = rows(json!([
            {"status": "Resolved"},
            {"status": "Raised"},
            {"status": ""},
            {"name": "no status"},
            {"status": "Resolved"},
            {"status": null}
        ]));
        let stats = HomeStats::from_rows(&data);
        assert_eq!(stats.labels, vec!["Resolved", "Raised", "Unknown"]);
        assert_eq!(stats.values, vec![2, 1, 3]);
        assert_eq!(stats.count("Unknown"), 3);
        assert_eq!(stats.count("Rejected"), 0);
    }

    #[test]
    fn test_home_stats_empty() {
        assert!(HomeStats::from_rows(&[]).is_empty());
    }
}
