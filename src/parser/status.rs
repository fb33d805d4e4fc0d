use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::deserializers::scalar_to_string;

const PROCESSING_LIKE: &[&str] = &["in_progress", "inprogress", "processing"];
const OPEN_LIKE: &[&str] = &["open", "raised", "new", "opened"];
const FINISHED_LIKE: &[&str] = &["resolved", "closed", "done"];

/// Display colour for labels outside the canonical vocabulary.
pub const FALLBACK_COLOR: &str = "#D9D9D9";

/// Canonical status vocabulary shown by the console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Processing,
    #[default]
    Raised,
    Resolved,
    Rejected,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Processing,
        TicketStatus::Raised,
        TicketStatus::Resolved,
        TicketStatus::Rejected,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TicketStatus::Processing => "Processing",
            TicketStatus::Raised => "Raised",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Rejected => "Rejected",
        }
    }

    /// Map a backend status value onto the canonical vocabulary.
    ///
    /// Matching is case-insensitive. `closed` is reported as `Rejected` while
    /// `resolved` and `done` are `Resolved`. Absent or unknown values are `Raised`.
    pub fn from_raw(value: Option<&Value>) -> Self {
        let s = value
            .and_then(scalar_to_string)
            .unwrap_or_default()
            .to_lowercase();

        if PROCESSING_LIKE.contains(&s.as_str()) {
            TicketStatus::Processing
        } else if OPEN_LIKE.contains(&s.as_str()) {
            TicketStatus::Raised
        } else if FINISHED_LIKE.contains(&s.as_str()) {
            if s == "closed" {
                TicketStatus::Rejected
            } else {
                TicketStatus::Resolved
            }
        } else {
            TicketStatus::Raised
        }
    }

    /// Parse a UI label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        TicketStatus::ALL
            .into_iter()
            .find(|s| s.label().to_lowercase() == lower)
    }

    /// Status value the ticket API expects for this label.
    pub fn backend_value(self) -> &'static str {
        match self {
            TicketStatus::Processing => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Rejected => "closed",
            TicketStatus::Raised => "open",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            TicketStatus::Processing => "#FAAD14",
            TicketStatus::Raised => "#2F54EB",
            TicketStatus::Resolved => "#52C41A",
            TicketStatus::Rejected => "#FF4D4F",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Backend status for a free-text UI label; anything unrecognised is `open`.
pub fn backend_status_for_label(label: &str) -> &'static str {
    TicketStatus::from_label(label)
        .unwrap_or(TicketStatus::Raised)
        .backend_value()
}

/// Tag colour for a free-text status label.
pub fn status_color(label: &str) -> &'static str {
    match label {
        "Processing" => TicketStatus::Processing.color(),
        "Raised" => TicketStatus::Raised.color(),
        "Resolved" => TicketStatus::Resolved.color(),
        "Rejected" => TicketStatus::Rejected.color(),
        _ => FALLBACK_COLOR,
    }
}
