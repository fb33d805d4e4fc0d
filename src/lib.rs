//! Core of the support-ticket admin console: ticket normalization, list
//! queries and the detail drawer, spreadsheet export, session handling and
//! the HTTP client for the console's REST backend.
//!
//! The host shell owns windows and dialogs. It opens an [`state::AppState`]
//! once and calls the functions in [`commands`] for each UI action; every
//! command answers `Result<T, String>` where the error is the notification text.

pub mod analyzer;
pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod parser;
pub mod state;

pub use error::AppError;
pub use state::AppState;

// ─── E2E Integration Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod e2e_tests {
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use serde_json::json;
    use std::io::Cursor;

    use crate::analyzer::{TicketDetail, TicketQuery};
    use crate::export::{export_rows, DirectorySaveTarget, ExportRow, XlsxSheetWriter};
    use crate::parser::{normalize_page, TicketStatus};
    use crate::state::test_state;

    /// E2E: listing response → normalize → drawer → export of the visible page
    #[test]
    fn test_e2e_list_normalize_and_export() {
        let state = test_state();
        let query = TicketQuery::new(10);
        let request = serde_json::to_value(query.to_request()).unwrap();
        assert_eq!(request["skip"], 0);

        // 1. Two backend schemas in one response
        let response = json!({
            "data": [
                {
                    "_id": "t1",
                    "ticketRefId": "TCK-001",
                    "serialNumber": "SN-1",
                    "category": "Hardware",
                    "status": "open",
                    "createdDate": "2025-04-01T08:00:00.000Z",
                    "remarks": "just a string"
                },
                {
                    "id": "t2",
                    "refId": "TCK-002",
                    "serialNo": "SN-2",
                    "department": "Billing",
                    "status": "CLOSED",
                    "createdAt": "2025-04-03T08:00:00.000Z",
                    "remarks": [
                        {"text": "checking", "by": "Ana"},
                        {"action": "refunded", "by": "Bo"}
                    ]
                }
            ],
            "total": 2
        });

        let page = normalize_page(response);
        assert_eq!(page.total, Some(2));
        assert_eq!(page.tickets.len(), 2);

        // Newest first
        let newest = &page.tickets[0];
        assert_eq!(newest.id.as_deref(), Some("t2"));
        assert_eq!(newest.status, TicketStatus::Rejected);
        assert_eq!(newest.remark, "refunded");
        assert_eq!(newest.category.as_deref(), Some("Billing"));

        let oldest = &page.tickets[1];
        assert_eq!(oldest.status, TicketStatus::Raised);
        assert_eq!(oldest.remark, "just a string");

        // 2. Drawer on the newest ticket
        let detail = TicketDetail::open(newest);
        assert_eq!(detail.history.len(), 2);
        assert_eq!(detail.save_id().unwrap(), "t2");

        // 3. Export what the list shows
        let rows: Vec<ExportRow> = page.tickets.iter().map(|t| t.to_export_row()).collect();
        let dir = tempfile::tempdir().unwrap();
        let saved = export_rows(
            &rows,
            &XlsxSheetWriter,
            &state.config().unwrap().encode_options(),
            &DirectorySaveTarget::new(dir.path()),
            &state.export_progress,
        )
        .unwrap();
        assert_eq!(saved.filename, "UploadedData.xlsx");
        assert!(!state.export_progress.is_exporting());

        // 4. Read the workbook back
        let bytes = std::fs::read(&saved.path).unwrap();
        let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let range = wb.worksheet_range("UploadedData").unwrap();
        assert_eq!(range.height(), 3);
        assert_eq!(range.get((0, 0)), Some(&Data::String("_id".into())));
        assert_eq!(range.get((0, 8)), Some(&Data::String("status".into())));
        assert_eq!(range.get((1, 8)), Some(&Data::String("Rejected".into())));
        assert_eq!(range.get((2, 9)), Some(&Data::String("just a string".into())));
        // Missing subCategory stays empty
        assert!(matches!(range.get((1, 4)), None | Some(Data::Empty)));
    }
}
