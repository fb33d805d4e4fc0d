//! Filter and paging state behind the ticket list and the export panel.
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::api::models::ExportFilters;
use crate::parser::TicketStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterBy {
    #[default]
    All,
    Status,
    RefId,
}

/// Inclusive range of calendar days (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn single_day(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    pub fn today() -> Self {
        Self::single_day(Utc::now().date_naive())
    }

    /// 00:00:00.000 of the first day.
    pub fn start_bound(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// 23:59:59.999 of the last day.
    pub fn end_bound(&self) -> DateTime<Utc> {
        let last_ms = chrono::NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .unwrap_or(chrono::NaiveTime::MIN);
        self.end.and_time(last_ms).and_utc()
    }
}

/// Filter form shared by the ticket list and the export panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilters {
    #[serde(default)]
    pub filter_by: FilterBy,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

impl ListFilters {
    pub fn for_day(day: NaiveDate) -> Self {
        ListFilters {
            filter_by: FilterBy::All,
            status: None,
            ref_id: String::new(),
            date_range: Some(DateRange::single_day(day)),
        }
    }

    fn status_filter(&self) -> Option<TicketStatus> {
        match self.filter_by {
            FilterBy::Status => self.status,
            _ => None,
        }
    }

    fn trimmed_ref_id(&self) -> Option<String> {
        let ref_id = self.ref_id.trim();
        (!ref_id.is_empty()).then(|| ref_id.to_string())
    }

    /// Body for the upload-data `fetch`/`export` endpoints. Days go out as
    /// `YYYY-MM-DD`; the reference id applies whatever the filter mode.
    pub fn to_export_filters(&self) -> ExportFilters {
        let day = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
        ExportFilters {
            start_date: self.date_range.map(|r| day(r.start)),
            end_date: self.date_range.map(|r| day(r.end)),
            status: self.status_filter().map(|s| s.label().to_string()),
            ticket_ref_id: self.trimmed_ref_id(),
        }
    }
}

impl Default for ListFilters {
    fn default() -> Self {
        Self::for_day(Utc::now().date_naive())
    }
}

/// Body of `POST {ticket}/get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListRequest {
    pub limit: u32,
    pub skip: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_ref_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// Paged ticket list query. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(flatten)]
    pub filters: ListFilters,
}

impl TicketQuery {
    pub fn new(page_size: u32) -> Self {
        TicketQuery {
            page: 1,
            limit: page_size.max(1),
            filters: ListFilters::default(),
        }
    }

    pub fn to_request(&self) -> TicketListRequest {
        let page = u64::from(self.page.max(1));
        let limit = self.limit.max(1);
        let stamp = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Millis, true);

        let ticket_ref_id = match self.filters.filter_by {
            FilterBy::RefId => self.filters.trimmed_ref_id(),
            _ => None,
        };

        TicketListRequest {
            limit,
            skip: (page - 1) * u64::from(limit),
            status: self.filters.status_filter().map(TicketStatus::backend_value),
            ticket_ref_id,
            start_date: self.filters.date_range.map(|r| stamp(r.start_bound())),
            end_date: self.filters.date_range.map(|r| stamp(r.end_bound())),
        }
    }

    /// New filter values take effect from the first page.
    pub fn apply_filter(&mut self, filters: ListFilters) {
        self.filters = filters;
        self.page = 1;
    }

    pub fn reset_filters(&mut self, today: NaiveDate) {
        self.apply_filter(ListFilters::for_day(today));
    }

    /// Dashboard card click.
    pub fn select_status(&mut self, status: TicketStatus) {
        self.filters.filter_by = FilterBy::Status;
        self.filters.status = Some(status);
        self.page = 1;
    }

    pub fn clear_status(&mut self) {
        self.filters.filter_by = FilterBy::All;
        self.filters.status = None;
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, size: u32) {
        self.limit = size.max(1);
        self.page = 1;
    }
}
