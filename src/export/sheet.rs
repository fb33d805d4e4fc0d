use serde_json::Value;

use crate::error::AppError;

/// Flat record handed to the exporter: column name → scalar value.
pub type ExportRow = serde_json::Map<String, Value>;

/// Longest text an xlsx cell can hold, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Null becomes an empty cell; arrays and objects are written as JSON text.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(Cell::Number)
                .unwrap_or_else(|| Cell::Text(n.to_string())),
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub width: f64,
}

/// One worksheet: a header row of column keys plus one row per record.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetModel {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetModel {
    /// Lay out `rows` as a sheet.
    ///
    /// Columns are the keys of the first row, in its order. Later rows are
    /// read by those keys only: a missing key gives an empty cell and keys the
    /// first row lacks are not exported.
    pub fn from_rows(rows: &[ExportRow], name: &str, width: f64) -> Result<Self, AppError> {
        let first = rows.first().ok_or(AppError::EmptyInput)?;

        let columns: Vec<Column> = first
            .keys()
            .map(|key| Column {
                key: key.clone(),
                width,
            })
            .collect();

        let cells = rows
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| match record.get(&col.key).map(Cell::from_value) {
                        Some(Cell::Text(s)) => Cell::Text(clamp_text(&col.key, s)),
                        Some(cell) => cell,
                        None => Cell::Empty,
                    })
                    .collect()
            })
            .collect();

        Ok(SheetModel {
            name: name.to_string(),
            columns,
            rows: cells,
        })
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key.as_str()).collect()
    }
}

fn clamp_text(column: &str, text: String) -> String {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            log::warn!(
                "column {} holds {} chars, truncated to {}",
                column,
                text.chars().count(),
                MAX_CELL_CHARS
            );
            text[..cut].to_string()
        }
        None => text,
    }
}
