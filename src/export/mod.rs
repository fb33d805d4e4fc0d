pub mod buffer;
pub mod encoder;
pub mod save;
pub mod sheet;
pub mod writer;

use rust_xlsxwriter::{Format, FormatBorder};

pub use buffer::{normalize_buffer, BoxedBuffer, EncodedWorkbook, WriterOutput};
pub use encoder::{encode, encode_with, export_rows, EncodeOptions, ExportProgress};
pub use save::{DirectorySaveTarget, ExportFile, SaveTarget, SavedFile};
pub use sheet::{Cell, ExportRow, SheetModel};
pub use writer::{SheetWriter, XlsxSheetWriter};

/// File name of the client-side export. Part of the console's external contract.
pub const EXPORT_FILENAME: &str = "UploadedData.xlsx";

pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const DEFAULT_SHEET_NAME: &str = "UploadedData";

pub const DEFAULT_COLUMN_WIDTH: f64 = 20.0;

/// Header row: bold, thin border, wrapped text.
pub fn create_header_format() -> Format {
    Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;

    use super::ExportRow;

    pub fn rows(v: Value) -> Vec<ExportRow> {
        match v {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(m) => m,
                    _ => panic!("expected object rows"),
                })
                .collect(),
            _ => panic!("expected array"),
        }
    }
}
