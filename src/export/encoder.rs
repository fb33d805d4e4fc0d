use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AppError;
use crate::export::buffer::{normalize_buffer, EncodedWorkbook};
use crate::export::save::{ExportFile, SaveTarget, SavedFile};
use crate::export::sheet::{ExportRow, SheetModel};
use crate::export::writer::{SheetWriter, XlsxSheetWriter};
use crate::export::{DEFAULT_COLUMN_WIDTH, DEFAULT_SHEET_NAME, EXPORT_FILENAME, XLSX_MIME_TYPE};

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    pub sheet_name: String,
    pub column_width: f64,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            column_width: DEFAULT_COLUMN_WIDTH,
        }
    }
}

/// "Export in progress" flag shown by the host while an export runs.
///
/// Nothing here refuses a second export while the flag is set; the host
/// disables its export trigger based on `is_exporting`.
#[derive(Debug, Default)]
pub struct ExportProgress {
    active: AtomicBool,
}

impl ExportProgress {
    pub fn is_exporting(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Set the flag until the returned guard is dropped.
    pub fn begin(&self) -> ExportGuard<'_> {
        self.active.store(true, Ordering::SeqCst);
        ExportGuard {
            flag: &self.active,
        }
    }
}

pub struct ExportGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Encode rows as an `.xlsx` workbook with default options.
pub fn encode(rows: &[ExportRow]) -> Result<EncodedWorkbook, AppError> {
    encode_with(rows, &XlsxSheetWriter, &EncodeOptions::default())
}

/// Encode rows with an explicit writer.
/// Empty input fails with `EmptyInput` before the writer is touched.
pub fn encode_with<W: SheetWriter + ?Sized>(
    rows: &[ExportRow],
    writer: &W,
    options: &EncodeOptions,
) -> Result<EncodedWorkbook, AppError> {
    let sheet = SheetModel::from_rows(rows, &options.sheet_name, options.column_width)?;
    let output = writer.write_buffer(&sheet)?;
    normalize_buffer(&output)
}

/// Encode rows and hand the document to `target` as `UploadedData.xlsx`.
/// `progress` is set for the duration of the call and cleared on every exit.
pub fn export_rows<W, T>(
    rows: &[ExportRow],
    writer: &W,
    options: &EncodeOptions,
    target: &T,
    progress: &ExportProgress,
) -> Result<SavedFile, AppError>
where
    W: SheetWriter + ?Sized,
    T: SaveTarget + ?Sized,
{
    if rows.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let _guard = progress.begin();
    let contents = encode_with(rows, writer, options)?;
    target.save(ExportFile {
        filename: EXPORT_FILENAME,
        mime_type: XLSX_MIME_TYPE,
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::buffer::{BoxedBuffer, WriterOutput};
    use crate::export::save::DirectorySaveTarget;
    use crate::export::test_support::rows;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use serde_json::json;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::sync::Arc;

    fn read_sheet(bytes: &[u8]) -> calamine::Range<Data> {
        let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
        wb.worksheet_range(DEFAULT_SHEET_NAME).unwrap()
    }

    struct FailingWriter;

    impl SheetWriter for FailingWriter {
        fn write_buffer(&self, _sheet: &SheetModel) -> Result<WriterOutput, AppError> {
            Err(AppError::Serialization("disk full".into()))
        }
    }

    /// Re-wraps the real xlsx bytes in a padded backing store.
    struct ViewWriter {
        boxed: bool,
    }

    impl SheetWriter for ViewWriter {
        fn write_buffer(&self, sheet: &SheetModel) -> Result<WriterOutput, AppError> {
            let bytes = match XlsxSheetWriter.write_buffer(sheet)? {
                WriterOutput::RawBuffer(b) => b,
                _ => unreachable!(),
            };
            let mut backing = vec![0xAA; 32];
            backing.extend_from_slice(&bytes);
            backing.extend_from_slice(&[0xBB; 16]);
            let buffer: Arc<[u8]> = Arc::from(backing);
            Ok(if self.boxed {
                WriterOutput::BoxedBuffer(BoxedBuffer {
                    buffer: Some(buffer),
                    byte_offset: Some(32),
                    byte_length: Some(bytes.len()),
                })
            } else {
                WriterOutput::OffsetView {
                    buffer,
                    byte_offset: 32,
                    byte_length: bytes.len(),
                }
            })
        }
    }

    struct UnwrappedWriter;

    impl SheetWriter for UnwrappedWriter {
        fn write_buffer(&self, _sheet: &SheetModel) -> Result<WriterOutput, AppError> {
            Ok(WriterOutput::BoxedBuffer(BoxedBuffer::default()))
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        saved: RefCell<Vec<(String, String, usize)>>,
    }

    impl SaveTarget for RecordingTarget {
        fn save(&self, file: ExportFile) -> Result<SavedFile, AppError> {
            self.saved.borrow_mut().push((
                file.filename.to_string(),
                file.mime_type.to_string(),
                file.contents.len(),
            ));
            Ok(SavedFile {
                path: file.filename.to_string(),
                filename: file.filename.to_string(),
                mime_type: file.mime_type.to_string(),
                size_bytes: file.contents.len() as u64,
            })
        }
    }

    #[test]
    fn test_encode_empty_is_error() {
        let err = encode(&[]).unwrap_err();
        assert!(matches!(err, AppError::EmptyInput));
    }

    #[test]
    fn test_extra_keys_dropped_missing_keys_empty() {
        let data = rows(json!([{"a": 1, "b": 2}, {"a": 3, "c": 4}]));
        let wb = encode(&data).unwrap();
        let range = read_sheet(wb.as_bytes());

        assert_eq!(range.get_size(), (3, 2));
        assert_eq!(range.get((0, 0)), Some(&Data::String("a".into())));
        assert_eq!(range.get((0, 1)), Some(&Data::String("b".into())));
        assert_eq!(range.get((2, 0)), Some(&Data::Float(3.0)));
        assert_eq!(range.get((2, 1)), Some(&Data::Empty));
    }

    #[test]
    fn test_round_trip_rows_in_first_row_order() {
        let data = rows(json!([
            {"ticketRefId": "T-1", "status": "Raised", "count": 1},
            {"ticketRefId": "T-2", "status": "Resolved", "count": 2},
            {"ticketRefId": "T-3", "status": "Rejected", "count": 3}
        ]));
        let wb = encode(&data).unwrap();
        let range = read_sheet(wb.as_bytes());

        assert_eq!(range.height(), data.len() + 1);
        let header: Vec<Data> = range.rows().next().unwrap().to_vec();
        assert_eq!(
            header,
            vec![
                Data::String("ticketRefId".into()),
                Data::String("status".into()),
                Data::String("count".into())
            ]
        );
        for (i, record) in data.iter().enumerate() {
            let row = i + 1;
            assert_eq!(
                range.get((row, 0)),
                Some(&Data::String(record["ticketRefId"].as_str().unwrap().into()))
            );
            assert_eq!(
                range.get((row, 1)),
                Some(&Data::String(record["status"].as_str().unwrap().into()))
            );
            assert_eq!(
                range.get((row, 2)),
                Some(&Data::Float(record["count"].as_f64().unwrap()))
            );
        }
    }

    #[test]
    fn test_oversized_description_is_truncated_not_fatal() {
        let data = rows(json!([{"ticketRefId": "T-1", "description": "x".repeat(40_000)}]));
        let wb = encode(&data).unwrap();
        let range = read_sheet(wb.as_bytes());

        assert_eq!(range.get((1, 0)), Some(&Data::String("T-1".into())));
        match range.get((1, 1)) {
            Some(Data::String(s)) => assert_eq!(s.len(), crate::export::sheet::MAX_CELL_CHARS),
            other => panic!("unexpected cell {:?}", other),
        }
    }

    #[test]
    fn test_writer_shapes_give_identical_documents() {
        let data = rows(json!([{"a": "x"}]));
        let sheet = SheetModel::from_rows(&data, DEFAULT_SHEET_NAME, DEFAULT_COLUMN_WIDTH).unwrap();
        let direct = match XlsxSheetWriter.write_buffer(&sheet).unwrap() {
            WriterOutput::RawBuffer(b) => b,
            _ => unreachable!(),
        };

        let opts = EncodeOptions::default();
        let view = encode_with(&data, &ViewWriter { boxed: false }, &opts).unwrap();
        let boxed = encode_with(&data, &ViewWriter { boxed: true }, &opts).unwrap();

        assert_eq!(view.len(), direct.len());
        assert_eq!(view, boxed);
        assert_eq!(&view.as_bytes()[..2], b"PK");
        assert_eq!(read_sheet(view.as_bytes()).get((1, 0)), Some(&Data::String("x".into())));
    }

    #[test]
    fn test_export_uses_fixed_name_and_mime() {
        let target = RecordingTarget::default();
        let progress = ExportProgress::default();
        let data = rows(json!([{"a": 1}]));
        let saved = export_rows(&data, &XlsxSheetWriter, &EncodeOptions::default(), &target, &progress)
            .unwrap();

        assert_eq!(saved.filename, "UploadedData.xlsx");
        let calls = target.saved.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "UploadedData.xlsx");
        assert_eq!(
            calls[0].1,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert!(!progress.is_exporting());
    }

    #[test]
    fn test_empty_export_saves_nothing() {
        let target = RecordingTarget::default();
        let progress = ExportProgress::default();
        let err = export_rows(&[], &XlsxSheetWriter, &EncodeOptions::default(), &target, &progress)
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyInput));
        assert!(target.saved.borrow().is_empty());
        assert!(!progress.is_exporting());
    }

    #[test]
    fn test_failures_clear_progress_and_save_nothing() {
        let target = RecordingTarget::default();
        let progress = ExportProgress::default();
        let data = rows(json!([{"a": 1}]));

        let err = export_rows(&data, &FailingWriter, &EncodeOptions::default(), &target, &progress)
            .unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
        assert!(!progress.is_exporting());

        let err = export_rows(&data, &UnwrappedWriter, &EncodeOptions::default(), &target, &progress)
            .unwrap_err();
        assert!(matches!(err, AppError::BufferFormat(_)));
        assert!(!progress.is_exporting());

        assert!(target.saved.borrow().is_empty());
    }

    #[test]
    fn test_progress_set_while_exporting() {
        struct ProbeWriter<'a>(&'a ExportProgress);
        impl SheetWriter for ProbeWriter<'_> {
            fn write_buffer(&self, sheet: &SheetModel) -> Result<WriterOutput, AppError> {
                assert!(self.0.is_exporting());
                XlsxSheetWriter.write_buffer(sheet)
            }
        }

        let progress = ExportProgress::default();
        let target = RecordingTarget::default();
        let data = rows(json!([{"a": 1}]));
        export_rows(&data, &ProbeWriter(&progress), &EncodeOptions::default(), &target, &progress)
            .unwrap();
        assert!(!progress.is_exporting());
    }

    #[test]
    fn test_directory_target_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = DirectorySaveTarget::new(dir.path());
        let progress = ExportProgress::default();
        let data = rows(json!([{"a": 1, "b": "two"}]));

        let saved = export_rows(&data, &XlsxSheetWriter, &EncodeOptions::default(), &target, &progress)
            .unwrap();

        let path = dir.path().join("UploadedData.xlsx");
        assert!(path.exists());
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len() as u64, saved.size_bytes);
        assert_eq!(read_sheet(&bytes).get((1, 1)), Some(&Data::String("two".into())));
    }
}
