use rust_xlsxwriter::{Workbook, XlsxError};

use crate::error::AppError;
use crate::export::buffer::WriterOutput;
use crate::export::create_header_format;
use crate::export::sheet::{Cell, SheetModel};

/// Serializes a sheet into spreadsheet bytes.
pub trait SheetWriter {
    fn write_buffer(&self, sheet: &SheetModel) -> Result<WriterOutput, AppError>;
}

/// Writes `.xlsx` documents with `rust_xlsxwriter`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxSheetWriter;

fn xlsx_err(e: XlsxError) -> AppError {
    AppError::Serialization(e.to_string())
}

impl SheetWriter for XlsxSheetWriter {
    fn write_buffer(&self, sheet: &SheetModel) -> Result<WriterOutput, AppError> {
        let mut wb = Workbook::new();
        write_sheet(&mut wb, sheet).map_err(xlsx_err)?;
        let bytes = wb.save_to_buffer().map_err(xlsx_err)?;
        Ok(WriterOutput::RawBuffer(bytes))
    }
}

fn write_sheet(wb: &mut Workbook, sheet: &SheetModel) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name(&sheet.name)?;

    let hdr = create_header_format();
    for (col, column) in sheet.columns.iter().enumerate() {
        let col = col as u16;
        ws.write_with_format(0, col, column.key.as_str(), &hdr)?;
        ws.set_column_width(col, column.width)?;
    }

    for (i, cells) in sheet.rows.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    ws.write_string(row, col, s.as_str())?;
                }
                Cell::Number(n) => {
                    ws.write_number(row, col, *n)?;
                }
                Cell::Bool(b) => {
                    ws.write_boolean(row, col, *b)?;
                }
            }
        }
    }

    if !sheet.columns.is_empty() {
        ws.set_freeze_panes(1, 0)?;
    }

    Ok(())
}
