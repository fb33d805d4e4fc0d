use std::sync::Arc;

use crate::error::AppError;

/// Byte container a workbook writer may hand back.
#[derive(Debug, Clone)]
pub enum WriterOutput {
    /// The writer's own buffer, covering the whole document.
    RawBuffer(Vec<u8>),
    /// A window into a larger shared buffer.
    OffsetView {
        buffer: Arc<[u8]>,
        byte_offset: usize,
        byte_length: usize,
    },
    /// A wrapper exposing `buffer`, `byteOffset` and `byteLength` members,
    /// any of which may be missing.
    BoxedBuffer(BoxedBuffer),
}

#[derive(Debug, Clone, Default)]
pub struct BoxedBuffer {
    pub buffer: Option<Arc<[u8]>>,
    pub byte_offset: Option<usize>,
    pub byte_length: Option<usize>,
}

/// Serialized workbook, owned outright. Produced once and consumed by a save.
#[derive(Debug, PartialEq, Eq)]
pub struct EncodedWorkbook(Vec<u8>);

impl EncodedWorkbook {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Copy the logical bytes of a writer output into a fresh owned buffer.
///
/// Views honour their offset and length. A boxed buffer without a backing
/// store, or any range outside the backing store, is a `BufferFormat` error.
pub fn normalize_buffer(output: &WriterOutput) -> Result<EncodedWorkbook, AppError> {
    match output {
        WriterOutput::RawBuffer(bytes) => copy_range(bytes, 0, bytes.len()),
        WriterOutput::OffsetView {
            buffer,
            byte_offset,
            byte_length,
        } => copy_range(buffer, *byte_offset, *byte_length),
        WriterOutput::BoxedBuffer(boxed) => {
            let buffer = boxed.buffer.as_ref().ok_or_else(|| {
                AppError::BufferFormat("writer returned a wrapper without a byte buffer".into())
            })?;
            let offset = boxed.byte_offset.unwrap_or(0);
            let length = boxed
                .byte_length
                .unwrap_or_else(|| buffer.len().saturating_sub(offset));
            copy_range(buffer, offset, length)
        }
    }
}

fn copy_range(src: &[u8], offset: usize, length: usize) -> Result<EncodedWorkbook, AppError> {
    let end = offset.checked_add(length).filter(|end| *end <= src.len()).ok_or_else(|| {
        AppError::BufferFormat(format!(
            "range {}+{} outside a {}-byte buffer",
            offset,
            length,
            src.len()
        ))
    })?;
    Ok(EncodedWorkbook(src[offset..end].to_vec()))
}
