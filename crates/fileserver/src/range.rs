//! HTTP `Range` header parsing

use thiserror::Error;

/// Inclusive byte interval `[start, end]` inside a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by this range
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Whether this range spans the whole of a `file_size`-byte file
    pub fn is_full(&self, file_size: u64) -> bool {
        self.start == 0 && file_size > 0 && self.end == file_size - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The header does not follow `bytes=<start>-<end?>`
    #[error("Malformed range: {0}")]
    Malformed(String),

    /// Syntactically valid but outside the file
    #[error("Range not satisfiable. File size: {file_size}")]
    Unsatisfiable { file_size: u64 },
}

/// Parse a `Range` header against a file of `file_size` bytes
///
/// Without a header the whole file is selected. An omitted end means "to
/// EOF". An explicit end past the last byte is rejected rather than clamped
/// so that `Content-Range` always matches `Content-Length`.
pub fn parse_range(header: Option<&str>, file_size: u64) -> Result<ByteRange, RangeError> {
    let unsatisfiable = RangeError::Unsatisfiable { file_size };

    let Some(header) = header else {
        if file_size == 0 {
            return Err(unsatisfiable);
        }
        return Ok(ByteRange {
            start: 0,
            end: file_size - 1,
        });
    };

    let ranges = header
        .trim()
        .strip_prefix("bytes=")
        .ok_or_else(|| RangeError::Malformed("expected bytes= unit".to_string()))?;

    let (start, end) = ranges
        .split_once('-')
        .ok_or_else(|| RangeError::Malformed("missing '-' separator".to_string()))?;

    let start: u64 = start
        .trim()
        .parse()
        .map_err(|_| RangeError::Malformed(format!("invalid range start {:?}", start)))?;

    let end = end.trim();
    let end: u64 = if end.is_empty() {
        if file_size == 0 {
            return Err(unsatisfiable);
        }
        file_size - 1
    } else {
        end.parse()
            .map_err(|_| RangeError::Malformed(format!("invalid range end {:?}", end)))?
    };

    if end >= file_size || start > end {
        return Err(unsatisfiable);
    }

    Ok(ByteRange { start, end })
}
