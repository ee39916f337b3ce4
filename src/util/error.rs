//! Error types for detnms.

use thiserror::Error;

/// Result alias for detnms operations.
pub type DetResult<T> = std::result::Result<T, DetError>;

/// Errors that can occur while decoding detector output or suppressing boxes.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DetError {
    /// The raw buffer length is not a multiple of the record width.
    #[error("raw buffer of {len} values is not a multiple of record width {record_width}")]
    MalformedBuffer { len: usize, record_width: usize },
    /// The record width cannot hold a full detection record.
    #[error("record width {width} is smaller than the minimum of {min}")]
    InvalidRecordWidth { width: usize, min: usize },
    /// Image dimensions used for denormalization are invalid.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// Parallel candidate arrays disagree in length.
    #[error("{what} has {got} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// A record refers to a batch image that was not described.
    #[error("batch index {index} out of range for {batches} images")]
    BatchIndexOutOfRange { index: f32, batches: usize },
    /// The inference backend failed to produce an output buffer.
    #[error("inference backend failed: {reason}")]
    Backend { reason: String },
    /// Image probing failed.
    #[error("image I/O error: {reason}")]
    ImageIo { reason: String },
    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
}
