//! LZW-specific error types.

use oxigif_core::GifError;
use thiserror::Error;

/// LZW compression/decompression errors.
///
/// Corrupt compressed data is not an error; the decoder reports it through
/// [`DecodeEnd`](crate::DecodeEnd). These variants cover bad arguments only.
#[derive(Debug, Error)]
pub enum LzwError {
    /// Minimum code size outside the permitted range.
    #[error("Invalid LZW minimum code size: {0}")]
    InvalidCodeSize(u8),

    /// A palette index that the minimum code size cannot represent.
    #[error("Palette index {index} does not fit minimum code size {min_code_size}")]
    IndexOutOfRange {
        /// Offending index.
        index: u8,
        /// Minimum code size in use.
        min_code_size: u8,
    },

    /// Invalid bit width specified.
    #[error("Invalid bit width: {0} (must be 1-16)")]
    InvalidBitWidth(u8),

    /// Unexpected end of data.
    #[error("Unexpected end of data at bit position {position}")]
    UnexpectedEof {
        /// Bit position where EOF occurred.
        position: u64,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for LZW operations.
pub type Result<T> = std::result::Result<T, LzwError>;

impl From<LzwError> for GifError {
    fn from(err: LzwError) -> Self {
        match err {
            LzwError::Io(e) => GifError::Io(e),
            LzwError::InvalidCodeSize(size) => {
                GifError::out_of_range("min_code_size", size as i64, 0, 8)
            }
            other => GifError::invalid_argument("pixels", other.to_string()),
        }
    }
}
