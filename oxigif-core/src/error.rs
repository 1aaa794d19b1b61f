//! Error types for OxiGIF operations.
//!
//! These errors cover contract violations only: bad arguments, I/O failures
//! and calls made in the wrong state. Malformed GIF data never produces a
//! [`GifError`]; it is recorded as an [`ErrorState`](crate::ErrorState) on
//! the component that was being parsed.

use std::io;
use thiserror::Error;

/// The main error type for OxiGIF operations.
#[derive(Debug, Error)]
pub enum GifError {
    /// I/O error from underlying reader/writer or file system.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An argument was rejected by a constructor or setter.
    #[error("Invalid argument `{name}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// A numeric argument was outside its permitted range.
    #[error("Value {value} for `{name}` is out of range {min}..={max}")]
    OutOfRange {
        /// Name of the offending argument.
        name: &'static str,
        /// Value supplied.
        value: i64,
        /// Smallest permitted value.
        min: i64,
        /// Largest permitted value.
        max: i64,
    },

    /// Operation not valid for the object's current state or mode.
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of the problem.
        message: String,
    },

    /// An Adobe colour table stream had the wrong length.
    #[error("Palette stream is {length} bytes long, expected {expected}")]
    InvalidPaletteLength {
        /// Number of bytes found.
        length: usize,
        /// Number of bytes required.
        expected: usize,
    },
}

/// Result type alias for OxiGIF operations.
pub type Result<T> = std::result::Result<T, GifError>;

impl GifError {
    /// Create an invalid argument error.
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    /// Create an out of range error.
    pub fn out_of_range(name: &'static str, value: i64, min: i64, max: i64) -> Self {
        Self::OutOfRange {
            name,
            value,
            min,
            max,
        }
    }

    /// Create an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create an invalid palette length error.
    pub fn invalid_palette_length(length: usize, expected: usize) -> Self {
        Self::InvalidPaletteLength { length, expected }
    }

    /// Check `value` against an inclusive range, naming the argument on failure.
    pub fn check_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
        if value < min || value > max {
            Err(Self::out_of_range(name, value, min, max))
        } else {
            Ok(())
        }
    }
}
