//! Quantizer error types.

use oxigif_core::GifError;
use thiserror::Error;

/// Errors raised when a quantizer is configured incorrectly.
#[derive(Debug, Error)]
pub enum QuantError {
    /// Target colour count outside 1..=255.
    #[error("Invalid maximum colour count: {0} (must be 1-255)")]
    InvalidMaxColours(usize),

    /// Colour depth outside 1..=8 bits.
    #[error("Invalid colour bits: {0} (must be 1-8)")]
    InvalidColourBits(u8),

    /// A palette quantizer was given no colours to map to.
    #[error("Palette is empty")]
    EmptyPalette,

    /// A supplied palette held more than 256 colours.
    #[error("Palette has {0} colours, at most 256 are allowed")]
    PaletteTooLarge(usize),
}

/// Result type for quantizer operations.
pub type Result<T> = std::result::Result<T, QuantError>;

impl From<QuantError> for GifError {
    fn from(err: QuantError) -> Self {
        match err {
            QuantError::InvalidMaxColours(n) => GifError::out_of_range("max_colours", n as i64, 1, 255),
            QuantError::InvalidColourBits(n) => GifError::out_of_range("max_colour_bits", n as i64, 1, 8),
            QuantError::EmptyPalette => GifError::invalid_argument("palette", "palette is empty"),
            QuantError::PaletteTooLarge(n) => {
                GifError::invalid_argument("palette", format!("{n} colours, at most 256 allowed"))
            }
        }
    }
}
