//! # OxiGIF-LZW: Pure Rust GIF LZW Compression
//!
//! This crate provides the variable-width LZW variant used by GIF image data.
//!
//! ## GIF LZW Format
//!
//! - **LSB-first bit order**: codes are packed from the least significant bit
//! - **Variable code size**: codes start at `min_code_size + 1` bits and grow
//!   to at most 12 bits
//! - **Clear code** (`2^min_code_size`) resets the dictionary
//! - **End-of-information code** (clear code + 1) ends the stream
//! - **Sub-blocks**: in a file the code stream is split into blocks of at
//!   most 255 bytes, preceded by the minimum code size byte
//!
//! ## Example
//!
//! ```rust
//! use oxigif_lzw::{compress, decompress};
//!
//! let pixels = [0u8, 1, 1, 0, 2, 2, 2, 3];
//! let compressed = compress(&pixels, 2).unwrap();
//! let decoded = decompress(&compressed, 2, pixels.len()).unwrap();
//! assert_eq!(decoded.indices, pixels);
//! ```
//!
//! Corrupt data does not produce an error. The decoder reports how it
//! stopped, and the caller decides what that means:
//!
//! ```rust
//! use oxigif_lzw::{DecodeEnd, decompress};
//!
//! let decoded = decompress(&[], 8, 16).unwrap();
//! assert_eq!(decoded.end, DecodeEnd::DataExhausted);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod bitstream_lsb;
mod config;
mod decoder;
mod dictionary;
mod encoder;
mod error;

pub use config::{LzwConfig, MAX_BITS, MAX_CODES, MAX_MIN_CODE_SIZE, MIN_ENCODER_CODE_SIZE};
pub use decoder::{DecodeEnd, Decoded, LzwDecoder};
pub use encoder::LzwEncoder;
pub use error::{LzwError, Result};

/// Compress palette indices into a packed GIF LZW code stream.
///
/// # Parameters
///
/// - `indices`: palette indices, each below `2^min_code_size`
/// - `min_code_size`: 2 to 8
///
/// # Example
///
/// ```rust
/// use oxigif_lzw::compress;
///
/// let compressed = compress(&[0; 64], 2).unwrap();
/// assert!(compressed.len() < 64);
/// ```
pub fn compress(indices: &[u8], min_code_size: u8) -> Result<Vec<u8>> {
    let mut encoder = LzwEncoder::new(LzwConfig::for_encoding(min_code_size)?)?;
    encoder.encode(indices)
}

/// Decompress a packed GIF LZW code stream into at most `pixel_count`
/// indices.
///
/// Only an unusable `min_code_size` (above 8) is an error.
pub fn decompress(data: &[u8], min_code_size: u8, pixel_count: usize) -> Result<Decoded> {
    let mut decoder = LzwDecoder::new(LzwConfig::new(min_code_size)?);
    Ok(decoder.decode(data, pixel_count))
}

/// Write palette indices as a complete table-based image data block,
/// choosing the smallest minimum code size that fits the largest index.
pub fn write_image_data<W: std::io::Write + ?Sized>(indices: &[u8], writer: &mut W) -> Result<()> {
    let max_index = indices.iter().copied().max().unwrap_or(0);
    let mut encoder = LzwEncoder::new(LzwConfig::for_max_index(max_index))?;
    encoder.encode_to(indices, writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_simple() {
        let original = b"TOBEORNOTTOBEORTOBEORNOT";
        let compressed = compress(original, 8).unwrap();
        let decoded = decompress(&compressed, 8, original.len()).unwrap();
        assert_eq!(decoded.indices, original);
    }

    #[test]
    fn test_empty_input() {
        let compressed = compress(&[], 2).unwrap();
        let decoded = decompress(&compressed, 2, 0).unwrap();
        assert!(decoded.indices.is_empty());
    }

    #[test]
    fn test_all_byte_values() {
        let original: Vec<u8> = (0..=255).collect();
        let compressed = compress(&original, 8).unwrap();
        let decoded = decompress(&compressed, 8, original.len()).unwrap();
        assert_eq!(decoded.indices, original);
    }

    #[test]
    fn test_large_input() {
        let original = b"The quick brown fox jumps over the lazy dog. ".repeat(500);
        let compressed = compress(&original, 8).unwrap();
        let decoded = decompress(&compressed, 8, original.len()).unwrap();
        assert_eq!(decoded.indices, original);
    }

    #[test]
    fn test_write_image_data_code_size() {
        let mut out = Vec::new();
        write_image_data(&[0, 1, 2, 9], &mut out).unwrap();
        assert_eq!(out[0], 4);

        out.clear();
        write_image_data(&[], &mut out).unwrap();
        assert_eq!(out[0], 2);
    }

    #[test]
    fn test_oversized_code_size_rejected() {
        assert!(matches!(decompress(&[], 9, 1), Err(LzwError::InvalidCodeSize(9))));
    }
}
