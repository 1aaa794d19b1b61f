//! LZW decoder (decompression).
//!
//! The decoder never fails on corrupt input. It returns whatever pixels it
//! managed to produce together with a [`DecodeEnd`] describing why it
//! stopped, and leaves the interpretation to the caller.

use crate::bitstream_lsb::LsbBitReader;
use crate::config::{LzwConfig, MAX_BITS};
use crate::dictionary::DecodeTable;

/// Why decoding stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeEnd {
    /// An end-of-information code was read.
    EndOfInformation,
    /// The requested number of pixels was produced first.
    PixelCountReached,
    /// The compressed data ran out before either of the above.
    DataExhausted,
    /// A code that was not (yet) in the dictionary was read.
    UnknownCode(u16),
}

/// Result of a decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded palette indices, never longer than the requested count.
    pub indices: Vec<u8>,
    /// Why decoding stopped.
    pub end: DecodeEnd,
}

/// LZW decoder for GIF image data.
#[derive(Debug)]
pub struct LzwDecoder {
    config: LzwConfig,
    table: DecodeTable,
}

impl LzwDecoder {
    /// Create a new decoder.
    pub fn new(config: LzwConfig) -> Self {
        Self {
            config,
            table: DecodeTable::new(config),
        }
    }

    /// Decode a packed code stream (sub-block framing already removed).
    ///
    /// Decoding stops at the end-of-information code, once `pixel_count`
    /// indices have been produced, when the data runs out, or at the first
    /// unknown code.
    pub fn decode(&mut self, data: &[u8], pixel_count: usize) -> Decoded {
        let mut reader = LsbBitReader::new(data);
        let mut indices = Vec::with_capacity(pixel_count);
        let clear = self.config.clear_code();
        let eoi = self.config.eoi_code();
        let mut width = self.config.initial_bits();
        let mut prev: Option<u16> = None;
        self.table.reset();

        let end = loop {
            if indices.len() >= pixel_count {
                break DecodeEnd::PixelCountReached;
            }

            let Ok(code) = reader.read_bits(width) else {
                break DecodeEnd::DataExhausted;
            };

            if code == clear {
                self.table.reset();
                width = self.config.initial_bits();
                prev = None;
                continue;
            }
            if code == eoi {
                break DecodeEnd::EndOfInformation;
            }

            if self.table.contains(code) {
                self.table.expand_into(code, &mut indices);
                if let Some(p) = prev {
                    let first = self.table.first_byte(code);
                    self.table.insert(p, first);
                }
            } else if code == self.table.next_code()
                && let Some(p) = prev
            {
                // KwKwK: the code being defined is the previous string plus
                // its own first byte.
                let first = self.table.first_byte(p);
                self.table.insert(p, first);
                self.table.expand_into(code, &mut indices);
            } else {
                break DecodeEnd::UnknownCode(code);
            }
            prev = Some(code);

            if self.table.next_code() >= (1 << width) && width < MAX_BITS {
                width += 1;
            }
        };

        indices.truncate(pixel_count);
        tracing::debug!(
            pixels = indices.len(),
            requested = pixel_count,
            bits_read = reader.bits_read(),
            end = ?end,
            "LZW image data decoded"
        );
        Decoded { indices, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream_lsb::LsbBitWriter;
    use crate::encoder::LzwEncoder;

    fn roundtrip(pixels: &[u8], min_code_size: u8) -> Decoded {
        let config = LzwConfig::for_encoding(min_code_size).unwrap();
        let compressed = LzwEncoder::new(config).unwrap().encode(pixels).unwrap();
        LzwDecoder::new(config).decode(&compressed, pixels.len())
    }

    #[test]
    fn test_single_pixel() {
        let decoded = roundtrip(&[0], 2);
        assert_eq!(decoded.indices, vec![0]);
    }

    #[test]
    fn test_eoi_after_pixels() {
        let config = LzwConfig::for_encoding(2).unwrap();
        let compressed = LzwEncoder::new(config).unwrap().encode(&[1, 2, 3]).unwrap();
        // Ask for more pixels than were encoded so the EOI code is reached.
        let decoded = LzwDecoder::new(config).decode(&compressed, 10);
        assert_eq!(decoded.indices, vec![1, 2, 3]);
        assert_eq!(decoded.end, DecodeEnd::EndOfInformation);
    }

    #[test]
    fn test_kwkwk() {
        let pixels = vec![3u8; 100];
        let decoded = roundtrip(&pixels, 2);
        assert_eq!(decoded.indices, pixels);
    }

    #[test]
    fn test_unknown_code() {
        // clear(4) then code 7, which is beyond the empty dictionary.
        let mut writer = LsbBitWriter::new();
        writer.write_bits(4, 3).unwrap();
        writer.write_bits(7, 3).unwrap();
        let data = writer.into_vec();

        let decoded = LzwDecoder::new(LzwConfig::new(2).unwrap()).decode(&data, 4);
        assert_eq!(decoded.end, DecodeEnd::UnknownCode(7));
        assert!(decoded.indices.is_empty());
    }

    #[test]
    fn test_data_exhausted() {
        let decoded = LzwDecoder::new(LzwConfig::EIGHT_BIT).decode(&[], 4);
        assert_eq!(decoded.end, DecodeEnd::DataExhausted);
        assert!(decoded.indices.is_empty());
    }

    #[test]
    fn test_zero_pixels() {
        let decoded = LzwDecoder::new(LzwConfig::EIGHT_BIT).decode(&[0xFF, 0xFF], 0);
        assert_eq!(decoded.end, DecodeEnd::PixelCountReached);
        assert!(decoded.indices.is_empty());
    }

    #[test]
    fn test_table_overflow_clears() {
        // Enough distinct pairs to fill the 4096-entry table several times.
        let pixels: Vec<u8> = (0..100_000u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
            .collect();
        let decoded = roundtrip(&pixels, 8);
        assert_eq!(decoded.indices, pixels);
    }
}
