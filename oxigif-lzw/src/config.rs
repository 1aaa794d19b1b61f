//! LZW code-size configuration for GIF image data.

use crate::error::{LzwError, Result};

/// Widest code GIF allows.
pub const MAX_BITS: u8 = 12;

/// Number of codes a 12-bit dictionary can hold.
pub const MAX_CODES: u16 = 1 << MAX_BITS;

/// Largest minimum code size a GIF image may declare.
pub const MAX_MIN_CODE_SIZE: u8 = 8;

/// Smallest minimum code size an encoder writes.
pub const MIN_ENCODER_CODE_SIZE: u8 = 2;

/// LZW configuration parameters.
///
/// GIF derives every special code from the minimum code size stored in
/// front of the image data:
///
/// - clear code = `2^min_code_size`
/// - end-of-information code = clear code + 1
/// - first dictionary code = clear code + 2
/// - initial code width = `min_code_size + 1` bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzwConfig {
    /// Minimum code size in bits (the number of bits of a literal index).
    pub min_code_size: u8,
}

impl LzwConfig {
    /// Configuration for 8-bit palette indices.
    pub const EIGHT_BIT: Self = Self { min_code_size: 8 };

    /// Create a configuration for decoding. Any size up to 8 is accepted.
    pub fn new(min_code_size: u8) -> Result<Self> {
        if min_code_size > MAX_MIN_CODE_SIZE {
            return Err(LzwError::InvalidCodeSize(min_code_size));
        }
        Ok(Self { min_code_size })
    }

    /// Create a configuration for encoding (2 to 8 bits).
    pub fn for_encoding(min_code_size: u8) -> Result<Self> {
        if !(MIN_ENCODER_CODE_SIZE..=MAX_MIN_CODE_SIZE).contains(&min_code_size) {
            return Err(LzwError::InvalidCodeSize(min_code_size));
        }
        Ok(Self { min_code_size })
    }

    /// Smallest encoder configuration able to represent `max_index`.
    pub fn for_max_index(max_index: u8) -> Self {
        let bits = (u8::BITS - max_index.leading_zeros()) as u8;
        Self {
            min_code_size: bits.max(MIN_ENCODER_CODE_SIZE),
        }
    }

    /// Smallest encoder configuration for a colour table of `colours` entries.
    pub fn for_colour_count(colours: usize) -> Self {
        let max_index = colours.saturating_sub(1).min(u8::MAX as usize) as u8;
        Self::for_max_index(max_index)
    }

    /// Get the clear code value.
    pub fn clear_code(&self) -> u16 {
        1 << self.min_code_size
    }

    /// Get the end-of-information code value (clear_code + 1).
    pub fn eoi_code(&self) -> u16 {
        self.clear_code() + 1
    }

    /// Get the first available code for dictionary entries.
    pub fn first_code(&self) -> u16 {
        self.eoi_code() + 1
    }

    /// Code width in bits after a clear code.
    pub fn initial_bits(&self) -> u8 {
        self.min_code_size + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_bit_config() {
        let config = LzwConfig::EIGHT_BIT;
        assert_eq!(config.clear_code(), 256);
        assert_eq!(config.eoi_code(), 257);
        assert_eq!(config.first_code(), 258);
        assert_eq!(config.initial_bits(), 9);
    }

    #[test]
    fn test_two_bit_config() {
        let config = LzwConfig::for_encoding(2).unwrap();
        assert_eq!(config.clear_code(), 4);
        assert_eq!(config.eoi_code(), 5);
        assert_eq!(config.first_code(), 6);
        assert_eq!(config.initial_bits(), 3);
    }

    #[test]
    fn test_code_size_limits() {
        assert!(LzwConfig::new(9).is_err());
        assert!(LzwConfig::new(1).is_ok());
        assert!(LzwConfig::for_encoding(1).is_err());
        assert!(LzwConfig::for_encoding(8).is_ok());
    }

    #[test]
    fn test_for_max_index() {
        assert_eq!(LzwConfig::for_max_index(0).min_code_size, 2);
        assert_eq!(LzwConfig::for_max_index(3).min_code_size, 2);
        assert_eq!(LzwConfig::for_max_index(4).min_code_size, 3);
        assert_eq!(LzwConfig::for_max_index(255).min_code_size, 8);
        assert_eq!(LzwConfig::for_colour_count(256).min_code_size, 8);
        assert_eq!(LzwConfig::for_colour_count(16).min_code_size, 4);
    }
}
