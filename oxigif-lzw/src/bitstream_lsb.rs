//! LSB-first bit stream operations for GIF LZW.
//!
//! GIF packs codes starting at the least significant bit of each byte, the
//! opposite of TIFF.

use crate::error::{LzwError, Result};

/// LSB-first bit reader for LZW decompression.
#[derive(Debug)]
pub struct LsbBitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Current byte position.
    byte_pos: usize,
    /// Bit buffer, next bit at bit 0.
    buffer: u32,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
}

impl<'a> LsbBitReader<'a> {
    /// Create a new LSB bit reader.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    #[inline]
    fn fill_buffer(&mut self, count: u8) -> Result<()> {
        while self.bits_in_buffer < count && self.byte_pos < self.data.len() {
            let byte = self.data[self.byte_pos];
            self.byte_pos += 1;
            self.buffer |= (byte as u32) << self.bits_in_buffer;
            self.bits_in_buffer += 8;
        }

        if self.bits_in_buffer < count {
            return Err(LzwError::UnexpectedEof {
                position: self.total_bits_read,
            });
        }

        Ok(())
    }

    /// Read up to 16 bits from the stream (LSB-first).
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        if count == 0 || count > 16 {
            return Err(LzwError::InvalidBitWidth(count));
        }

        self.fill_buffer(count)?;

        let mask = (1u32 << count) - 1;
        let value = self.buffer & mask;
        self.buffer >>= count;
        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;

        Ok(value as u16)
    }

    /// Get total bits read.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }
}

/// LSB-first bit writer for LZW compression.
#[derive(Debug, Default)]
pub struct LsbBitWriter {
    output: Vec<u8>,
    buffer: u32,
    bits_in_buffer: u8,
}

impl LsbBitWriter {
    /// Create a new LSB bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write up to 16 bits to the stream (LSB-first).
    pub fn write_bits(&mut self, value: u16, count: u8) -> Result<()> {
        if count == 0 || count > 16 {
            return Err(LzwError::InvalidBitWidth(count));
        }

        self.buffer |= (value as u32 & ((1u32 << count) - 1)) << self.bits_in_buffer;
        self.bits_in_buffer += count;

        while self.bits_in_buffer >= 8 {
            self.output.push(self.buffer as u8);
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }

        Ok(())
    }

    /// Flush remaining bits, padding the high bits of the last byte with zeros.
    pub fn flush(&mut self) {
        if self.bits_in_buffer > 0 {
            self.output.push(self.buffer as u8);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    /// Get the output data.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lsb_roundtrip() {
        let mut writer = LsbBitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b1100, 4).unwrap();
        writer.write_bits(0b1_0000_0001, 9).unwrap();

        let data = writer.into_vec();
        assert_eq!(data.len(), 2);

        let mut reader = LsbBitReader::new(&data);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
        assert_eq!(reader.read_bits(9).unwrap(), 0b1_0000_0001);
        assert_eq!(reader.bits_read(), 16);
    }

    #[test]
    fn test_lsb_bit_order() {
        // Clear code 4 then EOI 5 at 3 bits: 100 then 101 from bit 0 up.
        let mut writer = LsbBitWriter::new();
        writer.write_bits(4, 3).unwrap();
        writer.write_bits(5, 3).unwrap();
        assert_eq!(writer.into_vec(), vec![0b0010_1100]);
    }

    #[test]
    fn test_read_past_end() {
        let data = [0xFFu8];
        let mut reader = LsbBitReader::new(&data);
        assert_eq!(reader.read_bits(5).unwrap(), 0x1F);
        assert!(matches!(
            reader.read_bits(5),
            Err(LzwError::UnexpectedEof { position: 5 })
        ));
    }
}
