//! LZW encoder (compression).

use crate::bitstream_lsb::LsbBitWriter;
use crate::config::{LzwConfig, MAX_BITS};
use crate::dictionary::EncodeTable;
use crate::error::{LzwError, Result};
use oxigif_core::{SubBlockWriter, WriteBytesExt};
use std::io::Write;

/// LZW encoder for GIF image data.
#[derive(Debug)]
pub struct LzwEncoder {
    config: LzwConfig,
    table: EncodeTable,
}

impl LzwEncoder {
    /// Create a new LZW encoder. The minimum code size must be 2 to 8.
    pub fn new(config: LzwConfig) -> Result<Self> {
        let config = LzwConfig::for_encoding(config.min_code_size)?;
        Ok(Self {
            config,
            table: EncodeTable::new(config),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> LzwConfig {
        self.config
    }

    /// Encode palette indices into a packed LZW code stream.
    ///
    /// # Algorithm
    ///
    /// 1. Emit the clear code at `min_code_size + 1` bits
    /// 2. Extend the current string while `string + byte` is in the table
    /// 3. Otherwise emit the string's code and add `string + byte`
    /// 4. The width grows by one bit once the table reaches `2^width`
    ///    entries; at 4096 entries a clear code is emitted instead
    /// 5. Emit the final string's code and the end-of-information code
    ///
    /// Empty input still yields a clear code followed by end-of-information.
    pub fn encode(&mut self, indices: &[u8]) -> Result<Vec<u8>> {
        let clear = self.config.clear_code();
        if let Some(&index) = indices.iter().find(|&&i| i as u16 >= clear) {
            return Err(LzwError::IndexOutOfRange {
                index,
                min_code_size: self.config.min_code_size,
            });
        }

        self.table.reset();
        let initial_bits = self.config.initial_bits();
        let mut width = initial_bits;
        let mut writer = LsbBitWriter::new();
        writer.write_bits(clear, width)?;

        let Some((&head, rest)) = indices.split_first() else {
            writer.write_bits(self.config.eoi_code(), width)?;
            return Ok(writer.into_vec());
        };

        let mut current = head as u16;
        for &byte in rest {
            if let Some(code) = self.table.find(current, byte) {
                current = code;
                continue;
            }

            writer.write_bits(current, width)?;
            if self.table.next_code() >= (1 << width) && width < MAX_BITS {
                width += 1;
            }

            if self.table.is_full() {
                writer.write_bits(clear, width)?;
                self.table.reset();
                width = initial_bits;
            } else {
                self.table.insert(current, byte);
            }
            current = byte as u16;
        }

        writer.write_bits(current, width)?;
        // The decoder adds an entry for the final code too, so its width may
        // already have grown when it reads end-of-information.
        if self.table.next_code() >= (1 << width) && width < MAX_BITS {
            width += 1;
        }
        writer.write_bits(self.config.eoi_code(), width)?;

        Ok(writer.into_vec())
    }

    /// Write a complete table-based image data block: the minimum code size
    /// byte, the code stream split into sub-blocks, and the block terminator.
    pub fn encode_to<W: Write + ?Sized>(&mut self, indices: &[u8], writer: &mut W) -> Result<()> {
        let codes = self.encode(indices)?;
        writer.write_le(self.config.min_code_size)?;
        let mut blocks = SubBlockWriter::new(writer);
        blocks.write_all(&codes)?;
        blocks.finish()?;
        tracing::debug!(
            pixels = indices.len(),
            compressed = codes.len(),
            min_code_size = self.config.min_code_size,
            "LZW image data written"
        );
        Ok(())
    }
}
