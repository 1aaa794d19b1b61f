//! Data sub-blocks.
//!
//! A GIF data sub-block is a one byte length (1-255) followed by that many
//! bytes. Sequences of sub-blocks end with a zero-length block, the block
//! terminator.

use crate::error::{GifError, Result};
use crate::status::{ComponentStatus, ErrorState, GifComponent};
use crate::stream::{ReadBytesExt, WriteBytesExt};
use std::cmp::min;
use std::io::{self, Read, Write};
use std::ops::Index;

/// Largest payload a single sub-block can hold.
pub const MAX_BLOCK_SIZE: usize = 0xFF;

/// The zero-length block that ends a sequence of sub-blocks.
pub const BLOCK_TERMINATOR: u8 = 0x00;

/// A single length-prefixed data sub-block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    declared_size: u8,
    data: Vec<u8>,
    status: ComponentStatus,
}

impl DataBlock {
    /// Create a block from a declared size and a payload.
    ///
    /// A mismatch between the two is not rejected; it is recorded as
    /// [`ErrorState::DATA_BLOCK_TOO_SHORT`] or
    /// [`ErrorState::DATA_BLOCK_TOO_LONG`].
    pub fn new(declared_size: u8, data: Vec<u8>) -> Self {
        let mut status = ComponentStatus::new();
        let actual = data.len();
        let declared = declared_size as usize;
        if actual < declared {
            status.set(
                ErrorState::DATA_BLOCK_TOO_SHORT,
                format!("Data block declared {declared} bytes but holds {actual}"),
            );
        } else if actual > declared {
            status.set(
                ErrorState::DATA_BLOCK_TOO_LONG,
                format!("Data block declared {declared} bytes but holds {actual}"),
            );
        }
        Self {
            declared_size,
            data,
            status,
        }
    }

    /// Create a block whose declared size matches its payload.
    pub fn from_data(data: Vec<u8>) -> Result<Self> {
        if data.len() > MAX_BLOCK_SIZE {
            return Err(GifError::out_of_range(
                "data.len()",
                data.len() as i64,
                0,
                MAX_BLOCK_SIZE as i64,
            ));
        }
        Ok(Self::new(data.len() as u8, data))
    }

    /// Read a block: one size byte, then up to that many bytes.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Self {
        let Some(declared_size) = reader.read_byte() else {
            let mut status = ComponentStatus::new();
            status.set(
                ErrorState::END_OF_INPUT_STREAM,
                "End of input stream reached while reading data block size",
            );
            return Self {
                declared_size: 0,
                data: Vec::new(),
                status,
            };
        };

        let data = reader.read_up_to(declared_size as usize);
        let mut block = Self::new(declared_size, data);
        if block.actual_block_size() < declared_size as usize {
            block.status.set(
                ErrorState::END_OF_INPUT_STREAM,
                "End of input stream reached while reading data block",
            );
        }
        block
    }

    /// Write the declared size byte followed by the payload.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(self.declared_size)?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Size byte as read from (or written to) the stream.
    pub fn declared_block_size(&self) -> u8 {
        self.declared_size
    }

    /// Number of payload bytes actually held.
    pub fn actual_block_size(&self) -> usize {
        self.data.len()
    }

    /// Payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether this is the zero-length block terminator.
    pub fn is_terminator(&self) -> bool {
        self.declared_size == 0 && self.status.state().is_ok()
    }
}

impl Index<usize> for DataBlock {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.data[index]
    }
}

impl GifComponent for DataBlock {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

/// A sequence of sub-blocks read up to (not including) the terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubBlocks {
    /// Blocks in stream order.
    pub blocks: Vec<DataBlock>,
    /// Whether a block terminator was seen.
    pub terminated: bool,
}

impl SubBlocks {
    /// Read sub-blocks until a zero-length block or the end of the stream.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Self {
        let mut blocks = Vec::new();
        loop {
            let block = DataBlock::read_from(reader);
            if block.is_terminator() {
                return Self {
                    blocks,
                    terminated: true,
                };
            }
            let ended = block.error_state().contains(ErrorState::END_OF_INPUT_STREAM);
            if block.actual_block_size() > 0 || block.declared_block_size() > 0 {
                blocks.push(block);
            }
            if ended {
                return Self {
                    blocks,
                    terminated: false,
                };
            }
        }
    }

    /// Concatenated payload of every block.
    pub fn concat(&self) -> Vec<u8> {
        let total = self.blocks.iter().map(DataBlock::actual_block_size).sum();
        let mut out = Vec::with_capacity(total);
        for block in &self.blocks {
            out.extend_from_slice(block.data());
        }
        out
    }

    /// Union of the blocks' own error states.
    pub fn state(&self) -> ErrorState {
        self.blocks
            .iter()
            .fold(ErrorState::OK, |acc, b| acc | b.error_state())
    }
}

/// Skip a sequence of sub-blocks, returning [`ErrorState::END_OF_INPUT_STREAM`]
/// when the stream ended before the terminator.
pub fn skip_sub_blocks<R: Read + ?Sized>(reader: &mut R) -> ErrorState {
    loop {
        let Some(size) = reader.read_byte() else {
            return ErrorState::END_OF_INPUT_STREAM;
        };
        if size == 0 {
            return ErrorState::OK;
        }
        if reader.read_up_to(size as usize).len() < size as usize {
            return ErrorState::END_OF_INPUT_STREAM | ErrorState::DATA_BLOCK_TOO_SHORT;
        }
    }
}

/// Write `data` as a sequence of full sub-blocks followed by the terminator.
pub fn write_sub_blocks<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> Result<()> {
    for chunk in data.chunks(MAX_BLOCK_SIZE) {
        writer.write_le(chunk.len() as u8)?;
        writer.write_all(chunk)?;
    }
    writer.write_le(BLOCK_TERMINATOR)?;
    Ok(())
}

/// A writer that splits everything written to it into sub-blocks of at most
/// 255 bytes. The final partial block and the terminator are written by
/// [`SubBlockWriter::finish`].
pub struct SubBlockWriter<'a, W: Write + ?Sized> {
    w: &'a mut W,
    bytes: usize,
    buf: [u8; MAX_BLOCK_SIZE],
}

impl<'a, W: Write + ?Sized> SubBlockWriter<'a, W> {
    /// Wrap `w`.
    pub fn new(w: &'a mut W) -> Self {
        Self {
            w,
            bytes: 0,
            buf: [0; MAX_BLOCK_SIZE],
        }
    }

    /// Flush the pending partial block and write the block terminator.
    pub fn finish(mut self) -> io::Result<()> {
        if self.bytes > 0 {
            self.w.write_le(self.bytes as u8)?;
            self.w.write_all(&self.buf[..self.bytes])?;
            self.bytes = 0;
        }
        self.w.write_le(BLOCK_TERMINATOR)
    }
}

impl<W: Write + ?Sized> Write for SubBlockWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let to_copy = min(buf.len(), MAX_BLOCK_SIZE - self.bytes);
        self.buf[self.bytes..self.bytes + to_copy].copy_from_slice(&buf[..to_copy]);
        self.bytes += to_copy;
        if self.bytes == MAX_BLOCK_SIZE {
            self.bytes = 0;
            self.w.write_le(MAX_BLOCK_SIZE as u8)?;
            self.w.write_all(&self.buf)?;
        }
        Ok(to_copy)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.w.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_declared_size_mismatch() {
        let block = DataBlock::new(5, vec![1, 2, 3, 4]);
        assert_eq!(block.declared_block_size(), 5);
        assert_eq!(block.actual_block_size(), 4);
        assert_eq!(block.error_state(), ErrorState::DATA_BLOCK_TOO_SHORT);

        let block = DataBlock::new(2, vec![1, 2, 3]);
        assert_eq!(block.error_state(), ErrorState::DATA_BLOCK_TOO_LONG);
    }

    #[test]
    fn test_roundtrip() {
        let block = DataBlock::from_data(vec![9, 8, 7]).unwrap();
        let mut out = Vec::new();
        block.write_to(&mut out).unwrap();
        assert_eq!(out, vec![3, 9, 8, 7]);

        let read = DataBlock::read_from(&mut Cursor::new(out));
        assert_eq!(read, block);
        assert_eq!(read[1], 8);
    }

    #[test]
    fn test_read_truncated() {
        let block = DataBlock::read_from(&mut Cursor::new(vec![4, 1, 2]));
        assert_eq!(block.declared_block_size(), 4);
        assert_eq!(block.actual_block_size(), 2);
        assert!(block.error_state().contains(ErrorState::DATA_BLOCK_TOO_SHORT));
        assert!(block.error_state().contains(ErrorState::END_OF_INPUT_STREAM));
    }

    #[test]
    fn test_read_empty_stream() {
        let block = DataBlock::read_from(&mut Cursor::new(Vec::new()));
        assert_eq!(block.error_state(), ErrorState::END_OF_INPUT_STREAM);
        assert!(!block.is_terminator());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        assert!(DataBlock::from_data(vec![0; 256]).is_err());
    }

    #[test]
    fn test_sub_blocks() {
        let data: Vec<u8> = (0..600u32).map(|i| i as u8).collect();
        let mut out = Vec::new();
        write_sub_blocks(&mut out, &data).unwrap();
        assert_eq!(out[0], 255);
        assert_eq!(*out.last().unwrap(), 0);

        let blocks = SubBlocks::read_from(&mut Cursor::new(&out));
        assert!(blocks.terminated);
        assert_eq!(blocks.blocks.len(), 3);
        assert_eq!(blocks.concat(), data);

        assert_eq!(skip_sub_blocks(&mut Cursor::new(&out)), ErrorState::OK);
    }

    #[test]
    fn test_sub_blocks_unterminated() {
        let blocks = SubBlocks::read_from(&mut Cursor::new(vec![2, 1, 2, 3, 4]));
        assert!(!blocks.terminated);
        assert_eq!(blocks.concat(), vec![1, 2, 4]);
        assert!(blocks.state().contains(ErrorState::END_OF_INPUT_STREAM));
    }

    #[test]
    fn test_sub_block_writer() {
        let mut out = Vec::new();
        {
            let mut bw = SubBlockWriter::new(&mut out);
            bw.write_all(&[7u8; 300]).unwrap();
            bw.finish().unwrap();
        }
        assert_eq!(out.len(), 1 + 255 + 1 + 45 + 1);
        assert_eq!(out[0], 255);
        assert_eq!(out[256], 45);
        assert_eq!(out[out.len() - 1], 0);
    }
}
