//! Image descriptor: position, size and local colour table layout of a frame.

use oxigif_core::{ComponentStatus, ErrorState, GifComponent, GifError, ReadBytesExt, Result, WriteBytesExt};
use std::io::{Read, Write};

const LCT_FLAG: u8 = 0b1000_0000;
const INTERLACE_FLAG: u8 = 0b0100_0000;
const SORT_FLAG: u8 = 0b0010_0000;
const SIZE_MASK: u8 = 0b0000_0111;

/// The nine bytes following an image separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    has_local_colour_table: bool,
    is_interlaced: bool,
    lct_is_sorted: bool,
    lct_size_bits: u8,
    status: ComponentStatus,
}

impl ImageDescriptor {
    /// A non-interlaced image without a local colour table.
    pub fn new(left: u16, top: u16, width: u16, height: u16) -> Self {
        Self {
            left,
            top,
            width,
            height,
            has_local_colour_table: false,
            is_interlaced: false,
            lct_is_sorted: false,
            lct_size_bits: 0,
            status: ComponentStatus::new(),
        }
    }

    /// Declare a local colour table of `2^(size_bits + 1)` entries.
    pub fn with_local_colour_table(mut self, size_bits: u8, sorted: bool) -> Result<Self> {
        GifError::check_range("size_bits", size_bits as i64, 0, 7)?;
        self.has_local_colour_table = true;
        self.lct_size_bits = size_bits;
        self.lct_is_sorted = sorted;
        Ok(self)
    }

    /// Mark the image rows as interlaced.
    pub fn with_interlace(mut self, interlaced: bool) -> Self {
        self.is_interlaced = interlaced;
        self
    }

    /// Read the descriptor (the separator byte must already be consumed).
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Self {
        let bytes = reader.read_up_to(9);
        let mut descriptor = Self::new(0, 0, 0, 0);
        if bytes.len() < 9 {
            descriptor.status.set(
                ErrorState::END_OF_INPUT_STREAM,
                format!("End of input stream reached after {} of 9 image descriptor bytes", bytes.len()),
            );
        }
        let byte = |i: usize| bytes.get(i).copied().unwrap_or(0);
        let word = |i: usize| u16::from_le_bytes([byte(i), byte(i + 1)]);

        descriptor.left = word(0);
        descriptor.top = word(2);
        descriptor.width = word(4);
        descriptor.height = word(6);
        let packed = byte(8);
        descriptor.has_local_colour_table = packed & LCT_FLAG != 0;
        descriptor.is_interlaced = packed & INTERLACE_FLAG != 0;
        descriptor.lct_is_sorted = packed & SORT_FLAG != 0;
        descriptor.lct_size_bits = packed & SIZE_MASK;
        descriptor
    }

    /// Write the nine descriptor bytes (without the separator).
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(self.left)?;
        writer.write_le(self.top)?;
        writer.write_le(self.width)?;
        writer.write_le(self.height)?;
        let mut packed = self.lct_size_bits;
        if self.has_local_colour_table {
            packed |= LCT_FLAG;
        }
        if self.is_interlaced {
            packed |= INTERLACE_FLAG;
        }
        if self.lct_is_sorted {
            packed |= SORT_FLAG;
        }
        writer.write_le(packed)?;
        Ok(())
    }

    /// Left edge on the logical screen.
    pub fn left(&self) -> u16 {
        self.left
    }

    /// Top edge on the logical screen.
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Image width.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Image height.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of pixels the image data must decode to.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether a local colour table follows.
    pub fn has_local_colour_table(&self) -> bool {
        self.has_local_colour_table
    }

    /// Whether rows are stored in interlaced order.
    pub fn is_interlaced(&self) -> bool {
        self.is_interlaced
    }

    /// Whether the local colour table is sorted.
    pub fn lct_is_sorted(&self) -> bool {
        self.lct_is_sorted
    }

    /// Size field of the local colour table.
    pub fn lct_size_bits(&self) -> u8 {
        self.lct_size_bits
    }

    /// Number of entries in the local colour table.
    pub fn lct_size(&self) -> usize {
        2 << self.lct_size_bits
    }
}

impl GifComponent for ImageDescriptor {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_roundtrip() {
        let descriptor = ImageDescriptor::new(5, 6, 300, 2)
            .with_local_colour_table(3, true)
            .unwrap()
            .with_interlace(true);
        let mut out = Vec::new();
        descriptor.write_to(&mut out).unwrap();
        assert_eq!(out, vec![5, 0, 6, 0, 0x2C, 0x01, 2, 0, 0b1110_0011]);
        let read = ImageDescriptor::read_from(&mut Cursor::new(out));
        assert_eq!(read, descriptor);
        assert_eq!(read.lct_size(), 16);
        assert_eq!(read.pixel_count(), 600);
    }

    #[test]
    fn test_truncated() {
        let read = ImageDescriptor::read_from(&mut Cursor::new(vec![1, 0, 2]));
        assert_eq!(read.left(), 1);
        assert!(read.test_state(ErrorState::END_OF_INPUT_STREAM));
    }
}
