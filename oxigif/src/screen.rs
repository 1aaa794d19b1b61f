//! Logical screen descriptor.

use oxigif_core::{ComponentStatus, ErrorState, GifComponent, GifError, ReadBytesExt, Result, WriteBytesExt};
use std::io::{Read, Write};

const GCT_FLAG: u8 = 0b1000_0000;
const COLOUR_RESOLUTION_MASK: u8 = 0b0111_0000;
const SORT_FLAG: u8 = 0b0000_1000;
const SIZE_MASK: u8 = 0b0000_0111;

/// Screen size, global colour table layout and background colour.
///
/// A colour table of `size_bits` holds `2^(size_bits + 1)` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalScreenDescriptor {
    width: u16,
    height: u16,
    has_global_colour_table: bool,
    colour_resolution: u8,
    gct_is_sorted: bool,
    gct_size_bits: u8,
    background_colour_index: u8,
    pixel_aspect_ratio: u8,
    status: ComponentStatus,
}

fn check_bits(name: &'static str, value: u8) -> Result<()> {
    GifError::check_range(name, value as i64, 0, 7)
}

impl LogicalScreenDescriptor {
    /// A screen of the given size with no global colour table.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            has_global_colour_table: false,
            colour_resolution: 7,
            gct_is_sorted: false,
            gct_size_bits: 0,
            background_colour_index: 0,
            pixel_aspect_ratio: 0,
            status: ComponentStatus::new(),
        }
    }

    /// Declare a global colour table of `2^(size_bits + 1)` entries.
    pub fn with_global_colour_table(mut self, size_bits: u8, sorted: bool) -> Result<Self> {
        check_bits("size_bits", size_bits)?;
        self.has_global_colour_table = true;
        self.gct_size_bits = size_bits;
        self.gct_is_sorted = sorted;
        Ok(self)
    }

    /// Set the colour resolution field (0 to 7).
    pub fn with_colour_resolution(mut self, colour_resolution: u8) -> Result<Self> {
        check_bits("colour_resolution", colour_resolution)?;
        self.colour_resolution = colour_resolution;
        Ok(self)
    }

    /// Set the background colour index.
    pub fn with_background_colour_index(mut self, index: u8) -> Self {
        self.background_colour_index = index;
        self
    }

    /// Set the raw pixel aspect ratio byte.
    pub fn with_pixel_aspect_ratio(mut self, ratio: u8) -> Self {
        self.pixel_aspect_ratio = ratio;
        self
    }

    /// Read the seven descriptor bytes. Missing bytes leave zeroed fields
    /// and flag [`ErrorState::END_OF_INPUT_STREAM`].
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Self {
        let bytes = reader.read_up_to(7);
        let mut lsd = Self::new(0, 0);
        if bytes.len() < 7 {
            lsd.status.set(
                ErrorState::END_OF_INPUT_STREAM,
                format!(
                    "End of input stream reached after {} of 7 logical screen descriptor bytes",
                    bytes.len()
                ),
            );
        }
        let byte = |i: usize| bytes.get(i).copied().unwrap_or(0);

        lsd.width = u16::from_le_bytes([byte(0), byte(1)]);
        lsd.height = u16::from_le_bytes([byte(2), byte(3)]);
        let packed = byte(4);
        lsd.has_global_colour_table = packed & GCT_FLAG != 0;
        lsd.colour_resolution = (packed & COLOUR_RESOLUTION_MASK) >> 4;
        lsd.gct_is_sorted = packed & SORT_FLAG != 0;
        lsd.gct_size_bits = packed & SIZE_MASK;
        lsd.background_colour_index = byte(5);
        lsd.pixel_aspect_ratio = byte(6);
        lsd
    }

    /// Write the seven descriptor bytes.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_le(self.width)?;
        writer.write_le(self.height)?;
        writer.write_le(self.packed())?;
        writer.write_le(self.background_colour_index)?;
        writer.write_le(self.pixel_aspect_ratio)?;
        Ok(())
    }

    fn packed(&self) -> u8 {
        let mut packed = (self.colour_resolution << 4) | self.gct_size_bits;
        if self.has_global_colour_table {
            packed |= GCT_FLAG;
        }
        if self.gct_is_sorted {
            packed |= SORT_FLAG;
        }
        packed
    }

    /// Screen width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Screen height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Whether a global colour table follows.
    pub fn has_global_colour_table(&self) -> bool {
        self.has_global_colour_table
    }

    /// Colour resolution field.
    pub fn colour_resolution(&self) -> u8 {
        self.colour_resolution
    }

    /// Whether the global colour table is sorted by importance.
    pub fn gct_is_sorted(&self) -> bool {
        self.gct_is_sorted
    }

    /// Size field of the global colour table.
    pub fn gct_size_bits(&self) -> u8 {
        self.gct_size_bits
    }

    /// Number of entries in the global colour table.
    pub fn gct_size(&self) -> usize {
        2 << self.gct_size_bits
    }

    /// Index of the background colour in the global colour table.
    pub fn background_colour_index(&self) -> u8 {
        self.background_colour_index
    }

    /// Raw pixel aspect ratio byte (0 means no information).
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

impl GifComponent for LogicalScreenDescriptor {
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
        let lsd = LogicalScreenDescriptor::new(320, 200)
            .with_global_colour_table(7, false)
            .unwrap()
            .with_colour_resolution(5)
            .unwrap()
            .with_background_colour_index(3)
            .with_pixel_aspect_ratio(49);
        let mut out = Vec::new();
        lsd.write_to(&mut out).unwrap();
        assert_eq!(out, vec![0x40, 0x01, 0xC8, 0x00, 0b1101_0111, 3, 49]);

        let read = LogicalScreenDescriptor::read_from(&mut Cursor::new(out));
        assert_eq!(read, lsd);
        assert_eq!(read.gct_size(), 256);
    }

    #[test]
    fn test_rejects_bad_fields() {
        assert!(LogicalScreenDescriptor::new(1, 1).with_global_colour_table(8, false).is_err());
        assert!(LogicalScreenDescriptor::new(1, 1).with_colour_resolution(9).is_err());
    }

    #[test]
    fn test_truncated() {
        let lsd = LogicalScreenDescriptor::read_from(&mut Cursor::new(vec![10, 0, 20]));
        assert_eq!(lsd.width(), 10);
        assert_eq!(lsd.height(), 20);
        assert!(lsd.test_state(ErrorState::END_OF_INPUT_STREAM));
    }
}
