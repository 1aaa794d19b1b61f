//! Adobe colour table (`.act`) palettes.
//!
//! An ACT file is 256 RGB triples, 768 bytes. Some tools append four more
//! bytes (colour count and transparent index); anything past the first 768
//! bytes is ignored.

use crate::colour_table::ColourTable;
use oxigif_core::{Colour, GifError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::ops::Index;
use std::path::Path;

/// Number of colours in an ACT palette.
pub const PALETTE_COLOURS: usize = 256;
/// Length in bytes of an ACT palette.
pub const PALETTE_BYTES: usize = PALETTE_COLOURS * 3;

/// A 256 colour palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colours: Vec<Colour>,
}

impl Palette {
    /// Create a palette from up to 256 colours, padding with black.
    pub fn from_colours(mut colours: Vec<Colour>) -> Result<Self> {
        GifError::check_range("colours.len()", colours.len() as i64, 0, PALETTE_COLOURS as i64)?;
        colours.resize(PALETTE_COLOURS, Colour::BLACK);
        Ok(Self { colours })
    }

    /// Read an ACT stream. Fewer than 768 bytes is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut bytes = Vec::with_capacity(PALETTE_BYTES);
        // One byte past the palette is enough to tell "longer" from "exact".
        reader.take(PALETTE_BYTES as u64 + 1).read_to_end(&mut bytes)?;
        if bytes.len() < PALETTE_BYTES {
            return Err(GifError::invalid_palette_length(bytes.len(), PALETTE_BYTES));
        }
        if bytes.len() > PALETTE_BYTES {
            tracing::debug!("palette stream longer than {PALETTE_BYTES} bytes, ignoring the rest");
        }
        let colours = bytes[..PALETTE_BYTES]
            .chunks_exact(3)
            .map(|rgb| Colour::rgb(rgb[0], rgb[1], rgb[2]))
            .collect();
        Ok(Self { colours })
    }

    /// Read an ACT file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Write the 768 byte ACT representation.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut bytes = Vec::with_capacity(PALETTE_BYTES);
        for c in &self.colours {
            bytes.extend_from_slice(&[c.r, c.g, c.b]);
        }
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Write an ACT file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// The 256 colours.
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    /// The palette as a GIF colour table.
    pub fn to_colour_table(&self) -> Result<ColourTable> {
        ColourTable::new(self.colours.clone())
    }
}

impl From<&ColourTable> for Palette {
    /// Take the first 256 entries of a colour table, padding with black.
    fn from(table: &ColourTable) -> Self {
        let mut colours: Vec<Colour> = table.colours().iter().map(|c| c.opaque()).collect();
        colours.resize(PALETTE_COLOURS, Colour::BLACK);
        Self { colours }
    }
}

impl Index<usize> for Palette {
    type Output = Colour;

    fn index(&self, index: usize) -> &Colour {
        &self.colours[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn act_bytes(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_read_exact() {
        let palette = Palette::from_reader(Cursor::new(act_bytes(768))).unwrap();
        assert_eq!(palette.colours().len(), 256);
        assert_eq!(palette[1], Colour::rgb(3, 4, 5));
        let mut out = Vec::new();
        palette.write_to(&mut out).unwrap();
        assert_eq!(out, act_bytes(768));
    }

    #[test]
    fn test_longer_truncated() {
        let palette = Palette::from_reader(Cursor::new(act_bytes(772))).unwrap();
        assert_eq!(palette, Palette::from_reader(Cursor::new(act_bytes(768))).unwrap());
    }

    #[test]
    fn test_shorter_rejected() {
        let err = Palette::from_reader(Cursor::new(act_bytes(767))).unwrap_err();
        assert!(matches!(
            err,
            GifError::InvalidPaletteLength {
                length: 767,
                expected: 768
            }
        ));
    }

    #[test]
    fn test_from_colours_pads() {
        let palette = Palette::from_colours(vec![Colour::WHITE]).unwrap();
        assert_eq!(palette[0], Colour::WHITE);
        assert_eq!(palette[255], Colour::BLACK);
        assert!(Palette::from_colours(vec![Colour::WHITE; 257]).is_err());
        assert_eq!(palette.to_colour_table().unwrap().len(), 256);
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("oxigif-palette-{}.act", std::process::id()));
        let palette = Palette::from_colours(vec![Colour::rgb(1, 2, 3), Colour::rgb(4, 5, 6)]).unwrap();
        palette.write_to_file(&path).unwrap();
        let read = Palette::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(read, palette);
    }
}
