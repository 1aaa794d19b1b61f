//! Global and local colour tables.

use oxigif_core::{
    Colour, ComponentStatus, ErrorState, GifComponent, GifError, ReadBytesExt, Result, nearest_colour_index,
};
use std::io::{Read, Write};
use std::ops::Index;

/// Largest colour table GIF allows.
pub const MAX_COLOURS: usize = 256;

/// An ordered list of up to 256 RGB colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColourTable {
    colours: Vec<Colour>,
    status: ComponentStatus,
}

impl ColourTable {
    /// Create a table from 1 to 256 colours.
    pub fn new(colours: Vec<Colour>) -> Result<Self> {
        GifError::check_range("colours.len()", colours.len() as i64, 1, MAX_COLOURS as i64)?;
        Ok(Self {
            colours,
            status: ComponentStatus::new(),
        })
    }

    /// Read `count` RGB triples.
    ///
    /// If the stream ends first the remaining entries are transparent black
    /// and both [`ErrorState::COLOUR_TABLE_TOO_SHORT`] and
    /// [`ErrorState::END_OF_INPUT_STREAM`] are set.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, count: usize) -> Self {
        let bytes = reader.read_up_to(count * 3);
        let mut colours: Vec<Colour> = bytes
            .chunks_exact(3)
            .map(|rgb| Colour::rgb(rgb[0], rgb[1], rgb[2]))
            .collect();

        let mut status = ComponentStatus::new();
        if colours.len() < count {
            status.set(
                ErrorState::COLOUR_TABLE_TOO_SHORT | ErrorState::END_OF_INPUT_STREAM,
                format!(
                    "Colour table should hold {count} colours but the stream ended after {}",
                    colours.len()
                ),
            );
            colours.resize(count, Colour::TRANSPARENT);
        }
        Self { colours, status }
    }

    /// Write every entry as an RGB triple.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut bytes = Vec::with_capacity(self.colours.len() * 3);
        for c in &self.colours {
            bytes.extend_from_slice(&[c.r, c.g, c.b]);
        }
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// A copy padded with black to a power of two of at least `min_len`
    /// entries, as the stream format requires.
    pub fn padded(&self, min_len: usize) -> Self {
        let len = self.colours.len().max(min_len).next_power_of_two().min(MAX_COLOURS);
        let mut colours = self.colours.clone();
        if colours.len() < len {
            colours.resize(len, Colour::BLACK);
        }
        Self {
            colours,
            status: self.status.clone(),
        }
    }

    /// Value of the 3-bit size field describing this table: the smallest `n`
    /// with `2^(n + 1) >= len`.
    pub fn size_bits(&self) -> u8 {
        let mut bits = 0u8;
        while (2usize << bits) < self.colours.len() && bits < 7 {
            bits += 1;
        }
        bits
    }

    /// Index of the entry closest to `colour`.
    pub fn nearest_index(&self, colour: &Colour) -> Option<u8> {
        nearest_colour_index(&self.colours, colour).map(|i| i as u8)
    }

    /// Entry at `index`, if present.
    pub fn get(&self, index: usize) -> Option<Colour> {
        self.colours.get(index).copied()
    }

    /// All entries.
    pub fn colours(&self) -> &[Colour] {
        &self.colours
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }
}

impl Index<usize> for ColourTable {
    type Output = Colour;

    fn index(&self, index: usize) -> &Colour {
        &self.colours[index]
    }
}

impl GifComponent for ColourTable {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_full() {
        let data = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 9, 9, 9];
        let table = ColourTable::read_from(&mut Cursor::new(data), 4);
        assert_eq!(table.len(), 4);
        assert_eq!(table[2], Colour::rgb(0, 0, 255));
        assert!(table.error_state().is_ok());
    }

    #[test]
    fn test_read_short() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let table = ColourTable::read_from(&mut Cursor::new(data), 5);
        assert_eq!(table.len(), 5);
        assert_eq!(table[3], Colour::rgb(10, 11, 12));
        assert_eq!(table[4], Colour::rgba(0, 0, 0, 0));
        assert!(table.test_state(ErrorState::COLOUR_TABLE_TOO_SHORT));
        assert!(table.test_state(ErrorState::END_OF_INPUT_STREAM));
    }

    #[test]
    fn test_read_complete_has_no_end_of_stream() {
        let table = ColourTable::read_from(&mut Cursor::new(vec![1, 2, 3, 4, 5, 6, 7]), 2);
        assert!(table.error_state().is_ok());
        assert_eq!(table[1], Colour::rgb(4, 5, 6));
    }

    #[test]
    fn test_write_and_size_bits() {
        let table = ColourTable::new(vec![Colour::WHITE, Colour::BLACK]).unwrap();
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        assert_eq!(out, vec![255, 255, 255, 0, 0, 0]);
        assert_eq!(table.size_bits(), 0);

        let padded = ColourTable::new(vec![Colour::WHITE; 5]).unwrap().padded(4);
        assert_eq!(padded.len(), 8);
        assert_eq!(padded.size_bits(), 2);
        assert_eq!(padded[7], Colour::BLACK);
        assert_eq!(ColourTable::new(vec![Colour::WHITE; 256]).unwrap().size_bits(), 7);
    }

    #[test]
    fn test_bounds() {
        assert!(ColourTable::new(Vec::new()).is_err());
        assert!(ColourTable::new(vec![Colour::BLACK; 257]).is_err());
    }

    #[test]
    fn test_nearest() {
        let table = ColourTable::new(vec![Colour::BLACK, Colour::WHITE, Colour::rgb(255, 0, 0)]).unwrap();
        assert_eq!(table.nearest_index(&Colour::rgb(250, 10, 10)), Some(2));
    }
}
