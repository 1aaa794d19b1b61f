//! Mapping onto a fixed, caller-supplied palette.

use crate::error::QuantError;
use crate::{ColourQuantizer, Quantized, Result, map_pixels};
use oxigif_core::{Colour, nearest_colour_index};
use std::collections::HashMap;

/// [`ColourQuantizer`] that keeps a given palette and maps every pixel to
/// its nearest entry (unweighted RGB distance).
#[derive(Debug, Clone)]
pub struct PaletteMapper {
    palette: Vec<Colour>,
}

impl PaletteMapper {
    /// Create a mapper for 1 to 256 colours.
    pub fn new(palette: Vec<Colour>) -> Result<Self> {
        if palette.is_empty() {
            return Err(QuantError::EmptyPalette);
        }
        if palette.len() > 256 {
            return Err(QuantError::PaletteTooLarge(palette.len()));
        }
        Ok(Self { palette })
    }

    /// The palette pixels are mapped onto.
    pub fn palette(&self) -> &[Colour] {
        &self.palette
    }
}

impl ColourQuantizer for PaletteMapper {
    fn quantize(&mut self, pixels: &[Colour]) -> Result<Quantized> {
        // Images rarely hold many distinct colours relative to their size,
        // so resolve each distinct colour once.
        let mut lookup: HashMap<Colour, u8> = HashMap::new();
        for pixel in pixels {
            let opaque = pixel.opaque();
            lookup.entry(opaque).or_insert_with(|| {
                nearest_colour_index(&self.palette, &opaque).unwrap_or(0) as u8
            });
        }
        let indices = map_pixels(pixels, |p| lookup.get(&p.opaque()).copied().unwrap_or(0));
        Ok(Quantized {
            palette: self.palette.clone(),
            indices,
            transparent_index: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_nearest() {
        let mut mapper = PaletteMapper::new(vec![Colour::BLACK, Colour::WHITE]).unwrap();
        let q = mapper
            .quantize(&[Colour::rgb(10, 10, 10), Colour::rgb(200, 220, 250), Colour::WHITE])
            .unwrap();
        assert_eq!(q.indices, vec![0, 1, 1]);
        assert_eq!(q.palette.len(), 2);
    }

    #[test]
    fn test_rejects_bad_palettes() {
        assert!(matches!(PaletteMapper::new(Vec::new()), Err(QuantError::EmptyPalette)));
        assert!(matches!(
            PaletteMapper::new(vec![Colour::BLACK; 257]),
            Err(QuantError::PaletteTooLarge(257))
        ));
    }
}
