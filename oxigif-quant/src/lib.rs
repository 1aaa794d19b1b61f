//! # OxiGIF-Quant: Colour Quantization
//!
//! Reduces true-colour pixels to a palette of at most 256 colours plus one
//! palette index per pixel.
//!
//! ## Quantizers
//!
//! | Quantizer          | Palette                                  | Notes                          |
//! |--------------------|------------------------------------------|--------------------------------|
//! | [`NeuQuantizer`]   | 256 colours                              | Kohonen network, quality = sample factor |
//! | [`OctreeQuantizer`]| up to 255 colours + 1 transparent slot   | deterministic tree reduction   |
//! | [`PaletteMapper`]  | the palette it was given                 | nearest colour                 |
//!
//! ## Features
//!
//! - `parallel`: map pixels to palette indices with rayon
//!
//! ## Example
//!
//! ```rust
//! use oxigif_core::Colour;
//! use oxigif_quant::{ColourQuantizer, OctreeQuantizer};
//!
//! let pixels = vec![Colour::rgb(255, 0, 0), Colour::rgb(0, 0, 255), Colour::TRANSPARENT];
//! let q = OctreeQuantizer::default().quantize(&pixels).unwrap();
//! assert_eq!(q.palette.len(), 256);
//! assert_eq!(q.palette[q.indices[0] as usize], Colour::rgb(255, 0, 0));
//! assert_eq!(Some(q.indices[2]), q.transparent_index);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

mod error;
pub mod neuquant;
pub mod octree;
mod palette;

pub use error::{QuantError, Result};
pub use neuquant::{MAX_SAMPLE_FACTOR, NeuQuant, NeuQuantizer};
pub use octree::{Octree, OctreeQuantizer};
pub use palette::PaletteMapper;

use oxigif_core::Colour;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Output of a quantizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
    /// Palette colours.
    pub palette: Vec<Colour>,
    /// One palette index per input pixel.
    pub indices: Vec<u8>,
    /// Palette slot reserved for fully transparent pixels, if any.
    pub transparent_index: Option<u8>,
}

/// Reduce true-colour pixels to a palette and per-pixel indices.
pub trait ColourQuantizer {
    /// Build a palette for `pixels` and map every pixel onto it.
    fn quantize(&mut self, pixels: &[Colour]) -> Result<Quantized>;
}

/// Map every pixel through `f`, in parallel when the `parallel` feature is on.
#[cfg(feature = "parallel")]
pub(crate) fn map_pixels<F>(pixels: &[Colour], f: F) -> Vec<u8>
where
    F: Fn(&Colour) -> u8 + Sync + Send,
{
    pixels.par_iter().map(f).collect()
}

/// Map every pixel through `f`, in parallel when the `parallel` feature is on.
#[cfg(not(feature = "parallel"))]
pub(crate) fn map_pixels<F>(pixels: &[Colour], f: F) -> Vec<u8>
where
    F: Fn(&Colour) -> u8 + Sync + Send,
{
    pixels.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo_like(width: u32, height: u32) -> Vec<Colour> {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.push(Colour::rgb(
                    (x * 255 / width) as u8,
                    (y * 255 / height) as u8,
                    ((x + y) * 127 / (width + height)) as u8,
                ));
            }
        }
        pixels
    }

    #[test]
    fn test_quantizers_are_interchangeable() {
        let pixels = photo_like(64, 64);
        let mut quantizers: Vec<Box<dyn ColourQuantizer>> = vec![
            Box::new(NeuQuantizer::new(10)),
            Box::new(OctreeQuantizer::default()),
            Box::new(PaletteMapper::new(vec![Colour::BLACK, Colour::WHITE]).unwrap()),
        ];
        for quantizer in &mut quantizers {
            let q = quantizer.quantize(&pixels).unwrap();
            assert_eq!(q.indices.len(), pixels.len());
            assert!(q.palette.len() <= 256);
            assert!(q.indices.iter().all(|&i| (i as usize) < q.palette.len()));
        }
    }

    #[test]
    fn test_mapping_error_is_bounded() {
        let pixels = photo_like(128, 128);
        let q = NeuQuantizer::new(1).quantize(&pixels).unwrap();
        let worst = pixels
            .iter()
            .zip(&q.indices)
            .map(|(p, &i)| p.distance_squared(&q.palette[i as usize]))
            .max()
            .unwrap();
        assert!(worst < 40 * 40 * 3, "worst squared error {worst}");
    }
}
