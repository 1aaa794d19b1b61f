//! Colour analysis of one or more images.
//!
//! [`PixelAnalysis`] builds a single colour table shared by every image it
//! was given and maps each image onto it. With at most 256 distinct
//! colours the table is built directly and the mapping is exact; otherwise
//! a quantizer reduces the colours to 256.

use crate::colour_table::{ColourTable, MAX_COLOURS};
use crate::palette::Palette;
use oxigif_core::{Bitmap, Colour, GifError, Progress, Result, Stage};
use oxigif_quant::{ColourQuantizer, NeuQuantizer, OctreeQuantizer, PaletteMapper, Quantized};
use std::cell::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Smallest colour table the analysis produces.
pub const MIN_TABLE_SIZE: usize = 4;

/// Default NeuQuant sample factor.
pub const DEFAULT_QUALITY: usize = 10;

/// How colours are reduced when an image has more than 256 of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum QuantizerType {
    /// NeuQuant neural network quantizer.
    #[default]
    NeuQuant,
    /// Octree quantizer (255 colours plus a transparent slot).
    Octree,
    /// Map every pixel onto a caller-supplied palette, whatever the number
    /// of distinct colours.
    UseSuppliedPalette,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mode {
    Single,
    Multiple,
}

#[derive(Debug)]
struct Analysis {
    colour_table: ColourTable,
    indexed_pixels: Vec<Vec<u8>>,
    transparent_index: Option<u8>,
    distinct_colours: usize,
}

/// Shared colour table and per-image indices for a set of images.
///
/// The work happens on first access to any result and is done once.
#[derive(Debug)]
pub struct PixelAnalysis<'a> {
    images: Vec<&'a Bitmap>,
    mode: Mode,
    quality: usize,
    quantizer_type: QuantizerType,
    palette: Option<Palette>,
    progress: Arc<Progress>,
    analysis: OnceCell<Analysis>,
}

impl<'a> PixelAnalysis<'a> {
    /// Analyse a single image.
    pub fn new(image: &'a Bitmap) -> Self {
        Self::with_mode(vec![image], Mode::Single)
    }

    /// Analyse a sequence of images sharing one colour table.
    pub fn from_images(images: impl IntoIterator<Item = &'a Bitmap>) -> Self {
        Self::with_mode(images.into_iter().collect(), Mode::Multiple)
    }

    fn with_mode(images: Vec<&'a Bitmap>, mode: Mode) -> Self {
        Self {
            images,
            mode,
            quality: DEFAULT_QUALITY,
            quantizer_type: QuantizerType::default(),
            palette: None,
            progress: Arc::new(Progress::new()),
            analysis: OnceCell::new(),
        }
    }

    /// Set the NeuQuant sample factor. 1 is best; values below 1 become 1
    /// and the quantizer samples at most every 30th pixel.
    pub fn with_quality(mut self, quality: usize) -> Self {
        self.quality = quality.max(1);
        self
    }

    /// Choose the quantizer.
    pub fn with_quantizer(mut self, quantizer_type: QuantizerType) -> Self {
        self.quantizer_type = quantizer_type;
        self
    }

    /// Supply the palette used by [`QuantizerType::UseSuppliedPalette`].
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Report progress through `progress`.
    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// The shared colour table.
    pub fn colour_table(&self) -> Result<&ColourTable> {
        Ok(&self.analysis()?.colour_table)
    }

    /// Indices of the single image. Only valid for [`PixelAnalysis::new`].
    pub fn indexed_pixels(&self) -> Result<&[u8]> {
        if self.mode != Mode::Single {
            return Err(GifError::invalid_operation(
                "this analysis covers several images, use indexed_pixels_collection() instead",
            ));
        }
        Ok(&self.analysis()?.indexed_pixels[0])
    }

    /// Indices of every image, in order. Only valid for
    /// [`PixelAnalysis::from_images`].
    pub fn indexed_pixels_collection(&self) -> Result<&[Vec<u8>]> {
        if self.mode != Mode::Multiple {
            return Err(GifError::invalid_operation(
                "this analysis covers a single image, use indexed_pixels() instead",
            ));
        }
        Ok(&self.analysis()?.indexed_pixels)
    }

    /// Table slot the quantizer reserved for fully transparent pixels.
    pub fn transparent_index(&self) -> Result<Option<u8>> {
        Ok(self.analysis()?.transparent_index)
    }

    /// Number of distinct opaque colours across all images. Counting stops
    /// at 257, the first count that needs quantizing.
    pub fn distinct_colours(&self) -> Result<usize> {
        Ok(self.analysis()?.distinct_colours)
    }

    /// Human readable description of the current stage.
    pub fn status(&self) -> String {
        self.progress.status()
    }

    /// Image currently being processed (1-based, 0 before the first).
    pub fn processing_frame(&self) -> usize {
        self.progress.processing_frame()
    }

    fn analysis(&self) -> Result<&Analysis> {
        if let Some(analysis) = self.analysis.get() {
            return Ok(analysis);
        }
        let analysis = self.analyse()?;
        Ok(self.analysis.get_or_init(|| analysis))
    }

    fn analyse(&self) -> Result<Analysis> {
        self.progress.set_frame_count(self.images.len());
        self.progress.set_stage(Stage::AnalysingColours);

        let mut distinct: Vec<Colour> = Vec::new();
        let mut lookup: HashMap<Colour, u8> = HashMap::new();
        let mut overflow = false;
        for (i, image) in self.images.iter().enumerate() {
            self.progress.set_frame(i + 1);
            for pixel in image.pixels() {
                let colour = pixel.opaque();
                if lookup.contains_key(&colour) {
                    continue;
                }
                if distinct.len() == MAX_COLOURS {
                    overflow = true;
                    break;
                }
                lookup.insert(colour, distinct.len() as u8);
                distinct.push(colour);
            }
            if overflow {
                break;
            }
        }

        let analysis = if self.quantizer_type == QuantizerType::UseSuppliedPalette {
            let palette = self.palette.as_ref().ok_or_else(|| {
                GifError::invalid_operation("UseSuppliedPalette needs a palette, call with_palette() first")
            })?;
            let mut mapper = PaletteMapper::new(palette.colours().to_vec())?;
            let counted = if overflow { MAX_COLOURS + 1 } else { distinct.len() };
            self.quantize(&mut mapper, counted)?
        } else if overflow {
            tracing::debug!(
                quantizer = ?self.quantizer_type,
                quality = self.quality,
                "more than 256 colours, quantizing"
            );
            match self.quantizer_type {
                QuantizerType::Octree => self.quantize(&mut OctreeQuantizer::default(), MAX_COLOURS + 1)?,
                _ => self.quantize(&mut NeuQuantizer::new(self.quality), MAX_COLOURS + 1)?,
            }
        } else {
            self.build_directly(distinct, &lookup)?
        };

        self.progress.set_stage(Stage::Idle);
        tracing::debug!(
            images = self.images.len(),
            colours = analysis.colour_table.len(),
            "pixel analysis complete"
        );
        Ok(analysis)
    }

    /// Table of the distinct colours themselves, padded with black.
    fn build_directly(&self, distinct: Vec<Colour>, lookup: &HashMap<Colour, u8>) -> Result<Analysis> {
        let distinct_colours = distinct.len();
        let size = distinct_colours.max(MIN_TABLE_SIZE).next_power_of_two();
        let mut colours = distinct;
        colours.resize(size, Colour::BLACK);

        self.progress.set_stage(Stage::MappingPixels);
        let mut indexed_pixels = Vec::with_capacity(self.images.len());
        for (i, image) in self.images.iter().enumerate() {
            self.progress.set_frame(i + 1);
            indexed_pixels.push(
                image
                    .pixels()
                    .iter()
                    .map(|p| lookup.get(&p.opaque()).copied().unwrap_or(0))
                    .collect(),
            );
        }

        Ok(Analysis {
            colour_table: ColourTable::new(colours)?,
            indexed_pixels,
            transparent_index: None,
            distinct_colours,
        })
    }

    /// Run `quantizer` over every image's pixels at once and split the
    /// indices back per image.
    fn quantize(&self, quantizer: &mut dyn ColourQuantizer, distinct_colours: usize) -> Result<Analysis> {
        self.progress.set_stage(Stage::Quantizing);
        let total = self.images.iter().map(|i| i.pixels().len()).sum();
        let mut pixels = Vec::with_capacity(total);
        for image in &self.images {
            pixels.extend_from_slice(image.pixels());
        }

        let Quantized {
            palette,
            indices,
            transparent_index,
        } = quantizer.quantize(&pixels)?;

        self.progress.set_stage(Stage::MappingPixels);
        let mut indexed_pixels = Vec::with_capacity(self.images.len());
        let mut rest = indices.as_slice();
        for (i, image) in self.images.iter().enumerate() {
            self.progress.set_frame(i + 1);
            let (head, tail) = rest.split_at(image.pixels().len());
            indexed_pixels.push(head.to_vec());
            rest = tail;
        }

        let table = ColourTable::new(palette)?.padded(MIN_TABLE_SIZE);
        Ok(Analysis {
            colour_table: table,
            indexed_pixels,
            transparent_index,
            distinct_colours,
        })
    }
}
