//! Animated GIF encoder.

use crate::application::NetscapeExtension;
use crate::block::{IMAGE_SEPARATOR, TRAILER};
use crate::colour_table::ColourTable;
use crate::frame::GifFrame;
use crate::graphic_control::{DisposalMethod, GraphicControlExtension};
use crate::header::GifHeader;
use crate::image_data::TableBasedImageData;
use crate::image_descriptor::ImageDescriptor;
use crate::palette::Palette;
use crate::pixel_analysis::{DEFAULT_QUALITY, PixelAnalysis, QuantizerType};
use crate::screen::LogicalScreenDescriptor;
use oxigif_core::{Bitmap, Colour, GifError, Progress, Result, Stage, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Where frames get their colour table from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ColourTableStrategy {
    /// One global table shared by every frame.
    #[default]
    UseGlobal,
    /// A local table per frame.
    UseLocal,
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    logical_screen_size: Option<(u16, u16)>,
    repeat_count: i32,
    strategy: ColourTableStrategy,
    quality: usize,
    quantizer_type: QuantizerType,
    palette: Option<Palette>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            logical_screen_size: None,
            repeat_count: 0,
            strategy: ColourTableStrategy::default(),
            quality: DEFAULT_QUALITY,
            quantizer_type: QuantizerType::default(),
            palette: None,
        }
    }
}

impl EncoderConfig {
    /// Default settings: global table, loop forever, quality 10, NeuQuant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the logical screen size instead of taking the first frame's.
    pub fn with_logical_screen_size(mut self, width: u16, height: u16) -> Self {
        self.logical_screen_size = Some((width, height));
        self
    }

    /// Number of times to repeat: 0 loops forever, -1 (or anything lower)
    /// plays once without a looping extension.
    pub fn with_repeat_count(mut self, repeat_count: i32) -> Self {
        self.repeat_count = repeat_count.max(-1);
        self
    }

    /// Choose between one global colour table and per-frame tables.
    pub fn with_strategy(mut self, strategy: ColourTableStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// NeuQuant sample factor; 1 is best. 0 becomes 1.
    pub fn with_quality(mut self, quality: usize) -> Self {
        self.quality = quality.max(1);
        self
    }

    /// Quantizer used when a table needs more than 256 colours.
    pub fn with_quantizer(mut self, quantizer_type: QuantizerType) -> Self {
        self.quantizer_type = quantizer_type;
        self
    }

    /// Palette for [`QuantizerType::UseSuppliedPalette`].
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Explicit logical screen size.
    pub fn logical_screen_size(&self) -> Option<(u16, u16)> {
        self.logical_screen_size
    }

    /// Repeat count, never below -1.
    pub fn repeat_count(&self) -> i32 {
        self.repeat_count
    }

    /// Colour table strategy.
    pub fn strategy(&self) -> ColourTableStrategy {
        self.strategy
    }

    /// Quantization quality, never below 1.
    pub fn quality(&self) -> usize {
        self.quality
    }

    /// Quantizer type.
    pub fn quantizer_type(&self) -> QuantizerType {
        self.quantizer_type
    }

    /// Supplied palette.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }
}

/// Builds a GIF stream from a sequence of frames.
///
/// # Example
///
/// ```rust
/// use oxigif::{AnimatedGifEncoder, GifDecoder, GifFrame};
/// use oxigif_core::{Bitmap, Colour};
///
/// let mut encoder = AnimatedGifEncoder::new();
/// encoder.add_frame(GifFrame::new(Bitmap::filled(4, 4, Colour::WHITE)).with_delay(50)).unwrap();
/// let mut out = Vec::new();
/// encoder.write_to_stream(&mut out).unwrap();
///
/// let decoder = GifDecoder::from_bytes(&out).unwrap();
/// assert_eq!(decoder.frames()[0].delay(), 50);
/// ```
#[derive(Debug, Default)]
pub struct AnimatedGifEncoder {
    config: EncoderConfig,
    frames: Vec<GifFrame>,
    transparent: Option<Colour>,
    progress: Arc<Progress>,
}

impl AnimatedGifEncoder {
    /// An encoder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// An encoder with the given settings.
    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Report progress through `progress`.
    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Append a frame. Frames must be between 1 and 65535 pixels in each
    /// direction.
    pub fn add_frame(&mut self, frame: GifFrame) -> Result<()> {
        let image = frame.image();
        GifError::check_range("width", image.width() as i64, 1, u16::MAX as i64)?;
        GifError::check_range("height", image.height() as i64, 1, u16::MAX as i64)?;
        self.frames.push(frame);
        Ok(())
    }

    /// Append an image shown for `delay` hundredths of a second.
    pub fn add_image(&mut self, image: Bitmap, delay: u16) -> Result<()> {
        self.add_frame(GifFrame::new(image).with_delay(delay))
    }

    /// Colour to make transparent. The nearest entry of each frame's colour
    /// table is used.
    pub fn set_transparent(&mut self, colour: Option<Colour>) {
        self.transparent = colour;
    }

    /// Colour made transparent, if any.
    pub fn transparent(&self) -> Option<Colour> {
        self.transparent
    }

    /// Settings.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Frames added so far.
    pub fn frames(&self) -> &[GifFrame] {
        &self.frames
    }

    /// Progress observable updated while writing.
    pub fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }

    /// The configured screen size, or else the first frame's size.
    pub fn logical_screen_size(&self) -> Option<(u16, u16)> {
        self.config.logical_screen_size.or_else(|| {
            self.frames
                .first()
                .map(|f| (f.image().width() as u16, f.image().height() as u16))
        })
    }

    fn analysis<'a>(&self, analysis: PixelAnalysis<'a>) -> PixelAnalysis<'a> {
        let analysis = analysis
            .with_quality(self.config.quality)
            .with_quantizer(self.config.quantizer_type)
            .with_progress(Arc::clone(&self.progress));
        match &self.config.palette {
            Some(palette) => analysis.with_palette(palette.clone()),
            None => analysis,
        }
    }

    /// Write the complete stream.
    pub fn write_to_stream<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let (width, height) = self
            .logical_screen_size()
            .ok_or_else(|| GifError::invalid_operation("no frames added and no logical screen size set"))?;
        self.progress.set_frame_count(self.frames.len());

        GifHeader::default().write_to(writer)?;

        let lsd = LogicalScreenDescriptor::new(width, height);
        let global = match self.config.strategy {
            ColourTableStrategy::UseGlobal if !self.frames.is_empty() => {
                let analysis = self.analysis(PixelAnalysis::from_images(self.frames.iter().map(GifFrame::image)));
                let table = analysis.colour_table()?.clone();
                lsd.with_global_colour_table(table.size_bits(), false)?.write_to(writer)?;
                table.write_to(writer)?;
                let indices = analysis.indexed_pixels_collection()?.to_vec();
                Some((table, indices, analysis.transparent_index()?))
            }
            _ => {
                lsd.write_to(writer)?;
                None
            }
        };

        if self.config.repeat_count >= 0 {
            let loops = u16::try_from(self.config.repeat_count).unwrap_or(u16::MAX);
            NetscapeExtension::new(loops).write_to(writer)?;
        }

        for (i, frame) in self.frames.iter().enumerate() {
            match &global {
                Some((table, indices, reserved)) => {
                    self.progress.set_stage(Stage::WritingFrames);
                    self.progress.set_frame(i + 1);
                    self.write_frame(writer, frame, table, &indices[i], *reserved, false)?;
                }
                None => {
                    let analysis = self.analysis(PixelAnalysis::new(frame.image()));
                    let table = analysis.colour_table()?;
                    let indices = analysis.indexed_pixels()?;
                    let reserved = analysis.transparent_index()?;
                    // The per-frame analysis reports on its own single image.
                    self.progress.set_frame_count(self.frames.len());
                    self.progress.set_stage(Stage::WritingFrames);
                    self.progress.set_frame(i + 1);
                    self.write_frame(writer, frame, table, indices, reserved, true)?;
                }
            }
        }

        writer.write_le(TRAILER)?;
        self.progress.set_stage(Stage::Done);
        tracing::debug!(frames = self.frames.len(), width, height, "wrote GIF stream");
        Ok(())
    }

    fn write_frame<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        frame: &GifFrame,
        table: &ColourTable,
        indices: &[u8],
        reserved_transparent: Option<u8>,
        local: bool,
    ) -> Result<()> {
        let transparent = match self.transparent {
            Some(colour) => table.nearest_index(&colour),
            None => reserved_transparent.filter(|slot| indices.contains(slot)),
        };
        let disposal = if transparent.is_some() {
            DisposalMethod::RestoreToBackgroundColour
        } else {
            DisposalMethod::NotSpecified
        };
        GraphicControlExtension::new(frame.delay(), disposal, frame.expects_user_input(), transparent)
            .write_to(writer)?;

        let (left, top) = frame.position();
        let image = frame.image();
        let mut descriptor = ImageDescriptor::new(left, top, image.width() as u16, image.height() as u16);
        if local {
            descriptor = descriptor.with_local_colour_table(table.size_bits(), false)?;
        }
        writer.write_le(IMAGE_SEPARATOR)?;
        descriptor.write_to(writer)?;
        if local {
            table.write_to(writer)?;
        }

        TableBasedImageData::new(indices.to_vec(), table.len()).write_to(writer)?;
        tracing::trace!(left, top, colours = table.len(), local, ?transparent, "wrote frame");
        Ok(())
    }

    /// Write the complete stream to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to_stream(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
