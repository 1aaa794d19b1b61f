//! A single frame of a GIF stream.
//!
//! Frames are built in one of two ways. The encoder wraps a true-colour
//! [`Bitmap`] with a delay and a position. The decoder reads an image
//! descriptor, an optional local colour table and the image data, then
//! composites the indices onto the logical screen using the previous
//! frames and their disposal methods.

use crate::colour_table::ColourTable;
use crate::graphic_control::{DisposalMethod, GraphicControlExtension};
use crate::image_data::TableBasedImageData;
use crate::image_descriptor::ImageDescriptor;
use crate::screen::LogicalScreenDescriptor;
use oxigif_core::{Bitmap, Colour, ComponentStatus, ErrorState, GifComponent, ReadBytesExt, skip_sub_blocks};
use std::io::Read;

/// Largest logical screen or image area, in pixels, that is decoded.
/// Larger areas are flagged with [`ErrorState::IMAGE_TOO_LARGE`].
pub const MAX_DECODED_PIXELS: usize = 1 << 26;

/// What a frame being decoded needs to know about the stream so far.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// The stream's logical screen descriptor.
    pub logical_screen: &'a LogicalScreenDescriptor,
    /// Global colour table, if the stream has one.
    pub global_colour_table: Option<&'a ColourTable>,
    /// Graphic control extension read since the previous image.
    pub graphic_control: Option<&'a GraphicControlExtension>,
    /// The frame decoded just before this one.
    pub previous_frame: Option<&'a GifFrame>,
    /// The frame before `previous_frame`.
    pub previous_frame_but_one: Option<&'a GifFrame>,
}

/// One image of an animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifFrame {
    image: Bitmap,
    delay: u16,
    position: (u16, u16),
    expects_user_input: bool,
    background_colour: Colour,
    indexed_pixels: Vec<u8>,
    descriptor: Option<ImageDescriptor>,
    graphic_control: Option<GraphicControlExtension>,
    local_colour_table: Option<ColourTable>,
    image_data: Option<TableBasedImageData>,
    status: ComponentStatus,
}

impl GifFrame {
    /// A frame for encoding, placed at the top-left corner with no delay.
    pub fn new(image: Bitmap) -> Self {
        Self {
            image,
            delay: 0,
            position: (0, 0),
            expects_user_input: false,
            background_colour: Colour::TRANSPARENT,
            indexed_pixels: Vec::new(),
            descriptor: None,
            graphic_control: None,
            local_colour_table: None,
            image_data: None,
            status: ComponentStatus::new(),
        }
    }

    /// Set the delay in hundredths of a second.
    pub fn with_delay(mut self, delay: u16) -> Self {
        self.delay = delay;
        self
    }

    /// Set the position of the frame on the logical screen.
    pub fn with_position(mut self, left: u16, top: u16) -> Self {
        self.position = (left, top);
        self
    }

    /// Ask viewers to wait for user input before moving on.
    pub fn with_expects_user_input(mut self, expects_user_input: bool) -> Self {
        self.expects_user_input = expects_user_input;
        self
    }

    /// Read a frame whose image separator has already been consumed.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, context: &FrameContext<'_>) -> Self {
        let mut status = ComponentStatus::new();
        let descriptor = ImageDescriptor::read_from(reader);
        let local_colour_table = descriptor
            .has_local_colour_table()
            .then(|| ColourTable::read_from(reader, descriptor.lct_size()));

        let active_table = local_colour_table.as_ref().or(context.global_colour_table);
        if active_table.is_none() {
            status.set(
                ErrorState::FRAME_HAS_NO_COLOUR_TABLE,
                "Frame has neither a local nor a global colour table",
            );
        }

        let image_data = if descriptor.pixel_count() > MAX_DECODED_PIXELS {
            status.set(
                ErrorState::IMAGE_TOO_LARGE,
                format!(
                    "Image of {}x{} pixels exceeds the decoding limit of {MAX_DECODED_PIXELS} pixels",
                    descriptor.width(),
                    descriptor.height()
                ),
            );
            let state = match reader.read_byte() {
                Some(_) => skip_sub_blocks(reader),
                None => ErrorState::END_OF_INPUT_STREAM,
            };
            if !state.is_ok() {
                status.set(state, "End of input stream reached while skipping image data");
            }
            None
        } else {
            Some(TableBasedImageData::read_from(reader, descriptor.pixel_count()))
        };
        let width = descriptor.width() as usize;
        let indexed_pixels = match &image_data {
            Some(data) if descriptor.is_interlaced() => deinterlace(data.pixels(), width),
            Some(data) => data.pixels().to_vec(),
            None => Vec::new(),
        };

        let background_colour = background_colour(context);
        let mut image = base_canvas(context, background_colour);
        let transparent = context.graphic_control.and_then(GraphicControlExtension::transparent_index);
        let (left, top) = (descriptor.left() as u32, descriptor.top() as u32);

        let mut bad_indices = 0usize;
        if let Some(table) = active_table {
            for (i, &index) in indexed_pixels.iter().enumerate() {
                if Some(index) == transparent {
                    continue;
                }
                match table.get(index as usize) {
                    Some(colour) => {
                        let x = left + (i % width) as u32;
                        let y = top + (i / width) as u32;
                        image.set_pixel(x, y, colour);
                    }
                    None => bad_indices += 1,
                }
            }
        }
        if bad_indices > 0 {
            status.set(
                ErrorState::BAD_COLOUR_INDEX,
                format!("{bad_indices} pixels use an index outside the colour table"),
            );
        }

        let graphic_control = context.graphic_control.cloned();
        tracing::debug!(
            left,
            top,
            width,
            height = descriptor.height(),
            interlaced = descriptor.is_interlaced(),
            local_table = local_colour_table.is_some(),
            "read frame"
        );

        Self {
            image,
            delay: graphic_control.as_ref().map_or(0, GraphicControlExtension::delay),
            position: (descriptor.left(), descriptor.top()),
            expects_user_input: graphic_control
                .as_ref()
                .is_some_and(GraphicControlExtension::expects_user_input),
            background_colour,
            indexed_pixels,
            descriptor: Some(descriptor),
            graphic_control,
            local_colour_table,
            image_data,
            status,
        }
    }

    /// The frame's image. For decoded frames this is the whole logical
    /// screen as it looks once the frame is drawn.
    pub fn image(&self) -> &Bitmap {
        &self.image
    }

    /// Delay in hundredths of a second.
    pub fn delay(&self) -> u16 {
        self.delay
    }

    /// Position on the logical screen.
    pub fn position(&self) -> (u16, u16) {
        self.position
    }

    /// Whether viewers should wait for user input.
    pub fn expects_user_input(&self) -> bool {
        self.expects_user_input
    }

    /// Colour the frame's area is cleared to by
    /// [`DisposalMethod::RestoreToBackgroundColour`].
    pub fn background_colour(&self) -> Colour {
        self.background_colour
    }

    /// Palette indices in row order (de-interlaced). Empty for frames that
    /// were not decoded.
    pub fn indexed_pixels(&self) -> &[u8] {
        &self.indexed_pixels
    }

    /// Disposal method from the graphic control extension.
    pub fn disposal_method(&self) -> DisposalMethod {
        self.graphic_control
            .as_ref()
            .map_or(DisposalMethod::NotSpecified, GraphicControlExtension::disposal_method)
    }

    /// Image descriptor, for decoded frames.
    pub fn image_descriptor(&self) -> Option<&ImageDescriptor> {
        self.descriptor.as_ref()
    }

    /// Graphic control extension that preceded the frame.
    pub fn graphic_control_extension(&self) -> Option<&GraphicControlExtension> {
        self.graphic_control.as_ref()
    }

    /// Local colour table, if the frame has one.
    pub fn local_colour_table(&self) -> Option<&ColourTable> {
        self.local_colour_table.as_ref()
    }

    /// Compressed image data as read.
    pub fn image_data(&self) -> Option<&TableBasedImageData> {
        self.image_data.as_ref()
    }

    /// Area covered by the frame: left, top, width, height.
    fn area(&self) -> (u32, u32, u32, u32) {
        match &self.descriptor {
            Some(d) => (d.left() as u32, d.top() as u32, d.width() as u32, d.height() as u32),
            None => (
                self.position.0 as u32,
                self.position.1 as u32,
                self.image.width(),
                self.image.height(),
            ),
        }
    }
}

impl GifComponent for GifFrame {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }

    fn children(&self) -> Vec<&dyn GifComponent> {
        let mut children: Vec<&dyn GifComponent> = Vec::new();
        if let Some(d) = &self.descriptor {
            children.push(d);
        }
        if let Some(gce) = &self.graphic_control {
            children.push(gce);
        }
        if let Some(table) = &self.local_colour_table {
            children.push(table);
        }
        if let Some(data) = &self.image_data {
            children.push(data);
        }
        children
    }
}

fn background_colour(context: &FrameContext<'_>) -> Colour {
    let transparent = context
        .graphic_control
        .is_some_and(GraphicControlExtension::has_transparent_colour);
    match context.global_colour_table {
        Some(table) if !transparent => table
            .get(context.logical_screen.background_colour_index() as usize)
            .unwrap_or(Colour::TRANSPARENT),
        _ => Colour::TRANSPARENT,
    }
}

/// The logical screen as it looks before this frame is drawn.
fn base_canvas(context: &FrameContext<'_>, background: Colour) -> Bitmap {
    let width = context.logical_screen.width() as u32;
    let height = context.logical_screen.height() as u32;
    let blank = || Bitmap::filled(width, height, background);

    let Some(previous) = context.previous_frame else {
        return blank();
    };
    match previous.disposal_method() {
        DisposalMethod::NotSpecified | DisposalMethod::DoNotDispose => previous.image.clone(),
        DisposalMethod::RestoreToBackgroundColour => {
            let mut canvas = previous.image.clone();
            let (x, y, w, h) = previous.area();
            canvas.fill_rect(x, y, w, h, background);
            canvas
        }
        DisposalMethod::RestoreToPrevious => context
            .previous_frame_but_one
            .map_or_else(blank, |frame| frame.image.clone()),
    }
}

/// Reorder interlaced rows (passes starting at rows 0, 4, 2, 1 with steps
/// 8, 8, 4, 2) into top-to-bottom order.
fn deinterlace(pixels: &[u8], width: usize) -> Vec<u8> {
    if width == 0 {
        return pixels.to_vec();
    }
    let height = pixels.len() / width;
    let mut out = vec![0u8; pixels.len()];
    let mut source_rows = pixels.chunks_exact(width);
    for (start, step) in [(0, 8), (4, 8), (2, 4), (1, 2)] {
        for row in (start..height).step_by(step) {
            if let Some(source) = source_rows.next() {
                out[row * width..(row + 1) * width].copy_from_slice(source);
            }
        }
    }
    out
}
