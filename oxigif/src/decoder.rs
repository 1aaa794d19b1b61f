//! GIF decoder.
//!
//! Decoding is a small state machine:
//!
//! ```text
//! NotStarted -> ReadingHeader -> ReadingLogicalScreenDescriptor
//!            -> ReadingGlobalColourTable (when present)
//!            -> ReadingContent (loop) -> Done
//! ```
//!
//! Malformed data never stops the decoder with an error. Problems are
//! recorded on the component being read, and whatever was parsed before the
//! stream ended or went bad stays available.

use crate::application::{ApplicationExtension, NetscapeExtension};
use crate::block::{Block, ExtensionLabel};
use crate::colour_table::ColourTable;
use crate::comment::CommentExtension;
use crate::frame::{FrameContext, GifFrame, MAX_DECODED_PIXELS};
use crate::graphic_control::GraphicControlExtension;
use crate::header::GifHeader;
use crate::screen::LogicalScreenDescriptor;
use oxigif_core::{
    ComponentStatus, ErrorState, GifComponent, GifError, IoErrorCapture, Progress, ReadBytesExt, Result, Stage,
    skip_sub_blocks,
};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

/// Position of a [`GifDecoder`] in its state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecoderState {
    /// Created, nothing read yet.
    NotStarted,
    /// Reading the six byte header.
    ReadingHeader,
    /// Reading the logical screen descriptor.
    ReadingLogicalScreenDescriptor,
    /// Reading the global colour table.
    ReadingGlobalColourTable,
    /// Reading frames and extensions.
    ReadingContent,
    /// Finished, successfully or not.
    Done,
}

/// Reads a GIF stream into its components and composited frames.
#[derive(Debug)]
pub struct GifDecoder {
    state: DecoderState,
    header: Option<GifHeader>,
    logical_screen: Option<LogicalScreenDescriptor>,
    global_colour_table: Option<ColourTable>,
    netscape_extension: Option<NetscapeExtension>,
    application_extensions: Vec<ApplicationExtension>,
    comments: Vec<CommentExtension>,
    frames: Vec<GifFrame>,
    progress: Arc<Progress>,
    status: ComponentStatus,
}

impl GifDecoder {
    /// A decoder that has not read anything yet.
    pub fn new() -> Self {
        Self {
            state: DecoderState::NotStarted,
            header: None,
            logical_screen: None,
            global_colour_table: None,
            netscape_extension: None,
            application_extensions: Vec::new(),
            comments: Vec::new(),
            frames: Vec::new(),
            progress: Arc::new(Progress::new()),
            status: ComponentStatus::new(),
        }
    }

    /// Report progress through `progress`.
    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Decode a whole stream from `reader`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut decoder = Self::new();
        decoder.decode(reader)?;
        Ok(decoder)
    }

    /// Decode a stream held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Decode a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "decoding file");
        Self::from_reader(BufReader::new(file))
    }

    /// Read the stream. Only the caller's misuse and a failing reader are
    /// errors: decoding the same decoder twice fails with
    /// [`GifError::InvalidOperation`], and a read error is returned as
    /// [`GifError::Io`]. A stream that simply ends early is not an error.
    pub fn decode<R: Read>(&mut self, reader: R) -> Result<()> {
        if self.state != DecoderState::NotStarted {
            return Err(GifError::invalid_operation(
                "decode() has already been called on this decoder, create a new one",
            ));
        }
        let mut reader = IoErrorCapture::new(reader);
        self.run(&mut reader);
        self.state = DecoderState::Done;
        self.progress.set_stage(Stage::Done);
        if let Some(err) = reader.take_error() {
            tracing::debug!(error = %err, "decode stopped by an I/O error");
            return Err(err.into());
        }
        tracing::debug!(
            frames = self.frames.len(),
            state = %self.consolidated_state(),
            "decode finished"
        );
        Ok(())
    }

    fn run<R: Read + ?Sized>(&mut self, reader: &mut R) {
        self.state = DecoderState::ReadingHeader;
        self.progress.set_stage(Stage::ReadingHeader);
        let header = GifHeader::read_from(reader);
        let ended = header.error_state().contains(ErrorState::END_OF_INPUT_STREAM);
        self.header = Some(header);
        if ended {
            return;
        }

        self.state = DecoderState::ReadingLogicalScreenDescriptor;
        let lsd = LogicalScreenDescriptor::read_from(reader);
        let ended = lsd.error_state().contains(ErrorState::END_OF_INPUT_STREAM);
        let gct_size = lsd.has_global_colour_table().then(|| lsd.gct_size());
        let area = lsd.width() as usize * lsd.height() as usize;
        self.logical_screen = Some(lsd);
        if ended {
            return;
        }
        if area > MAX_DECODED_PIXELS {
            self.status.set(
                ErrorState::IMAGE_TOO_LARGE,
                format!("Logical screen of {area} pixels exceeds the decoding limit of {MAX_DECODED_PIXELS} pixels"),
            );
            return;
        }

        if let Some(size) = gct_size {
            self.state = DecoderState::ReadingGlobalColourTable;
            let table = ColourTable::read_from(reader, size);
            let ended = table.error_state().contains(ErrorState::END_OF_INPUT_STREAM);
            self.global_colour_table = Some(table);
            if ended {
                return;
            }
        }

        self.state = DecoderState::ReadingContent;
        self.progress.set_stage(Stage::ReadingContent);
        self.read_content(reader);
    }

    fn read_content<R: Read + ?Sized>(&mut self, reader: &mut R) {
        let mut graphic_control: Option<GraphicControlExtension> = None;
        loop {
            let Some(code) = reader.read_byte() else {
                self.status.set(
                    ErrorState::END_OF_INPUT_STREAM,
                    "End of input stream reached before the trailer",
                );
                return;
            };

            match Block::from_u8(code) {
                Some(Block::Image) => {
                    self.progress.set_frame(self.frames.len() + 1);
                    let frame = self.read_frame(reader, graphic_control.take());
                    self.frames.push(frame);
                }
                Some(Block::Extension) => {
                    let Some(label) = reader.read_byte() else {
                        self.status.set(
                            ErrorState::END_OF_INPUT_STREAM,
                            "End of input stream reached while reading an extension label",
                        );
                        return;
                    };
                    match ExtensionLabel::from_u8(label) {
                        Some(ExtensionLabel::GraphicControl) => {
                            graphic_control = Some(GraphicControlExtension::read_from(reader));
                        }
                        Some(ExtensionLabel::Application) => self.read_application(reader),
                        Some(ExtensionLabel::Comment) => {
                            self.comments.push(CommentExtension::read_from(reader));
                        }
                        Some(ExtensionLabel::PlainText) | None => {
                            tracing::debug!(label, "skipping extension");
                            let state = skip_sub_blocks(reader);
                            if !state.is_ok() {
                                self.status.set(
                                    state,
                                    format!("End of input stream reached while skipping extension {label:#04x}"),
                                );
                            }
                        }
                    }
                }
                Some(Block::Trailer) => {
                    tracing::debug!("read trailer");
                    return;
                }
                None => {
                    self.status.set(
                        ErrorState::BAD_DATA_BLOCK_INTRODUCER,
                        format!("Unexpected block introducer {code:#04x}"),
                    );
                    return;
                }
            }
        }
    }

    fn read_frame<R: Read + ?Sized>(
        &self,
        reader: &mut R,
        graphic_control: Option<GraphicControlExtension>,
    ) -> GifFrame {
        let default_screen;
        let logical_screen = match &self.logical_screen {
            Some(lsd) => lsd,
            None => {
                default_screen = LogicalScreenDescriptor::new(0, 0);
                &default_screen
            }
        };
        let count = self.frames.len();
        let context = FrameContext {
            logical_screen,
            global_colour_table: self.global_colour_table.as_ref(),
            graphic_control: graphic_control.as_ref(),
            previous_frame: self.frames.last(),
            previous_frame_but_one: count.checked_sub(2).and_then(|i| self.frames.get(i)),
        };
        GifFrame::read_from(reader, &context)
    }

    fn read_application<R: Read + ?Sized>(&mut self, reader: &mut R) {
        let application = ApplicationExtension::read_from(reader);
        if application.is_netscape() && self.netscape_extension.is_none() {
            match NetscapeExtension::try_from(application) {
                Ok(netscape) => self.netscape_extension = Some(netscape),
                Err(err) => tracing::warn!(error = %err, "netscape extension rejected"),
            }
        } else {
            self.application_extensions.push(application);
        }
    }

    /// Current state machine position.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// The stream's header, once read.
    pub fn header(&self) -> Option<&GifHeader> {
        self.header.as_ref()
    }

    /// The logical screen descriptor, once read.
    pub fn logical_screen_descriptor(&self) -> Option<&LogicalScreenDescriptor> {
        self.logical_screen.as_ref()
    }

    /// The global colour table, if the stream has one.
    pub fn global_colour_table(&self) -> Option<&ColourTable> {
        self.global_colour_table.as_ref()
    }

    /// The first `NETSCAPE2.0` extension, if any.
    pub fn netscape_extension(&self) -> Option<&NetscapeExtension> {
        self.netscape_extension.as_ref()
    }

    /// Number of times the animation plays: `Some(0)` means forever, `None`
    /// means the stream has no looping extension and plays once.
    pub fn loop_count(&self) -> Option<u16> {
        self.netscape_extension.as_ref().map(NetscapeExtension::loop_count)
    }

    /// Application extensions other than the looping extension.
    pub fn application_extensions(&self) -> &[ApplicationExtension] {
        &self.application_extensions
    }

    /// Comment extensions in stream order.
    pub fn comments(&self) -> &[CommentExtension] {
        &self.comments
    }

    /// Decoded frames.
    pub fn frames(&self) -> &[GifFrame] {
        &self.frames
    }

    /// Progress observable updated while decoding.
    pub fn progress(&self) -> &Arc<Progress> {
        &self.progress
    }
}

impl Default for GifDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl GifComponent for GifDecoder {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }

    fn children(&self) -> Vec<&dyn GifComponent> {
        let mut children: Vec<&dyn GifComponent> = Vec::new();
        if let Some(header) = &self.header {
            children.push(header);
        }
        if let Some(lsd) = &self.logical_screen {
            children.push(lsd);
        }
        if let Some(table) = &self.global_colour_table {
            children.push(table);
        }
        if let Some(netscape) = &self.netscape_extension {
            children.push(netscape);
        }
        children.extend(self.application_extensions.iter().map(|a| a as &dyn GifComponent));
        children.extend(self.comments.iter().map(|c| c as &dyn GifComponent));
        children.extend(self.frames.iter().map(|f| f as &dyn GifComponent));
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxigif_core::Colour;
    use oxigif_lzw::write_image_data;

    /// A 2x1 GIF with a 4 colour global table, one graphic control
    /// extension, a comment and a looping extension.
    fn tiny_gif() -> Vec<u8> {
        let mut out = b"GIF89a".to_vec();
        out.extend_from_slice(&[2, 0, 1, 0, 0b1111_0001, 0, 0]);
        out.extend_from_slice(&[255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255]);
        NetscapeExtension::new(0).write_to(&mut out).unwrap();
        CommentExtension::new("hello").write_to(&mut out).unwrap();
        out.extend_from_slice(&[0x21, 0xF9, 4, 0b0000_0100, 7, 0, 0, 0]);
        out.extend_from_slice(&[0x2C, 0, 0, 0, 0, 2, 0, 1, 0, 0]);
        write_image_data(&[2, 3], &mut out).unwrap();
        out.push(0x3B);
        out
    }

    #[test]
    fn test_decode_tiny() {
        let decoder = GifDecoder::from_bytes(&tiny_gif()).unwrap();
        assert_eq!(decoder.state(), DecoderState::Done);
        assert!(decoder.consolidated_state().is_ok(), "{}", decoder.consolidated_state());
        assert_eq!(decoder.frames().len(), 1);
        assert_eq!(decoder.loop_count(), Some(0));
        assert_eq!(decoder.comments()[0].text(), "hello");

        let frame = &decoder.frames()[0];
        assert_eq!(frame.delay(), 7);
        assert_eq!(frame.image().get_pixel(0, 0), Some(Colour::rgb(0, 0, 255)));
        assert_eq!(frame.image().get_pixel(1, 0), Some(Colour::WHITE));
    }

    #[test]
    fn test_decode_twice_rejected() {
        let mut decoder = GifDecoder::new();
        assert_eq!(decoder.state(), DecoderState::NotStarted);
        decoder.decode(Cursor::new(tiny_gif())).unwrap();
        let err = decoder.decode(Cursor::new(tiny_gif())).unwrap_err();
        assert!(matches!(err, GifError::InvalidOperation { .. }));
    }

    #[test]
    fn test_missing_trailer() {
        let mut bytes = tiny_gif();
        bytes.pop();
        let decoder = GifDecoder::from_bytes(&bytes).unwrap();
        assert_eq!(decoder.frames().len(), 1);
        assert_eq!(decoder.error_state(), ErrorState::END_OF_INPUT_STREAM);
    }

    #[test]
    fn test_bad_introducer() {
        let mut bytes = tiny_gif();
        let trailer = bytes.len() - 1;
        bytes[trailer] = 0x42;
        let decoder = GifDecoder::from_bytes(&bytes).unwrap();
        assert!(decoder.test_state(ErrorState::BAD_DATA_BLOCK_INTRODUCER));
        assert_eq!(decoder.frames().len(), 1);
    }

    #[test]
    fn test_progress() {
        let progress = Arc::new(Progress::new());
        let mut decoder = GifDecoder::new().with_progress(Arc::clone(&progress));
        decoder.decode(Cursor::new(tiny_gif())).unwrap();
        assert_eq!(progress.stage(), Stage::Done);
        assert_eq!(progress.processing_frame(), 1);
    }
}
