//! Graphic control extension: delay, disposal and transparency of the next
//! image.

use crate::block::{ExtensionLabel, write_extension_header};
use oxigif_core::{
    BLOCK_TERMINATOR, ComponentStatus, DataBlock, ErrorState, GifComponent, Result, WriteBytesExt,
    skip_sub_blocks,
};
use std::io::{Read, Write};

/// Size of the graphic control data block.
pub const BLOCK_SIZE: u8 = 4;

/// What happens to a frame's area before the next frame is drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DisposalMethod {
    /// No disposal specified.
    NotSpecified = 0,
    /// Leave the frame in place.
    #[default]
    DoNotDispose = 1,
    /// Clear the frame's area to the background colour.
    RestoreToBackgroundColour = 2,
    /// Restore the area to what it was before the frame was drawn.
    RestoreToPrevious = 3,
}

impl DisposalMethod {
    /// Converts `u8` to `Option<Self>`.
    pub fn from_u8(n: u8) -> Option<DisposalMethod> {
        match n {
            0 => Some(DisposalMethod::NotSpecified),
            1 => Some(DisposalMethod::DoNotDispose),
            2 => Some(DisposalMethod::RestoreToBackgroundColour),
            3 => Some(DisposalMethod::RestoreToPrevious),
            _ => None,
        }
    }
}

/// Controls how the image that follows is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicControlExtension {
    block_size: u8,
    disposal_method: DisposalMethod,
    expects_user_input: bool,
    has_transparent_colour: bool,
    delay: u16,
    transparent_colour_index: u8,
    status: ComponentStatus,
}

impl GraphicControlExtension {
    /// Create an extension. `delay` is in hundredths of a second.
    pub fn new(
        delay: u16,
        disposal_method: DisposalMethod,
        expects_user_input: bool,
        transparent_colour_index: Option<u8>,
    ) -> Self {
        Self {
            block_size: BLOCK_SIZE,
            disposal_method,
            expects_user_input,
            has_transparent_colour: transparent_colour_index.is_some(),
            delay,
            transparent_colour_index: transparent_colour_index.unwrap_or(0),
            status: ComponentStatus::new(),
        }
    }

    /// Read the extension body (introducer and label already consumed).
    ///
    /// A disposal method of "not specified", or any reserved value, is read
    /// as [`DisposalMethod::DoNotDispose`].
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Self {
        let block = DataBlock::read_from(reader);
        let mut status = ComponentStatus::new();
        status.absorb(block.status());

        let byte = |i: usize| block.data().get(i).copied().unwrap_or(0);
        let packed = byte(0);
        let disposal_method = match DisposalMethod::from_u8((packed >> 2) & 0b111) {
            Some(DisposalMethod::NotSpecified) | None => DisposalMethod::DoNotDispose,
            Some(method) => method,
        };

        // A zero-length data block is itself the terminator.
        if block.declared_block_size() > 0 && !block.error_state().contains(ErrorState::END_OF_INPUT_STREAM) {
            let state = skip_sub_blocks(reader);
            if !state.is_ok() {
                status.set(state, "End of input stream reached while reading graphic control extension");
            }
        }

        Self {
            block_size: block.declared_block_size(),
            disposal_method,
            expects_user_input: packed & 0b10 != 0,
            has_transparent_colour: packed & 0b1 != 0,
            delay: u16::from_le_bytes([byte(1), byte(2)]),
            transparent_colour_index: byte(3),
            status,
        }
    }

    /// Write the complete extension, introducer to terminator.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_extension_header(writer, ExtensionLabel::GraphicControl)?;
        let mut packed = (self.disposal_method as u8) << 2;
        if self.expects_user_input {
            packed |= 0b10;
        }
        if self.has_transparent_colour {
            packed |= 0b1;
        }
        writer.write_le(BLOCK_SIZE)?;
        writer.write_le(packed)?;
        writer.write_le(self.delay)?;
        writer.write_le(self.transparent_colour_index)?;
        writer.write_le(BLOCK_TERMINATOR)?;
        Ok(())
    }

    /// Declared size of the data block, normally 4.
    pub fn block_size(&self) -> u8 {
        self.block_size
    }

    /// Disposal method.
    pub fn disposal_method(&self) -> DisposalMethod {
        self.disposal_method
    }

    /// Whether the viewer should wait for user input.
    pub fn expects_user_input(&self) -> bool {
        self.expects_user_input
    }

    /// Whether `transparent_colour_index` is meaningful.
    pub fn has_transparent_colour(&self) -> bool {
        self.has_transparent_colour
    }

    /// Delay in hundredths of a second.
    pub fn delay(&self) -> u16 {
        self.delay
    }

    /// Raw transparent colour index byte.
    pub fn transparent_colour_index(&self) -> u8 {
        self.transparent_colour_index
    }

    /// Transparent colour index if one is declared.
    pub fn transparent_index(&self) -> Option<u8> {
        self.has_transparent_colour.then_some(self.transparent_colour_index)
    }
}

impl GifComponent for GraphicControlExtension {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}
