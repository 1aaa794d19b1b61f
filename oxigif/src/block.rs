//! Block introducers and extension labels.

use oxigif_core::WriteBytesExt;
use std::io::{self, Write};

/// Byte introducing every extension block.
pub const EXTENSION_INTRODUCER: u8 = 0x21;
/// Byte introducing an image descriptor.
pub const IMAGE_SEPARATOR: u8 = 0x2C;
/// Byte ending a GIF stream.
pub const TRAILER: u8 = 0x3B;

/// Known GIF block types.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum Block {
    /// Image block.
    Image = IMAGE_SEPARATOR,
    /// Extension block.
    Extension = EXTENSION_INTRODUCER,
    /// Image trailer.
    Trailer = TRAILER,
}

impl Block {
    /// Converts `u8` to `Option<Self>`.
    pub fn from_u8(n: u8) -> Option<Block> {
        match n {
            IMAGE_SEPARATOR => Some(Block::Image),
            EXTENSION_INTRODUCER => Some(Block::Extension),
            TRAILER => Some(Block::Trailer),
            _ => None,
        }
    }
}

/// Known GIF extension labels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtensionLabel {
    /// Plain text extension.
    PlainText = 0x01,
    /// Graphic control extension.
    GraphicControl = 0xF9,
    /// Comment extension.
    Comment = 0xFE,
    /// Application extension.
    Application = 0xFF,
}

impl ExtensionLabel {
    /// Converts `u8` to `Option<Self>`.
    pub fn from_u8(n: u8) -> Option<ExtensionLabel> {
        match n {
            0x01 => Some(ExtensionLabel::PlainText),
            0xF9 => Some(ExtensionLabel::GraphicControl),
            0xFE => Some(ExtensionLabel::Comment),
            0xFF => Some(ExtensionLabel::Application),
            _ => None,
        }
    }
}

/// Write the two bytes that open an extension.
pub fn write_extension_header<W: Write + ?Sized>(writer: &mut W, label: ExtensionLabel) -> io::Result<()> {
    writer.write_le(EXTENSION_INTRODUCER)?;
    writer.write_le(label as u8)
}
