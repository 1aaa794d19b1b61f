//! Comment extension.
//!
//! Comment text is stored as Windows-1252 (a superset of the ASCII the
//! format asks for) in ordinary data sub-blocks.

use crate::block::{ExtensionLabel, write_extension_header};
use encoding_rs::WINDOWS_1252;
use oxigif_core::{ComponentStatus, ErrorState, GifComponent, Result, SubBlocks, write_sub_blocks};
use std::io::{Read, Write};

/// Free text embedded in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentExtension {
    text: String,
    status: ComponentStatus,
}

impl CommentExtension {
    /// Create a comment.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: ComponentStatus::new(),
        }
    }

    /// Read the comment sub-blocks (introducer and label already consumed).
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Self {
        let blocks = SubBlocks::read_from(reader);
        let mut status = ComponentStatus::new();
        let state = blocks.state();
        if !blocks.terminated || !state.is_ok() {
            status.set(
                state | ErrorState::END_OF_INPUT_STREAM,
                "End of input stream reached while reading comment",
            );
        }
        let bytes = blocks.concat();
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(&bytes);
        Self {
            text: text.into_owned(),
            status,
        }
    }

    /// Write the complete extension, introducer to terminator. Characters
    /// outside Windows-1252 are written as numeric character references.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_extension_header(writer, ExtensionLabel::Comment)?;
        let (bytes, _, _) = WINDOWS_1252.encode(&self.text);
        write_sub_blocks(writer, &bytes)
    }

    /// Comment text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl GifComponent for CommentExtension {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_roundtrip_latin() {
        let comment = CommentExtension::new("Café 50° ±");
        let mut out = Vec::new();
        comment.write_to(&mut out).unwrap();
        assert_eq!(&out[..2], &[0x21, 0xFE]);
        let read = CommentExtension::read_from(&mut Cursor::new(&out[2..]));
        assert_eq!(read.text(), "Café 50° ±");
        assert!(read.error_state().is_ok());
    }

    #[test]
    fn test_long_comment_spans_blocks() {
        let text = "x".repeat(600);
        let mut out = Vec::new();
        CommentExtension::new(text.clone()).write_to(&mut out).unwrap();
        assert_eq!(out[2], 0xFF);
        let read = CommentExtension::read_from(&mut Cursor::new(&out[2..]));
        assert_eq!(read.text(), text);
    }

    #[test]
    fn test_unterminated() {
        let read = CommentExtension::read_from(&mut Cursor::new(vec![3, b'a', b'b', b'c']));
        assert_eq!(read.text(), "abc");
        assert!(read.test_state(ErrorState::END_OF_INPUT_STREAM));
    }
}
