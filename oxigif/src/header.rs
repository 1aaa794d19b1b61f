//! GIF header: the `GIF` signature and a three character version.

use oxigif_core::{ComponentStatus, ErrorState, GifComponent, GifError, ReadBytesExt, Result};
use std::io::{Read, Write};

/// Expected signature.
pub const SIGNATURE: &str = "GIF";
/// Version written by the encoder.
pub const VERSION_89A: &str = "89a";

/// The six byte header at the start of every GIF stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifHeader {
    signature: String,
    version: String,
    status: ComponentStatus,
}

impl GifHeader {
    /// Create a `GIF` header with the given version (three ASCII characters).
    pub fn new(version: &str) -> Result<Self> {
        if version.len() != 3 || !version.is_ascii() {
            return Err(GifError::invalid_argument(
                "version",
                format!("expected three ASCII characters, got {version:?}"),
            ));
        }
        Ok(Self {
            signature: SIGNATURE.to_string(),
            version: version.to_string(),
            status: ComponentStatus::new(),
        })
    }

    /// Read a header. A wrong signature is flagged as
    /// [`ErrorState::BAD_SIGNATURE`]; a short read as
    /// [`ErrorState::END_OF_INPUT_STREAM`].
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Self {
        let mut status = ComponentStatus::new();
        let signature = reader.read_up_to(3);
        let version = reader.read_up_to(3);

        if signature.len() < 3 || version.len() < 3 {
            status.set(
                ErrorState::END_OF_INPUT_STREAM,
                "End of input stream reached while reading GIF header",
            );
        }
        let signature_text = latin1(&signature);
        if signature.len() == 3 && signature != SIGNATURE.as_bytes() {
            status.set(
                ErrorState::BAD_SIGNATURE,
                format!("Bad signature: expected {SIGNATURE:?}, found {signature_text:?}"),
            );
        }
        let version = latin1(&version);
        tracing::debug!(signature = %signature_text, %version, "read header");

        Self {
            signature: signature_text,
            version,
            status,
        }
    }

    /// Write the signature and version.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let bytes: Vec<u8> = self
            .signature
            .chars()
            .chain(self.version.chars())
            .map(|c| u8::try_from(c).unwrap_or(b'?'))
            .collect();
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Signature as read, normally `GIF`.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Version, e.g. `89a` or `87a`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// One `char` per byte, so arbitrary header bytes survive a write.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

impl Default for GifHeader {
    fn default() -> Self {
        Self {
            signature: SIGNATURE.to_string(),
            version: VERSION_89A.to_string(),
            status: ComponentStatus::new(),
        }
    }
}

impl GifComponent for GifHeader {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_valid() {
        let header = GifHeader::read_from(&mut Cursor::new(b"GIF89a".to_vec()));
        assert_eq!(header.signature(), "GIF");
        assert_eq!(header.version(), "89a");
        assert!(header.error_state().is_ok());
    }

    #[test]
    fn test_bad_signature() {
        let header = GifHeader::read_from(&mut Cursor::new(b"FIG89a".to_vec()));
        assert_eq!(header.signature(), "FIG");
        assert!(header.test_state(ErrorState::BAD_SIGNATURE));
    }

    #[test]
    fn test_binary_signature() {
        // PNG and JPEG magic numbers start with bytes above 0x7F.
        for magic in [&b"\x89PNG\r\n"[..], &b"\xFF\xD8\xFF\xE0\x00\x10"[..]] {
            let header = GifHeader::read_from(&mut Cursor::new(magic.to_vec()));
            assert_eq!(header.signature().chars().count(), 3);
            assert!(header.test_state(ErrorState::BAD_SIGNATURE));
            assert!(!header.test_state(ErrorState::END_OF_INPUT_STREAM));

            let mut out = Vec::new();
            header.write_to(&mut out).unwrap();
            assert_eq!(out, magic);
        }
    }

    #[test]
    fn test_truncated() {
        let header = GifHeader::read_from(&mut Cursor::new(b"GIF8".to_vec()));
        assert_eq!(header.version(), "8");
        assert!(header.test_state(ErrorState::END_OF_INPUT_STREAM));
        assert!(!header.test_state(ErrorState::BAD_SIGNATURE));
    }

    #[test]
    fn test_write() {
        let mut out = Vec::new();
        GifHeader::new("87a").unwrap().write_to(&mut out).unwrap();
        assert_eq!(out, b"GIF87a");
        assert!(GifHeader::new("89").is_err());
    }
}
