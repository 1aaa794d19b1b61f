//! Byte-level stream primitives.
//!
//! GIF is a byte-oriented little-endian format. Reads are permissive: a read
//! past the end of the stream yields `None` (or a shorter buffer) instead of
//! an error, so callers can flag [`ErrorState::END_OF_INPUT_STREAM`] and keep
//! whatever was read.
//!
//! [`ErrorState::END_OF_INPUT_STREAM`]: crate::ErrorState::END_OF_INPUT_STREAM

use std::io::{self, Read, Write};

/// Reader extension for permissive GIF reads.
pub trait ReadBytesExt: Read {
    /// Read one byte, or `None` at end of stream.
    ///
    /// An I/O error other than `Interrupted` is treated as end of stream.
    /// Wrap the reader in [`IoErrorCapture`] to recover it afterwards.
    fn read_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.read(&mut buf) {
                Ok(0) => return None,
                Ok(_) => return Some(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "read failed, treating as end of stream");
                    return None;
                }
            }
        }
    }

    /// Read a little-endian `u16`, or `None` if fewer than two bytes remain.
    fn read_le_u16(&mut self) -> Option<u16> {
        let lo = self.read_byte()?;
        let hi = self.read_byte()?;
        Some(u16::from_le_bytes([lo, hi]))
    }

    /// Read up to `len` bytes. The result is shorter than `len` only when the
    /// stream ended.
    fn read_up_to(&mut self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "read failed, treating as end of stream");
                    break;
                }
            }
        }
        buf.truncate(filled);
        buf
    }
}

impl<R: Read + ?Sized> ReadBytesExt for R {}

/// Reader adapter that ends the stream at the first I/O error and keeps the
/// error, so a failing reader can be told apart from a short one.
#[derive(Debug)]
pub struct IoErrorCapture<R> {
    inner: R,
    error: Option<io::Error>,
}

impl<R> IoErrorCapture<R> {
    /// Wrap `inner`.
    pub fn new(inner: R) -> Self {
        Self { inner, error: None }
    }

    /// The error that ended the stream, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

impl<R: Read> Read for IoErrorCapture<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.error.is_some() {
            return Ok(0);
        }
        loop {
            match self.inner.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(e);
                    return Ok(0);
                }
                result => return result,
            }
        }
    }
}

/// Writer extension to write little endian data.
pub trait WriteBytesExt<T> {
    /// Writes `T` to a bytes stream. Least significant byte first.
    fn write_le(&mut self, n: T) -> io::Result<()>;
}

impl<W: Write + ?Sized> WriteBytesExt<u8> for W {
    #[inline]
    fn write_le(&mut self, n: u8) -> io::Result<()> {
        self.write_all(&[n])
    }
}

impl<W: Write + ?Sized> WriteBytesExt<u16> for W {
    #[inline]
    fn write_le(&mut self, n: u16) -> io::Result<()> {
        self.write_all(&n.to_le_bytes())
    }
}
