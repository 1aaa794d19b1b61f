//! Application extensions, including the Netscape 2.0 looping extension.

use crate::block::{ExtensionLabel, write_extension_header};
use oxigif_core::{
    BLOCK_TERMINATOR, ComponentStatus, DataBlock, ErrorState, GifComponent, GifError, Result, SubBlocks,
    WriteBytesExt,
};
use std::io::{Read, Write};

/// Length of the identification block: 8 identifier bytes plus a 3 byte
/// authentication code.
pub const IDENTIFICATION_SIZE: usize = 11;

/// Identifier of the looping extension.
pub const NETSCAPE_IDENTIFIER: &str = "NETSCAPE";
/// Authentication code of the looping extension.
pub const NETSCAPE_AUTH_CODE: &str = "2.0";

const LOOP_SUB_BLOCK_ID: u8 = 1;

/// A generic application extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationExtension {
    identification: DataBlock,
    data: Vec<DataBlock>,
    status: ComponentStatus,
}

impl ApplicationExtension {
    /// Create an extension from an 8 character identifier, a 3 character
    /// authentication code and the application data sub-blocks.
    pub fn new(identifier: &str, authentication_code: &str, data: Vec<DataBlock>) -> Result<Self> {
        if identifier.len() != 8 || !identifier.is_ascii() {
            return Err(GifError::invalid_argument(
                "identifier",
                format!("expected 8 ASCII characters, got {identifier:?}"),
            ));
        }
        if authentication_code.len() != 3 || !authentication_code.is_ascii() {
            return Err(GifError::invalid_argument(
                "authentication_code",
                format!("expected 3 ASCII characters, got {authentication_code:?}"),
            ));
        }
        let id = format!("{identifier}{authentication_code}").into_bytes();
        Ok(Self {
            identification: DataBlock::from_data(id)?,
            data,
            status: ComponentStatus::new(),
        })
    }

    /// Read the extension body (introducer and label already consumed).
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Self {
        let identification = DataBlock::read_from(reader);
        let mut status = ComponentStatus::new();

        let declared = identification.declared_block_size() as usize;
        if declared > IDENTIFICATION_SIZE {
            status.set(
                ErrorState::IDENTIFICATION_BLOCK_TOO_LONG,
                format!("Application identification block is {declared} bytes, expected 11"),
            );
        } else if declared < IDENTIFICATION_SIZE {
            status.set(
                ErrorState::IDENTIFICATION_BLOCK_TOO_SHORT,
                format!("Application identification block is {declared} bytes, expected 11"),
            );
        }

        let data = if identification.error_state().contains(ErrorState::END_OF_INPUT_STREAM) {
            Vec::new()
        } else {
            let blocks = SubBlocks::read_from(reader);
            if !blocks.terminated {
                status.set(
                    ErrorState::END_OF_INPUT_STREAM,
                    "End of input stream reached while reading application data",
                );
            }
            blocks.blocks
        };

        let ext = Self {
            identification,
            data,
            status,
        };
        tracing::debug!(
            identifier = %ext.identifier(),
            blocks = ext.data.len(),
            "read application extension"
        );
        ext
    }

    /// Write the complete extension, introducer to terminator.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write_extension_header(writer, ExtensionLabel::Application)?;
        self.identification.write_to(writer)?;
        for block in &self.data {
            block.write_to(writer)?;
        }
        writer.write_le(BLOCK_TERMINATOR)?;
        Ok(())
    }

    /// First 8 bytes of the identification block.
    pub fn identifier(&self) -> String {
        self.identification.data().iter().take(8).map(|&b| b as char).collect()
    }

    /// Bytes 9 to 11 of the identification block.
    pub fn authentication_code(&self) -> String {
        self.identification.data().iter().skip(8).take(3).map(|&b| b as char).collect()
    }

    /// The raw identification block.
    pub fn identification_block(&self) -> &DataBlock {
        &self.identification
    }

    /// Application data sub-blocks.
    pub fn data(&self) -> &[DataBlock] {
        &self.data
    }

    /// Whether this is a `NETSCAPE2.0` extension.
    pub fn is_netscape(&self) -> bool {
        self.identifier() == NETSCAPE_IDENTIFIER && self.authentication_code() == NETSCAPE_AUTH_CODE
    }
}

impl GifComponent for ApplicationExtension {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }

    fn children(&self) -> Vec<&dyn GifComponent> {
        let mut children: Vec<&dyn GifComponent> = vec![&self.identification];
        children.extend(self.data.iter().map(|b| b as &dyn GifComponent));
        children
    }
}

/// The `NETSCAPE2.0` extension carrying the animation loop count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetscapeExtension {
    application: ApplicationExtension,
    loop_count: u16,
    status: ComponentStatus,
}

impl NetscapeExtension {
    /// Create a looping extension. A loop count of 0 repeats forever.
    pub fn new(loop_count: u16) -> Self {
        let [lo, hi] = loop_count.to_le_bytes();
        let application = ApplicationExtension {
            identification: DataBlock::new(
                IDENTIFICATION_SIZE as u8,
                format!("{NETSCAPE_IDENTIFIER}{NETSCAPE_AUTH_CODE}").into_bytes(),
            ),
            data: vec![DataBlock::new(3, vec![LOOP_SUB_BLOCK_ID, lo, hi])],
            status: ComponentStatus::new(),
        };
        Self {
            application,
            loop_count,
            status: ComponentStatus::new(),
        }
    }

    /// Number of times to play the animation, 0 meaning forever.
    pub fn loop_count(&self) -> u16 {
        self.loop_count
    }

    /// The underlying application extension.
    pub fn application(&self) -> &ApplicationExtension {
        &self.application
    }

    /// Write the complete extension.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        self.application.write_to(writer)
    }
}

impl TryFrom<ApplicationExtension> for NetscapeExtension {
    type Error = GifError;

    /// Interpret an application extension as `NETSCAPE2.0`.
    ///
    /// A missing loop-count sub-block is not an error; it is flagged as
    /// [`ErrorState::MISSING_LOOP_COUNT`] and the count defaults to 1.
    fn try_from(application: ApplicationExtension) -> Result<Self> {
        if !application.is_netscape() {
            return Err(GifError::invalid_argument(
                "application",
                format!(
                    "expected a {NETSCAPE_IDENTIFIER}{NETSCAPE_AUTH_CODE} extension, got {}{}",
                    application.identifier(),
                    application.authentication_code()
                ),
            ));
        }

        let mut status = ComponentStatus::new();
        let loop_count = application
            .data
            .iter()
            .map(DataBlock::data)
            .find(|d| d.len() >= 3 && d[0] == LOOP_SUB_BLOCK_ID)
            .map(|d| u16::from_le_bytes([d[1], d[2]]));
        let loop_count = match loop_count {
            Some(count) => count,
            None => {
                status.set(
                    ErrorState::MISSING_LOOP_COUNT,
                    "Netscape extension has no loop count sub-block",
                );
                1
            }
        };

        Ok(Self {
            application,
            loop_count,
            status,
        })
    }
}

impl GifComponent for NetscapeExtension {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }

    fn children(&self) -> Vec<&dyn GifComponent> {
        vec![&self.application]
    }
}
