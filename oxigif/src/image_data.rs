//! Table-based image data: the LZW-compressed palette indices of one image.

use oxigif_core::{ComponentStatus, ErrorState, GifComponent, ReadBytesExt, Result, SubBlocks, skip_sub_blocks};
use oxigif_lzw::{DecodeEnd, LzwConfig, LzwDecoder, LzwEncoder, MAX_MIN_CODE_SIZE};
use std::io::{Read, Write};

/// The palette indices of one image.
///
/// After reading, [`pixels`](Self::pixels) always holds exactly the number
/// of pixels requested, whatever state the data was in. Pixels that could
/// not be decoded are index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBasedImageData {
    lzw_minimum_code_size: u8,
    pixels: Vec<u8>,
    status: ComponentStatus,
}

impl TableBasedImageData {
    /// Wrap indices for encoding against a colour table of `colour_count`
    /// entries.
    pub fn new(pixels: Vec<u8>, colour_count: usize) -> Self {
        Self {
            lzw_minimum_code_size: LzwConfig::for_colour_count(colour_count).min_code_size,
            pixels,
            status: ComponentStatus::new(),
        }
    }

    /// Read the minimum code size byte and the data sub-blocks, and decode
    /// them into `pixel_count` indices.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, pixel_count: usize) -> Self {
        let mut status = ComponentStatus::new();
        let Some(lzw_minimum_code_size) = reader.read_byte() else {
            status.set(
                ErrorState::END_OF_INPUT_STREAM | ErrorState::TOO_FEW_PIXELS_IN_IMAGE_DATA,
                "End of input stream reached while reading LZW minimum code size",
            );
            return Self {
                lzw_minimum_code_size: 0,
                pixels: vec![0; pixel_count],
                status,
            };
        };

        if lzw_minimum_code_size > MAX_MIN_CODE_SIZE {
            status.set(
                ErrorState::LZW_MINIMUM_CODE_SIZE_TOO_LARGE,
                format!("LZW minimum code size {lzw_minimum_code_size} is larger than {MAX_MIN_CODE_SIZE}"),
            );
            let state = skip_sub_blocks(reader);
            if !state.is_ok() {
                status.set(state, "End of input stream reached while skipping image data");
            }
            return Self {
                lzw_minimum_code_size,
                pixels: vec![0; pixel_count],
                status,
            };
        }

        let blocks = SubBlocks::read_from(reader);
        for block in &blocks.blocks {
            status.absorb(block.status());
        }

        let data = blocks.concat();
        let config = LzwConfig {
            min_code_size: lzw_minimum_code_size,
        };
        let decoded = LzwDecoder::new(config).decode(&data, pixel_count);
        let mut pixels = decoded.indices;

        match decoded.end {
            DecodeEnd::UnknownCode(code) => {
                status.set(
                    ErrorState::CODE_NOT_IN_DICTIONARY,
                    format!("LZW code {code} is not in the dictionary"),
                );
                pixels.clear();
                pixels.resize(pixel_count, 0);
            }
            _ if pixels.len() < pixel_count => {
                status.set(
                    ErrorState::TOO_FEW_PIXELS_IN_IMAGE_DATA,
                    format!("Image data holds {} of {pixel_count} pixels", pixels.len()),
                );
                pixels.resize(pixel_count, 0);
            }
            _ => {}
        }

        tracing::trace!(
            min_code_size = lzw_minimum_code_size,
            compressed = data.len(),
            pixels = pixel_count,
            end = ?decoded.end,
            "decoded image data"
        );

        Self {
            lzw_minimum_code_size,
            pixels,
            status,
        }
    }

    /// Write the minimum code size byte, the LZW sub-blocks and the
    /// terminator.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let config = LzwConfig::for_encoding(self.lzw_minimum_code_size)?;
        LzwEncoder::new(config)?.encode_to(&self.pixels, writer)?;
        Ok(())
    }

    /// LZW minimum code size.
    pub fn lzw_minimum_code_size(&self) -> u8 {
        self.lzw_minimum_code_size
    }

    /// Palette index of every pixel, in stream order.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }
}

impl GifComponent for TableBasedImageData {
    fn status(&self) -> &ComponentStatus {
        &self.status
    }
}
