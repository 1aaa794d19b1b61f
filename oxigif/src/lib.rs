//! # OxiGIF: GIF89a Decoding and Animated GIF Encoding
//!
//! The format layer of OxiGIF. It reads and writes every structural part of
//! a GIF stream and ties the LZW codec and the colour quantizers together.
//!
//! ## Features
//!
//! - **Permissive decoding**: malformed input never aborts a decode. Each
//!   component records [`ErrorState`] flags, and a parent reports the union
//!   of its children through [`GifComponent::consolidated_state`]
//! - **Frame compositing**: decoded frames are full logical screen images,
//!   with disposal methods, transparency and interlacing applied
//! - **Animated encoding**: global or per-frame colour tables, looping,
//!   delays, positions and a transparent colour
//! - **Colour reduction**: exact tables for up to 256 colours, NeuQuant or
//!   Octree beyond that, or mapping onto a supplied ACT palette
//!
//! ## Stream Layout
//!
//! ```text
//! Header  "GIF89a"
//! Logical Screen Descriptor
//! [Global Colour Table]
//! ( Extension 0x21 <label> ... | Image 0x2C Descriptor [Local Table] Data )*
//! Trailer 0x3B
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxigif::{AnimatedGifEncoder, ColourTableStrategy, EncoderConfig, GifDecoder};
//! use oxigif_core::{Bitmap, Colour, GifComponent};
//!
//! let checkerboard = Bitmap::from_pixels(
//!     2,
//!     2,
//!     vec![Colour::BLACK, Colour::WHITE, Colour::WHITE, Colour::BLACK],
//! )
//! .unwrap();
//!
//! let config = EncoderConfig::new()
//!     .with_strategy(ColourTableStrategy::UseGlobal)
//!     .with_repeat_count(0);
//! let mut encoder = AnimatedGifEncoder::with_config(config);
//! encoder.add_image(checkerboard.clone(), 10).unwrap();
//! let mut gif = Vec::new();
//! encoder.write_to_stream(&mut gif).unwrap();
//!
//! let decoder = GifDecoder::from_bytes(&gif).unwrap();
//! assert!(decoder.consolidated_state().is_ok());
//! assert_eq!(decoder.frames()[0].image(), &checkerboard);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod application;
pub mod block;
pub mod colour_table;
pub mod comment;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod graphic_control;
pub mod header;
pub mod image_data;
pub mod image_descriptor;
pub mod palette;
pub mod pixel_analysis;
pub mod screen;

pub use application::{ApplicationExtension, NetscapeExtension};
pub use block::{Block, ExtensionLabel};
pub use colour_table::ColourTable;
pub use comment::CommentExtension;
pub use decoder::{DecoderState, GifDecoder};
pub use encoder::{AnimatedGifEncoder, ColourTableStrategy, EncoderConfig};
pub use frame::{FrameContext, GifFrame, MAX_DECODED_PIXELS};
pub use graphic_control::{DisposalMethod, GraphicControlExtension};
pub use header::GifHeader;
pub use image_data::TableBasedImageData;
pub use image_descriptor::ImageDescriptor;
pub use palette::Palette;
pub use pixel_analysis::{PixelAnalysis, QuantizerType};
pub use screen::LogicalScreenDescriptor;

pub use oxigif_core::{Bitmap, Colour, ErrorState, GifComponent, GifError, Progress, Result, Stage};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::decoder::GifDecoder;
    pub use crate::encoder::{AnimatedGifEncoder, ColourTableStrategy, EncoderConfig};
    pub use crate::frame::GifFrame;
    pub use crate::palette::Palette;
    pub use crate::pixel_analysis::{PixelAnalysis, QuantizerType};
    pub use oxigif_core::prelude::*;
}
