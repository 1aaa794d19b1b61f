//! # OxiGIF Core
//!
//! Core components for the OxiGIF codec.
//!
//! This crate provides the building blocks shared by every other layer:
//!
//! - [`status`]: Permissive error-state model ([`ErrorState`], [`GifComponent`])
//! - [`data_block`]: Length-prefixed data sub-blocks
//! - [`stream`]: Permissive little-endian byte reads and writes
//! - [`colour`]: RGBA colours and true-colour bitmaps
//! - [`progress`]: Lock-free progress reporting
//! - [`error`]: Error types for contract violations
//!
//! ## Architecture
//!
//! OxiGIF is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     info, test, recode, palette                         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Format                                              │
//! │     GifDecoder, AnimatedGifEncoder, PixelAnalysis, ACT  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     GIF LZW, Octree and NeuQuant quantizers             │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     ErrorState, DataBlock, Colour, Bitmap, Progress     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxigif_core::{DataBlock, ErrorState, GifComponent};
//! use std::io::Cursor;
//!
//! // A block declaring 5 bytes but holding only 4 is kept, with a flag.
//! let block = DataBlock::read_from(&mut Cursor::new(vec![5, 1, 2, 3, 4]));
//! assert_eq!(block.actual_block_size(), 4);
//! assert!(block.test_state(ErrorState::DATA_BLOCK_TOO_SHORT));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod colour;
pub mod data_block;
pub mod error;
pub mod progress;
pub mod status;
pub mod stream;

// Re-exports for convenience
pub use colour::{Bitmap, Colour, nearest_colour_index};
pub use data_block::{
    BLOCK_TERMINATOR, DataBlock, MAX_BLOCK_SIZE, SubBlockWriter, SubBlocks, skip_sub_blocks,
    write_sub_blocks,
};
pub use error::{GifError, Result};
pub use progress::{Progress, Stage};
pub use status::{ComponentStatus, ErrorState, GifComponent};
pub use stream::{IoErrorCapture, ReadBytesExt, WriteBytesExt};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::colour::{Bitmap, Colour};
    pub use crate::data_block::DataBlock;
    pub use crate::error::{GifError, Result};
    pub use crate::progress::{Progress, Stage};
    pub use crate::status::{ComponentStatus, ErrorState, GifComponent};
    pub use crate::stream::{ReadBytesExt, WriteBytesExt};
}
