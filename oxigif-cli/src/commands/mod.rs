//! Command implementations for the OxiGIF CLI.

pub mod info;
pub mod palette;
pub mod recode;
pub mod test;

pub use info::cmd_info;
pub use palette::{cmd_palette_extract, cmd_palette_show};
pub use recode::{RecodeOptions, cmd_recode};
pub use test::cmd_test;
