//! 7-segment rendering: glyph table and the push-model renderer.

pub mod glyphs;
pub mod segment;

pub use segment::{DISPLAY_RAM_LEN, DisplayBuffer, SegmentRenderer};
