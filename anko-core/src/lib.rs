//! Anko Terminal Core
//!
//! This crate provides the color and attribute engine of the terminal:
//! - Tagged color encoding shared with the renderer (default / palette
//!   index / explicit RGB)
//! - Per-screen color profiles: the 256-color table plus the five
//!   special colors, with configured/overridden layering and a dirty
//!   flag for the GPU upload path
//! - SGR (Select Graphic Rendition) interpretation, applied to either
//!   the cursor's pending state or a contiguous run of render cells
//! - Cursor entity with save/restore, structural equality, and
//!   re-serialization back into an SGR sequence
//!
//! Escape-sequence tokenization, the cell grid, and pixel compositing
//! live elsewhere: this crate consumes pre-split `&[u16]` parameter
//! slices and produces value state the renderer reads.

pub mod cell;
pub mod color;
pub mod cursor;
pub mod profile;
pub mod sgr;

pub use cell::{cell_as_sgr, CellAttrs, RenderCell};
pub use color::{base_color_table, Color, Rgb};
pub use cursor::{Cursor, CursorShape};
pub use profile::{
    patch_color_profiles, ColorPatch, ColorProfile, ProfileError, SpecialColor,
};
pub use sgr::{apply_sgr_to_cells, apply_sgr_to_cursor, parse_sgr_color, DECORATION_FG_CODE};
