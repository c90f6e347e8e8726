//! Cursor state management
//!
//! The cursor tracks:
//! - Position (x, y in cell coordinates)
//! - Shape and blink
//! - The pending display attributes and colors applied to new text
//!
//! Structural equality lets higher layers skip redraw signaling when an
//! escape sequence left the visible state unchanged, and `as_sgr`
//! re-serializes the attribute state for save/replay paths.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::{cell_as_sgr, CellAttrs, RenderCell};
use crate::color::Color;

/// Cursor shape requested by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    /// No shape set; rendered as hidden
    #[default]
    NoShape,
    /// Block cursor
    Block,
    /// Bar/beam cursor
    Beam,
    /// Underline cursor
    Underline,
}

impl fmt::Display for CursorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CursorShape::NoShape => "NO_SHAPE",
            CursorShape::Block => "BLOCK",
            CursorShape::Beam => "BEAM",
            CursorShape::Underline => "UNDERLINE",
        };
        f.write_str(name)
    }
}

/// Cursor state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub x: usize,
    /// Row position (0-indexed)
    pub y: usize,
    pub shape: CursorShape,
    pub blink: bool,
    pub bold: bool,
    pub italic: bool,
    pub reverse: bool,
    pub strikethrough: bool,
    pub dim: bool,
    /// Underline style: 0 none, 1 single, 2 double
    pub decoration: u8,
    /// Foreground color for new text
    pub fg: Color,
    /// Background color for new text
    pub bg: Color,
    /// Underline color for new text
    pub decoration_fg: Color,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the pending display attributes and colors (SGR 0).
    /// Position, shape and blink are untouched.
    pub fn reset_display_attrs(&mut self) {
        self.bold = false;
        self.italic = false;
        self.reverse = false;
        self.strikethrough = false;
        self.dim = false;
        self.decoration = 0;
        self.fg = Color::Default;
        self.bg = Color::Default;
        self.decoration_fg = Color::Default;
    }

    /// Full reset: display attributes plus position, shape and blink.
    pub fn reset(&mut self) {
        self.reset_display_attrs();
        self.x = 0;
        self.y = 0;
        self.shape = CursorShape::NoShape;
        self.blink = false;
    }

    /// Copy every field into `dest`; used for save/restore-cursor.
    pub fn copy_to(&self, dest: &mut Cursor) {
        dest.clone_from(self);
    }

    /// The render cell this cursor would stamp for a width-1 character.
    pub fn cell_image(&self) -> RenderCell {
        let mut attrs = CellAttrs::empty();
        attrs.set_width(1);
        attrs.set_decoration(self.decoration);
        attrs.set(CellAttrs::BOLD, self.bold);
        attrs.set(CellAttrs::ITALIC, self.italic);
        attrs.set(CellAttrs::REVERSE, self.reverse);
        attrs.set(CellAttrs::STRIKETHROUGH, self.strikethrough);
        attrs.set(CellAttrs::DIM, self.dim);
        RenderCell {
            attrs,
            fg: self.fg,
            bg: self.bg,
            decoration_fg: self.decoration_fg,
        }
    }

    /// The minimal SGR parameter string that reproduces this cursor's
    /// attribute and color state from a fresh default state. Uses the
    /// same serializer as drawn cells, so replayed state matches what was
    /// rendered.
    pub fn as_sgr(&self) -> String {
        cell_as_sgr(&self.cell_image(), &RenderCell::default())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::color::Rgb;
    use crate::sgr::apply_sgr_to_cursor;

    #[test]
    fn test_cursor_default() {
        let cursor = Cursor::new();
        assert_eq!(cursor.x, 0);
        assert_eq!(cursor.y, 0);
        assert_eq!(cursor.shape, CursorShape::NoShape);
        assert!(!cursor.blink);
        assert_eq!(cursor.fg, Color::Default);
    }

    #[test]
    fn test_reset_display_attrs_keeps_position() {
        let mut cursor = Cursor::new();
        cursor.x = 7;
        cursor.y = 3;
        cursor.shape = CursorShape::Beam;
        cursor.bold = true;
        cursor.fg = Color::Indexed(5);
        cursor.reset_display_attrs();
        assert_eq!(cursor.x, 7);
        assert_eq!(cursor.y, 3);
        assert_eq!(cursor.shape, CursorShape::Beam);
        assert!(!cursor.bold);
        assert_eq!(cursor.fg, Color::Default);
    }

    #[test]
    fn test_full_reset() {
        let mut cursor = Cursor::new();
        cursor.x = 7;
        cursor.y = 3;
        cursor.shape = CursorShape::Block;
        cursor.blink = true;
        cursor.dim = true;
        cursor.reset();
        assert_eq!(cursor, Cursor::new());
    }

    #[test]
    fn test_copy_to() {
        let mut cursor = Cursor::new();
        cursor.x = 2;
        cursor.decoration = 2;
        cursor.bg = Color::Rgb(Rgb::new(1, 2, 3));
        let mut saved = Cursor::new();
        cursor.copy_to(&mut saved);
        assert_eq!(cursor, saved);
    }

    #[test]
    fn test_shape_labels() {
        assert_eq!(CursorShape::NoShape.to_string(), "NO_SHAPE");
        assert_eq!(CursorShape::Beam.to_string(), "BEAM");
    }

    #[test]
    fn test_as_sgr_default_is_empty() {
        assert_eq!(Cursor::new().as_sgr(), "");
    }

    #[test]
    fn test_as_sgr_examples() {
        let mut cursor = Cursor::new();
        cursor.bold = true;
        cursor.fg = Color::Indexed(1);
        assert_eq!(cursor.as_sgr(), "1;31");

        let mut cursor = Cursor::new();
        cursor.decoration = 2;
        cursor.decoration_fg = Color::Indexed(4);
        assert_eq!(cursor.as_sgr(), "58:5:4;4:2");
    }

    /// Split an SGR string back into the flat parameter list the
    /// interpreter consumes (semicolons and colons both separate).
    fn params_from_sgr(sgr: &str) -> Vec<u16> {
        if sgr.is_empty() {
            return Vec::new();
        }
        sgr.split(|c| c == ';' || c == ':')
            .map(|p| p.parse().expect("numeric SGR parameter"))
            .collect()
    }

    fn color_strategy() -> impl Strategy<Value = Color> {
        prop_oneof![
            Just(Color::Default),
            any::<u8>().prop_map(Color::Indexed),
            any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Color::Rgb(Rgb::new(r, g, b))),
        ]
    }

    proptest! {
        // Replaying as_sgr onto a fresh cursor must restore the full
        // attribute/color state (position, shape and blink are not part
        // of SGR and stay default on both sides).
        #[test]
        fn test_sgr_round_trip(
            bold in any::<bool>(),
            italic in any::<bool>(),
            reverse in any::<bool>(),
            strikethrough in any::<bool>(),
            dim in any::<bool>(),
            decoration in 0u8..=3,
            fg in color_strategy(),
            bg in color_strategy(),
            decoration_fg in color_strategy(),
        ) {
            let mut cursor = Cursor::new();
            cursor.bold = bold;
            cursor.italic = italic;
            cursor.reverse = reverse;
            cursor.strikethrough = strikethrough;
            cursor.dim = dim;
            cursor.decoration = decoration;
            cursor.fg = fg;
            cursor.bg = bg;
            cursor.decoration_fg = decoration_fg;

            let params = params_from_sgr(&cursor.as_sgr());
            let mut replayed = Cursor::new();
            apply_sgr_to_cursor(&mut replayed, &params);
            prop_assert_eq!(replayed, cursor);
        }
    }
}
