//! Render cell attribute state
//!
//! The grid/text layer owns cell storage; this module defines the
//! renderer-facing face of a cell: a bit-packed attribute word plus three
//! color encodings, and the minimal-diff SGR serialization used to replay
//! drawn state as an escape sequence (clipboard paste of styled text,
//! session handoff, cursor round-trip).

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::sgr::DECORATION_FG_CODE;

/// Bit-packed cell attribute word, layout shared with the GPU cell buffer.
///
/// Low to high:
/// - bits [0, 2): character width (0 = spacer, 1, or 2)
/// - bits [2, 4): decoration (0 = none, 1 = underline, 2 = double underline)
/// - bit 4: bold
/// - bit 5: italic
/// - bit 6: reverse
/// - bit 7: strikethrough
/// - bit 8: dim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAttrs {
    bits: u16,
}

impl CellAttrs {
    pub const WIDTH_MASK: u16 = 0b11;
    pub const DECORATION_SHIFT: u16 = 2;
    pub const DECORATION_MASK: u16 = 0b11;
    pub const BOLD: u16 = 1 << 4;
    pub const ITALIC: u16 = 1 << 5;
    pub const REVERSE: u16 = 1 << 6;
    pub const STRIKETHROUGH: u16 = 1 << 7;
    pub const DIM: u16 = 1 << 8;

    pub const fn empty() -> Self {
        CellAttrs { bits: 0 }
    }

    pub const fn from_bits(bits: u16) -> Self {
        CellAttrs { bits }
    }

    pub const fn bits(self) -> u16 {
        self.bits
    }

    pub fn contains(self, flag: u16) -> bool {
        self.bits & flag != 0
    }

    pub fn set(&mut self, flag: u16, value: bool) {
        if value {
            self.bits |= flag;
        } else {
            self.bits &= !flag;
        }
    }

    pub fn insert(&mut self, flag: u16) {
        self.bits |= flag;
    }

    pub fn remove(&mut self, flag: u16) {
        self.bits &= !flag;
    }

    pub fn width(self) -> u8 {
        (self.bits & Self::WIDTH_MASK) as u8
    }

    pub fn set_width(&mut self, width: u8) {
        self.bits = (self.bits & !Self::WIDTH_MASK) | (width as u16 & Self::WIDTH_MASK);
    }

    pub fn decoration(self) -> u8 {
        ((self.bits >> Self::DECORATION_SHIFT) & Self::DECORATION_MASK) as u8
    }

    pub fn set_decoration(&mut self, decoration: u8) {
        self.bits = (self.bits & !(Self::DECORATION_MASK << Self::DECORATION_SHIFT))
            | ((decoration as u16 & Self::DECORATION_MASK) << Self::DECORATION_SHIFT);
    }

    /// Clear every attribute except the width field. Attribute resets
    /// must never change how many columns a character occupies.
    pub fn reset_keep_width(&mut self) {
        self.bits &= Self::WIDTH_MASK;
    }
}

/// The renderer-facing attribute/color record for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderCell {
    pub attrs: CellAttrs,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Underline color (defaults to the foreground)
    pub decoration_fg: Color,
}

/// Emit one color as an SGR fragment (trailing semicolon included).
///
/// Palette indices below 16 use the one-byte classic codes when a simple
/// code base is given; everything else uses the colon sub-parameter form.
/// A default color emits the reset code (`complex_code + 1`).
fn color_as_sgr(out: &mut String, color: Color, simple_code: u16, aix_code: u16, complex_code: u16) {
    match color {
        Color::Indexed(index) if index < 16 && simple_code != 0 => {
            let code = if index < 8 {
                simple_code + index as u16
            } else {
                aix_code + (index - 8) as u16
            };
            let _ = write!(out, "{};", code);
        }
        Color::Indexed(index) => {
            let _ = write!(out, "{}:5:{};", complex_code, index);
        }
        Color::Rgb(rgb) => {
            let _ = write!(out, "{}:2:{}:{}:{};", complex_code, rgb.r, rgb.g, rgb.b);
        }
        Color::Default => {
            let _ = write!(out, "{};", complex_code + 1);
        }
    }
}

fn decoration_as_sgr(decoration: u8) -> &'static str {
    match decoration {
        1 => "4:1;",
        2 => "4:2;",
        3 => "4:3;",
        _ => "24;",
    }
}

/// Serialize the attribute difference between two cells as the SGR
/// parameter string that turns `prev` into `cell`. Identical cells
/// produce an empty string; the result never carries a trailing
/// semicolon.
///
/// The output must re-parse to the same state when flattened into one
/// parameter list. Two emission rules keep that true: single underline
/// uses the two-parameter `4:1` form (a bare `4` would consume whatever
/// parameter follows it), and explicit-RGB color groups come last, where
/// the four-parameter color-space accommodation can never leave exactly
/// four parameters in the tail of another group.
pub fn cell_as_sgr(cell: &RenderCell, prev: &RenderCell) -> String {
    let mut out = String::new();

    let bold = cell.attrs.contains(CellAttrs::BOLD);
    let dim = cell.attrs.contains(CellAttrs::DIM);
    let intensity_differs = bold != prev.attrs.contains(CellAttrs::BOLD)
        || dim != prev.attrs.contains(CellAttrs::DIM);
    if intensity_differs {
        if !bold && !dim {
            out.push_str("22;");
        } else {
            if bold {
                out.push_str("1;");
            }
            if dim {
                out.push_str("2;");
            }
        }
    }

    if cell.attrs.contains(CellAttrs::ITALIC) != prev.attrs.contains(CellAttrs::ITALIC) {
        out.push_str(if cell.attrs.contains(CellAttrs::ITALIC) {
            "3;"
        } else {
            "23;"
        });
    }
    if cell.attrs.contains(CellAttrs::REVERSE) != prev.attrs.contains(CellAttrs::REVERSE) {
        out.push_str(if cell.attrs.contains(CellAttrs::REVERSE) {
            "7;"
        } else {
            "27;"
        });
    }
    if cell.attrs.contains(CellAttrs::STRIKETHROUGH) != prev.attrs.contains(CellAttrs::STRIKETHROUGH)
    {
        out.push_str(if cell.attrs.contains(CellAttrs::STRIKETHROUGH) {
            "9;"
        } else {
            "29;"
        });
    }

    let colors = [
        (cell.fg, prev.fg, 30, 90, 38),
        (cell.bg, prev.bg, 40, 100, 48),
        (cell.decoration_fg, prev.decoration_fg, 0, 0, DECORATION_FG_CODE),
    ];
    for &(color, prev_color, simple, aix, complex) in &colors {
        if color != prev_color && !matches!(color, Color::Rgb(_)) {
            color_as_sgr(&mut out, color, simple, aix, complex);
        }
    }
    if cell.attrs.decoration() != prev.attrs.decoration() {
        out.push_str(decoration_as_sgr(cell.attrs.decoration()));
    }
    for &(color, prev_color, simple, aix, complex) in &colors {
        if color != prev_color && matches!(color, Color::Rgb(_)) {
            color_as_sgr(&mut out, color, simple, aix, complex);
        }
    }

    if out.ends_with(';') {
        out.pop();
    }
    out
}
