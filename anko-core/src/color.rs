//! Terminal color representation
//!
//! Supports:
//! - 256-color indexed palette references
//! - 24-bit true color (RGB)
//! - "use default", resolved by the consumer
//!
//! A color is carried as a tagged value that round-trips losslessly
//! between parsed escape parameters, per-cell render state, and
//! re-emitted escape sequences. The 32-bit wire form shared with the
//! renderer keeps the tag in the low 8 bits and the payload above it.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Pack as 0xRRGGBB.
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Unpack from 0xRRGGBB; bits above the low 24 are ignored.
    pub const fn from_u32(v: u32) -> Self {
        Rgb {
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }
}

/// Represents a terminal color reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default foreground or background color
    #[default]
    Default,
    /// 256-color palette index (0-255)
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(Rgb),
}

impl Color {
    /// Encode into the 32-bit tagged form stored in render cells:
    /// tag 0 = default, tag 1 = palette index in bits [8, 16),
    /// tag 2 = RGB in bits [8, 32).
    pub const fn to_bits(self) -> u32 {
        match self {
            Color::Default => 0,
            Color::Indexed(index) => (index as u32) << 8 | 1,
            Color::Rgb(rgb) => rgb.to_u32() << 8 | 2,
        }
    }

    /// Decode the tagged form. Unrecognized tags degrade to `Default`
    /// rather than failing; malformed state must never take the
    /// terminal down.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0xff {
            1 => Color::Indexed((bits >> 8) as u8),
            2 => Color::Rgb(Rgb::from_u32(bits >> 8)),
            _ => Color::Default,
        }
    }

    /// Resolve to a concrete color. Indexed references look up
    /// `palette`; the index is a `u8`, so the lookup cannot go out of
    /// bounds on a 256-entry table.
    pub fn resolve(self, palette: &[Rgb; 256], default: Rgb) -> Rgb {
        match self {
            Color::Default => default,
            Color::Indexed(index) => palette[index as usize],
            Color::Rgb(rgb) => rgb,
        }
    }

    pub fn is_default(self) -> bool {
        self == Color::Default
    }
}

/// The classic 16 colors, indices 0-15 of the base table.
const CLASSIC_16: [u32; 16] = [
    0x000000, // black
    0xcd0000, // red
    0x00cd00, // green
    0xcdcd00, // yellow
    0x0000ee, // blue
    0xcd00cd, // magenta
    0x00cdcd, // cyan
    0xe5e5e5, // white
    0x7f7f7f, // bright black
    0xff0000, // bright red
    0x00ff00, // bright green
    0xffff00, // bright yellow
    0x5c5cff, // bright blue
    0xff00ff, // bright magenta
    0x00ffff, // bright cyan
    0xffffff, // bright white
];

/// The base 256-color table every new profile starts from
/// Colors 0-15: classic colors
/// Colors 16-232: 6x6x6 color cube
/// Colors 233-255: grayscale ramp
///
/// Computed once per process; callers share the same table.
pub fn base_color_table() -> &'static [Rgb; 256] {
    static TABLE: OnceLock<[Rgb; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [Rgb::default(); 256];

        for (i, &v) in CLASSIC_16.iter().enumerate() {
            table[i] = Rgb::from_u32(v);
        }

        // the cube ramp runs one extra step, so 232 is its wraparound
        // value (black), not the first grayscale entry
        let ramp = [0x00u8, 0x5f, 0x87, 0xaf, 0xd7, 0xff];
        for i in 0..217 {
            table[16 + i] = Rgb::new(ramp[(i / 36) % 6], ramp[(i / 6) % 6], ramp[i % 6]);
        }

        for step in 1..24usize {
            let v = (8 + step * 10) as u8;
            table[232 + step] = Rgb::new(v, v, v);
        }

        table
    })
}
