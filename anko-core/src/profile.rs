//! Per-screen color state
//!
//! Each screen owns one `ColorProfile`: the active 256-color table, the
//! snapshot it reverts to, and the five special colors (default
//! foreground/background, cursor, selection foreground/background), each
//! with a configured baseline and a runtime override layer.
//!
//! The escape-processing thread is the sole mutator of a profile. The
//! renderer pulls the table out with
//! [`ColorProfile::copy_table_to_buffer`] and watches [`is_dirty`] to
//! decide when a GPU re-upload is due; `&mut self` exclusivity makes the
//! copy atomic with respect to mutation, so a profile shared across
//! threads goes behind the caller's lock.
//!
//! [`is_dirty`]: ColorProfile::is_dirty

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{base_color_table, Color, Rgb};

/// Errors from color profile mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// A full-table replacement did not supply exactly 256 entries
    #[error("color table must have 256 entries, got {0}")]
    BadTableSize(usize),
}

/// The five non-palette colors a profile resolves independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialColor {
    DefaultFg,
    DefaultBg,
    CursorColor,
    HighlightFg,
    HighlightBg,
}

/// Configured baselines for the special colors (from configuration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfiguredColors {
    pub default_fg: Rgb,
    pub default_bg: Rgb,
    pub cursor_color: Rgb,
    pub highlight_fg: Rgb,
    pub highlight_bg: Rgb,
}

/// Runtime override layer; `Color::Default` means "no override"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverriddenColors {
    pub default_fg: Color,
    pub default_bg: Color,
    pub cursor_color: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
}

/// Color state for one terminal screen
#[derive(Debug, Clone)]
pub struct ColorProfile {
    color_table: [Rgb; 256],
    orig_color_table: [Rgb; 256],
    configured: ConfiguredColors,
    overridden: OverriddenColors,
    dirty: bool,
}

impl ColorProfile {
    /// A new profile starts from the shared base table and is dirty so
    /// the renderer uploads it at least once.
    pub fn new() -> Self {
        let table = *base_color_table();
        ColorProfile {
            color_table: table,
            orig_color_table: table,
            configured: ConfiguredColors::default(),
            overridden: OverriddenColors::default(),
            dirty: true,
        }
    }

    /// Whether the palette or special colors changed since the renderer
    /// last copied the table out.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Look up a palette entry.
    pub fn color(&self, index: u8) -> Rgb {
        self.color_table[index as usize]
    }

    pub fn color_table(&self) -> &[Rgb; 256] {
        &self.color_table
    }

    /// Resolve a color encoding against this profile's palette, with
    /// `default` standing in for the default tag.
    pub fn resolve_color(&self, color: Color, default: Rgb) -> Rgb {
        color.resolve(&self.color_table, default)
    }

    /// Replace the full table. This is a configuration commit: the new
    /// values also become the baseline that per-index resets revert to.
    /// Anything but exactly 256 entries fails without touching the
    /// profile.
    pub fn update_color_table(&mut self, colors: &[Rgb]) -> Result<(), ProfileError> {
        if colors.len() != 256 {
            return Err(ProfileError::BadTableSize(colors.len()));
        }
        self.color_table.copy_from_slice(colors);
        self.orig_color_table.copy_from_slice(colors);
        self.dirty = true;
        Ok(())
    }

    /// Revert every runtime palette customization to the committed
    /// baseline.
    pub fn reset_color_table(&mut self) {
        self.color_table = self.orig_color_table;
        self.dirty = true;
    }

    /// Revert one palette entry to the committed baseline.
    pub fn reset_color(&mut self, index: u8) {
        self.color_table[index as usize] = self.orig_color_table[index as usize];
        self.dirty = true;
    }

    /// Set one palette entry. Runtime only: the committed baseline is
    /// untouched, so a later reset reverts this.
    pub fn set_color(&mut self, index: u8, color: Rgb) {
        self.color_table[index as usize] = color;
        self.dirty = true;
    }

    fn configured_value(&self, which: SpecialColor) -> Rgb {
        match which {
            SpecialColor::DefaultFg => self.configured.default_fg,
            SpecialColor::DefaultBg => self.configured.default_bg,
            SpecialColor::CursorColor => self.configured.cursor_color,
            SpecialColor::HighlightFg => self.configured.highlight_fg,
            SpecialColor::HighlightBg => self.configured.highlight_bg,
        }
    }

    fn configured_slot(&mut self, which: SpecialColor) -> &mut Rgb {
        match which {
            SpecialColor::DefaultFg => &mut self.configured.default_fg,
            SpecialColor::DefaultBg => &mut self.configured.default_bg,
            SpecialColor::CursorColor => &mut self.configured.cursor_color,
            SpecialColor::HighlightFg => &mut self.configured.highlight_fg,
            SpecialColor::HighlightBg => &mut self.configured.highlight_bg,
        }
    }

    fn overridden_value(&self, which: SpecialColor) -> Color {
        match which {
            SpecialColor::DefaultFg => self.overridden.default_fg,
            SpecialColor::DefaultBg => self.overridden.default_bg,
            SpecialColor::CursorColor => self.overridden.cursor_color,
            SpecialColor::HighlightFg => self.overridden.highlight_fg,
            SpecialColor::HighlightBg => self.overridden.highlight_bg,
        }
    }

    fn overridden_slot(&mut self, which: SpecialColor) -> &mut Color {
        match which {
            SpecialColor::DefaultFg => &mut self.overridden.default_fg,
            SpecialColor::DefaultBg => &mut self.overridden.default_bg,
            SpecialColor::CursorColor => &mut self.overridden.cursor_color,
            SpecialColor::HighlightFg => &mut self.overridden.highlight_fg,
            SpecialColor::HighlightBg => &mut self.overridden.highlight_bg,
        }
    }

    /// Resolve a special color: a non-default override wins, resolved
    /// against the palette with the configured baseline as the
    /// default-tag fallback; otherwise the configured baseline.
    pub fn get_special(&self, which: SpecialColor) -> Rgb {
        let configured = self.configured_value(which);
        self.resolve_color(self.overridden_value(which), configured)
    }

    /// Override a special color at runtime (e.g. an OSC color-change
    /// request).
    pub fn set_special(&mut self, which: SpecialColor, color: Rgb) {
        *self.overridden_slot(which) = Color::Rgb(color);
        self.dirty = true;
    }

    /// Drop the runtime override; the configured baseline shows through
    /// again.
    pub fn reset_special(&mut self, which: SpecialColor) {
        *self.overridden_slot(which) = Color::Default;
        self.dirty = true;
    }

    /// Set the configured baselines. The highlight colors are optional;
    /// absent values keep their previous baseline.
    pub fn set_configured_colors(
        &mut self,
        default_fg: Rgb,
        default_bg: Rgb,
        cursor_color: Rgb,
        highlight_fg: Option<Rgb>,
        highlight_bg: Option<Rgb>,
    ) {
        self.configured.default_fg = default_fg;
        self.configured.default_bg = default_bg;
        self.configured.cursor_color = cursor_color;
        if let Some(color) = highlight_fg {
            self.configured.highlight_fg = color;
        }
        if let Some(color) = highlight_bg {
            self.configured.highlight_bg = color;
        }
        self.dirty = true;
    }

    /// Copy all 256 palette entries (packed 0xRRGGBB) into an externally
    /// owned buffer, `stride` elements apart starting at `offset`;
    /// `stride` below 1 is treated as 1. The destination must hold at
    /// least `offset + 255 * stride + 1` elements; an undersized buffer
    /// is a caller bug and panics.
    ///
    /// This is the renderer's consumption point and the only operation
    /// that clears the dirty flag.
    pub fn copy_table_to_buffer(&mut self, buf: &mut [u32], offset: usize, stride: usize) {
        let stride = stride.max(1);
        for (i, color) in self.color_table.iter().enumerate() {
            buf[offset + i * stride] = color.to_u32();
        }
        self.dirty = false;
    }
}

impl Default for ColorProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// A batch re-theming request: palette entries by index plus optional
/// special colors, applied to any number of profiles at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPatch {
    /// Palette indices to change
    #[serde(default)]
    pub colors: BTreeMap<u8, Rgb>,
    #[serde(default)]
    pub foreground: Option<Rgb>,
    #[serde(default)]
    pub background: Option<Rgb>,
    #[serde(default)]
    pub cursor: Option<Rgb>,
    #[serde(default)]
    pub selection_foreground: Option<Rgb>,
    #[serde(default)]
    pub selection_background: Option<Rgb>,
}

impl ColorPatch {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.foreground.is_none()
            && self.background.is_none()
            && self.cursor.is_none()
            && self.selection_foreground.is_none()
            && self.selection_background.is_none()
    }

    fn specials(&self) -> [(Option<Rgb>, SpecialColor); 5] {
        [
            (self.foreground, SpecialColor::DefaultFg),
            (self.background, SpecialColor::DefaultBg),
            (self.cursor, SpecialColor::CursorColor),
            (self.selection_foreground, SpecialColor::HighlightFg),
            (self.selection_background, SpecialColor::HighlightBg),
        ]
    }
}

/// Apply one patch across a batch of profiles (re-theming every screen
/// at once). Palette entries land in the active table and specials in
/// the override layer; with `change_configured` the patch is also a
/// commit, updating the baselines those layers revert to. Every touched
/// profile is marked dirty.
pub fn patch_color_profiles(
    patch: &ColorPatch,
    profiles: &mut [&mut ColorProfile],
    change_configured: bool,
) {
    if patch.is_empty() {
        return;
    }
    for profile in profiles.iter_mut() {
        for (&index, &color) in &patch.colors {
            profile.color_table[index as usize] = color;
            if change_configured {
                profile.orig_color_table[index as usize] = color;
            }
        }
        for (value, which) in patch.specials() {
            if let Some(color) = value {
                *profile.overridden_slot(which) = Color::Rgb(color);
                if change_configured {
                    *profile.configured_slot(which) = color;
                }
            }
        }
        profile.dirty = true;
    }
    debug!(
        "patched {} color profile(s), change_configured={}",
        profiles.len(),
        change_configured
    );
}
