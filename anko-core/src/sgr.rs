//! Select Graphic Rendition interpretation
//!
//! Parameters arrive as an ordered `&[u16]` slice, already split out of
//! the escape sequence by the parser (semicolon and colon separators are
//! both flattened into the slice). One code table drives two apply
//! targets:
//! - the cursor's pending attribute state, consulted when new text is
//!   written
//! - a contiguous run of render cells, for bulk attribute changes over
//!   already-drawn content
//!
//! Unknown codes and truncated extended-color sequences are tolerated:
//! arbitrary programs write arbitrary sequences, and the terminal has to
//! stay usable.

use log::trace;

use crate::cell::{CellAttrs, RenderCell};
use crate::color::{Color, Rgb};
use crate::cursor::Cursor;

/// SGR code selecting an extended decoration (underline) color. The code
/// one past it resets the decoration color to default.
pub const DECORATION_FG_CODE: u16 = 58;

/// Decode an extended-color sub-parameter sequence.
///
/// `i` points just past a 38/48/58 selector; on return it points past
/// everything the sequence consumed. Mode 5 takes one palette index.
/// Mode 2 takes r, g, b; when exactly four parameters remain, the first
/// is an unused color-space id and is skipped (the four-parameter RGB
/// variant some programs emit).
///
/// Returns `None` without producing a color when parameters run out or
/// the mode is unknown; the caller's loop then drains what is left as
/// ordinary codes.
pub fn parse_sgr_color(params: &[u16], i: &mut usize) -> Option<Color> {
    let mode = *params.get(*i)?;
    *i += 1;
    match mode {
        5 => {
            let index = *params.get(*i)?;
            *i += 1;
            Some(Color::Indexed((index & 0xff) as u8))
        }
        2 => {
            let remaining = params.len() - *i;
            if remaining < 3 {
                return None;
            }
            if remaining == 4 {
                *i += 1;
            }
            let r = (params[*i] & 0xff) as u8;
            let g = (params[*i + 1] & 0xff) as u8;
            let b = (params[*i + 2] & 0xff) as u8;
            *i += 3;
            Some(Color::Rgb(Rgb::new(r, g, b)))
        }
        _ => None,
    }
}

/// Apply an SGR parameter sequence to the cursor's pending attributes.
///
/// An empty sequence means reset, same as `[0]`.
pub fn apply_sgr_to_cursor(cursor: &mut Cursor, params: &[u16]) {
    let params = if params.is_empty() { &[0][..] } else { params };
    let mut i = 0;
    while i < params.len() {
        let attr = params[i];
        i += 1;
        match attr {
            0 => cursor.reset_display_attrs(),
            1 => cursor.bold = true,
            2 => cursor.dim = true,
            3 => cursor.italic = true,
            4 => {
                if i < params.len() {
                    cursor.decoration = params[i].min(3) as u8;
                    i += 1;
                } else {
                    cursor.decoration = 1;
                }
            }
            7 => cursor.reverse = true,
            9 => cursor.strikethrough = true,
            21 => cursor.decoration = 2,
            22 => {
                cursor.bold = false;
                cursor.dim = false;
            }
            23 => cursor.italic = false,
            24 => cursor.decoration = 0,
            27 => cursor.reverse = false,
            29 => cursor.strikethrough = false,
            30..=37 => cursor.fg = Color::Indexed((attr - 30) as u8),
            38 => {
                if let Some(color) = parse_sgr_color(params, &mut i) {
                    cursor.fg = color;
                }
            }
            39 => cursor.fg = Color::Default,
            40..=47 => cursor.bg = Color::Indexed((attr - 40) as u8),
            48 => {
                if let Some(color) = parse_sgr_color(params, &mut i) {
                    cursor.bg = color;
                }
            }
            49 => cursor.bg = Color::Default,
            90..=97 => cursor.fg = Color::Indexed((attr - 90 + 8) as u8),
            100..=107 => cursor.bg = Color::Indexed((attr - 100 + 8) as u8),
            DECORATION_FG_CODE => {
                if let Some(color) = parse_sgr_color(params, &mut i) {
                    cursor.decoration_fg = color;
                }
            }
            59 => cursor.decoration_fg = Color::Default,
            _ => trace!("ignored SGR parameter: {}", attr),
        }
    }
}

fn insert_flag(cells: &mut [RenderCell], flag: u16) {
    for cell in cells.iter_mut() {
        cell.attrs.insert(flag);
    }
}

fn remove_flag(cells: &mut [RenderCell], flag: u16) {
    for cell in cells.iter_mut() {
        cell.attrs.remove(flag);
    }
}

fn set_decoration(cells: &mut [RenderCell], decoration: u8) {
    for cell in cells.iter_mut() {
        cell.attrs.set_decoration(decoration);
    }
}

fn set_fg(cells: &mut [RenderCell], color: Color) {
    for cell in cells.iter_mut() {
        cell.fg = color;
    }
}

fn set_bg(cells: &mut [RenderCell], color: Color) {
    for cell in cells.iter_mut() {
        cell.bg = color;
    }
}

fn set_decoration_fg(cells: &mut [RenderCell], color: Color) {
    for cell in cells.iter_mut() {
        cell.decoration_fg = color;
    }
}

/// Apply an SGR parameter sequence across a contiguous run of render
/// cells.
///
/// Same code table as [`apply_sgr_to_cursor`], with two differences on
/// the reset path: the width field of each cell's attribute word is
/// preserved, and an extended-color decode that produces nothing leaves
/// the existing cell colors alone.
///
/// The parameter list is walked once; each applicable code makes one
/// pass over the cell run.
pub fn apply_sgr_to_cells(cells: &mut [RenderCell], params: &[u16]) {
    let params = if params.is_empty() { &[0][..] } else { params };
    let mut i = 0;
    while i < params.len() {
        let attr = params[i];
        i += 1;
        match attr {
            0 => {
                for cell in cells.iter_mut() {
                    cell.attrs.reset_keep_width();
                    cell.fg = Color::Default;
                    cell.bg = Color::Default;
                    cell.decoration_fg = Color::Default;
                }
            }
            1 => insert_flag(cells, CellAttrs::BOLD),
            2 => insert_flag(cells, CellAttrs::DIM),
            3 => insert_flag(cells, CellAttrs::ITALIC),
            4 => {
                let decoration = if i < params.len() {
                    let d = params[i].min(3) as u8;
                    i += 1;
                    d
                } else {
                    1
                };
                set_decoration(cells, decoration);
            }
            7 => insert_flag(cells, CellAttrs::REVERSE),
            9 => insert_flag(cells, CellAttrs::STRIKETHROUGH),
            21 => set_decoration(cells, 2),
            22 => remove_flag(cells, CellAttrs::BOLD | CellAttrs::DIM),
            23 => remove_flag(cells, CellAttrs::ITALIC),
            24 => set_decoration(cells, 0),
            27 => remove_flag(cells, CellAttrs::REVERSE),
            29 => remove_flag(cells, CellAttrs::STRIKETHROUGH),
            30..=37 => set_fg(cells, Color::Indexed((attr - 30) as u8)),
            38 => {
                if let Some(color) = parse_sgr_color(params, &mut i) {
                    set_fg(cells, color);
                }
            }
            39 => set_fg(cells, Color::Default),
            40..=47 => set_bg(cells, Color::Indexed((attr - 40) as u8)),
            48 => {
                if let Some(color) = parse_sgr_color(params, &mut i) {
                    set_bg(cells, color);
                }
            }
            49 => set_bg(cells, Color::Default),
            90..=97 => set_fg(cells, Color::Indexed((attr - 90 + 8) as u8)),
            100..=107 => set_bg(cells, Color::Indexed((attr - 100 + 8) as u8)),
            DECORATION_FG_CODE => {
                if let Some(color) = parse_sgr_color(params, &mut i) {
                    set_decoration_fg(cells, color);
                }
            }
            59 => set_decoration_fg(cells, Color::Default),
            _ => trace!("ignored SGR parameter: {}", attr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_attributes() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[1, 3, 7, 9, 2]);
        assert!(cursor.bold);
        assert!(cursor.italic);
        assert!(cursor.reverse);
        assert!(cursor.strikethrough);
        assert!(cursor.dim);
    }

    #[test]
    fn test_attribute_clears() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[1, 2, 3, 7, 9]);
        apply_sgr_to_cursor(&mut cursor, &[22, 23, 27, 29]);
        assert_eq!(cursor, Cursor::new());
    }

    #[test]
    fn test_empty_params_is_reset() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[1, 31]);
        apply_sgr_to_cursor(&mut cursor, &[]);
        assert_eq!(cursor, Cursor::new());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[1, 4, 2, 38, 5, 196]);
        let mut once = cursor.clone();
        apply_sgr_to_cursor(&mut once, &[0]);
        let mut twice = cursor.clone();
        apply_sgr_to_cursor(&mut twice, &[0, 0]);
        assert_eq!(once, twice);
        assert_eq!(once, Cursor::new());
    }

    #[test]
    fn test_simple_colors() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[31, 42]);
        assert_eq!(cursor.fg, Color::Indexed(1));
        assert_eq!(cursor.bg, Color::Indexed(2));

        apply_sgr_to_cursor(&mut cursor, &[94, 103]);
        assert_eq!(cursor.fg, Color::Indexed(12));
        assert_eq!(cursor.bg, Color::Indexed(11));

        apply_sgr_to_cursor(&mut cursor, &[39, 49]);
        assert_eq!(cursor.fg, Color::Default);
        assert_eq!(cursor.bg, Color::Default);
    }

    #[test]
    fn test_extended_palette_color() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[38, 5, 196]);
        assert_eq!(cursor.fg, Color::Indexed(196));
    }

    #[test]
    fn test_extended_rgb_color() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[38, 2, 255, 128, 64]);
        assert_eq!(cursor.fg, Color::Rgb(Rgb::new(255, 128, 64)));
    }

    #[test]
    fn test_extended_rgb_with_color_space_id() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[38, 2, 0, 255, 128, 64]);
        assert_eq!(cursor.fg, Color::Rgb(Rgb::new(255, 128, 64)));

        // with more than four remaining there is no color-space id
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[38, 2, 10, 20, 30, 1]);
        assert_eq!(cursor.fg, Color::Rgb(Rgb::new(10, 20, 30)));
        assert!(cursor.bold);
    }

    #[test]
    fn test_truncated_extended_color_is_noop() {
        let mut cursor = Cursor::new();
        cursor.fg = Color::Indexed(3);
        apply_sgr_to_cursor(&mut cursor, &[38, 2, 255, 128]);
        assert_eq!(cursor.fg, Color::Indexed(3));

        apply_sgr_to_cursor(&mut cursor, &[38, 5]);
        assert_eq!(cursor.fg, Color::Indexed(3));

        apply_sgr_to_cursor(&mut cursor, &[38]);
        assert_eq!(cursor.fg, Color::Indexed(3));
    }

    #[test]
    fn test_attributes_after_extended_color() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[38, 5, 21, 1]);
        assert_eq!(cursor.fg, Color::Indexed(21));
        assert!(cursor.bold);
        // 21 was consumed as the palette index, not as double underline
        assert_eq!(cursor.decoration, 0);
    }

    #[test]
    fn test_decoration() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[4]);
        assert_eq!(cursor.decoration, 1);

        apply_sgr_to_cursor(&mut cursor, &[4, 2]);
        assert_eq!(cursor.decoration, 2);

        // values past the known styles clamp
        apply_sgr_to_cursor(&mut cursor, &[4, 9]);
        assert_eq!(cursor.decoration, 3);

        apply_sgr_to_cursor(&mut cursor, &[24]);
        assert_eq!(cursor.decoration, 0);

        apply_sgr_to_cursor(&mut cursor, &[21]);
        assert_eq!(cursor.decoration, 2);
    }

    #[test]
    fn test_decoration_color() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[58, 5, 199]);
        assert_eq!(cursor.decoration_fg, Color::Indexed(199));
        apply_sgr_to_cursor(&mut cursor, &[59]);
        assert_eq!(cursor.decoration_fg, Color::Default);
    }

    #[test]
    fn test_unknown_codes_ignored() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[5, 8, 73, 999, 1]);
        assert!(cursor.bold);
        let mut fresh = Cursor::new();
        fresh.bold = true;
        assert_eq!(cursor, fresh);
    }

    #[test]
    fn test_reset_clears_colors() {
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, &[31, 42, 58, 5, 7, 0]);
        assert_eq!(cursor.fg, Color::Default);
        assert_eq!(cursor.bg, Color::Default);
        assert_eq!(cursor.decoration_fg, Color::Default);
    }

    fn styled_row(len: usize) -> Vec<RenderCell> {
        let mut cells = vec![RenderCell::default(); len];
        for (x, cell) in cells.iter_mut().enumerate() {
            cell.attrs.set_width(if x % 3 == 0 { 2 } else { 1 });
        }
        cells
    }

    #[test]
    fn test_cells_reset_preserves_width() {
        let mut cells = styled_row(12);
        apply_sgr_to_cells(&mut cells, &[1, 4, 2, 31, 42]);
        let widths: Vec<u8> = cells.iter().map(|c| c.attrs.width()).collect();
        apply_sgr_to_cells(&mut cells, &[0]);
        for (x, cell) in cells.iter().enumerate() {
            assert_eq!(cell.attrs.width(), widths[x]);
            assert_eq!(cell.attrs.bits() & !CellAttrs::WIDTH_MASK, 0);
            assert_eq!(cell.fg, Color::Default);
            assert_eq!(cell.bg, Color::Default);
            assert_eq!(cell.decoration_fg, Color::Default);
        }
    }

    #[test]
    fn test_cells_full_table() {
        let mut cells = styled_row(7);
        apply_sgr_to_cells(&mut cells, &[1, 3, 4, 2, 38, 5, 196, 48, 2, 10, 20, 30]);
        for cell in &cells {
            assert!(cell.attrs.contains(CellAttrs::BOLD));
            assert!(cell.attrs.contains(CellAttrs::ITALIC));
            assert_eq!(cell.attrs.decoration(), 2);
            assert_eq!(cell.fg, Color::Indexed(196));
            assert_eq!(cell.bg, Color::Rgb(Rgb::new(10, 20, 30)));
        }
    }

    #[test]
    fn test_cells_truncated_color_leaves_cells_alone() {
        let mut cells = styled_row(4);
        apply_sgr_to_cells(&mut cells, &[31]);
        apply_sgr_to_cells(&mut cells, &[38, 2, 255]);
        for cell in &cells {
            assert_eq!(cell.fg, Color::Indexed(1));
        }
    }

    #[test]
    fn test_cells_clears() {
        let mut cells = styled_row(4);
        apply_sgr_to_cells(&mut cells, &[1, 2, 3, 7, 9, 4, 1]);
        apply_sgr_to_cells(&mut cells, &[22, 23, 27, 29, 24]);
        for cell in &cells {
            assert_eq!(cell.attrs.bits() & !CellAttrs::WIDTH_MASK, 0);
        }
    }

    #[test]
    fn test_cursor_and_cells_agree() {
        let params: &[u16] = &[1, 4, 2, 38, 5, 196, 48, 2, 1, 2, 3, 58, 5, 9, 7];
        let mut cursor = Cursor::new();
        apply_sgr_to_cursor(&mut cursor, params);
        let mut cells = vec![RenderCell::default(); 3];
        for cell in cells.iter_mut() {
            cell.attrs.set_width(1);
        }
        apply_sgr_to_cells(&mut cells, params);
        for cell in &cells {
            assert_eq!(*cell, cursor.cell_image());
        }
    }
}
