//! # ESC/POS Command Builders
//!
//! Each function builds one control sequence. Multi-byte parameters follow
//! the ESC/POS convention of raw binary values (not ASCII digits).
//!
//! ## Command Summary
//!
//! | Command | Bytes | Effect |
//! |---------|-------|--------|
//! | Initialize | `1B 40` | Reset to power-on defaults |
//! | Align | `1B 61 n` | 0 = left, 1 = center, 2 = right |
//! | Emphasis | `1B 45 n` | 0 = off, 1 = on |
//! | Scale | `1D 21 n` | High nibble width, low nibble height |
//! | Feed | `1B 64 n` | Print buffer, feed n lines |
//! | Partial cut | `1D 56 42 00` | Feed to cutter, cut with hinge |
//! | Line feed | `0A` | Print buffer, advance one line |
//! | Barcode height | `1D 68 n` | Bar height in dots |
//! | Barcode width | `1D 77 n` | Module width in dots (2..=6) |
//! | HRI position | `1D 48 n` | 0 = none, 2 = below bars |
//! | Print CODE128 | `1D 6B 49 len {B data` | Function B form, code set B |

use crate::layout::Align;

/// ESC (Escape) - command prefix for formatting and feed commands.
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - command prefix for scaling and cutter commands.
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - print the line buffer and advance one line.
pub const LF: u8 = 0x0A;

/// # Initialize Printer (ESC @)
///
/// Resets formatting (emphasis, scale, alignment) to power-on defaults and
/// clears the line buffer. Sent once at the start of every job so a
/// previous job's state can never leak into this one.
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Set Alignment (ESC a n)
///
/// Affects all subsequent lines until changed. `n`: 0 left (default),
/// 1 center, 2 right.
#[inline]
pub fn align(alignment: Align) -> Vec<u8> {
    let n = match alignment {
        Align::Left => 0,
        Align::Center => 1,
        Align::Right => 2,
    };
    vec![ESC, b'a', n]
}

/// # Set Emphasis (ESC E n)
///
/// Turns bold on (`n = 1`) or off (`n = 0`).
#[inline]
pub fn emphasis(on: bool) -> Vec<u8> {
    vec![ESC, b'E', on as u8]
}

/// # Set Character Scale (GS ! n)
///
/// `n` packs both multipliers: high nibble is `width - 1`, low nibble is
/// `height - 1`. Multipliers are clamped to the protocol's 1..=8 range, so
/// `scale(1, 1)` (`n = 0`) restores native size.
#[inline]
pub fn scale(width: u8, height: u8) -> Vec<u8> {
    let w = width.clamp(1, 8) - 1;
    let h = height.clamp(1, 8) - 1;
    vec![GS, b'!', (w << 4) | h]
}

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the line buffer, then feeds `n` lines. Used ahead of the cut so
/// the last printed line clears the cutter blade.
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// # Partial Cut (GS V 66 0)
///
/// Feeds to the cut position and performs a partial cut, leaving a small
/// hinge so the receipt hangs instead of falling into the tray.
#[inline]
pub fn cut_partial() -> Vec<u8> {
    vec![GS, b'V', 66, 0]
}

/// # Line Feed (LF)
///
/// Prints the line buffer and advances one line.
#[inline]
pub fn line_feed() -> Vec<u8> {
    vec![LF]
}

/// # Set Barcode Height (GS h n)
///
/// Bar height in dots for subsequent barcode prints.
#[inline]
pub fn barcode_height(dots: u8) -> Vec<u8> {
    vec![GS, b'h', dots]
}

/// # Set Barcode Module Width (GS w n)
///
/// Width of one module in dots, clamped to the protocol's 2..=6 range.
#[inline]
pub fn barcode_module_width(dots: u8) -> Vec<u8> {
    vec![GS, b'w', dots.clamp(2, 6)]
}

/// # Set HRI Position (GS H n)
///
/// Where the human-readable interpretation prints relative to the bars:
/// `0` nowhere, `2` below (the only placement used here).
#[inline]
pub fn barcode_hri(below: bool) -> Vec<u8> {
    vec![GS, b'H', if below { 2 } else { 0 }]
}

/// # Print CODE128 Barcode (GS k 73 len data)
///
/// Function B form: the length byte covers the code-set selector plus the
/// payload. `{B` selects code set B, matching the raster/vector renderers
/// so all three outputs carry the same symbol.
#[inline]
pub fn barcode_code128(data: &[u8]) -> Vec<u8> {
    let mut out = vec![GS, b'k', 73, (data.len() + 2) as u8, b'{', b'B'];
    out.extend_from_slice(data);
    out
}
