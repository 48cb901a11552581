//! Raster barcode rendering.
//!
//! Draws the CODE128 bars into a grayscale bitmap, with an optional
//! human-readable line underneath using the Spleen bitmap font (the same
//! family the preview pipeline of our reference printers uses). The
//! bitmap form feeds the label compositor and PNG export.

use image::{GrayImage, Luma};
use spleen_font::{FONT_12X24, PSF2Font};

use super::{QUIET_ZONE_MODULES, code128};
use crate::document::BarcodeSpec;
use crate::error::PrintError;

const BLACK: Luma<u8> = Luma([0u8]);
const WHITE: Luma<u8> = Luma([255u8]);

/// Spleen 12x24 glyph cell.
const GLYPH_W: usize = 12;
const GLYPH_H: usize = 24;

/// Render the barcode as a grayscale bitmap.
///
/// `scale` multiplies the spec's pixel dimensions uniformly; a scale of
/// `1.0` is the native resolution the label compositor starts from. The
/// bar pattern is identical to the vector renderer's for the same value.
pub fn render_raster(spec: &BarcodeSpec, scale: f32) -> Result<GrayImage, PrintError> {
    spec.validate()?;
    let modules = code128::modules(&spec.value)?;

    let module_width = scaled_px(spec.module_width, scale);
    let bar_height = scaled_px(spec.bar_height, scale);
    let font_height = scaled_px(spec.font_size, scale);
    let text_band = if spec.show_text {
        font_height * 3 / 2
    } else {
        0
    };

    let width = (modules.len() as u32 + 2 * QUIET_ZONE_MODULES) * module_width;
    let height = bar_height + text_band;
    let mut img = GrayImage::from_pixel(width, height, WHITE);

    for (i, &bar) in modules.iter().enumerate() {
        if !bar {
            continue;
        }
        let x0 = (QUIET_ZONE_MODULES + i as u32) * module_width;
        for x in x0..x0 + module_width {
            for y in 0..bar_height {
                img.put_pixel(x, y, BLACK);
            }
        }
    }

    if spec.show_text {
        let text_top = bar_height + font_height / 4;
        draw_text_centered(&mut img, &spec.value, width / 2, text_top, font_height);
    }

    Ok(img)
}

/// Scale a spec dimension, keeping at least one pixel.
fn scaled_px(native: u32, scale: f32) -> u32 {
    ((native as f32 * scale).round() as u32).max(1)
}

/// Draw `text` in black, horizontally centered on `cx`, glyph tops at `top`.
///
/// Glyphs are Spleen 12x24 cells scaled to `char_height` by nearest
/// neighbor (width tracks the cell's 1:2 aspect). Pixels outside the image
/// are clipped, not wrapped.
pub(crate) fn draw_text_centered(img: &mut GrayImage, text: &str, cx: u32, top: u32, char_height: u32) {
    let char_h = char_height.max(1) as usize;
    let char_w = (char_h / 2).max(1);
    let total_w = (char_w * text.chars().count()) as u32;
    let left = cx.saturating_sub(total_w / 2);

    for (i, ch) in text.chars().enumerate() {
        let glyph = glyph_bitmap(ch);
        let glyph_left = left as usize + i * char_w;
        for dy in 0..char_h {
            for dx in 0..char_w {
                // Nearest-neighbor sample from the 12x24 cell.
                let sx = dx * GLYPH_W / char_w;
                let sy = dy * GLYPH_H / char_h;
                if glyph[sy * GLYPH_W + sx] == 0 {
                    continue;
                }
                let x = (glyph_left + dx) as u32;
                let y = top + dy as u32;
                if x < img.width() && y < img.height() {
                    img.put_pixel(x, y, BLACK);
                }
            }
        }
    }
}

/// Rasterize one character from the Spleen 12x24 font.
///
/// Returns a row-major 0/1 buffer. Characters missing from the font render
/// as a box outline, same as the glyph fallback our printers show.
fn glyph_bitmap(ch: char) -> Vec<u8> {
    let mut glyph = vec![0u8; GLYPH_W * GLYPH_H];
    let mut spleen = PSF2Font::new(FONT_12X24).unwrap();
    let utf8 = ch.to_string();

    if let Some(rows) = spleen.glyph_for_utf8(utf8.as_bytes()) {
        for (y, row) in rows.enumerate() {
            for (x, on) in row.enumerate() {
                if y < GLYPH_H && x < GLYPH_W && on {
                    glyph[y * GLYPH_W + x] = 1;
                }
            }
        }
    } else {
        for x in 0..GLYPH_W {
            glyph[x] = 1;
            glyph[(GLYPH_H - 1) * GLYPH_W + x] = 1;
        }
        for y in 0..GLYPH_H {
            glyph[y * GLYPH_W] = 1;
            glyph[y * GLYPH_W + GLYPH_W - 1] = 1;
        }
    }

    glyph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(value: &str) -> BarcodeSpec {
        BarcodeSpec {
            value: value.into(),
            module_width: 2,
            bar_height: 80,
            show_text: false,
            font_size: 24,
        }
    }

    #[test]
    fn test_raster_dimensions() {
        let img = render_raster(&spec("CF-98765"), 1.0).unwrap();
        // 123 modules + 20 quiet, 2px per module.
        assert_eq!(img.width(), (123 + 20) * 2);
        assert_eq!(img.height(), 80);
    }

    #[test]
    fn test_scale_multiplies_dimensions() {
        let img = render_raster(&spec("CF-98765"), 2.0).unwrap();
        assert_eq!(img.width(), (123 + 20) * 4);
        assert_eq!(img.height(), 160);
    }

    #[test]
    fn test_text_band_extends_height() {
        let mut s = spec("CF-98765");
        s.show_text = true;
        let img = render_raster(&s, 1.0).unwrap();
        assert_eq!(img.height(), 80 + 36);
    }

    #[test]
    fn test_quiet_zone_is_white_and_start_bar_black() {
        let img = render_raster(&spec("A"), 1.0).unwrap();
        // Quiet zone.
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
        // First module of the start code is a bar.
        let first_bar_x = QUIET_ZONE_MODULES * 2;
        assert_eq!(img.get_pixel(first_bar_x, 0).0[0], 0);
    }

    #[test]
    fn test_raster_is_deterministic() {
        let a = render_raster(&spec("CF-98765"), 1.0).unwrap();
        let b = render_raster(&spec("CF-98765"), 1.0).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_glyph_bitmap_has_ink() {
        assert!(glyph_bitmap('A').iter().any(|&p| p == 1));
        assert!(glyph_bitmap('7').iter().any(|&p| p == 1));
    }
}
