//! # Label Rendering
//!
//! Rasterizes a [`BarcodeLabel`] onto a fixed-size canvas matching
//! physical label stock (38×18mm, 40×25mm, ...) and exports it as PNG.
//!
//! ## Millimetres to pixels
//!
//! `px = mm * 3.78 * scale` — 3.78 px/mm is the CSS reference pixel
//! density (96 DPI / 25.4), which keeps exported labels the same apparent
//! size as their on-screen previews. The caller's `scale` factor raises
//! the export resolution without changing the geometry.
//!
//! ## Composition
//!
//! Background fill, then title/subtitle centered near the top at font
//! sizes proportional to the label's physical height, then the barcode —
//! rendered independently at native resolution and downscaled by
//! `min(target_w / native_w, target_h / native_h)` to preserve its aspect
//! ratio — composited near the bottom margin.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::barcode;
use crate::document::BarcodeLabel;
use crate::error::PrintError;

/// Pixels per millimetre at scale 1.0 (96 DPI / 25.4).
pub const MM_TO_PX: f32 = 3.78;

/// Title glyph height as a fraction of the label height.
const TITLE_HEIGHT_FRAC: f32 = 0.18;

/// Subtitle glyph height as a fraction of the label height.
const SUBTITLE_HEIGHT_FRAC: f32 = 0.13;

/// Top/bottom margin as a fraction of the label height.
const MARGIN_FRAC: f32 = 0.05;

/// Convert a physical dimension to pixels at the given scale.
pub fn mm_to_px(mm: f32, scale: f32) -> u32 {
    (mm * MM_TO_PX * scale).round() as u32
}

/// Render a label onto its stock-sized canvas.
pub fn render_label(label: &BarcodeLabel, scale: f32) -> Result<GrayImage, PrintError> {
    label.spec.validate()?;

    let width = mm_to_px(label.width_mm, scale);
    let height = mm_to_px(label.height_mm, scale);
    let mut canvas = GrayImage::from_pixel(width, height, Luma([255u8]));

    let margin = (height as f32 * MARGIN_FRAC).round() as u32;
    let mut cursor = margin;

    if let Some(title) = &label.title {
        let glyph_h = (height as f32 * TITLE_HEIGHT_FRAC).round() as u32;
        barcode::raster::draw_text_centered(&mut canvas, title, width / 2, cursor, glyph_h);
        cursor += glyph_h + glyph_h / 4;
    }
    if let Some(subtitle) = &label.subtitle {
        let glyph_h = (height as f32 * SUBTITLE_HEIGHT_FRAC).round() as u32;
        barcode::raster::draw_text_centered(&mut canvas, subtitle, width / 2, cursor, glyph_h);
        cursor += glyph_h + glyph_h / 4;
    }

    // Bounding box for the barcode: almost the full width, whatever
    // height remains above the bottom margin.
    let box_w = width - 2 * margin.min(width / 2);
    let box_h = height.saturating_sub(cursor + margin).max(1);

    let native = barcode::render_raster(&label.spec, 1.0)?;
    let ratio = f32::min(
        box_w as f32 / native.width() as f32,
        box_h as f32 / native.height() as f32,
    );
    let target_w = ((native.width() as f32 * ratio).round() as u32).max(1);
    let target_h = ((native.height() as f32 * ratio).round() as u32).max(1);
    let resized = imageops::resize(&native, target_w, target_h, FilterType::Nearest);

    let x = (width - target_w) / 2;
    let y = height.saturating_sub(margin + target_h);
    imageops::overlay(&mut canvas, &resized, x as i64, y as i64);

    Ok(canvas)
}

/// Render a label and encode it as PNG bytes.
pub fn label_png(label: &BarcodeLabel, scale: f32) -> Result<Vec<u8>, PrintError> {
    let canvas = render_label(label, scale)?;
    encode_png(&canvas)
}

/// Encode a grayscale canvas as PNG.
pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, PrintError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| PrintError::EncodingInvalid(format!("PNG encoding failed: {}", e)))?;
    Ok(buf.into_inner())
}

/// Export filename for a label PNG: `category_barcode_<value>.png`.
pub fn label_filename(value: &str) -> String {
    format!("category_barcode_{}.png", value)
}

/// Build the `data:` URL the host-shell DOWNLOAD envelope carries.
pub fn data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
}
