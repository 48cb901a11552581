//! Vector (SVG) barcode rendering.
//!
//! Produces standalone SVG markup: one `<rect>` per run of adjacent bars,
//! an optional human-readable line underneath, and quiet zones on both
//! sides. String output is built deterministically so snapshots of the
//! markup are stable.

use std::fmt::Write;

use super::{QUIET_ZONE_MODULES, code128};
use crate::document::BarcodeSpec;
use crate::error::PrintError;

/// Render the barcode as SVG markup.
///
/// The canvas is sized in pixels from the spec: each module is
/// `module_width` wide, bars are `bar_height` tall, and the text band (if
/// any) adds `font_size * 3 / 2` below the bars.
pub fn render_svg(spec: &BarcodeSpec) -> Result<String, PrintError> {
    spec.validate()?;
    let modules = code128::modules(&spec.value)?;

    let module_width = spec.module_width.max(1);
    let total_modules = modules.len() as u32 + 2 * QUIET_ZONE_MODULES;
    let width = total_modules * module_width;
    let text_band = if spec.show_text {
        spec.font_size * 3 / 2
    } else {
        0
    };
    let height = spec.bar_height + text_band;

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
         viewBox=\"0 0 {w} {h}\">",
        w = width,
        h = height
    );
    let _ = write!(
        svg,
        "<rect width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>",
        width, height
    );

    // One rect per run of adjacent bars keeps the markup compact.
    let mut i = 0;
    while i < modules.len() {
        if modules[i] {
            let run_start = i;
            while i < modules.len() && modules[i] {
                i += 1;
            }
            let x = (QUIET_ZONE_MODULES + run_start as u32) * module_width;
            let run_width = (i - run_start) as u32 * module_width;
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#000000\"/>",
                x, run_width, spec.bar_height
            );
        } else {
            i += 1;
        }
    }

    if spec.show_text {
        let _ = write!(
            svg,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" \
             font-family=\"monospace\" font-size=\"{}\">{}</text>",
            width / 2,
            spec.bar_height + spec.font_size,
            spec.font_size,
            escape_xml(&spec.value)
        );
    }

    svg.push_str("</svg>");
    Ok(svg)
}

/// Escape the XML-significant subset of printable ASCII.
fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
