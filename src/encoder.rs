//! # Command Encoder
//!
//! Serializes a formatting-instruction sequence into ESC/POS bytes for the
//! byte-oriented transports (USB, and any future raw-socket path).
//!
//! ## Scoped styling
//!
//! Every styled instruction closes its own scope: alignment, emphasis and
//! scale are set immediately before the content and restored to defaults
//! immediately after its line feed. Bold or double-size state never leaks
//! into the next instruction, so instructions can be reordered or dropped
//! upstream without changing how their neighbours print.
//!
//! ## Opaque content
//!
//! Content strings (including every monetary value) pass through as raw
//! bytes. The encoder performs no locale-aware formatting, keeping preview
//! and paper identical.

use crate::document::BarcodeSpec;
use crate::error::PrintError;
use crate::layout::{self, Align, Emphasis, Instruction, RuleStyle, Scale};
use crate::printer::PrinterProfile;
use crate::protocol::commands;

/// Lines fed before the cut so the last printed row clears the blade.
const FEED_BEFORE_CUT: u8 = 4;

/// Encode an instruction sequence to ESC/POS bytes.
///
/// Order-preserving: instructions map to command runs in exactly the order
/// given. The output always begins with printer initialization so no state
/// from a previous job survives.
pub fn encode(instructions: &[Instruction], profile: &PrinterProfile) -> Vec<u8> {
    let mut out = commands::init();

    for instruction in instructions {
        match instruction {
            Instruction::Text {
                content,
                align,
                emphasis,
                scale,
            } => {
                encode_text(&mut out, content, *align, *emphasis, *scale);
            }
            Instruction::TwoColumn { left, right } => {
                let row = layout::two_column(left, right, profile.columns);
                out.extend(row.as_bytes());
                out.extend(commands::line_feed());
            }
            Instruction::Rule { style } => {
                let line = match style {
                    RuleStyle::Solid => "=".repeat(profile.columns),
                    RuleStyle::Dashed => "-".repeat(profile.columns),
                };
                out.extend(line.as_bytes());
                out.extend(commands::line_feed());
            }
            Instruction::Newline => {
                out.extend(commands::line_feed());
            }
            Instruction::CutPaper => {
                out.extend(commands::feed_lines(FEED_BEFORE_CUT));
                out.extend(commands::cut_partial());
            }
        }
    }

    out
}

/// Encode a standalone barcode strip as ESC/POS bytes.
///
/// Uses the printer's native CODE128 renderer (code set B, same symbol the
/// raster and vector renderers produce) rather than shipping a bitmap:
/// centered, bar geometry from the spec, human-readable line below the
/// bars when requested, then feed and cut.
pub fn encode_barcode(spec: &BarcodeSpec) -> Result<Vec<u8>, PrintError> {
    spec.validate()?;

    let mut out = commands::init();
    out.extend(commands::align(Align::Center));
    out.extend(commands::barcode_height(spec.bar_height.min(255) as u8));
    out.extend(commands::barcode_module_width(spec.module_width.min(6) as u8));
    out.extend(commands::barcode_hri(spec.show_text));
    out.extend(commands::barcode_code128(spec.value.as_bytes()));
    out.extend(commands::align(Align::Left));
    out.extend(commands::feed_lines(FEED_BEFORE_CUT));
    out.extend(commands::cut_partial());
    Ok(out)
}

/// Emit one text run with scoped styling: set what differs from the
/// defaults, print, then undo it in reverse order.
fn encode_text(out: &mut Vec<u8>, content: &str, align: Align, emphasis: Emphasis, scale: Scale) {
    let aligned = align != Align::Left;
    let bold = emphasis == Emphasis::Bold;
    let scaled = scale != Scale::NORMAL;

    if aligned {
        out.extend(commands::align(align));
    }
    if bold {
        out.extend(commands::emphasis(true));
    }
    if scaled {
        out.extend(commands::scale(scale.width, scale.height));
    }

    out.extend(content.as_bytes());
    out.extend(commands::line_feed());

    if scaled {
        out.extend(commands::scale(1, 1));
    }
    if bold {
        out.extend(commands::emphasis(false));
    }
    if aligned {
        out.extend(commands::align(Align::Left));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(content: &str, align: Align, emphasis: Emphasis, scale: Scale) -> Instruction {
        Instruction::Text {
            content: content.into(),
            align,
            emphasis,
            scale,
        }
    }

    /// Find the byte offset of `needle` in `haystack`.
    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_output_starts_with_init() {
        let bytes = encode(&[], &PrinterProfile::MM80);
        assert_eq!(bytes, vec![0x1B, 0x40]);
    }

    #[test]
    fn test_plain_text_has_no_style_commands() {
        let bytes = encode(
            &[text("hello", Align::Left, Emphasis::Normal, Scale::NORMAL)],
            &PrinterProfile::MM80,
        );
        assert_eq!(bytes, [&[0x1B, 0x40][..], b"hello", &[0x0A][..]].concat());
    }

    #[test]
    fn test_bold_scope_closes_after_line_feed() {
        let bytes = encode(
            &[
                text("TOTAL", Align::Left, Emphasis::Bold, Scale::NORMAL),
                text("after", Align::Left, Emphasis::Normal, Scale::NORMAL),
            ],
            &PrinterProfile::MM80,
        );
        let bold_on = find(&bytes, &[0x1B, 0x45, 0x01]).expect("bold on missing");
        let content = find(&bytes, b"TOTAL").expect("content missing");
        let bold_off = find(&bytes, &[0x1B, 0x45, 0x00]).expect("bold off missing");
        let after = find(&bytes, b"after").expect("second run missing");
        assert!(bold_on < content && content < bold_off && bold_off < after);
    }

    #[test]
    fn test_full_style_scope_order() {
        // Turn on: align, bold, scale. Turn off: scale, bold, align.
        let bytes = encode(
            &[text("HI", Align::Center, Emphasis::Bold, Scale::DOUBLE)],
            &PrinterProfile::MM80,
        );
        let expected = [
            &[0x1B, 0x40][..],       // init
            &[0x1B, 0x61, 0x01][..], // center
            &[0x1B, 0x45, 0x01][..], // bold on
            &[0x1D, 0x21, 0x11][..], // 2x2
            b"HI",
            &[0x0A][..],
            &[0x1D, 0x21, 0x00][..], // back to 1x1
            &[0x1B, 0x45, 0x00][..], // bold off
            &[0x1B, 0x61, 0x00][..], // back to left
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_two_column_padded_to_profile_width() {
        let bytes = encode(
            &[Instruction::TwoColumn {
                left: "TOTAL".into(),
                right: "33.60".into(),
            }],
            &PrinterProfile::MM80,
        );
        // init + 48 content bytes + LF
        assert_eq!(bytes.len(), 2 + 48 + 1);
        let row = &bytes[2..50];
        assert!(row.starts_with(b"TOTAL"));
        assert!(row.ends_with(b"33.60"));
    }

    #[test]
    fn test_rules_repeat_to_width() {
        let bytes = encode(
            &[
                Instruction::Rule {
                    style: RuleStyle::Solid,
                },
                Instruction::Rule {
                    style: RuleStyle::Dashed,
                },
            ],
            &PrinterProfile::MM58,
        );
        assert!(find(&bytes, "=".repeat(32).as_bytes()).is_some());
        assert!(find(&bytes, "-".repeat(32).as_bytes()).is_some());
    }

    #[test]
    fn test_cut_feeds_then_cuts() {
        let bytes = encode(&[Instruction::CutPaper], &PrinterProfile::MM80);
        assert_eq!(
            bytes,
            [
                &[0x1B, 0x40][..],             // init
                &[0x1B, 0x64, 0x04][..],       // feed 4
                &[0x1D, 0x56, 0x42, 0x00][..], // partial cut
            ]
            .concat()
        );
    }

    #[test]
    fn test_barcode_strip_sequence() {
        let spec = BarcodeSpec::new("CF-98765");
        let bytes = encode_barcode(&spec).unwrap();
        assert!(bytes.starts_with(&[0x1B, 0x40]));
        // Centered, geometry set before the symbol, cut at the end.
        let center = find(&bytes, &[0x1B, 0x61, 0x01]).unwrap();
        let height = find(&bytes, &[0x1D, 0x68, 80]).unwrap();
        let symbol = find(&bytes, &[0x1D, 0x6B, 73]).unwrap();
        let cut = find(&bytes, &[0x1D, 0x56, 0x42, 0x00]).unwrap();
        assert!(center < height && height < symbol && symbol < cut);
        assert!(find(&bytes, b"CF-98765").is_some());
    }

    #[test]
    fn test_barcode_strip_rejects_empty_value() {
        assert!(encode_barcode(&BarcodeSpec::new("")).is_err());
    }

    #[test]
    fn test_encoding_is_order_preserving() {
        let instructions = vec![
            text("one", Align::Left, Emphasis::Normal, Scale::NORMAL),
            text("two", Align::Left, Emphasis::Normal, Scale::NORMAL),
            text("three", Align::Left, Emphasis::Normal, Scale::NORMAL),
        ];
        let bytes = encode(&instructions, &PrinterProfile::MM80);
        let one = find(&bytes, b"one").unwrap();
        let two = find(&bytes, b"two").unwrap();
        let three = find(&bytes, b"three").unwrap();
        assert!(one < two && two < three);
    }
}
