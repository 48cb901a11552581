//! # Layout Engine
//!
//! Pure function from a [`ReceiptDocument`] to an ordered sequence of
//! [`Instruction`]s at a configured column width. No I/O, no clock, no
//! randomness: identical input and width always produce an identical
//! instruction sequence, so a preview and its printed receipt agree.
//!
//! ## Two-column rows
//!
//! A [`Instruction::TwoColumn`] row pads the gap between left and right
//! text so the right text's last character lands in the final column. When
//! the texts together no longer fit, the gap collapses to exactly one
//! space and the overlong row is emitted as-is — reproducible, never
//! truncated, never "corrected".
//!
//! ## Rules
//!
//! Solid (heavy) rules separate the header, invoice, customer, items and
//! totals sections. A single dashed rule precedes the footer.

use crate::document::{LineItem, ReceiptDocument};

/// Fixed indent for modifier rows under a line item.
const MODIFIER_INDENT: &str = "  ";

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Text emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    Bold,
}

/// Character cell multiplier. `1` is the native size; `2` doubles the
/// width or height. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub width: u8,
    pub height: u8,
}

impl Scale {
    /// Native 1×1 size.
    pub const NORMAL: Self = Self {
        width: 1,
        height: 1,
    };

    /// Double width and height, for receipt titles.
    pub const DOUBLE: Self = Self {
        width: 2,
        height: 2,
    };

    /// Double height only, for kitchen-ticket item rows.
    pub const TALL: Self = Self {
        width: 1,
        height: 2,
    };
}

impl Default for Scale {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Rule line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStyle {
    /// Heavy section separator.
    Solid,
    /// Light separator, used once before the footer.
    Dashed,
}

/// One formatting instruction, produced in document order and immutable
/// once emitted. Emphasis and scale are attributes of [`Instruction::Text`]
/// rather than separate instruction types, so a single encoder can apply
/// them uniformly with the same turn-on/emit/turn-off discipline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Text {
        content: String,
        align: Align,
        emphasis: Emphasis,
        scale: Scale,
    },
    TwoColumn {
        left: String,
        right: String,
    },
    Rule {
        style: RuleStyle,
    },
    Newline,
    CutPaper,
}

impl Instruction {
    /// Plain left-aligned text at native size.
    fn plain(content: impl Into<String>) -> Self {
        Instruction::Text {
            content: content.into(),
            align: Align::Left,
            emphasis: Emphasis::Normal,
            scale: Scale::NORMAL,
        }
    }

    /// Centered text at native size.
    fn centered(content: impl Into<String>) -> Self {
        Instruction::Text {
            content: content.into(),
            align: Align::Center,
            emphasis: Emphasis::Normal,
            scale: Scale::NORMAL,
        }
    }

    fn two_column(left: impl Into<String>, right: impl Into<String>) -> Self {
        Instruction::TwoColumn {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Pad a two-column row so the right text ends at column `columns - 1`.
///
/// When `left` and `right` together reach or exceed the width, the gap is
/// exactly one space; the resulting overlong row wraps on paper, which is
/// preferable to silently dropping characters from either side.
pub fn two_column(left: &str, right: &str, columns: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = if used < columns { columns - used } else { 1 };
    let mut row = String::with_capacity(used + gap);
    row.push_str(left);
    for _ in 0..gap {
        row.push(' ');
    }
    row.push_str(right);
    row
}

/// Lay out a customer invoice.
///
/// Section order: header, invoice metadata, customer metadata, items,
/// totals + payment, footer, cut. Amounts pass through verbatim.
pub fn layout_receipt(doc: &ReceiptDocument, columns: usize) -> Vec<Instruction> {
    let mut out = Vec::new();

    // Header. The title prints double-size unless that would overflow the
    // line, in which case it falls back to native size rather than wrap.
    let title_scale = if doc.header.title.chars().count() * 2 <= columns {
        Scale::DOUBLE
    } else {
        Scale::NORMAL
    };
    out.push(Instruction::Text {
        content: doc.header.title.clone(),
        align: Align::Center,
        emphasis: Emphasis::Bold,
        scale: title_scale,
    });
    for line in &doc.header.address_lines {
        out.push(Instruction::centered(line.clone()));
    }
    out.push(Instruction::Rule {
        style: RuleStyle::Solid,
    });

    // Invoice metadata
    out.push(Instruction::two_column(
        "Invoice No.",
        doc.meta.invoice_number.clone(),
    ));
    out.push(Instruction::two_column("Date", doc.meta.timestamp.clone()));
    out.push(Instruction::Rule {
        style: RuleStyle::Solid,
    });

    // Customer metadata
    out.push(Instruction::two_column(
        "Customer",
        doc.meta.customer_name.clone(),
    ));
    if let Some(guests) = doc.meta.guest_count {
        out.push(Instruction::two_column("Guests", guests.to_string()));
    }
    if let Some(phone) = &doc.meta.phone {
        out.push(Instruction::two_column("Phone", phone.clone()));
    }
    out.push(Instruction::Rule {
        style: RuleStyle::Solid,
    });

    // Items
    for item in &doc.items {
        emit_item(&mut out, item);
    }
    out.push(Instruction::Rule {
        style: RuleStyle::Solid,
    });

    // Totals
    out.push(Instruction::two_column(
        "Subtotal",
        doc.totals.subtotal.clone(),
    ));
    out.push(Instruction::two_column(
        "Discount",
        doc.totals.discount.clone(),
    ));
    out.push(Instruction::two_column(
        "Service Fee",
        doc.totals.service_fee.clone(),
    ));
    out.push(Instruction::two_column("Tax", doc.totals.tax.clone()));
    out.push(Instruction::two_column(
        "TOTAL",
        doc.totals.grand_total.clone(),
    ));

    // Payment
    out.push(Instruction::Newline);
    out.push(Instruction::two_column(
        "Payment",
        doc.payment.method.clone(),
    ));
    out.push(Instruction::two_column("Status", doc.payment.status.clone()));
    out.push(Instruction::two_column(
        "Paid",
        doc.payment.paid_amount.clone(),
    ));

    // Footer
    out.push(Instruction::Rule {
        style: RuleStyle::Dashed,
    });
    for line in &doc.footer.lines {
        out.push(Instruction::centered(line.clone()));
    }
    out.push(Instruction::Newline);
    out.push(Instruction::CutPaper);

    out
}

/// Lay out a kitchen order ticket: what to cook, never what it costs.
///
/// Item rows are bold and double-height so they read from arm's length at
/// the pass; modifiers keep the same 2-space indent as the invoice.
/// Ticket rows stay single-width, so the column count only affects the
/// downstream rendering of two-column metadata rows.
pub fn layout_kitchen_ticket(doc: &ReceiptDocument, _columns: usize) -> Vec<Instruction> {
    let mut out = Vec::new();

    out.push(Instruction::Text {
        content: "KITCHEN ORDER".to_string(),
        align: Align::Center,
        emphasis: Emphasis::Bold,
        scale: Scale::TALL,
    });
    out.push(Instruction::Rule {
        style: RuleStyle::Solid,
    });
    out.push(Instruction::two_column(
        "Invoice No.",
        doc.meta.invoice_number.clone(),
    ));
    out.push(Instruction::two_column("Date", doc.meta.timestamp.clone()));
    out.push(Instruction::Rule {
        style: RuleStyle::Solid,
    });

    for item in &doc.items {
        out.push(Instruction::Text {
            content: format!("{} x {}", item.quantity, item.description),
            align: Align::Left,
            emphasis: Emphasis::Bold,
            scale: Scale::TALL,
        });
        for modifier in &item.modifiers {
            out.push(Instruction::plain(format!(
                "{}{}",
                MODIFIER_INDENT, modifier
            )));
        }
    }

    out.push(Instruction::Newline);
    out.push(Instruction::CutPaper);

    out
}

/// Emit one line item: the priced row, then its modifier rows.
fn emit_item(out: &mut Vec<Instruction>, item: &LineItem) {
    let left = format!("{} x {}", item.quantity, item.description);
    out.push(Instruction::two_column(left, item.line_total.clone()));
    for modifier in &item.modifiers {
        out.push(Instruction::plain(format!(
            "{}{}",
            MODIFIER_INDENT, modifier
        )));
    }
}
