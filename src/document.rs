//! # Printable Documents
//!
//! Plain data structures describing what gets printed: a receipt (invoice
//! or kitchen ticket), a standalone barcode, or a barcode label for
//! physical label stock.
//!
//! ## Monetary values are opaque strings
//!
//! Every amount (`line_total`, the totals block, `paid_amount`) arrives
//! pre-formatted by the caller and is rendered byte-for-byte. The printing
//! subsystem never parses, recomputes, or "corrects" an amount — in
//! particular it does not check that `grand_total` equals
//! `subtotal - discount + service_fee + tax`. A mismatch is a caller-side
//! validation bug and is printed as given, so preview and paper can never
//! drift apart through locale-aware reformatting.

use serde::{Deserialize, Serialize};

use crate::error::PrintError;

/// Receipt header: store name plus address lines, all centered when laid out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Header {
    pub title: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
}

/// Invoice/customer metadata block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    pub invoice_number: String,
    /// Caller-formatted timestamp text, printed as-is.
    pub timestamp: String,
    pub customer_name: String,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One sale line: quantity, description, optional modifiers, line total.
///
/// Modifiers ("Extra Cheese +2.00") render indented under the item with no
/// price column of their own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    pub quantity: u32,
    pub description: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    pub line_total: String,
}

/// Totals block. All fields are caller-preformatted strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: String,
    pub discount: String,
    pub service_fee: String,
    pub tax: String,
    pub grand_total: String,
}

/// Payment block: method, status, and the amount tendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payment {
    pub method: String,
    pub status: String,
    pub paid_amount: String,
}

/// Free-form footer lines, centered when laid out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Footer {
    #[serde(default)]
    pub lines: Vec<String>,
}

/// A complete printable receipt.
///
/// Constructed fresh per print request from caller data, consumed
/// synchronously by the layout engine and encoder, discarded after
/// dispatch. No component retains it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptDocument {
    pub header: Header,
    pub meta: Meta,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    pub payment: Payment,
    pub footer: Footer,
}

impl ReceiptDocument {
    /// Reject malformed input before any transport is acquired.
    ///
    /// Opening a USB device for doomed work wastes the user's permission
    /// grant, so zero quantities are caught here, not in the encoder.
    pub fn validate(&self) -> Result<(), PrintError> {
        for (i, item) in self.items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(PrintError::EncodingInvalid(format!(
                    "line item {} ({:?}) has zero quantity",
                    i, item.description
                )));
            }
        }
        Ok(())
    }
}

/// Parameters for a CODE128 barcode.
///
/// The symbology is fixed: CODE128 covers the full printable ASCII range,
/// which is what category/SKU codes need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeSpec {
    /// Text to encode. Must be non-empty printable ASCII.
    pub value: String,
    /// Width of one barcode module in pixels at native resolution.
    pub module_width: u32,
    /// Bar height in pixels at native resolution.
    pub bar_height: u32,
    /// Render the human-readable value under the bars.
    pub show_text: bool,
    /// Glyph height in pixels for the human-readable text.
    pub font_size: u32,
}

impl BarcodeSpec {
    /// A spec with sensible raster defaults for the given value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            module_width: 2,
            bar_height: 80,
            show_text: true,
            font_size: 24,
        }
    }

    /// Reject values CODE128 cannot encode. Runs before any device work.
    pub fn validate(&self) -> Result<(), PrintError> {
        if self.value.is_empty() {
            return Err(PrintError::EncodingInvalid(
                "barcode value is empty".to_string(),
            ));
        }
        if let Some(ch) = self.value.chars().find(|c| !matches!(c, ' '..='~')) {
            return Err(PrintError::EncodingInvalid(format!(
                "barcode value contains unencodable character {:?}",
                ch
            )));
        }
        Ok(())
    }
}

/// A barcode label for physical label stock (38×18mm, 40×25mm, ...).
///
/// Rendered as a raster canvas: title and subtitle centered near the top,
/// barcode composited near the bottom margin. Dimensions are physical
/// millimetres; the raster renderer converts to pixels with the caller's
/// scale factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeLabel {
    pub spec: BarcodeSpec,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl BarcodeLabel {
    /// A label on 38×18mm stock, the common category-barcode size.
    pub fn mm38x18(spec: BarcodeSpec) -> Self {
        Self {
            spec,
            title: None,
            subtitle: None,
            width_mm: 38.0,
            height_mm: 18.0,
        }
    }

    /// A label on 40×25mm stock.
    pub fn mm40x25(spec: BarcodeSpec) -> Self {
        Self {
            spec,
            title: None,
            subtitle: None,
            width_mm: 40.0,
            height_mm: 25.0,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// What kind of payload a print request carries.
///
/// Drives the host-bridge envelope tag (`PRINT_KOT`, `PRINT_INVOICE`,
/// `PRINT_BARCODE`, `PRINT_BARCODE_LABEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintKind {
    /// Kitchen order ticket: items only, no prices.
    Kot,
    /// Customer invoice with totals and payment block.
    Invoice,
    /// Standalone barcode strip.
    Barcode,
    /// Raster label for label stock.
    BarcodeLabel,
}

impl PrintKind {
    /// The bridge envelope `type` tag for this kind.
    pub fn envelope_type(&self) -> &'static str {
        match self {
            PrintKind::Kot => "PRINT_KOT",
            PrintKind::Invoice => "PRINT_INVOICE",
            PrintKind::Barcode => "PRINT_BARCODE",
            PrintKind::BarcodeLabel => "PRINT_BARCODE_LABEL",
        }
    }
}
