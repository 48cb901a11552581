//! # Printer Profiles
//!
//! This module defines the per-paper-stock characteristics the layout
//! engine and encoder need: how many text columns fit on a line.
//!
//! ## Supported Stocks
//!
//! | Profile | Paper | Columns (Font A) |
//! |---------|-------|------------------|
//! | MM80 | 80mm receipt roll | 48 |
//! | MM58 | 58mm receipt roll | 32 |
//!
//! ## Usage
//!
//! ```
//! use recibo::printer::PrinterProfile;
//!
//! let profile = PrinterProfile::MM80;
//! assert_eq!(profile.columns, 48);
//! ```

/// # Printer Profile
///
/// Column geometry for a thermal printer paper stock.
///
/// The layout engine pads two-column rows to `columns`; the encoder draws
/// rule lines at the same width. Keeping both on one profile means the
/// preview and the paper always agree about where column `columns - 1` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterProfile {
    /// Stock name for logs.
    pub name: &'static str,

    /// Text columns per line in the printer's default font.
    pub columns: usize,
}

impl PrinterProfile {
    /// 80mm receipt roll: 48 columns at 12-dot character width.
    pub const MM80: Self = Self {
        name: "80mm",
        columns: 48,
    };

    /// 58mm receipt roll: 32 columns at 12-dot character width.
    pub const MM58: Self = Self {
        name: "58mm",
        columns: 32,
    };
}

impl Default for PrinterProfile {
    fn default() -> Self {
        Self::MM80
    }
}
