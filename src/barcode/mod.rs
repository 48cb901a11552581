//! # Barcode Generator
//!
//! CODE128 rendering in two independent forms:
//!
//! - [`vector::render_svg`]: scalable markup for previews and print dialogs
//! - [`raster::render_raster`]: a bitmap for label compositing and PNG export
//!
//! Both forms are built from the same module pattern
//! ([`code128::modules`]), so a given value always produces the same bars
//! regardless of output form.

pub mod code128;
pub mod raster;
pub mod vector;

/// Quiet-zone width on each side of the bars, in modules.
///
/// CODE128 requires at least 10 modules of clear space for scanners to
/// find the symbol's edges.
pub const QUIET_ZONE_MODULES: u32 = 10;

pub use code128::modules;
pub use raster::render_raster;
pub use vector::render_svg;
