//! # Recibo - POS Receipt & Label Printing Library
//!
//! Recibo is the printing subsystem of a point-of-sale client. It turns
//! structured sale and category records into correctly framed output for
//! thermal receipt printers and label stock:
//!
//! - **Layout engine**: receipt/kitchen-ticket documents to formatting
//!   instructions, deterministic and printer-agnostic
//! - **Command encoder**: instruction sequences to ESC/POS bytes
//! - **Barcode generator**: CODE128 as SVG markup and raster bitmaps
//! - **Label rendering**: mm-sized raster canvases with PNG export
//! - **Transports**: USB bulk device, host-shell message bridge, and a
//!   backend-mediated network printer probe
//! - **Dispatch**: one orchestrator running acquire/encode/transfer/release
//!   with explicit target selection
//!
//! ## Quick Start
//!
//! ```no_run
//! use recibo::{
//!     dispatch::{Dispatcher, Environment},
//!     document::{BarcodeLabel, BarcodeSpec, ReceiptDocument},
//! };
//!
//! # async fn print(doc: ReceiptDocument) -> Result<(), recibo::error::PrintError> {
//! let dispatcher = Dispatcher::new(
//!     Environment { host_shell: false, usb_available: true },
//!     "http://localhost:4100/printer/check",
//! );
//!
//! // Print an invoice over whatever transport the environment offers.
//! dispatcher.print_receipt(&doc).await?;
//!
//! // Export a 38x18mm category label as PNG.
//! let label = BarcodeLabel::mm38x18(BarcodeSpec::new("CF-98765")).title("Coffee");
//! let export = dispatcher.export_label(&label, 10.0).await?;
//! std::fs::write(&export.filename, &export.png).ok();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | Printable document model |
//! | [`layout`] | Document to formatting instructions |
//! | [`protocol`] | ESC/POS command builders |
//! | [`encoder`] | Instructions to printer bytes |
//! | [`barcode`] | CODE128 modules, SVG, raster |
//! | [`label`] | Label canvases and PNG export |
//! | [`transport`] | USB / bridge / network delivery |
//! | [`dispatch`] | Per-request orchestration |
//! | [`settings`] | Persisted printer interface address |
//! | [`printer`] | Paper profiles (column widths) |
//! | [`error`] | Error types |

pub mod barcode;
pub mod dispatch;
pub mod document;
pub mod encoder;
pub mod error;
pub mod label;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod settings;
pub mod transport;

// Re-exports for convenience
pub use dispatch::{Dispatcher, Environment};
pub use document::{BarcodeLabel, BarcodeSpec, ReceiptDocument};
pub use error::{ErrorKind, PrintError};
pub use printer::PrinterProfile;
pub use transport::{PrinterTarget, Transport};
