//! # Printer Transport Layer
//!
//! Three delivery mechanisms behind one capability:
//!
//! - [`usb::UsbTransport`]: direct bulk writes to a USB printer-class device
//! - [`bridge::BridgeTransport`]: message channel into a native host shell
//! - [`network::NetworkTransport`]: backend-mediated network printer probe
//!
//! A transport connection is scoped to a single print operation: acquire,
//! transfer, release — never held open between calls. The dispatch
//! orchestrator guarantees release runs on every exit path after a
//! successful acquire.

use async_trait::async_trait;

use crate::error::PrintError;

pub mod bridge;
pub mod network;
pub mod usb;

pub use bridge::{BridgeEnvelope, BridgeTransport};
pub use network::NetworkTransport;
pub use usb::UsbTransport;

/// Where a print job is delivered. Selected once per dispatch, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterTarget {
    /// Direct USB bulk-transfer peripheral (device class 7).
    UsbPeripheral { vendor_filter: Option<u16> },
    /// Message channel exposed by the embedding host shell.
    HostBridge,
    /// Backend-mediated printer reached by interface address
    /// (TCP socket spec or USB device path, interpreted by the backend).
    NetworkPrinter { interface_address: String },
}

/// One print delivery mechanism.
///
/// Implementations must tolerate `release` being called after a failed
/// `transfer` (the orchestrator always runs best-effort cleanup) and after
/// a failed `acquire` (where it is a no-op).
#[async_trait]
pub trait Transport: Send {
    /// Open and claim the underlying connection.
    async fn acquire(&mut self) -> Result<(), PrintError>;

    /// Deliver one encoded payload over the acquired connection.
    async fn transfer(&mut self, bytes: &[u8]) -> Result<(), PrintError>;

    /// Release the connection. Safe to call in any state.
    async fn release(&mut self) -> Result<(), PrintError>;
}
