//! # USB Bulk Transport
//!
//! Direct communication with a USB printer-class peripheral.
//!
//! ## Device lifecycle
//!
//! Each print job runs the full `open → claim → write → release → close`
//! cycle; no handle survives between jobs. The acquire path:
//!
//! 1. Enumerate devices exposing USB class 7 (printer), optionally
//!    narrowed to one vendor id.
//! 2. Open the first match and detach any kernel driver.
//! 3. Select configuration 1 if the device has none active.
//! 4. Claim interface 0.
//!
//! Transfers are chunked bulk OUT writes to endpoint 1. A failure after a
//! partial claim still releases the interface before the error propagates;
//! the orchestrator drives that through [`Transport::release`].

use std::time::Duration;

use async_trait::async_trait;
use rusb::{Device, DeviceHandle, GlobalContext};
use tracing::{debug, warn};

use super::Transport;
use crate::error::PrintError;

/// USB base class code for printers. The sole enumeration filter.
pub const USB_PRINTER_CLASS: u8 = 7;

/// Bulk OUT endpoint address for printer-class devices.
const BULK_OUT_ENDPOINT: u8 = 0x01;

/// Chunk size for bulk writes (bytes).
const CHUNK_SIZE: usize = 4096;

/// Per-chunk write deadline.
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// # USB Printer Transport
///
/// Holds the open device handle between `acquire` and `release`. The
/// handle is dropped (closing the device) on release, so the next job
/// starts from a closed state as printer-class firmware expects.
pub struct UsbTransport {
    vendor_filter: Option<u16>,
    handle: Option<DeviceHandle<GlobalContext>>,
    claimed: bool,
}

impl UsbTransport {
    /// Transport for the first printer-class device, optionally limited
    /// to one vendor id.
    pub fn new(vendor_filter: Option<u16>) -> Self {
        Self {
            vendor_filter,
            handle: None,
            claimed: false,
        }
    }
}

#[async_trait]
impl Transport for UsbTransport {
    async fn acquire(&mut self) -> Result<(), PrintError> {
        let device = find_printer(self.vendor_filter)?;
        debug!(
            bus = device.bus_number(),
            address = device.address(),
            "opening USB printer"
        );

        let mut handle = device
            .open()
            .map_err(|e| map_rusb(e, "failed to open USB printer"))?;

        // Not supported on all platforms; claiming will surface any
        // remaining driver conflict.
        let _ = handle.set_auto_detach_kernel_driver(true);

        if needs_configuration(handle.active_configuration()) {
            handle
                .set_active_configuration(1)
                .map_err(|e| map_rusb(e, "failed to select configuration 1"))?;
        }

        handle
            .claim_interface(0)
            .map_err(|e| map_rusb(e, "failed to claim interface 0"))?;

        self.handle = Some(handle);
        self.claimed = true;
        Ok(())
    }

    async fn transfer(&mut self, bytes: &[u8]) -> Result<(), PrintError> {
        let handle = self.handle.as_ref().ok_or_else(|| {
            PrintError::TransferFailed("transfer attempted before acquire".to_string())
        })?;

        for chunk in bytes.chunks(CHUNK_SIZE) {
            let written = handle
                .write_bulk(BULK_OUT_ENDPOINT, chunk, WRITE_TIMEOUT)
                .map_err(|e| map_rusb(e, "bulk write failed"))?;
            if written != chunk.len() {
                return Err(PrintError::TransferFailed(format!(
                    "short bulk write: {} of {} bytes",
                    written,
                    chunk.len()
                )));
            }
        }
        debug!(bytes = bytes.len(), "bulk transfer complete");
        Ok(())
    }

    async fn release(&mut self) -> Result<(), PrintError> {
        if let Some(mut handle) = self.handle.take() {
            if self.claimed {
                self.claimed = false;
                if let Err(e) = handle.release_interface(0) {
                    warn!(error = %e, "failed to release USB interface");
                    return Err(map_rusb(e, "failed to release interface 0"));
                }
            }
            // Dropping the handle closes the device.
        }
        Ok(())
    }
}

/// Find the first device exposing the printer class, either on the device
/// descriptor or on any interface of its first configuration.
fn find_printer(vendor_filter: Option<u16>) -> Result<Device<GlobalContext>, PrintError> {
    let devices = rusb::devices()
        .map_err(|e| map_rusb(e, "USB enumeration failed"))?;

    for device in devices.iter() {
        let Ok(descriptor) = device.device_descriptor() else {
            continue;
        };
        if let Some(vendor) = vendor_filter {
            if descriptor.vendor_id() != vendor {
                continue;
            }
        }
        if descriptor.class_code() == USB_PRINTER_CLASS || has_printer_interface(&device) {
            return Ok(device);
        }
    }

    Err(PrintError::DeviceUnavailable(match vendor_filter {
        Some(vendor) => format!(
            "no USB printer-class device found for vendor {:04x}",
            vendor
        ),
        None => "no USB printer-class device found".to_string(),
    }))
}

/// A device reports configuration 0 when none is active yet. Any other
/// value means the device is already configured (possibly as part of a
/// composite arrangement) and must be left untouched.
fn needs_configuration(active: Result<u8, rusb::Error>) -> bool {
    matches!(active, Ok(0) | Err(_))
}

/// Printer-class devices commonly report class 0 at the device level and
/// class 7 on the interface, so both levels are checked.
fn has_printer_interface(device: &Device<GlobalContext>) -> bool {
    let Ok(config) = device.config_descriptor(0) else {
        return false;
    };
    config
        .interfaces()
        .flat_map(|i| i.descriptors())
        .any(|d| d.class_code() == USB_PRINTER_CLASS)
}

/// Map libusb error codes onto the subsystem's error kinds, preserving
/// the underlying message.
fn map_rusb(e: rusb::Error, context: &str) -> PrintError {
    match e {
        rusb::Error::Access => PrintError::PermissionDenied(format!("{}: {}", context, e)),
        rusb::Error::NoDevice | rusb::Error::NotFound => {
            PrintError::DeviceUnavailable(format!("{}: {}", context, e))
        }
        _ => PrintError::TransferFailed(format!("{}: {}", context, e)),
    }
}
