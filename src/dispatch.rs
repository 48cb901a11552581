//! # Dispatch Orchestrator
//!
//! One entry point per print operation. Each request runs the same state
//! machine:
//!
//! ```text
//! Idle -> Acquiring -> Encoding -> Transferring -> Released
//! ```
//!
//! Transitions are logged at debug level. Malformed input is rejected with
//! `EncodingInvalid` before any transport is acquired, so a doomed job
//! never burns a device claim or a user's permission prompt. After a
//! successful acquire, release runs on every exit path, including a failed
//! transfer; transport error kinds propagate verbatim.
//!
//! ## Target selection
//!
//! The policy lives here and nowhere else: inside a host shell the bridge
//! wins; otherwise a USB-capable environment goes direct; otherwise the
//! job goes to the backend-mediated network printer at the configured
//! interface address. Leaf transports stay environment-agnostic.
//!
//! One dispatch at a time: an atomic busy flag rejects re-entrant
//! submission with `ErrorKind::Busy` instead of interleaving bulk writes.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::document::{BarcodeLabel, BarcodeSpec, PrintKind, ReceiptDocument};
use crate::encoder;
use crate::error::PrintError;
use crate::label;
use crate::layout;
use crate::printer::PrinterProfile;
use crate::transport::network::ProbeResponse;
use crate::transport::{
    BridgeEnvelope, BridgeTransport, NetworkTransport, PrinterTarget, Transport, UsbTransport,
};

/// Where this process is running and what it can reach. Injected at
/// construction; never probed by leaf components.
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment {
    /// Embedded in the native host shell (bridge channel available).
    pub host_shell: bool,
    /// Direct USB device access is possible on this platform.
    pub usb_available: bool,
}

/// Per-request lifecycle, logged at each transition.
#[derive(Debug, Clone, Copy)]
enum Phase {
    Acquiring,
    Encoding,
    Transferring,
    Released,
}

/// A finished raster export: PNG bytes plus the conventional filename.
#[derive(Debug, Clone)]
pub struct LabelExport {
    pub filename: String,
    pub png: Vec<u8>,
}

/// # Print Dispatcher
///
/// Owns target selection and the acquire/encode/transfer/release cycle.
/// Construct one per printing context and reuse it across requests; the
/// only cross-request state is the busy flag.
pub struct Dispatcher {
    env: Environment,
    profile: PrinterProfile,
    bridge: Option<UnboundedSender<String>>,
    probe_endpoint: String,
    interface_address: Option<String>,
    vendor_filter: Option<u16>,
    busy: AtomicBool,
}

impl Dispatcher {
    pub fn new(env: Environment, probe_endpoint: impl Into<String>) -> Self {
        Self {
            env,
            profile: PrinterProfile::default(),
            bridge: None,
            probe_endpoint: probe_endpoint.into(),
            interface_address: None,
            vendor_filter: None,
            busy: AtomicBool::new(false),
        }
    }

    /// Attach the host shell's message channel.
    pub fn with_bridge(mut self, sender: UnboundedSender<String>) -> Self {
        self.bridge = Some(sender);
        self
    }

    /// Set the network printer's interface address (TCP socket spec or USB
    /// device path, interpreted by the backend).
    pub fn with_interface_address(mut self, address: impl Into<String>) -> Self {
        self.interface_address = Some(address.into());
        self
    }

    /// Limit USB enumeration to one vendor id.
    pub fn with_vendor_filter(mut self, vendor: u16) -> Self {
        self.vendor_filter = Some(vendor);
        self
    }

    /// Use a different paper profile (default is 80mm, 48 columns).
    pub fn with_profile(mut self, profile: PrinterProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Resolve the delivery target for this environment.
    pub fn select_target(&self) -> Result<PrinterTarget, PrintError> {
        if self.env.host_shell {
            return Ok(PrinterTarget::HostBridge);
        }
        if self.env.usb_available {
            return Ok(PrinterTarget::UsbPeripheral {
                vendor_filter: self.vendor_filter,
            });
        }
        match &self.interface_address {
            Some(address) => Ok(PrinterTarget::NetworkPrinter {
                interface_address: address.clone(),
            }),
            None => Err(PrintError::DeviceUnavailable(
                "no printer route: not in a host shell, no USB access, \
                 and no printer interface configured"
                    .to_string(),
            )),
        }
    }

    /// Print a customer invoice.
    pub async fn print_receipt(&self, doc: &ReceiptDocument) -> Result<(), PrintError> {
        doc.validate()?;
        self.print_document(doc, PrintKind::Invoice).await
    }

    /// Print a kitchen order ticket (no prices).
    pub async fn print_kitchen_ticket(&self, doc: &ReceiptDocument) -> Result<(), PrintError> {
        doc.validate()?;
        self.print_document(doc, PrintKind::Kot).await
    }

    /// Print a standalone barcode strip.
    pub async fn print_barcode(&self, spec: &BarcodeSpec) -> Result<(), PrintError> {
        spec.validate()?;
        let _guard = self.try_busy()?;
        let target = self.select_target()?;
        let mut transport = self.make_transport(&target)?;

        run_job(transport.as_mut(), || match target {
            PrinterTarget::HostBridge => {
                BridgeEnvelope::print(PrintKind::Barcode, serde_json::to_value(spec)?).to_json()
            }
            _ => encoder::encode_barcode(spec),
        })
        .await
    }

    /// Render a label to PNG and export it.
    ///
    /// Outside the host shell the caller receives the bytes and the
    /// conventional filename and owns the save path. Inside the shell the
    /// PNG is additionally posted as a DOWNLOAD envelope, since the shell
    /// has no browser download path of its own.
    pub async fn export_label(
        &self,
        label: &BarcodeLabel,
        scale: f32,
    ) -> Result<LabelExport, PrintError> {
        let _guard = self.try_busy()?;
        let png = label::label_png(label, scale)?;
        let export = LabelExport {
            filename: label::label_filename(&label.spec.value),
            png,
        };

        if self.env.host_shell {
            let mut transport = self.bridge_transport()?;
            let envelope =
                BridgeEnvelope::download(&export.filename, &label::data_url(&export.png));
            run_job(&mut transport, || envelope.to_json()).await?;
        }

        Ok(export)
    }

    /// Print a label through the host shell's label printer.
    ///
    /// Label stock is only reachable through the shell; byte-oriented
    /// receipt transports cannot drive it.
    pub async fn print_label(&self, label: &BarcodeLabel) -> Result<(), PrintError> {
        label.spec.validate()?;
        let _guard = self.try_busy()?;
        if !self.env.host_shell {
            return Err(PrintError::DeviceUnavailable(
                "label printing requires the host shell".to_string(),
            ));
        }
        let mut transport = self.bridge_transport()?;
        run_job(&mut transport, || {
            BridgeEnvelope::print(PrintKind::BarcodeLabel, serde_json::to_value(label)?).to_json()
        })
        .await
    }

    /// Settings-validation probe: ask the backend whether a printer
    /// answers at `interface_address`.
    pub async fn probe(&self, interface_address: &str) -> Result<ProbeResponse, PrintError> {
        NetworkTransport::new(self.probe_endpoint.clone(), interface_address)
            .probe()
            .await
    }

    async fn print_document(
        &self,
        doc: &ReceiptDocument,
        kind: PrintKind,
    ) -> Result<(), PrintError> {
        let _guard = self.try_busy()?;
        let target = self.select_target()?;
        let mut transport = self.make_transport(&target)?;

        run_job(transport.as_mut(), || match target {
            PrinterTarget::HostBridge => {
                BridgeEnvelope::print(kind, serde_json::to_value(doc)?).to_json()
            }
            _ => {
                let instructions = match kind {
                    PrintKind::Kot => layout::layout_kitchen_ticket(doc, self.profile.columns),
                    _ => layout::layout_receipt(doc, self.profile.columns),
                };
                Ok(encoder::encode(&instructions, &self.profile))
            }
        })
        .await
    }

    fn make_transport(&self, target: &PrinterTarget) -> Result<Box<dyn Transport>, PrintError> {
        Ok(match target {
            PrinterTarget::UsbPeripheral { vendor_filter } => {
                Box::new(UsbTransport::new(*vendor_filter))
            }
            PrinterTarget::HostBridge => Box::new(self.bridge_transport()?),
            PrinterTarget::NetworkPrinter { interface_address } => Box::new(
                NetworkTransport::new(self.probe_endpoint.clone(), interface_address.clone()),
            ),
        })
    }

    fn bridge_transport(&self) -> Result<BridgeTransport, PrintError> {
        match &self.bridge {
            Some(sender) => Ok(BridgeTransport::new(sender.clone())),
            None => Err(PrintError::DeviceUnavailable(
                "host shell environment without a bridge channel".to_string(),
            )),
        }
    }

    fn try_busy(&self) -> Result<BusyGuard<'_>, PrintError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PrintError::Busy);
        }
        Ok(BusyGuard(&self.busy))
    }
}

/// Clears the busy flag when the dispatch scope ends, on success or error.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drive one payload through a transport's full lifecycle.
///
/// The payload is built after the acquire succeeds (bridge payloads
/// serialize per target). An encode failure still releases; a transfer
/// failure still releases and its error wins over any release error.
async fn run_job(
    transport: &mut dyn Transport,
    encode: impl FnOnce() -> Result<Vec<u8>, PrintError>,
) -> Result<(), PrintError> {
    debug!(phase = ?Phase::Acquiring, "dispatch");
    transport.acquire().await?;

    debug!(phase = ?Phase::Encoding, "dispatch");
    let result = match encode() {
        Ok(payload) => {
            debug!(phase = ?Phase::Transferring, bytes = payload.len(), "dispatch");
            transport.transfer(&payload).await
        }
        Err(e) => Err(e),
    };

    let released = transport.release().await;
    debug!(phase = ?Phase::Released, success = result.is_ok(), "dispatch");

    match (result, released) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(release_err)) => Err(release_err),
        (Err(job_err), release_result) => {
            if release_result.is_err() {
                warn!("release failed after a failed job; reporting the job error");
            }
            Err(job_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Header, LineItem};
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// Counts lifecycle calls and injects failures at chosen steps.
    #[derive(Default)]
    struct MockTransport {
        acquires: usize,
        transfers: usize,
        releases: usize,
        fail_acquire: bool,
        fail_transfer: bool,
        last_payload: Vec<u8>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn acquire(&mut self) -> Result<(), PrintError> {
            self.acquires += 1;
            if self.fail_acquire {
                return Err(PrintError::DeviceUnavailable("no device".into()));
            }
            Ok(())
        }

        async fn transfer(&mut self, bytes: &[u8]) -> Result<(), PrintError> {
            self.transfers += 1;
            self.last_payload = bytes.to_vec();
            if self.fail_transfer {
                return Err(PrintError::TransferFailed("pipe error".into()));
            }
            Ok(())
        }

        async fn release(&mut self) -> Result<(), PrintError> {
            self.releases += 1;
            Ok(())
        }
    }

    fn sample_doc() -> ReceiptDocument {
        ReceiptDocument {
            header: Header {
                title: "CAFE".into(),
                address_lines: vec![],
            },
            items: vec![LineItem {
                quantity: 2,
                description: "Latte".into(),
                modifiers: vec![],
                line_total: "9.00".into(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_successful_job_runs_full_lifecycle() {
        let mut mock = MockTransport::default();
        run_job(&mut mock, || Ok(vec![1, 2, 3])).await.unwrap();
        assert_eq!((mock.acquires, mock.transfers, mock.releases), (1, 1, 1));
        assert_eq!(mock.last_payload, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_transfer_failure_still_releases_once() {
        let mut mock = MockTransport {
            fail_transfer: true,
            ..Default::default()
        };
        let err = run_job(&mut mock, || Ok(vec![0])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(mock.releases, 1);
    }

    #[tokio::test]
    async fn test_acquire_failure_skips_transfer_and_release() {
        let mut mock = MockTransport {
            fail_acquire: true,
            ..Default::default()
        };
        let err = run_job(&mut mock, || Ok(vec![0])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
        assert_eq!((mock.transfers, mock.releases), (0, 0));
    }

    #[tokio::test]
    async fn test_encode_failure_still_releases() {
        let mut mock = MockTransport::default();
        let err = run_job(&mut mock, || {
            Err(PrintError::EncodingInvalid("bad payload".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingInvalid);
        assert_eq!((mock.transfers, mock.releases), (0, 1));
    }

    #[test]
    fn test_target_selection_policy() {
        let shell = Dispatcher::new(
            Environment {
                host_shell: true,
                usb_available: true,
            },
            "http://localhost/probe",
        );
        assert_eq!(shell.select_target().unwrap(), PrinterTarget::HostBridge);

        let desktop = Dispatcher::new(
            Environment {
                host_shell: false,
                usb_available: true,
            },
            "http://localhost/probe",
        );
        assert_eq!(
            desktop.select_target().unwrap(),
            PrinterTarget::UsbPeripheral {
                vendor_filter: None
            }
        );

        let kiosk = Dispatcher::new(Environment::default(), "http://localhost/probe")
            .with_interface_address("tcp://192.168.1.87:9100");
        assert_eq!(
            kiosk.select_target().unwrap(),
            PrinterTarget::NetworkPrinter {
                interface_address: "tcp://192.168.1.87:9100".into()
            }
        );
    }

    #[test]
    fn test_no_route_is_device_unavailable() {
        let stranded = Dispatcher::new(Environment::default(), "http://localhost/probe");
        assert_eq!(
            stranded.select_target().unwrap_err().kind(),
            ErrorKind::DeviceUnavailable
        );
    }

    #[tokio::test]
    async fn test_busy_flag_rejects_reentrant_dispatch() {
        let dispatcher = Dispatcher::new(Environment::default(), "http://localhost/probe");
        dispatcher.busy.store(true, Ordering::Release);
        let err = dispatcher.print_receipt(&sample_doc()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Busy);
    }

    #[tokio::test]
    async fn test_busy_flag_clears_after_dispatch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(
            Environment {
                host_shell: true,
                usb_available: false,
            },
            "http://localhost/probe",
        )
        .with_bridge(tx);

        dispatcher.print_receipt(&sample_doc()).await.unwrap();
        dispatcher.print_receipt(&sample_doc()).await.unwrap();
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_invalid_document_rejected_before_any_transport_work() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(
            Environment {
                host_shell: true,
                usb_available: false,
            },
            "http://localhost/probe",
        )
        .with_bridge(tx);

        let mut doc = sample_doc();
        doc.items[0].quantity = 0;
        let err = dispatcher.print_receipt(&doc).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingInvalid);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_bridge_receipt_carries_invoice_envelope() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(
            Environment {
                host_shell: true,
                usb_available: false,
            },
            "http://localhost/probe",
        )
        .with_bridge(tx);

        dispatcher.print_receipt(&sample_doc()).await.unwrap();
        let message = rx.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&message).unwrap();
        assert_eq!(json["type"], "PRINT_INVOICE");
        assert_eq!(json["payload"]["header"]["title"], "CAFE");
    }

    #[tokio::test]
    async fn test_bridge_kitchen_ticket_envelope() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(
            Environment {
                host_shell: true,
                usb_available: false,
            },
            "http://localhost/probe",
        )
        .with_bridge(tx);

        dispatcher.print_kitchen_ticket(&sample_doc()).await.unwrap();
        let message = rx.recv().await.unwrap();
        assert!(message.contains("PRINT_KOT"));
    }

    #[tokio::test]
    async fn test_export_label_in_shell_posts_download() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(
            Environment {
                host_shell: true,
                usb_available: false,
            },
            "http://localhost/probe",
        )
        .with_bridge(tx);

        let label = BarcodeLabel::mm38x18(BarcodeSpec::new("CF-98765")).title("Coffee");
        let export = dispatcher.export_label(&label, 2.0).await.unwrap();
        assert_eq!(export.filename, "category_barcode_CF-98765.png");
        assert!(!export.png.is_empty());

        let message = rx.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&message).unwrap();
        assert_eq!(json["type"], "DOWNLOAD");
        assert_eq!(json["payload"]["filename"], "category_barcode_CF-98765.png");
    }

    #[tokio::test]
    async fn test_export_label_outside_shell_returns_bytes_only() {
        let dispatcher = Dispatcher::new(Environment::default(), "http://localhost/probe");
        let label = BarcodeLabel::mm38x18(BarcodeSpec::new("CF-98765"));
        let export = dispatcher.export_label(&label, 2.0).await.unwrap();
        assert_eq!(&export.png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_print_label_outside_shell_is_unavailable() {
        let dispatcher = Dispatcher::new(
            Environment {
                host_shell: false,
                usb_available: true,
            },
            "http://localhost/probe",
        );
        let label = BarcodeLabel::mm38x18(BarcodeSpec::new("CF-1"));
        let err = dispatcher.print_label(&label).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
    }
}
