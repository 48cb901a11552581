//! # Host Bridge Transport
//!
//! When the client runs embedded inside a native host shell, the shell
//! exposes a message-passing channel and owns the physical printers. This
//! transport serializes tagged envelopes onto that channel.
//!
//! ## Envelope forms
//!
//! ```json
//! {"type": "PRINT_INVOICE", "payload": { ...document... }}
//! {"type": "DOWNLOAD", "payload": {"filename": "...", "dataUrl": "data:image/png;base64,..."}}
//! ```
//!
//! The path is fire-and-forget: the shell acknowledges nothing back, so
//! "message accepted by the channel" is the only observable success. The
//! physical print outcome belongs to the host.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::Transport;
use crate::document::PrintKind;
use crate::error::PrintError;

/// A tagged message for the host shell.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

impl BridgeEnvelope {
    /// A `PRINT_<KIND>` envelope carrying the document as JSON.
    pub fn print(kind: PrintKind, payload: Value) -> Self {
        Self {
            kind: kind.envelope_type().to_string(),
            payload,
        }
    }

    /// A `DOWNLOAD` envelope for raster exports inside the shell, which
    /// has no browser download path of its own.
    pub fn download(filename: &str, data_url: &str) -> Self {
        Self {
            kind: "DOWNLOAD".to_string(),
            payload: serde_json::json!({
                "filename": filename,
                "dataUrl": data_url,
            }),
        }
    }

    /// Serialize to the JSON text the channel carries.
    pub fn to_json(&self) -> Result<Vec<u8>, PrintError> {
        serde_json::to_vec(self)
            .map_err(|e| PrintError::EncodingInvalid(format!("envelope serialization failed: {}", e)))
    }
}

/// # Host Bridge Transport
///
/// Wraps the shell's message channel. "Acquire" only verifies the channel
/// is still open; there is no device to claim.
pub struct BridgeTransport {
    sender: UnboundedSender<String>,
}

impl BridgeTransport {
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Transport for BridgeTransport {
    async fn acquire(&mut self) -> Result<(), PrintError> {
        if self.sender.is_closed() {
            return Err(PrintError::DeviceUnavailable(
                "host bridge channel is closed".to_string(),
            ));
        }
        Ok(())
    }

    async fn transfer(&mut self, bytes: &[u8]) -> Result<(), PrintError> {
        let message = String::from_utf8(bytes.to_vec()).map_err(|e| {
            PrintError::EncodingInvalid(format!("bridge envelope is not UTF-8: {}", e))
        })?;
        self.sender.send(message).map_err(|_| {
            PrintError::TransferFailed("host bridge channel rejected the message".to_string())
        })?;
        debug!(bytes = bytes.len(), "envelope posted to host bridge");
        Ok(())
    }

    async fn release(&mut self) -> Result<(), PrintError> {
        // Nothing held open; the channel belongs to the shell.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tokio::sync::mpsc;

    #[test]
    fn test_print_envelope_shape() {
        let envelope = BridgeEnvelope::print(
            PrintKind::Invoice,
            serde_json::json!({"invoice_number": "INV-1"}),
        );
        let json: Value = serde_json::from_slice(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "PRINT_INVOICE");
        assert_eq!(json["payload"]["invoice_number"], "INV-1");
    }

    #[test]
    fn test_download_envelope_shape() {
        let envelope =
            BridgeEnvelope::download("category_barcode_CF-1.png", "data:image/png;base64,AAAA");
        let json: Value = serde_json::from_slice(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "DOWNLOAD");
        assert_eq!(json["payload"]["filename"], "category_barcode_CF-1.png");
        assert_eq!(json["payload"]["dataUrl"], "data:image/png;base64,AAAA");
    }

    #[tokio::test]
    async fn test_transfer_delivers_to_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = BridgeTransport::new(tx);
        transport.acquire().await.unwrap();
        let envelope = BridgeEnvelope::print(PrintKind::Kot, serde_json::json!({}));
        transport.transfer(&envelope.to_json().unwrap()).await.unwrap();
        transport.release().await.unwrap();

        let received = rx.recv().await.unwrap();
        assert!(received.contains("PRINT_KOT"));
    }

    #[tokio::test]
    async fn test_closed_channel_fails_acquire() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(rx);
        let mut transport = BridgeTransport::new(tx);
        let err = transport.acquire().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
    }

    #[tokio::test]
    async fn test_closed_channel_fails_transfer() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(rx);
        let mut transport = BridgeTransport::new(tx);
        let err = transport.transfer(b"{}").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
    }
}
