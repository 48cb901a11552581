//! # Network Printer Transport
//!
//! Backend-mediated path: the local backend owns the socket to the
//! printer, the client only asks it to verify reachability before a job
//! is dispatched. The probe POSTs the printer's interface address and the
//! backend answers with a connectivity verdict.
//!
//! The probe is advisory. A passing probe does not reserve the printer;
//! the backend performs the actual byte delivery out of band.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Transport;
use crate::error::PrintError;

/// Probe deadline. Thermal printers on a busy kitchen LAN answer well
/// inside this; anything slower is treated as unreachable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Payload delivery deadline. Raster jobs run to hundreds of kilobytes
/// and the backend relays them to the printer before answering, so this
/// is deliberately much looser than the probe.
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);

/// Probe request body.
#[derive(Debug, Serialize)]
pub struct ProbeRequest<'a> {
    #[serde(rename = "printerInterface")]
    pub printer_interface: &'a str,
}

/// Backend verdict on printer reachability.
#[derive(Debug, Deserialize)]
pub struct ProbeResponse {
    pub connected: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// # Network Printer Transport
///
/// Talks to the backend's printer endpoint. `acquire` runs the
/// reachability probe; `transfer` hands the payload to the backend for
/// delivery to the printer's interface address.
pub struct NetworkTransport {
    client: Client,
    endpoint: String,
    interface_address: String,
}

impl NetworkTransport {
    /// Transport for a printer at `interface_address`, probed and fed
    /// through the backend at `endpoint`.
    pub fn new(endpoint: impl Into<String>, interface_address: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            interface_address: interface_address.into(),
        }
    }

    /// Ask the backend whether the printer answers at its interface
    /// address.
    pub async fn probe(&self) -> Result<ProbeResponse, PrintError> {
        let request = ProbeRequest {
            printer_interface: &self.interface_address,
        };
        debug!(interface = %self.interface_address, "probing network printer");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(PROBE_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest)?;

        if !response.status().is_success() {
            return Err(PrintError::ProbeFailed(format!(
                "printer probe returned HTTP {}",
                response.status()
            )));
        }

        let verdict: ProbeResponse = response
            .json()
            .await
            .map_err(|e| PrintError::ProbeFailed(format!("malformed probe response: {}", e)))?;
        Ok(verdict)
    }
}

#[async_trait]
impl Transport for NetworkTransport {
    async fn acquire(&mut self) -> Result<(), PrintError> {
        let verdict = self.probe().await?;
        if !verdict.connected {
            return Err(PrintError::ProbeFailed(match verdict.error {
                Some(msg) => format!("printer not reachable: {}", msg),
                None => format!("printer not reachable at {}", self.interface_address),
            }));
        }
        Ok(())
    }

    async fn transfer(&mut self, bytes: &[u8]) -> Result<(), PrintError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(TRANSFER_TIMEOUT)
            .header("content-type", "application/octet-stream")
            .query(&[("printerInterface", self.interface_address.as_str())])
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(map_reqwest)?;

        if !response.status().is_success() {
            return Err(PrintError::TransferFailed(format!(
                "backend rejected print payload: HTTP {}",
                response.status()
            )));
        }
        debug!(bytes = bytes.len(), "payload handed to backend");
        Ok(())
    }

    async fn release(&mut self) -> Result<(), PrintError> {
        // The backend owns the socket; there is nothing to release here.
        Ok(())
    }
}

fn map_reqwest(e: reqwest::Error) -> PrintError {
    if e.is_timeout() {
        PrintError::ProbeTimeout(format!("printer probe timed out: {}", e))
    } else {
        PrintError::ProbeFailed(format!("printer probe failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_request_field_name() {
        let body = serde_json::to_value(ProbeRequest {
            printer_interface: "tcp://192.168.1.87:9100",
        })
        .unwrap();
        assert_eq!(body["printerInterface"], "tcp://192.168.1.87:9100");
    }

    #[test]
    fn test_probe_response_parses_without_error() {
        let verdict: ProbeResponse = serde_json::from_str(r#"{"connected": true}"#).unwrap();
        assert!(verdict.connected);
        assert!(verdict.error.is_none());
    }

    #[test]
    fn test_probe_response_parses_with_error() {
        let verdict: ProbeResponse =
            serde_json::from_str(r#"{"connected": false, "error": "connection refused"}"#)
                .unwrap();
        assert!(!verdict.connected);
        assert_eq!(verdict.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_payload_deadline_is_looser_than_probe_deadline() {
        // A receipt or raster payload must never be cut off by the
        // short reachability-check deadline.
        assert!(TRANSFER_TIMEOUT > PROBE_TIMEOUT);
        assert!(TRANSFER_TIMEOUT >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_release_is_always_ok() {
        let mut transport = NetworkTransport::new("http://localhost:0/probe", "usb:/dev/usb/lp0");
        assert!(transport.release().await.is_ok());
    }
}
