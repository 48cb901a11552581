//! # Error Types
//!
//! This module defines error types used throughout the recibo library.
//!
//! The UI layer needs to distinguish "ask the user to reconnect the
//! printer" from "the document data was invalid", so every error carries a
//! stable [`ErrorKind`] alongside its human-readable message. Transport and
//! encoding errors propagate verbatim; nothing is collapsed into a generic
//! "print failed".

use thiserror::Error;

/// Stable error classification, independent of the message text.
///
/// Mirrors the variants of [`PrintError`] one-to-one so callers can match
/// on kind without destructuring message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User declined a device access prompt (or the OS did).
    PermissionDenied,
    /// No matching device was found or it disappeared mid-setup.
    DeviceUnavailable,
    /// I/O error while writing to an acquired device.
    TransferFailed,
    /// Malformed input: empty barcode value, zero quantity, unencodable text.
    EncodingInvalid,
    /// The network probe did not answer within its deadline.
    ProbeTimeout,
    /// The network probe answered "not connected" or failed outright.
    ProbeFailed,
    /// Another dispatch is already in flight on this orchestrator.
    Busy,
}

/// Main error type for recibo operations
#[derive(Debug, Error)]
pub enum PrintError {
    /// Device access was declined
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// No matching printer device found
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// I/O failure mid-write
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Input cannot be encoded (rejected before any device is touched)
    #[error("invalid input: {0}")]
    EncodingInvalid(String),

    /// Network probe exceeded its deadline
    #[error("printer probe timed out: {0}")]
    ProbeTimeout(String),

    /// Network probe reported failure
    #[error("printer probe failed: {0}")]
    ProbeFailed(String),

    /// Re-entrant submission while a dispatch is in flight
    #[error("a print dispatch is already in progress")]
    Busy,
}

impl PrintError {
    /// Classify this error without touching its message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrintError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            PrintError::DeviceUnavailable(_) => ErrorKind::DeviceUnavailable,
            PrintError::TransferFailed(_) => ErrorKind::TransferFailed,
            PrintError::EncodingInvalid(_) => ErrorKind::EncodingInvalid,
            PrintError::ProbeTimeout(_) => ErrorKind::ProbeTimeout,
            PrintError::ProbeFailed(_) => ErrorKind::ProbeFailed,
            PrintError::Busy => ErrorKind::Busy,
        }
    }
}

impl From<serde_json::Error> for PrintError {
    fn from(e: serde_json::Error) -> Self {
        PrintError::EncodingInvalid(format!("payload serialization failed: {}", e))
    }
}
