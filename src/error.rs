//! Error taxonomy for the library.
//!
//! Each concern has its own enum so callers can tell a normal negative result (a frame
//! with no QR code, which is not an error at all) from a real fault. The binary wraps
//! these in `anyhow` at the command boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Encoding failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Input was empty after trimming; nothing was sent to the encoder.
    #[error("Please enter the content to encode")]
    EmptyInput,

    #[error("Failed to generate QR code: {message}")]
    Fault { message: String },
}

/// Decoding failures. "No QR code in the image" is not one of these.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to read image {path}: {message}")]
    UnreadableImage { path: PathBuf, message: String },

    #[error("Invalid pixel frame: {message}")]
    InvalidFrame { message: String },
}

impl DecodeError {
    pub(crate) fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame { message: message.into() }
    }
}

/// Failures of the underlying key/value medium.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage quota exceeded for {key} ({size} bytes, max {quota})")]
    QuotaExceeded { key: String, size: usize, quota: usize },

    #[error("Invalid storage key: {key:?}")]
    InvalidKey { key: String },

    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },
}

/// A persisted snapshot that could not be understood.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Corrupt history snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// History store failures surfaced to callers.
///
/// In both cases the in-memory history has already been updated (or, for a duplicate id,
/// left untouched) by the time the caller sees the error.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History could not be saved: {0}")]
    PersistenceUnavailable(#[source] StorageError),

    #[error("History already contains an entry with id {0}")]
    DuplicateId(String),
}

/// Frame source failures.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Cannot access capture device: {message}")]
    DeviceAccessDenied { message: String },

    #[error("Failed to read frame: {0}")]
    Frame(#[from] DecodeError),

    #[error("Frame scanner thread panicked")]
    ScannerPanicked,
}

/// Artifact payload problems (e.g. a stored data URL that is not a PNG).
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact is not a PNG data URL")]
    NotPngDataUrl,

    #[error("Artifact payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}
