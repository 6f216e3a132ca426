//! Parsers for persisted history snapshots
//!
//! # Error Handling Strategy
//!
//! Snapshot parsing is all-or-nothing: a snapshot with any malformed record is reported
//! as [`SnapshotError::Corrupt`](crate::error::SnapshotError) and the caller decides what
//! to do. The history store fails open on that error (empty history, snapshot left in
//! place, warning logged) so corruption never stops the application.
//!
//! Within a well-formed snapshot, records are normalised to the current layout:
//!
//! - **Artifact field**: `qrCode`, falling back to the older `qrCodeUrl`
//! - **Kind**: taken from the store being loaded, `type` is advisory only
//! - **Ids**: numeric ids from older writers become strings; duplicates keep the first
//! - **Timestamps**: RFC 3339 strings or integer milliseconds

pub mod deserializers;
pub mod snapshot;

pub use snapshot::{parse_snapshot, serialize_snapshot};
