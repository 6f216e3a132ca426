//! Data models for QR history.
//!
//! - [`HistoryEntry`] - One successful encode or decode, tagged with its [`HistoryKind`]
//! - [`Artifact`] - The rendered QR image kept with generated entries
//!
//! Entries serialize straight into the persisted snapshot layout. Deserialization goes
//! through the record normalisation in [`crate::parsers::snapshot`] instead, since stored
//! snapshots from older versions use different field names.

pub mod artifact;
pub mod history;

pub use artifact::Artifact;
pub use history::{HistoryEntry, HistoryKind};
