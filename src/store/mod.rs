//! Bounded QR history persisted to a key/value medium.
//!
//! [`HistoryStore`] holds one logical history (generated or scanned): newest first, at
//! most [`HISTORY_CAPACITY`] entries, rewritten as a full snapshot on every change.
//! [`Histories`] pairs the two logical stores over one backend.
//!
//! Loading fails open. Writing reports
//! [`HistoryError::PersistenceUnavailable`](crate::error::HistoryError::PersistenceUnavailable)
//! after the in-memory state has been updated, so a caller can show the result even when
//! it will not survive a restart.

pub mod backend;
pub mod filter;
pub mod history_store;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use filter::{content_contains, filter_entries};
pub use history_store::{HISTORY_CAPACITY, Histories, HistoryStore};
