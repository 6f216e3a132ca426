//! QR Toolkit - generate and scan QR codes with a bounded local history
//!
//! The library pairs a QR encoder (`qrcode`) and decoder (`rqrr`) with two small,
//! persisted histories: one of generated codes and one of scanned codes. It provides:
//!
//! - Encoding text to a PNG data URL plus a terminal preview
//! - Decoding from image files, clipboard images, or a polled frame source
//! - Newest-first histories capped at 20 entries, saved as full JSON snapshots
//! - Case-insensitive substring search over stored content
//!
//! # Example
//!
//! ```no_run
//! use qr_toolkit::codec::ErrorCorrection;
//! use qr_toolkit::store::FileStore;
//! use qr_toolkit::workbench::Workbench;
//!
//! let mut bench = Workbench::open(FileStore::open("/tmp/qr-toolkit")?);
//! let generation = bench.generate("https://www.example.com", ErrorCorrection::M)?;
//! println!("{}", generation.encoded.preview);
//! println!("{} codes generated", bench.histories().generated.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod capture;
pub mod cli;
pub mod clipboard;
pub mod codec;
pub mod error;
pub mod models;
pub mod parsers;
pub mod store;
pub mod tui;
pub mod utils;
pub mod workbench;

// Re-export commonly used types
pub use models::{Artifact, HistoryEntry, HistoryKind};
pub use store::{FileStore, HISTORY_CAPACITY, Histories, HistoryStore, KeyValueStore, MemoryStore};
pub use utils::paths::format_path_with_tilde;
pub use workbench::Workbench;
