//! Live-frame scanning.
//!
//! A [`FrameSource`] stands in for a camera: it is opened, polled for frames, and released.
//! [`ImageSequenceSource`] replays frames captured to a directory. [`FrameScanner`] runs the
//! polling loop on a worker thread and hands back a cancellable [`ScanHandle`].

pub mod scanner;
pub mod source;

pub use scanner::{FRAME_INTERVAL, FrameScanner, ScanHandle, ScanOutcome, scan_until};
pub use source::{DeviceGuard, FRAME_EXTENSIONS, FrameRead, FrameSource, ImageSequenceSource};
