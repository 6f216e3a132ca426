//! Cancellable frame-polling scan.
//!
//! [`FrameScanner::start`] spawns a worker that acquires the source, then on every tick
//! takes one frame and tries one decode. The loop ends when a code is found, the handle
//! is cancelled (or dropped), or the source ends or fails. The source is released on
//! every one of those paths by the [`DeviceGuard`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use super::source::{DeviceGuard, FrameRead, FrameSource};
use crate::codec::{Decode, DecodeOutcome};
use crate::error::CaptureError;

/// Delay between polls, roughly one display frame
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How a scan ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Found(String),
    Cancelled,
    SourceEnded,
}

/// Poll `source` until a code is found, `cancel` is set, or the source ends.
///
/// Runs on the calling thread; [`FrameScanner::start`] wraps it in a worker.
pub fn scan_until<S, D>(
    source: S,
    decoder: &D,
    cancel: &AtomicBool,
    interval: Duration,
) -> Result<ScanOutcome, CaptureError>
where
    S: FrameSource,
    D: Decode + ?Sized,
{
    let mut device = DeviceGuard::acquire(source)?;
    let mut ticks: u64 = 0;

    loop {
        if cancel.load(Ordering::SeqCst) {
            debug!(ticks, "Scan cancelled");
            return Ok(ScanOutcome::Cancelled);
        }

        match device.next_frame()? {
            FrameRead::Frame(frame) => match decoder.decode(&frame) {
                Ok(DecodeOutcome::Found(text)) => {
                    debug!(ticks, "Code found");
                    return Ok(ScanOutcome::Found(text));
                }
                Ok(DecodeOutcome::NotFound) => {}
                Err(e) => debug!(ticks, error = %e, "Frame could not be decoded"),
            },
            FrameRead::NotReady => {}
            FrameRead::Ended => return Ok(ScanOutcome::SourceEnded),
        }

        ticks += 1;
        thread::sleep(interval);
    }
}

/// Starts background scans with a shared decoder
#[derive(Debug, Clone)]
pub struct FrameScanner<D> {
    decoder: Arc<D>,
    interval: Duration,
}

impl<D: Decode + 'static> FrameScanner<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder: Arc::new(decoder), interval: FRAME_INTERVAL }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Begin polling `source` on a worker thread
    pub fn start<S: FrameSource + 'static>(&self, source: S) -> ScanHandle {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let decoder = Arc::clone(&self.decoder);
        let interval = self.interval;

        let worker = thread::spawn(move || scan_until(source, decoder.as_ref(), &worker_cancel, interval));

        ScanHandle { cancel, worker: Some(worker) }
    }
}

/// Handle to a running scan. Dropping it cancels the scan and waits for the worker.
#[derive(Debug)]
pub struct ScanHandle {
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<ScanOutcome, CaptureError>>>,
}

impl ScanHandle {
    /// Ask the scan to stop at its next tick
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(|worker| worker.is_finished())
    }

    /// Block until the scan ends
    pub fn wait(mut self) -> Result<ScanOutcome, CaptureError> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| CaptureError::ScannerPanicked)?,
            None => Ok(ScanOutcome::Cancelled),
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.cancel();
            let _ = worker.join();
        }
    }
}
