use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use tracing::debug;
use walkdir::WalkDir;

use crate::codec::PixelFrame;
use crate::error::CaptureError;
use crate::utils::paths::is_image_path;

/// File extensions treated as frames when reading a frame directory
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Result of asking a source for its next frame
#[derive(Debug)]
pub enum FrameRead {
    Frame(PixelFrame),
    /// No frame available yet; ask again next tick
    NotReady,
    /// The source will never produce another frame
    Ended,
}

/// A device that produces frames for scanning
pub trait FrameSource: Send {
    /// Acquire the device. Refused permission or a missing device is
    /// [`CaptureError::DeviceAccessDenied`].
    fn open(&mut self) -> Result<(), CaptureError>;

    fn next_frame(&mut self) -> Result<FrameRead, CaptureError>;

    /// Release the device. Must be safe to call more than once.
    fn release(&mut self);
}

/// Holds an opened source and releases it when dropped
pub struct DeviceGuard<S: FrameSource> {
    source: S,
}

impl<S: FrameSource> DeviceGuard<S> {
    pub fn acquire(mut source: S) -> Result<Self, CaptureError> {
        source.open()?;
        Ok(Self { source })
    }
}

impl<S: FrameSource> Deref for DeviceGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.source
    }
}

impl<S: FrameSource> DerefMut for DeviceGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: FrameSource> Drop for DeviceGuard<S> {
    fn drop(&mut self) {
        self.source.release();
    }
}

/// Frames captured to a directory, replayed in file-name order
#[derive(Debug)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
    opened: bool,
}

impl ImageSequenceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), pending: VecDeque::new(), opened: false }
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        if !self.dir.is_dir() {
            return Err(CaptureError::DeviceAccessDenied {
                message: format!("{} is not a readable frame directory", self.dir.display()),
            });
        }

        let mut frames = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| CaptureError::DeviceAccessDenied { message: e.to_string() })?;
            if entry.file_type().is_file() && is_image_path(entry.path()) {
                frames.push(entry.into_path());
            }
        }

        debug!(dir = %self.dir.display(), frames = frames.len(), "Frame source opened");
        self.pending = frames.into();
        self.opened = true;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<FrameRead, CaptureError> {
        if !self.opened {
            return Err(CaptureError::DeviceAccessDenied {
                message: "frame source is not open".to_string(),
            });
        }

        let Some(path) = self.pending.pop_front() else {
            return Ok(FrameRead::Ended);
        };

        match PixelFrame::from_path(&path) {
            Ok(frame) => Ok(FrameRead::Frame(frame)),
            Err(e) => {
                // A damaged frame is skipped like a dropped camera frame
                debug!(frame = %path.display(), error = %e, "Skipping unreadable frame");
                Ok(FrameRead::NotReady)
            }
        }
    }

    fn release(&mut self) {
        if self.opened {
            debug!(dir = %self.dir.display(), "Frame source released");
        }
        self.pending.clear();
        self.opened = false;
    }
}
