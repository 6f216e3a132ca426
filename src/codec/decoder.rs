use rqrr::PreparedImage;
use tracing::debug;

use super::frame::PixelFrame;
use crate::error::DecodeError;

/// Result of a decode attempt that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Found(String),
    /// No readable symbol in the frame. A normal result, not an error.
    NotFound,
}

impl DecodeOutcome {
    pub fn found(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Found(text) => Some(text),
            DecodeOutcome::NotFound => None,
        }
    }
}

/// Something that finds and reads a QR symbol in pixels
pub trait Decode: Send + Sync {
    fn decode(&self, frame: &PixelFrame) -> Result<DecodeOutcome, DecodeError>;
}

/// Decoder backed by the `rqrr` crate
#[derive(Debug, Clone, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decode for QrDecoder {
    fn decode(&self, frame: &PixelFrame) -> Result<DecodeOutcome, DecodeError> {
        let luma = frame.to_luma();
        let (width, height) = luma.dimensions();

        let mut prepared = PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| luma.get_pixel(x as u32, y as u32)[0],
        );

        let grids = prepared.detect_grids();
        debug!(width, height, grids = grids.len(), "Scanned frame");

        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(DecodeOutcome::Found(content)),
                Err(e) => debug!(error = %e, "Grid detected but not decodable"),
            }
        }

        Ok(DecodeOutcome::NotFound)
    }
}
