use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use image::{DynamicImage, GrayImage, RgbaImage};

use crate::error::DecodeError;

/// Largest image file accepted for decoding (20MB)
pub const MAX_IMAGE_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// Raw RGBA8 pixels with their dimensions, as handed to the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelFrame {
    /// Wrap RGBA8 bytes, checking the buffer matches `width * height * 4`
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::invalid_frame(format!(
                "frame has no pixels ({}x{})",
                width, height
            )));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| DecodeError::invalid_frame("frame dimensions overflow"))?;
        if rgba.len() != expected {
            return Err(DecodeError::invalid_frame(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                rgba.len()
            )));
        }

        Ok(Self { width, height, rgba })
    }

    /// Decode an encoded image (PNG, JPEG, GIF) held in memory
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, DecodeError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::invalid_frame(format!("not a readable image: {}", e)))?;
        Ok(Self::from_image(image))
    }

    /// Read and decode an image file
    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let unreadable =
            |message: String| DecodeError::UnreadableImage { path: path.to_path_buf(), message };

        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let size = file.metadata().map_err(|e| unreadable(e.to_string()))?.len();
        if size > MAX_IMAGE_FILE_BYTES {
            return Err(unreadable(format!(
                "file too large ({} bytes, max {})",
                size, MAX_IMAGE_FILE_BYTES
            )));
        }

        let mut bytes = Vec::with_capacity(size as usize);
        BufReader::new(file).read_to_end(&mut bytes).map_err(|e| unreadable(e.to_string()))?;

        let image = image::load_from_memory(&bytes).map_err(|e| unreadable(e.to_string()))?;
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        Self { width, height, rgba: rgba.into_raw() }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Greyscale copy used for symbol detection
    pub fn to_luma(&self) -> GrayImage {
        // Dimensions were validated on construction
        match RgbaImage::from_raw(self.width, self.height, self.rgba.clone()) {
            Some(rgba) => DynamicImage::ImageRgba8(rgba).into_luma8(),
            None => GrayImage::new(self.width, self.height),
        }
    }
}
