use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use qrcode::render::unicode::Dense1x2;

use super::level::ErrorCorrection;
use crate::error::EncodeError;
use crate::models::Artifact;

/// Minimum edge length of the rendered PNG, in pixels
pub const MIN_IMAGE_SIZE: u32 = 300;

/// Output of a successful encode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedQr {
    /// PNG data URL, stored with the history entry
    pub artifact: Artifact,
    /// Half-block rendering for terminals
    pub preview: String,
    pub level: ErrorCorrection,
}

/// Something that turns text into a QR image
pub trait Encode {
    fn encode(&self, text: &str, level: ErrorCorrection) -> Result<EncodedQr, EncodeError>;
}

/// Reject input that is empty after trimming, before it reaches any encoder
pub fn validate_input(text: &str) -> Result<(), EncodeError> {
    if text.trim().is_empty() {
        return Err(EncodeError::EmptyInput);
    }
    Ok(())
}

/// Encoder backed by the `qrcode` crate
#[derive(Debug, Clone)]
pub struct QrEncoder {
    min_size: u32,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self { min_size: MIN_IMAGE_SIZE }
    }
}

impl QrEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_size(min_size: u32) -> Self {
        Self { min_size }
    }

    fn render_png(&self, code: &QrCode) -> Result<Vec<u8>, EncodeError> {
        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(self.min_size, self.min_size)
            .quiet_zone(true)
            .build();

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| EncodeError::Fault { message: e.to_string() })?;
        Ok(bytes)
    }
}

impl Encode for QrEncoder {
    fn encode(&self, text: &str, level: ErrorCorrection) -> Result<EncodedQr, EncodeError> {
        validate_input(text)?;

        let code = QrCode::with_error_correction_level(text.as_bytes(), level.into())
            .map_err(|e| EncodeError::Fault { message: e.to_string() })?;

        let png = self.render_png(&code)?;
        let preview = code
            .render::<Dense1x2>()
            .dark_color(Dense1x2::Light)
            .light_color(Dense1x2::Dark)
            .build();

        Ok(EncodedQr { artifact: Artifact::from_png(&png), preview, level })
    }
}
