use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Rendered QR image attached to a history entry, stored as a data URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Artifact(String);

impl Artifact {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// Wrap PNG bytes in a `data:image/png;base64,` URL
    pub fn from_png(bytes: &[u8]) -> Self {
        Self(format!("{}{}", PNG_DATA_URL_PREFIX, BASE64.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the PNG payload back out of the data URL
    pub fn png_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let payload = self.0.strip_prefix(PNG_DATA_URL_PREFIX).ok_or(ArtifactError::NotPngDataUrl)?;
        Ok(BASE64.decode(payload.trim())?)
    }
}
