//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use qr_toolkit::HistoryKind;
use qr_toolkit::codec::{Encode, ErrorCorrection, QrEncoder};
use tempfile::TempDir;

/// Builder for test data directories holding history snapshots
pub struct DataDirBuilder {
    temp_dir: TempDir,
}

impl DataDirBuilder {
    /// Create a new builder with an empty data directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write raw snapshot text for `kind`
    pub fn with_snapshot(self, kind: HistoryKind, content: &str) -> Self {
        fs::write(snapshot_path(self.temp_dir.path(), kind), content)
            .expect("Failed to write snapshot");
        self
    }

    /// Write a snapshot built from records, newest first
    pub fn with_records(self, kind: HistoryKind, records: &[RecordBuilder]) -> Self {
        let content =
            format!("[{}]", records.iter().map(RecordBuilder::to_json).collect::<Vec<_>>().join(","));
        self.with_snapshot(kind, &content)
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for DataDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one stored history record
pub struct RecordBuilder {
    id: serde_json::Value,
    kind: Option<String>,
    content: String,
    qr_code: Option<String>,
    qr_code_url: Option<String>,
    timestamp: serde_json::Value,
}

impl RecordBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.into(),
            kind: None,
            content: "Test entry".to_string(),
            qr_code: None,
            qr_code_url: None,
            timestamp: "2025-01-01T00:00:00Z".into(),
        }
    }

    /// Legacy numeric id
    pub fn numeric_id(mut self, id: i64) -> Self {
        self.id = id.into();
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn qr_code(mut self, data_url: &str) -> Self {
        self.qr_code = Some(data_url.to_string());
        self
    }

    /// Artifact under the older field name
    pub fn qr_code_url(mut self, data_url: &str) -> Self {
        self.qr_code_url = Some(data_url.to_string());
        self
    }

    pub fn timestamp(mut self, rfc3339: &str) -> Self {
        self.timestamp = rfc3339.into();
        self
    }

    pub fn timestamp_millis(mut self, millis: i64) -> Self {
        self.timestamp = millis.into();
        self
    }

    pub fn to_json(&self) -> String {
        let mut record = serde_json::Map::new();
        record.insert("id".to_string(), self.id.clone());
        if let Some(kind) = &self.kind {
            record.insert("type".to_string(), kind.clone().into());
        }
        record.insert("content".to_string(), self.content.clone().into());
        if let Some(qr_code) = &self.qr_code {
            record.insert("qrCode".to_string(), qr_code.clone().into());
        }
        if let Some(qr_code_url) = &self.qr_code_url {
            record.insert("qrCodeUrl".to_string(), qr_code_url.clone().into());
        }
        record.insert("timestamp".to_string(), self.timestamp.clone());
        serde_json::Value::Object(record).to_string()
    }
}

/// File that holds `kind`'s snapshot inside a data directory
pub fn snapshot_path(dir: &Path, kind: HistoryKind) -> PathBuf {
    dir.join(format!("{}.json", kind.storage_key()))
}

/// Snapshot text for `kind`, if the key exists
pub fn read_snapshot(dir: &Path, kind: HistoryKind) -> Option<String> {
    fs::read_to_string(snapshot_path(dir, kind)).ok()
}

/// PNG bytes of a QR code holding `text`
pub fn qr_png(text: &str) -> Vec<u8> {
    let encoded = QrEncoder::new().encode(text, ErrorCorrection::M).expect("Failed to encode");
    encoded.artifact.png_bytes().expect("Artifact is not a PNG data URL")
}

/// Write a QR code PNG holding `text` to `path`
pub fn write_qr_png(path: &Path, text: &str) {
    fs::write(path, qr_png(text)).expect("Failed to write QR image");
}

/// A white PNG with no code in it
pub fn write_blank_png(path: &Path) {
    let image = image::GrayImage::from_pixel(64, 64, image::Luma([255u8]));
    image::DynamicImage::ImageLuma8(image)
        .save_with_format(path, image::ImageFormat::Png)
        .expect("Failed to write blank image");
}
