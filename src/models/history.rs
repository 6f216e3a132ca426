use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::artifact::Artifact;

/// Which producer created an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Generated,
    Scanned,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 2] = [HistoryKind::Generated, HistoryKind::Scanned];

    /// Storage key holding this kind's snapshot
    pub fn storage_key(self) -> &'static str {
        match self {
            HistoryKind::Generated => "qrGenerationHistory",
            HistoryKind::Scanned => "qrScanHistory",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryKind::Generated => "generated",
            HistoryKind::Scanned => "scanned",
        }
    }

    pub fn other(self) -> Self {
        match self {
            HistoryKind::Generated => HistoryKind::Scanned,
            HistoryKind::Scanned => HistoryKind::Generated,
        }
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generated" | "generate" | "gen" => Ok(HistoryKind::Generated),
            "scanned" | "scan" => Ok(HistoryKind::Scanned),
            other => Err(format!("unknown history kind '{}' (expected generated or scanned)", other)),
        }
    }
}

/// One successful encode or decode.
///
/// Entries are immutable once created; the serialized field names match the snapshot
/// layout (`type`, `qrCode`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub content: String,
    #[serde(rename = "qrCode", skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Create a fresh entry stamped with a new id and the current time
    pub fn new(kind: HistoryKind, content: impl Into<String>, artifact: Option<Artifact>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            content: content.into(),
            artifact,
            timestamp: Utc::now(),
        }
    }

    pub fn generated(content: impl Into<String>, artifact: Artifact) -> Self {
        Self::new(HistoryKind::Generated, content, Some(artifact))
    }

    pub fn scanned(content: impl Into<String>) -> Self {
        Self::new(HistoryKind::Scanned, content, None)
    }
}
