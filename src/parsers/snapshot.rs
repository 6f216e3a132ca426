use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::error::SnapshotError;
use crate::models::{Artifact, HistoryEntry, HistoryKind};

/// A record as found in a persisted snapshot, before normalisation.
///
/// Two artifact field names exist in the wild: `qrCode` (current) and `qrCodeUrl`
/// (older scan-history writers). `type` is missing from records written before
/// the two histories shared a format.
#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(deserialize_with = "super::deserializers::deserialize_entry_id")]
    id: String,
    #[serde(rename = "type", default)]
    kind: Option<HistoryKind>,
    content: String,
    #[serde(rename = "qrCode", default)]
    qr_code: Option<Artifact>,
    #[serde(rename = "qrCodeUrl", default)]
    qr_code_url: Option<Artifact>,
    #[serde(deserialize_with = "super::deserializers::deserialize_timestamp")]
    timestamp: DateTime<Utc>,
}

impl StoredRecord {
    fn normalise(self, store_kind: HistoryKind) -> HistoryEntry {
        if let Some(kind) = self.kind
            && kind != store_kind
        {
            warn!(id = %self.id, record_kind = %kind, store_kind = %store_kind, "Record kind does not match its store, keeping store kind");
        }

        HistoryEntry {
            id: self.id,
            kind: store_kind,
            content: self.content,
            // `qrCode` wins whenever it is present, even if empty
            artifact: self.qr_code.or(self.qr_code_url),
            timestamp: self.timestamp,
        }
    }
}

/// Parse a persisted snapshot into entries for the store of `kind`.
///
/// The whole snapshot is rejected if any record fails to parse. Records are returned in
/// stored order; when two records share an id the first (newest) one is kept.
pub fn parse_snapshot(text: &str, kind: HistoryKind) -> Result<Vec<HistoryEntry>, SnapshotError> {
    let records: Vec<StoredRecord> = serde_json::from_str(text)?;

    let mut seen = HashSet::with_capacity(records.len());
    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id.clone()) {
            warn!(id = %record.id, key = kind.storage_key(), "Dropping history record with duplicate id");
            continue;
        }
        entries.push(record.normalise(kind));
    }

    Ok(entries)
}

/// Serialize entries as a full snapshot
pub fn serialize_snapshot(entries: &[HistoryEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string(entries)
}
