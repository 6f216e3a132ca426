//! Encode/decode operations wired to the history stores.
//!
//! A [`Workbench`] owns both histories plus an encoder and a decoder. Each successful
//! operation records exactly one entry; failures and not-found results record nothing.
//! A history write that fails does not fail the operation: the entry stays in memory and
//! the error comes back as a warning on the result.

use crate::codec::{
    Decode, DecodeOutcome, Encode, EncodedQr, ErrorCorrection, PixelFrame, QrDecoder, QrEncoder,
};
use crate::error::{DecodeError, EncodeError, HistoryError};
use crate::models::{HistoryEntry, HistoryKind};
use crate::store::{Histories, KeyValueStore};

/// An entry that made it into the in-memory history
#[derive(Debug)]
pub struct Recorded {
    pub entry: HistoryEntry,
    /// Set when the entry could not be persisted
    pub warning: Option<HistoryError>,
}

/// Result of a successful encode
#[derive(Debug)]
pub struct Generation {
    pub encoded: EncodedQr,
    pub recorded: Recorded,
}

/// Result of a decode that ran to completion
#[derive(Debug)]
pub enum ScanResult {
    Found(Recorded),
    NotFound,
}

pub struct Workbench<S, E = QrEncoder, D = QrDecoder> {
    histories: Histories<S>,
    encoder: E,
    decoder: D,
}

impl<S: KeyValueStore + Clone> Workbench<S> {
    /// Open both histories on `backend` with the default encoder and decoder
    pub fn open(backend: S) -> Self {
        Self::with_codecs(Histories::open(backend), QrEncoder::new(), QrDecoder::new())
    }
}

impl<S: KeyValueStore, E: Encode, D: Decode> Workbench<S, E, D> {
    pub fn with_codecs(histories: Histories<S>, encoder: E, decoder: D) -> Self {
        Self { histories, encoder, decoder }
    }

    /// Encode `text` and record it in the generation history
    pub fn generate(&mut self, text: &str, level: ErrorCorrection) -> Result<Generation, EncodeError> {
        let encoded = self.encoder.encode(text, level)?;
        let entry = HistoryEntry::generated(text, encoded.artifact.clone());
        let recorded = self.record(entry);
        Ok(Generation { encoded, recorded })
    }

    /// Decode a frame and, if a code is found, record it in the scan history
    pub fn scan_frame(&mut self, frame: &PixelFrame) -> Result<ScanResult, DecodeError> {
        match self.decoder.decode(frame)? {
            DecodeOutcome::Found(text) => Ok(ScanResult::Found(self.record_scan(text))),
            DecodeOutcome::NotFound => Ok(ScanResult::NotFound),
        }
    }

    /// Record text decoded elsewhere (a background scan, a parallel batch)
    pub fn record_scan(&mut self, text: impl Into<String>) -> Recorded {
        self.record(HistoryEntry::scanned(text))
    }

    pub fn histories(&self) -> &Histories<S> {
        &self.histories
    }

    pub fn histories_mut(&mut self) -> &mut Histories<S> {
        &mut self.histories
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    fn record(&mut self, entry: HistoryEntry) -> Recorded {
        let store = self.histories.for_kind_mut(entry.kind);
        let warning = store.append(entry.clone()).err();
        Recorded { entry, warning }
    }

    /// Clear one history, or both when `kind` is `None`
    pub fn clear(&mut self, kind: Option<HistoryKind>) -> Result<(), HistoryError> {
        match kind {
            Some(kind) => self.histories.for_kind_mut(kind).clear(),
            None => {
                let generated = self.histories.generated.clear();
                let scanned = self.histories.scanned.clear();
                generated.and(scanned)
            }
        }
    }
}
