use tracing::{debug, info, warn};

use super::backend::KeyValueStore;
use super::filter::{content_contains, filter_entries};
use crate::error::{HistoryError, StorageError};
use crate::models::{HistoryEntry, HistoryKind};
use crate::parsers::{parse_snapshot, serialize_snapshot};

/// Maximum entries retained per logical history
pub const HISTORY_CAPACITY: usize = 20;

/// Bounded, newest-first history of one kind, persisted as a full snapshot under
/// `kind.storage_key()`.
///
/// Every mutation rewrites the whole snapshot. With at most twenty entries that is
/// cheap, and it means the stored value is always a complete, self-consistent list.
#[derive(Debug)]
pub struct HistoryStore<S> {
    kind: HistoryKind,
    backend: S,
    entries: Vec<HistoryEntry>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Open the store and load whatever snapshot is persisted
    pub fn open(kind: HistoryKind, backend: S) -> Self {
        let mut store = Self { kind, backend, entries: Vec::new() };
        store.load();
        store
    }

    /// Re-read the persisted snapshot, replacing the in-memory entries.
    ///
    /// Never fails: a missing, unreadable or corrupt snapshot yields an empty history.
    /// A corrupt snapshot is logged and left in place.
    pub fn load(&mut self) -> &[HistoryEntry] {
        self.entries = read_stored(&self.backend, self.kind).unwrap_or_default();
        &self.entries
    }

    /// Insert `entry` at the front, drop anything past capacity, persist.
    ///
    /// The snapshot is re-read under the backend's writer lock first, so entries appended
    /// by other writers since this store was opened are kept.
    ///
    /// If the write fails the in-memory history still holds the new entry and
    /// [`HistoryError::PersistenceUnavailable`] is returned. An entry whose id is already
    /// present is rejected without being inserted.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let kind = self.kind;
        let key = kind.storage_key();
        let entries = &mut self.entries;
        let fallback = entry.clone();

        let locked = self.backend.with_lock(key, |backend| {
            // Unreadable storage keeps the in-memory view
            if let Some(stored) = read_stored(backend, kind) {
                *entries = stored;
            }
            if entries.iter().any(|existing| existing.id == entry.id) {
                return Err(HistoryError::DuplicateId(entry.id));
            }
            prepend(entries, entry);
            persist(backend, kind, entries)
        });

        locked.unwrap_or_else(|e| {
            warn!(key, error = %e, "Failed to lock history, keeping the entry in memory only");
            if !self.entries.iter().any(|existing| existing.id == fallback.id) {
                prepend(&mut self.entries, fallback);
            }
            Err(HistoryError::PersistenceUnavailable(e))
        })
    }

    /// Empty the history and delete the persisted key
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        let key = self.kind.storage_key();
        self.backend
            .with_lock(key, |backend| backend.remove(key))
            .and_then(|removed| removed)
            .map_err(|e| {
                warn!(key, error = %e, "Failed to remove history snapshot");
                HistoryError::PersistenceUnavailable(e)
            })?;
        info!(key, "History cleared");
        Ok(())
    }

    /// Entries whose content satisfies `predicate`, newest first
    pub fn filter<P>(&self, predicate: P) -> Vec<&HistoryEntry>
    where
        P: Fn(&str) -> bool,
    {
        filter_entries(&self.entries, predicate)
    }

    /// Case-insensitive substring search over content
    pub fn search(&self, term: &str) -> Vec<&HistoryEntry> {
        self.filter(content_contains(term))
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn kind(&self) -> HistoryKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn newest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn oldest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }
}

/// Entries currently stored for `kind`, capped at capacity.
///
/// A missing or corrupt snapshot is an empty history; `None` means storage could not be read.
fn read_stored<S: KeyValueStore>(backend: &S, kind: HistoryKind) -> Option<Vec<HistoryEntry>> {
    let key = kind.storage_key();
    match backend.get(key) {
        Ok(Some(text)) => match parse_snapshot(&text, kind) {
            Ok(mut entries) => {
                if entries.len() > HISTORY_CAPACITY {
                    debug!(key, stored = entries.len(), "Snapshot over capacity, truncating");
                    entries.truncate(HISTORY_CAPACITY);
                }
                Some(entries)
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to parse history, starting empty");
                Some(Vec::new())
            }
        },
        Ok(None) => Some(Vec::new()),
        Err(e) => {
            warn!(key, error = %e, "Failed to read history");
            None
        }
    }
}

fn prepend(entries: &mut Vec<HistoryEntry>, entry: HistoryEntry) {
    entries.insert(0, entry);
    entries.truncate(HISTORY_CAPACITY);
}

fn persist<S: KeyValueStore>(
    backend: &mut S,
    kind: HistoryKind,
    entries: &[HistoryEntry],
) -> Result<(), HistoryError> {
    let key = kind.storage_key();
    let snapshot = serialize_snapshot(entries).map_err(|e| {
        HistoryError::PersistenceUnavailable(StorageError::Unavailable { message: e.to_string() })
    })?;

    match backend.set(key, &snapshot) {
        Ok(()) => {
            debug!(key, entries = entries.len(), bytes = snapshot.len(), "History saved");
            Ok(())
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to save history, keeping it in memory only");
            Err(HistoryError::PersistenceUnavailable(e))
        }
    }
}

/// The two logical histories over one shared backend
#[derive(Debug)]
pub struct Histories<S> {
    pub generated: HistoryStore<S>,
    pub scanned: HistoryStore<S>,
}

impl<S: KeyValueStore + Clone> Histories<S> {
    pub fn open(backend: S) -> Self {
        Self {
            generated: HistoryStore::open(HistoryKind::Generated, backend.clone()),
            scanned: HistoryStore::open(HistoryKind::Scanned, backend),
        }
    }
}

impl<S: KeyValueStore> Histories<S> {
    pub fn for_kind(&self, kind: HistoryKind) -> &HistoryStore<S> {
        match kind {
            HistoryKind::Generated => &self.generated,
            HistoryKind::Scanned => &self.scanned,
        }
    }

    pub fn for_kind_mut(&mut self, kind: HistoryKind) -> &mut HistoryStore<S> {
        match kind {
            HistoryKind::Generated => &mut self.generated,
            HistoryKind::Scanned => &mut self.scanned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Artifact;
    use crate::store::backend::MemoryStore;

    fn scanned_store() -> (HistoryStore<MemoryStore>, MemoryStore) {
        let backend = MemoryStore::new();
        (HistoryStore::open(HistoryKind::Scanned, backend.clone()), backend)
    }

    #[test]
    fn test_open_without_snapshot_is_empty() {
        let (store, backend) = scanned_store();
        assert!(store.is_empty());
        assert!(!backend.contains_key("qrScanHistory"));
    }

    #[test]
    fn test_append_puts_newest_first_and_persists() {
        let (mut store, backend) = scanned_store();
        store.append(HistoryEntry::scanned("first")).unwrap();
        store.append(HistoryEntry::scanned("second")).unwrap();

        assert_eq!(store.newest().map(|e| e.content.as_str()), Some("second"));
        assert_eq!(store.oldest().map(|e| e.content.as_str()), Some("first"));

        let raw = backend.raw("qrScanHistory").unwrap();
        assert!(raw.find("second").unwrap() < raw.find("first").unwrap());
    }

    #[test]
    fn test_capacity_evicts_tail() {
        let (mut store, _) = scanned_store();
        for i in 0..=HISTORY_CAPACITY {
            store.append(HistoryEntry::scanned(format!("item-{}", i))).unwrap();
        }
        assert_eq!(store.len(), HISTORY_CAPACITY);
        assert_eq!(store.newest().unwrap().content, "item-20");
        assert_eq!(store.oldest().unwrap().content, "item-1");
    }

    #[test]
    fn test_duplicate_id_rejected_without_mutation() {
        let (mut store, _) = scanned_store();
        let entry = HistoryEntry::scanned("once");
        store.append(entry.clone()).unwrap();

        let err = store.append(entry.clone()).unwrap_err();
        assert!(matches!(err, HistoryError::DuplicateId(id) if id == entry.id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let (mut store, backend) = scanned_store();
        backend.fail_writes(true);

        let result = store.append(HistoryEntry::scanned("survives"));
        assert!(matches!(result, Err(HistoryError::PersistenceUnavailable(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(backend.raw("qrScanHistory"), None);
    }

    #[test]
    fn test_quota_failure_is_persistence_unavailable() {
        let backend = MemoryStore::new().with_quota(64);
        let mut store = HistoryStore::open(HistoryKind::Generated, backend);

        let big = Artifact::new(format!("data:image/png;base64,{}", "A".repeat(256)));
        let result = store.append(HistoryEntry::generated("big", big));
        assert!(matches!(
            result,
            Err(HistoryError::PersistenceUnavailable(StorageError::QuotaExceeded { .. }))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_keeps_entries_from_other_writers() {
        let backend = MemoryStore::new();
        let mut first = HistoryStore::open(HistoryKind::Scanned, backend.clone());
        let mut second = HistoryStore::open(HistoryKind::Scanned, backend.clone());

        first.append(HistoryEntry::scanned("from first")).unwrap();
        second.append(HistoryEntry::scanned("from second")).unwrap();

        let contents: Vec<&str> = second.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["from second", "from first"]);
        assert_eq!(HistoryStore::open(HistoryKind::Scanned, backend).len(), 2);
    }

    #[test]
    fn test_append_after_external_clear_starts_fresh() {
        let backend = MemoryStore::new();
        let mut writer = HistoryStore::open(HistoryKind::Scanned, backend.clone());
        writer.append(HistoryEntry::scanned("old")).unwrap();

        HistoryStore::open(HistoryKind::Scanned, backend.clone()).clear().unwrap();
        writer.append(HistoryEntry::scanned("new")).unwrap();

        let contents: Vec<&str> = writer.entries().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["new"]);
    }

    #[test]
    fn test_clear_removes_key() {
        let (mut store, backend) = scanned_store();
        store.append(HistoryEntry::scanned("x")).unwrap();
        assert!(backend.contains_key("qrScanHistory"));

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!backend.contains_key("qrScanHistory"));
    }

    #[test]
    fn test_clear_failure_still_empties_memory() {
        let (mut store, backend) = scanned_store();
        store.append(HistoryEntry::scanned("x")).unwrap();
        backend.fail_writes(true);

        assert!(store.clear().is_err());
        assert!(store.is_empty());
        assert!(backend.contains_key("qrScanHistory"));
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty_and_is_left_alone() {
        let backend = MemoryStore::new();
        backend.insert_raw("qrScanHistory", "not json at all");

        let store = HistoryStore::open(HistoryKind::Scanned, backend.clone());
        assert!(store.is_empty());
        assert_eq!(backend.raw("qrScanHistory").as_deref(), Some("not json at all"));
    }

    #[test]
    fn test_read_failure_loads_empty() {
        let backend = MemoryStore::new();
        backend.insert_raw("qrScanHistory", "[]");
        backend.fail_reads(true);

        let store = HistoryStore::open(HistoryKind::Scanned, backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_oversized_snapshot_truncated_on_load() {
        let entries: Vec<_> =
            (0..30).map(|i| HistoryEntry::scanned(format!("e{}", i))).collect();
        let backend = MemoryStore::new();
        backend.insert_raw("qrScanHistory", &serialize_snapshot(&entries).unwrap());

        let store = HistoryStore::open(HistoryKind::Scanned, backend);
        assert_eq!(store.len(), HISTORY_CAPACITY);
        assert_eq!(store.newest().unwrap().content, "e0");
    }

    #[test]
    fn test_histories_are_independent() {
        let backend = MemoryStore::new();
        let mut histories = Histories::open(backend.clone());

        for i in 0..HISTORY_CAPACITY {
            histories
                .generated
                .append(HistoryEntry::generated(format!("g{}", i), Artifact::new("")))
                .unwrap();
        }
        histories.scanned.append(HistoryEntry::scanned("s0")).unwrap();

        assert_eq!(histories.for_kind(HistoryKind::Generated).len(), HISTORY_CAPACITY);
        assert_eq!(histories.for_kind(HistoryKind::Scanned).len(), 1);

        histories.for_kind_mut(HistoryKind::Scanned).clear().unwrap();
        assert!(backend.contains_key("qrGenerationHistory"));
        assert!(!backend.contains_key("qrScanHistory"));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (mut store, _) = scanned_store();
        for content in ["zzz", "ABCx", "abc"] {
            store.append(HistoryEntry::scanned(content)).unwrap();
        }
        let found: Vec<_> = store.search("bc").iter().map(|e| e.content.as_str()).collect();
        assert_eq!(found, vec!["abc", "ABCx"]);
    }
}
