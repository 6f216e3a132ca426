/// Edge case integration tests
///
/// These cover snapshots written by older versions, unusual content, and other
/// out-of-the-ordinary data the store has to load without complaint
mod common;

use chrono::{TimeZone, Utc};
use common::{DataDirBuilder, RecordBuilder};
use qr_toolkit::{Artifact, FileStore, HISTORY_CAPACITY, HistoryEntry, HistoryKind, HistoryStore};

fn open(dir: &std::path::Path, kind: HistoryKind) -> HistoryStore<FileStore> {
    HistoryStore::open(kind, FileStore::open(dir).unwrap())
}

#[test]
fn test_edge_case_legacy_artifact_field() {
    let dir = DataDirBuilder::new()
        .with_records(
            HistoryKind::Scanned,
            &[RecordBuilder::new("1").qr_code_url("data:image/png;base64,AA==")],
        )
        .build();

    let store = open(dir.path(), HistoryKind::Scanned);
    assert_eq!(store.entries()[0].artifact, Some(Artifact::new("data:image/png;base64,AA==")));
}

#[test]
fn test_edge_case_legacy_artifact_rewritten_under_current_name() {
    let dir = DataDirBuilder::new()
        .with_records(
            HistoryKind::Scanned,
            &[RecordBuilder::new("1").qr_code_url("data:image/png;base64,AA==")],
        )
        .build();

    let mut store = open(dir.path(), HistoryKind::Scanned);
    store.append(HistoryEntry::scanned("new")).unwrap();

    let text = common::read_snapshot(dir.path(), HistoryKind::Scanned).unwrap();
    assert!(text.contains("\"qrCode\""));
    assert!(!text.contains("qrCodeUrl"));
}

#[test]
fn test_edge_case_numeric_ids_become_strings() {
    let dir = DataDirBuilder::new()
        .with_records(
            HistoryKind::Generated,
            &[
                RecordBuilder::new("").numeric_id(1_700_000_000_001).content("newer"),
                RecordBuilder::new("").numeric_id(1_700_000_000_000).content("older"),
            ],
        )
        .build();

    let store = open(dir.path(), HistoryKind::Generated);
    assert_eq!(store.entries()[0].id, "1700000000001");
    assert_eq!(store.entries()[1].id, "1700000000000");
}

#[test]
fn test_edge_case_missing_type_uses_store_kind() {
    let dir = DataDirBuilder::new()
        .with_records(HistoryKind::Generated, &[RecordBuilder::new("1").content("untyped")])
        .build();

    let store = open(dir.path(), HistoryKind::Generated);
    assert_eq!(store.entries()[0].kind, HistoryKind::Generated);
}

#[test]
fn test_edge_case_mismatched_type_uses_store_kind() {
    let dir = DataDirBuilder::new()
        .with_records(HistoryKind::Scanned, &[RecordBuilder::new("1").kind("generated")])
        .build();

    let store = open(dir.path(), HistoryKind::Scanned);
    assert_eq!(store.entries()[0].kind, HistoryKind::Scanned);
}

#[test]
fn test_edge_case_millisecond_timestamps() {
    let dir = DataDirBuilder::new()
        .with_records(
            HistoryKind::Scanned,
            &[RecordBuilder::new("1").timestamp_millis(1_735_689_600_000)],
        )
        .build();

    let store = open(dir.path(), HistoryKind::Scanned);
    assert_eq!(store.entries()[0].timestamp, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_edge_case_offset_timestamps_normalised_to_utc() {
    let dir = DataDirBuilder::new()
        .with_records(
            HistoryKind::Scanned,
            &[RecordBuilder::new("1").timestamp("2025-01-01T08:00:00+08:00")],
        )
        .build();

    let store = open(dir.path(), HistoryKind::Scanned);
    assert_eq!(store.entries()[0].timestamp, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn test_edge_case_duplicate_ids_keep_first() {
    let dir = DataDirBuilder::new()
        .with_records(
            HistoryKind::Scanned,
            &[
                RecordBuilder::new("same").content("newest"),
                RecordBuilder::new("other").content("middle"),
                RecordBuilder::new("same").content("stale"),
            ],
        )
        .build();

    let store = open(dir.path(), HistoryKind::Scanned);
    let contents: Vec<&str> = store.entries().iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["newest", "middle"]);
}

#[test]
fn test_edge_case_oversized_snapshot_truncated_on_load() {
    let records: Vec<RecordBuilder> =
        (0..30).map(|i| RecordBuilder::new(&format!("id-{}", i)).content(&format!("item-{}", i))).collect();
    let dir = DataDirBuilder::new().with_records(HistoryKind::Generated, &records).build();

    let store = open(dir.path(), HistoryKind::Generated);
    assert_eq!(store.len(), HISTORY_CAPACITY);
    assert_eq!(store.newest().unwrap().content, "item-0");
    assert_eq!(store.oldest().unwrap().content, "item-19");
}

#[test]
fn test_edge_case_record_without_content_is_corrupt() {
    let dir = DataDirBuilder::new()
        .with_snapshot(HistoryKind::Scanned, r#"[{"id":"1","timestamp":0}]"#)
        .build();

    assert!(open(dir.path(), HistoryKind::Scanned).is_empty());
}

#[test]
fn test_edge_case_truncated_json_at_eof() {
    let dir = DataDirBuilder::new()
        .with_snapshot(HistoryKind::Scanned, r#"[{"id":"1","content":"x","timestamp":0},{"id":"2","con"#)
        .build();

    assert!(open(dir.path(), HistoryKind::Scanned).is_empty());
}

#[test]
fn test_edge_case_empty_snapshot_file() {
    let dir = DataDirBuilder::new().with_snapshot(HistoryKind::Generated, "").build();
    assert!(open(dir.path(), HistoryKind::Generated).is_empty());
}

#[test]
fn test_edge_case_empty_array_snapshot() {
    let dir = DataDirBuilder::new().with_snapshot(HistoryKind::Generated, "[]").build();
    assert!(open(dir.path(), HistoryKind::Generated).is_empty());
}

#[test]
fn test_edge_case_unicode_and_control_content_round_trips() {
    let dir = DataDirBuilder::new().build();
    let odd = [
        "Hello 👋 World 🌍",
        "测试 中文 テスト",
        "مرحبا العالم",
        "\x1b[31mred\x1b[0m",
        "WIFI:S:home;T:WPA;P:\"quoted\\\";;",
        "",
    ];

    let mut store = open(dir.path(), HistoryKind::Scanned);
    for content in odd {
        store.append(HistoryEntry::scanned(content)).unwrap();
    }

    let reopened = open(dir.path(), HistoryKind::Scanned);
    let contents: Vec<&str> = reopened.entries().iter().map(|e| e.content.as_str()).collect();
    let expected: Vec<&str> = odd.iter().rev().copied().collect();
    assert_eq!(contents, expected);
}

#[test]
fn test_edge_case_very_long_content() {
    let dir = DataDirBuilder::new().build();
    let long_text = "a".repeat(100 * 1024);

    let mut store = open(dir.path(), HistoryKind::Scanned);
    store.append(HistoryEntry::scanned(long_text.clone())).unwrap();

    assert_eq!(open(dir.path(), HistoryKind::Scanned).entries()[0].content, long_text);
}

#[test]
fn test_edge_case_unknown_fields_ignored() {
    let dir = DataDirBuilder::new()
        .with_snapshot(
            HistoryKind::Generated,
            r#"[{"id":"1","content":"x","timestamp":0,"favourite":true,"tags":["a"]}]"#,
        )
        .build();

    assert_eq!(open(dir.path(), HistoryKind::Generated).len(), 1);
}
