//! Record Log Integration Tests
//!
//! Tests for record format, append operations, and replay order.

use runlog::{ArtifactRecord, RecordStatus, RecordStore};
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test]
async fn test_record_append_format() {
    // This test verifies the JSONL format of records
    let run_id = Uuid::new_v4();

    let record = ArtifactRecord::logged(
        run_id,
        "plots",
        Some("plot.png".to_string()),
        2048,
        Some("0123456789ab".to_string()),
    );

    let json = serde_json::to_string(&record).unwrap();
    let parsed: ArtifactRecord = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.run_id, run_id);
    assert_eq!(parsed.artifact_path, "plots");
    assert_eq!(parsed.file_name, Some("plot.png".to_string()));
    assert_eq!(parsed.size_bytes, Some(2048));
    assert_eq!(parsed.status, RecordStatus::Logged);
    assert!(parsed.error.is_none());

    // Absent optional fields are omitted from the line entirely
    let failed = ArtifactRecord::failed(run_id, "plots", None, "boom");
    let json = serde_json::to_string(&failed).unwrap();
    assert!(!json.contains("size_bytes"));
    assert!(!json.contains("content_hash"));
    assert!(json.contains("\"error\":\"boom\""));

    // Verify timestamp is valid ISO 8601
    let timestamp_str = parsed.timestamp.to_rfc3339();
    assert!(timestamp_str.contains("T"));
}

#[tokio::test]
async fn test_replay_preserves_append_order() {
    let temp = TempDir::new().unwrap();
    let run_id = Uuid::new_v4();
    let store = RecordStore::new(temp.path().join("records.jsonl"), run_id);

    for i in 0..4 {
        let record = ArtifactRecord::logged(
            run_id,
            format!("step-{i}"),
            Some(format!("out-{i}.png")),
            100 + i,
            None,
        );
        store.append(&record).await.unwrap();
    }

    let records = store.replay().await.unwrap();
    assert_eq!(records.len(), 4);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.artifact_path, format!("step-{i}"));
        assert_eq!(record.size_bytes, Some(100 + i as u64));
    }
}

#[tokio::test]
async fn test_mixed_statuses_survive_replay() {
    let temp = TempDir::new().unwrap();
    let run_id = Uuid::new_v4();
    let store = RecordStore::new(temp.path().join("records.jsonl"), run_id);

    store
        .append(&ArtifactRecord::logged(
            run_id,
            "plots",
            Some("plot.png".to_string()),
            512,
            Some("deadbeef0123".to_string()),
        ))
        .await
        .unwrap();
    store
        .append(&ArtifactRecord::failed(
            run_id,
            "plots",
            Some("other.png".to_string()),
            "artifact store 'local' failed: IO error: permission denied",
        ))
        .await
        .unwrap();

    let records = store.replay().await.unwrap();
    assert_eq!(records[0].status, RecordStatus::Logged);
    assert_eq!(records[1].status, RecordStatus::Failed);
    assert!(records[1].error.as_deref().unwrap().contains("permission denied"));
}

#[tokio::test]
async fn test_replay_of_fresh_store_is_empty() {
    let temp = TempDir::new().unwrap();
    let store = RecordStore::new(temp.path().join("records.jsonl"), Uuid::new_v4());

    assert!(store.replay().await.unwrap().is_empty());
}
