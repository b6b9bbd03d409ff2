// Storage backend tests
// Author: Gabriel Demetrios Lafis

use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use sparkly_data_engine::{
    data::{Dataset, Row, Value},
    processing::{remove_null_rows, split_column},
    storage::{
        open_storage, CacheStorage, DataStorage, DatasetPatch, FileStorage, MemoryStorage,
        RemoteStorage, StorageError,
    },
    utils::StorageConfig,
};
use tempfile::tempdir;

fn sample(name: &str) -> Dataset {
    let rows = vec![
        vec![("city", Value::from("Lisbon; PT")), ("visits", Value::from("3"))].into_iter().collect::<Row>(),
        vec![("city", Value::Null), ("visits", Value::Null)].into_iter().collect::<Row>(),
        vec![("city", Value::from("Faro")), ("visits", Value::from("1"))].into_iter().collect::<Row>(),
    ];
    Dataset::new(name, vec!["city".to_string(), "visits".to_string()], rows)
}

fn exercise_crud(storage: &dyn DataStorage) {
    let dataset = sample("trips");

    let created = storage.create(&dataset).unwrap();
    assert_eq!(created, dataset);
    assert!(matches!(storage.create(&dataset), Err(StorageError::AlreadyExists(_))));

    assert_eq!(storage.get(&dataset.id).unwrap(), dataset);
    assert_eq!(storage.list().unwrap().len(), 1);

    let renamed = storage.update(&dataset.id, &DatasetPatch::rename("holidays")).unwrap();
    assert_eq!(renamed.name, "holidays");
    assert_eq!(renamed.rows, dataset.rows);
    assert_eq!(storage.get(&dataset.id).unwrap().name, "holidays");

    storage.delete(&dataset.id).unwrap();
    assert!(matches!(storage.get(&dataset.id), Err(StorageError::NotFound(_))));
    assert!(matches!(storage.delete(&dataset.id), Err(StorageError::NotFound(_))));
    assert!(matches!(
        storage.update(&dataset.id, &DatasetPatch::rename("x")),
        Err(StorageError::NotFound(_))
    ));
    assert!(storage.list().unwrap().is_empty());
}

#[test]
fn test_memory_storage_crud() {
    exercise_crud(&MemoryStorage::new());
}

#[test]
fn test_file_storage_crud() {
    let dir = tempdir().unwrap();
    exercise_crud(&FileStorage::new(dir.path()).unwrap());
}

#[test]
fn test_cache_storage_crud() {
    exercise_crud(&CacheStorage::new(MemoryStorage::new()));
}

#[test]
fn test_update_persists_transform_snapshot() {
    let storage = MemoryStorage::new();
    let dataset = storage.create(&sample("trips")).unwrap();

    let removal = remove_null_rows(&dataset);
    let updated = storage.update(&dataset.id, &DatasetPatch::from_snapshot(&removal.dataset)).unwrap();

    assert_eq!(updated.row_count, 2);
    assert_eq!(updated.rows.len(), updated.row_count);
    assert!(updated.cleaned);
    assert_eq!(updated.id, dataset.id);
    assert_eq!(updated.created_at, dataset.created_at);

    let split = split_column(&updated, "city", ";").unwrap();
    let updated = storage.update(&dataset.id, &DatasetPatch::from_snapshot(&split.dataset)).unwrap();
    assert_eq!(updated.columns, vec!["city", "visits", "city_1", "city_2"]);
    assert_eq!(updated.rows[0].get("city_2"), &Value::from("PT"));
}

#[test]
fn test_update_recomputes_row_count_and_keeps_cleaned() {
    let storage = MemoryStorage::new();
    let dataset = storage.create(&sample("trips")).unwrap();

    let patch = DatasetPatch {
        rows: Some(vec![Row::new()]),
        cleaned: Some(true),
        ..Default::default()
    };
    let updated = storage.update(&dataset.id, &patch).unwrap();
    assert_eq!(updated.row_count, 1);
    assert!(updated.cleaned);

    let patch = DatasetPatch {
        cleaned: Some(false),
        ..Default::default()
    };
    assert!(storage.update(&dataset.id, &patch).unwrap().cleaned);
}

#[test]
fn test_update_rejects_duplicate_columns() {
    let storage = MemoryStorage::new();
    let dataset = storage.create(&sample("trips")).unwrap();

    let patch = DatasetPatch {
        columns: Some(vec!["a".to_string(), "a".to_string()]),
        ..Default::default()
    };
    assert!(matches!(storage.update(&dataset.id, &patch), Err(StorageError::DataError(_))));
    assert_eq!(storage.get(&dataset.id).unwrap(), dataset);
}

#[test]
fn test_list_is_ordered_by_creation() {
    let storage = MemoryStorage::new();

    let mut newer = sample("newer");
    newer.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut older = sample("older");
    older.created_at = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();

    storage.create(&newer).unwrap();
    storage.create(&older).unwrap();

    let names: Vec<String> = storage.list().unwrap().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["older", "newer"]);
}

#[test]
fn test_file_storage_survives_reopen() {
    let dir = tempdir().unwrap();
    let dataset = sample("trips");

    FileStorage::new(dir.path()).unwrap().create(&dataset).unwrap();
    assert!(dir.path().join(format!("{}.json", dataset.id)).exists());

    let reopened = FileStorage::new(dir.path()).unwrap();
    assert_eq!(reopened.get(&dataset.id).unwrap(), dataset);
    assert_eq!(reopened.list().unwrap().len(), 1);
}

#[test]
fn test_file_storage_rejects_path_like_ids() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::new(dir.path()).unwrap();

    assert!(matches!(storage.get("../secrets"), Err(StorageError::InvalidId(_))));

    let mut dataset = sample("trips");
    dataset.id = "nested/id".to_string();
    assert!(matches!(storage.create(&dataset), Err(StorageError::InvalidId(_))));
}

#[test]
fn test_file_storage_skips_foreign_files() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("broken.json"), "{").unwrap();

    let storage = FileStorage::new(dir.path()).unwrap();
    storage.create(&sample("trips")).unwrap();

    assert_eq!(storage.list().unwrap().len(), 1);
}

#[test]
fn test_cache_serves_reads_until_invalidated() {
    let cache = CacheStorage::new(MemoryStorage::new());
    let dataset = cache.create(&sample("trips")).unwrap();
    assert_eq!(cache.cached_len().unwrap(), 1);

    // changes made behind the cache's back are not seen
    cache.backend().update(&dataset.id, &DatasetPatch::rename("hidden")).unwrap();
    assert_eq!(cache.get(&dataset.id).unwrap().name, "trips");

    // writes through the cache refresh it
    let updated = cache.update(&dataset.id, &DatasetPatch::rename("visible")).unwrap();
    assert_eq!(updated.name, "visible");
    assert_eq!(cache.get(&dataset.id).unwrap().name, "visible");

    cache.delete(&dataset.id).unwrap();
    assert_eq!(cache.cached_len().unwrap(), 0);
    assert!(matches!(cache.get(&dataset.id), Err(StorageError::NotFound(_))));
}

#[test]
fn test_cache_entries_expire() {
    let cache = CacheStorage::new(MemoryStorage::new()).with_ttl(Duration::from_millis(20));
    let dataset = cache.create(&sample("trips")).unwrap();

    cache.backend().update(&dataset.id, &DatasetPatch::rename("fresh")).unwrap();
    thread::sleep(Duration::from_millis(40));

    assert_eq!(cache.cached_len().unwrap(), 0);
    assert_eq!(cache.get(&dataset.id).unwrap().name, "fresh");

    cache.clear_all().unwrap();
    cache.clear_expired().unwrap();
    assert_eq!(cache.cached_len().unwrap(), 0);
}

#[test]
fn test_open_storage_from_config() {
    let dir = tempdir().unwrap();

    let memory = open_storage(&StorageConfig::default()).unwrap();
    assert!(memory.list().unwrap().is_empty());

    let config = StorageConfig {
        kind: "cache".to_string(),
        path: dir.path().to_string_lossy().to_string(),
        url: None,
        cache_ttl: Some(60),
    };
    let cached = open_storage(&config).unwrap();
    let dataset = cached.create(&sample("trips")).unwrap();
    assert!(dir.path().join(format!("{}.json", dataset.id)).exists());

    let unknown = StorageConfig {
        kind: "s3".to_string(),
        ..StorageConfig::default()
    };
    assert!(open_storage(&unknown).is_err());

    let remote_without_url = StorageConfig {
        kind: "remote".to_string(),
        ..StorageConfig::default()
    };
    assert!(open_storage(&remote_without_url).is_err());
}

#[test]
fn test_remote_storage_validates_ids_before_sending() {
    let remote = RemoteStorage::new("http://127.0.0.1:9").unwrap();

    assert!(matches!(remote.get("../etc/passwd"), Err(StorageError::InvalidId(_))));
    assert!(matches!(remote.delete(""), Err(StorageError::InvalidId(_))));
}
