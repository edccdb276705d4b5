use json_storage::{Error, Registry};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn save_writes_pretty_file_and_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("db.json");
    {
        let db = Registry::new().open_map(&path, false).unwrap();
        db.insert("a", 1);
        db.insert("b", json!({"c": 2}));
        db.save().await.unwrap();
    }
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\n\t\"a\": 1,\n\t\"b\": {\"c\":2}\n}"
    );

    let db = Registry::new().open_map(&path, false).unwrap();
    assert_eq!(db.keys(), vec!["a", "b"]);
    assert_eq!(db.get("b"), Some(json!({"c": 2})));
}

#[tokio::test]
async fn changes_stay_in_memory_until_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lazy.json");
    let db = Registry::new().open_map(&path, false).unwrap();
    db.insert("unsaved", true);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

    db.save().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\n\t\"unsaved\": true\n}"
    );
}

#[tokio::test]
async fn list_save_writes_array() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.json");
    let list = Registry::new().open_list(&path, false).unwrap();
    list.extend(vec![json!(1), json!("x"), json!([true])]);
    list.save().await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "[\n\t1,\n\t\"x\",\n\t[true]\n]"
    );
    let reloaded = Registry::new().open_list(&path, false).unwrap();
    assert_eq!(reloaded.to_vec(), list.to_vec());
}

#[tokio::test]
async fn compact_registry_writes_compact_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("compact.json");
    let db = Registry::builder()
        .pretty(false)
        .build()
        .open_map(&path, false)
        .unwrap();
    db.insert("a", json!([1, 2]));
    db.save().await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":[1,2]}");
}

#[tokio::test]
async fn save_while_in_flight_is_dropped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("busy.json");
    let db = Registry::new().open_map(&path, false).unwrap();

    db.insert("a", 1);
    let first = db.save();
    db.insert("b", 2);
    let second = db.save();

    // Resolves at once without writing anything.
    second.await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

    // Only the first save's snapshot reaches the disk.
    first.await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\n\t\"a\": 1\n}"
    );

    // Nothing was queued, but the next save goes through.
    db.save().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\n\t\"a\": 1,\n\t\"b\": 2\n}"
    );
}

#[tokio::test]
async fn in_flight_guard_is_shared_between_handles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.json");
    let registry = Registry::new();
    let one = registry.open_list(&path, false).unwrap();
    let two = registry.open_list(&path, false).unwrap();

    one.push(1);
    let first = one.save();
    two.push(2);
    two.save().await.unwrap();
    first.await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[\n\t1\n]");
}

#[tokio::test]
async fn dropped_save_future_releases_guard() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dropped.json");
    let db = Registry::new().open_map(&path, false).unwrap();

    db.insert("a", 1);
    drop(db.save());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

    db.save().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "{\n\t\"a\": 1\n}"
    );
}

#[tokio::test]
async fn failed_save_reports_error_and_releases_guard() {
    let dir = TempDir::new().unwrap();
    let sub = dir.path().join("sub");
    let path = sub.join("db.json");
    let db = Registry::new().open_map(&path, false).unwrap();
    db.insert("kept", "in memory");

    std::fs::remove_dir_all(&sub).unwrap();
    let err = db.save().await.unwrap_err();
    assert!(matches!(err, Error::Write { .. }), "got {err:?}");
    assert_eq!(db.get("kept"), Some(json!("in memory")));

    std::fs::create_dir_all(&sub).unwrap();
    db.save().await.unwrap();
    assert_eq!(
        std::fs::read_to_string(db.path()).unwrap(),
        "{\n\t\"kept\": \"in memory\"\n}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn autosave_writes_on_a_timer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("auto.json");
    let db = Registry::new().open_map(&path, 50u64).unwrap();
    db.insert("tick", 1);

    let mut saved = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if std::fs::read_to_string(&path).unwrap_or_default().contains("tick") {
            saved = true;
            break;
        }
    }
    assert!(saved, "autosave never wrote the file");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn autosave_default_interval_comes_from_registry() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("auto_default.json");
    let registry = Registry::builder()
        .autosave_interval(Duration::from_millis(50))
        .build();
    let list = registry.open_list(&path, true).unwrap();
    list.push("tock");

    let mut saved = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if std::fs::read_to_string(&path).unwrap_or_default().contains("tock") {
            saved = true;
            break;
        }
    }
    assert!(saved, "autosave never wrote the file");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn autosave_keeps_running_after_a_failed_save() {
    let dir = TempDir::new().unwrap();
    let sub = dir.path().join("sub");
    let path = sub.join("auto.json");
    let db = Registry::new().open_map(&path, 50u64).unwrap();
    let saved_path = db.path().to_path_buf();

    // Ticks in this window fail to write; the timer has to survive them.
    std::fs::remove_dir_all(&sub).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!saved_path.exists());

    std::fs::create_dir_all(&sub).unwrap();
    db.insert("recovered", true);

    let mut saved = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if std::fs::read_to_string(&saved_path)
            .unwrap_or_default()
            .contains("recovered")
        {
            saved = true;
            break;
        }
    }
    assert!(saved, "autosave stopped after a failed write");
}

#[tokio::test]
async fn autosave_does_not_fire_before_first_interval() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("slow.json");
    let db = Registry::new()
        .open_map(&path, Duration::from_secs(3600))
        .unwrap();
    db.insert("pending", 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
}
