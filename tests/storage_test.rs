use chrono::{TimeZone, Utc};
use rusty_calculator::calculator::CompletedCalculation;
use rusty_calculator::config::StorageConfig;
use rusty_calculator::history::{HistoryRecord, HistoryStore};
use rusty_calculator::login::{User, UserStore};
use std::fs;
use tempfile::tempdir;

fn calculation(expression: &str, result: f64) -> CompletedCalculation {
    CompletedCalculation {
        expression: expression.to_string(),
        result,
    }
}

#[test]
fn files_created_with_empty_array() {
    let dir = tempdir().unwrap();
    let config = StorageConfig::in_dir(dir.path().join("data"));

    let users = UserStore::open(&config.users_file);
    let history = HistoryStore::open(&config.history_file);

    assert_eq!(fs::read_to_string(users.path()).unwrap(), "[]");
    assert_eq!(fs::read_to_string(history.path()).unwrap(), "[]");
    assert!(users.all().is_empty());
    assert!(history.list_for("anyone").is_empty());
}

#[test]
fn history_round_trip_after_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 15, 0).unwrap();

    {
        let store = HistoryStore::open(&path);
        store
            .append(HistoryRecord::at("alice", &calculation("5 + 3", 8.0), at))
            .unwrap();
    }

    let reopened = HistoryStore::open(&path);
    let records = reopened.list_for("alice");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].expression, "5 + 3");
    assert_eq!(records[0].result, 8.0);
    assert_eq!(records[0].timestamp, at);
}

#[test]
fn history_file_format() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::open(dir.path().join("history.json"));
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 15, 0).unwrap();
    store
        .append(HistoryRecord::at("alice", &calculation("7 ÷ 2", 3.5), at))
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    let entry = &raw[0];
    assert_eq!(entry["username"], "alice");
    assert_eq!(entry["expression"], "7 ÷ 2");
    assert_eq!(entry["result"], 3.5);
    assert_eq!(entry["timestamp"], "2024-06-01T08:15:00Z");
}

#[test]
fn appends_are_never_rewritten() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::open(dir.path().join("history.json"));
    let first = HistoryRecord::new("alice", &calculation("1 + 1", 2.0));
    store.append(first.clone()).unwrap();

    for i in 0..5 {
        store
            .append(HistoryRecord::new("bob", &calculation(&format!("{} + 0", i), i as f64)))
            .unwrap();
    }

    assert_eq!(store.list_for("alice"), vec![first]);
    assert_eq!(store.list_for("bob").len(), 5);
}

#[test]
fn corrupted_history_reads_as_empty_then_recovers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, "[{\"username\": ").unwrap();

    let store = HistoryStore::open(&path);
    assert!(store.list_for("alice").is_empty());

    store
        .append(HistoryRecord::new("alice", &calculation("2 × 3", 6.0)))
        .unwrap();
    assert_eq!(store.list_for("alice").len(), 1);

    let kept = fs::read_to_string(dir.path().join("history.json.corrupt")).unwrap();
    assert_eq!(kept, "[{\"username\": ");
}

#[test]
fn corrupted_users_kept_aside_on_insert() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.json");
    fs::write(&path, "garbage").unwrap();

    let store = UserStore::open(&path);
    store
        .insert(User {
            username: "alice".to_string(),
            password_hash: "h1".to_string(),
        })
        .unwrap();

    assert!(store.exists("alice"));
    assert_eq!(
        fs::read_to_string(dir.path().join("users.json.corrupt")).unwrap(),
        "garbage"
    );
}

#[test]
fn user_store_shared_between_handles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.json");
    let first = UserStore::open(&path);
    let second = UserStore::open(&path);

    first
        .insert(User {
            username: "alice".to_string(),
            password_hash: "h1".to_string(),
        })
        .unwrap();

    assert!(second.exists("alice"));
    assert!(
        second
            .insert(User {
                username: "alice".to_string(),
                password_hash: "h2".to_string(),
            })
            .is_err()
    );
    assert_eq!(first.find("alice").unwrap().password_hash, "h1");
}
