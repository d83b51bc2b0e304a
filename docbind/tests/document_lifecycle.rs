//! End-to-end document lifecycle tests against the in-memory backend.

use bson::doc;
use docbind::memory::InMemoryStore;
use docbind::prelude::*;

fn store() -> DocumentStore<InMemoryStore> {
    DocumentStore::new(InMemoryStore::new())
}

#[tokio::test]
async fn first_save_inserts_and_assigns_identity() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice", "age": 30 }).unwrap();
    assert!(user.id().is_none());

    user.save().await.unwrap();
    let id = user.id().expect("identity assigned on first save");

    let fetched = users.get_by_id(&id.to_hex()).await.unwrap().unwrap();
    assert_eq!(fetched.fields().get_str("name"), Some("Alice"));
    assert_eq!(fetched.fields().get_i64("age"), Some(30));
}

#[tokio::test]
async fn second_save_writes_only_changed_fields() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice", "age": 30 }).unwrap();
    user.save().await.unwrap();

    user.set("age", 31);
    let changed = user.changed_fields().await;
    assert_eq!(changed, doc! { "age": 31 });

    user.save().await.unwrap();
    assert!(user.is_saved().await);

    let fetched = users
        .get_by_id(&user.id().unwrap().to_hex())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.fields().get_i64("age"), Some(31));
    assert_eq!(fetched.fields().get_str("name"), Some("Alice"));
}

#[tokio::test]
async fn save_without_changes_is_a_no_op() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice" }).unwrap();
    user.save().await.unwrap();
    assert!(user.changed_fields().await.is_empty());

    // Saving again must succeed without touching the record.
    user.save().await.unwrap();
    assert_eq!(users.document_count().await.unwrap(), 1);
}

#[tokio::test]
async fn save_fails_when_record_vanished() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice" }).unwrap();
    user.save().await.unwrap();

    user.delete().await.unwrap();
    user.set("name", "Bob");

    assert!(matches!(
        user.save().await,
        Err(DocBindError::NotFound(_, _))
    ));
}

#[tokio::test]
async fn is_saved_conflates_empty_unsaved_documents() {
    let store = store();
    let users = store.collection("users");

    // A never-saved document with fields is not saved.
    let with_fields = users.create(doc! { "name": "Alice" }).unwrap();
    assert!(!with_fields.is_saved().await);

    // A never-saved document with an empty field map reports saved.
    let empty = users.create(bson::Document::new()).unwrap();
    assert!(empty.is_saved().await);
}

#[tokio::test]
async fn changed_fields_marks_server_absent_fields() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice" }).unwrap();
    user.save().await.unwrap();
    user.delete_field("name").await;

    // The field is gone server-side but still held in memory.
    assert_eq!(user.changed_fields().await, doc! { "name": "Alice" });
}

#[tokio::test]
async fn changed_fields_ignores_numeric_width() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "age": 30_i32 }).unwrap();
    user.save().await.unwrap();

    // Same numeric value at a different width is not a change.
    user.set("age", 30_i64);
    assert!(user.changed_fields().await.is_empty());
}

#[tokio::test]
async fn reload_restores_stored_state() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice", "age": 30 }).unwrap();
    user.save().await.unwrap();

    user.set("age", 99);
    user.set("extra", true);
    user.reload().await.unwrap();

    assert_eq!(user.fields().get_i64("age"), Some(30));
    assert!(!user.fields().contains_key("extra"));
    assert!(!user.fields().contains_key("_id"));
}

#[tokio::test]
async fn reload_requires_a_saved_document() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice" }).unwrap();
    assert!(matches!(
        user.reload().await,
        Err(DocBindError::UnsavedDocument(_))
    ));

    user.save().await.unwrap();
    user.delete().await.unwrap();
    assert!(matches!(
        user.reload().await,
        Err(DocBindError::NotFound(_, _))
    ));
}

#[tokio::test]
async fn delete_removes_record_but_keeps_memory_state() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice" }).unwrap();
    user.save().await.unwrap();
    let id = *user.id().unwrap();

    user.delete().await.unwrap();

    // The record is gone but the in-memory document is untouched.
    assert!(users.get_by_id(&id.to_hex()).await.unwrap().is_none());
    assert_eq!(user.id(), Some(&id));
    assert_eq!(user.fields().get_str("name"), Some("Alice"));
}

#[tokio::test]
async fn delete_requires_a_saved_bound_document() {
    let store = store();
    let users = store.collection("users");

    let unsaved = users.create(doc! { "name": "Alice" }).unwrap();
    assert!(matches!(
        unsaved.delete().await,
        Err(DocBindError::UnsavedDocument(_))
    ));

    let detached: Document<'_, InMemoryStore> = Document::detached(doc! { "name": "Alice" });
    assert!(matches!(
        detached.delete().await,
        Err(DocBindError::CollectionMissing)
    ));
}

#[tokio::test]
async fn delete_field_is_best_effort_and_leaves_memory() {
    let store = store();
    let users = store.collection("users");

    let mut user = users.create(doc! { "name": "Alice", "nick": "Al" }).unwrap();
    user.save().await.unwrap();

    user.delete_field("nick").await;

    let fetched = users
        .get_by_id(&user.id().unwrap().to_hex())
        .await
        .unwrap()
        .unwrap();
    assert!(!fetched.fields().contains_key("nick"));
    assert_eq!(user.fields().get_str("nick"), Some("Al"));

    // Unsaved document: logged, not raised.
    let unsaved = users.create(doc! { "name": "Bob" }).unwrap();
    unsaved.delete_field("name").await;
}

#[tokio::test]
async fn json_export_rewrites_identity_and_timestamps() {
    let store = store();
    let events = store.collection("events");

    let stamp = bson::DateTime::from_millis(1_500_000_500);
    let mut event = events.create(doc! { "kind": "login", "at": stamp }).unwrap();
    event.save().await.unwrap();

    let json = event.to_json_value();
    assert_eq!(json["_id"], serde_json::json!(event.id().unwrap().to_hex()));
    assert_eq!(json["kind"], serde_json::json!("login"));
    assert_eq!(json["at"], serde_json::json!(1_500_000.5));

    let text = event.to_json();
    assert!(text.contains("\"kind\":\"login\""));
}

#[tokio::test]
async fn datetime_fields_round_trip_through_save_and_reload() {
    let store = store();
    let events = store.collection("events");

    let now = chrono::Utc::now();
    let mut event = events
        .create(doc! { "kind": "login", "at": bson::DateTime::from_chrono(now) })
        .unwrap();
    event.save().await.unwrap();
    event.reload().await.unwrap();

    let back = event.fields().get_datetime_utc("at").unwrap();
    // BSON datetimes carry millisecond precision.
    assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    assert!(event.is_saved().await);
}

#[tokio::test]
async fn create_extracts_identity_from_field_map() {
    let store = store();
    let users = store.collection("users");

    let oid = bson::oid::ObjectId::new();

    let from_oid = users.create(doc! { "_id": oid, "name": "Alice" }).unwrap();
    assert_eq!(from_oid.id(), Some(&oid));
    assert!(!from_oid.fields().contains_key("_id"));

    let from_hex = users
        .create(doc! { "_id": oid.to_hex(), "name": "Alice" })
        .unwrap();
    assert_eq!(from_hex.id(), Some(&oid));

    assert!(matches!(
        users.create(doc! { "_id": "garbage", "name": "Alice" }),
        Err(DocBindError::InvalidId(_))
    ));
    assert!(matches!(
        users.create(doc! { "_id": 42, "name": "Alice" }),
        Err(DocBindError::InvalidId(_))
    ));
}
