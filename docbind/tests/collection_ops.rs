//! Collection-level query, bulk, schema, and index tests against the
//! in-memory backend.

use bson::doc;
use docbind::fields::FieldMap;
use docbind::memory::InMemoryStore;
use docbind::prelude::*;

fn store() -> DocumentStore<InMemoryStore> {
    DocumentStore::new(InMemoryStore::new())
}

async fn seed_users<'a>(users: &'a Collection<'a, InMemoryStore>) {
    for (name, age, status) in [
        ("Alice", 30, "active"),
        ("Bob", 25, "inactive"),
        ("Carol", 35, "active"),
    ] {
        let mut user = users
            .create(doc! { "name": name, "age": age, "status": status })
            .unwrap();
        user.save().await.unwrap();
    }
}

#[tokio::test]
async fn find_with_flat_equality_criteria() {
    let store = store();
    let users = store.collection("users");
    seed_users(&users).await;

    let active = users.find(doc! { "status": "active" }).await.unwrap();
    let names: Vec<&str> = active
        .iter()
        .filter_map(|u| u.fields().get_str("name"))
        .collect();
    assert_eq!(names, ["Alice", "Carol"]);

    let one = users
        .find(doc! { "status": "active", "age": 30 })
        .await
        .unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].fields().get_str("name"), Some("Alice"));
}

#[tokio::test]
async fn find_with_raw_nested_filter() {
    let store = store();
    let users = store.collection("users");
    seed_users(&users).await;

    // A single nested mapping passes through as the raw store filter.
    let older = users
        .find(doc! { "query": { "age": { "$gt": 28 } } })
        .await
        .unwrap();
    let names: Vec<&str> = older
        .iter()
        .filter_map(|u| u.fields().get_str("name"))
        .collect();
    assert_eq!(names, ["Alice", "Carol"]);
}

#[tokio::test]
async fn find_in_returns_members_in_store_order() {
    let store = store();
    let users = store.collection("users");
    seed_users(&users).await;

    let found = users.find_in("age", [35, 25]).await.unwrap();
    let names: Vec<&str> = found
        .iter()
        .filter_map(|u| u.fields().get_str("name"))
        .collect();
    assert_eq!(names, ["Bob", "Carol"]);
}

#[tokio::test]
async fn get_by_id_swallows_malformed_and_unknown_ids() {
    let store = store();
    let users = store.collection("users");
    seed_users(&users).await;

    assert!(users.get_by_id("not-a-hex-id").await.unwrap().is_none());
    assert!(
        users
            .get_by_id(&bson::oid::ObjectId::new().to_hex())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn delete_many_and_document_count() {
    let store = store();
    let users = store.collection("users");
    seed_users(&users).await;
    assert_eq!(users.document_count().await.unwrap(), 3);

    users.delete_many(doc! { "status": "active" }).await.unwrap();
    assert_eq!(users.document_count().await.unwrap(), 1);

    users.delete_many(Criteria::all()).await.unwrap();
    assert_eq!(users.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn insert_many_skips_invalid_items() {
    let schema = Schema::new()
        .field("name", FieldSpec::required(FieldType::String))
        .field("age", FieldSpec::optional(FieldType::Int));

    let store = store();
    let users = store.collection_with_schema("users", schema);

    users
        .insert_many(vec![
            FieldMap::from(doc! { "name": "Alice", "age": 30 }),
            // Missing the required name, skipped.
            FieldMap::from(doc! { "age": 40 }),
            FieldMap::from(doc! { "name": "Bob" }),
        ])
        .await;

    assert_eq!(users.document_count().await.unwrap(), 2);
}

#[tokio::test]
async fn schema_failure_leaves_store_untouched() {
    let schema = Schema::new().field("name", FieldSpec::required(FieldType::String));

    let store = store();
    let users = store.collection_with_schema("users", schema);

    let mut bad = users.create(doc! { "name": 42 }).unwrap();
    assert!(matches!(
        bad.save().await,
        Err(DocBindError::Validation(_))
    ));
    assert!(bad.id().is_none());
    assert_eq!(users.document_count().await.unwrap(), 0);

    let mut undeclared = users.create(doc! { "name": "Alice", "nick": "Al" }).unwrap();
    assert!(matches!(
        undeclared.save().await,
        Err(DocBindError::FieldNotInSchema(_))
    ));
    assert_eq!(users.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn schema_validates_partial_updates_too() {
    let schema = Schema::new()
        .field("name", FieldSpec::required(FieldType::String))
        .field("age", FieldSpec::optional(FieldType::Int));

    let store = store();
    let users = store.collection_with_schema("users", schema);

    let mut user = users.create(doc! { "name": "Alice", "age": 30 }).unwrap();
    user.save().await.unwrap();

    user.set("age", "thirty-one");
    assert!(matches!(
        user.save().await,
        Err(DocBindError::Validation(_))
    ));

    user.reload().await.unwrap();
    assert_eq!(user.fields().get_i64("age"), Some(30));
}

#[tokio::test]
async fn create_index_uses_default_name() {
    let store = store();
    let users = store.collection("users");

    users
        .create_index(&["name", "age"], IndexOrder::Ascending, false, None)
        .await
        .unwrap();
    users
        .create_index(&["age"], IndexOrder::Descending, true, Some("age_unique"))
        .await
        .unwrap();

    assert_eq!(
        store.backend().index_names("users").await,
        ["name_age_asc", "age_unique"]
    );

    assert!(matches!(
        users
            .create_index(&[], IndexOrder::Ascending, false, None)
            .await,
        Err(DocBindError::InvalidIndex(_))
    ));
}

#[tokio::test]
async fn query_results_support_list_helpers() {
    let store = store();
    let users = store.collection("users");
    seed_users(&users).await;

    let mut all = users.find(Criteria::all()).await.unwrap();
    assert_eq!(all.first_or_none().unwrap().fields().get_str("name"), Some("Alice"));
    assert_eq!(all.last_or_none().unwrap().fields().get_str("name"), Some("Carol"));

    let ages = all.map(|u| u.fields().get_i64("age").unwrap_or(0));
    assert_eq!(ages.reduce(|acc, age| acc + age).unwrap(), 90);

    let groups = all.group_by(|u| u.fields().get_str("status").unwrap_or("").to_string());
    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, ["active", "inactive"]);
    assert_eq!(groups["active"].len(), 2);

    all.sort_by_key(|u| u.fields().get_i64("age").unwrap_or(0), true);
    assert_eq!(all[0].fields().get_str("name"), Some("Carol"));

    assert!(all.random().is_ok());
}

#[tokio::test]
async fn full_lifecycle_scenario() {
    let store = store();
    let users = store.collection("users");

    let before = users.document_count().await.unwrap();

    let mut user = users.create(doc! { "name": "Alice", "age": 30 }).unwrap();
    user.save().await.unwrap();
    let id = user.id().expect("identity assigned").to_hex();
    assert_eq!(users.document_count().await.unwrap(), before + 1);

    user.set("age", 31);
    user.save().await.unwrap();

    let stored = users.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.fields().get_i64("age"), Some(31));
    assert_eq!(stored.fields().get_str("name"), Some("Alice"));

    user.delete().await.unwrap();
    assert_eq!(users.document_count().await.unwrap(), before);
    assert!(users.get_by_id(&id).await.unwrap().is_none());
}
