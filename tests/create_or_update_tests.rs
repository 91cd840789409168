use scopedb::{
    Column, DataType, HookOutcome, MemoryStore, StoreError, TableSchema, Value, attrs,
};

fn options_store() -> MemoryStore {
    let db = MemoryStore::new();
    db.create_table(TableSchema::new(
        "options",
        vec![
            Column::new("name", DataType::Text).not_null().unique(),
            Column::new("value", DataType::Text),
            Column::new("field", DataType::Text),
        ],
    ))
    .unwrap();
    db
}

#[test]
fn test_updates_existing_match() {
    let db = options_store();
    let original = db
        .collection("options")
        .where_eq("name", "foo")
        .find_or_create(attrs! { "value" => "bar", "field" => "keep" })
        .unwrap();

    let updated = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "value" => "bar2" })
        .unwrap();

    assert_eq!(updated.id(), original.id());
    assert_eq!(updated.get("value").unwrap().as_str(), Some("bar2"));
    // Fields not named in the patch are untouched.
    assert_eq!(updated.get("field").unwrap().as_str(), Some("keep"));
    assert_eq!(db.collection("options").count().unwrap(), 1);
}

#[test]
fn test_creates_when_no_match_exists() {
    let db = options_store();
    db.collection("options")
        .where_eq("name", "foo2")
        .create_or_update(attrs! { "value" => "bar2" })
        .unwrap();

    let record = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "value" => "bar" })
        .unwrap();

    assert_eq!(record.get("name").unwrap().as_str(), Some("foo"));
    assert_eq!(record.get("value").unwrap().as_str(), Some("bar"));
    assert_eq!(db.collection("options").count().unwrap(), 2);
}

#[test]
fn test_empty_patch_skips_attribute_assignment() {
    let db = options_store();
    db.collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "value" => "bar" })
        .unwrap();

    let record = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! {})
        .unwrap();

    // No changes requested: the match comes back exactly as stored.
    assert_eq!(record.get("value").unwrap().as_str(), Some("bar"));
    assert_eq!(db.collection("options").count().unwrap(), 1);
}

#[test]
fn test_empty_patch_with_hook_only_mutation() {
    let db = options_store();
    let first = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update_with(attrs! {}, |r| {
            r.set("field", "foobar").unwrap();
            HookOutcome::Continue
        })
        .unwrap();
    assert_eq!(first.get("field").unwrap().as_str(), Some("foobar"));

    let second = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update_with(attrs! {}, |r| {
            r.set("field", "foobar2").unwrap();
            HookOutcome::Continue
        })
        .unwrap();
    assert_eq!(second.id(), first.id());
    assert_eq!(second.get("field").unwrap().as_str(), Some("foobar2"));
}

#[test]
fn test_hook_runs_for_existing_and_new_targets() {
    let db = options_store();
    let mut seen_persistent = Vec::new();

    db.collection("options")
        .where_eq("name", "foo")
        .create_or_update_with(attrs! { "value" => "bar" }, |r| {
            seen_persistent.push(r.is_persistent());
            HookOutcome::Continue
        })
        .unwrap();
    db.collection("options")
        .where_eq("name", "foo")
        .create_or_update_with(attrs! { "value" => "bar2" }, |r| {
            seen_persistent.push(r.is_persistent());
            HookOutcome::Continue
        })
        .unwrap();

    // First call saw a transient target, second call the persisted match.
    assert_eq!(seen_persistent, vec![false, true]);
}

#[test]
fn test_hook_abort_leaves_stored_state_unchanged() {
    let db = options_store();
    let original = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "value" => "bar" })
        .unwrap();

    let aborted = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update_with(attrs! { "value" => "bar2" }, |_| HookOutcome::AbortSave)
        .unwrap();

    // The in-memory record carries the patch, storage keeps the old state.
    assert_eq!(aborted.get("value").unwrap().as_str(), Some("bar2"));
    let stored = db.collection("options").find(original.id().unwrap()).unwrap().unwrap();
    assert_eq!(stored.get("value").unwrap().as_str(), Some("bar"));
}

#[test]
fn test_initialize_or_update_never_persists() {
    let db = options_store();
    db.collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "value" => "bar" })
        .unwrap();

    let patched = db
        .collection("options")
        .where_eq("name", "foo")
        .initialize_or_update(attrs! { "value" => "bar2" })
        .unwrap();
    assert_eq!(patched.get("value").unwrap().as_str(), Some("bar2"));

    // Storage still holds the previous value.
    let stored = db
        .collection("options")
        .where_eq("name", "foo")
        .resolve()
        .unwrap()
        .unwrap();
    assert_eq!(stored.get("value").unwrap().as_str(), Some("bar"));

    // With no match at all the result is a transient record.
    let transient = db
        .collection("options")
        .where_eq("name", "other")
        .initialize_or_update(attrs! { "value" => "x" })
        .unwrap();
    assert!(transient.is_transient());
    assert_eq!(db.collection("options").count().unwrap(), 1);
}

#[test]
fn test_checked_mode_propagates_validation_failure_on_update() {
    let db = options_store();
    db.collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "value" => "bar" })
        .unwrap();

    let err = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update_checked(attrs! { "name" => Value::Null })
        .unwrap_err();
    assert!(matches!(err, StoreError::ValidationFailure(_)));

    // The failed update left storage untouched.
    let stored = db
        .collection("options")
        .where_eq("name", "foo")
        .resolve()
        .unwrap()
        .unwrap();
    assert_eq!(stored.get("value").unwrap().as_str(), Some("bar"));
}

#[test]
fn test_swallow_mode_keeps_messages_on_failed_update() {
    let db = options_store();
    db.collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "value" => "bar" })
        .unwrap();

    let record = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "name" => Value::Null })
        .unwrap();

    assert!(!record.is_valid());
    assert!(record.errors()[0].contains("cannot be NULL"));
    let stored = db
        .collection("options")
        .where_eq("name", "foo")
        .resolve()
        .unwrap()
        .unwrap();
    assert_eq!(stored.get("name").unwrap().as_str(), Some("foo"));
}

#[test]
fn test_find_then_create_then_update_scenario() {
    let db = options_store();

    let created = db
        .collection("options")
        .where_eq("name", "foo")
        .find_or_create(attrs! { "value" => "bar" })
        .unwrap();
    assert!(created.is_persistent());
    assert_eq!(created.get("value").unwrap().as_str(), Some("bar"));

    let found = db
        .collection("options")
        .where_eq("name", "foo")
        .find_or_create(attrs! { "value" => "bar2" })
        .unwrap();
    assert_eq!(found.id(), created.id());
    assert_eq!(found.get("value").unwrap().as_str(), Some("bar"));

    let updated = db
        .collection("options")
        .where_eq("name", "foo")
        .create_or_update(attrs! { "value" => "bar2" })
        .unwrap();
    assert_eq!(updated.id(), created.id());
    assert_eq!(updated.get("value").unwrap().as_str(), Some("bar2"));
    assert_eq!(db.collection("options").count().unwrap(), 1);
}
