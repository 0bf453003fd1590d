use notestrip_core::{PersistenceError, StoreController};
use rusqlite::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

fn stepping_clock(start: i64) -> impl Fn() -> i64 + Send {
    let next = AtomicI64::new(start);
    move || next.fetch_add(1_000, Ordering::SeqCst)
}

fn break_note_updates(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER fail_note_updates BEFORE UPDATE OF note ON items
         BEGIN
            SELECT RAISE(ABORT, 'simulated disk failure');
         END;",
    )
    .unwrap();
}

fn repair_note_updates(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch("DROP TRIGGER fail_note_updates;").unwrap();
}

#[test]
fn creates_are_invisible_until_saved() {
    let mut store = StoreController::open_in_memory().unwrap();
    let id = store.create_item();

    assert!(store.item(id).is_some());
    assert!(store.has_changes());
    assert!(store.all_items().unwrap().is_empty());

    let summary = store.save().unwrap();
    assert_eq!(summary.inserted, 1);
    assert!(!store.has_changes());
    assert_eq!(store.all_items().unwrap().len(), 1);
}

#[test]
fn save_count_matches_creates_and_order_is_non_decreasing() {
    let mut store = StoreController::open_in_memory().unwrap();
    for _ in 0..7 {
        store.create_item();
    }
    store.save().unwrap();

    let items = store.all_items().unwrap();
    assert_eq!(items.len(), 7);
    assert!(items
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[test]
fn equal_timestamps_keep_creation_order() {
    let mut store = StoreController::open_in_memory()
        .unwrap()
        .with_clock(|| 1_700_000_000_000_i64);
    let created: Vec<_> = (0..4).map(|_| store.create_item()).collect();
    store.save().unwrap();

    let listed: Vec<_> = store.all_items().unwrap().iter().map(|item| item.id).collect();
    assert_eq!(listed, created);
}

#[test]
fn editing_middle_item_leaves_neighbours_untouched() {
    let mut store = StoreController::open_in_memory()
        .unwrap()
        .with_clock(stepping_clock(1_000));
    let t1 = store.create_item();
    let t2 = store.create_item();
    let t3 = store.create_item();
    store.save().unwrap();

    let ids: Vec<_> = store.all_items().unwrap().iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![t1, t2, t3]);

    store.set_note(t2, "hello").unwrap();
    let summary = store.save().unwrap();
    assert_eq!(summary.edited, 1);

    let items = store.all_items().unwrap();
    assert_eq!(items[0].note, None);
    assert_eq!(items[1].note.as_deref(), Some("hello"));
    assert_eq!(items[2].note, None);
}

#[test]
fn staged_edits_are_not_observed_until_saved() {
    let mut store = StoreController::open_in_memory().unwrap();
    let id = store.create_item();
    store.save().unwrap();

    store.set_note(id, "draft").unwrap();
    assert_eq!(store.item(id).unwrap().note.as_deref(), Some("draft"));
    assert_eq!(store.all_items().unwrap()[0].note, None);
}

#[test]
fn notes_survive_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notestrip.sqlite3");

    let id = {
        let mut store = StoreController::open(&path).unwrap();
        let id = store.create_item();
        store.set_note(id, "remember the crane").unwrap();
        store.save().unwrap();
        id
    };

    let store = StoreController::open(&path).unwrap();
    let items = store.all_items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
    assert_eq!(items[0].note.as_deref(), Some("remember the crane"));
    assert_eq!(store.item(id), Some(&items[0]));
}

#[test]
fn deleted_items_disappear_and_their_ids_stay_reserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notestrip.sqlite3");
    let mut store = StoreController::open(&path).unwrap();

    let doomed = store.create_item();
    let kept = store.create_item();
    store.save().unwrap();

    store.delete(doomed).unwrap();
    assert_eq!(store.all_items().unwrap().len(), 2);
    let summary = store.save().unwrap();
    assert_eq!(summary.deleted, 1);

    let ids: Vec<_> = store.all_items().unwrap().iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![kept]);
    assert!(store.item(doomed).is_none());

    let fresh = store.create_item();
    store.save().unwrap();
    assert_ne!(fresh, doomed);

    let raw = Connection::open(&path).unwrap();
    let tombstones: i64 = raw
        .query_row(
            "SELECT COUNT(*) FROM items WHERE id = ?1 AND is_deleted = 1;",
            [doomed.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tombstones, 1);
}

#[test]
fn deleting_unsaved_item_needs_no_write() {
    let mut store = StoreController::open_in_memory().unwrap();
    let id = store.create_item();
    store.delete(id).unwrap();

    assert!(!store.has_changes());
    assert!(store.save().unwrap().is_empty());
    assert!(store.all_items().unwrap().is_empty());
}

#[test]
fn unknown_keys_are_reported() {
    let mut store = StoreController::open_in_memory().unwrap();
    let stray = uuid::Uuid::new_v4();

    assert!(matches!(
        store.set_note(stray, "x"),
        Err(PersistenceError::UnknownItem(id)) if id == stray
    ));
    assert!(matches!(
        store.delete(stray),
        Err(PersistenceError::UnknownItem(id)) if id == stray
    ));
}

#[test]
fn failed_save_writes_nothing_and_keeps_staged_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notestrip.sqlite3");
    let mut store = StoreController::open(&path)
        .unwrap()
        .with_clock(stepping_clock(10_000));

    let first = store.create_item();
    let second = store.create_item();
    store.save().unwrap();
    let before = store.all_items().unwrap();

    break_note_updates(&path);

    let added = store.create_item();
    store.set_note(first, "edited").unwrap();
    store.delete(second).unwrap();

    let err = store.save().unwrap_err();
    assert!(matches!(err, PersistenceError::ConstraintViolation(_)));
    assert_eq!(store.all_items().unwrap(), before);
    assert!(store.has_changes());
    assert!(store.item(added).is_some());
    assert_eq!(store.item(first).unwrap().note.as_deref(), Some("edited"));

    repair_note_updates(&path);

    let summary = store.save().unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.edited, 1);
    assert_eq!(summary.deleted, 1);
    let ids: Vec<_> = store.all_items().unwrap().iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![first, added]);
}

#[test]
fn discard_changes_reloads_committed_state() {
    let mut store = StoreController::open_in_memory().unwrap();
    let id = store.create_item();
    store.save().unwrap();

    store.set_note(id, "scratch").unwrap();
    store.create_item();
    store.discard_changes().unwrap();

    assert!(!store.has_changes());
    assert_eq!(store.item(id).unwrap().note, None);
    assert_eq!(store.all_items().unwrap().len(), 1);
}

#[test]
fn subscribers_receive_snapshot_after_each_commit() {
    let mut store = StoreController::open_in_memory().unwrap();
    let updates = store.subscribe().unwrap();
    assert!(updates.try_recv().unwrap().is_empty());

    let id = store.create_item();
    assert!(updates.try_recv().is_err());
    store.save().unwrap();
    let snapshot = updates.try_recv().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, id);

    store.save().unwrap();
    assert!(updates.try_recv().is_err());

    drop(updates);
    store.create_item();
    store.save().unwrap();
}

#[test]
fn preview_store_is_seeded() {
    let store = StoreController::open_preview(10).unwrap();
    assert_eq!(store.all_items().unwrap().len(), 10);
    assert!(!store.has_changes());
}
