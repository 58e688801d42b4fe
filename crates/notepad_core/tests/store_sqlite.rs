use notepad_core::db::open_db_in_memory;
use notepad_core::{
    build_predicate, ChangeKind, ListFilter, Locator, NoteId, NoteValues, NotesStore, Predicate,
    SortOrder, SqliteNotesStore, StoreError,
};
use rusqlite::params;

fn store() -> SqliteNotesStore {
    SqliteNotesStore::new(open_db_in_memory().unwrap())
}

fn pin_modified(store: &SqliteNotesStore, id: NoteId, modified: i64) {
    store
        .connection()
        .execute(
            "UPDATE notes SET modified = ?1 WHERE id = ?2;",
            params![modified, id.to_string()],
        )
        .unwrap();
}

#[test]
fn insert_then_query_returns_full_record() {
    let store = store();
    let id = store
        .insert(
            &Locator::AllNotes,
            &NoteValues::note("Groceries", "milk, eggs")
                .with_category("home")
                .with_color(0x7F00FF00),
        )
        .unwrap();

    let rows = store
        .query(&Locator::Note(id), None, SortOrder::Unordered)
        .unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.id, id);
    assert_eq!(row.title.as_deref(), Some("Groceries"));
    assert_eq!(row.body.as_deref(), Some("milk, eggs"));
    assert_eq!(row.category.as_deref(), Some("home"));
    assert_eq!(row.color, 0x7F00FF00);
    assert!(row.modified_at > 0);
    assert_eq!(row.created_at, row.modified_at);
}

#[test]
fn default_sort_is_most_recent_first() {
    let store = store();
    let older = store
        .insert(&Locator::AllNotes, &NoteValues::note("older", ""))
        .unwrap();
    let newer = store
        .insert(&Locator::AllNotes, &NoteValues::note("newer", ""))
        .unwrap();
    pin_modified(&store, older, 1_000);
    pin_modified(&store, newer, 2_000);

    let rows = store
        .query(&Locator::AllNotes, None, SortOrder::Default)
        .unwrap();
    let ids: Vec<NoteId> = rows.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![newer, older]);
}

#[test]
fn blank_search_equals_unfiltered_set() {
    let store = store();
    for title in ["alpha", "beta", "gamma"] {
        store
            .insert(&Locator::AllNotes, &NoteValues::note(title, "body"))
            .unwrap();
    }

    let all = store
        .query(&Locator::AllNotes, None, SortOrder::Default)
        .unwrap();
    for blank in ["", "   ", "\t\n"] {
        let predicate = build_predicate(&ListFilter::Search(blank.to_string()));
        assert!(predicate.is_none());
        let filtered = store
            .query(&Locator::AllNotes, predicate.as_ref(), SortOrder::Default)
            .unwrap();
        assert_eq!(filtered, all);
    }
}

#[test]
fn search_matches_title_or_body_substrings() {
    let store = store();
    let title_hit = store
        .insert(&Locator::AllNotes, &NoteValues::note("Weekly planning", "agenda"))
        .unwrap();
    let body_hit = store
        .insert(&Locator::AllNotes, &NoteValues::note("Misc", "remember the planning doc"))
        .unwrap();
    store
        .insert(&Locator::AllNotes, &NoteValues::note("Shopping", "bread"))
        .unwrap();

    let predicate = Predicate::search("planning").unwrap();
    let rows = store
        .query(&Locator::AllNotes, Some(&predicate), SortOrder::Default)
        .unwrap();
    let mut ids: Vec<NoteId> = rows.iter().map(|row| row.id).collect();
    ids.sort();
    let mut expected = vec![title_hit, body_hit];
    expected.sort();
    assert_eq!(ids, expected);

    for row in &rows {
        let title = row.title.as_deref().unwrap_or_default();
        let body = row.body.as_deref().unwrap_or_default();
        assert!(title.contains("planning") || body.contains("planning"));
    }

    let partial = Predicate::search("eekly pl").unwrap();
    let rows = store
        .query(&Locator::AllNotes, Some(&partial), SortOrder::Default)
        .unwrap();
    assert!(rows.iter().any(|row| row.id == title_hit));
}

#[test]
fn search_treats_wildcards_literally() {
    let store = store();
    store
        .insert(&Locator::AllNotes, &NoteValues::note("50% off", ""))
        .unwrap();
    store
        .insert(&Locator::AllNotes, &NoteValues::note("500 items", ""))
        .unwrap();

    let predicate = Predicate::search("50%").unwrap();
    let rows = store
        .query(&Locator::AllNotes, Some(&predicate), SortOrder::Default)
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title.as_deref(), Some("50% off"));
}

#[test]
fn update_by_predicate_reports_affected_rows() {
    let store = store();
    for _ in 0..3 {
        store
            .insert(&Locator::AllNotes, &NoteValues::note("w", "").with_category("work"))
            .unwrap();
    }
    store
        .insert(&Locator::AllNotes, &NoteValues::note("h", "").with_category("home"))
        .unwrap();

    let changed = store
        .update(
            &Locator::AllNotes,
            &NoteValues::category_only("office"),
            Some(&Predicate::category_equals("work")),
        )
        .unwrap();
    assert_eq!(changed, 3);

    let office = store
        .query(
            &Locator::AllNotes,
            Some(&Predicate::category_equals("office")),
            SortOrder::Unordered,
        )
        .unwrap();
    assert_eq!(office.len(), 3);
}

#[test]
fn note_locator_limits_delete_to_one_row() {
    let store = store();
    let keep = store
        .insert(&Locator::AllNotes, &NoteValues::note("keep", ""))
        .unwrap();
    let drop_id = store
        .insert(&Locator::AllNotes, &NoteValues::note("drop", ""))
        .unwrap();

    assert_eq!(store.delete(&Locator::Note(drop_id), None).unwrap(), 1);
    assert_eq!(store.delete(&Locator::Note(drop_id), None).unwrap(), 0);

    let rows = store
        .query(&Locator::AllNotes, None, SortOrder::Default)
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, keep);
}

#[test]
fn insert_into_single_note_locator_is_rejected() {
    let store = store();
    let id = store
        .insert(&Locator::AllNotes, &NoteValues::note("x", ""))
        .unwrap();
    let err = store
        .insert(&Locator::Note(id), &NoteValues::note("y", ""))
        .unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedLocator { .. }));

    let err = store
        .update(&Locator::AllNotes, &NoteValues::default(), None)
        .unwrap_err();
    assert!(matches!(err, StoreError::EmptyValues));
}

#[test]
fn null_text_columns_read_back_as_none() {
    let store = store();
    store
        .connection()
        .execute(
            "INSERT INTO notes (id) VALUES ('7d444840-9dc0-11d1-b245-5ffdce74fad2');",
            [],
        )
        .unwrap();

    let rows = store
        .query(&Locator::AllNotes, None, SortOrder::Default)
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, None);
    assert_eq!(rows[0].body, None);
    assert_eq!(rows[0].category, None);
    assert_eq!(rows[0].color, 0);
}

#[test]
fn corrupt_id_is_reported_as_invalid_data() {
    let store = store();
    store
        .connection()
        .execute("INSERT INTO notes (id, title) VALUES ('not-a-uuid', 'x');", [])
        .unwrap();

    let err = store
        .query(&Locator::AllNotes, None, SortOrder::Default)
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn subscribers_see_only_overlapping_writes() {
    let store = store();
    let first = store
        .insert(&Locator::AllNotes, &NoteValues::note("first", ""))
        .unwrap();
    let second = store
        .insert(&Locator::AllNotes, &NoteValues::note("second", ""))
        .unwrap();

    let all = store.subscribe(&Locator::AllNotes).unwrap();
    let only_first = store.subscribe(&Locator::Note(first)).unwrap();

    store
        .update(
            &Locator::Note(second),
            &NoteValues::category_only("x"),
            None,
        )
        .unwrap();
    assert_eq!(all.drain().len(), 1);
    assert!(only_first.drain().is_empty());

    store.delete(&Locator::Note(first), None).unwrap();
    let events = only_first.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::Deleted);
    assert_eq!(events[0].affected, 1);
}

#[test]
fn no_op_writes_do_not_notify() {
    let store = store();
    let feed = store.subscribe(&Locator::AllNotes).unwrap();
    let changed = store
        .update(
            &Locator::AllNotes,
            &NoteValues::category_only("x"),
            Some(&Predicate::category_equals("missing")),
        )
        .unwrap();
    assert_eq!(changed, 0);
    assert!(feed.try_next().is_none());
}

#[test]
fn dropped_subscription_is_pruned_without_error() {
    let store = store();
    let feed = store.subscribe(&Locator::AllNotes).unwrap();
    drop(feed);

    store
        .insert(&Locator::AllNotes, &NoteValues::note("after drop", ""))
        .unwrap();
    let kept = store.subscribe(&Locator::AllNotes).unwrap();
    store
        .insert(&Locator::AllNotes, &NoteValues::note("again", ""))
        .unwrap();
    assert_eq!(kept.drain().len(), 1);
}

#[test]
fn dropped_subscriptions_are_pruned_on_next_subscribe() {
    let store = store();
    for _ in 0..5 {
        let feed = store.subscribe(&Locator::AllNotes).unwrap();
        drop(feed);
    }
    let _live = store.subscribe(&Locator::AllNotes).unwrap();
    assert_eq!(store.subscriber_count(), 1);

    let _second = store.subscribe(&Locator::AllNotes).unwrap();
    assert_eq!(store.subscriber_count(), 2);
}
