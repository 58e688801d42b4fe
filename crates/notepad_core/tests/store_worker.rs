use notepad_core::db::open_db_in_memory;
use notepad_core::{
    ChangeKind, Locator, NoteValues, NotesStore, Predicate, SortOrder, SqliteNotesStore,
    StoreError, StoreWorker,
};
use std::thread;

fn spawn_worker() -> StoreWorker {
    StoreWorker::spawn(SqliteNotesStore::new(open_db_in_memory().unwrap())).unwrap()
}

#[test]
fn handle_round_trips_every_operation() {
    let worker = spawn_worker();
    let handle = worker.handle();

    let id = handle
        .insert(&Locator::AllNotes, &NoteValues::note("via worker", "body"))
        .unwrap();
    let changed = handle
        .update(
            &Locator::Note(id),
            &NoteValues::category_only("work"),
            None,
        )
        .unwrap();
    assert_eq!(changed, 1);

    let rows = handle
        .query(
            &Locator::AllNotes,
            Some(&Predicate::category_equals("work")),
            SortOrder::Default,
        )
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);

    assert_eq!(handle.delete(&Locator::Note(id), None).unwrap(), 1);
    assert!(handle
        .query(&Locator::AllNotes, None, SortOrder::Default)
        .unwrap()
        .is_empty());

    worker.shutdown();
}

#[test]
fn store_errors_cross_the_worker_boundary() {
    let worker = spawn_worker();
    let handle = worker.handle();

    let err = handle
        .update(&Locator::AllNotes, &NoteValues::default(), None)
        .unwrap_err();
    assert!(matches!(err, StoreError::EmptyValues));
}

#[test]
fn subscription_created_through_handle_sees_writes() {
    let worker = spawn_worker();
    let handle = worker.handle();
    let feed = handle.subscribe(&Locator::AllNotes).unwrap();

    handle
        .insert(&Locator::AllNotes, &NoteValues::note("a", ""))
        .unwrap();

    // The reply is sent after notify, so the event is already queued.
    let events = feed.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::Inserted);
}

#[test]
fn handles_from_many_threads_are_serialized() {
    let worker = spawn_worker();

    let writers: Vec<_> = (0..4)
        .map(|thread_index| {
            let handle = worker.handle();
            thread::spawn(move || {
                for note_index in 0..10 {
                    handle
                        .insert(
                            &Locator::AllNotes,
                            &NoteValues::note(format!("t{thread_index}-{note_index}"), ""),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let rows = worker
        .handle()
        .query(&Locator::AllNotes, None, SortOrder::Unordered)
        .unwrap();
    assert_eq!(rows.len(), 40);
}

#[test]
fn handle_reports_unavailable_after_shutdown() {
    let worker = spawn_worker();
    let handle = worker.handle();
    worker.shutdown();

    let err = handle
        .query(&Locator::AllNotes, None, SortOrder::Default)
        .unwrap_err();
    assert!(matches!(err, StoreError::WorkerUnavailable));
}
