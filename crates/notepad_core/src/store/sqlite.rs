//! SQLite-backed notes store.
//!
//! # Invariants
//! - Only the `notes` table is touched; migrations must already be applied.
//! - Bound values are always positional `?` in SQL text order.
//! - `modified` is set from the wall clock on every insert and update.

use super::{
    ChangeEvent, ChangeKind, ChangeSubscription, NotesStore, StoreError, StoreResult,
};
use crate::model::locator::Locator;
use crate::model::note::{NoteId, NoteRecord, NoteValues, DEFAULT_COLOR};
use crate::query::{Predicate, SortOrder};
use chrono::Utc;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::cell::RefCell;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Weak};
use std::time::Instant;
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    note,
    created,
    modified,
    color,
    category
FROM notes";

struct Subscriber {
    locator: Locator,
    sender: Sender<ChangeEvent>,
    /// Dead once the matching [`ChangeSubscription`] is dropped.
    alive: Weak<()>,
}

impl Subscriber {
    fn is_alive(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

/// Notes store over a migrated SQLite connection.
pub struct SqliteNotesStore {
    conn: Connection,
    subscribers: RefCell<Vec<Subscriber>>,
}

impl SqliteNotesStore {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Gives direct access to the connection, mainly for tests that need to
    /// pin timestamps.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of live subscriptions.
    ///
    /// Dropped ones may linger in the registry until the next subscribe or
    /// write, but are never counted.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|subscriber| subscriber.is_alive())
            .count()
    }

    fn notify(&self, locator: Locator, kind: ChangeKind, affected: usize) {
        if affected == 0 {
            return;
        }

        let event = ChangeEvent {
            locator,
            kind,
            affected,
        };
        self.subscribers.borrow_mut().retain(|subscriber| {
            if !subscriber.is_alive() {
                return false;
            }
            if !subscriber.locator.overlaps(&locator) {
                return true;
            }
            subscriber.sender.send(event.clone()).is_ok()
        });
    }
}

impl NotesStore for SqliteNotesStore {
    fn query(
        &self,
        locator: &Locator,
        predicate: Option<&Predicate>,
        sort: SortOrder,
    ) -> StoreResult<Vec<NoteRecord>> {
        let started_at = Instant::now();
        let mut sql = String::from(NOTE_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(scoped) = scoped_predicate(locator, predicate) {
            sql.push_str(" WHERE ");
            sql.push_str(scoped.expression());
            bind_values.extend(scoped.args().iter().cloned().map(Value::Text));
        }

        if let Some(order) = sort.as_sql() {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        debug!(
            "event=store_query module=store status=ok locator={} filtered={} rows={} duration_ms={}",
            locator,
            predicate.is_some(),
            notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(notes)
    }

    fn insert(&self, locator: &Locator, values: &NoteValues) -> StoreResult<NoteId> {
        if *locator != Locator::AllNotes {
            return Err(StoreError::UnsupportedLocator {
                operation: "insert",
                locator: *locator,
            });
        }

        let id = Uuid::new_v4();
        let now = now_millis();
        self.conn.execute(
            "INSERT INTO notes (id, title, note, created, modified, color, category)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6);",
            rusqlite::params![
                id.to_string(),
                values.title.as_deref(),
                values.body.as_deref(),
                now,
                values.color.unwrap_or(DEFAULT_COLOR),
                values.category.as_deref(),
            ],
        )?;

        debug!("event=store_insert module=store status=ok id={id}");
        self.notify(Locator::Note(id), ChangeKind::Inserted, 1);
        Ok(id)
    }

    fn update(
        &self,
        locator: &Locator,
        values: &NoteValues,
        predicate: Option<&Predicate>,
    ) -> StoreResult<usize> {
        if values.is_empty() {
            return Err(StoreError::EmptyValues);
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(title) = values.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(body) = values.body.as_ref() {
            assignments.push("note = ?");
            bind_values.push(Value::Text(body.clone()));
        }
        if let Some(color) = values.color {
            assignments.push("color = ?");
            bind_values.push(Value::Integer(i64::from(color)));
        }
        if let Some(category) = values.category.as_ref() {
            assignments.push("category = ?");
            bind_values.push(Value::Text(category.clone()));
        }
        assignments.push("modified = ?");
        bind_values.push(Value::Integer(now_millis()));

        let mut sql = format!("UPDATE notes SET {}", assignments.join(", "));
        if let Some(scoped) = scoped_predicate(locator, predicate) {
            sql.push_str(" WHERE ");
            sql.push_str(scoped.expression());
            bind_values.extend(scoped.args().iter().cloned().map(Value::Text));
        }

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        debug!("event=store_update module=store status=ok locator={locator} affected={changed}");
        self.notify(*locator, ChangeKind::Updated, changed);
        Ok(changed)
    }

    fn delete(&self, locator: &Locator, predicate: Option<&Predicate>) -> StoreResult<usize> {
        let mut sql = String::from("DELETE FROM notes");
        let mut bind_values: Vec<Value> = Vec::new();
        match scoped_predicate(locator, predicate) {
            Some(scoped) => {
                sql.push_str(" WHERE ");
                sql.push_str(scoped.expression());
                bind_values.extend(scoped.args().iter().cloned().map(Value::Text));
            }
            None => warn!("event=store_delete module=store status=start scope=all_rows"),
        }

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        debug!("event=store_delete module=store status=ok locator={locator} affected={changed}");
        self.notify(*locator, ChangeKind::Deleted, changed);
        Ok(changed)
    }

    fn subscribe(&self, locator: &Locator) -> StoreResult<ChangeSubscription> {
        let (sender, receiver) = mpsc::channel();
        let alive = Arc::new(());
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(Subscriber::is_alive);
        subscribers.push(Subscriber {
            locator: *locator,
            sender,
            alive: Arc::downgrade(&alive),
        });
        Ok(ChangeSubscription::new(*locator, receiver, alive))
    }
}

/// Combines the caller predicate with the locator's own row restriction.
fn scoped_predicate(locator: &Locator, predicate: Option<&Predicate>) -> Option<Predicate> {
    match (locator.note_id(), predicate) {
        (None, None) => None,
        (None, Some(predicate)) => Some(predicate.clone()),
        (Some(id), None) => Some(Predicate::id_equals(id)),
        (Some(id), Some(predicate)) => Some(Predicate::id_equals(id).and(predicate)),
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<NoteRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| StoreError::InvalidData(format!("invalid id value `{id_text}` in notes.id")))?;

    let color = i32::try_from(row.get::<_, i64>("color")?)
        .map_err(|_| StoreError::InvalidData(format!("color out of range for note {id}")))?;

    Ok(NoteRecord {
        id,
        title: row.get("title")?,
        body: row.get("note")?,
        created_at: row.get("created")?,
        modified_at: row.get("modified")?,
        color,
        category: row.get("category")?,
    })
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{scoped_predicate, SqliteNotesStore};
    use crate::db::open_db_in_memory;
    use crate::model::locator::Locator;
    use crate::query::Predicate;
    use crate::store::NotesStore;
    use uuid::Uuid;

    #[test]
    fn subscribe_prunes_dropped_entries_without_a_write() {
        let store = SqliteNotesStore::new(open_db_in_memory().unwrap());
        for _ in 0..10 {
            drop(store.subscribe(&Locator::AllNotes).unwrap());
        }
        let _live = store.subscribe(&Locator::AllNotes).unwrap();
        assert_eq!(store.subscribers.borrow().len(), 1);
    }

    #[test]
    fn directory_locator_passes_predicate_through() {
        assert_eq!(scoped_predicate(&Locator::AllNotes, None), None);
        let search = Predicate::search("x").unwrap();
        assert_eq!(
            scoped_predicate(&Locator::AllNotes, Some(&search)),
            Some(search)
        );
    }

    #[test]
    fn note_locator_prepends_id_match() {
        let id = Uuid::new_v4();
        let scoped = scoped_predicate(&Locator::Note(id), None).unwrap();
        assert_eq!(scoped.expression(), "id = ?");
        assert_eq!(scoped.args(), [id.to_string()]);

        let category = Predicate::category_equals("work");
        let joined = scoped_predicate(&Locator::Note(id), Some(&category)).unwrap();
        assert_eq!(joined.args(), [id.to_string(), "work".to_string()]);
    }
}
