//! Locator-addressed notes store.
//!
//! # Responsibility
//! - Define the query/insert/update/delete contract the list screen uses.
//! - Deliver change notifications scoped to a locator.
//! - Provide the SQLite implementation and the worker-thread boundary.
//!
//! # Invariants
//! - Every write refreshes `modified_at` on the touched rows.
//! - A `Note(id)` locator restricts any predicate to that one row.
//! - Subscribers are notified only after the write has committed.

use crate::db::DbError;
use crate::model::locator::Locator;
use crate::model::note::{NoteId, NoteRecord, NoteValues};
use crate::query::{Predicate, SortOrder};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

mod sqlite;
mod worker;

pub use sqlite::SqliteNotesStore;
pub use worker::{StoreHandle, StoreWorker};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error surfaced by store implementations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Persisted row could not be decoded.
    InvalidData(String),
    /// Operation is not defined for this locator (e.g. insert into one note).
    UnsupportedLocator {
        operation: &'static str,
        locator: Locator,
    },
    /// Update called without any column to write.
    EmptyValues,
    /// The store worker thread is gone.
    WorkerUnavailable,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::UnsupportedLocator { operation, locator } => {
                write!(f, "{operation} is not supported for locator {locator}")
            }
            Self::EmptyValues => write!(f, "update requires at least one column value"),
            Self::WorkerUnavailable => write!(f, "notes store worker is not running"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Kind of write that triggered a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Updated,
    Deleted,
}

/// Notification delivered to subscribers after a committed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Locator of the rows that were written.
    pub locator: Locator,
    pub kind: ChangeKind,
    pub affected: usize,
}

/// Live change feed for one locator.
///
/// Dropping the subscription unsubscribes; the store prunes the dead entry
/// on its next notification or subscription.
#[derive(Debug)]
pub struct ChangeSubscription {
    locator: Locator,
    receiver: Receiver<ChangeEvent>,
    _alive: Arc<()>,
}

impl ChangeSubscription {
    pub(crate) fn new(locator: Locator, receiver: Receiver<ChangeEvent>, alive: Arc<()>) -> Self {
        Self {
            locator,
            receiver,
            _alive: alive,
        }
    }

    /// Locator this subscription watches.
    pub fn locator(&self) -> Locator {
        self.locator
    }

    /// Returns the next queued event without blocking.
    pub fn try_next(&self) -> Option<ChangeEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains all queued events and returns them in delivery order.
    pub fn drain(&self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

/// Contract of the external notes store, addressed by [`Locator`].
pub trait NotesStore {
    /// Returns rows under `locator` matching `predicate`.
    fn query(
        &self,
        locator: &Locator,
        predicate: Option<&Predicate>,
        sort: SortOrder,
    ) -> StoreResult<Vec<NoteRecord>>;
    /// Inserts one note under a directory locator and returns its new id.
    fn insert(&self, locator: &Locator, values: &NoteValues) -> StoreResult<NoteId>;
    /// Writes `values` to matching rows and returns the affected count.
    fn update(
        &self,
        locator: &Locator,
        values: &NoteValues,
        predicate: Option<&Predicate>,
    ) -> StoreResult<usize>;
    /// Deletes matching rows and returns the affected count.
    fn delete(&self, locator: &Locator, predicate: Option<&Predicate>) -> StoreResult<usize>;
    /// Opens a change feed for writes overlapping `locator`.
    fn subscribe(&self, locator: &Locator) -> StoreResult<ChangeSubscription>;
}
