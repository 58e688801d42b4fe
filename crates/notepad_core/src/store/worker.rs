//! Message-passing boundary between list handlers and the store.
//!
//! # Responsibility
//! - Own the concrete store on one dedicated thread.
//! - Serve requests strictly in arrival order and reply on per-request
//!   channels.
//!
//! # Invariants
//! - The store value never leaves the worker thread.
//! - A request whose worker is gone fails with `StoreError::WorkerUnavailable`
//!   instead of blocking forever.

use super::{ChangeSubscription, NotesStore, StoreError, StoreResult};
use crate::model::locator::Locator;
use crate::model::note::{NoteId, NoteRecord, NoteValues};
use crate::query::{Predicate, SortOrder};
use log::{error, info};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

type Reply<T> = Sender<StoreResult<T>>;

enum StoreRequest {
    Query {
        locator: Locator,
        predicate: Option<Predicate>,
        sort: SortOrder,
        reply: Reply<Vec<NoteRecord>>,
    },
    Insert {
        locator: Locator,
        values: NoteValues,
        reply: Reply<NoteId>,
    },
    Update {
        locator: Locator,
        values: NoteValues,
        predicate: Option<Predicate>,
        reply: Reply<usize>,
    },
    Delete {
        locator: Locator,
        predicate: Option<Predicate>,
        reply: Reply<usize>,
    },
    Subscribe {
        locator: Locator,
        reply: Reply<ChangeSubscription>,
    },
    Shutdown,
}

/// Dedicated thread that owns a [`NotesStore`].
pub struct StoreWorker {
    handle: StoreHandle,
    thread: Option<JoinHandle<()>>,
}

impl StoreWorker {
    /// Moves `store` onto a new worker thread.
    ///
    /// # Errors
    /// - Returns the OS error when the thread cannot be spawned.
    pub fn spawn<S>(store: S) -> std::io::Result<Self>
    where
        S: NotesStore + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<StoreRequest>();
        let thread = std::thread::Builder::new()
            .name("notepad-store".to_string())
            .spawn(move || {
                info!("event=store_worker module=store status=start");
                for request in receiver {
                    if !serve(&store, request) {
                        break;
                    }
                }
                info!("event=store_worker module=store status=stopped");
            })?;

        Ok(Self {
            handle: StoreHandle { sender },
            thread: Some(thread),
        })
    }

    /// Returns a clonable handle that talks to this worker.
    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Stops the worker after already-queued requests and joins it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let _ = self.handle.sender.send(StoreRequest::Shutdown);
        if thread.join().is_err() {
            error!("event=store_worker module=store status=error error_code=worker_panicked");
        }
    }
}

impl Drop for StoreWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Returns `false` once the worker should exit.
fn serve<S: NotesStore>(store: &S, request: StoreRequest) -> bool {
    // A send error only means the requester stopped waiting.
    match request {
        StoreRequest::Query {
            locator,
            predicate,
            sort,
            reply,
        } => {
            let _ = reply.send(store.query(&locator, predicate.as_ref(), sort));
        }
        StoreRequest::Insert {
            locator,
            values,
            reply,
        } => {
            let _ = reply.send(store.insert(&locator, &values));
        }
        StoreRequest::Update {
            locator,
            values,
            predicate,
            reply,
        } => {
            let _ = reply.send(store.update(&locator, &values, predicate.as_ref()));
        }
        StoreRequest::Delete {
            locator,
            predicate,
            reply,
        } => {
            let _ = reply.send(store.delete(&locator, predicate.as_ref()));
        }
        StoreRequest::Subscribe { locator, reply } => {
            let _ = reply.send(store.subscribe(&locator));
        }
        StoreRequest::Shutdown => return false,
    }
    true
}

/// Client side of a [`StoreWorker`]; implements [`NotesStore`] by round-trip
/// messages.
#[derive(Clone)]
pub struct StoreHandle {
    sender: Sender<StoreRequest>,
}

impl StoreHandle {
    fn call<T>(&self, build: impl FnOnce(Reply<T>) -> StoreRequest) -> StoreResult<T> {
        let (reply, response) = mpsc::channel();
        self.sender
            .send(build(reply))
            .map_err(|_| StoreError::WorkerUnavailable)?;
        response.recv().map_err(|_| StoreError::WorkerUnavailable)?
    }
}

impl NotesStore for StoreHandle {
    fn query(
        &self,
        locator: &Locator,
        predicate: Option<&Predicate>,
        sort: SortOrder,
    ) -> StoreResult<Vec<NoteRecord>> {
        self.call(|reply| StoreRequest::Query {
            locator: *locator,
            predicate: predicate.cloned(),
            sort,
            reply,
        })
    }

    fn insert(&self, locator: &Locator, values: &NoteValues) -> StoreResult<NoteId> {
        self.call(|reply| StoreRequest::Insert {
            locator: *locator,
            values: values.clone(),
            reply,
        })
    }

    fn update(
        &self,
        locator: &Locator,
        values: &NoteValues,
        predicate: Option<&Predicate>,
    ) -> StoreResult<usize> {
        self.call(|reply| StoreRequest::Update {
            locator: *locator,
            values: values.clone(),
            predicate: predicate.cloned(),
            reply,
        })
    }

    fn delete(&self, locator: &Locator, predicate: Option<&Predicate>) -> StoreResult<usize> {
        self.call(|reply| StoreRequest::Delete {
            locator: *locator,
            predicate: predicate.cloned(),
            reply,
        })
    }

    fn subscribe(&self, locator: &Locator) -> StoreResult<ChangeSubscription> {
        self.call(|reply| StoreRequest::Subscribe {
            locator: *locator,
            reply,
        })
    }
}
