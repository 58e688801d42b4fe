//! Core logic behind the NotePad notes list.
//! Front ends (the `notepad` CLI, or a platform UI) only talk to this crate
//! through [`NotesListController`] and the [`NotesStore`] contract.

pub mod category;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod query;
pub mod render;
pub mod service;
pub mod store;

pub use config::{ConfigError, NotepadConfig};
pub use export::{
    ExportError, ExportOutcome, ExportScope, Exporter, FixedPermission, LogMediaIndex,
    MediaIndex, PermissionGate,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::locator::{Locator, LocatorParseError};
pub use model::note::{NoteId, NoteRecord, NoteValues, UNCATEGORIZED};
pub use query::{build_predicate, ListFilter, Predicate, SortOrder};
pub use render::{render_row, RowView};
pub use service::clipboard::{ClipEntry, Clipboard, MemoryClipboard};
pub use service::notes_list::{
    AddCategoryOutcome, ContextAction, ContextMenu, ContextOutcome, ExportRequest, LaunchAction,
    LaunchContext, MenuState, Navigation, Notice, NotesListController, PendingExport,
};
pub use store::{
    ChangeEvent, ChangeKind, ChangeSubscription, NotesStore, SqliteNotesStore, StoreError,
    StoreHandle, StoreResult, StoreWorker,
};
