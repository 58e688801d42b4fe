//! Notes list use-case controller.
//!
//! # Responsibility
//! - Hold the one live result binding shown by the list.
//! - Translate list events (search, category, copy, delete, export) into
//!   store, clipboard and export calls.
//! - Degrade every failure into a user-visible [`Notice`].
//!
//! # Invariants
//! - Exactly one [`ListBinding`] is live; rebinding drops the previous one,
//!   which releases its change subscription.
//! - Searching always resets the category context.
//! - A pending export is an explicit value returned to the caller, never
//!   hidden controller state.

use crate::category;
use crate::export::{
    ExportError, ExportOutcome, ExportScope, Exporter, FixedPermission, MediaIndex,
    PermissionGate,
};
use crate::model::locator::Locator;
use crate::model::note::{NoteRecord, UNCATEGORIZED};
use crate::query::{build_predicate, ListFilter, SortOrder};
use crate::render::{render_row, RowView};
use crate::service::clipboard::{ClipEntry, Clipboard};
use crate::store::{ChangeSubscription, NotesStore, StoreResult};
use chrono::Local;
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Screen title used when no category is selected.
pub const DEFAULT_LIST_TITLE: &str = "Notes";

/// How the list screen was launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LaunchAction {
    /// Browse and edit notes.
    #[default]
    View,
    /// Caller wants one note locator back.
    Pick,
    /// Caller wants one note's content reference back.
    GetContent,
}

/// Launch parameters for the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchContext {
    /// Directory to list; `None` means all notes.
    pub locator: Option<Locator>,
    pub action: LaunchAction,
}

/// Short user-visible message produced instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The store returned no result set.
    NoNotesData,
    NothingToExport,
    NoteNotFound,
    PermissionDenied,
    /// The documents directory could not be created.
    DirectoryUnavailable(String),
    ExportFailed(String),
    Exported(PathBuf),
    CategoryExists(String),
    CreatingCategory(String),
    CategoryDeleted { name: String, count: usize },
    CategoryUnused(String),
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoNotesData => write!(f, "Unable to load notes"),
            Self::NothingToExport => write!(f, "No notes to export"),
            Self::NoteNotFound => write!(f, "Note not found"),
            Self::PermissionDenied => {
                write!(f, "Storage permission is required to export notes")
            }
            Self::DirectoryUnavailable(message) => {
                write!(f, "Unable to create export directory: {message}")
            }
            Self::ExportFailed(message) => write!(f, "Export failed: {message}"),
            Self::Exported(path) => write!(f, "Notes exported to: {}", path.display()),
            Self::CategoryExists(name) => write!(f, "Category '{name}' already exists"),
            Self::CreatingCategory(name) => write!(f, "Creating category '{name}'"),
            Self::CategoryDeleted { name, count } => write!(
                f,
                "Deleted category '{name}', {count} note(s) set to '{UNCATEGORIZED}'"
            ),
            Self::CategoryUnused(name) => write!(f, "Category '{name}' deleted"),
        }
    }
}

/// Where the front end should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Open the editor on a new note, optionally preset to a category.
    Insert {
        locator: Locator,
        category: Option<String>,
    },
    /// Open the editor to create a note from the clipboard.
    Paste(Locator),
    /// Open the editor on an existing note.
    Edit(Locator),
    /// Finish and hand the picked note back to the launcher.
    ReturnPicked(Locator),
}

/// Actions offered by a row's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    Open,
    Copy,
    Delete,
    Export,
}

/// Context menu header for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub header_title: String,
    pub locator: Locator,
}

/// Result of a context menu action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOutcome {
    Navigate(Navigation),
    Copied(ClipEntry),
    Deleted { affected: usize },
    Export(ExportRequest),
    Notice(Notice),
}

/// Options menu state derived from clipboard and list contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub paste_enabled: bool,
    pub has_items: bool,
    /// Note the "edit" alternative targets when rows exist.
    pub edit_target: Option<Locator>,
}

/// Export waiting for a storage permission answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingExport {
    pub scope: ExportScope,
    /// Directory the export was requested from.
    pub locator: Locator,
}

/// Result of asking for an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportRequest {
    Done(Notice),
    /// Ask the user, then pass this value to
    /// [`NotesListController::on_permission_result`].
    AwaitingPermission(PendingExport),
}

/// Result of the add-category flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddCategoryOutcome {
    /// Blank input, nothing happened.
    Blank,
    /// Category exists; the list now shows it.
    AlreadyExists(Notice),
    /// Category is new; open the editor with it preset.
    Create {
        notice: Notice,
        navigation: Navigation,
    },
}

/// The single live result set attached to the list.
#[derive(Debug, Default)]
pub struct ListBinding {
    filter: ListFilter,
    records: Vec<NoteRecord>,
    rows: Vec<RowView>,
    subscription: Option<ChangeSubscription>,
}

impl ListBinding {
    fn new(
        filter: ListFilter,
        records: Vec<NoteRecord>,
        subscription: Option<ChangeSubscription>,
    ) -> Self {
        let rows = records.iter().map(render_row).collect();
        Self {
            filter,
            records,
            rows,
            subscription,
        }
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn records(&self) -> &[NoteRecord] {
        &self.records
    }

    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns whether this binding receives change notifications.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    fn record_at(&self, position: usize) -> Option<&NoteRecord> {
        self.records.get(position)
    }

    /// Consumes queued change events; `true` when the data went stale.
    fn take_changes(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|subscription| !subscription.drain().is_empty())
    }
}

/// Controller behind the notes list screen.
pub struct NotesListController<S, C, M>
where
    S: NotesStore,
    C: Clipboard,
    M: MediaIndex,
{
    store: S,
    clipboard: C,
    exporter: Exporter<M>,
    locator: Locator,
    action: LaunchAction,
    title: String,
    binding: ListBinding,
}

impl<S, C, M> NotesListController<S, C, M>
where
    S: NotesStore,
    C: Clipboard,
    M: MediaIndex,
{
    /// Creates the controller; call [`Self::open`] to load the first rows.
    pub fn new(store: S, launch: LaunchContext, exporter: Exporter<M>, clipboard: C) -> Self {
        Self {
            store,
            clipboard,
            exporter,
            locator: launch.locator.unwrap_or_default(),
            action: launch.action,
            title: DEFAULT_LIST_TITLE.to_string(),
            binding: ListBinding::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn locator(&self) -> Locator {
        self.locator
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn binding(&self) -> &ListBinding {
        &self.binding
    }

    /// Binds the current filter; a fresh controller lists every note.
    pub fn open(&mut self) -> Option<Notice> {
        self.refresh()
    }

    /// Re-queries the current filter (screen resumed).
    pub fn refresh(&mut self) -> Option<Notice> {
        let filter = self.binding.filter.clone();
        self.bind(filter)
    }

    /// Re-queries when the store reported writes since the last bind.
    ///
    /// Returns `Ok(true)` when a refresh happened and the notice of a failed
    /// re-query as the error.
    pub fn poll_changes(&mut self) -> Result<bool, Notice> {
        if !self.binding.take_changes() {
            return Ok(false);
        }
        info!("event=list_requery module=notes_list status=start reason=store_changed");
        match self.refresh() {
            Some(notice) => Err(notice),
            None => Ok(true),
        }
    }

    /// Shows notes whose title or body contains `term`.
    ///
    /// Blank terms show every note.
    pub fn search(&mut self, term: &str) -> Option<Notice> {
        self.title = DEFAULT_LIST_TITLE.to_string();
        let filter = if term.trim().is_empty() {
            ListFilter::All
        } else {
            ListFilter::Search(term.to_string())
        };
        self.bind(filter)
    }

    /// Clears search and category filters.
    pub fn show_all(&mut self) -> Option<Notice> {
        self.title = DEFAULT_LIST_TITLE.to_string();
        self.bind(ListFilter::All)
    }

    /// Shows notes of one category; the sentinel shows every note.
    pub fn filter_by_category(&mut self, name: &str) -> Option<Notice> {
        self.title = format!("Category: {name}");
        self.bind(ListFilter::Category(name.to_string()))
    }

    /// Distinct categories in use, or just the sentinel.
    pub fn categories(&self) -> BTreeSet<String> {
        match category::all_categories(&self.store, &self.locator) {
            Ok(categories) => categories,
            Err(err) => {
                error!("event=category_list module=notes_list status=error error={err}");
                BTreeSet::from([UNCATEGORIZED.to_string()])
            }
        }
    }

    /// Starts the add-category flow for user input `name`.
    pub fn add_category(&mut self, name: &str) -> AddCategoryOutcome {
        let name = name.trim();
        if name.is_empty() {
            return AddCategoryOutcome::Blank;
        }

        if self.categories().contains(name) {
            let notice = self
                .filter_by_category(name)
                .unwrap_or_else(|| Notice::CategoryExists(name.to_string()));
            return AddCategoryOutcome::AlreadyExists(notice);
        }

        AddCategoryOutcome::Create {
            notice: Notice::CreatingCategory(name.to_string()),
            navigation: Navigation::Insert {
                locator: self.locator,
                category: Some(name.to_string()),
            },
        }
    }

    /// Confirmation text for deleting category `name`.
    pub fn confirm_delete_category(&self, name: &str) -> String {
        let count = category::count_in_category(&self.store, &self.locator, name).unwrap_or_else(
            |err| {
                warn!("event=category_count module=notes_list status=error error={err}");
                0
            },
        );

        if count > 0 {
            format!(
                "Delete category '{name}'?\n\n{count} note(s) in this category will be set to '{UNCATEGORIZED}'."
            )
        } else {
            format!("Delete category '{name}'?")
        }
    }

    /// Moves all notes of `name` to the sentinel and refreshes the list.
    ///
    /// A failed refresh replaces the result notice.
    pub fn delete_category(&mut self, name: &str) -> Notice {
        let notice = match category::delete_category(&self.store, &self.locator, name) {
            Ok(0) => Notice::CategoryUnused(name.to_string()),
            Ok(count) => Notice::CategoryDeleted {
                name: name.to_string(),
                count,
            },
            Err(err) => {
                error!("event=category_delete module=notes_list status=error error={err}");
                return Notice::NoNotesData;
            }
        };

        let rebound = if self.binding.filter.category() == Some(name) {
            self.show_all()
        } else {
            self.refresh()
        };
        rebound.unwrap_or(notice)
    }

    /// Options menu state; `selected` is the highlighted row, if any.
    pub fn options_menu(&self, selected: Option<usize>) -> MenuState {
        let has_items = !self.binding.is_empty();
        let edit_target = if has_items {
            selected
                .and_then(|position| self.binding.record_at(position))
                .map(|record| self.locator.with_id(record.id))
        } else {
            None
        };

        MenuState {
            paste_enabled: self.clipboard.has_primary_clip(),
            has_items,
            edit_target,
        }
    }

    /// Navigation for the "add note" menu item.
    pub fn add_note(&self) -> Navigation {
        Navigation::Insert {
            locator: self.locator,
            category: None,
        }
    }

    /// Navigation for "paste"; `None` while the clipboard is empty.
    pub fn paste(&self) -> Option<Navigation> {
        self.clipboard
            .has_primary_clip()
            .then_some(Navigation::Paste(self.locator))
    }

    /// Context menu header for the row at `position`.
    pub fn context_menu(&self, position: usize) -> Option<ContextMenu> {
        let Some(record) = self.binding.record_at(position) else {
            warn!(
                "event=context_menu module=notes_list status=error error_code=bad_menu_info position={position} rows={}",
                self.binding.len()
            );
            return None;
        };

        Some(ContextMenu {
            header_title: record.title.clone().unwrap_or_default(),
            locator: self.locator.with_id(record.id),
        })
    }

    /// Runs a context menu action on the row at `position`.
    ///
    /// Returns `None` when `position` does not name a row.
    pub fn context_action(
        &mut self,
        position: usize,
        action: ContextAction,
        permission: &dyn PermissionGate,
    ) -> Option<ContextOutcome> {
        let menu = self.context_menu(position)?;
        let note_locator = menu.locator;

        let outcome = match action {
            ContextAction::Open => ContextOutcome::Navigate(Navigation::Edit(note_locator)),
            ContextAction::Copy => {
                let entry = ClipEntry::note(note_locator);
                self.clipboard.set_primary_clip(entry.clone());
                info!("event=note_copy module=notes_list status=ok locator={note_locator}");
                ContextOutcome::Copied(entry)
            }
            ContextAction::Delete => match self.store.delete(&note_locator, None) {
                Ok(affected) => {
                    info!(
                        "event=note_delete module=notes_list status=ok locator={note_locator} affected={affected}"
                    );
                    match self.refresh() {
                        Some(notice) => ContextOutcome::Notice(notice),
                        None => ContextOutcome::Deleted { affected },
                    }
                }
                Err(err) => {
                    error!("event=note_delete module=notes_list status=error error={err}");
                    ContextOutcome::Notice(Notice::NoNotesData)
                }
            },
            ContextAction::Export => {
                let scope = note_locator
                    .note_id()
                    .map_or(ExportScope::All, ExportScope::Single);
                ContextOutcome::Export(self.request_export(scope, permission))
            }
        };
        Some(outcome)
    }

    /// Navigation for tapping the row at `position`.
    pub fn item_click(&self, position: usize) -> Option<Navigation> {
        let record = self.binding.record_at(position)?;
        let locator = self.locator.with_id(record.id);
        Some(match self.action {
            LaunchAction::Pick | LaunchAction::GetContent => Navigation::ReturnPicked(locator),
            LaunchAction::View => Navigation::Edit(locator),
        })
    }

    /// Exports now when permitted, otherwise returns the pending request.
    pub fn request_export(
        &self,
        scope: ExportScope,
        permission: &dyn PermissionGate,
    ) -> ExportRequest {
        if !permission.is_granted() {
            info!("event=export_permission module=notes_list status=requested");
            return ExportRequest::AwaitingPermission(PendingExport {
                scope,
                locator: self.locator,
            });
        }
        ExportRequest::Done(self.run_export(scope, &self.locator, permission))
    }

    /// Resumes or aborts `pending` after the permission prompt.
    pub fn on_permission_result(&self, pending: PendingExport, granted: bool) -> Notice {
        if !granted {
            info!("event=export_permission module=notes_list status=denied");
            return Notice::PermissionDenied;
        }
        self.run_export(pending.scope, &pending.locator, &FixedPermission(true))
    }

    fn run_export(
        &self,
        scope: ExportScope,
        locator: &Locator,
        permission: &dyn PermissionGate,
    ) -> Notice {
        let now = Local::now();
        match self
            .exporter
            .export(&self.store, locator, scope, permission, &now)
        {
            Ok(ExportOutcome::Written(path)) => Notice::Exported(path),
            Ok(ExportOutcome::NothingToExport) => Notice::NothingToExport,
            Ok(ExportOutcome::NoteNotFound) => Notice::NoteNotFound,
            Err(ExportError::PermissionDenied) => Notice::PermissionDenied,
            Err(err @ ExportError::CreateDir { .. }) => {
                Notice::DirectoryUnavailable(err.to_string())
            }
            Err(ExportError::Store(_)) => Notice::NoNotesData,
            Err(err @ ExportError::Write { .. }) => Notice::ExportFailed(err.to_string()),
        }
    }

    fn bind(&mut self, filter: ListFilter) -> Option<Notice> {
        match self.load(&filter) {
            Ok(binding) => {
                info!(
                    "event=list_bind module=notes_list status=ok filter={} rows={}",
                    filter_label(&filter),
                    binding.len()
                );
                self.binding = binding;
                None
            }
            Err(err) => {
                error!(
                    "event=list_bind module=notes_list status=error filter={} error={err}",
                    filter_label(&filter)
                );
                self.binding = ListBinding::new(filter, Vec::new(), None);
                Some(Notice::NoNotesData)
            }
        }
    }

    fn load(&self, filter: &ListFilter) -> StoreResult<ListBinding> {
        // Subscribe before querying so writes racing the query still mark it stale.
        let subscription = self.store.subscribe(&self.locator)?;
        let predicate = build_predicate(filter);
        let records = self
            .store
            .query(&self.locator, predicate.as_ref(), SortOrder::Default)?;
        Ok(ListBinding::new(filter.clone(), records, Some(subscription)))
    }
}

fn filter_label(filter: &ListFilter) -> &'static str {
    match filter {
        ListFilter::All => "all",
        ListFilter::Search(_) => "search",
        ListFilter::Category(_) => "category",
    }
}
