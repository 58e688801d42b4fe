//! Plain-text export of notes.
//!
//! # Responsibility
//! - Serialize one or all notes into a human-readable text document.
//! - Write the document into the documents directory and announce it.
//!
//! # Invariants
//! - Nothing is written when the export selects zero notes.
//! - Every exported block carries the full, untruncated body.
//! - File names never contain `\ / : * ? " < > |`.

use crate::model::locator::Locator;
use crate::model::note::{NoteId, NoteRecord};
use crate::query::SortOrder;
use crate::render::format_millis;
use crate::store::{NotesStore, StoreError};
use chrono::{DateTime, TimeZone};
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Line closing every exported note block.
pub const BLOCK_DELIMITER: &str = "----------------------------------------";
/// Rendering of a missing text column.
pub const MISSING_TEXT: &str = "null";

const HEADER_TITLE: &str = "Notes Export";
const FULL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const BULK_FILE_PREFIX: &str = "notes_export_";
const FALLBACK_FILE_STEM: &str = "note";

static RESERVED_FILE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("valid reserved file char regex"));

/// Which notes an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    All,
    Single(NoteId),
}

/// Storage capability check consulted right before writing.
pub trait PermissionGate {
    fn is_granted(&self) -> bool;
}

/// Permission answer fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPermission(pub bool);

impl PermissionGate for FixedPermission {
    fn is_granted(&self) -> bool {
        self.0
    }
}

/// Index that makes newly written files discoverable.
pub trait MediaIndex {
    fn announce(&self, path: &Path);
}

/// Media index stand-in that records announcements in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMediaIndex;

impl MediaIndex for LogMediaIndex {
    fn announce(&self, path: &Path) {
        info!(
            "event=media_scan module=export status=ok path={}",
            path.display()
        );
    }
}

/// Successful export results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written(PathBuf),
    /// The store holds no notes.
    NothingToExport,
    /// The single note to export does not exist.
    NoteNotFound,
}

/// Export failures that abort the operation.
#[derive(Debug)]
pub enum ExportError {
    PermissionDenied,
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    Store(StoreError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "storage permission not granted"),
            Self::CreateDir { path, source } => {
                write!(f, "cannot create directory `{}`: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "cannot write `{}`: {source}", path.display())
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PermissionDenied => None,
            Self::CreateDir { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ExportError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Writes export documents into one directory.
pub struct Exporter<M: MediaIndex> {
    documents_dir: PathBuf,
    media: M,
}

impl<M: MediaIndex> Exporter<M> {
    pub fn new(documents_dir: impl Into<PathBuf>, media: M) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            media,
        }
    }

    /// Exports `scope` from the notes under `locator`, stamped with `at`.
    ///
    /// # Errors
    /// - `PermissionDenied` when `permission` is not granted at write time.
    /// - `CreateDir` / `Write` on file-system failures.
    /// - `Store` when the store query fails.
    pub fn export<S, P, Tz>(
        &self,
        store: &S,
        locator: &Locator,
        scope: ExportScope,
        permission: &P,
        at: &DateTime<Tz>,
    ) -> Result<ExportOutcome, ExportError>
    where
        S: NotesStore + ?Sized,
        P: PermissionGate + ?Sized,
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let started_at = Instant::now();
        let (records, empty_outcome) = match scope {
            ExportScope::All => (
                store.query(locator, None, SortOrder::Default)?,
                ExportOutcome::NothingToExport,
            ),
            ExportScope::Single(id) => (
                store.query(&locator.with_id(id), None, SortOrder::Unordered)?,
                ExportOutcome::NoteNotFound,
            ),
        };

        if records.is_empty() {
            info!("event=export module=export status=empty scope={}", scope_label(scope));
            return Ok(empty_outcome);
        }

        let file_name = export_file_name(scope, records[0].title.as_deref(), at);
        let document = format_export(&records, at);

        let path = match self.write_document(&file_name, &document, permission) {
            Ok(path) => path,
            Err(err) => {
                error!(
                    "event=export module=export status=error scope={} duration_ms={} error={}",
                    scope_label(scope),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        self.media.announce(&path);
        info!(
            "event=export module=export status=ok scope={} notes={} bytes={} duration_ms={}",
            scope_label(scope),
            records.len(),
            document.len(),
            started_at.elapsed().as_millis()
        );
        Ok(ExportOutcome::Written(path))
    }

    fn write_document<P: PermissionGate + ?Sized>(
        &self,
        file_name: &str,
        document: &str,
        permission: &P,
    ) -> Result<PathBuf, ExportError> {
        if !permission.is_granted() {
            return Err(ExportError::PermissionDenied);
        }

        if !self.documents_dir.is_dir() {
            std::fs::create_dir_all(&self.documents_dir).map_err(|source| {
                ExportError::CreateDir {
                    path: self.documents_dir.clone(),
                    source,
                }
            })?;
        }

        let path = self.documents_dir.join(file_name);
        std::fs::write(&path, document).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Builds the export document for `records` in the given order.
///
/// Record timestamps are shown in the time zone of `exported_at`.
pub fn format_export<Tz>(records: &[NoteRecord], exported_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = exported_at.timezone();
    let mut document = String::new();
    let _ = writeln!(document, "{HEADER_TITLE}");
    let _ = writeln!(
        document,
        "Exported at: {}",
        exported_at.format(FULL_TIMESTAMP_FORMAT)
    );
    document.push('\n');

    for record in records {
        let _ = writeln!(document, "Title: {}", text_or_missing(record.title.as_deref()));
        let _ = writeln!(
            document,
            "Modified: {}",
            format_millis(record.modified_at, &tz, FULL_TIMESTAMP_FORMAT)
        );
        let _ = writeln!(document, "Content:");
        let _ = writeln!(document, "{}", text_or_missing(record.body.as_deref()));
        let _ = writeln!(document, "{BLOCK_DELIMITER}");
        document.push('\n');
    }

    document
}

/// File name for an export of `scope`; `title` only matters for single notes.
pub fn export_file_name<Tz>(scope: ExportScope, title: Option<&str>, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match scope {
        ExportScope::All => bulk_file_name(at),
        ExportScope::Single(_) => single_file_name(title, at),
    }
}

/// File name for an all-notes export.
pub fn bulk_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{BULK_FILE_PREFIX}{}.txt", at.format(FILE_STAMP_FORMAT))
}

/// File name for a single-note export.
pub fn single_file_name<Tz>(title: Option<&str>, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stem = title
        .filter(|value| !value.trim().is_empty())
        .map(sanitize_title)
        .unwrap_or_else(|| FALLBACK_FILE_STEM.to_string());
    format!("{stem}_{}.txt", at.format(FILE_STAMP_FORMAT))
}

/// Replaces file-system reserved characters with `_`.
pub fn sanitize_title(title: &str) -> String {
    RESERVED_FILE_CHARS_RE.replace_all(title, "_").into_owned()
}

fn text_or_missing(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING_TEXT)
}

fn scope_label(scope: ExportScope) -> &'static str {
    match scope {
        ExportScope::All => "all",
        ExportScope::Single(_) => "single",
    }
}
