//! Row rendering for the notes list.
//!
//! # Responsibility
//! - Map one note record to the strings a list row shows.
//! - Resolve the row background color.
//!
//! # Invariants
//! - Rendering is pure: the same record always yields the same row.
//! - Color resolution accepts every `i32`.
//! - Body previews keep at most [`PREVIEW_MAX_CHARS`] characters of source text.

use crate::model::note::{NoteId, NoteRecord, DEFAULT_COLOR};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

/// Maximum body characters kept in a row preview.
pub const PREVIEW_MAX_CHARS: usize = 100;
/// Suffix appended to truncated previews.
pub const ELLIPSIS: &str = "...";
/// Opaque white, used for rows without a color.
pub const DEFAULT_BACKGROUND: u32 = 0xFFFF_FFFF;

const ROW_TIMESTAMP_FORMAT: &str = "%Y-%m-%d  %H:%M";

/// Display projection of one list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: NoteId,
    pub title: String,
    pub body_preview: String,
    pub timestamp: String,
    /// Packed ARGB background for the row container.
    pub background: u32,
}

/// Renders a row with timestamps in the local time zone.
pub fn render_row(record: &NoteRecord) -> RowView {
    render_row_in(record, &Local)
}

/// Renders a row with timestamps in `tz`.
pub fn render_row_in<Tz: TimeZone>(record: &NoteRecord, tz: &Tz) -> RowView
where
    Tz::Offset: std::fmt::Display,
{
    RowView {
        id: record.id,
        title: record.title.clone().unwrap_or_default(),
        body_preview: body_preview(record.body.as_deref().unwrap_or_default()),
        timestamp: format_millis(record.modified_at, tz, ROW_TIMESTAMP_FORMAT),
        background: resolve_background(record.color),
    }
}

/// Truncates `body` to the preview length, appending [`ELLIPSIS`] when cut.
pub fn body_preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_MAX_CHARS) {
        None => body.to_string(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", &body[..cut]),
    }
}

/// Maps the stored color to a packed ARGB background.
pub fn resolve_background(color: i32) -> u32 {
    if color == DEFAULT_COLOR {
        DEFAULT_BACKGROUND
    } else {
        color as u32
    }
}

/// Formats epoch milliseconds with a chrono pattern in `tz`.
///
/// Values chrono cannot represent fall back to the raw number.
pub(crate) fn format_millis<Tz: TimeZone>(millis: i64, tz: &Tz, pattern: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(utc) => utc.with_timezone(tz).format(pattern).to_string(),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{body_preview, render_row_in, resolve_background, DEFAULT_BACKGROUND};
    use crate::model::note::NoteRecord;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(body: Option<&str>, color: i32) -> NoteRecord {
        NoteRecord {
            id: Uuid::new_v4(),
            title: Some("Groceries".to_string()),
            body: body.map(str::to_string),
            created_at: 0,
            modified_at: 1_700_000_000_000,
            color,
            category: None,
        }
    }

    #[test]
    fn short_body_is_kept_verbatim() {
        let body = "a".repeat(100);
        assert_eq!(body_preview(&body), body);
        assert_eq!(body_preview(""), "");
    }

    #[test]
    fn long_body_is_cut_at_100_chars_with_ellipsis() {
        let body = format!("{}{}", "b".repeat(100), "tail");
        let preview = body_preview(&body);
        assert_eq!(preview, format!("{}...", "b".repeat(100)));
        assert_eq!(body_preview(&body), preview);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let body = "笔".repeat(120);
        let preview = body_preview(&body);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.starts_with(&"笔".repeat(100)));
    }

    #[test]
    fn zero_color_maps_to_white_and_others_pass_through() {
        assert_eq!(resolve_background(0), DEFAULT_BACKGROUND);
        assert_eq!(resolve_background(0x11223344), 0x11223344);
        assert_eq!(resolve_background(-1), 0xFFFF_FFFF);
        assert_eq!(resolve_background(i32::MIN), 0x8000_0000);
    }

    #[test]
    fn row_uses_minute_precision_timestamp() {
        let row = render_row_in(&record(None, 0), &Utc);
        assert_eq!(row.timestamp, "2023-11-14  22:13");
        assert_eq!(row.title, "Groceries");
        assert_eq!(row.body_preview, "");
        assert_eq!(row.background, DEFAULT_BACKGROUND);
    }
}
