//! Note record model.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never reused.
//! - `modified_at` is rewritten by the store on every write.
//! - An absent or empty `category` means "uncategorized".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one note row.
pub type NoteId = Uuid;

/// Literal category value used when no real category applies.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Color sentinel meaning "use the default row background".
pub const DEFAULT_COLOR: i32 = 0;

/// One row of the notes store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    /// Nullable in storage; rows written by older editors may lack it.
    pub title: Option<String>,
    /// Full note text.
    pub body: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub modified_at: i64,
    /// Packed ARGB value, or [`DEFAULT_COLOR`].
    pub color: i32,
    pub category: Option<String>,
}

impl NoteRecord {
    /// Returns the category to group this note under.
    ///
    /// Empty and missing values both collapse to `None`.
    pub fn effective_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|value| !value.is_empty())
    }
}

/// Partial column set for insert and update calls.
///
/// Only `Some` fields are written; `None` leaves the column untouched on
/// update and at its default on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteValues {
    pub title: Option<String>,
    pub body: Option<String>,
    pub color: Option<i32>,
    pub category: Option<String>,
}

impl NoteValues {
    /// Values for a fresh note with title and body.
    pub fn note(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_color(mut self, color: i32) -> Self {
        self.color = Some(color);
        self
    }

    /// Values that only rewrite the category column.
    pub fn category_only(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Returns whether no column would be written.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.color.is_none() && self.category.is_none()
    }
}
