//! Clipboard seam used by the copy action.
//!
//! The list only ever places a note *reference* on the clipboard; the note
//! content stays in the store.

use crate::model::locator::Locator;

/// Label attached to clips produced by the notes list.
pub const NOTE_CLIP_LABEL: &str = "Note";

/// One clipboard entry referencing a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipEntry {
    pub label: String,
    pub locator: Locator,
}

impl ClipEntry {
    pub fn note(locator: Locator) -> Self {
        Self {
            label: NOTE_CLIP_LABEL.to_string(),
            locator,
        }
    }
}

/// System clipboard contract.
pub trait Clipboard {
    fn set_primary_clip(&mut self, entry: ClipEntry);
    fn has_primary_clip(&self) -> bool;
}

/// Process-local clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    primary: Option<ClipEntry>,
}

impl MemoryClipboard {
    pub fn primary_clip(&self) -> Option<&ClipEntry> {
        self.primary.as_ref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_primary_clip(&mut self, entry: ClipEntry) {
        self.primary = Some(entry);
    }

    fn has_primary_clip(&self) -> bool {
        self.primary.is_some()
    }
}
