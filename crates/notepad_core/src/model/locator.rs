//! URI-like locators addressing the notes store.
//!
//! A locator names either the whole notes directory or one note inside it:
//! `content://notepad/notes` and `content://notepad/notes/<uuid>`.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const SCHEME_PREFIX: &str = "content://";
const AUTHORITY: &str = "notepad";
const NOTES_PATH: &str = "notes";

/// Resource identifier understood by [`crate::store::NotesStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Locator {
    /// Every note in the store.
    #[default]
    AllNotes,
    /// Exactly one note.
    Note(NoteId),
}

impl Locator {
    /// Appends a note id to this locator's directory.
    pub fn with_id(&self, id: NoteId) -> Self {
        Self::Note(id)
    }

    /// Returns the note id when this locator names a single note.
    pub fn note_id(&self) -> Option<NoteId> {
        match self {
            Self::AllNotes => None,
            Self::Note(id) => Some(*id),
        }
    }

    /// Returns whether a write to `written` is visible through `self`.
    pub fn overlaps(&self, written: &Locator) -> bool {
        match (self, written) {
            (Self::AllNotes, _) | (_, Self::AllNotes) => true,
            (Self::Note(left), Self::Note(right)) => left == right,
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllNotes => write!(f, "{SCHEME_PREFIX}{AUTHORITY}/{NOTES_PATH}"),
            Self::Note(id) => write!(f, "{SCHEME_PREFIX}{AUTHORITY}/{NOTES_PATH}/{id}"),
        }
    }
}

/// Error returned when a string is not a notes locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorParseError {
    Scheme(String),
    Authority(String),
    Path(String),
    NoteId(String),
}

impl Display for LocatorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheme(value) => write!(f, "locator `{value}` must start with `{SCHEME_PREFIX}`"),
            Self::Authority(value) => {
                write!(f, "unknown locator authority `{value}`, expected `{AUTHORITY}`")
            }
            Self::Path(value) => write!(f, "unknown locator path `{value}`"),
            Self::NoteId(value) => write!(f, "invalid note id `{value}` in locator"),
        }
    }
}

impl Error for LocatorParseError {}

impl FromStr for Locator {
    type Err = LocatorParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let rest = trimmed
            .strip_prefix(SCHEME_PREFIX)
            .ok_or_else(|| LocatorParseError::Scheme(trimmed.to_string()))?;

        let mut segments = rest.trim_end_matches('/').split('/');
        let authority = segments.next().unwrap_or_default();
        if authority != AUTHORITY {
            return Err(LocatorParseError::Authority(authority.to_string()));
        }

        match (segments.next(), segments.next(), segments.next()) {
            (Some(NOTES_PATH), None, None) => Ok(Self::AllNotes),
            (Some(NOTES_PATH), Some(id), None) => Uuid::parse_str(id)
                .map(Self::Note)
                .map_err(|_| LocatorParseError::NoteId(id.to_string())),
            _ => Err(LocatorParseError::Path(rest.to_string())),
        }
    }
}

impl From<Locator> for String {
    fn from(value: Locator) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Locator {
    type Error = LocatorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::{Locator, LocatorParseError};
    use uuid::Uuid;

    #[test]
    fn display_and_parse_agree() {
        let id = Uuid::new_v4();
        let single = Locator::AllNotes.with_id(id);
        assert_eq!(single.to_string(), format!("content://notepad/notes/{id}"));
        assert_eq!(single.to_string().parse::<Locator>().unwrap(), single);
        assert_eq!(
            "content://notepad/notes/".parse::<Locator>().unwrap(),
            Locator::AllNotes
        );
    }

    #[test]
    fn parse_rejects_foreign_locators() {
        assert!(matches!(
            "file:///tmp/x".parse::<Locator>(),
            Err(LocatorParseError::Scheme(_))
        ));
        assert!(matches!(
            "content://contacts/notes".parse::<Locator>(),
            Err(LocatorParseError::Authority(_))
        ));
        assert!(matches!(
            "content://notepad/notes/42".parse::<Locator>(),
            Err(LocatorParseError::NoteId(_))
        ));
        assert!(matches!(
            "content://notepad/folders".parse::<Locator>(),
            Err(LocatorParseError::Path(_))
        ));
    }

    #[test]
    fn overlap_follows_directory_semantics() {
        let a = Locator::Note(Uuid::new_v4());
        let b = Locator::Note(Uuid::new_v4());
        assert!(Locator::AllNotes.overlaps(&a));
        assert!(a.overlaps(&Locator::AllNotes));
        assert!(a.overlaps(&a));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&Locator::AllNotes).unwrap();
        assert_eq!(json, "\"content://notepad/notes\"");
    }
}
