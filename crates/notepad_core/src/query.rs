//! Translation of list filters into store predicates.
//!
//! # Responsibility
//! - Turn a search term or selected category into a match expression plus
//!   ordered bound arguments.
//! - Keep raw SQL fragments out of UI-facing code.
//!
//! # Invariants
//! - Blank search terms and the uncategorized sentinel produce no predicate.
//! - Predicates are only constructible through this module, so the store can
//!   splice `expression()` into SQL without re-validating it.
//! - The number of `?` placeholders always equals `args().len()`.

use crate::model::note::{NoteId, UNCATEGORIZED};

const LIKE_ESCAPE: char = '\\';

/// What the list is currently showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListFilter {
    /// Every note, default order.
    #[default]
    All,
    /// Title-or-body substring search.
    Search(String),
    /// Exact category match.
    Category(String),
}

impl ListFilter {
    /// Returns the category this filter selects, if any.
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Category(name) => Some(name.as_str()),
            Self::All | Self::Search(_) => None,
        }
    }
}

/// Row ordering requested from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recently modified first.
    #[default]
    Default,
    /// Whatever order the store finds cheapest.
    Unordered,
}

impl SortOrder {
    pub(crate) fn as_sql(self) -> Option<&'static str> {
        match self {
            Self::Default => Some("modified DESC, id ASC"),
            Self::Unordered => None,
        }
    }
}

/// Match expression plus its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    expression: String,
    args: Vec<String>,
}

impl Predicate {
    /// Title-or-body substring match. Returns `None` for blank terms.
    ///
    /// `%` and `_` in the term are matched literally.
    pub fn search(term: &str) -> Option<Self> {
        if term.trim().is_empty() {
            return None;
        }

        let pattern = format!("%{}%", escape_like(term));
        Some(Self {
            expression: format!(
                "title LIKE ? ESCAPE '{LIKE_ESCAPE}' OR note LIKE ? ESCAPE '{LIKE_ESCAPE}'"
            ),
            args: vec![pattern.clone(), pattern],
        })
    }

    /// Exact, case-sensitive category match.
    pub fn category_equals(name: &str) -> Self {
        Self {
            expression: "category = ?".to_string(),
            args: vec![name.to_string()],
        }
    }

    pub(crate) fn id_equals(id: NoteId) -> Self {
        Self {
            expression: "id = ?".to_string(),
            args: vec![id.to_string()],
        }
    }

    /// Conjunction of two predicates; each side is parenthesized.
    pub(crate) fn and(&self, other: &Predicate) -> Self {
        let mut args = self.args.clone();
        args.extend(other.args.iter().cloned());
        Self {
            expression: format!("({}) AND ({})", self.expression, other.expression),
            args,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Builds the store predicate for a list filter.
///
/// `None` means "return everything".
pub fn build_predicate(filter: &ListFilter) -> Option<Predicate> {
    match filter {
        ListFilter::All => None,
        ListFilter::Search(term) => Predicate::search(term),
        // Filtering by the sentinel shows every note, including categorized ones.
        ListFilter::Category(name) if name.trim().is_empty() || name == UNCATEGORIZED => None,
        ListFilter::Category(name) => Some(Predicate::category_equals(name)),
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if ch == LIKE_ESCAPE || ch == '%' || ch == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}
