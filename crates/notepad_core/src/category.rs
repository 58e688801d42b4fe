//! Category registry derived from the notes' category column.
//!
//! # Responsibility
//! - Collect the distinct categories currently in use.
//! - Reassign notes of a deleted category to the uncategorized sentinel.
//!
//! # Invariants
//! - Nothing is cached; every call scans the store.
//! - Category matching is exact and case-sensitive.
//! - Deleting a category never deletes a note.

use crate::model::locator::Locator;
use crate::model::note::{NoteValues, UNCATEGORIZED};
use crate::query::{Predicate, SortOrder};
use crate::store::{NotesStore, StoreResult};
use log::info;
use std::collections::BTreeSet;

/// Returns every non-empty category under `locator`.
///
/// Falls back to a single [`UNCATEGORIZED`] entry when no note has one.
pub fn all_categories<S: NotesStore + ?Sized>(
    store: &S,
    locator: &Locator,
) -> StoreResult<BTreeSet<String>> {
    let records = store.query(locator, None, SortOrder::Unordered)?;
    let mut categories: BTreeSet<String> = records
        .iter()
        .filter_map(|record| record.effective_category())
        .map(str::to_string)
        .collect();

    if categories.is_empty() {
        categories.insert(UNCATEGORIZED.to_string());
    }
    Ok(categories)
}

/// Counts notes whose category equals `name`.
pub fn count_in_category<S: NotesStore + ?Sized>(
    store: &S,
    locator: &Locator,
    name: &str,
) -> StoreResult<usize> {
    let predicate = Predicate::category_equals(name);
    Ok(store
        .query(locator, Some(&predicate), SortOrder::Unordered)?
        .len())
}

/// Moves every note of category `name` to [`UNCATEGORIZED`].
///
/// Returns the number of notes rewritten.
pub fn delete_category<S: NotesStore + ?Sized>(
    store: &S,
    locator: &Locator,
    name: &str,
) -> StoreResult<usize> {
    let predicate = Predicate::category_equals(name);
    let affected = store.update(
        locator,
        &NoteValues::category_only(UNCATEGORIZED),
        Some(&predicate),
    )?;
    info!("event=category_delete module=category status=ok affected={affected}");
    Ok(affected)
}
