//! Domain model for the notes list.
//!
//! # Responsibility
//! - Define the note record shape returned by the store.
//! - Define locators naming "all notes" or "one note".
//!
//! # Invariants
//! - Note identity is store-assigned and stable for the record lifetime.
//! - Category is a plain string column, never a separate entity.

pub mod locator;
pub mod note;
