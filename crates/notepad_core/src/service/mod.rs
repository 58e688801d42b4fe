//! Use-case layer driving the notes list screen.
//!
//! # Responsibility
//! - Orchestrate store, rendering, category and export calls per UI event.
//! - Keep front ends free of storage and file-system details.

pub mod clipboard;
pub mod notes_list;
