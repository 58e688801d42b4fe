//! Command-line surface of the `notepad` binary.

use clap::{Args, Parser, Subcommand};
use notepad_core::config::{ENV_DB, ENV_DOCUMENTS_DIR, ENV_LOG_DIR, ENV_LOG_LEVEL};
use std::path::PathBuf;

pub mod commands;
pub mod output;

pub use commands::run;

#[derive(Parser)]
#[command(name = "notepad")]
#[command(about = "Browse, search, categorize and export notes")]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = ENV_DB)]
    pub db: Option<PathBuf>,
    /// Directory receiving text exports
    #[arg(long, global = true, env = ENV_DOCUMENTS_DIR)]
    pub documents_dir: Option<PathBuf>,
    /// Directory for rolling log files (absolute)
    #[arg(long, global = true, env = ENV_LOG_DIR)]
    pub log_dir: Option<PathBuf>,
    /// trace | debug | info | warn | error
    #[arg(long, global = true, env = ENV_LOG_LEVEL)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List notes, newest first
    List(ListArgs),
    /// Create a note
    Add(AddArgs),
    /// Delete one note
    Delete(NoteArgs),
    /// Copy a note reference to the clipboard
    Copy(NoteArgs),
    /// Show one note in full
    Open(NoteArgs),
    /// List categories in use
    Categories,
    /// Show an existing category or start a new one
    AddCategory(CategoryArgs),
    /// Move a category's notes to "uncategorized"
    DeleteCategory(DeleteCategoryArgs),
    /// Export one or all notes as plain text
    Export(ExportArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only notes whose title or body contains this text
    #[arg(short, long, conflicts_with = "category")]
    pub search: Option<String>,
    /// Only notes of this category
    #[arg(short, long)]
    pub category: Option<String>,
    /// Print rendered rows as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(short, long)]
    pub title: String,
    #[arg(short, long, default_value = "")]
    pub body: String,
    #[arg(short, long)]
    pub category: Option<String>,
    /// Packed ARGB row color, 0 for the default
    #[arg(long)]
    pub color: Option<i32>,
}

#[derive(Args)]
pub struct NoteArgs {
    /// Note id or `content://notepad/notes/<id>` locator
    pub id: String,
}

#[derive(Args)]
pub struct CategoryArgs {
    pub name: String,
}

#[derive(Args)]
pub struct DeleteCategoryArgs {
    pub name: String,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Export only this note
    pub id: Option<String>,
    /// Answer "no" to the storage permission prompt
    #[arg(long)]
    pub deny_permission: bool,
}
