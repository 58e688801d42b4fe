//! `notepad` binary entry point.
//!
//! # Responsibility
//! - Resolve configuration and start logging before touching the store.
//! - Dispatch one subcommand through the notes list controller.

use clap::Parser;
use notepad_cli::cli::{run, Cli};
use notepad_core::{init_logging, NotepadConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    // Log setup failures are not fatal for a one-shot command.
    if let Err(err) = init_logging(&config.logging(true)) {
        eprintln!("warning: logging disabled: {err}");
    }

    run(&config, cli.command)
}

fn resolve_config(cli: &Cli) -> anyhow::Result<NotepadConfig> {
    let mut config = NotepadConfig::resolve()?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(dir) = &cli.documents_dir {
        config.documents_dir = dir.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}
