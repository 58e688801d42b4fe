//! Plain-text printing of rows, notes and notices.

use notepad_core::{Locator, NoteRecord, Notice, RowView, UNCATEGORIZED};
use std::io::{self, Write};

pub fn print_rows(out: &mut dyn Write, title: &str, rows: &[RowView]) -> io::Result<()> {
    writeln!(out, "{title} ({})", rows.len())?;
    for row in rows {
        writeln!(out, "{}  {}  {}", row.timestamp, row.id, row.title)?;
        if !row.body_preview.is_empty() {
            writeln!(out, "    {}", row.body_preview.replace('\n', " "))?;
        }
    }
    Ok(())
}

pub fn print_note(out: &mut dyn Write, locator: &Locator, record: &NoteRecord) -> io::Result<()> {
    writeln!(out, "{locator}")?;
    writeln!(out, "Title: {}", record.title.as_deref().unwrap_or_default())?;
    writeln!(
        out,
        "Category: {}",
        record.effective_category().unwrap_or(UNCATEGORIZED)
    )?;
    writeln!(out)?;
    writeln!(out, "{}", record.body.as_deref().unwrap_or_default())
}

pub fn print_notice(out: &mut dyn Write, notice: &Notice) -> io::Result<()> {
    writeln!(out, "{notice}")
}
