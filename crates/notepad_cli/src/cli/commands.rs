//! Subcommand handlers.
//!
//! Every handler drives the [`NotesListController`] the same way a list
//! screen would, then prints what the screen would show.

use super::output::{print_note, print_notice, print_rows};
use super::Commands;
use anyhow::{anyhow, bail, Context};
use log::info;
use notepad_core::db::open_db;
use notepad_core::{
    AddCategoryOutcome, ContextAction, ContextOutcome, ExportRequest, ExportScope, Exporter,
    FixedPermission, LaunchContext, Locator, LogMediaIndex, MemoryClipboard, Navigation, NoteId,
    NoteValues, NotepadConfig, NotesListController, NotesStore, SqliteNotesStore, StoreWorker,
};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use uuid::Uuid;

pub type CliController<S> = NotesListController<S, MemoryClipboard, LogMediaIndex>;

/// Opens the configured store on a worker thread and runs `command`.
pub fn run(config: &NotepadConfig, command: Commands) -> anyhow::Result<()> {
    let conn = open_db(&config.db_path)
        .with_context(|| format!("cannot open `{}`", config.db_path.display()))?;
    let worker = StoreWorker::spawn(SqliteNotesStore::new(conn))
        .context("cannot start store worker")?;

    let mut controller = NotesListController::new(
        worker.handle(),
        LaunchContext::default(),
        Exporter::new(&config.documents_dir, LogMediaIndex),
        MemoryClipboard::default(),
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = execute(
        &mut controller,
        command,
        &mut stdout.lock(),
        &mut stdin.lock(),
    );

    drop(controller);
    worker.shutdown();
    result
}

/// Runs `command` against an already constructed controller.
///
/// `input` answers confirmation prompts.
pub fn execute<S: NotesStore>(
    controller: &mut CliController<S>,
    command: Commands,
    out: &mut dyn Write,
    input: &mut dyn BufRead,
) -> anyhow::Result<()> {
    if let Some(notice) = controller.open() {
        bail!("{notice}");
    }

    match command {
        Commands::List(args) => {
            let notice = match (args.search, args.category) {
                (Some(term), _) => controller.search(&term),
                (None, Some(category)) => controller.filter_by_category(&category),
                (None, None) => controller.show_all(),
            };
            if let Some(notice) = notice {
                bail!("{notice}");
            }
            if args.json {
                serde_json::to_writer_pretty(&mut *out, controller.binding().rows())?;
                writeln!(out)?;
            } else {
                print_rows(out, controller.title(), controller.binding().rows())?;
            }
        }
        Commands::Add(args) => {
            let mut values = NoteValues::note(args.title, args.body);
            if let Some(category) = args.category {
                values = values.with_category(category);
            }
            if let Some(color) = args.color {
                values = values.with_color(color);
            }
            let id = controller.store().insert(&controller.locator(), &values)?;
            info!("event=cli_add module=cli status=ok id={id}");
            writeln!(out, "{}", controller.locator().with_id(id))?;
        }
        Commands::Delete(args) => {
            let position = position_of(controller, &args.id)?;
            match row_action(controller, position, ContextAction::Delete)? {
                ContextOutcome::Deleted { affected } => {
                    writeln!(out, "Deleted {affected} note(s)")?;
                }
                other => print_outcome(out, other)?,
            }
        }
        Commands::Copy(args) => {
            let position = position_of(controller, &args.id)?;
            let outcome = row_action(controller, position, ContextAction::Copy)?;
            print_outcome(out, outcome)?;
            let menu = controller.options_menu(Some(position));
            writeln!(
                out,
                "Paste {}",
                if menu.paste_enabled { "enabled" } else { "disabled" }
            )?;
        }
        Commands::Open(args) => {
            let position = position_of(controller, &args.id)?;
            let Some(Navigation::Edit(locator)) = controller.item_click(position) else {
                bail!("note cannot be opened from this list");
            };
            let record = &controller.binding().records()[position];
            print_note(out, &locator, record)?;
        }
        Commands::Categories => {
            for name in controller.categories() {
                writeln!(out, "{name}")?;
            }
        }
        Commands::AddCategory(args) => match controller.add_category(&args.name) {
            AddCategoryOutcome::Blank => bail!("category name cannot be blank"),
            AddCategoryOutcome::AlreadyExists(notice) => {
                print_notice(out, &notice)?;
                print_rows(out, controller.title(), controller.binding().rows())?;
            }
            AddCategoryOutcome::Create { notice, navigation } => {
                print_notice(out, &notice)?;
                if let Navigation::Insert {
                    category: Some(category),
                    ..
                } = navigation
                {
                    writeln!(
                        out,
                        "Add the first note with: notepad add --category '{category}' --title <TITLE>"
                    )?;
                }
            }
        },
        Commands::DeleteCategory(args) => {
            if !args.yes {
                let prompt = controller.confirm_delete_category(&args.name);
                if !confirm(out, input, &prompt)? {
                    writeln!(out, "Cancelled")?;
                    return Ok(());
                }
            }
            let notice = controller.delete_category(&args.name);
            print_notice(out, &notice)?;
        }
        Commands::Export(args) => {
            let scope = match args.id.as_deref() {
                Some(raw) => ExportScope::Single(parse_note_id(raw)?),
                None => ExportScope::All,
            };
            let gate = FixedPermission(!args.deny_permission);
            let notice = match controller.request_export(scope, &gate) {
                ExportRequest::Done(notice) => notice,
                ExportRequest::AwaitingPermission(pending) => {
                    // A denied gate stands in for the user refusing the prompt.
                    controller.on_permission_result(pending, gate.0)
                }
            };
            print_notice(out, &notice)?;
        }
    }
    Ok(())
}

/// Accepts a bare UUID or a note locator.
pub fn parse_note_id(raw: &str) -> anyhow::Result<NoteId> {
    if let Ok(id) = Uuid::parse_str(raw.trim()) {
        return Ok(id);
    }
    let locator = Locator::from_str(raw.trim()).map_err(|err| anyhow!("`{raw}`: {err}"))?;
    locator
        .note_id()
        .ok_or_else(|| anyhow!("`{raw}` names the notes directory, not a note"))
}

fn position_of<S: NotesStore>(controller: &CliController<S>, raw: &str) -> anyhow::Result<usize> {
    let id = parse_note_id(raw)?;
    controller
        .binding()
        .records()
        .iter()
        .position(|record| record.id == id)
        .ok_or_else(|| anyhow!("no note with id {id}"))
}

fn row_action<S: NotesStore>(
    controller: &mut CliController<S>,
    position: usize,
    action: ContextAction,
) -> anyhow::Result<ContextOutcome> {
    controller
        .context_action(position, action, &FixedPermission(true))
        .ok_or_else(|| anyhow!("row {position} is no longer listed"))
}

fn print_outcome(out: &mut dyn Write, outcome: ContextOutcome) -> io::Result<()> {
    match outcome {
        ContextOutcome::Navigate(navigation) => writeln!(out, "{navigation:?}"),
        ContextOutcome::Copied(entry) => writeln!(out, "Copied {} {}", entry.label, entry.locator),
        ContextOutcome::Deleted { affected } => writeln!(out, "Deleted {affected} note(s)"),
        ContextOutcome::Export(ExportRequest::Done(notice)) | ContextOutcome::Notice(notice) => {
            print_notice(out, &notice)
        }
        ContextOutcome::Export(ExportRequest::AwaitingPermission(_)) => {
            writeln!(out, "Storage permission required")
        }
    }
}

fn confirm(out: &mut dyn Write, input: &mut dyn BufRead, prompt: &str) -> io::Result<bool> {
    write!(out, "{prompt} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}
