//! Terminal shell for NoteStrip.
//!
//! # Responsibility
//! - Render the strip as one line per tile.
//! - Forward `add`, `show`, `edit` and `delete` commands to the core views.

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use log::info;
use notestrip_core::{
    init_logging, AppConfig, BrowseView, ItemId, PersistenceError, StoreController, Tile,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const PREVIEW_ITEM_COUNT: usize = 10;

#[derive(Debug, Parser)]
#[command(name = "notestrip")]
#[command(version)]
#[command(about = "A strip of notes over a local item store")]
struct Cli {
    /// Directory holding the item store and logs
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every item on the strip
    List,
    /// Add an empty item
    Add,
    /// Print one item's note
    Show {
        /// Item id
        id: ItemId,
    },
    /// Replace one item's note
    Edit {
        /// Item id
        id: ItemId,
        /// New note text; words are joined with single spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Delete one item
    Delete {
        /// Item id
        id: ItemId,
    },
    /// Show a throwaway strip seeded with sample items
    Preview,
    /// Print the core library version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

impl Command {
    /// Name used in log events; arguments are left out so note text never
    /// reaches the log files.
    fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Add => "add",
            Self::Show { .. } => "show",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::Preview => "preview",
            Self::Version => "version",
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let data_dir = cli.data_dir.as_deref();
    match cli.command {
        Command::Version => {
            println!("notestrip_core version={}", notestrip_core::core_version());
        }
        Command::Preview => {
            let mut store = StoreController::open_preview(PREVIEW_ITEM_COUNT).map_err(report)?;
            let browse = BrowseView::new(&mut store).map_err(report)?;
            render_strip(&browse);
        }
        Command::List => {
            let (_store, browse) = open_strip(data_dir, &cli.command)?;
            render_strip(&browse);
        }
        Command::Add => {
            let (mut store, mut browse) = open_strip(data_dir, &cli.command)?;
            let id = browse.add(&mut store).map_err(report)?;
            println!("added {id}");
            render_strip(&browse);
        }
        Command::Show { id } => {
            let (store, browse) = open_strip(data_dir, &cli.command)?;
            let editor = browse.select(&store, id).map_err(report)?;
            println!("{}", editor.buffer());
        }
        Command::Edit { id, ref text } => {
            let (mut store, mut browse) = open_strip(data_dir, &cli.command)?;
            let mut editor = browse.select(&store, id).map_err(report)?;
            editor.set_buffer(text.join(" "));
            editor.save(&mut store).map_err(report)?;
            browse.refresh();
            render_strip(&browse);
        }
        Command::Delete { id } => {
            let (mut store, mut browse) = open_strip(data_dir, &cli.command)?;
            browse.delete(&mut store, id).map_err(report)?;
            render_strip(&browse);
        }
    }
    Ok(())
}

/// Initializes logging under `data_dir` and opens its item store.
fn open_strip(
    data_dir: Option<&Path>,
    command: &Command,
) -> Result<(StoreController, BrowseView), String> {
    let data_dir = data_dir.ok_or_else(|| {
        format!("`--data-dir` is required for `{}`", command.name())
    })?;
    let config = prepare_data_dir(data_dir)?;
    init_logging(&config.log_level, config.log_dir()).map_err(|err| err.to_string())?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command.name()
    );

    let mut store = StoreController::open(config.db_path()).map_err(report)?;
    let browse = BrowseView::new(&mut store).map_err(report)?;
    Ok((store, browse))
}

fn prepare_data_dir(data_dir: &Path) -> Result<AppConfig, String> {
    let data_dir = std::path::absolute(data_dir).map_err(|err| {
        format!("invalid data directory `{}`: {err}", data_dir.display())
    })?;
    std::fs::create_dir_all(&data_dir).map_err(|err| {
        format!("cannot create data directory `{}`: {err}", data_dir.display())
    })?;
    Ok(AppConfig::new(data_dir))
}

fn render_strip(browse: &BrowseView) {
    if browse.tiles().is_empty() {
        println!("(no items)");
        return;
    }
    let anchor = browse.scroll_anchor();
    for tile in browse.tiles() {
        let marker = if Some(tile.id) == anchor { ">" } else { " " };
        println!("{marker} {}", render_tile(tile));
    }
}

fn render_tile(tile: &Tile) -> String {
    let created = DateTime::from_timestamp_millis(tile.timestamp)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| tile.timestamp.to_string());
    format!("{}  {created}  {}", tile.id, tile.caption)
}

fn report(err: PersistenceError) -> String {
    match err {
        PersistenceError::WriteFailed(_) | PersistenceError::ConstraintViolation(_) => {
            format!("error: {err}; nothing was changed, try again")
        }
        other => format!("error: {other}"),
    }
}
