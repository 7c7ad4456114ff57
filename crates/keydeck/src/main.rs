//! Binary entrypoint for keydeck.
use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use deck_config::{Layout, SaveFile, Settings};
use deck_model::{ActionCatalog, Decoded, PersistenceCodec};
use logging as logshared;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*};

/// Line commands read by the headless loop.
mod console;
/// The headless run loop.
mod headless;
/// `check` and `dump` output.
mod report;

#[derive(Parser, Debug)]
#[command(name = "keydeck", about = "A programmable macro pad", version)]
/// Command-line interface for the `keydeck` binary.
struct Cli {
    /// Optional subcommand. Defaults to `run`.
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the settings file (defaults to ~/.keydeck/settings.toml)
    #[arg(long, value_name = "PATH", global = true)]
    settings: Option<PathBuf>,

    /// Layout descriptor to use
    #[arg(long, value_name = "PATH", global = true)]
    layout: Option<PathBuf>,

    /// Save file to read and write
    #[arg(long, value_name = "PATH", global = true)]
    save: Option<PathBuf>,

    /// Logging controls
    #[command(flatten)]
    log: logshared::LogArgs,
}

#[derive(Subcommand, Debug, Clone, Copy)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the layout and save file, then exit.
    Check,
    /// Print the decoded views as JSON.
    Dump,
    /// Run headless: chord lines on stdin drive the hotkey listener.
    Run,
}

/// Everything read from disk at startup.
pub struct Loaded {
    /// Resolved settings.
    pub settings: Settings,
    /// The validated layout.
    pub layout: Layout,
    /// Where saves go. `None` when the existing file could not be read.
    pub save_path: Option<PathBuf>,
    /// Action registry for this run.
    pub catalog: ActionCatalog,
    /// Decoded views, images and load issues.
    pub decoded: Decoded,
}

/// Load settings, layout and saved state. Only layout and settings errors
/// are returned; an unreadable save file starts a fresh set instead.
fn load(cli: &Cli) -> deck_config::Result<Loaded> {
    let settings = Settings::load(cli.settings.as_deref())?;
    let layout_path = settings.resolve_layout(cli.layout.as_deref());
    let layout = Layout::load(&layout_path)?;
    let save_path = settings.resolve_save_path(cli.save.as_deref());
    let (data, save_path) = match SaveFile::load(&save_path) {
        Ok(file) => (
            file.and_then(|f| f.layout(layout.name())),
            Some(save_path),
        ),
        Err(e) => {
            eprintln!("{}", e.pretty());
            warn!(path = %save_path.display(), "save_file_unreadable");
            (None, None)
        }
    };
    let catalog = ActionCatalog::standard();
    let decoded = PersistenceCodec::new(&catalog).decode(data.as_ref(), &layout);
    debug!(
        layout = layout.name(),
        views = decoded.views.len(),
        issues = decoded.report.issues.len(),
        "state_loaded"
    );
    Ok(Loaded {
        settings,
        layout,
        save_path,
        catalog,
        decoded,
    })
}

fn main() {
    let cli = Cli::parse();

    let final_spec = cli.log.spec();
    let env_filter = logshared::env_filter_from_spec(&final_spec);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    let loaded = match load(&cli) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("{}", e.pretty());
            process::exit(1);
        }
    };

    let code = match cli.command.unwrap_or(Command::Run) {
        Command::Check => report::check(&loaded),
        Command::Dump => report::dump(&loaded),
        Command::Run => headless::run(loaded),
    };
    process::exit(code);
}
