mod app;
mod components;
mod config;
mod coordinator;
mod error;
mod event;
mod handler;
mod listing;
mod logging;
mod navigator;
mod selection;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::app::{App, DialogOutcome};
use crate::config::{AppConfig, GeneralConfig, ListingConfig, LoggingConfig};
use crate::coordinator::SelectionCoordinator;
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::listing::local::LocalListing;
use crate::listing::snapshot::SnapshotListing;
use crate::listing::ListingService;
use crate::tui::{install_panic_hook, Tui};

/// Pick files and whole directories in the terminal; the selection is
/// printed to stdout as JSON.
#[derive(Parser, Debug)]
#[command(name = "fsel", version, about)]
struct Cli {
    /// Directory offered as the source when none are configured
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Browse a JSON listing snapshot instead of the local filesystem
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Allow only a single file to be selected
    #[arg(long)]
    single: bool,

    /// List hidden entries
    #[arg(long)]
    show_hidden: bool,

    /// Log filter used when RUST_LOG is unset, e.g. "debug"
    #[arg(long)]
    log_level: Option<String>,

    /// Enable mouse support
    #[arg(long)]
    mouse: bool,
}

impl Cli {
    /// Flags given on the command line, as a partial config.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                multiple: self.single.then_some(false),
                mouse: self.mouse.then_some(true),
            },
            listing: ListingConfig {
                show_hidden: self.show_hidden.then_some(true),
                dirs_first: None,
            },
            logging: LoggingConfig {
                level: self.log_level.clone(),
                file: None,
            },
            ..AppConfig::default()
        }
    }
}

fn build_listing(cli: &Cli, config: &AppConfig) -> error::Result<Arc<dyn ListingService>> {
    if let Some(snapshot) = &cli.snapshot {
        let listing = SnapshotListing::load(snapshot)
            .map_err(|e| AppError::Config(format!("{}: {}", snapshot.display(), e)))?;
        return Ok(Arc::new(listing));
    }

    let path = cli.path.canonicalize().map_err(|_| {
        AppError::InvalidPath(format!("{} does not exist", cli.path.display()))
    })?;
    let listing = LocalListing::new(config.sources_or(&path))
        .show_hidden(config.show_hidden())
        .dirs_first(config.dirs_first());
    Ok(Arc::new(listing))
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    if let Err(e) = logging::init(&config.log_file(), config.log_level()) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let listing = build_listing(&cli, &config)?;
    let coordinator = SelectionCoordinator::new(listing, config.multiple());
    tracing::info!(multiple = config.multiple(), "dialog started");

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    let mut events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(coordinator, theme::resolve_theme(&config.theme), events.sender());

    // Loads the sources.
    app.back();

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::FetchComplete(done) => app.handle_fetch_complete(done),
        }

        if app.should_quit() {
            break;
        }
    }

    tui.restore()?;

    if let Some(DialogOutcome::Confirmed(result)) = app.outcome {
        tracing::info!(
            files = result.files.len(),
            directories = result.directories.len(),
            "selection confirmed"
        );
        let json = serde_json::to_string_pretty(&result)?;
        println!("{}", json);
    }
    Ok(())
}
