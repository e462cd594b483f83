use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ratatui::crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod columns;
mod controller;
mod domain;
mod edits;
mod gateway;
mod inputter;
mod model;
mod reorder;
mod store;
mod ui;
mod view;

use columns::ColumnPrefs;
use controller::Controller;
use domain::{RowedConfig, RowedError};
use gateway::Gateway;
use model::{Model, Status};
use ui::TableUI;

/// Terminal editor for tabular records served over HTTP. Rows can be
/// reordered by dragging their handle with the mouse.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Base URL of the record server
    #[arg(short, long, default_value = "http://localhost:5000")]
    server: String,

    /// Column preferences file
    #[arg(short, long, default_value = "columnPreferences.json")]
    prefs: String,

    /// Rows shown per page
    #[arg(short, long, default_value_t = 20)]
    rows_per_page: usize,

    /// Write a debug log to this file
    #[arg(long)]
    log_file: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), RowedError> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let cfg = RowedConfig::default()
        .server(cli.server)
        .prefs_path(expand_path(&cli.prefs))
        .rows_per_page(cli.rows_per_page.max(1));

    let gateway = Gateway::new(cfg.server.clone());
    let store = match gateway.fetch_records() {
        Ok(store) => store,
        Err(e) => {
            warn!("Could not fetch records from {}: {:?}", cfg.server, e);
            gateway.fallback_store()
        }
    };
    info!("Loaded {} records", store.len());

    let prefs = ColumnPrefs::load(&cfg.prefs_path, &store);

    let ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let size = terminal.size()?;
    let mut model = Model::init(
        cfg,
        store,
        prefs,
        gateway,
        size.width as usize,
        size.height as usize,
    );

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    execute!(std::io::stdout(), DisableMouseCapture)?;
    Ok(())
}

fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(e) => {
            warn!("Could not expand {raw}: {e}");
            PathBuf::from(raw)
        }
    }
}

fn init_logging(path: &str) -> Result<(), RowedError> {
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rowed=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}
