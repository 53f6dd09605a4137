//! vibes - a terminal oracle
//!
//! Reveal a fortune, ask it a question, and wait a day for the next one.
//! Run without arguments to launch the TUI, use subcommands for CLI mode,
//! or `vibes serve` to run the API the client talks to.

use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vibes::api::VibesClient;
use vibes::cli::commands::{Cli, Commands};
use vibes::cli::{config, serve, vibe};
use vibes::core::config::Config;
use vibes::error::Result;
use vibes::tui::App;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.command.as_ref());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// The TUI owns the terminal, so it logs to a file instead of stderr
fn init_logging(command: Option<&Commands>) {
    let default_level = match command {
        Some(Commands::Serve(_)) | None => "info",
        Some(_) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if command.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    let log_file = Config::log_path().ok().and_then(|path| {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    match log_file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Config commands edit the file as stored, without overrides
    let command = match cli.command {
        Some(Commands::Config(args)) => return config::handle_config(args.command),
        other => other,
    };

    let mut settings = Config::load()?;
    if let Some(url) = cli.api_url.as_deref() {
        settings.set_api_url(url)?;
    }

    match command {
        None => run_tui(&settings).await,
        Some(Commands::Show) => vibe::handle_show(&settings).await,
        Some(Commands::Reveal) => vibe::handle_reveal(&settings).await,
        Some(Commands::Ask(args)) => vibe::handle_ask(&settings, &args.text()).await,
        Some(Commands::Serve(args)) => serve::handle_serve(&settings, args).await,
        Some(Commands::Config(_)) => Ok(()),
    }
}

/// Run the TUI application
async fn run_tui(settings: &Config) -> Result<()> {
    let client = VibesClient::from_config(settings)?;
    tracing::info!(api = %client.base_url(), "starting tui");

    let mut app = App::new(Arc::new(client), settings.tick_rate())
        .with_api_label(settings.api_url.clone());
    app.run().await
}
