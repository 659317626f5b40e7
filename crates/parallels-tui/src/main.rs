use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parallels_core::{
    corpus, html, load, parse_document, render_document, Config, Source, LOAD_FAILURE_MESSAGE,
};
use parallels_core::loader::{DEFAULT_MAPPING_SOURCE, DEFAULT_TEXT_SOURCE};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod layout;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "parallels")]
#[command(about = "Read Luke chapter by chapter with its Josephus parallels", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Luke text: a file path or an http(s) URL
    #[arg(long, global = true)]
    text: Option<String>,

    /// Parallels mapping JSON: a file path or an http(s) URL
    #[arg(long, global = true)]
    mapping: Option<String>,

    /// Write log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read interactively in the terminal (default)
    Read,
    /// Write a standalone HTML page
    Export {
        /// Output HTML file
        #[arg(short, long, default_value = "luke.html")]
        out: PathBuf,
    },
    /// Build the parallels mapping from the Josephus text and the parallels table
    Build {
        /// Josephus text with section markers
        #[arg(long, default_value = "josephus.txt")]
        josephus: PathBuf,
        /// Whitespace separated parallels table
        #[arg(long, default_value = "input_file_0.csv")]
        csv: PathBuf,
        /// Output mapping file
        #[arg(short, long, default_value = DEFAULT_MAPPING_SOURCE)]
        out: PathBuf,
    },
}

/// Logs go to the log file when one is given. Without one, the reader stays
/// silent so the terminal is left to the UI.
fn init_logging(log_file: Option<&Path>, to_stderr: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("PARALLELS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    } else if to_stderr {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Read);

    init_logging(cli.log_file.as_deref(), !matches!(command, Commands::Read))?;

    // Load config
    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "could not read config, using defaults");
        Config::new()
    });

    let text = Source::parse(
        cli.text
            .as_deref()
            .or(config.text_source.as_deref())
            .unwrap_or(DEFAULT_TEXT_SOURCE),
    );
    let mapping = Source::parse(
        cli.mapping
            .as_deref()
            .or(config.mapping_source.as_deref())
            .unwrap_or(DEFAULT_MAPPING_SOURCE),
    );

    match command {
        Commands::Read => read(&text, &mapping, &config).await,
        Commands::Export { out } => export(&text, &mapping, &out).await,
        Commands::Build { josephus, csv, out } => build(&josephus, &csv, &out).await,
    }
}

async fn read(text: &Source, mapping: &Source, config: &Config) -> Result<()> {
    let loaded = load(text, mapping).await;
    let mut app = App::new(loaded, config.panel_width());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }
    }
    Ok(())
}

async fn export(text: &Source, mapping: &Source, out: &Path) -> Result<()> {
    let loaded = match load(text, mapping).await {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("{}", LOAD_FAILURE_MESSAGE);
            return Err(err.into());
        }
    };

    let doc = parse_document(&loaded.text);
    let ops = render_document(&doc, &loaded.mapping);
    let page = html::render_page("Luke with Josephus parallels", &ops, &loaded.mapping)?;

    tokio::fs::write(out, page)
        .await
        .with_context(|| format!("could not write {}", out.display()))?;

    println!(
        "Wrote {} ({} verses, {} chapters)",
        out.display(),
        doc.verse_count(),
        doc.chapters.len()
    );
    Ok(())
}

async fn build(josephus: &Path, csv: &Path, out: &Path) -> Result<()> {
    let stats = corpus::build_file(josephus, csv, out).await?;
    println!(
        "Wrote {}: {} parallels from {} references ({} without text)",
        out.display(),
        stats.emitted,
        stats.references,
        stats.missing_text
    );
    Ok(())
}
