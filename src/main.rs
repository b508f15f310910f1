//! Chess grading lookup CLI
//!
//! Reads query lines (`Name` or `Name, Club`) from files or stdin and prints
//! the resolved grading records as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{error, info, warn};

use chess_grading::infrastructure::{init_logging_with_config, ConfigManager};
use chess_grading::{BatchResolution, ClubDirectory, GradingService, RemoteGradingBackend};

const QUIT_COMMANDS: &[&str] = &["q", "quit", "exit"];

#[derive(Parser)]
#[command(name = "chess-grading")]
#[command(about = "Look up Chess Scotland gradings for a list of players", long_about = None)]
struct Cli {
    /// Files with one query per line; stdin when omitted
    files: Vec<PathBuf>,

    /// Configuration file (defaults to the per-user config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Club reference file, overriding the configured path
    #[arg(long)]
    clubs: Option<PathBuf>,

    /// Print the club reference list and exit
    #[arg(long, default_value = "false")]
    list_clubs: bool,

    /// Read blocks of queries separated by an empty line until `q`
    #[arg(long, short, default_value = "false")]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = ConfigManager::new()?;
    let mut config = manager
        .load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(clubs) = cli.clubs {
        config.clubs.path = clubs;
    }

    init_logging_with_config(&config.logging)?;

    let clubs = ClubDirectory::load(&config.clubs.path);
    if cli.list_clubs {
        print_json(&clubs.clubs())?;
        return Ok(());
    }

    let backend = RemoteGradingBackend::new(config.endpoint.clone(), config.http.clone())?;
    let service = GradingService::new(backend, clubs, config.resolver.clone())?;

    if cli.interactive {
        run_interactive(&service).await
    } else {
        let input = read_input(&cli.files).await?;
        let batch = service.resolve_batch(input.lines()).await?;
        report_failures(&batch);
        print_json(&batch)
    }
}

async fn read_input(files: &[PathBuf]) -> Result<String> {
    if files.is_empty() {
        let mut input = String::new();
        tokio::io::stdin()
            .read_to_string(&mut input)
            .await
            .context("Failed to read queries from stdin")?;
        return Ok(input);
    }

    let mut input = String::new();
    for path in files {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        input.push_str(&content);
        input.push('\n');
    }
    Ok(input)
}

/// Resolve one block per empty-line-terminated group, sharing the cache
async fn run_interactive(service: &GradingService<RemoteGradingBackend>) -> Result<()> {
    info!("Interactive mode: enter queries, an empty line to search, 'q' to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut block: Vec<String> = Vec::new();

    loop {
        prompt(block.is_empty())?;
        let line = lines.next_line().await.context("Failed to read stdin")?;

        let done = match &line {
            None => true,
            Some(text) => QUIT_COMMANDS.contains(&text.trim().to_lowercase().as_str()),
        };

        match line {
            Some(text) if !done && !text.trim().is_empty() => {
                block.push(text);
                continue;
            }
            _ => {}
        }

        if !block.is_empty() {
            match service.resolve_batch(block.drain(..)).await {
                Ok(batch) => {
                    report_failures(&batch);
                    print_json(&batch)?;
                }
                // A failed bootstrap only loses this block
                Err(e) => error!("Lookup failed: {}", e),
            }
        }

        if done {
            return Ok(());
        }
    }
}

fn prompt(first_line: bool) -> Result<()> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{}", if first_line { "grading> " } else { "       > " })?;
    stderr.flush()?;
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise results")?;
    println!("{json}");
    Ok(())
}

fn report_failures(batch: &BatchResolution) {
    for raw in batch.transport_failures() {
        warn!("'{}' may be incomplete: a search request failed", raw);
    }
}
