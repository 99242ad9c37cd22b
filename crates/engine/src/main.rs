//! Playkit import - command line entry point.
//!
//! Reads a game document, imports it and prints the JSON report to stdout.
//! Exits non-zero when any game was rejected.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playkit_engine::infrastructure::app_settings::{ImportMode, ImportSettings};
use playkit_engine::App;

#[derive(Debug, Parser)]
#[command(name = "playkit-import", version, about = "Bulk import of game content")]
struct Cli {
    /// JSON document with one or more games
    file: PathBuf,

    /// `create` rejects existing games, `upsert` replaces them
    #[arg(long)]
    mode: Option<ImportMode>,

    /// Validate and report without writing anything
    #[arg(long)]
    dry_run: bool,

    /// SQLite database path
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment from repo root so `.env` works from any crate directory.
    load_dotenv_from_repo_root();

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playkit_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = apply_cli(ImportSettings::from_env(), &cli);

    let raw = tokio::fs::read_to_string(&cli.file)
        .await
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let app = App::connect(settings).await?;
    let report = app.use_cases.import.games.execute(&raw).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_failures() {
        tracing::warn!("Import finished with rejected games");
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Command line flags override environment settings.
fn apply_cli(mut settings: ImportSettings, cli: &Cli) -> ImportSettings {
    if let Some(mode) = cli.mode {
        settings.mode = mode;
    }
    if cli.dry_run {
        settings.dry_run = true;
    }
    if let Some(db) = cli.db.as_ref() {
        settings.database_path = db.clone();
    }
    settings
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
