use std::sync::Arc;

use clap::{Parser, Subcommand};
use corkboard::config::{Config, ConfigError};
use corkboard::doc::Note;
use corkboard::engine::{Action, Engine, EngineCore};
use corkboard::reminder;
use corkboard::share::{ShareError, SharePanel, ShareService};
use corkboard::sync::SyncEngine;
use corkboard::sync::remote::{HttpTransport, RemoteStore, SyncError};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("remote store error: {0}")]
    Sync(#[from] SyncError),
    #[error("{0}")]
    Share(#[from] ShareError),
    #[error("offline mode is on; unset CORKBOARD_OFFLINE to reach the store")]
    Offline,
    #[error("no user; set CORKBOARD_USER_ID or pass --user-id")]
    NoUser,
    #[error("{0}")]
    ShareLink(String),
}

#[derive(Parser, Debug)]
#[command(name = "corkboard", about = "Headless whiteboard client")]
struct Cli {
    /// Overrides CORKBOARD_USER_ID.
    #[arg(long)]
    user_id: Option<String>,

    /// Overrides CORKBOARD_WHITEBOARD_ID.
    #[arg(long)]
    whiteboard_id: Option<Uuid>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the whiteboard and list its notes.
    Load,
    /// Print the whiteboard's share URL, creating a share if needed.
    Share,
    /// Print the whiteboard a share id points at.
    Resolve { share_id: String },
    /// Remove every ink stroke from the whiteboard.
    ClearDrawings,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "no .env file loaded");
    }

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if cli.user_id.is_some() {
        config.user_id = cli.user_id;
    }
    if cli.whiteboard_id.is_some() {
        config.whiteboard_id = cli.whiteboard_id;
    }

    let transport = HttpTransport::new(&config.api_base_url, config.api_token.clone(), config.timeouts)?;
    let remote = RemoteStore::new(Arc::new(transport));

    match cli.command {
        Command::Load => run_load(&config, remote).await,
        Command::Share => run_share(&config, remote).await,
        Command::Resolve { share_id } => run_resolve(&config, remote, &share_id).await,
        Command::ClearDrawings => run_clear_drawings(&config, remote).await,
    }
}

async fn loaded_engine(config: &Config, remote: RemoteStore) -> Result<Engine, CliError> {
    let sync = SyncEngine::new(remote, config.sync_options());
    let mut engine = Engine::new(EngineCore::new(), sync);
    if !engine.load().await? {
        return Err(if engine.sync().is_offline() { CliError::Offline } else { CliError::NoUser });
    }
    Ok(engine)
}

async fn run_load(config: &Config, remote: RemoteStore) -> Result<(), CliError> {
    let engine = loaded_engine(config, remote).await?;
    let doc = &engine.core.doc;
    println!(
        "whiteboard {}: {} notes, {} strokes",
        engine.sync().whiteboard_id(),
        doc.notes().len(),
        doc.strokes().len()
    );
    for note in doc.sorted_notes() {
        println!("{}", summary(note));
    }
    Ok(())
}

async fn run_share(config: &Config, remote: RemoteStore) -> Result<(), CliError> {
    let engine = loaded_engine(config, remote.clone()).await?;
    let service = ShareService::new(remote, &config.public_base_url);
    let mut panel = SharePanel::new(true);
    service.open(&mut panel, engine.sync().whiteboard_id()).await;
    match (panel.url, panel.error) {
        (Some(url), _) => {
            println!("{url}");
            Ok(())
        }
        (None, error) => Err(CliError::ShareLink(error.unwrap_or_default())),
    }
}

async fn run_resolve(config: &Config, remote: RemoteStore, share_id: &str) -> Result<(), CliError> {
    let service = ShareService::new(remote, &config.public_base_url);
    let whiteboard_id = service.resolve(share_id).await?;
    println!("{whiteboard_id}");
    Ok(())
}

async fn run_clear_drawings(config: &Config, remote: RemoteStore) -> Result<(), CliError> {
    let mut engine = loaded_engine(config, remote).await?;
    let actions = engine.clear_drawings();
    engine.settle().await;

    let cleared: usize = actions
        .iter()
        .map(|a| match a {
            Action::StrokesDeleted(ids) => ids.len(),
            _ => 0,
        })
        .sum();
    for failure in engine.sync_failures() {
        warn!(site = failure.site, entity_id = %failure.entity_id, message = %failure.message, "write failed");
    }
    println!("cleared {cleared} strokes");
    Ok(())
}

/// One line per note: id, kind, bounds, z-index and title (plus date for reminders).
fn summary(note: &Note) -> String {
    let mut line = format!(
        "{} {:?} ({:.0}, {:.0}) {:.0}x{:.0} z={} {}",
        note.id,
        note.kind,
        note.x,
        note.y,
        note.width,
        note.height,
        note.z_index,
        note.title()
    );
    if note.is_reminder() {
        line.push_str(" | ");
        line.push_str(&reminder::format_date_label(reminder::date_value(&note.content)));
    }
    line
}
