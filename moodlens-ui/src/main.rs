//! moodlens - terminal client for the music-inspired image stylization service
//!
//! Subcommands drive the same UI core the interactive shell uses:
//! - `search <query>`: debounced song search, printed as a result list
//! - `generate --image <path> --song <query>`: pick, select, submit, view
//! - `health`: backend health check
//! - `shell`: line-oriented interactive session

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use moodlens_common::events::UiEvent;
use moodlens_common::ClientConfig;
use moodlens_ui::backend::{HttpBackend, StylizeBackend};
use moodlens_ui::image_picker::ImageCandidate;
use moodlens_ui::search::SearchStatus;
use moodlens_ui::viewer::ImageSlot;
use moodlens_ui::AppState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

mod shell;

#[derive(Parser)]
#[command(name = "moodlens")]
#[command(version, about = "Stylize a photo after the mood of a song")]
struct Cli {
    /// Backend base URL (overrides MOODLENS_API_URL and config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (default: <config dir>/moodlens/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the catalog for songs
    Search {
        /// Free text; at least two characters
        query: String,
    },

    /// Stylize an image after a song
    Generate {
        /// JPEG, PNG or WebP image, at most 10MB
        #[arg(long)]
        image: PathBuf,

        /// Song search text
        #[arg(long)]
        song: String,

        /// Which search result to use (1-based)
        #[arg(long, default_value_t = 1)]
        pick: usize,

        /// Download the original and stylized images into this directory
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Check that the backend is up
    Health,

    /// Interactive session
    Shell,
}

/// Level used while the config file (and its logging level) is being read
const BOOTSTRAP_LOG_LEVEL: &str = "info";

/// `RUST_LOG` if set, else `default_level`
fn log_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn subscriber_with<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config resolution logs through a scoped subscriber; the global one
    // needs the configured level first.
    let config = tracing::subscriber::with_default(
        subscriber_with(log_filter(BOOTSTRAP_LOG_LEVEL), std::io::stderr),
        || ClientConfig::resolve(cli.api_url.as_deref(), cli.config.as_deref()),
    )
    .context("Failed to load configuration")?;

    tracing::subscriber::set_global_default(subscriber_with(
        log_filter(&config.logging.level),
        std::io::stderr,
    ))
    .context("Failed to install tracing subscriber")?;

    info!(
        "Starting MoodLens v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Backend: {}", config.api_url);

    let backend = Arc::new(HttpBackend::new(config.clone())?);

    match cli.command {
        Command::Search { query } => search(config, backend, query).await,
        Command::Generate {
            image,
            song,
            pick,
            save,
        } => generate(config, backend, &image, song, pick, save.as_deref()).await,
        Command::Health => health(&backend).await,
        Command::Shell => {
            let mut state = AppState::new(config, backend.clone());
            shell::run(&mut state, &backend).await
        }
    }
}

async fn search(config: ClientConfig, backend: Arc<HttpBackend>, query: String) -> Result<()> {
    let state = AppState::new(config, backend);
    let snapshot = state.song_panel.input_and_settle(query).await;
    print!("{}", shell::render_panel(&snapshot, state.config.min_query_len));
    Ok(())
}

async fn generate(
    config: ClientConfig,
    backend: Arc<HttpBackend>,
    image: &Path,
    song: String,
    pick: usize,
    save: Option<&Path>,
) -> Result<()> {
    let mut state = AppState::new(config, backend.clone());

    let candidate = ImageCandidate::from_path(image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;
    if !state.image_picker.select(candidate) {
        bail!(state.image_picker.notice().unwrap_or_default());
    }

    let snapshot = state.song_panel.input_and_settle(song).await;
    match snapshot.status {
        SearchStatus::Results => {}
        SearchStatus::Empty | SearchStatus::TooShort => {
            bail!(
                "Song search needs at least {} characters",
                state.config.min_query_len
            )
        }
        _ => bail!(snapshot
            .no_results_message()
            .unwrap_or_else(|| "No songs found".to_string())),
    }

    let selected = match pick.checked_sub(1) {
        Some(index) => state.song_panel.select_index(index).await,
        None => None,
    }
    .ok_or_else(|| anyhow!("--pick {} is out of range (1-{})", pick, snapshot.results.len()))?;
    println!("Song: {}", selected.label());

    let progress = spawn_progress_printer(&state);
    let outcome = state.generate().await;
    progress.abort();

    if let Err(e) = outcome {
        error!("Generation failed: {}", e);
        bail!("Error: {}", e.user_message());
    }

    let Some(viewer) = state.viewer.as_ref() else {
        bail!("Error: no result returned");
    };
    println!();
    print!("{}", viewer.render());

    if let Some(dir) = save {
        tokio::fs::create_dir_all(dir).await?;
        for slot in [ImageSlot::Original, ImageSlot::Stylized] {
            let url = viewer.image_url(slot);
            let path = save_image(&backend, url, dir).await?;
            println!("Saved {} image to {}", slot.title().to_lowercase(), path.display());
        }
    }

    Ok(())
}

/// Print phase labels to stderr while a submission runs
fn spawn_progress_printer(state: &AppState) -> tokio::task::JoinHandle<()> {
    let mut rx = state.events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            if let UiEvent::PhaseChanged { phase, .. } = event {
                if !phase.is_idle() {
                    eprintln!("{}", phase.label());
                }
            }
        }
    })
}

async fn save_image(backend: &HttpBackend, url: &str, dir: &Path) -> Result<PathBuf> {
    let bytes = backend
        .fetch_image(url)
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    let file_name = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("image");
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

async fn health(backend: &HttpBackend) -> Result<()> {
    let status = backend
        .health()
        .await
        .with_context(|| format!("Backend at {} is unreachable", backend.config().api_url))?;
    println!("{}: {}", status.status, status.message);
    Ok(())
}
