use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playlist_palette::models::AppConfig;
use playlist_palette::services::{
    ManifestSource, PalettePipeline, RunSummary, SpotifyCredentials, SpotifyPlaylist, TrackSource,
};

const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Parser)]
#[command(name = "playlist-palette")]
#[command(about = "Dominant-color palette from the album covers of a playlist")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a palette from a Spotify playlist
    Playlist {
        /// Spotify playlist ID
        playlist_id: String,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Build a palette from a YAML track manifest
    Manifest {
        /// Manifest file path
        path: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Config file (default: config.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Concurrent image downloads
    #[arg(long)]
    max_workers: Option<usize>,

    /// Save album images and the palette under the output directory
    #[arg(long)]
    save_images: bool,

    /// Fixed number of palette colors
    #[arg(short = 'k', long, conflicts_with = "auto_k")]
    clusters: Option<usize>,

    /// Pick the number of colors automatically from a range, e.g. "2-10"
    #[arg(long, value_parser = parse_k_range)]
    auto_k: Option<(usize, usize)>,

    /// Seed for every random choice
    #[arg(long)]
    seed: Option<u64>,

    /// Write the palette PNG to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RunArgs {
    /// Command-line values override the config file
    fn apply(&self, config: &mut AppConfig) {
        if let Some(max_workers) = self.max_workers {
            config.pipeline.max_workers = max_workers;
        }
        if self.save_images {
            config.pipeline.save_album_images = true;
        }
        if let Some(k) = self.clusters {
            config.clustering.n_clusters = k;
            config.selection.k_range = None;
        }
        if let Some(range) = self.auto_k {
            config.selection.k_range = Some(range);
        }
        if let Some(seed) = self.seed {
            config.clustering.seed = Some(seed);
        }
        if let Some(output) = &self.output {
            config.output.palette_path = Some(output.clone());
        }
    }

    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AppConfig::load_or_default(Path::new(DEFAULT_CONFIG)),
        };
        self.apply(&mut config);
        Ok(config)
    }
}

fn parse_k_range(value: &str) -> Result<(usize, usize), String> {
    let (min, max) = value
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{value}'"))?;
    let min: usize = min
        .trim()
        .parse()
        .map_err(|_| format!("invalid minimum '{min}'"))?;
    let max: usize = max
        .trim()
        .parse()
        .map_err(|_| format!("invalid maximum '{max}'"))?;
    if min < 2 || min > max {
        return Err(format!("need 2 <= MIN <= MAX, got {min}-{max}"));
    }
    Ok((min, max))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Playlist { playlist_id, run }) => {
            init_tracing();
            let config = run.load_config()?;
            let credentials = spotify_credentials(&config)?;
            let source = SpotifyPlaylist::new(
                playlist_id,
                credentials,
                &config.spotify,
                Duration::from_secs(config.pipeline.request_timeout_secs),
            )?;
            run_palette(config, &source).await
        }
        Some(Commands::Manifest { path, run }) => {
            init_tracing();
            let config = run.load_config()?;
            run_palette(config, &ManifestSource::new(path)).await
        }
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playlist_palette=info,lab_cluster=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Environment variables win over the config file
fn spotify_credentials(config: &AppConfig) -> anyhow::Result<SpotifyCredentials> {
    let client_id = std::env::var("SPOTIFY_CLIENT_ID")
        .ok()
        .or_else(|| config.spotify.client_id.clone());
    let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
        .ok()
        .or_else(|| config.spotify.client_secret.clone());

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Ok(SpotifyCredentials {
            client_id,
            client_secret,
        }),
        _ => anyhow::bail!(
            "Spotify credentials missing: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET \
             or spotify.client_id / spotify.client_secret in the config"
        ),
    }
}

async fn run_palette(config: AppConfig, source: &dyn TrackSource) -> anyhow::Result<()> {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling downloads");
            let _ = cancel_tx.send(true);
        }
    });

    let pipeline = PalettePipeline::new(Arc::new(config)).with_cancellation(cancel_rx);
    let summary = pipeline.run(source).await.context("Palette run failed")?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "\n{}: {} of {} album images used, K = {}",
        summary.collection, summary.images_used, summary.records, summary.k
    );

    if let Some(report) = &summary.selection {
        println!("\nCluster count scores:");
        for score in &report.scores {
            let marker = if score.k == report.best_k { " *" } else { "" };
            println!(
                "  K={:<3} silhouette {:>7.4}  composite {:>7.4}{marker}",
                score.k, score.silhouette, score.composite
            );
        }
    }

    println!("\nPalette:");
    for entry in summary.palette.iter() {
        println!(
            "  {}  {:>5.1}%",
            entry.color.to_hex(),
            entry.proportion * 100.0
        );
    }

    if !summary.failures.is_empty() {
        println!("\nSkipped {} track(s):", summary.failures.len());
        for failure in &summary.failures {
            println!("  {failure}");
        }
    }

    if !summary.saved_albums.is_empty() {
        println!("\nSaved {} album image(s)", summary.saved_albums.len());
    }
    match &summary.palette_path {
        Some(path) => println!("Palette written to {}", path.display()),
        None => println!("Palette not saved (use --save-images or --output)"),
    }
}

/// Display configuration and usage
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("Playlist Palette v{VERSION}");
    println!("Dominant colors of a playlist's album covers\n");

    let config_path = Path::new(DEFAULT_CONFIG);
    let config = if config_path.exists() {
        println!("Config: {DEFAULT_CONFIG}");
        AppConfig::load_or_default(config_path)
    } else {
        println!("Config: defaults ({DEFAULT_CONFIG} not found)");
        AppConfig::default()
    };

    let set = |name: &str| {
        if std::env::var(name).is_ok() {
            "set"
        } else {
            "(not set)"
        }
    };
    println!("\nEnvironment Variables:");
    println!("  SPOTIFY_CLIENT_ID     = {}", set("SPOTIFY_CLIENT_ID"));
    println!("  SPOTIFY_CLIENT_SECRET = {}", set("SPOTIFY_CLIENT_SECRET"));

    println!("\nSettings:");
    println!("  Album shape:   {}", config.image.album_shape);
    println!("  Max workers:   {}", config.pipeline.max_workers);
    match config.selection.k_range {
        Some((min, max)) => println!("  Clusters:      auto, {min}-{max}"),
        None => println!("  Clusters:      {}", config.clustering.n_clusters),
    }
    println!("  Palette shape: {}", config.output.palette_shape);
    println!("  Output dir:    {}", config.output.dir.display());

    println!("\nCommands:");
    println!("  playlist-palette playlist <ID>     Palette from a Spotify playlist");
    println!("  playlist-palette manifest <PATH>   Palette from a YAML track list");
    println!("\nRun 'playlist-palette --help' for more details.");
}
