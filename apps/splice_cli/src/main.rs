//! splice: command-line front end for the timeline core.
//!
//! Usage:
//!   splice probe <FILES>...      Print ffprobe metadata for media files
//!   splice assemble <FILES>...   Lay files out on a new timeline and print it

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use splice_core::config::EditorConfig;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "splice", about = "Timeline assembly for media files", version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print ffprobe metadata for media files
    Probe {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Import files, place them back to back and print the project
    Assemble {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Project name
        #[arg(short, long, default_value = "Untitled Project")]
        name: String,

        /// Resolution preset: 1080p, 1080p60, 720p, 4k, shorts
        #[arg(long)]
        preset: Option<String>,

        /// Where thumbnails are cached while probing
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Skip thumbnail and waveform extraction
        #[arg(long)]
        fast: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EditorConfig::default(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    logging::init_logging(&config.logging);

    match cli.command {
        Commands::Probe { files } => commands::probe::run(files).await,
        Commands::Assemble {
            files,
            name,
            preset,
            cache_dir,
            fast,
        } => commands::assemble::run(config, files, name, preset, cache_dir, fast).await,
    }
}
