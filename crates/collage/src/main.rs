//! Collage CLI - compose folders of images into a single grid collage.
//!
//! Images are placed column by column (top to bottom, then left to right)
//! on a white canvas with configurable spacing and margin, and saved as
//! one image file (TIFF by default).
//!
//! # Usage
//!
//! ```bash
//! # Build a collage from local files and folders
//! collage build photos/ extra.jpg --rows 3 -o collage.png
//!
//! # Download folders from a public share, then build
//! collage fetch "Summer%202024" Winter --public-key https://disk.example/d/abc
//!
//! # View configuration
//! collage config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Collage - compose images into a single grid collage.
#[derive(Parser, Debug)]
#[command(name = "collage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a collage from local image files and folders
    Build(cli::build::BuildArgs),

    /// Download folders from a public share and build a collage from them
    Fetch(cli::fetch::FetchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match collage_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `collage config path`."
            );
            collage_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Collage v{}", collage_core::VERSION);

    match cli.command {
        Commands::Build(args) => cli::build::execute(args, config).await,
        Commands::Fetch(args) => cli::fetch::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config).await,
    }
}
