//! The `collage fetch` command: download shared folders, then build a collage.

use anyhow::Context;
use clap::Args;
use collage_core::remote::normalize_folder_name;
use collage_core::{CollageCreator, Config, PublicDiskClient};
use std::path::{Path, PathBuf};

use super::build::{self, CollageArgs};

/// Arguments for the `fetch` command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Folder names inside the public share (`%20` is read as a space)
    #[arg(required = true)]
    pub folders: Vec<String>,

    /// Public key or link of the share [config: remote.public_key]
    #[arg(long, env = "COLLAGE_PUBLIC_KEY")]
    pub public_key: Option<String>,

    /// Local directory folders are downloaded into [config: remote.download_dir]
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    #[command(flatten)]
    pub collage: CollageArgs,
}

impl FetchArgs {
    fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(key) = &self.public_key {
            config.remote.public_key = key.clone();
        }
        if let Some(dir) = &self.download_dir {
            config.remote.download_dir = dir.clone();
        }
        self.collage.apply(config)?;
        if config.remote.public_key.trim().is_empty() {
            anyhow::bail!(
                "No public key given. Pass --public-key, set COLLAGE_PUBLIC_KEY, \
                 or set remote.public_key in the config file."
            );
        }
        Ok(())
    }
}

/// Execute the fetch command.
pub async fn execute(args: FetchArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config)?;
    // Fail on bad layout options before downloading anything.
    let creator = CollageCreator::new(&config)?;
    let client = PublicDiskClient::new(&config.remote);
    let dest_root = config.download_dir();

    let mut paths = Vec::new();
    for folder in &args.folders {
        paths.extend(download(&client, folder, &dest_root).await?);
    }
    if paths.is_empty() {
        anyhow::bail!("The requested folders contain no files");
    }
    tracing::info!(
        "Downloaded {} file(s) from {} folder(s)",
        paths.len(),
        args.folders.len()
    );

    let report = build::create(&creator, &config, &paths).await?;
    build::print_result(&report, args.collage.report)
}

/// Download every file of one folder, with a progress bar.
async fn download(
    client: &PublicDiskClient,
    folder: &str,
    dest_root: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let name = normalize_folder_name(folder);
    let pb = create_progress_bar(0);
    pb.set_message(name.clone());

    let written = client
        .download_folder(folder, dest_root, |_, done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await
        .with_context(|| format!("Failed to download folder {name:?}"))?;
    pb.finish_with_message(format!("{name}: done"));

    Ok(written)
}

/// Create a progress bar for folder downloads.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb
}
