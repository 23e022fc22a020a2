//! The `collage build` command: compose local images into a collage.

use anyhow::Context;
use clap::{Args, ValueEnum};
use collage_core::{CellSizing, CollageCreator, CollageReport, Config, OutputFormat};
use std::path::PathBuf;

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Image files or directories, in collage order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub collage: CollageArgs,
}

/// Collage options shared by `build` and `fetch`.
///
/// Every option overrides the matching config value when given.
#[derive(Args, Debug, Default)]
pub struct CollageArgs {
    /// Output file [config: output.path]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format; inferred from --output's extension when omitted
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Number of grid rows [config: layout.rows]
    #[arg(long)]
    pub rows: Option<u32>,

    /// Pixels between neighbouring cells [config: layout.spacing]
    #[arg(long)]
    pub spacing: Option<u32>,

    /// Pixels between the grid and the canvas edge [config: layout.margin]
    #[arg(long)]
    pub margin: Option<u32>,

    /// How cell sizes are derived [config: layout.cell_sizing]
    #[arg(long, value_enum)]
    pub cell_sizing: Option<CellSizingArg>,

    /// Number of parallel decode workers [config: processing.parallel_workers]
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Print a JSON report of the layout to stdout
    #[arg(long)]
    pub report: bool,
}

/// Output formats accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    #[value(alias = "tif")]
    Tiff,
    Png,
    #[value(alias = "jpg")]
    Jpeg,
    Bmp,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tiff => OutputFormat::Tiff,
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
            FormatArg::Bmp => OutputFormat::Bmp,
        }
    }
}

/// Cell sizing modes accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CellSizingArg {
    /// Every cell takes the first image's size
    Uniform,
    /// Each column/row is as large as its largest image
    PerTrack,
}

impl From<CellSizingArg> for CellSizing {
    fn from(arg: CellSizingArg) -> Self {
        match arg {
            CellSizingArg::Uniform => CellSizing::Uniform,
            CellSizingArg::PerTrack => CellSizing::PerTrack,
        }
    }
}

impl CollageArgs {
    /// Write the given options into `config`, then re-validate it.
    pub fn apply(&self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(format) = self.resolve_format() {
            config.output.format = format.to_string();
        }
        if let Some(rows) = self.rows {
            config.layout.rows = rows;
        }
        if let Some(spacing) = self.spacing {
            config.layout.spacing = spacing;
        }
        if let Some(margin) = self.margin {
            config.layout.margin = margin;
        }
        if let Some(sizing) = self.cell_sizing {
            config.layout.cell_sizing = sizing.into();
        }
        if let Some(parallel) = self.parallel {
            config.processing.parallel_workers = parallel;
        }
        config.validate().context("Invalid collage options")?;
        Ok(())
    }

    /// `--format` wins; otherwise a recognised `--output` extension.
    fn resolve_format(&self) -> Option<OutputFormat> {
        self.format
            .map(OutputFormat::from)
            .or_else(|| self.output.as_deref().and_then(OutputFormat::from_path))
    }
}

/// Execute the build command.
pub async fn execute(args: BuildArgs, mut config: Config) -> anyhow::Result<()> {
    args.collage.apply(&mut config)?;
    let creator = CollageCreator::new(&config)?;

    let paths = creator.discover(&args.inputs);
    if paths.is_empty() {
        anyhow::bail!("No images found in the given inputs");
    }
    tracing::info!("Building collage from {} image(s)", paths.len());

    let report = create(&creator, &config, &paths).await?;
    print_result(&report, args.collage.report)
}

/// Build and save the collage described by `config`.
pub async fn create(
    creator: &CollageCreator,
    config: &Config,
    paths: &[PathBuf],
) -> anyhow::Result<CollageReport> {
    let output = config.output_path();
    let format = config.output_format()?;
    creator
        .create_and_save_concurrent(paths, &output, format)
        .await
        .with_context(|| format!("Failed to create collage at {}", output.display()))
}

/// Print either the JSON report or a one-line summary.
pub fn print_result(report: &CollageReport, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", report.to_json(true)?);
    } else {
        let (width, height) = report.layout.canvas_size();
        println!(
            "Saved {}x{} collage of {} image(s) to {}",
            width,
            height,
            report.image_count,
            report.output.display()
        );
    }
    Ok(())
}
