use std::path::PathBuf;

use anyhow::{Context, Result};
use cell_cli::{AnalysisConfig, CellAnalyzer};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Segment cells in a microscopy image and measure their shape
#[derive(Parser, Debug)]
#[command(name = "cellscope")]
#[command(about = "Detect cells, write an annotated image and a feature table", long_about = None)]
struct Args {
    /// Input image file path
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory for the annotated image and the CSV report
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Run configuration (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Boundary stroke width in pixels
    #[arg(long)]
    stroke_width: Option<u32>,

    /// Gaussian kernel size (odd)
    #[arg(long)]
    kernel_size: Option<u32>,

    /// Feature extraction threads (0 = one per CPU)
    #[arg(short, long)]
    threads: Option<usize>,
}

impl Args {
    fn into_config(self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(width) = self.stroke_width {
            config.vision.stroke_width = width;
        }
        if let Some(kernel_size) = self.kernel_size {
            config.vision.kernel_size = kernel_size;
        }
        if let Some(threads) = self.threads {
            config.n_threads = threads;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().into_config()?;
    let analyzer = CellAnalyzer::from_config(config).context("invalid run configuration")?;

    let summary = analyzer.run().context("cell analysis failed")?;
    info!(
        cells = summary.cell_count,
        image = %summary.annotated_path.display(),
        report = %summary.report_path.display(),
        "Done"
    );
    Ok(())
}
