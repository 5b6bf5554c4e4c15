use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use genscan_cli::batch::{collect_images, run_batch, CsvResultWriter};
use genscan_cli::init_tracing;
use genscan_core::validation::validate_threshold;
use genscan_core::Config;
use genscan_detector::Detector;

#[derive(Parser, Debug)]
#[command(name = "batch_detect")]
#[command(about = "Run every image in a directory through AI-generation detection and write a CSV")]
struct Args {
    /// Directory containing images to process
    #[arg(long, short = 'd')]
    directory: PathBuf,

    /// Output CSV file
    #[arg(long, short = 'o', default_value = "ai_generation_results.csv")]
    output: PathBuf,

    /// Detection threshold in [0, 1] (default: DEFAULT_THRESHOLD from config)
    #[arg(long, short = 't')]
    threshold: Option<f64>,

    /// Pause between images, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    let threshold = args.threshold.unwrap_or(config.input.default_threshold);
    validate_threshold(threshold)?;

    let images = collect_images(&args.directory, &config.input.allowed_extensions)?;
    println!("Found {} images to process", images.len());
    println!("Using threshold: {}", threshold);

    let detector = Detector::from_config(config.detector.clone())?;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    let mut writer = CsvResultWriter::new(BufWriter::new(file))?;

    let summary = run_batch(
        &detector,
        &images,
        threshold,
        Duration::from_millis(args.delay_ms),
        &mut writer,
    )
    .await?;

    println!(
        "Processed {} images ({} flagged, {} failed). Results saved to {}",
        summary.processed,
        summary.flagged,
        summary.failed,
        args.output.display()
    );

    Ok(())
}
