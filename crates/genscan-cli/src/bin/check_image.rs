use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use genscan_cli::init_tracing;
use genscan_cli::server_client::{RetryPolicy, ServerClient};

#[derive(Parser, Debug)]
#[command(name = "check_image")]
#[command(about = "Send one image to a running genscan-api server and print the verdict")]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:8000")]
    url: String,

    /// Path to the image
    #[arg(long)]
    image: PathBuf,

    /// Detection threshold in [0, 1] (server default when omitted)
    #[arg(long)]
    threshold: Option<f64>,

    /// Total attempts for transport failures and 5xx responses
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Delay between attempts, in seconds
    #[arg(long, default_value_t = 5)]
    retry_delay_secs: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let client = ServerClient::new(&args.url, Duration::from_secs(args.timeout_secs))?;

    match client.health().await {
        Ok(status) => println!("Server status: {}", status),
        Err(e) => println!("Server connection error: {:#}", e),
    }

    let size = tokio::fs::metadata(&args.image)
        .await
        .with_context(|| format!("Image {} not found", args.image.display()))?
        .len();
    println!("File size: {:.2}MB", size as f64 / 1024.0 / 1024.0);

    let policy = RetryPolicy {
        attempts: args.retries,
        delay: Duration::from_secs(args.retry_delay_secs),
    };
    let result = client
        .detect_file(&args.image, args.threshold, &policy)
        .await?;

    println!("\nResults:");
    println!("Filename: {}", result.filename);
    println!("Is AI Generated: {}", result.is_ai_generated);
    println!("Confidence: {}%", result.confidence);
    println!("Confidence Score: {}", result.confidence_score);
    println!("Message: {}", result.message);
    println!("{}", result.sources_message);

    Ok(())
}
