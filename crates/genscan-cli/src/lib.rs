//! Genscan CLI
//!
//! Shared pieces of the `batch_detect` and `check_image` binaries.

pub mod batch;
pub mod server_client;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
