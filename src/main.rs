use anyhow::Result;
use bucket_ingest::cli::Cli;
use bucket_ingest::logging::{init_logging, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with default configuration; RUST_LOG overrides the
    // configured level.
    let logging_config = LoggingConfig::default();
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        // Continue without structured logging
    }

    let cli = Cli::new();
    cli.run().await
}
