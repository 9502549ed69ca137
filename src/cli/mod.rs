//! Command-line interface
//!
//! A run is a single top-level operation (discover, then load); there are no
//! subcommands or partial-run modes. Every argument can come from the
//! environment, matching how the loader is deployed.

use crate::config::{BucketSettings, DatabaseSettings, LoaderConfig, DEFAULT_PUBLIC_URL_BASE};
use crate::engine::LoadEngine;
use crate::storage::BucketSource;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "bucket-ingest")]
#[command(about = "Load bucket-hosted CSV shards and image metadata into PostgreSQL")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// PostgreSQL user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    db_user: String,

    /// PostgreSQL password
    #[arg(long, env = "DB_PASSWORD")]
    db_password: Option<String>,

    /// PostgreSQL host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    db_host: String,

    /// PostgreSQL port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    db_port: u16,

    /// Source bucket name
    #[arg(long, env = "BUCKET_NAME")]
    bucket: String,

    /// Path to the service-account credential file
    #[arg(long, env = "CRED_PATH")]
    cred_path: Option<PathBuf>,

    /// Base URL for public object links recorded for images
    #[arg(long, env = "PUBLIC_URL_BASE", default_value = DEFAULT_PUBLIC_URL_BASE)]
    public_url_base: String,
}

impl Cli {
    pub fn new() -> Self {
        Self::parse()
    }

    pub async fn run(self) -> Result<()> {
        let config = self.into_config();
        let source = BucketSource::open(&config.bucket)?;
        let engine = LoadEngine::new(config, source);

        let summary = engine.run().await?;
        info!(
            "Run complete: {} tabular groups ({} rows), {} image groups ({} rows), {} objects skipped",
            summary.tabular_groups,
            summary.tabular_rows_loaded,
            summary.image_groups,
            summary.image_rows_loaded,
            summary.skipped_objects
        );
        Ok(())
    }

    fn into_config(self) -> LoaderConfig {
        LoaderConfig {
            database: DatabaseSettings {
                user: self.db_user,
                password: self.db_password,
                host: self.db_host,
                port: self.db_port,
            },
            bucket: BucketSettings {
                name: self.bucket,
                credential_path: self.cred_path,
                public_url_base: self.public_url_base,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_required_bucket() {
        let cli = Cli::try_parse_from(["bucket-ingest", "--bucket", "data-lake"]).unwrap();
        let config = cli.into_config();
        assert_eq!(config.bucket.name, "data-lake");
        assert_eq!(config.database.user, "postgres");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.bucket.public_url_base, DEFAULT_PUBLIC_URL_BASE);
    }

    #[test]
    fn test_cli_accepts_full_database_settings() {
        let cli = Cli::try_parse_from([
            "bucket-ingest",
            "--bucket",
            "data-lake",
            "--db-user",
            "loader",
            "--db-password",
            "secret",
            "--db-host",
            "db.internal",
            "--db-port",
            "5433",
            "--cred-path",
            "/etc/creds.json",
        ])
        .unwrap();
        let config = cli.into_config();
        assert_eq!(config.database.user, "loader");
        assert_eq!(config.database.password.as_deref(), Some("secret"));
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 5433);
        assert_eq!(
            config.bucket.credential_path,
            Some(PathBuf::from("/etc/creds.json"))
        );
    }
}
