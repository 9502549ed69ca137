//! Configuration for a loader run
//!
//! A `LoaderConfig` is built once from the CLI/environment and passed by
//! reference into every component that needs it. There is no process-global
//! configuration state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default public URL base for objects in a Google Cloud Storage bucket.
pub const DEFAULT_PUBLIC_URL_BASE: &str = "https://storage.googleapis.com";

/// Complete configuration for one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// PostgreSQL server endpoint and credentials
    pub database: DatabaseSettings,
    /// Source bucket settings
    pub bucket: BucketSettings,
}

/// PostgreSQL server settings (the target database name comes from the
/// storage path, not from configuration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub user: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            user: "postgres".to_string(),
            password: None,
            host: "localhost".to_string(),
            port: 5432,
        }
    }
}

/// Source bucket settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSettings {
    /// Bucket name in the storage backend
    pub name: String,
    /// Path to the service-account credential file
    pub credential_path: Option<PathBuf>,
    /// Base URL used to build public object URLs
    pub public_url_base: String,
}

impl BucketSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credential_path: None,
            public_url_base: DEFAULT_PUBLIC_URL_BASE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_settings_default() {
        let settings = DatabaseSettings::default();
        assert_eq!(settings.host, "localhost");
        assert_eq!(settings.port, 5432);
        assert_eq!(settings.user, "postgres");
        assert!(settings.password.is_none());
    }

    #[test]
    fn test_bucket_settings_default_url_base() {
        let settings = BucketSettings::new("my-bucket");
        assert_eq!(settings.name, "my-bucket");
        assert_eq!(settings.public_url_base, DEFAULT_PUBLIC_URL_BASE);
    }
}
