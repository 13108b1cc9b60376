//! Store configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

// ============================================================================
// Store Configuration Constants
// ============================================================================

/// Default search service endpoint for local development.
pub const DEFAULT_STORE_URL: &str = "http://localhost:9200";

/// Default collection holding feature documents.
pub const DEFAULT_INDEX_NAME: &str = "genomic_features";

/// Default request timeout in seconds. Bulk requests of 10k documents can be slow.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Connection settings for the external search service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub index: String,
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Load configuration from environment (and `.env`) on top of the defaults.
    ///
    /// - `ELASTICSEARCH_HOST`: service endpoint
    /// - `CHROMOSEEK_INDEX`: collection name
    /// - `CHROMOSEEK_STORE_TIMEOUT_SECS`: request timeout
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = StoreConfig {
            url: std::env::var("ELASTICSEARCH_HOST")
                .unwrap_or_else(|_| DEFAULT_STORE_URL.to_string()),
            index: std::env::var("CHROMOSEEK_INDEX")
                .unwrap_or_else(|_| DEFAULT_INDEX_NAME.to_string()),
            timeout_secs: std::env::var("CHROMOSEEK_STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "Store URL must start with http:// or https://, got '{}'",
                self.url
            )));
        }

        if self.index.trim().is_empty() {
            return Err(StoreError::Config("Index name cannot be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(StoreError::Config(
                "Store timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORE_URL.to_string(),
            index: DEFAULT_INDEX_NAME.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
