//! Ingestion configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{IngestError, Result};

/// Directory scanned for annotation files
pub const DEFAULT_DATA_DIR: &str = "data/external";

/// Documents per bulk request
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Retries per bulk request after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Backoff before the first retry; doubles on each following one
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Files loaded at the same time
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub batch_size: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub concurrency: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl IngestConfig {
    /// Load configuration from environment (and `.env`) on top of the defaults.
    ///
    /// Reads `CHROMOSEEK_DATA_DIR`, `CHROMOSEEK_BATCH_SIZE`, `CHROMOSEEK_MAX_RETRIES`,
    /// `CHROMOSEEK_RETRY_DELAY_MS` and `CHROMOSEEK_CONCURRENCY`. Unparseable numbers
    /// fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            data_dir: std::env::var("CHROMOSEEK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            batch_size: env_or("CHROMOSEEK_BATCH_SIZE", defaults.batch_size),
            max_retries: env_or("CHROMOSEEK_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("CHROMOSEEK_RETRY_DELAY_MS", defaults.retry_delay_ms),
            concurrency: env_or("CHROMOSEEK_CONCURRENCY", defaults.concurrency),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(IngestError::Config("Batch size must be greater than 0".to_string()));
        }

        if self.concurrency == 0 {
            return Err(IngestError::Config("Concurrency must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Delay before retry number `attempt` (1-based): the base delay doubled
    /// for every earlier retry.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
