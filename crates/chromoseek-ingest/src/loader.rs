//! Batched bulk loading of one file
//!
//! Documents are pulled from a [`DocumentStream`] in fixed-size batches on the
//! blocking pool and written with the store's bulk call. Each batch write is
//! retried with exponential backoff when the whole request fails transiently
//! or when individual documents are rejected with a retryable status.

use chromoseek_common::{FeatureDocument, FeatureType};
use chromoseek_store::{BulkFailure, SearchStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::normalizer::{AnnotationFormat, DocumentStream};

/// One file to load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileTask {
    pub path: PathBuf,
    pub format: AnnotationFormat,
    /// Label for interval files; unused for gene annotation
    pub feature_type: Option<FeatureType>,
}

impl FileTask {
    pub fn gtf(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: AnnotationFormat::Gtf,
            feature_type: None,
        }
    }

    pub fn bed(path: impl Into<PathBuf>, feature_type: FeatureType) -> Self {
        Self {
            path: path.into(),
            format: AnnotationFormat::Bed,
            feature_type: Some(feature_type),
        }
    }
}

/// Outcome of a fully loaded file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub indexed: usize,
    pub batches: usize,
    pub malformed_lines: usize,
    pub excluded_records: usize,
    pub retries: u32,
    pub duration_seconds: f64,
}

#[derive(Debug, Default)]
struct BatchResult {
    indexed: usize,
    failed: usize,
    retries: u32,
}

pub struct BulkLoader {
    store: Arc<dyn SearchStore>,
    index: String,
    config: IngestConfig,
}

impl BulkLoader {
    pub fn new(store: Arc<dyn SearchStore>, index: impl Into<String>, config: IngestConfig) -> Self {
        Self {
            store,
            index: index.into(),
            config,
        }
    }

    /// Stream `task` into the store.
    ///
    /// Fails with [`IngestError::Config`] before reading anything when the
    /// configuration is invalid, and with [`IngestError::DocumentsFailed`] when
    /// documents are still rejected after every retry. Documents written
    /// before that stay written.
    pub async fn load_file(&self, task: &FileTask) -> Result<FileReport> {
        self.config.validate()?;
        let start_time = Instant::now();
        info!(path = %task.path.display(), format = %task.format, "Starting bulk indexing");

        let mut stream = DocumentStream::open(&task.path, task.format, task.feature_type.clone())?;
        let mut totals = BatchResult::default();
        let mut batches = 0;

        loop {
            let batch_size = self.config.batch_size;
            let (returned, batch) = tokio::task::spawn_blocking(move || {
                let batch = stream.next_batch(batch_size);
                (stream, batch)
            })
            .await
            .map_err(|e| IngestError::TaskPanicked(e.to_string()))?;
            stream = returned;

            let batch = batch.map_err(|e| IngestError::io(&task.path, e))?;
            if batch.is_empty() {
                break;
            }

            batches += 1;
            debug!(batch = batches, documents = batch.len(), "Writing batch");

            let result = self.write_batch(&task.path, batch).await?;
            totals.indexed += result.indexed;
            totals.failed += result.failed;
            totals.retries += result.retries;
        }

        info!(
            path = %task.path.display(),
            success = totals.indexed,
            failed = totals.failed,
            malformed = stream.malformed(),
            "Indexing complete"
        );

        if totals.failed > 0 {
            return Err(IngestError::DocumentsFailed {
                path: task.path.clone(),
                failed: totals.failed,
            });
        }

        Ok(FileReport {
            path: task.path.clone(),
            indexed: totals.indexed,
            batches,
            malformed_lines: stream.malformed(),
            excluded_records: stream.excluded(),
            retries: totals.retries,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        })
    }

    /// Write one batch, retrying the whole request or just its retryable
    /// rejections up to `max_retries` times.
    async fn write_batch(&self, path: &Path, batch: Vec<FeatureDocument>) -> Result<BatchResult> {
        let mut result = BatchResult::default();
        let mut pending = batch;
        let mut attempt: u32 = 0;

        loop {
            match self.store.bulk(&self.index, &pending).await {
                Ok(outcome) => {
                    result.indexed += outcome.succeeded;

                    let (retryable, permanent): (Vec<BulkFailure>, Vec<BulkFailure>) =
                        outcome.failed.into_iter().partition(BulkFailure::is_transient);

                    if let Some(first) = permanent.first() {
                        error!(
                            path = %path.display(),
                            count = permanent.len(),
                            status = first.status,
                            reason = %first.reason,
                            "Documents rejected"
                        );
                    }
                    result.failed += permanent.len();

                    if retryable.is_empty() {
                        return Ok(result);
                    }
                    if attempt >= self.config.max_retries {
                        error!(
                            path = %path.display(),
                            count = retryable.len(),
                            "Documents still rejected after {} retries",
                            self.config.max_retries
                        );
                        result.failed += retryable.len();
                        return Ok(result);
                    }

                    pending = retryable
                        .iter()
                        .filter_map(|failure| pending.get(failure.position).cloned())
                        .collect();
                },
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    warn!(path = %path.display(), error = %e, "Bulk request failed");
                },
                Err(e) => return Err(e.into()),
            }

            attempt += 1;
            result.retries += 1;
            let delay = self.config.retry_delay(attempt);
            warn!(
                "Retrying {} documents (attempt {}/{}) in {:?}",
                pending.len(),
                attempt,
                self.config.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
