// Ingestion orchestrator
//
// Provisions the feature collection, discovers annotation files and loads
// them concurrently. Each file is an independent task on a fixed-width
// buffer_unordered pool; one file failing never cancels the others.

use chromoseek_store::{mapping::feature_mappings, SearchStore};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::loader::{BulkLoader, FileReport, FileTask};
use crate::normalizer::{feature_label, AnnotationFormat};

/// Create `index` with the feature mappings unless it already exists.
///
/// An existing collection is left untouched and its schema is not checked.
/// Returns whether the collection was created.
pub async fn provision_index(store: &dyn SearchStore, index: &str) -> Result<bool> {
    if store.index_exists(index).await? {
        info!(index, "Index already exists");
        return Ok(false);
    }

    info!(index, "Index not found, creating");
    store.create_index(index, &feature_mappings()).await?;
    info!(index, "Index created successfully");
    Ok(true)
}

/// Files to load from `data_dir`: the first `.gtf` file (by name) and every
/// `.bed` file, each labelled from its name.
pub fn discover(data_dir: &Path) -> Result<Vec<FileTask>> {
    let entries = std::fs::read_dir(data_dir).map_err(|e| IngestError::io(data_dir, e))?;

    let mut gtf_files = Vec::new();
    let mut bed_files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IngestError::io(data_dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        match AnnotationFormat::from_path(&path) {
            Some(AnnotationFormat::Gtf) => gtf_files.push(path),
            Some(AnnotationFormat::Bed) => bed_files.push(path),
            None => {},
        }
    }
    gtf_files.sort();
    bed_files.sort();

    let mut tasks = Vec::with_capacity(bed_files.len() + 1);
    match gtf_files.into_iter().next() {
        Some(path) => tasks.push(FileTask::gtf(path)),
        None => warn!(dir = %data_dir.display(), "No GTF file found"),
    }

    info!("Found {} BED files to index", bed_files.len());
    tasks.extend(bed_files.into_iter().map(|path| {
        let label = feature_label(&path);
        FileTask::bed(path, label)
    }));

    Ok(tasks)
}

/// A file task that did not complete
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub index: String,
    pub index_created: bool,
    pub files: Vec<FileReport>,
    pub failures: Vec<FileFailure>,
    pub duration_seconds: f64,
}

impl IngestSummary {
    pub fn total_indexed(&self) -> usize {
        self.files.iter().map(|f| f.indexed).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct IngestOrchestrator {
    store: Arc<dyn SearchStore>,
    index: String,
    config: IngestConfig,
}

impl IngestOrchestrator {
    pub fn new(store: Arc<dyn SearchStore>, index: impl Into<String>, config: IngestConfig) -> Self {
        Self {
            store,
            index: index.into(),
            config,
        }
    }

    /// Provision the index, then load every file discovered in the data directory.
    pub async fn run(&self) -> Result<IngestSummary> {
        self.config.validate()?;
        let start_time = Instant::now();
        info!(index = %self.index, dir = %self.config.data_dir.display(), "Starting indexing pipeline");

        let index_created = provision_index(self.store.as_ref(), &self.index).await?;
        let tasks = discover(&self.config.data_dir)?;
        let (files, failures) = self.load_all(tasks).await;

        let summary = IngestSummary {
            index: self.index.clone(),
            index_created,
            files,
            failures,
            duration_seconds: start_time.elapsed().as_secs_f64(),
        };

        info!(
            "Pipeline complete: {} files, {} documents, {} failed files in {:.2}s",
            summary.files.len(),
            summary.total_indexed(),
            summary.failures.len(),
            summary.duration_seconds
        );

        Ok(summary)
    }

    /// Load `tasks` with at most `concurrency` files in flight.
    pub async fn load_all(&self, tasks: Vec<FileTask>) -> (Vec<FileReport>, Vec<FileFailure>) {
        let concurrency = self.config.concurrency;
        let total = tasks.len();
        info!("Loading {} files (concurrency={})", total, concurrency);

        let loader = BulkLoader::new(self.store.clone(), self.index.clone(), self.config.clone());
        let loader = &loader;

        let results: Vec<std::result::Result<FileReport, FileFailure>> = stream::iter(tasks.into_iter().enumerate())
            .map(|(position, task)| async move {
                info!("Starting {} ({} / {})", task.path.display(), position + 1, total);

                match loader.load_file(&task).await {
                    Ok(report) => {
                        info!(
                            "Completed {} ({} / {}): {} documents in {:.2}s",
                            report.path.display(),
                            position + 1,
                            total,
                            report.indexed,
                            report.duration_seconds
                        );
                        Ok(report)
                    },
                    Err(e) => {
                        error!(
                            "Failed {} ({} / {}): {}",
                            task.path.display(),
                            position + 1,
                            total,
                            e
                        );
                        Err(FileFailure {
                            path: task.path,
                            error: e.to_string(),
                        })
                    },
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut files = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(report) => files.push(report),
                Err(failure) => failures.push(failure),
            }
        }

        (files, failures)
    }
}
