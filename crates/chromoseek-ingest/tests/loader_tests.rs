//! Bulk loader retry and failure accounting

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use chromoseek_common::{FeatureDocument, FeatureType};
use chromoseek_ingest::{BulkLoader, FileTask, IngestConfig, IngestError};
use chromoseek_store::{
    BulkFailure, BulkOutcome, MemoryStore, SearchRequest, SearchResponse, SearchStore, StoreError,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const INDEX: &str = "genomic_features";

/// What the store does with the next bulk call
#[derive(Clone, Copy)]
enum Fault {
    /// Fail the whole request with this status
    Request(u16),
    /// Reject the first document of the batch with this status
    FirstDocument(u16),
    /// Reject every document with this status
    AllDocuments(u16),
}

/// Wraps a [`MemoryStore`], injecting `fault` into the first `remaining` bulk calls.
struct FaultyStore {
    inner: MemoryStore,
    fault: Fault,
    remaining: AtomicUsize,
    bulk_calls: AtomicUsize,
}

impl FaultyStore {
    fn new(fault: Fault, times: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            fault,
            remaining: AtomicUsize::new(times),
            bulk_calls: AtomicUsize::new(0),
        }
    }

    fn take_fault(&self) -> Option<Fault> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .ok()
            .map(|_| self.fault)
    }
}

#[async_trait]
impl SearchStore for FaultyStore {
    async fn index_exists(&self, index: &str) -> chromoseek_store::Result<bool> {
        self.inner.index_exists(index).await
    }

    async fn create_index(&self, index: &str, mappings: &Value) -> chromoseek_store::Result<()> {
        self.inner.create_index(index, mappings).await
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> chromoseek_store::Result<SearchResponse> {
        self.inner.search(index, request).await
    }

    async fn bulk(
        &self,
        index: &str,
        documents: &[FeatureDocument],
    ) -> chromoseek_store::Result<BulkOutcome> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);

        match self.take_fault() {
            None => self.inner.bulk(index, documents).await,
            Some(Fault::Request(status)) => Err(StoreError::status(status, "injected")),
            Some(Fault::FirstDocument(status)) => {
                let mut outcome = self.inner.bulk(index, &documents[1..]).await?;
                outcome.failed.push(BulkFailure {
                    position: 0,
                    status,
                    reason: "injected".to_string(),
                });
                Ok(outcome)
            },
            Some(Fault::AllDocuments(status)) => Ok(BulkOutcome {
                succeeded: 0,
                failed: (0..documents.len())
                    .map(|position| BulkFailure {
                        position,
                        status,
                        reason: "mapper_parsing_exception".to_string(),
                    })
                    .collect(),
            }),
        }
    }
}

fn bed_file(lines: usize) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peaks_test.bed");
    let content: String = (0..lines)
        .map(|i| format!("1\t{}\t{}\tpeak{}\n", i * 10, i * 10 + 5, i))
        .collect();
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

fn config(batch_size: usize) -> IngestConfig {
    IngestConfig {
        batch_size,
        retry_delay_ms: 1,
        ..IngestConfig::default()
    }
}

fn task(path: PathBuf) -> FileTask {
    FileTask::bed(path, FeatureType::from("peaks"))
}

#[tokio::test]
async fn test_file_is_loaded_in_batches() {
    let (_dir, path) = bed_file(5);
    let store = Arc::new(MemoryStore::new());
    let loader = BulkLoader::new(store.clone(), INDEX, config(2));

    let report = loader.load_file(&task(path.clone())).await.unwrap();

    assert_eq!(report.indexed, 5);
    assert_eq!(report.batches, 3);
    assert_eq!(report.retries, 0);
    assert_eq!(report.path, path);
    assert_eq!(store.document_count(INDEX), 5);
}

#[tokio::test]
async fn test_empty_file_writes_nothing() {
    let (_dir, path) = bed_file(0);
    let store = Arc::new(FaultyStore::new(Fault::Request(500), 0));
    let loader = BulkLoader::new(store.clone(), INDEX, config(10));

    let report = loader.load_file(&task(path)).await.unwrap();

    assert_eq!(report.indexed, 0);
    assert_eq!(report.batches, 0);
    assert_eq!(store.bulk_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_transient_request_failure_is_retried() {
    let (_dir, path) = bed_file(4);
    let store = Arc::new(FaultyStore::new(Fault::Request(503), 2));
    let loader = BulkLoader::new(store.clone(), INDEX, config(10));

    let report = loader.load_file(&task(path)).await.unwrap();

    assert_eq!(report.indexed, 4);
    assert_eq!(report.retries, 2);
    assert_eq!(store.bulk_calls.load(Ordering::SeqCst), 3);
    assert_eq!(store.inner.document_count(INDEX), 4);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let (_dir, path) = bed_file(4);
    let store = Arc::new(FaultyStore::new(Fault::Request(503), usize::MAX));
    let loader = BulkLoader::new(store.clone(), INDEX, config(10));

    let err = loader.load_file(&task(path)).await.unwrap_err();

    assert!(matches!(err, IngestError::Store(StoreError::Status { status: 503, .. })));
    // first attempt plus three retries
    assert_eq!(store.bulk_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_permanent_request_failure_is_not_retried() {
    let (_dir, path) = bed_file(4);
    let store = Arc::new(FaultyStore::new(Fault::Request(400), 1));
    let loader = BulkLoader::new(store.clone(), INDEX, config(10));

    let err = loader.load_file(&task(path)).await.unwrap_err();

    assert!(matches!(err, IngestError::Store(_)));
    assert_eq!(store.bulk_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_throttled_documents_are_resubmitted() {
    let (_dir, path) = bed_file(3);
    let store = Arc::new(FaultyStore::new(Fault::FirstDocument(429), 1));
    let loader = BulkLoader::new(store.clone(), INDEX, config(10));

    let report = loader.load_file(&task(path)).await.unwrap();

    assert_eq!(report.indexed, 3);
    assert_eq!(report.retries, 1);
    assert_eq!(store.inner.document_count(INDEX), 3);
}

#[tokio::test]
async fn test_rejected_documents_fail_the_file() {
    let (_dir, path) = bed_file(3);
    let store = Arc::new(FaultyStore::new(Fault::AllDocuments(400), 1));
    let loader = BulkLoader::new(store.clone(), INDEX, config(10));

    let err = loader.load_file(&task(path.clone())).await.unwrap_err();

    match err {
        IngestError::DocumentsFailed { path: failed_path, failed } => {
            assert_eq!(failed_path, path);
            assert_eq!(failed, 3);
        },
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(store.bulk_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_partial_failure_keeps_written_documents() {
    let (_dir, path) = bed_file(4);
    // first batch loses one document permanently, second batch goes through
    let faulty = Arc::new(FaultyStore::new(Fault::FirstDocument(400), 1));
    let loader = BulkLoader::new(faulty.clone(), INDEX, config(2));
    let err = loader.load_file(&task(path)).await.unwrap_err();

    assert!(matches!(err, IngestError::DocumentsFailed { failed: 1, .. }));
    assert_eq!(faulty.inner.document_count(INDEX), 3);
}

#[tokio::test]
async fn test_zero_batch_size_is_rejected() {
    let (_dir, path) = bed_file(3);
    let store = Arc::new(FaultyStore::new(Fault::Request(500), 0));
    let loader = BulkLoader::new(store.clone(), INDEX, config(0));

    let err = loader.load_file(&task(path)).await.unwrap_err();

    assert!(matches!(err, IngestError::Config(_)));
    assert_eq!(store.bulk_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_file_is_an_io_error() {
    let store = Arc::new(MemoryStore::new());
    let loader = BulkLoader::new(store, INDEX, config(10));

    let err = loader
        .load_file(&task(PathBuf::from("/nonexistent/peaks.bed")))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Io { .. }));
}
