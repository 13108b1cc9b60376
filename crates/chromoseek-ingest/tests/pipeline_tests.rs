//! Normalization, discovery and end-to-end pipeline runs against the in-memory store

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chromoseek_common::{FeatureDocument, FeatureType, Location, Strand};
use chromoseek_ingest::{
    discover, provision_index, AnnotationFormat, DocumentStream, IngestConfig, IngestError,
    IngestOrchestrator,
};
use chromoseek_store::mapping::feature_mappings;
use chromoseek_store::{MemoryStore, SearchRequest, SearchStore};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const INDEX: &str = "genomic_features";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn read_all(path: &Path, format: AnnotationFormat) -> (Vec<FeatureDocument>, usize, usize) {
    let mut stream = DocumentStream::open(path, format, None).unwrap();
    let documents = stream.by_ref().collect::<std::io::Result<Vec<_>>>().unwrap();
    (documents, stream.excluded(), stream.malformed())
}

fn data_dir_with(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, source) in files {
        std::fs::copy(fixture(source), dir.path().join(name)).unwrap();
    }
    dir
}

async fn count(store: &MemoryStore, query: serde_json::Value) -> usize {
    let request = SearchRequest::new(query, 0, 10_000);
    store.search(INDEX, &request).await.unwrap().into_documents().len()
}

#[test]
fn test_gtf_fixture_normalization() {
    let (documents, excluded, malformed) =
        read_all(&fixture("annotation.gtf"), AnnotationFormat::Gtf);

    // gene row, transcript without gene_name, start_codon
    assert_eq!(excluded, 3);
    assert_eq!(malformed, 1);
    assert_eq!(documents.len(), 5);

    let transcript = &documents[0];
    assert_eq!(
        transcript,
        &FeatureDocument {
            chrom: "1".to_string(),
            location: Location { gte: 11869, lt: 14410 },
            feature_type: FeatureType::Gene,
            feature_id: "ENST00000456328".to_string(),
            gene_name: Some("DDX11L1".to_string()),
            strand: Strand::Forward,
            score: 0.0,
            source_file: "annotation.gtf".to_string(),
        }
    );

    let exons: Vec<&FeatureDocument> = documents
        .iter()
        .filter(|d| d.feature_type == FeatureType::Exon)
        .collect();
    assert_eq!(exons.len(), 3);
    // the malformed exon sits between exon 2 and exon 3
    assert_eq!(exons[2].location, Location { gte: 13221, lt: 14410 });

    assert_eq!(documents[4].feature_type, FeatureType::Cds);
    assert_eq!(documents[4].gene_name.as_deref(), Some("OR4F5"));
}

#[test]
fn test_bed_fixture_normalization() {
    let (documents, _, malformed) =
        read_all(&fixture("peaks_h3k27ac.bed"), AnnotationFormat::Bed);

    assert_eq!(malformed, 1);
    assert_eq!(documents.len(), 4);
    assert!(documents.iter().all(|d| d.feature_type == FeatureType::from("peaks")));
    assert!(documents.iter().all(|d| d.gene_name.is_none()));

    assert_eq!(documents[0].location, Location { gte: 11800, lt: 12000 });
    assert_eq!(documents[0].score, 850.0);
    assert_eq!(documents[3].feature_id, "2:1000-1200");
    assert_eq!(documents[3].strand, Strand::Unknown);
}

#[test]
fn test_discover_picks_first_gtf_and_all_beds() {
    let dir = data_dir_with(&[
        ("b_annotation.gtf", "annotation.gtf"),
        ("a_annotation.gtf", "annotation.gtf"),
        ("peaks_h3k27ac.bed", "peaks_h3k27ac.bed"),
        ("enhancers_liver.bed", "peaks_h3k27ac.bed"),
    ]);
    std::fs::write(dir.path().join("README.txt"), "not an annotation").unwrap();
    std::fs::create_dir(dir.path().join("nested.bed")).unwrap();

    let tasks = discover(dir.path()).unwrap();

    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].format, AnnotationFormat::Gtf);
    assert_eq!(tasks[0].path, dir.path().join("a_annotation.gtf"));

    let labels: Vec<String> = tasks[1..]
        .iter()
        .map(|t| t.feature_type.as_ref().unwrap().to_string())
        .collect();
    assert_eq!(labels, vec!["enhancers", "peaks"]);
}

#[test]
fn test_discover_without_gtf() {
    let dir = data_dir_with(&[("peaks_h3k27ac.bed", "peaks_h3k27ac.bed")]);

    let tasks = discover(dir.path()).unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].format, AnnotationFormat::Bed);
}

#[test]
fn test_discover_missing_directory() {
    let err = discover(Path::new("/nonexistent/chromoseek/data")).unwrap_err();
    assert!(matches!(err, IngestError::Io { .. }));
}

#[tokio::test]
async fn test_provision_is_idempotent() {
    let store = MemoryStore::new();

    assert!(provision_index(&store, INDEX).await.unwrap());
    assert_eq!(store.mappings(INDEX), Some(feature_mappings()));

    // an existing collection keeps its schema
    let other = MemoryStore::new();
    other.create_index(INDEX, &json!({ "properties": {} })).await.unwrap();
    assert!(!provision_index(&other, INDEX).await.unwrap());
    assert_eq!(other.mappings(INDEX), Some(json!({ "properties": {} })));
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let dir = data_dir_with(&[
        ("annotation.gtf", "annotation.gtf"),
        ("peaks_h3k27ac.bed", "peaks_h3k27ac.bed"),
    ]);
    let store = Arc::new(MemoryStore::new());
    let config = IngestConfig {
        data_dir: dir.path().to_path_buf(),
        batch_size: 2,
        ..IngestConfig::default()
    };

    let summary = IngestOrchestrator::new(store.clone(), INDEX, config)
        .run()
        .await
        .unwrap();

    assert!(summary.index_created);
    assert!(summary.is_success());
    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.total_indexed(), 9);
    assert_eq!(store.document_count(INDEX), 9);

    assert_eq!(count(&store, json!({ "term": { "feature_type": "peaks" } })).await, 4);
    assert_eq!(count(&store, json!({ "term": { "gene_name": "DDX11L1" } })).await, 4);
    assert_eq!(
        count(&store, json!({ "term": { "source_file": "annotation.gtf" } })).await,
        5
    );
}

#[tokio::test]
async fn test_failed_file_does_not_block_siblings() {
    let dir = data_dir_with(&[("peaks_h3k27ac.bed", "peaks_h3k27ac.bed")]);
    std::fs::write(dir.path().join("broken.gtf"), [0xff, 0xfe, 0x00, b'\n']).unwrap();

    let store = Arc::new(MemoryStore::new());
    let config = IngestConfig {
        data_dir: dir.path().to_path_buf(),
        concurrency: 1,
        ..IngestConfig::default()
    };

    let summary = IngestOrchestrator::new(store.clone(), INDEX, config)
        .run()
        .await
        .unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].path, dir.path().join("broken.gtf"));
    assert_eq!(summary.files.len(), 1);
    assert_eq!(store.document_count(INDEX), 4);
}

#[tokio::test]
async fn test_invalid_config_stops_before_provisioning() {
    let dir = data_dir_with(&[("peaks_h3k27ac.bed", "peaks_h3k27ac.bed")]);
    let store = Arc::new(MemoryStore::new());
    let config = IngestConfig {
        data_dir: dir.path().to_path_buf(),
        concurrency: 0,
        ..IngestConfig::default()
    };

    let err = IngestOrchestrator::new(store.clone(), INDEX, config)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Config(_)));
    assert!(!store.index_exists(INDEX).await.unwrap());
}
