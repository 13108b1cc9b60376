//! In-process search store
//!
//! Evaluates the part of the query language ChromoSeek emits: `bool`
//! (`filter` / `must` / `should` / `minimum_should_match`), `term`, `terms`,
//! `range` (with range-field intersection) and `match_all`, plus `terms`
//! aggregations. Backs `--dry-run` ingestion and the integration tests.

use async_trait::async_trait;
use chromoseek_common::FeatureDocument;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::types::{BulkOutcome, SearchRequest, SearchResponse, TermsAggregation, TermsBucket};
use crate::SearchStore;

#[derive(Debug, Default)]
struct Collection {
    mappings: Value,
    documents: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    searches: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `search` calls served so far.
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    /// Number of documents held in a collection (0 if it does not exist).
    pub fn document_count(&self, index: &str) -> usize {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        collections.get(index).map_or(0, |c| c.documents.len())
    }

    /// Mappings the collection was created with, if it exists.
    pub fn mappings(&self, index: &str) -> Option<Value> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        collections.get(index).map(|c| c.mappings.clone())
    }
}

#[async_trait]
impl SearchStore for MemoryStore {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        Ok(collections.contains_key(index))
    }

    async fn create_index(&self, index: &str, mappings: &Value) -> Result<()> {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections.entry(index.to_string()).or_insert_with(|| Collection {
            mappings: mappings.clone(),
            documents: Vec::new(),
        });
        Ok(())
    }

    async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        self.searches.fetch_add(1, Ordering::SeqCst);

        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        let Some(collection) = collections.get(index) else {
            return Err(StoreError::status(404, format!("no such index [{}]", index)));
        };

        let mut matching = Vec::new();
        for document in &collection.documents {
            if matches(&request.query, document)? {
                matching.push(document);
            }
        }

        let mut aggregations = HashMap::new();
        if let Some(Value::Object(aggs)) = &request.aggs {
            for (name, spec) in aggs {
                aggregations.insert(name.clone(), terms_aggregation(spec, &matching)?);
            }
        }

        let documents = matching
            .into_iter()
            .skip(request.from as usize)
            .take(request.size as usize)
            .map(|doc| serde_json::from_value::<FeatureDocument>(doc.clone()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut response = SearchResponse::from_documents(documents);
        response.aggregations = aggregations;
        Ok(response)
    }

    async fn bulk(&self, index: &str, documents: &[FeatureDocument]) -> Result<BulkOutcome> {
        let sources = documents
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        // Writing to a missing collection creates it with dynamic mappings
        collections
            .entry(index.to_string())
            .or_default()
            .documents
            .extend(sources);

        Ok(BulkOutcome::all_succeeded(documents.len()))
    }
}

fn single_entry<'a>(clause: &'a Value, kind: &str) -> Result<(&'a String, &'a Value)> {
    clause
        .as_object()
        .and_then(|obj| obj.iter().next())
        .ok_or_else(|| StoreError::InvalidQuery(format!("empty {} clause", kind)))
}

fn clause_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    }
}

fn matches(query: &Value, document: &Value) -> Result<bool> {
    let (kind, body) = single_entry(query, "query")?;

    match kind.as_str() {
        "match_all" => Ok(true),
        "bool" => matches_bool(body, document),
        "term" => {
            let (field, expected) = single_entry(body, "term")?;
            let expected = expected.get("value").unwrap_or(expected);
            Ok(document.get(field) == Some(expected))
        },
        "terms" => {
            let (field, candidates) = single_entry(body, "terms")?;
            let candidates = candidates.as_array().ok_or_else(|| {
                StoreError::InvalidQuery(format!("terms on '{}' needs an array", field))
            })?;
            Ok(document
                .get(field)
                .is_some_and(|value| candidates.contains(value)))
        },
        "range" => {
            let (field, bounds) = single_entry(body, "range")?;
            matches_range(document.get(field), bounds)
        },
        other => Err(StoreError::InvalidQuery(format!(
            "'{}' queries are not supported",
            other
        ))),
    }
}

fn matches_bool(body: &Value, document: &Value) -> Result<bool> {
    let required: Vec<&Value> = clause_list(body.get("filter"))
        .into_iter()
        .chain(clause_list(body.get("must")))
        .collect();
    for clause in &required {
        if !matches(clause, document)? {
            return Ok(false);
        }
    }

    for clause in clause_list(body.get("must_not")) {
        if matches(clause, document)? {
            return Ok(false);
        }
    }

    let should = clause_list(body.get("should"));
    if should.is_empty() {
        return Ok(true);
    }

    let minimum = match body.get("minimum_should_match") {
        Some(value) => value.as_u64().ok_or_else(|| {
            StoreError::InvalidQuery("minimum_should_match must be an integer".to_string())
        })? as usize,
        None if required.is_empty() => 1,
        None => 0,
    };

    let mut satisfied = 0;
    for clause in should {
        if matches(clause, document)? {
            satisfied += 1;
        }
    }
    Ok(satisfied >= minimum)
}

/// Inclusive integer bounds of a range clause. Absent bounds are open.
fn range_bounds(bounds: &Map<String, Value>) -> Result<(i64, i64)> {
    let get = |key: &str| -> Result<Option<i64>> {
        match bounds.get(key) {
            None => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                StoreError::InvalidQuery(format!("range bound '{}' out of range: {}", key, value))
            }),
        }
    };

    let lower = match (get("gte")?, get("gt")?) {
        (Some(v), _) => v,
        (None, Some(v)) => v.saturating_add(1),
        (None, None) => i64::MIN,
    };
    let upper = match (get("lte")?, get("lt")?) {
        (Some(v), _) => v,
        (None, Some(v)) => v.saturating_sub(1),
        (None, None) => i64::MAX,
    };
    Ok((lower, upper))
}

fn matches_range(field: Option<&Value>, bounds: &Value) -> Result<bool> {
    let bounds = bounds
        .as_object()
        .ok_or_else(|| StoreError::InvalidQuery("range bounds must be an object".to_string()))?;
    let (lower, upper) = range_bounds(bounds)?;

    match field {
        // Range field: stored as {gte, lt}; only "intersects" is supported
        Some(Value::Object(stored)) => {
            let relation = bounds
                .get("relation")
                .and_then(Value::as_str)
                .unwrap_or("intersects");
            if !relation.eq_ignore_ascii_case("intersects") {
                return Err(StoreError::InvalidQuery(format!(
                    "range relation '{}' is not supported",
                    relation
                )));
            }
            let (stored_lower, stored_upper) = range_bounds(stored)?;
            Ok(stored_lower <= upper && stored_upper >= lower)
        },
        Some(value) => Ok(value
            .as_f64()
            .is_some_and(|v| v >= lower as f64 && v <= upper as f64)),
        None => Ok(false),
    }
}

fn terms_aggregation(spec: &Value, documents: &[&Value]) -> Result<TermsAggregation> {
    let terms = spec
        .get("terms")
        .ok_or_else(|| StoreError::InvalidQuery("only terms aggregations are supported".into()))?;
    let field = terms
        .get("field")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::InvalidQuery("terms aggregation needs a field".into()))?;
    let size = terms.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;

    let mut counts: HashMap<String, u64> = HashMap::new();
    for document in documents {
        if let Some(key) = document.get(field).and_then(Value::as_str) {
            *counts.entry(key.to_string()).or_default() += 1;
        }
    }

    let mut buckets: Vec<TermsBucket> = counts
        .into_iter()
        .map(|(key, doc_count)| TermsBucket { key, doc_count })
        .collect();
    buckets.sort_by(|a, b| b.doc_count.cmp(&a.doc_count).then_with(|| a.key.cmp(&b.key)));
    buckets.truncate(size);

    Ok(TermsAggregation { buckets })
}
