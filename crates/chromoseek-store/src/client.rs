//! HTTP client for an Elasticsearch-compatible search service

use async_trait::async_trait;
use chromoseek_common::FeatureDocument;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::types::{BulkFailure, BulkOutcome, SearchRequest, SearchResponse};
use crate::SearchStore;

/// Search-service client. Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ElasticClient {
    client: Client,
    base_url: String,
}

impl ElasticClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("chromoseek/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&StoreConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Turn a non-2xx response into a [`StoreError::Status`] carrying the body text.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::status(status.as_u16(), body))
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<HashMap<String, BulkItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

fn bulk_body(index: &str, documents: &[FeatureDocument]) -> Result<String> {
    let action = serde_json::to_string(&json!({ "index": { "_index": index } }))?;
    let mut body = String::with_capacity(documents.len() * 256);
    for document in documents {
        body.push_str(&action);
        body.push('\n');
        body.push_str(&serde_json::to_string(document)?);
        body.push('\n');
    }
    Ok(body)
}

fn failure_reason(error: Option<Value>) -> String {
    match error {
        Some(Value::Object(map)) => match map.get("reason").and_then(Value::as_str) {
            Some(reason) => reason.to_string(),
            None => Value::Object(map).to_string(),
        },
        Some(other) => other.to_string(),
        None => "unknown error".to_string(),
    }
}

#[async_trait]
impl SearchStore for ElasticClient {
    #[instrument(skip(self))]
    async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self.client.head(self.url(index)).send().await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(StoreError::status(
                other.as_u16(),
                format!("unexpected status checking index '{}'", index),
            )),
        }
    }

    #[instrument(skip(self, mappings))]
    async fn create_index(&self, index: &str, mappings: &Value) -> Result<()> {
        let response = self
            .client
            .put(self.url(index))
            .json(&json!({ "mappings": mappings }))
            .send()
            .await?;

        match check_status(response).await {
            Ok(_) => {
                info!(index, "Index created");
                Ok(())
            },
            // Lost a creation race with another provisioner
            Err(StoreError::Status { status: 400, body })
                if body.contains("resource_already_exists_exception") =>
            {
                info!(index, "Index was created concurrently, leaving it untouched");
                Ok(())
            },
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, request), fields(from = request.from, size = request.size))]
    async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let response = self
            .client
            .post(self.url(&format!("{}/_search", index)))
            .json(request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body).map_err(|e| {
            StoreError::UnexpectedResponse(format!("failed to decode search response: {}", e))
        })?;

        debug!(hits = parsed.hits.hits.len(), "Search completed");
        Ok(parsed)
    }

    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    async fn bulk(&self, index: &str, documents: &[FeatureDocument]) -> Result<BulkOutcome> {
        if documents.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let response = self
            .client
            .post(self.url("_bulk"))
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(bulk_body(index, documents)?)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.bytes().await?;
        let parsed: BulkResponse = serde_json::from_slice(&body).map_err(|e| {
            StoreError::UnexpectedResponse(format!("failed to decode bulk response: {}", e))
        })?;

        if parsed.items.len() != documents.len() {
            return Err(StoreError::UnexpectedResponse(format!(
                "bulk response has {} items for {} documents",
                parsed.items.len(),
                documents.len()
            )));
        }

        let mut outcome = BulkOutcome::default();
        for (position, mut item) in parsed.items.into_iter().enumerate() {
            let Some(result) = item.remove("index") else {
                return Err(StoreError::UnexpectedResponse(format!(
                    "bulk item {} is not an index result",
                    position
                )));
            };

            if (200..300).contains(&result.status) && result.error.is_none() {
                outcome.succeeded += 1;
            } else {
                outcome.failed.push(BulkFailure {
                    position,
                    status: result.status,
                    reason: failure_reason(result.error),
                });
            }
        }

        if parsed.errors {
            debug!(failed = outcome.failed.len(), "Bulk request reported item errors");
        }

        Ok(outcome)
    }
}
