//! # Elasticsearch-Compatible HTTP Adapter
//!
//! The one production [`SearchBackend`]. Speaks the document REST shapes
//! an Elasticsearch-compatible service exposes:
//!
//! ```text
//! upsert  PUT    {base}/{index}/_doc/{id}      body: document
//! delete  DELETE {base}/{index}/_doc/{id}
//! query   POST   {base}/{index}/_search        body: bool.must of
//!                                              owner term + text match
//! ping    GET    {base}/
//! ```
//!
//! No retries and no request timeout beyond the bounded startup ping;
//! the layer above turns every error from here into a logged no-op.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::backend::{IndexQuery, SearchBackend};
use crate::config::SearchConfig;
use crate::document::IndexNames;
use crate::error::{BackendError, SearchError};

/// HTTP adapter for an Elasticsearch-compatible search service.
#[derive(Debug, Clone)]
pub struct ElasticBackend {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    names: IndexNames,
    probe_timeout: Duration,
}

impl ElasticBackend {
    /// Builds the adapter from configuration. Does not touch the network;
    /// availability is decided by the caller via [`SearchBackend::ping`].
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let http = Client::builder().build().map_err(BackendError::Http)?;

        Ok(ElasticBackend {
            http,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            names: IndexNames::new(&config.index_prefix),
            probe_timeout: config.probe_timeout,
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("ApiKey {key}")),
            None => builder,
        }
    }

    fn doc_url(&self, index: &str, id: i64) -> String {
        format!("{}/{}/_doc/{}", self.base_url, index, id)
    }

    async fn check_success(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Creates one index with its mapping when it does not exist yet.
    async fn ensure_index(&self, index: &str, mapping: &Value) -> Result<(), BackendError> {
        let head = self
            .request(Method::HEAD, format!("{}/{}", self.base_url, index))
            .send()
            .await?;

        if head.status().is_success() {
            return Ok(());
        }

        let response = self
            .request(Method::PUT, format!("{}/{}", self.base_url, index))
            .json(&json!({"mappings": mapping}))
            .send()
            .await?;

        Self::check_success(response).await?;
        debug!(index, "Created search index");
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn ping(&self) -> Result<(), BackendError> {
        let response = self
            .request(Method::GET, format!("{}/", self.base_url))
            .timeout(self.probe_timeout)
            .send()
            .await?;

        Self::check_success(response).await?;
        Ok(())
    }

    async fn prepare_indices(&self) -> Result<(), BackendError> {
        for (index, mapping) in self.names.mappings() {
            // Per-index best effort: a failure here leaves that index
            // missing until the next process start, nothing more
            if let Err(e) = self.ensure_index(index, &mapping).await {
                warn!(index, error = %e, "Failed to prepare search index");
            }
        }
        Ok(())
    }

    async fn upsert_document(
        &self,
        index: &str,
        id: i64,
        doc: &Value,
    ) -> Result<(), BackendError> {
        let response = self
            .request(Method::PUT, self.doc_url(index, id))
            .json(doc)
            .send()
            .await?;

        Self::check_success(response).await?;
        debug!(index, id, "Upserted document");
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: i64) -> Result<(), BackendError> {
        let response = self
            .request(Method::DELETE, self.doc_url(index, id))
            .send()
            .await?;

        Self::check_success(response).await?;
        debug!(index, id, "Deleted document");
        Ok(())
    }

    async fn query_ids(&self, query: &IndexQuery<'_>) -> Result<Vec<i64>, BackendError> {
        let mut must = vec![json!({"term": {"user_id": query.owner_id}})];

        if !query.text.is_empty() {
            if query.partial {
                must.push(json!({
                    "query_string": {
                        "query": query.text,
                        "fields": query.fields,
                        "analyze_wildcard": true
                    }
                }));
            } else {
                must.push(json!({
                    "multi_match": {
                        "query": query.text,
                        "fields": query.fields
                    }
                }));
            }
        }

        let body = json!({
            "query": {"bool": {"must": must}},
            "size": query.limit
        });

        let response = self
            .request(Method::POST, format!("{}/{}/_search", self.base_url, query.index))
            .json(&body)
            .send()
            .await?;

        let response = Self::check_success(response).await?;
        let body = response.text().await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| BackendError::Malformed(e.to_string()))?;

        Ok(parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| hit.source.id)
            .collect())
    }
}

// =============================================================================
// Response Shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: HitSource,
}

/// Only the entity id is read back; results are hydrated from the
/// database, never from index documents.
#[derive(Debug, Deserialize)]
struct HitSource {
    id: i64,
}

// =============================================================================
// Tests
// =============================================================================
