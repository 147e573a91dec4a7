//! # Search Backend Seam
//!
//! The capability states and the trait every index backend implements.
//!
//! ## Availability Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      SearchStatus (decided once)                    │
//! │                                                                     │
//! │  config.enabled = false ──────────────► Disabled                    │
//! │                                         (no client is even built)   │
//! │                                                                     │
//! │  config.enabled = true ──► ping ──ok──► Available                   │
//! │                              │                                      │
//! │                              └───err──► Unavailable                 │
//! │                                         (every op is a no-op)       │
//! │                                                                     │
//! │  The status is a plain value on the service, set at construction    │
//! │  and read per request. There is no re-probe and no retry state.     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BackendError;

/// Whether the external index can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Switched off in configuration; index operations succeed as no-ops.
    Disabled,

    /// The startup probe answered; the index is in use.
    Available,

    /// Enabled but the startup probe failed; treated like `Disabled`
    /// except that the degraded state is logged.
    Unavailable,
}

impl SearchStatus {
    /// True only when index calls should actually be made.
    pub fn is_available(&self) -> bool {
        matches!(self, SearchStatus::Available)
    }
}

/// One free-text query against one index.
#[derive(Debug, Clone)]
pub struct IndexQuery<'a> {
    /// Index to search.
    pub index: &'a str,

    /// Owner filter: only this user's documents may match.
    pub owner_id: i64,

    /// Query text. Empty means "all of the owner's documents".
    pub text: &'a str,

    /// Fields the text is matched against.
    pub fields: &'a [&'a str],

    /// Hit cap.
    pub limit: u32,

    /// When true the text contains `*` wildcards and should be run
    /// through the backend's pattern-matching query form.
    pub partial: bool,
}

/// Operations the sync layer needs from an index backend.
///
/// Exactly one production adapter exists ([`crate::ElasticBackend`]);
/// tests inject their own implementations through this trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Health probe used once at startup to decide availability.
    async fn ping(&self) -> Result<(), BackendError>;

    /// Creates any missing indices with their mappings. Best-effort:
    /// called once after a successful ping, failures are logged by the
    /// caller and do not flip availability.
    async fn prepare_indices(&self) -> Result<(), BackendError>;

    /// Creates or replaces one document, keyed by the entity id.
    async fn upsert_document(&self, index: &str, id: i64, doc: &Value)
        -> Result<(), BackendError>;

    /// Deletes one document by entity id.
    async fn delete_document(&self, index: &str, id: i64) -> Result<(), BackendError>;

    /// Runs a filtered free-text query and returns matching entity ids,
    /// best match first.
    async fn query_ids(&self, query: &IndexQuery<'_>) -> Result<Vec<i64>, BackendError>;
}
