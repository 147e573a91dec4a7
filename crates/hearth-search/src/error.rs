//! # Search Error Types
//!
//! Error types for the search-synchronization layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Search Error Categories                          │
//! │                                                                     │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │   BackendError   │  │ SearchError::    │  │ SearchError::    │  │
//! │  │  (adapter-level) │  │   Backend        │  │   Database       │  │
//! │  │                  │  │                  │  │                  │  │
//! │  │  Http            │  │ swallowed by the │  │ the ONE error    │  │
//! │  │  Status          │  │ service: logged, │  │ class that may   │  │
//! │  │  Malformed       │  │ then treated as  │  │ reach the user   │  │
//! │  │                  │  │ false/zero hits  │  │ (no further      │  │
//! │  │                  │  │                  │  │  fallback)       │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors from a search backend adapter.
///
/// These never escape the service layer: the write path converts them to
/// a logged `false`, the read path to a logged empty hit list.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The HTTP call itself failed (connect, DNS, body read).
    #[error("search backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("search backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx but the body wasn't the expected shape.
    #[error("malformed search backend response: {0}")]
    Malformed(String),
}

/// Search-layer errors.
///
/// Only the `Database` variant is ever surfaced by the read path: the
/// relational fallback has no further fallback. `Backend` exists for the
/// adapters and the startup probe, where callers inspect rather than
/// propagate it.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The relational fallback or hydration query failed.
    #[error("database error: {0}")]
    Database(#[from] hearth_db::DbError),

    /// A backend adapter failed.
    #[error("search backend error: {0}")]
    Backend(#[from] BackendError),

    /// The search configuration is unusable (e.g. bad endpoint URL).
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
}
