//! # hearth-search: Search-Synchronization Layer for Hearth
//!
//! Keeps an external search index loosely in step with the database on a
//! strictly best-effort basis, and answers free-text searches with a
//! database fallback when the index is disabled, unreachable, or empty.
//!
//! ## The Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  The database is ALWAYS the system of record.                       │
//! │                                                                     │
//! │  Writes:  post-commit, fire-and-forget. An index failure is         │
//! │           logged and reported as `false`; it never fails, retries,  │
//! │           or rolls back the request that triggered it.              │
//! │                                                                     │
//! │  Reads:   index first (owner-filtered, size-capped), one wildcard   │
//! │           retry on zero hits, then a relational substring search.   │
//! │           Results are always re-hydrated rows, never documents.     │
//! │                                                                     │
//! │  Errors:  only a database failure on the fallback path may reach    │
//! │           the caller. Backend trouble never does.                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hearth_db::{Database, DbConfig};
//! use hearth_search::{SearchConfig, SearchService};
//!
//! let db = Database::new(DbConfig::new("hearth.db")).await?;
//! let search = SearchService::connect(&SearchConfig::from_env(), db.clone()).await;
//!
//! // After committing a meal:
//! let meal = db.meals().create(owner_id, &new_meal).await?;
//! if !search.index_meal(&meal).await {
//!     // logged already; the meal is safely in the database
//! }
//!
//! // Serving a search request:
//! let hits = search.search_meals(owner_id, "tacos").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod document;
pub mod elastic;
pub mod error;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{IndexQuery, SearchBackend, SearchStatus};
pub use config::SearchConfig;
pub use document::{CarpoolDocument, ChecklistDocument, IndexNames, MealDocument};
pub use elastic::ElasticBackend;
pub use error::{BackendError, SearchError, SearchResult};
pub use service::SearchService;
