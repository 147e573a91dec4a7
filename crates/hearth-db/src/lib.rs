//! # hearth-db: Database Layer for Hearth
//!
//! This crate is the system of record for the Hearth backend. It stores
//! checklists (with run-through tracking), carpool events, and meal plans
//! in SQLite via sqlx, and exposes the relational fallback search the
//! search-synchronization layer relies on when the external index is
//! unavailable or empty.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (checklist, carpool, meal, user)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hearth_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/hearth.db")).await?;
//!
//! let owner = db.users().create("fam@example.com", None).await?;
//! let lists = db.checklists().list_recent(owner.id, 10).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::carpool::CarpoolRepository;
pub use repository::checklist::ChecklistRepository;
pub use repository::meal::MealRepository;
pub use repository::user::UserRepository;
