//! # hearth-core: Pure Domain Logic for Hearth
//!
//! This crate is the **heart** of the Hearth family-organization backend.
//! It contains the domain model and all pure logic, with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Hearth Architecture                          │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │              ★ hearth-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐  │ │
//! │  │  │  types   │  │  query   │  │validation│  │  plan        │  │ │
//! │  │  │Checklist │  │ tokenize │  │  rules   │  │ meal-plan    │  │ │
//! │  │  │Carpool   │  │ wildcard │  │  checks  │  │ suggestions  │  │ │
//! │  │  │Meal      │  │          │  │          │  │              │  │ │
//! │  │  └──────────┘  └──────────┘  └──────────┘  └──────────────┘  │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                 hearth-db (System of Record)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │          hearth-search (Best-Effort Index Sync)              │   │
//! │  └──────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Checklist, CarpoolEvent, Meal, runs, etc.)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`query`] - Free-text query helpers (tokenization, wildcard handling)
//! - [`plan`] - Meal-plan suggestion building

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod plan;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::ValidationError;
pub use types::{
    CarpoolEvent, CarpoolEventUpdate, Checklist, ChecklistItem, ChecklistRun, ChecklistRunItem,
    ChecklistRunWithItems, ChecklistUpdate, ChecklistWithItems, EntityKind, Meal, MealSuggestion,
    MealUpdate, NewCarpoolEvent, NewChecklist, NewChecklistItem, NewMeal, User,
};
