//! # Domain Types
//!
//! Core domain types used throughout Hearth.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐   │
//! │  │   Checklist     │   │  CarpoolEvent   │   │      Meal       │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │   │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │   │
//! │  │  user_id        │   │  user_id        │   │  user_id        │   │
//! │  │  title          │   │  description    │   │  name           │   │
//! │  │  category       │   │  destination    │   │  meal_time      │   │
//! │  │  items[]        │   │  drop_off_time  │   │  planned_date   │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘   │
//! │                                                                     │
//! │  ┌─────────────────┐   ┌─────────────────┐                         │
//! │  │  ChecklistRun   │   │   EntityKind    │                         │
//! │  │  ─────────────  │   │  ─────────────  │                         │
//! │  │  started_at     │   │  Checklist      │                         │
//! │  │  completed_at   │   │  CarpoolEvent   │                         │
//! │  │  run_items[]    │   │  Meal           │                         │
//! │  └─────────────────┘   └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every persisted entity is keyed by an `i64` row id generated by the
//! database. The same value (rendered as a decimal string) keys the
//! entity's document in the external search index.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Entity Kind
// =============================================================================

/// The three searchable entity kinds.
///
/// Used to address the right search index when propagating deletions and
/// when naming entities in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Checklist,
    CarpoolEvent,
    Meal,
}

impl EntityKind {
    /// Stable name used in log messages and index-name suffixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Checklist => "checklist",
            EntityKind::CarpoolEvent => "carpool_event",
            EntityKind::Meal => "meal",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// An account that owns checklists, carpool events, and meals.
///
/// Authentication lives outside this workspace; the row exists so every
/// entity has an owner foreign key to scope queries by.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier.
    pub id: i64,

    /// Login email, unique per user.
    pub email: String,

    /// Optional display name.
    pub display_name: Option<String>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Checklist
// =============================================================================

/// A reusable checklist (packing list, shopping list, chores, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Checklist {
    /// Unique identifier.
    pub id: i64,

    /// Owner of the checklist.
    pub user_id: i64,

    /// Display title, e.g. "Camping Trip".
    pub title: String,

    /// Optional grouping label, e.g. "Travel" or "Shopping".
    pub category: Option<String>,

    /// When the checklist was created.
    pub created_at: DateTime<Utc>,
}

/// A single line on a checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ChecklistItem {
    /// Unique identifier.
    pub id: i64,

    /// Checklist this item belongs to.
    pub checklist_id: i64,

    /// Item text, e.g. "milk".
    pub text: String,

    /// Whether a run cannot complete until this item is checked off.
    pub is_required: bool,
}

/// A checklist together with its items, the shape most callers want.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistWithItems {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub items: Vec<ChecklistItem>,
}

/// One pass through a checklist (packing for one specific trip).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ChecklistRun {
    /// Unique identifier.
    pub id: i64,

    /// Checklist this run executes.
    pub checklist_id: i64,

    /// When the run was started.
    pub started_at: DateTime<Utc>,

    /// When the run was completed; `None` while in progress.
    pub completed_at: Option<DateTime<Utc>>,

    /// Address the completion report should go to, if any.
    pub email_sent_to: Option<String>,

    /// Free-form notes on the run.
    pub notes: Option<String>,
}

/// Per-item completion state within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ChecklistRunItem {
    /// Unique identifier.
    pub id: i64,

    /// Run this state belongs to.
    pub run_id: i64,

    /// The checklist item being tracked.
    pub item_id: i64,

    /// Whether the item has been checked off in this run.
    pub completed: bool,

    /// Free-form notes on this item for this run.
    pub notes: Option<String>,
}

/// A run together with its per-item states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistRunWithItems {
    #[serde(flatten)]
    pub run: ChecklistRun,
    pub run_items: Vec<ChecklistRunItem>,
}

// =============================================================================
// Carpool
// =============================================================================

/// A scheduled carpool drop-off or pick-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CarpoolEvent {
    /// Unique identifier.
    pub id: i64,

    /// Owner of the event.
    pub user_id: i64,

    /// What the trip is, e.g. "Soccer practice pickup".
    pub description: String,

    /// Where the trip goes, e.g. "Lincoln Field".
    pub destination: String,

    /// Scheduled drop-off time.
    pub drop_off_time: DateTime<Utc>,

    /// Free-form notes (who drives, gate codes, ...).
    pub notes: Option<String>,

    /// When the event was created.
    pub created_at: DateTime<Utc>,

    /// When the event was last updated.
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Meal
// =============================================================================

/// A planned meal on the family calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Meal {
    /// Unique identifier.
    pub id: i64,

    /// Owner of the meal plan entry.
    pub user_id: i64,

    /// Dish name, e.g. "Beef tacos".
    pub name: String,

    /// Slot label, e.g. "Breakfast" or "Dinner". Free-form.
    pub meal_time: Option<String>,

    /// Recipe notes, sides, links.
    pub details: Option<String>,

    /// Calendar date the meal is planned for.
    pub planned_date: NaiveDate,

    /// When the entry was created.
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

/// One suggested day of a generated meal plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSuggestion {
    /// Day slot, 1-based.
    pub day: u32,

    /// Suggested dish name.
    pub meal: String,
}

// =============================================================================
// Input Types
// =============================================================================

/// Input for creating a checklist with its initial items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklist {
    pub title: String,
    pub category: Option<String>,
    pub items: Vec<NewChecklistItem>,
}

/// Input for one new checklist item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklistItem {
    pub text: String,
    pub is_required: bool,
}

/// Replacement fields for an existing checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistUpdate {
    pub title: String,
    pub category: Option<String>,
}

/// Input for creating a carpool event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCarpoolEvent {
    pub description: String,
    pub destination: String,
    pub drop_off_time: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Replacement fields for an existing carpool event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarpoolEventUpdate {
    pub description: String,
    pub destination: String,
    pub drop_off_time: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Input for creating a meal plan entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMeal {
    pub name: String,
    pub meal_time: Option<String>,
    pub details: Option<String>,
    pub planned_date: NaiveDate,
}

/// Replacement fields for an existing meal plan entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealUpdate {
    pub name: String,
    pub meal_time: Option<String>,
    pub details: Option<String>,
    pub planned_date: NaiveDate,
}

// =============================================================================
// Run Completion Rules
// =============================================================================

/// Returns the ids of required checklist items not yet completed in a run.
///
/// A run may only complete once this is empty. Optional items never block
/// completion.
pub fn missing_required_items(
    items: &[ChecklistItem],
    run_items: &[ChecklistRunItem],
) -> Vec<i64> {
    items
        .iter()
        .filter(|item| item.is_required)
        .filter(|item| {
            !run_items
                .iter()
                .any(|ri| ri.item_id == item.id && ri.completed)
        })
        .map(|item| item.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, required: bool) -> ChecklistItem {
        ChecklistItem {
            id,
            checklist_id: 1,
            text: format!("item {id}"),
            is_required: required,
        }
    }

    fn run_item(item_id: i64, completed: bool) -> ChecklistRunItem {
        ChecklistRunItem {
            id: item_id * 10,
            run_id: 1,
            item_id,
            completed,
            notes: None,
        }
    }

    #[test]
    fn test_missing_required_items() {
        let items = vec![item(1, true), item(2, false), item(3, true)];

        // Nothing completed: both required items are missing
        let run_items = vec![run_item(1, false), run_item(2, false), run_item(3, false)];
        assert_eq!(missing_required_items(&items, &run_items), vec![1, 3]);

        // Required items done, optional skipped: nothing missing
        let run_items = vec![run_item(1, true), run_item(2, false), run_item(3, true)];
        assert!(missing_required_items(&items, &run_items).is_empty());
    }

    #[test]
    fn test_entity_kind_names() {
        assert_eq!(EntityKind::Checklist.as_str(), "checklist");
        assert_eq!(EntityKind::CarpoolEvent.as_str(), "carpool_event");
        assert_eq!(EntityKind::Meal.to_string(), "meal");
    }
}
