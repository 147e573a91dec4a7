//! # Indexable Documents
//!
//! Denormalized projections of persisted entities, in the shape the
//! external index stores. The index is a disposable cache: these
//! documents are created/replaced on every create or update of the
//! source row and deleted with it, and are never read back as truth:
//! search results are always re-hydrated from the database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;

use hearth_core::types::{CarpoolEvent, Checklist, ChecklistItem, EntityKind, Meal};

// =============================================================================
// Index Names
// =============================================================================

/// The per-kind index names under one environment prefix.
#[derive(Debug, Clone)]
pub struct IndexNames {
    pub checklists: String,
    pub carpool: String,
    pub meals: String,
}

impl IndexNames {
    /// Builds the index-name set for a prefix, e.g. `hearth-dev` →
    /// `hearth-dev-checklists`, `hearth-dev-carpool`, `hearth-dev-meals`.
    pub fn new(prefix: &str) -> Self {
        IndexNames {
            checklists: format!("{prefix}-checklists"),
            carpool: format!("{prefix}-carpool"),
            meals: format!("{prefix}-meals"),
        }
    }

    /// Returns the index that stores the given entity kind.
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Checklist => &self.checklists,
            EntityKind::CarpoolEvent => &self.carpool,
            EntityKind::Meal => &self.meals,
        }
    }

    /// Iterates (index name, field mapping) pairs for index bootstrap.
    pub fn mappings(&self) -> [(&str, serde_json::Value); 3] {
        [
            (self.checklists.as_str(), checklist_mapping()),
            (self.carpool.as_str(), carpool_mapping()),
            (self.meals.as_str(), meal_mapping()),
        ]
    }
}

// =============================================================================
// Searchable Fields
// =============================================================================

/// Fields the checklist index matches free text against.
pub const CHECKLIST_FIELDS: &[&str] = &["title", "category", "items.text"];

/// Fields the carpool index matches free text against.
pub const CARPOOL_FIELDS: &[&str] = &["description", "destination", "notes"];

/// Fields the meal index matches free text against.
pub const MEAL_FIELDS: &[&str] = &["name", "details", "meal_time"];

// =============================================================================
// Documents
// =============================================================================

/// Checklist projection, items inlined so item text is searchable.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistDocument {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub category: Option<String>,
    pub items: Vec<ChecklistItemDocument>,
    pub created_at: DateTime<Utc>,
}

/// One inlined checklist item.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItemDocument {
    pub text: String,
    pub required: bool,
}

impl ChecklistDocument {
    pub fn project(checklist: &Checklist, items: &[ChecklistItem]) -> Self {
        ChecklistDocument {
            id: checklist.id,
            user_id: checklist.user_id,
            title: checklist.title.clone(),
            category: checklist.category.clone(),
            items: items
                .iter()
                .map(|item| ChecklistItemDocument {
                    text: item.text.clone(),
                    required: item.is_required,
                })
                .collect(),
            created_at: checklist.created_at,
        }
    }
}

/// Carpool event projection.
#[derive(Debug, Clone, Serialize)]
pub struct CarpoolDocument {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub destination: String,
    pub drop_off_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&CarpoolEvent> for CarpoolDocument {
    fn from(event: &CarpoolEvent) -> Self {
        CarpoolDocument {
            id: event.id,
            user_id: event.user_id,
            description: event.description.clone(),
            destination: event.destination.clone(),
            drop_off_time: event.drop_off_time,
            notes: event.notes.clone(),
            created_at: event.created_at,
        }
    }
}

/// Meal projection.
#[derive(Debug, Clone, Serialize)]
pub struct MealDocument {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub meal_time: Option<String>,
    pub details: Option<String>,
    pub planned_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<&Meal> for MealDocument {
    fn from(meal: &Meal) -> Self {
        MealDocument {
            id: meal.id,
            user_id: meal.user_id,
            name: meal.name.clone(),
            meal_time: meal.meal_time.clone(),
            details: meal.details.clone(),
            planned_date: meal.planned_date,
            created_at: meal.created_at,
        }
    }
}

// =============================================================================
// Mappings (index bootstrap)
// =============================================================================

fn checklist_mapping() -> serde_json::Value {
    json!({
        "properties": {
            "id": {"type": "integer"},
            "user_id": {"type": "integer"},
            "title": {"type": "text"},
            "category": {"type": "keyword"},
            "items": {
                "properties": {
                    "text": {"type": "text"},
                    "required": {"type": "boolean"}
                }
            },
            "created_at": {"type": "date"}
        }
    })
}

fn carpool_mapping() -> serde_json::Value {
    json!({
        "properties": {
            "id": {"type": "integer"},
            "user_id": {"type": "integer"},
            "description": {"type": "text"},
            "destination": {"type": "text"},
            "drop_off_time": {"type": "date"},
            "notes": {"type": "text"},
            "created_at": {"type": "date"}
        }
    })
}

fn meal_mapping() -> serde_json::Value {
    json!({
        "properties": {
            "id": {"type": "integer"},
            "user_id": {"type": "integer"},
            "name": {"type": "text"},
            "meal_time": {"type": "keyword"},
            "details": {"type": "text"},
            "planned_date": {"type": "date"},
            "created_at": {"type": "date"}
        }
    })
}
