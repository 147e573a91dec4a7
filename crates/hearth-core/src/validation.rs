//! # Validation Module
//!
//! Input validation rules for Hearth entities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Caller (API / UI)                                         │
//! │  ├── Basic format checks, immediate feedback                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE - domain rules, enforced by repositories      │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / UNIQUE / foreign key constraints                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewCarpoolEvent, NewChecklist, NewMeal};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length for single-line name/title fields.
const MAX_TITLE_LEN: usize = 255;

/// Maximum length for the checklist category label.
const MAX_CATEGORY_LEN: usize = 50;

fn require_nonempty(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.len() > max {
        return Err(ValidationError::too_long(field, max));
    }

    Ok(())
}

/// Validates a checklist title.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    require_nonempty("title", title, MAX_TITLE_LEN)
}

/// Validates one checklist item's text.
pub fn validate_item_text(text: &str) -> ValidationResult<()> {
    if text.trim().is_empty() {
        return Err(ValidationError::required("text"));
    }
    Ok(())
}

/// Validates a full checklist input: title, category length, every item.
pub fn validate_checklist(input: &NewChecklist) -> ValidationResult<()> {
    validate_title(&input.title)?;

    if let Some(category) = &input.category {
        if category.len() > MAX_CATEGORY_LEN {
            return Err(ValidationError::too_long("category", MAX_CATEGORY_LEN));
        }
    }

    for item in &input.items {
        validate_item_text(&item.text)?;
    }

    Ok(())
}

/// Validates carpool event fields: description and destination.
pub fn validate_carpool_fields(description: &str, destination: &str) -> ValidationResult<()> {
    require_nonempty("description", description, MAX_TITLE_LEN)?;
    require_nonempty("destination", destination, MAX_TITLE_LEN)
}

/// Validates a carpool event input.
pub fn validate_carpool_event(input: &NewCarpoolEvent) -> ValidationResult<()> {
    validate_carpool_fields(&input.description, &input.destination)
}

/// Validates a meal's dish name.
pub fn validate_meal_name(name: &str) -> ValidationResult<()> {
    require_nonempty("name", name, MAX_TITLE_LEN)
}

/// Validates a meal input.
pub fn validate_meal(input: &NewMeal) -> ValidationResult<()> {
    validate_meal_name(&input.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewChecklistItem;
    use chrono::Utc;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Camping Trip").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_checklist_rejects_blank_item() {
        let input = NewChecklist {
            title: "Groceries".into(),
            category: Some("Shopping".into()),
            items: vec![NewChecklistItem {
                text: "  ".into(),
                is_required: true,
            }],
        };
        assert!(validate_checklist(&input).is_err());
    }

    #[test]
    fn test_validate_carpool_event() {
        let mut input = NewCarpoolEvent {
            description: "Soccer pickup".into(),
            destination: "Lincoln Field".into(),
            drop_off_time: Utc::now(),
            notes: None,
        };
        assert!(validate_carpool_event(&input).is_ok());

        input.destination = "".into();
        assert!(validate_carpool_event(&input).is_err());
    }
}
