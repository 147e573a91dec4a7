//! Meal-plan suggestion building.
//!
//! Turns "how often has this household eaten X" counts into a simple
//! one-meal-per-day plan. The counts come from the system of record;
//! this module only shapes them.

use crate::types::MealSuggestion;

/// Number of day slots in a suggested plan (one week).
pub const PLAN_DAYS: usize = 7;

/// Builds a meal plan from (name, count) pairs ordered most-frequent
/// first. Takes at most [`PLAN_DAYS`] names and assigns 1-based day
/// slots in order.
pub fn build_meal_plan(frequent_names: &[(String, i64)]) -> Vec<MealSuggestion> {
    frequent_names
        .iter()
        .take(PLAN_DAYS)
        .enumerate()
        .map(|(i, (name, _count))| MealSuggestion {
            day: (i + 1) as u32,
            meal: name.clone(),
        })
        .collect()
}
