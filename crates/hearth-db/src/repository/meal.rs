//! # Meal Repository
//!
//! Database operations for meal plan entries.
//!
//! Listings follow the calendar (planned date ascending); the fallback
//! search and the recent listing order by creation time, newest first.
//! `frequent_names` feeds the meal-plan suggestion builder.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hearth_core::types::{Meal, MealUpdate, NewMeal};
use hearth_core::validation::{validate_meal, validate_meal_name};

/// Repository for meal database operations.
#[derive(Debug, Clone)]
pub struct MealRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str =
    "id, user_id, name, meal_time, details, planned_date, created_at, updated_at";

impl MealRepository {
    /// Creates a new MealRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MealRepository { pool }
    }

    /// Creates a meal plan entry.
    pub async fn create(&self, user_id: i64, input: &NewMeal) -> DbResult<Meal> {
        validate_meal(input)?;

        debug!(user_id, name = %input.name, "Creating meal");

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO meals
                (user_id, name, meal_time, details, planned_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.meal_time)
        .bind(&input.details)
        .bind(input.planned_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Meal {
            id: result.last_insert_rowid(),
            user_id,
            name: input.name.clone(),
            meal_time: input.meal_time.clone(),
            details: input.details.clone(),
            planned_date: input.planned_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a meal, scoped to the owner.
    pub async fn get(&self, user_id: i64, id: i64) -> DbResult<Option<Meal>> {
        let meal: Option<Meal> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM meals WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(meal)
    }

    /// Lists the owner's meals in calendar order.
    pub async fn list(&self, user_id: i64, limit: u32, offset: u32) -> DbResult<Vec<Meal>> {
        let meals: Vec<Meal> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM meals
             WHERE user_id = ?1
             ORDER BY planned_date
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(meals)
    }

    /// Lists the owner's most recently created meals. This is the result
    /// set for blank and wildcard search queries.
    pub async fn list_recent(&self, user_id: i64, limit: u32) -> DbResult<Vec<Meal>> {
        let meals: Vec<Meal> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM meals
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(meals)
    }

    /// Replaces a meal's fields.
    pub async fn update(&self, user_id: i64, id: i64, update: &MealUpdate) -> DbResult<Meal> {
        validate_meal_name(&update.name)?;

        debug!(user_id, id, "Updating meal");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE meals
             SET name = ?3, meal_time = ?4, details = ?5, planned_date = ?6, updated_at = ?7
             WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.meal_time)
        .bind(&update.details)
        .bind(update.planned_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Meal", id));
        }

        self.get(user_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Meal", id))
    }

    /// Deletes a meal.
    pub async fn delete(&self, user_id: i64, id: i64) -> DbResult<()> {
        debug!(user_id, id, "Deleting meal");

        let result = sqlx::query("DELETE FROM meals WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Meal", id));
        }

        Ok(())
    }

    /// Fallback substring search: every token must match the name, the
    /// meal-time label, or the details. Owner-scoped, newest first.
    pub async fn search_fallback(
        &self,
        user_id: i64,
        tokens: &[String],
        limit: u32,
    ) -> DbResult<Vec<Meal>> {
        debug!(user_id, ?tokens, "Fallback meal search");

        let mut qb = sqlx::QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM meals WHERE user_id = "
        ));
        qb.push_bind(user_id);

        for token in tokens {
            let pattern = format!("%{}%", token.to_lowercase());
            qb.push(" AND (LOWER(name) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR LOWER(COALESCE(meal_time, '')) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR LOWER(COALESCE(details, '')) LIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(limit);

        let meals: Vec<Meal> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(meals)
    }

    /// Returns (name, count) pairs for the owner's meals, most frequent
    /// first. Feeds the meal-plan suggestion builder.
    pub async fn frequent_names(&self, user_id: i64, limit: u32) -> DbResult<Vec<(String, i64)>> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT name, COUNT(*) AS times
             FROM meals
             WHERE user_id = ?1
             GROUP BY name
             ORDER BY times DESC, name
             LIMIT ?2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;

    async fn test_db() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create("fam@example.com", None).await.unwrap();
        (db, user.id)
    }

    fn meal(name: &str, day: u32) -> NewMeal {
        NewMeal {
            name: name.into(),
            meal_time: Some("Dinner".into()),
            details: None,
            planned_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let (db, user_id) = test_db().await;
        let repo = db.meals();

        let created = repo.create(user_id, &meal("Beef tacos", 4)).await.unwrap();

        let fetched = repo.get(user_id, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Beef tacos");
        assert_eq!(fetched.planned_date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());

        let updated = repo
            .update(
                user_id,
                created.id,
                &MealUpdate {
                    name: "Fish tacos".into(),
                    meal_time: Some("Dinner".into()),
                    details: Some("with slaw".into()),
                    planned_date: fetched.planned_date,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Fish tacos");

        repo.delete(user_id, created.id).await.unwrap();
        assert!(repo.get(user_id, created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(user_id, created.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_is_calendar_ordered() {
        let (db, user_id) = test_db().await;
        let repo = db.meals();

        repo.create(user_id, &meal("Lasagna", 20)).await.unwrap();
        repo.create(user_id, &meal("Beef tacos", 3)).await.unwrap();

        let meals = repo.list(user_id, 10, 0).await.unwrap();
        assert_eq!(meals[0].name, "Beef tacos");
        assert_eq!(meals[1].name, "Lasagna");
    }

    #[tokio::test]
    async fn test_search_fallback_matches_details_and_time() {
        let (db, user_id) = test_db().await;
        let repo = db.meals();

        repo.create(
            user_id,
            &NewMeal {
                name: "Pancakes".into(),
                meal_time: Some("Breakfast".into()),
                details: Some("blueberry, maple syrup".into()),
                planned_date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            },
        )
        .await
        .unwrap();

        let hits = repo
            .search_fallback(user_id, &["breakfast".into()], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let hits = repo
            .search_fallback(user_id, &["blueberry".into(), "pancakes".into()], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let hits = repo
            .search_fallback(user_id, &["blueberry".into(), "waffles".into()], 10)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_frequent_names() {
        let (db, user_id) = test_db().await;
        let repo = db.meals();

        for day in 1..=3 {
            repo.create(user_id, &meal("Beef tacos", day)).await.unwrap();
        }
        repo.create(user_id, &meal("Lasagna", 10)).await.unwrap();

        let counts = repo.frequent_names(user_id, 10).await.unwrap();
        assert_eq!(counts[0], ("Beef tacos".to_string(), 3));
        assert_eq!(counts[1], ("Lasagna".to_string(), 1));
    }
}
