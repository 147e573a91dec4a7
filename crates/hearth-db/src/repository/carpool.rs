//! # Carpool Repository
//!
//! Database operations for carpool events.
//!
//! Listings are ordered by drop-off time (the schedule view); the
//! fallback search and the recent listing order by creation time, newest
//! first, matching the search layer's contract.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hearth_core::types::{CarpoolEvent, CarpoolEventUpdate, NewCarpoolEvent};
use hearth_core::validation::{validate_carpool_event, validate_carpool_fields};

/// Repository for carpool event database operations.
#[derive(Debug, Clone)]
pub struct CarpoolRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str =
    "id, user_id, description, destination, drop_off_time, notes, created_at, updated_at";

impl CarpoolRepository {
    /// Creates a new CarpoolRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarpoolRepository { pool }
    }

    /// Creates a carpool event.
    pub async fn create(&self, user_id: i64, input: &NewCarpoolEvent) -> DbResult<CarpoolEvent> {
        validate_carpool_event(input)?;

        debug!(user_id, description = %input.description, "Creating carpool event");

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO carpool_events
                (user_id, description, destination, drop_off_time, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(user_id)
        .bind(&input.description)
        .bind(&input.destination)
        .bind(input.drop_off_time)
        .bind(&input.notes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(CarpoolEvent {
            id: result.last_insert_rowid(),
            user_id,
            description: input.description.clone(),
            destination: input.destination.clone(),
            drop_off_time: input.drop_off_time,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets an event, scoped to the owner.
    pub async fn get(&self, user_id: i64, id: i64) -> DbResult<Option<CarpoolEvent>> {
        let event: Option<CarpoolEvent> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM carpool_events WHERE id = ?1 AND user_id = ?2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Lists the owner's events in schedule order (earliest drop-off first).
    pub async fn list(&self, user_id: i64, limit: u32, offset: u32) -> DbResult<Vec<CarpoolEvent>> {
        let events: Vec<CarpoolEvent> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM carpool_events
             WHERE user_id = ?1
             ORDER BY drop_off_time
             LIMIT ?2 OFFSET ?3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Lists the owner's most recently created events. This is the result
    /// set for blank and wildcard search queries.
    pub async fn list_recent(&self, user_id: i64, limit: u32) -> DbResult<Vec<CarpoolEvent>> {
        let events: Vec<CarpoolEvent> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM carpool_events
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Replaces an event's fields.
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        update: &CarpoolEventUpdate,
    ) -> DbResult<CarpoolEvent> {
        validate_carpool_fields(&update.description, &update.destination)?;

        debug!(user_id, id, "Updating carpool event");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE carpool_events
             SET description = ?3, destination = ?4, drop_off_time = ?5, notes = ?6, updated_at = ?7
             WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .bind(&update.description)
        .bind(&update.destination)
        .bind(update.drop_off_time)
        .bind(&update.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Carpool event", id));
        }

        self.get(user_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Carpool event", id))
    }

    /// Deletes an event.
    pub async fn delete(&self, user_id: i64, id: i64) -> DbResult<()> {
        debug!(user_id, id, "Deleting carpool event");

        let result = sqlx::query("DELETE FROM carpool_events WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Carpool event", id));
        }

        Ok(())
    }

    /// Fallback substring search: every token must match the description,
    /// the destination, or the notes. Owner-scoped, newest first.
    pub async fn search_fallback(
        &self,
        user_id: i64,
        tokens: &[String],
        limit: u32,
    ) -> DbResult<Vec<CarpoolEvent>> {
        debug!(user_id, ?tokens, "Fallback carpool search");

        let mut qb = sqlx::QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM carpool_events WHERE user_id = "
        ));
        qb.push_bind(user_id);

        for token in tokens {
            let pattern = format!("%{}%", token.to_lowercase());
            qb.push(" AND (LOWER(description) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR LOWER(destination) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR LOWER(COALESCE(notes, '')) LIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(limit);

        let events: Vec<CarpoolEvent> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(events)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    async fn test_db() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create("fam@example.com", None).await.unwrap();
        (db, user.id)
    }

    fn event(description: &str, destination: &str, hours_out: i64) -> NewCarpoolEvent {
        NewCarpoolEvent {
            description: description.into(),
            destination: destination.into(),
            drop_off_time: Utc::now() + Duration::hours(hours_out),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let (db, user_id) = test_db().await;
        let repo = db.carpool_events();

        let created = repo
            .create(user_id, &event("Soccer pickup", "Lincoln Field", 4))
            .await
            .unwrap();

        let fetched = repo.get(user_id, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.destination, "Lincoln Field");

        let updated = repo
            .update(
                user_id,
                created.id,
                &CarpoolEventUpdate {
                    description: "Soccer pickup".into(),
                    destination: "Roosevelt Gym".into(),
                    drop_off_time: fetched.drop_off_time,
                    notes: Some("gate B".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.destination, "Roosevelt Gym");
        assert!(updated.updated_at >= updated.created_at);

        repo.delete(user_id, created.id).await.unwrap();
        assert!(repo.get(user_id, created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_schedule_ordered() {
        let (db, user_id) = test_db().await;
        let repo = db.carpool_events();

        repo.create(user_id, &event("Late run", "School", 8)).await.unwrap();
        repo.create(user_id, &event("Early run", "School", 1)).await.unwrap();

        let events = repo.list(user_id, 10, 0).await.unwrap();
        assert_eq!(events[0].description, "Early run");
        assert_eq!(events[1].description, "Late run");
    }

    #[tokio::test]
    async fn test_search_fallback_owner_scoped() {
        let (db, user_id) = test_db().await;
        let repo = db.carpool_events();

        repo.create(user_id, &event("Soccer pickup", "Lincoln Field", 2))
            .await
            .unwrap();

        let other = db.users().create("other@example.com", None).await.unwrap();
        repo.create(other.id, &event("Soccer dropoff", "Lincoln Field", 2))
            .await
            .unwrap();

        let hits = repo
            .search_fallback(user_id, &["soccer".into()], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].user_id, user_id);

        // Token matching spans description and destination
        let hits = repo
            .search_fallback(user_id, &["soccer".into(), "lincoln".into()], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let hits = repo
            .search_fallback(user_id, &["soccer".into(), "piano".into()], 10)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
