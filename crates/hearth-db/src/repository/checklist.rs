//! # Checklist Repository
//!
//! Database operations for checklists, their items, and run-through
//! tracking.
//!
//! ## Key Operations
//! - CRUD for checklists and their items (single transaction per create)
//! - Fallback substring search across title, category, and item text
//! - Run-through tracking: start a run, check items off, complete
//! - Shopping-list append with case-insensitive dedup
//!
//! ## Fallback Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  tokens: ["beef", "tacos"]  (AND semantics)                         │
//! │                                                                     │
//! │  WHERE user_id = ?                                                  │
//! │    AND (title|category|any item text) LIKE %beef%                   │
//! │    AND (title|category|any item text) LIKE %tacos%                  │
//! │  ORDER BY created_at DESC                                           │
//! │  LIMIT n                                                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hearth_core::types::{
    missing_required_items, Checklist, ChecklistItem, ChecklistRun, ChecklistRunItem,
    ChecklistRunWithItems, ChecklistUpdate, ChecklistWithItems, NewChecklist,
};
use hearth_core::validation::{validate_checklist, validate_item_text, validate_title};

/// Category assigned to auto-created shopping lists.
const SHOPPING_CATEGORY: &str = "Shopping";

/// Result of appending items to a named checklist.
#[derive(Debug, Clone)]
pub struct ShoppingListUpdate {
    /// The checklist the items landed on (created if it didn't exist).
    pub checklist_id: i64,

    /// Item texts actually added (duplicates are skipped).
    pub added: Vec<String>,
}

/// Repository for checklist database operations.
#[derive(Debug, Clone)]
pub struct ChecklistRepository {
    pool: SqlitePool,
}

impl ChecklistRepository {
    /// Creates a new ChecklistRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ChecklistRepository { pool }
    }

    /// Creates a checklist with its initial items in one transaction.
    pub async fn create(&self, user_id: i64, input: &NewChecklist) -> DbResult<ChecklistWithItems> {
        validate_checklist(input)?;

        debug!(user_id, title = %input.title, "Creating checklist");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO checklists (user_id, title, category, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.category)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let checklist_id = result.last_insert_rowid();

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let result = sqlx::query(
                "INSERT INTO checklist_items (checklist_id, text, is_required) VALUES (?1, ?2, ?3)",
            )
            .bind(checklist_id)
            .bind(&item.text)
            .bind(item.is_required)
            .execute(&mut *tx)
            .await?;

            items.push(ChecklistItem {
                id: result.last_insert_rowid(),
                checklist_id,
                text: item.text.clone(),
                is_required: item.is_required,
            });
        }

        tx.commit().await?;

        Ok(ChecklistWithItems {
            checklist: Checklist {
                id: checklist_id,
                user_id,
                title: input.title.clone(),
                category: input.category.clone(),
                created_at: now,
            },
            items,
        })
    }

    /// Gets a checklist with its items, scoped to the owner.
    ///
    /// Returns `Ok(None)` when the id doesn't exist or belongs to a
    /// different user.
    pub async fn get(&self, user_id: i64, id: i64) -> DbResult<Option<ChecklistWithItems>> {
        let checklist: Option<Checklist> = sqlx::query_as(
            "SELECT id, user_id, title, category, created_at
             FROM checklists
             WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match checklist {
            Some(checklist) => {
                let items = self.items_of(checklist.id).await?;
                Ok(Some(ChecklistWithItems { checklist, items }))
            }
            None => Ok(None),
        }
    }

    /// Lists the owner's checklists, newest first.
    pub async fn list(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<ChecklistWithItems>> {
        let checklists: Vec<Checklist> = sqlx::query_as(
            "SELECT id, user_id, title, category, created_at
             FROM checklists
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(checklists).await
    }

    /// Lists the owner's most recent checklists. This is the result set
    /// for blank and wildcard search queries.
    pub async fn list_recent(&self, user_id: i64, limit: u32) -> DbResult<Vec<ChecklistWithItems>> {
        self.list(user_id, limit, 0).await
    }

    /// Replaces a checklist's title and category.
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        update: &ChecklistUpdate,
    ) -> DbResult<ChecklistWithItems> {
        validate_title(&update.title)?;

        debug!(user_id, id, "Updating checklist");

        let result = sqlx::query(
            "UPDATE checklists SET title = ?3, category = ?4 WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .bind(&update.title)
        .bind(&update.category)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Checklist", id));
        }

        self.get(user_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Checklist", id))
    }

    /// Deletes a checklist. Items and runs cascade away with it.
    pub async fn delete(&self, user_id: i64, id: i64) -> DbResult<()> {
        debug!(user_id, id, "Deleting checklist");

        let result = sqlx::query("DELETE FROM checklists WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Checklist", id));
        }

        Ok(())
    }

    /// Fallback substring search: every token must match the title, the
    /// category, or some item's text. Owner-scoped, newest first.
    pub async fn search_fallback(
        &self,
        user_id: i64,
        tokens: &[String],
        limit: u32,
    ) -> DbResult<Vec<ChecklistWithItems>> {
        debug!(user_id, ?tokens, "Fallback checklist search");

        let mut qb = sqlx::QueryBuilder::new(
            "SELECT c.id, c.user_id, c.title, c.category, c.created_at
             FROM checklists c
             WHERE c.user_id = ",
        );
        qb.push_bind(user_id);

        for token in tokens {
            let pattern = format!("%{}%", token.to_lowercase());
            qb.push(" AND (LOWER(c.title) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR LOWER(COALESCE(c.category, '')) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(
                " OR EXISTS (SELECT 1 FROM checklist_items i
                     WHERE i.checklist_id = c.id AND LOWER(i.text) LIKE ",
            );
            qb.push_bind(pattern);
            qb.push("))");
        }

        qb.push(" ORDER BY c.created_at DESC, c.id DESC LIMIT ");
        qb.push_bind(limit);

        let checklists: Vec<Checklist> = qb.build_query_as().fetch_all(&self.pool).await?;

        self.hydrate(checklists).await
    }

    /// Finds a checklist by exact title, scoped to the owner.
    pub async fn find_by_title(
        &self,
        user_id: i64,
        title: &str,
    ) -> DbResult<Option<ChecklistWithItems>> {
        let checklist: Option<Checklist> = sqlx::query_as(
            "SELECT id, user_id, title, category, created_at
             FROM checklists
             WHERE user_id = ?1 AND title = ?2",
        )
        .bind(user_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        match checklist {
            Some(checklist) => {
                let items = self.items_of(checklist.id).await?;
                Ok(Some(ChecklistWithItems { checklist, items }))
            }
            None => Ok(None),
        }
    }

    /// Appends items to the checklist with the given title, creating it
    /// (category "Shopping") when missing. Items already on the list are
    /// skipped, compared case-insensitively.
    pub async fn add_items_to_named(
        &self,
        user_id: i64,
        title: &str,
        texts: &[String],
    ) -> DbResult<ShoppingListUpdate> {
        validate_title(title)?;

        let checklist = match self.find_by_title(user_id, title).await? {
            Some(existing) => existing,
            None => {
                debug!(user_id, title, "Creating shopping checklist");
                self.create(
                    user_id,
                    &NewChecklist {
                        title: title.to_string(),
                        category: Some(SHOPPING_CATEGORY.to_string()),
                        items: Vec::new(),
                    },
                )
                .await?
            }
        };

        let existing: Vec<String> = checklist
            .items
            .iter()
            .map(|item| item.text.to_lowercase())
            .collect();

        let mut added = Vec::new();
        for text in texts {
            if existing.contains(&text.to_lowercase()) {
                continue;
            }
            validate_item_text(text)?;

            sqlx::query(
                "INSERT INTO checklist_items (checklist_id, text, is_required) VALUES (?1, ?2, 1)",
            )
            .bind(checklist.checklist.id)
            .bind(text)
            .execute(&self.pool)
            .await?;

            added.push(text.clone());
        }

        debug!(
            checklist_id = checklist.checklist.id,
            added = added.len(),
            "Appended shopping items"
        );

        Ok(ShoppingListUpdate {
            checklist_id: checklist.checklist.id,
            added,
        })
    }

    // =========================================================================
    // Run Tracking
    // =========================================================================

    /// Starts a new run of a checklist: one run row plus one run item per
    /// checklist item, all unchecked.
    pub async fn start_run(
        &self,
        user_id: i64,
        checklist_id: i64,
        email_sent_to: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<ChecklistRunWithItems> {
        // Verify the checklist exists and belongs to the caller
        let checklist = self
            .get(user_id, checklist_id)
            .await?
            .ok_or_else(|| DbError::not_found("Checklist", checklist_id))?;

        debug!(user_id, checklist_id, "Starting checklist run");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO checklist_runs (checklist_id, started_at, email_sent_to, notes)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(checklist_id)
        .bind(now)
        .bind(email_sent_to)
        .bind(notes)
        .execute(&mut *tx)
        .await?;

        let run_id = result.last_insert_rowid();

        let mut run_items = Vec::with_capacity(checklist.items.len());
        for item in &checklist.items {
            let result = sqlx::query(
                "INSERT INTO checklist_run_items (run_id, item_id, completed) VALUES (?1, ?2, 0)",
            )
            .bind(run_id)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;

            run_items.push(ChecklistRunItem {
                id: result.last_insert_rowid(),
                run_id,
                item_id: item.id,
                completed: false,
                notes: None,
            });
        }

        tx.commit().await?;

        Ok(ChecklistRunWithItems {
            run: ChecklistRun {
                id: run_id,
                checklist_id,
                started_at: now,
                completed_at: None,
                email_sent_to: email_sent_to.map(str::to_string),
                notes: notes.map(str::to_string),
            },
            run_items,
        })
    }

    /// Gets a run with its per-item states, verifying ownership through
    /// the parent checklist.
    pub async fn get_run(&self, user_id: i64, run_id: i64) -> DbResult<Option<ChecklistRunWithItems>> {
        let run: Option<ChecklistRun> = sqlx::query_as(
            "SELECT r.id, r.checklist_id, r.started_at, r.completed_at, r.email_sent_to, r.notes
             FROM checklist_runs r
             INNER JOIN checklists c ON c.id = r.checklist_id
             WHERE r.id = ?1 AND c.user_id = ?2",
        )
        .bind(run_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match run {
            Some(run) => {
                let run_items: Vec<ChecklistRunItem> = sqlx::query_as(
                    "SELECT id, run_id, item_id, completed, notes
                     FROM checklist_run_items
                     WHERE run_id = ?1
                     ORDER BY id",
                )
                .bind(run.id)
                .fetch_all(&self.pool)
                .await?;

                Ok(Some(ChecklistRunWithItems { run, run_items }))
            }
            None => Ok(None),
        }
    }

    /// Updates one item's completion state within a run.
    pub async fn set_run_item(
        &self,
        user_id: i64,
        run_id: i64,
        item_id: i64,
        completed: bool,
        notes: Option<&str>,
    ) -> DbResult<()> {
        // Ownership check via the parent checklist
        self.get_run(user_id, run_id)
            .await?
            .ok_or_else(|| DbError::not_found("Checklist run", run_id))?;

        let result = sqlx::query(
            "UPDATE checklist_run_items SET completed = ?3, notes = ?4
             WHERE run_id = ?1 AND item_id = ?2",
        )
        .bind(run_id)
        .bind(item_id)
        .bind(completed)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Run item", item_id));
        }

        Ok(())
    }

    /// Completes a run.
    ///
    /// Fails when the run is already completed or when any required item
    /// is still unchecked. The caller may provide a report address and
    /// final notes at completion time.
    pub async fn complete_run(
        &self,
        user_id: i64,
        run_id: i64,
        email_sent_to: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<ChecklistRunWithItems> {
        let run = self
            .get_run(user_id, run_id)
            .await?
            .ok_or_else(|| DbError::not_found("Checklist run", run_id))?;

        if run.run.completed_at.is_some() {
            return Err(DbError::RunAlreadyCompleted { run_id });
        }

        let items = self.items_of(run.run.checklist_id).await?;
        let missing = missing_required_items(&items, &run.run_items);
        if !missing.is_empty() {
            return Err(DbError::RequiredItemsIncomplete {
                run_id,
                missing: missing.len(),
            });
        }

        debug!(user_id, run_id, "Completing checklist run");

        let now = Utc::now();
        sqlx::query(
            "UPDATE checklist_runs
             SET completed_at = ?2,
                 email_sent_to = COALESCE(?3, email_sent_to),
                 notes = COALESCE(?4, notes)
             WHERE id = ?1",
        )
        .bind(run_id)
        .bind(now)
        .bind(email_sent_to)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        self.get_run(user_id, run_id)
            .await?
            .ok_or_else(|| DbError::not_found("Checklist run", run_id))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Fetches the items of one checklist.
    async fn items_of(&self, checklist_id: i64) -> DbResult<Vec<ChecklistItem>> {
        let items: Vec<ChecklistItem> = sqlx::query_as(
            "SELECT id, checklist_id, text, is_required
             FROM checklist_items
             WHERE checklist_id = ?1
             ORDER BY id",
        )
        .bind(checklist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Attaches items to a page of checklist rows.
    async fn hydrate(&self, checklists: Vec<Checklist>) -> DbResult<Vec<ChecklistWithItems>> {
        let mut result = Vec::with_capacity(checklists.len());
        for checklist in checklists {
            let items = self.items_of(checklist.id).await?;
            result.push(ChecklistWithItems { checklist, items });
        }
        Ok(result)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use hearth_core::types::NewChecklistItem;

    async fn test_db() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create("fam@example.com", None).await.unwrap();
        (db, user.id)
    }

    fn groceries() -> NewChecklist {
        NewChecklist {
            title: "Groceries".into(),
            category: Some("Shopping".into()),
            items: vec![
                NewChecklistItem {
                    text: "milk".into(),
                    is_required: true,
                },
                NewChecklistItem {
                    text: "bread".into(),
                    is_required: false,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, user_id) = test_db().await;
        let repo = db.checklists();

        let created = repo.create(user_id, &groceries()).await.unwrap();
        assert_eq!(created.items.len(), 2);

        let fetched = repo.get(user_id, created.checklist.id).await.unwrap().unwrap();
        assert_eq!(fetched.checklist.title, "Groceries");
        assert_eq!(fetched.items[0].text, "milk");

        // Another user cannot see it
        let other = db.users().create("other@example.com", None).await.unwrap();
        assert!(repo.get(other.id, created.checklist.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let (db, user_id) = test_db().await;
        let mut input = groceries();
        input.title = "  ".into();

        let err = db.checklists().create(user_id, &input).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let (db, user_id) = test_db().await;
        let repo = db.checklists();

        let created = repo.create(user_id, &groceries()).await.unwrap();
        let run = repo
            .start_run(user_id, created.checklist.id, None, None)
            .await
            .unwrap();

        repo.delete(user_id, created.checklist.id).await.unwrap();

        assert!(repo.get(user_id, created.checklist.id).await.unwrap().is_none());
        assert!(repo.get_run(user_id, run.run.id).await.unwrap().is_none());

        // Deleting again reports NotFound
        assert!(matches!(
            repo.delete(user_id, created.checklist.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_search_fallback_and_semantics() {
        let (db, user_id) = test_db().await;
        let repo = db.checklists();

        repo.create(user_id, &groceries()).await.unwrap();
        repo.create(
            user_id,
            &NewChecklist {
                title: "Camping Trip".into(),
                category: Some("Travel".into()),
                items: vec![NewChecklistItem {
                    text: "tent".into(),
                    is_required: true,
                }],
            },
        )
        .await
        .unwrap();

        // Single token matches via item text, case-insensitively
        let hits = repo
            .search_fallback(user_id, &["MILK".into()], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].checklist.title, "Groceries");

        // AND semantics: both tokens must match somewhere
        let hits = repo
            .search_fallback(user_id, &["camping".into(), "tent".into()], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].checklist.title, "Camping Trip");

        let hits = repo
            .search_fallback(user_id, &["camping".into(), "milk".into()], 10)
            .await
            .unwrap();
        assert!(hits.is_empty());

        // Owner scoping
        let other = db.users().create("other@example.com", None).await.unwrap();
        let hits = repo
            .search_fallback(other.id, &["milk".into()], 10)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_run_lifecycle() {
        let (db, user_id) = test_db().await;
        let repo = db.checklists();

        let checklist = repo.create(user_id, &groceries()).await.unwrap();
        let run = repo
            .start_run(user_id, checklist.checklist.id, None, Some("weekly shop"))
            .await
            .unwrap();
        assert_eq!(run.run_items.len(), 2);

        // Required item "milk" still open: completion refused
        let err = repo
            .complete_run(user_id, run.run.id, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::RequiredItemsIncomplete { .. }));

        // Check off the required item (optional "bread" stays open)
        let milk_id = checklist.items[0].id;
        repo.set_run_item(user_id, run.run.id, milk_id, true, None)
            .await
            .unwrap();

        let completed = repo
            .complete_run(user_id, run.run.id, Some("dad@example.com"), None)
            .await
            .unwrap();
        assert!(completed.run.completed_at.is_some());
        assert_eq!(completed.run.email_sent_to.as_deref(), Some("dad@example.com"));

        // Completing twice is an error
        let err = repo
            .complete_run(user_id, run.run.id, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::RunAlreadyCompleted { .. }));
    }

    #[tokio::test]
    async fn test_add_items_to_named_dedup() {
        let (db, user_id) = test_db().await;
        let repo = db.checklists();

        let first = repo
            .add_items_to_named(user_id, "Weekly Shopping", &["Milk".into(), "Eggs".into()])
            .await
            .unwrap();
        assert_eq!(first.added, vec!["Milk".to_string(), "Eggs".to_string()]);

        // "milk" already present (case-insensitive), only "Butter" lands
        let second = repo
            .add_items_to_named(user_id, "Weekly Shopping", &["milk".into(), "Butter".into()])
            .await
            .unwrap();
        assert_eq!(second.checklist_id, first.checklist_id);
        assert_eq!(second.added, vec!["Butter".to_string()]);

        let list = repo.get(user_id, first.checklist_id).await.unwrap().unwrap();
        assert_eq!(list.items.len(), 3);
        assert_eq!(list.checklist.category.as_deref(), Some("Shopping"));
    }
}
