//! # Search Service
//!
//! The one entry point request handlers use for search. Owns the
//! availability decision, the best-effort write path, and the
//! fallback-backed read path.
//!
//! ## Read Path Per Request
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  search(owner, q)                                                   │
//! │       │                                                             │
//! │       ├── q blank or "*" ──────────────► owner's recent rows (DB)   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ATTEMPT_INDEX (owner term + multi_match, size-capped)              │
//! │       │                                                             │
//! │       ├── error ───────► log, treat as zero hits                    │
//! │       ├── zero hits ───► one retry with *wildcarded* terms          │
//! │       │                                                             │
//! │       ├── ids ─────────► hydrate each from DB (owner-scoped),       │
//! │       │                  silently dropping stale ids                │
//! │       │                                                             │
//! │       └── still zero ──► FALLBACK_DATABASE_QUERY                    │
//! │                          (substring AND of tokens, newest first)    │
//! │                                                                     │
//! │  Only a database error may escape; backend trouble never does.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Path Per Commit
//! Strictly post-commit, fire-and-forget: the row is already durable
//! when `index_*` runs, and nothing here can roll it back. A failure is
//! logged with the entity id and reported as `false`, nothing more.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use hearth_core::plan::{build_meal_plan, PLAN_DAYS};
use hearth_core::query::{is_match_all, tokenize, wildcard_wrap};
use hearth_core::types::{
    CarpoolEvent, Checklist, ChecklistItem, ChecklistWithItems, EntityKind, Meal, MealSuggestion,
};
use hearth_db::Database;

use crate::backend::{IndexQuery, SearchBackend, SearchStatus};
use crate::config::SearchConfig;
use crate::document::{
    CarpoolDocument, ChecklistDocument, IndexNames, MealDocument, CARPOOL_FIELDS,
    CHECKLIST_FIELDS, MEAL_FIELDS,
};
use crate::elastic::ElasticBackend;
use crate::error::SearchResult;

/// Search-synchronization service.
///
/// Constructed once at startup and handed to request handlers; the
/// availability status is decided at construction and never changes.
/// The database handle it carries is the system of record; the index
/// behind `backend` is a disposable cache.
#[derive(Clone)]
pub struct SearchService {
    db: Database,
    backend: Option<Arc<dyn SearchBackend>>,
    status: SearchStatus,
    names: IndexNames,
    limit: u32,
}

impl SearchService {
    /// Builds the service from configuration, probing the backend once.
    ///
    /// Never fails: a dead or misconfigured backend degrades the service
    /// to `Unavailable`, where every search runs on the database alone.
    pub async fn connect(config: &SearchConfig, db: Database) -> Self {
        let names = IndexNames::new(&config.index_prefix);

        if !config.enabled {
            info!("Search is disabled in configuration. Index operations will be no-ops.");
            return SearchService {
                db,
                backend: None,
                status: SearchStatus::Disabled,
                names,
                limit: config.result_limit,
            };
        }

        let backend = match ElasticBackend::new(config) {
            Ok(backend) => backend,
            Err(e) => {
                warn!(error = %e, "Failed to construct search backend. Search functionality will be degraded.");
                return SearchService {
                    db,
                    backend: None,
                    status: SearchStatus::Unavailable,
                    names,
                    limit: config.result_limit,
                };
            }
        };

        let backend: Arc<dyn SearchBackend> = Arc::new(backend);
        let status = match backend.ping().await {
            Ok(()) => {
                info!(endpoint = %config.endpoint, "Connected to search backend");
                if let Err(e) = backend.prepare_indices().await {
                    warn!(error = %e, "Failed to prepare search indices");
                }
                SearchStatus::Available
            }
            Err(e) => {
                warn!(error = %e, "Search backend is not reachable. Search functionality will be degraded.");
                SearchStatus::Unavailable
            }
        };

        SearchService {
            db,
            backend: Some(backend),
            status,
            names,
            limit: config.result_limit,
        }
    }

    /// Builds the service around an injected backend implementation.
    ///
    /// This is the dependency-injection seam: tests and alternative
    /// adapters plug in here without any network probe.
    pub fn with_backend(
        config: &SearchConfig,
        db: Database,
        backend: Arc<dyn SearchBackend>,
        status: SearchStatus,
    ) -> Self {
        SearchService {
            db,
            backend: Some(backend),
            status,
            names: IndexNames::new(&config.index_prefix),
            limit: config.result_limit,
        }
    }

    /// The availability decided at construction.
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// True only when index calls are actually made.
    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }

    // =========================================================================
    // Write Path (best-effort, never raises)
    // =========================================================================

    /// Projects a committed checklist (with its items) into the index.
    pub async fn index_checklist(&self, checklist: &Checklist, items: &[ChecklistItem]) -> bool {
        self.upsert_best_effort(
            EntityKind::Checklist,
            checklist.id,
            &ChecklistDocument::project(checklist, items),
        )
        .await
    }

    /// Projects a committed carpool event into the index.
    pub async fn index_carpool_event(&self, event: &CarpoolEvent) -> bool {
        self.upsert_best_effort(EntityKind::CarpoolEvent, event.id, &CarpoolDocument::from(event))
            .await
    }

    /// Projects a committed meal into the index.
    pub async fn index_meal(&self, meal: &Meal) -> bool {
        self.upsert_best_effort(EntityKind::Meal, meal.id, &MealDocument::from(meal))
            .await
    }

    /// Removes an entity's document after its row has been deleted.
    ///
    /// Best-effort like the writes: a missing document or a dead backend
    /// is logged and reported as `false`, and the already-committed
    /// database deletion stands regardless.
    pub async fn delete_from_index(&self, kind: EntityKind, id: i64) -> bool {
        if !self.status.is_available() {
            return true;
        }
        let Some(backend) = &self.backend else {
            return true;
        };

        match backend.delete_document(self.names.for_kind(kind), id).await {
            Ok(()) => true,
            Err(e) => {
                error!(kind = %kind, id, error = %e, "Failed to delete document from index");
                false
            }
        }
    }

    async fn upsert_best_effort(&self, kind: EntityKind, id: i64, doc: &impl Serialize) -> bool {
        if !self.status.is_available() {
            return true;
        }
        let Some(backend) = &self.backend else {
            return true;
        };

        let doc = match serde_json::to_value(doc) {
            Ok(doc) => doc,
            Err(e) => {
                error!(kind = %kind, id, error = %e, "Failed to serialize index document");
                return false;
            }
        };

        match backend.upsert_document(self.names.for_kind(kind), id, &doc).await {
            Ok(()) => true,
            Err(e) => {
                error!(kind = %kind, id, error = %e, "Failed to index entity");
                false
            }
        }
    }

    // =========================================================================
    // Read Path (index first, database fallback)
    // =========================================================================

    /// Searches the owner's checklists.
    pub async fn search_checklists(
        &self,
        user_id: i64,
        query: &str,
    ) -> SearchResult<Vec<ChecklistWithItems>> {
        let repo = self.db.checklists();

        if is_match_all(query) {
            return Ok(repo.list_recent(user_id, self.limit).await?);
        }

        let ids = self
            .query_index(&self.names.checklists, CHECKLIST_FIELDS, user_id, query)
            .await;

        if ids.is_empty() {
            let tokens = tokenize(query);
            return Ok(repo.search_fallback(user_id, &tokens, self.limit).await?);
        }

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            // The index may be stale; ids that no longer resolve for this
            // owner are dropped
            if let Some(found) = repo.get(user_id, id).await? {
                results.push(found);
            }
        }
        Ok(results)
    }

    /// Searches the owner's carpool events.
    pub async fn search_carpool_events(
        &self,
        user_id: i64,
        query: &str,
    ) -> SearchResult<Vec<CarpoolEvent>> {
        let repo = self.db.carpool_events();

        if is_match_all(query) {
            return Ok(repo.list_recent(user_id, self.limit).await?);
        }

        let ids = self
            .query_index(&self.names.carpool, CARPOOL_FIELDS, user_id, query)
            .await;

        if ids.is_empty() {
            let tokens = tokenize(query);
            return Ok(repo.search_fallback(user_id, &tokens, self.limit).await?);
        }

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(found) = repo.get(user_id, id).await? {
                results.push(found);
            }
        }
        Ok(results)
    }

    /// Searches the owner's meals.
    pub async fn search_meals(&self, user_id: i64, query: &str) -> SearchResult<Vec<Meal>> {
        let repo = self.db.meals();

        if is_match_all(query) {
            return Ok(repo.list_recent(user_id, self.limit).await?);
        }

        let ids = self
            .query_index(&self.names.meals, MEAL_FIELDS, user_id, query)
            .await;

        if ids.is_empty() {
            let tokens = tokenize(query);
            return Ok(repo.search_fallback(user_id, &tokens, self.limit).await?);
        }

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(found) = repo.get(user_id, id).await? {
                results.push(found);
            }
        }
        Ok(results)
    }

    /// Suggests a week of meals from the owner's history, most frequent
    /// dishes first.
    pub async fn suggest_meal_plan(&self, user_id: i64) -> SearchResult<Vec<MealSuggestion>> {
        let counts = self
            .db
            .meals()
            .frequent_names(user_id, PLAN_DAYS as u32)
            .await?;
        Ok(build_meal_plan(&counts))
    }

    /// Resolves a query to entity ids via the index: primary query, then
    /// one wildcard retry on zero hits. Backend trouble of any kind is
    /// logged and reported as zero ids, which sends the caller to the
    /// relational fallback.
    async fn query_index(
        &self,
        index: &str,
        fields: &[&str],
        owner_id: i64,
        query: &str,
    ) -> Vec<i64> {
        if !self.status.is_available() {
            return Vec::new();
        }
        let Some(backend) = &self.backend else {
            return Vec::new();
        };

        let primary = IndexQuery {
            index,
            owner_id,
            text: query,
            fields,
            limit: self.limit,
            partial: false,
        };

        let ids = match backend.query_ids(&primary).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(index, error = %e, "Index query failed, falling back to database");
                return Vec::new();
            }
        };

        if !ids.is_empty() {
            return ids;
        }

        // Zero hits: retry once with wildcarded terms for partial matches
        let wildcard = wildcard_wrap(query);
        let retry = IndexQuery {
            index,
            owner_id,
            text: &wildcard,
            fields,
            limit: self.limit,
            partial: true,
        };

        match backend.query_ids(&retry).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(index, error = %e, "Wildcard index query failed, falling back to database");
                Vec::new()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use async_trait::async_trait;
    use chrono::Utc;
    use hearth_core::types::{NewCarpoolEvent, NewChecklist, NewChecklistItem, NewMeal};
    use hearth_db::DbConfig;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted in-memory backend that records every call.
    #[derive(Default)]
    struct FakeBackend {
        /// Queued responses for `query_ids`; empty queue means zero hits.
        query_results: Mutex<VecDeque<Result<Vec<i64>, BackendError>>>,

        /// (index, text, partial) per query, in order.
        queries: Mutex<Vec<(String, String, bool)>>,

        /// (index, id) per upsert.
        upserts: Mutex<Vec<(String, i64)>>,

        /// (index, id) per delete.
        deletes: Mutex<Vec<(String, i64)>>,

        /// When true every write and delete fails.
        fail_writes: bool,
    }

    impl FakeBackend {
        fn failing_writes() -> Self {
            FakeBackend {
                fail_writes: true,
                ..FakeBackend::default()
            }
        }

        fn queue_result(&self, result: Result<Vec<i64>, BackendError>) {
            self.query_results.lock().unwrap().push_back(result);
        }

        fn status_error() -> BackendError {
            BackendError::Status {
                status: 503,
                body: "unavailable".into(),
            }
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn ping(&self) -> Result<(), BackendError> {
            Ok(())
        }

        async fn prepare_indices(&self) -> Result<(), BackendError> {
            Ok(())
        }

        async fn upsert_document(
            &self,
            index: &str,
            id: i64,
            _doc: &Value,
        ) -> Result<(), BackendError> {
            self.upserts.lock().unwrap().push((index.to_string(), id));
            if self.fail_writes {
                return Err(Self::status_error());
            }
            Ok(())
        }

        async fn delete_document(&self, index: &str, id: i64) -> Result<(), BackendError> {
            self.deletes.lock().unwrap().push((index.to_string(), id));
            if self.fail_writes {
                return Err(Self::status_error());
            }
            Ok(())
        }

        async fn query_ids(&self, query: &IndexQuery<'_>) -> Result<Vec<i64>, BackendError> {
            self.queries.lock().unwrap().push((
                query.index.to_string(),
                query.text.to_string(),
                query.partial,
            ));
            self.query_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(Vec::new()))
        }
    }

    async fn test_db() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create("fam@example.com", None).await.unwrap();
        (db, user.id)
    }

    fn service_with(
        db: Database,
        backend: Arc<FakeBackend>,
        status: SearchStatus,
    ) -> SearchService {
        let config = SearchConfig::new("http://unused").index_prefix("hearth-test");
        SearchService::with_backend(&config, db, backend, status)
    }

    fn groceries() -> NewChecklist {
        NewChecklist {
            title: "Groceries".into(),
            category: Some("Shopping".into()),
            items: vec![NewChecklistItem {
                text: "milk".into(),
                is_required: true,
            }],
        }
    }

    fn tacos() -> NewMeal {
        NewMeal {
            name: "Beef tacos".into(),
            meal_time: Some("Dinner".into()),
            details: None,
            planned_date: Utc::now().date_naive(),
        }
    }

    #[tokio::test]
    async fn test_disabled_search_equals_fallback_and_writes_noop() {
        let (db, user_id) = test_db().await;
        let checklist = db.checklists().create(user_id, &groceries()).await.unwrap();

        let service = SearchService::connect(&SearchConfig::disabled(), db.clone()).await;
        assert_eq!(service.status(), SearchStatus::Disabled);

        // Writes succeed without any backend
        assert!(service
            .index_checklist(&checklist.checklist, &checklist.items)
            .await);
        assert!(service
            .delete_from_index(EntityKind::Checklist, 12345)
            .await);

        // The search result is exactly the direct fallback result
        let via_service = service.search_checklists(user_id, "milk").await.unwrap();
        let direct = db
            .checklists()
            .search_fallback(user_id, &["milk".into()], 10)
            .await
            .unwrap();
        assert_eq!(via_service.len(), 1);
        assert_eq!(via_service.len(), direct.len());
        assert_eq!(via_service[0].checklist.id, direct[0].checklist.id);
    }

    #[tokio::test]
    async fn test_blank_and_wildcard_list_recent_without_backend_calls() {
        let (db, user_id) = test_db().await;
        for name in ["Beef tacos", "Lasagna"] {
            let mut meal = tacos();
            meal.name = name.into();
            db.meals().create(user_id, &meal).await.unwrap();
        }

        let backend = Arc::new(FakeBackend::default());
        let service = service_with(db, backend.clone(), SearchStatus::Available);

        let blank = service.search_meals(user_id, "  ").await.unwrap();
        let star = service.search_meals(user_id, "*").await.unwrap();
        assert_eq!(blank.len(), 2);
        assert_eq!(star.len(), 2);
        // Newest first
        assert_eq!(blank[0].name, "Lasagna");

        // The index was never consulted
        assert!(backend.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_hits_hydrate_and_drop_stale_ids() {
        let (db, user_id) = test_db().await;
        let meal = db.meals().create(user_id, &tacos()).await.unwrap();

        let backend = Arc::new(FakeBackend::default());
        // One real id and one that no longer exists in the database
        backend.queue_result(Ok(vec![meal.id, 99_999]));

        let service = service_with(db, backend.clone(), SearchStatus::Available);
        let results = service.search_meals(user_id, "tacos").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, meal.id);

        // Hits were found: no wildcard retry happened
        assert_eq!(backend.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_hits_retries_wildcard_then_falls_back() {
        let (db, user_id) = test_db().await;
        db.checklists().create(user_id, &groceries()).await.unwrap();

        let backend = Arc::new(FakeBackend::default());
        backend.queue_result(Ok(Vec::new())); // primary: empty
        backend.queue_result(Ok(Vec::new())); // wildcard retry: empty

        let service = service_with(db, backend.clone(), SearchStatus::Available);
        let results = service.search_checklists(user_id, "milk").await.unwrap();

        // Fallback matched via the item text
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].checklist.title, "Groceries");

        let queries = backend.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].1, "milk");
        assert!(!queries[0].2);
        assert_eq!(queries[1].1, "*milk*");
        assert!(queries[1].2);
    }

    #[tokio::test]
    async fn test_backend_error_falls_back_without_surfacing() {
        let (db, user_id) = test_db().await;
        let event = db
            .carpool_events()
            .create(
                user_id,
                &NewCarpoolEvent {
                    description: "Soccer pickup".into(),
                    destination: "Lincoln Field".into(),
                    drop_off_time: Utc::now(),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let backend = Arc::new(FakeBackend::default());
        backend.queue_result(Err(FakeBackend::status_error()));

        let service = service_with(db, backend.clone(), SearchStatus::Available);
        let results = service
            .search_carpool_events(user_id, "soccer")
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, event.id);

        // An error is not retried with wildcards; it goes straight to the DB
        assert_eq!(backend.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_index_write_leaves_entity_persisted() {
        let (db, user_id) = test_db().await;
        let meal = db.meals().create(user_id, &tacos()).await.unwrap();

        let backend = Arc::new(FakeBackend::failing_writes());
        let service = service_with(db.clone(), backend.clone(), SearchStatus::Available);

        assert!(!service.index_meal(&meal).await);
        assert_eq!(backend.upserts.lock().unwrap().len(), 1);

        // The row is untouched by the index failure
        let persisted = db.meals().get(user_id, meal.id).await.unwrap();
        assert!(persisted.is_some());
    }

    #[tokio::test]
    async fn test_delete_propagation_failure_is_swallowed() {
        let (db, user_id) = test_db().await;
        let meal = db.meals().create(user_id, &tacos()).await.unwrap();

        // Database delete commits first, then the index is told
        db.meals().delete(user_id, meal.id).await.unwrap();

        let backend = Arc::new(FakeBackend::failing_writes());
        let service = service_with(db.clone(), backend.clone(), SearchStatus::Available);

        assert!(!service.delete_from_index(EntityKind::Meal, meal.id).await);
        assert_eq!(
            backend.deletes.lock().unwrap().as_slice(),
            &[("hearth-test-meals".to_string(), meal.id)]
        );

        // The deletion stands
        assert!(db.meals().get(user_id, meal.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_poisoned_index_cannot_leak_other_owners_rows() {
        let (db, user_id) = test_db().await;
        let other = db.users().create("other@example.com", None).await.unwrap();
        let foreign_meal = db.meals().create(other.id, &tacos()).await.unwrap();

        // The index (wrongly) returns another owner's id; owner-scoped
        // hydration drops it
        let backend = Arc::new(FakeBackend::default());
        backend.queue_result(Ok(vec![foreign_meal.id]));

        let service = service_with(db, backend, SearchStatus::Available);
        let results = service.search_meals(user_id, "tacos").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_behaves_like_disabled_for_callers() {
        let (db, user_id) = test_db().await;
        db.checklists().create(user_id, &groceries()).await.unwrap();

        let backend = Arc::new(FakeBackend::default());
        let service = service_with(db, backend.clone(), SearchStatus::Unavailable);

        assert!(!service.is_available());

        let unsaved = Meal {
            id: 1,
            user_id,
            name: "Beef tacos".into(),
            meal_time: None,
            details: None,
            planned_date: Utc::now().date_naive(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(service.index_meal(&unsaved).await);

        let results = service.search_checklists(user_id, "milk").await.unwrap();
        assert_eq!(results.len(), 1);

        // No network-shaped calls were made at all
        assert!(backend.queries.lock().unwrap().is_empty());
        assert!(backend.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_meal_plan_ranks_by_frequency() {
        let (db, user_id) = test_db().await;
        for _ in 0..3 {
            db.meals().create(user_id, &tacos()).await.unwrap();
        }
        let mut lasagna = tacos();
        lasagna.name = "Lasagna".into();
        db.meals().create(user_id, &lasagna).await.unwrap();

        let service = SearchService::connect(&SearchConfig::disabled(), db).await;
        let plan = service.suggest_meal_plan(user_id).await.unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].day, 1);
        assert_eq!(plan[0].meal, "Beef tacos");
        assert_eq!(plan[1].meal, "Lasagna");
    }
}
