//! # Free-Text Query Helpers
//!
//! Pure helpers shared by the search layer and the relational fallback.
//!
//! ## Query Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  "  Beef Tacos "                                                    │
//! │        │                                                            │
//! │        ├── is_match_all?  ─── no                                    │
//! │        │                                                            │
//! │        ├── tokenize ────────► ["beef", "tacos"]                     │
//! │        │                      (fallback: AND of substring matches)  │
//! │        │                                                            │
//! │        └── wildcard_wrap ───► "*beef* *tacos*"                      │
//! │                               (index retry for partial terms)       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

/// Sentinel meaning "everything" rather than a term to match.
pub const MATCH_ALL: &str = "*";

/// Returns true for queries that should skip matching entirely and list
/// the owner's most recent entities instead: empty, whitespace-only, or
/// the `*` sentinel.
pub fn is_match_all(query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || query == MATCH_ALL
}

/// Splits a query into lowercase whitespace-separated tokens.
///
/// The fallback query requires every token to match at least one
/// searchable field (AND semantics).
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

/// Wraps every token in leading/trailing wildcards for the partial-match
/// retry, e.g. `"beef tacos"` becomes `"*beef* *tacos*"`.
pub fn wildcard_wrap(query: &str) -> String {
    query
        .split_whitespace()
        .map(|t| format!("*{t}*"))
        .collect::<Vec<_>>()
        .join(" ")
}
