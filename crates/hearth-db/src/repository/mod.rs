//! Repository implementations.
//!
//! One repository per aggregate, each a thin value over the shared pool.
//! Owner scoping is enforced here: every single-row read and every write
//! filters by `user_id`, so a caller can never touch another household's
//! rows through this layer.

pub mod carpool;
pub mod checklist;
pub mod meal;
pub mod user;
