//! Application state management
//!
//! Contains shared state accessible across all handlers. Holds no mutable
//! state of its own; the stores guard theirs.

use crate::auth::TokenCodec;
use crate::db::memory::{MemoryAccountStore, MemoryTaskStore, MemoryTimeTrackerStore};
use crate::db::postgres::{PgAccountStore, PgTaskStore, PgTimeTrackerStore};
use crate::db::{AccountStore, TaskStore, TimeTrackerStore};
use deadpool_postgres::Pool;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub time_trackers: Arc<dyn TimeTrackerStore>,
    pub tasks: Arc<dyn TaskStore>,

    /// Access token signer/verifier
    pub tokens: TokenCodec,

    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: Pool, tokens: TokenCodec, bcrypt_cost: u32) -> Self {
        Self {
            accounts: Arc::new(PgAccountStore::new(pool.clone())),
            time_trackers: Arc::new(PgTimeTrackerStore::new(pool.clone())),
            tasks: Arc::new(PgTaskStore::new(pool)),
            tokens,
            bcrypt_cost,
        }
    }

    /// State backed by in-process maps; nothing survives a restart
    pub fn in_memory(tokens: TokenCodec, bcrypt_cost: u32) -> Self {
        Self {
            accounts: Arc::new(MemoryAccountStore::new()),
            time_trackers: Arc::new(MemoryTimeTrackerStore::new()),
            tasks: Arc::new(MemoryTaskStore::new()),
            tokens,
            bcrypt_cost,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
