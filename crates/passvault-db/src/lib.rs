//! Passvault DB - Record store abstractions
//!
//! Repository traits over the record store, with a SQLx/PostgreSQL backend
//! and an in-memory backend used by tests and local development.
//!
//! # Example
//!
//! ```rust,ignore
//! use passvault_db::{create_pool, migrate, Repositories};
//!
//! let pool = create_pool("postgres://localhost/passvault").await?;
//! migrate(&pool).await?;
//! let repos = Repositories::postgres(pool);
//!
//! let account = repos.accounts.find_by_id("acct123").await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pool::{create_pool, create_pool_with_options, migrate, DbPool, PoolOptions};
pub use repo::*;

use std::sync::Arc;

/// All repositories bundled together, backend-agnostic
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub vault: Arc<dyn VaultItemRepository>,
    pub activity: Arc<dyn ActivityLogRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub shares: Arc<dyn ShareRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            accounts: Arc::new(pg::PgAccountRepository::new(pool.clone())),
            payments: Arc::new(pg::PgPaymentRepository::new(pool.clone())),
            vault: Arc::new(pg::PgVaultItemRepository::new(pool.clone())),
            activity: Arc::new(pg::PgActivityLogRepository::new(pool.clone())),
            teams: Arc::new(pg::PgTeamRepository::new(pool.clone())),
            shares: Arc::new(pg::PgShareRepository::new(pool)),
        }
    }

    /// In-memory repositories sharing one store
    pub fn in_memory() -> Self {
        Self::from_memory(memory::MemoryStore::new())
    }

    /// Repositories over an existing in-memory store (tests inspect the store)
    pub fn from_memory(store: memory::MemoryStore) -> Self {
        Self {
            accounts: Arc::new(store.clone()),
            payments: Arc::new(store.clone()),
            vault: Arc::new(store.clone()),
            activity: Arc::new(store.clone()),
            teams: Arc::new(store.clone()),
            shares: Arc::new(store),
        }
    }

    /// Round trip to the record store
    pub async fn check_store(&self) -> DbResult<()> {
        self.accounts.any_admin().await.map(|_| ())
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
