//! # Key-Value Engine
//!
//! The schema'd object-store engine: one SQLite table per entity category,
//! keyed by an application-chosen string key, holding JSON values.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Key-Value Engine                                   │
//! │                                                                         │
//! │  KvEngine::open(config)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                            │
//! │  │            SqlitePool (WAL)             │                            │
//! │  └─────────────────────────────────────────┘                            │
//! │       │                                                                 │
//! │       ▼  idempotent schema (IF NOT EXISTS)                              │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐                    │
//! │  │ products │ │ articles │ │  orders  │ │  users   │  ...               │
//! │  │ k │ v    │ │ k │ v    │ │ k │ v    │ │ k │ v    │  settings, store   │
//! │  └──────────┘ └──────────┘ └──────────┘ └──────────┘                    │
//! │                                                                         │
//! │  Each table: (k TEXT PRIMARY KEY, v TEXT NOT NULL, updated_at TEXT)     │
//! │  plus json_extract indexes on semantically useful fields, so range      │
//! │  queries never need a full scan:                                        │
//! │    products → category, title      users  → lower(email)                │
//! │    articles → category, title      orders → status                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Model
//! Every operation returns `StorageResult`; an unopenable database or a
//! closed pool is an `Err`, never a silent no-op. The facade layer decides
//! what to do about failures (fall back) - the engine just reports them.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

// =============================================================================
// Object Stores
// =============================================================================

/// The fixed set of object stores the engine manages.
///
/// One table per variant. The set is part of the persisted schema; adding a
/// variant is a schema change and must keep `open` idempotent for existing
/// databases (IF NOT EXISTS handles that).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectStore {
    Products,
    Articles,
    Orders,
    Users,
    /// Facade-backed flat-key blobs live here.
    Settings,
    /// Generic application store (cart/wishlist/session bundle).
    Store,
}

impl ObjectStore {
    /// Every store, in schema-creation order.
    pub const ALL: [ObjectStore; 6] = [
        ObjectStore::Products,
        ObjectStore::Articles,
        ObjectStore::Orders,
        ObjectStore::Users,
        ObjectStore::Settings,
        ObjectStore::Store,
    ];

    /// The backing table name. Only these fixed identifiers are ever
    /// interpolated into SQL.
    pub const fn table(&self) -> &'static str {
        match self {
            ObjectStore::Products => "products",
            ObjectStore::Articles => "articles",
            ObjectStore::Orders => "orders",
            ObjectStore::Users => "users",
            ObjectStore::Settings => "settings",
            ObjectStore::Store => "store",
        }
    }

    /// Index DDL for this store's semantically useful fields.
    const fn index_ddl(&self) -> &'static [&'static str] {
        match self {
            ObjectStore::Products => &[
                "CREATE INDEX IF NOT EXISTS idx_products_category \
                 ON products (json_extract(v, '$.category'))",
                "CREATE INDEX IF NOT EXISTS idx_products_title \
                 ON products (json_extract(v, '$.title'))",
            ],
            ObjectStore::Articles => &[
                "CREATE INDEX IF NOT EXISTS idx_articles_category \
                 ON articles (json_extract(v, '$.category'))",
                "CREATE INDEX IF NOT EXISTS idx_articles_title \
                 ON articles (json_extract(v, '$.title'))",
            ],
            ObjectStore::Orders => &[
                "CREATE INDEX IF NOT EXISTS idx_orders_status \
                 ON orders (json_extract(v, '$.status'))",
            ],
            ObjectStore::Users => &[
                "CREATE INDEX IF NOT EXISTS idx_users_email \
                 ON users (lower(json_extract(v, '$.email')))",
            ],
            ObjectStore::Settings | ObjectStore::Store => &[],
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Engine configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = EngineConfig::new("/path/to/freshko.db")
///     .max_connections(5)
///     .quota_bytes(256 * 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single-process store)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Advertised storage quota for `estimate_usage`.
    /// Default: 512 MiB
    pub quota_bytes: u64,
}

impl EngineConfig {
    /// Creates a new engine configuration with the given path.
    /// The database file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EngineConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            quota_bytes: 512 * 1024 * 1024,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the advertised quota.
    pub fn quota_bytes(mut self, quota: u64) -> Self {
        self.quota_bytes = quota;
        self
    }

    /// Creates an in-memory engine configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let engine = KvEngine::open(EngineConfig::in_memory()).await?;
    /// // Engine is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        EngineConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            quota_bytes: 512 * 1024 * 1024,
        }
    }
}

// =============================================================================
// Usage Estimate
// =============================================================================

/// Storage usage estimate, as reported by `estimate_usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Bytes currently occupied by the database (page_count × page_size).
    pub used_bytes: u64,
    /// Configured quota.
    pub quota_bytes: u64,
}

// =============================================================================
// Engine
// =============================================================================

/// The schema'd object-store engine.
///
/// Clone is cheap - the pool is internally reference-counted, exactly like
/// a database handle should be.
#[derive(Debug, Clone)]
pub struct KvEngine {
    pool: SqlitePool,
    quota_bytes: u64,
}

impl KvEngine {
    /// Opens (creating if absent) the engine database.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite for local-store workloads:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Applies the object-store schema (idempotent: IF NOT EXISTS
    ///    everywhere, so reopening an existing database re-creates nothing
    ///    and loses nothing)
    ///
    /// ## Returns
    /// * `Ok(KvEngine)` - Ready-to-use engine handle
    /// * `Err(StorageError::Unavailable)` - Open or schema creation failed
    pub async fn open(config: EngineConfig) -> StorageResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening key-value engine"
        );

        // sqlite://path creates file if not exists (mode=rwc)
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            // WAL mode: readers don't block writers, writers don't block readers
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL synchronous: safe from corruption, may lose the last
            // transaction on power loss
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let engine = KvEngine {
            pool,
            quota_bytes: config.quota_bytes,
        };

        engine.init_schema().await?;

        info!(
            stores = ObjectStore::ALL.len(),
            max_connections = config.max_connections,
            "Key-value engine ready"
        );

        Ok(engine)
    }

    /// Applies the object-store schema.
    ///
    /// Idempotent: every statement is IF NOT EXISTS, so this is safe on
    /// every open, including the very first.
    async fn init_schema(&self) -> StorageResult<()> {
        for store in ObjectStore::ALL {
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                   k TEXT PRIMARY KEY, \
                   v TEXT NOT NULL, \
                   updated_at TEXT NOT NULL\
                 )",
                store.table()
            );
            sqlx::query(&ddl)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;

            for index in store.index_ddl() {
                sqlx::query(index)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StorageError::Unavailable(e.to_string()))?;
            }
        }

        debug!("Object-store schema applied");
        Ok(())
    }

    /// Gets a value by key.
    ///
    /// ## Returns
    /// * `Ok(Some(value))` - Key present
    /// * `Ok(None)` - Key absent
    /// * `Err(_)` - Engine failure (the facade's fallback trigger)
    pub async fn get(&self, store: ObjectStore, key: &str) -> StorageResult<Option<String>> {
        let sql = format!("SELECT v FROM {} WHERE k = ?1", store.table());

        let value: Option<String> = sqlx::query_scalar(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Inserts or overwrites a value.
    pub async fn put(&self, store: ObjectStore, key: &str, value: &str) -> StorageResult<()> {
        let sql = format!(
            "INSERT INTO {} (k, v, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(k) DO UPDATE SET v = excluded.v, updated_at = excluded.updated_at",
            store.table()
        );

        let now = Utc::now().to_rfc3339();

        sqlx::query(&sql)
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&self.pool)
            .await?;

        debug!(store = store.table(), key, "put");
        Ok(())
    }

    /// Deletes a key. Deleting an absent key is not an error.
    pub async fn delete(&self, store: ObjectStore, key: &str) -> StorageResult<()> {
        let sql = format!("DELETE FROM {} WHERE k = ?1", store.table());

        sqlx::query(&sql).bind(key).execute(&self.pool).await?;

        debug!(store = store.table(), key, "delete");
        Ok(())
    }

    /// Clears one store, or every store when `store` is `None`.
    pub async fn clear(&self, store: Option<ObjectStore>) -> StorageResult<()> {
        match store {
            Some(store) => {
                let sql = format!("DELETE FROM {}", store.table());
                sqlx::query(&sql).execute(&self.pool).await?;
                debug!(store = store.table(), "cleared store");
            }
            None => {
                for store in ObjectStore::ALL {
                    let sql = format!("DELETE FROM {}", store.table());
                    sqlx::query(&sql).execute(&self.pool).await?;
                }
                debug!("cleared all stores");
            }
        }
        Ok(())
    }

    /// Lists every key in a store, sorted.
    pub async fn list_keys(&self, store: ObjectStore) -> StorageResult<Vec<String>> {
        let sql = format!("SELECT k FROM {} ORDER BY k", store.table());

        let keys: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;

        Ok(keys)
    }

    /// Estimates storage usage against the configured quota.
    pub async fn estimate_usage(&self) -> StorageResult<Usage> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await?;
        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await?;

        Ok(Usage {
            used_bytes: (page_count.max(0) as u64) * (page_size.max(0) as u64),
            quota_bytes: self.quota_bytes,
        })
    }

    /// Checks if the engine is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the connection pool.
    ///
    /// After close, every operation fails with `Unavailable` - which is
    /// exactly what facade fallback tests lean on.
    pub async fn close(&self) {
        info!("Closing key-value engine pool");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
