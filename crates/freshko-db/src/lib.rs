//! # freshko-db: Storage Layer for Freshko
//!
//! This crate provides the two storage tiers behind the Freshko domain
//! store, and the one-shot migration between them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Freshko Storage Flow                             │
//! │                                                                         │
//! │  Domain store action (set_json("freshko-orders", ...))                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    freshko-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐     ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Storage    │────►│   KvEngine    │    │  Migration   │  │   │
//! │  │   │  (facade.rs)  │     │  (engine.rs)  │    │(migration.rs)│  │   │
//! │  │   │               │     │               │    │              │  │   │
//! │  │   │ engine first, │  on │ SQLite object │    │ legacy flat  │  │   │
//! │  │   │ flat fallback │ err │ stores (WAL)  │    │ keys → engine│  │   │
//! │  │   └───────┬───────┘     └───────────────┘    └──────────────┘  │   │
//! │  │           │ fallback                                           │   │
//! │  │           ▼                                                    │   │
//! │  │   ┌───────────────┐                                            │   │
//! │  │   │   FlatStore   │  synchronous JSON map file                 │   │
//! │  │   │   (flat.rs)   │  (the localStorage analogue)               │   │
//! │  │   └───────────────┘                                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - The schema'd object-store engine over SQLite
//! - [`flat`] - The synchronous flat-file fallback store
//! - [`facade`] - The two-tier `Storage` facade consumed by the domain store
//! - [`migration`] - One-shot legacy flat-key migration
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use freshko_db::{Storage, StorageConfig};
//!
//! let storage = Storage::open(StorageConfig::new("./data")).await;
//!
//! storage.set_item("freshko-products", "[]").await;
//! let raw = storage.get_item("freshko-products").await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod facade;
pub mod flat;
pub mod migration;

/// The flat keys of the persisted layout, shared by both tiers.
///
/// The domain store reads and writes its snapshots under these names; the
/// migration coordinator copies exactly this set from the legacy flat tier.
pub mod keys {
    pub const PRODUCTS: &str = "freshko-products";
    pub const ARTICLES: &str = "freshko-articles";
    pub const ORDERS: &str = "freshko-orders";
    pub const USERS: &str = "freshko-users";
    /// Cart + wishlist + session bundle.
    pub const STORE: &str = "freshko-store";
}

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::{EngineConfig, KvEngine, ObjectStore, Usage};
pub use error::{StorageError, StorageResult};
pub use facade::{Storage, StorageConfig};
pub use flat::FlatStore;
pub use migration::{migrate_legacy, needs_migration, MigrationReport};
