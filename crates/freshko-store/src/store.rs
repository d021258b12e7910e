//! # Domain Store Root
//!
//! Construction, hydration and write-through persistence. The action
//! methods live in sibling modules (`auth`, `catalog`, `orders`, `cart`)
//! as `impl DomainStore` blocks split by domain.
//!
//! ## Open Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DomainStore::open                                  │
//! │                                                                         │
//! │  Storage::open ── engine up? ──no──► flat tier only (degraded)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  migrate_legacy ── ran? ──yes──► publish StorageMigrated                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  hydrate: read the five freshko-* blobs into memory                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  first run (no catalog key)? ──yes──► install seed catalog              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ready - every action mutates memory, then persists, then returns       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking Discipline
//! The state mutex is only ever taken inside `with_state` / `with_state_mut`
//! closures, which cannot span an await. Persistence always works from a
//! snapshot cloned out of the closure.

use std::sync::Mutex;

use tracing::{info, warn};

use freshko_core::{Article, Order, Product, User};
use freshko_db::{keys, migrate_legacy, Storage, StorageConfig};

use crate::events::{EventBus, StoreEvent};
use crate::seed;
use crate::state::{SessionBlob, StoreState};

/// The single mutable root for Freshko's business data.
///
/// Explicitly constructed and passed to whatever needs it - there is no
/// global instance. Cheap operations (reads) and expensive ones
/// (storage-backed actions) share `&self`.
#[derive(Debug)]
pub struct DomainStore {
    state: Mutex<StoreState>,
    storage: Storage,
    events: EventBus,
}

impl DomainStore {
    /// Opens storage, migrates, hydrates and seeds. The everyday entry
    /// point.
    pub async fn open(config: StorageConfig) -> Self {
        let storage = Storage::open(config).await;
        Self::with_storage(storage).await
    }

    /// Builds a store over an already-open `Storage`. Lets tests (and
    /// embedders wiring custom tiers) prepare the storage first.
    pub async fn with_storage(storage: Storage) -> Self {
        let report = migrate_legacy(&storage).await;

        let state = Self::hydrate(&storage).await;

        let store = DomainStore {
            state: Mutex::new(state),
            storage,
            events: EventBus::new(),
        };

        if !report.skipped {
            store.events.publish(StoreEvent::StorageMigrated);
        }

        store.ensure_seed().await;

        info!(
            users = store.with_state(|s| s.users.len()),
            products = store.with_state(|s| s.products.len()),
            orders = store.with_state(|s| s.orders.len()),
            "Domain store ready"
        );

        store
    }

    /// Reads the persisted snapshot into memory. Absent or corrupt blobs
    /// hydrate as empty - the storage layer already logged the why.
    async fn hydrate(storage: &Storage) -> StoreState {
        let users: Vec<User> = storage.get_json(keys::USERS).await.unwrap_or_default();
        let products: Vec<Product> = storage.get_json(keys::PRODUCTS).await.unwrap_or_default();
        let articles: Vec<Article> = storage.get_json(keys::ARTICLES).await.unwrap_or_default();
        let orders: Vec<Order> = storage.get_json(keys::ORDERS).await.unwrap_or_default();
        let blob: SessionBlob = storage.get_json(keys::STORE).await.unwrap_or_default();

        for order in &orders {
            let consistent = order.total_cents
                == order.subtotal_cents + order.shipping_cents + order.tax_cents
                    - order.discount_cents;
            if !consistent {
                warn!(order = order.id, "Rehydrated order has inconsistent totals");
            }
        }

        let mut state = StoreState {
            users,
            products,
            articles,
            orders,
            cart: blob.cart,
            wishlist: blob.wishlist,
            current_user: blob.current_user,
        };

        // A session pointing at a user that no longer exists is stale
        if state.signed_in_user().is_none() && state.current_user.is_some() {
            warn!("Persisted session references a missing user; clearing");
            state.current_user = None;
        }

        state
    }

    /// Installs the seed catalog on a first run.
    ///
    /// First run means the catalog key has never been written - an empty
    /// *list* is not a first run, it is a catalog someone emptied.
    async fn ensure_seed(&self) {
        if self.storage.get_item(keys::PRODUCTS).await.is_some() {
            return;
        }

        info!("First run; installing seed catalog");

        self.with_state_mut(|state| {
            state.products = seed::seed_products();
            state.articles = seed::seed_articles();
            state.users = seed::seed_users();
        });

        self.persist_products().await;
        self.persist_articles().await;
        self.persist_users().await;
    }

    // =========================================================================
    // Shared Accessors
    // =========================================================================

    /// The store's event bus. Views subscribe here.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The underlying storage facade (diagnostics, usage estimates).
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Executes a function with read access to the state.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        let state = self.state.lock().expect("store mutex poisoned");
        f(&state)
    }

    /// Executes a function with write access to the state.
    ///
    /// The guard cannot outlive the closure, which is what keeps the lock
    /// from ever being held across an await.
    pub(crate) fn with_state_mut<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.state.lock().expect("store mutex poisoned");
        f(&mut state)
    }

    // =========================================================================
    // Write-Through Persistence
    // =========================================================================
    // Each helper clones a snapshot under the lock, then writes it out.
    // Callers await these before returning, which is the whole ordering
    // guarantee: an action that returned has persisted.

    pub(crate) async fn persist_users(&self) {
        let snapshot = self.with_state(|s| s.users.clone());
        self.storage.set_json(keys::USERS, &snapshot).await;
    }

    pub(crate) async fn persist_products(&self) {
        let snapshot = self.with_state(|s| s.products.clone());
        self.storage.set_json(keys::PRODUCTS, &snapshot).await;
    }

    pub(crate) async fn persist_articles(&self) {
        let snapshot = self.with_state(|s| s.articles.clone());
        self.storage.set_json(keys::ARTICLES, &snapshot).await;
    }

    pub(crate) async fn persist_orders(&self) {
        let snapshot = self.with_state(|s| s.orders.clone());
        self.storage.set_json(keys::ORDERS, &snapshot).await;
    }

    pub(crate) async fn persist_session(&self) {
        let blob = self.with_state(|s| s.session_blob());
        self.storage.set_json(keys::STORE, &blob).await;
    }
}

// =============================================================================
// Test Utilities
// =============================================================================


// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use freshko_core::Origin;

    #[tokio::test]
    async fn test_open_installs_seed_catalog() {
        let store = test_store().await;

        store.with_state(|s| {
            assert!(!s.products.is_empty());
            assert!(!s.articles.is_empty());
            assert!(s.products.iter().all(|p| p.origin == Origin::Seed));
            assert!(s.orders.is_empty());
            assert!(s.current_user.is_none());
        });
    }

    #[tokio::test]
    async fn test_seed_not_reinstalled_on_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = DomainStore::open(StorageConfig::new(dir.path())).await;
        let product_id = store.with_state(|s| s.products[0].id);
        drop(store);

        // Wipe the catalog to an EMPTY list, then reopen: still not a
        // first run, so the seed must not come back.
        let storage = Storage::open(StorageConfig::new(dir.path())).await;
        storage.set_json::<Vec<freshko_core::Product>>(keys::PRODUCTS, &vec![]).await;
        drop(storage);

        let reopened = DomainStore::open(StorageConfig::new(dir.path())).await;
        reopened.with_state(|s| {
            assert!(s.products.is_empty());
            assert!(s.products.iter().all(|p| p.id != product_id));
        });
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = DomainStore::open(StorageConfig::new(dir.path())).await;
            let product_id = store.with_state(|s| s.products[0].id);
            store.add_to_cart(product_id, 2).await.unwrap();
        }

        let reopened = DomainStore::open(StorageConfig::new(dir.path())).await;
        reopened.with_state(|s| {
            assert_eq!(s.cart.len(), 1);
            assert_eq!(s.cart[0].quantity, 2);
        });
    }

    #[tokio::test]
    async fn test_stale_session_cleared_on_hydration() {
        let dir = tempfile::tempdir().unwrap();

        {
            let storage = Storage::open(StorageConfig::new(dir.path())).await;
            let blob = crate::state::SessionBlob {
                cart: vec![],
                wishlist: vec![],
                current_user: Some("ghost-user".to_string()),
            };
            storage.set_json(keys::STORE, &blob).await;
        }

        let store = DomainStore::open(StorageConfig::new(dir.path())).await;
        store.with_state(|s| assert!(s.current_user.is_none()));
    }

    #[tokio::test]
    async fn test_legacy_flat_values_migrated_on_open() {
        let storage = Storage::open(StorageConfig::in_memory()).await;
        storage.flat().set(keys::ORDERS, "[]");

        let store = DomainStore::with_storage(storage).await;

        // The legacy value is now readable through the engine tier
        assert_eq!(
            store.storage().get_item(keys::ORDERS).await.as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_degraded_store_is_fully_functional() {
        let store = degraded_store().await;
        let product_id = store.with_state(|s| s.products[0].id);

        store.add_to_cart(product_id, 1).await.unwrap();
        store.with_state(|s| assert_eq!(s.cart.len(), 1));
    }
}
