//! # freshko-store: The Freshko Domain Store
//!
//! The single in-memory source of truth for users, products, articles,
//! orders, cart, wishlist and the authenticated session.
//!
//! ## How It Fits Together
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Domain Store Data Flow                             │
//! │                                                                         │
//! │  View action (checkout button)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 DomainStore (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │  1. validate + apply rules (freshko-core, synchronous)          │   │
//! │  │  2. mutate the in-memory snapshot (mutex, never across await)   │   │
//! │  │  3. persist write-through (freshko-db facade, awaited)          │   │
//! │  │  4. publish a StoreEvent so other mounted views re-read         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Subscribed views re-read derived state (search, get_order, ...)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Guarantee
//! Every action awaits its own persistence before returning, so within one
//! process actions apply in call order. Across processes sharing the same
//! data directory there is no shared-memory consistency - each hydrates at
//! open and last-write-wins applies.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use freshko_db::StorageConfig;
//! use freshko_store::DomainStore;
//!
//! let store = DomainStore::open(StorageConfig::new("./data")).await;
//! let mut events = store.events().subscribe();
//!
//! store.add_to_cart(1, 2).await?;
//! let order = store.create_order(checkout_info).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

mod auth;
mod cart;
mod catalog;
mod orders;
mod seed;
mod state;
mod store;

pub mod events;

// =============================================================================
// Re-exports
// =============================================================================

pub use events::{EventBus, StoreEvent};
pub use seed::{SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD};
pub use store::DomainStore;

// Most callers only ever need these two alongside the store itself.
pub use freshko_core::{CoreError, CoreResult};
pub use freshko_db::StorageConfig;
