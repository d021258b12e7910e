//! # Store State
//!
//! The in-memory snapshot the domain store mutates, and the persisted
//! session bundle.
//!
//! ## Persisted Shape
//! Each collection persists as its own JSON blob under a `freshko-*` key
//! (see [`freshko_db::keys`]); cart, wishlist and session travel together
//! in the `freshko-store` bundle because they live and die with the
//! browsing session rather than the catalog.

use serde::{Deserialize, Serialize};

use freshko_core::{Article, CartItem, Order, Product, User, WishlistItem};

/// The whole in-memory state. Guarded by the store's mutex; never held
/// across an await.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub articles: Vec<Article>,
    pub orders: Vec<Order>,
    pub cart: Vec<CartItem>,
    pub wishlist: Vec<WishlistItem>,
    /// Id of the authenticated user, when a session exists.
    pub current_user: Option<String>,
}

impl StoreState {
    /// The session bundle as persisted under `freshko-store`.
    pub fn session_blob(&self) -> SessionBlob {
        SessionBlob {
            cart: self.cart.clone(),
            wishlist: self.wishlist.clone(),
            current_user: self.current_user.clone(),
        }
    }

    /// Looks up the signed-in user.
    pub fn signed_in_user(&self) -> Option<&User> {
        let id = self.current_user.as_deref()?;
        self.users.iter().find(|u| u.id == id)
    }

    /// Next monotonic id for a numeric-id collection.
    pub fn next_id<T>(items: &[T], id_of: impl Fn(&T) -> u64) -> u64 {
        items.iter().map(id_of).max().unwrap_or(0) + 1
    }
}

/// Cart + wishlist + session, bundled into one persisted value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionBlob {
    #[serde(default)]
    pub cart: Vec<CartItem>,
    #[serde(default)]
    pub wishlist: Vec<WishlistItem>,
    #[serde(default)]
    pub current_user: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_starts_at_one() {
        let empty: Vec<Order> = vec![];
        assert_eq!(StoreState::next_id(&empty, |o| o.id), 1);
    }

    #[test]
    fn test_next_id_is_max_plus_one() {
        // Ids need not be dense - deletion leaves gaps
        let ids = [3u64, 7, 5];
        assert_eq!(StoreState::next_id(&ids, |i| *i), 8);
    }

    #[test]
    fn test_session_blob_defaults() {
        let blob: SessionBlob = serde_json::from_str("{}").unwrap();
        assert!(blob.cart.is_empty());
        assert!(blob.wishlist.is_empty());
        assert!(blob.current_user.is_none());
    }
}
