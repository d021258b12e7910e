//! # Cart & Wishlist Actions
//!
//! Ephemeral, session-scoped lists. Mutations persist (inside the
//! `freshko-store` bundle) but publish no events - cart and wishlist are
//! same-view concerns; nothing else needs a signal.

use tracing::debug;

use freshko_core::validation::validate_quantity;
use freshko_core::{CartItem, CoreError, CoreResult, WishlistItem, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

use crate::store::DomainStore;

impl DomainStore {
    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds a product to the cart, merging quantity if already present.
    pub async fn add_to_cart(&self, product_id: u64, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        self.with_state_mut(|state| {
            if state.products.iter().all(|p| p.id != product_id) {
                return Err(CoreError::not_found("Product", product_id));
            }

            if let Some(item) = state.cart.iter_mut().find(|i| i.product_id == product_id) {
                let merged = item.quantity + quantity;
                if merged > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: merged,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
                item.quantity = merged;
                return Ok(());
            }

            if state.cart.len() >= MAX_CART_ITEMS {
                return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
            }

            state.cart.push(CartItem { product_id, quantity });
            Ok(())
        })?;

        self.persist_session().await;

        debug!(product = product_id, quantity, "Added to cart");
        Ok(())
    }

    /// Sets a cart line's quantity. Zero removes the line.
    pub async fn update_cart_quantity(&self, product_id: u64, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_from_cart(product_id).await;
        }
        validate_quantity(quantity)?;

        self.with_state_mut(|state| {
            let item = state
                .cart
                .iter_mut()
                .find(|i| i.product_id == product_id)
                .ok_or_else(|| CoreError::not_found("CartItem", product_id))?;
            item.quantity = quantity;
            Ok::<(), CoreError>(())
        })?;

        self.persist_session().await;
        Ok(())
    }

    /// Removes a cart line.
    pub async fn remove_from_cart(&self, product_id: u64) -> CoreResult<()> {
        self.with_state_mut(|state| {
            let before = state.cart.len();
            state.cart.retain(|i| i.product_id != product_id);
            if state.cart.len() == before {
                Err(CoreError::not_found("CartItem", product_id))
            } else {
                Ok(())
            }
        })?;

        self.persist_session().await;
        Ok(())
    }

    /// Empties the cart.
    pub async fn clear_cart(&self) {
        self.with_state_mut(|state| state.cart.clear());
        self.persist_session().await;
    }

    /// The current cart lines.
    pub fn cart(&self) -> Vec<CartItem> {
        self.with_state(|state| state.cart.clone())
    }

    /// Total units across all cart lines (the badge number).
    pub fn cart_count(&self) -> i64 {
        self.with_state(|state| state.cart.iter().map(|i| i.quantity).sum())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Adds a product to the wishlist, merging quantity if already present.
    pub async fn add_to_wishlist(&self, product_id: u64, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        self.with_state_mut(|state| {
            if state.products.iter().all(|p| p.id != product_id) {
                return Err(CoreError::not_found("Product", product_id));
            }

            if let Some(item) = state.wishlist.iter_mut().find(|i| i.product_id == product_id) {
                item.quantity += quantity;
            } else {
                state.wishlist.push(WishlistItem { product_id, quantity });
            }
            Ok(())
        })?;

        self.persist_session().await;
        Ok(())
    }

    /// Removes a wishlist entry.
    pub async fn remove_from_wishlist(&self, product_id: u64) -> CoreResult<()> {
        self.with_state_mut(|state| {
            let before = state.wishlist.len();
            state.wishlist.retain(|i| i.product_id != product_id);
            if state.wishlist.len() == before {
                Err(CoreError::not_found("WishlistItem", product_id))
            } else {
                Ok(())
            }
        })?;

        self.persist_session().await;
        Ok(())
    }

    /// The current wishlist.
    pub fn wishlist(&self) -> Vec<WishlistItem> {
        self.with_state(|state| state.wishlist.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::test_store;

    #[tokio::test]
    async fn test_add_to_cart_merges_quantity() {
        let store = test_store().await;
        let id = store.with_state(|s| s.products[0].id);

        store.add_to_cart(id, 2).await.unwrap();
        store.add_to_cart(id, 3).await.unwrap();

        let cart = store.cart();
        assert_eq!(cart.len(), 1); // still one line
        assert_eq!(cart[0].quantity, 5);
        assert_eq!(store.cart_count(), 5);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails() {
        let store = test_store().await;
        let err = store.add_to_cart(999_999, 1).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_quantity_cap_enforced_on_merge() {
        let store = test_store().await;
        let id = store.with_state(|s| s.products[0].id);

        store.add_to_cart(id, MAX_ITEM_QUANTITY).await.unwrap();
        let err = store.add_to_cart(id, 1).await.unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));

        // The line kept its previous quantity
        assert_eq!(store.cart()[0].quantity, MAX_ITEM_QUANTITY);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes_line() {
        let store = test_store().await;
        let id = store.with_state(|s| s.products[0].id);

        store.add_to_cart(id, 2).await.unwrap();
        store.update_cart_quantity(id, 0).await.unwrap();

        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_line_fails() {
        let store = test_store().await;
        let err = store.remove_from_cart(42).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_wishlist_roundtrip() {
        let store = test_store().await;
        let id = store.with_state(|s| s.products[0].id);

        store.add_to_wishlist(id, 1).await.unwrap();
        store.add_to_wishlist(id, 1).await.unwrap();
        assert_eq!(store.wishlist().len(), 1);
        assert_eq!(store.wishlist()[0].quantity, 2);

        store.remove_from_wishlist(id).await.unwrap();
        assert!(store.wishlist().is_empty());
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let store = test_store().await;
        let id = store.with_state(|s| s.products[0].id);
        store.add_to_cart(id, 2).await.unwrap();

        store.clear_cart().await;
        assert!(store.cart().is_empty());
    }
}
