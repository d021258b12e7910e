//! # Order Actions
//!
//! Checkout and the status lifecycle.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        create_order                                     │
//! │                                                                         │
//! │  cart empty? ──yes──► EmptyCart                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve each cart line against the live catalog                        │
//! │  (snapshot name/price/image into OrderItems - the order freezes         │
//! │   what the cart only referenced)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderTotals::compute  (subtotal + shipping + tax − discount = total)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  next order id, status Processing, cart cleared                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  persist orders + session, publish orderCreated                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status changes go through [`freshko_core::lifecycle`]; an illegal
//! transition returns an error and leaves the order untouched. Orders are
//! never deleted - cancellation is a status.

use chrono::Utc;
use tracing::info;

use freshko_core::lifecycle::check_transition;
use freshko_core::{
    CheckoutInfo, CoreError, CoreResult, Order, OrderItem, OrderStatus, OrderTotals,
};

use crate::events::StoreEvent;
use crate::state::StoreState;
use crate::store::DomainStore;

impl DomainStore {
    /// Places an order from the current cart.
    ///
    /// The order is owned by the signed-in user when a session exists,
    /// otherwise by the checkout email (guest orders).
    pub async fn create_order(&self, info: CheckoutInfo) -> CoreResult<Order> {
        let order = self.with_state_mut(|state| {
            if state.cart.is_empty() {
                return Err(CoreError::EmptyCart);
            }

            // Resolve and freeze the cart lines. Any unknown product fails
            // the whole checkout before anything mutates.
            let mut items = Vec::with_capacity(state.cart.len());
            for line in &state.cart {
                let product = state
                    .products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .ok_or_else(|| CoreError::not_found("Product", line.product_id))?;

                items.push(OrderItem {
                    product_id: product.id,
                    name: product.title.clone(),
                    unit_price_cents: product.price_cents,
                    quantity: line.quantity,
                    image: product.image.clone(),
                });
            }

            let totals = OrderTotals::compute(&items, info.discount_cents);
            let now = Utc::now();

            let user_email = state
                .signed_in_user()
                .map(|u| u.email_key())
                .unwrap_or_else(|| info.customer.email.trim().to_lowercase());

            let order = Order {
                id: StoreState::next_id(&state.orders, |o| o.id),
                items,
                subtotal_cents: totals.subtotal_cents,
                shipping_cents: totals.shipping_cents,
                tax_cents: totals.tax_cents,
                discount_cents: totals.discount_cents,
                total_cents: totals.total_cents,
                status: OrderStatus::Processing,
                customer: info.customer,
                shipping: info.shipping,
                payment_method: info.payment_method,
                user_email,
                created_at: now,
                updated_at: now,
                completed_at: None,
            };

            state.orders.push(order.clone());
            // The cart is consumed by the order
            state.cart.clear();

            Ok(order)
        })?;

        self.persist_orders().await;
        self.persist_session().await;
        self.events().publish(StoreEvent::OrderCreated);

        info!(order = order.id, total = %order.total(), "Order placed");
        Ok(order)
    }

    /// Moves an order to a new status, if the lifecycle allows it.
    ///
    /// On an illegal transition the order is untouched and the error names
    /// both states.
    pub async fn update_order_status(&self, id: u64, new_status: OrderStatus) -> CoreResult<Order> {
        let updated = self.with_state_mut(|state| {
            let order = state
                .orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| CoreError::not_found("Order", id))?;

            check_transition(order.status, new_status)?;

            order.status = new_status;
            order.updated_at = Utc::now();
            if new_status == OrderStatus::Completed {
                order.completed_at = Some(order.updated_at);
            }

            Ok::<Order, CoreError>(order.clone())
        })?;

        self.persist_orders().await;
        self.events().publish(StoreEvent::OrderUpdated);

        info!(order = id, status = ?updated.status, "Order status updated");
        Ok(updated)
    }

    // =========================================================================
    // Read Derivations
    // =========================================================================

    pub fn get_order(&self, id: u64) -> Option<Order> {
        self.with_state(|state| state.orders.iter().find(|o| o.id == id).cloned())
    }

    /// Every order (admin view), newest first.
    pub fn get_all_orders(&self) -> Vec<Order> {
        self.with_state(|state| {
            let mut orders = state.orders.clone();
            orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            orders
        })
    }

    /// Orders owned by an account, by case-folded email.
    pub fn orders_for_user(&self, email: &str) -> Vec<Order> {
        let key = email.trim().to_lowercase();
        self.with_state(|state| {
            state
                .orders
                .iter()
                .filter(|o| o.user_email == key)
                .cloned()
                .collect()
        })
    }

    /// The signed-in user's orders.
    pub fn current_user_orders(&self) -> CoreResult<Vec<Order>> {
        let email = self
            .with_state(|state| state.signed_in_user().map(|u| u.email_key()))
            .ok_or(CoreError::NotSignedIn)?;
        Ok(self.orders_for_user(&email))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::test_store;
    use freshko_core::{CustomerInfo, NewProduct, PaymentMethod, ShippingInfo};

    fn checkout() -> CheckoutInfo {
        CheckoutInfo {
            customer: CustomerInfo {
                name: "Anna Kovacs".to_string(),
                email: "anna@freshko.test".to_string(),
                phone: None,
            },
            shipping: ShippingInfo {
                address: "Fo utca 12".to_string(),
                city: "Budapest".to_string(),
                postal_code: "1011".to_string(),
                country: "HU".to_string(),
            },
            payment_method: PaymentMethod::Card,
            discount_cents: 0,
        }
    }

    async fn ten_dollar_product(store: &crate::DomainStore) -> u64 {
        store
            .create_product(NewProduct {
                title: "Olive Oil 500ml".to_string(),
                price_cents: 1000,
                original_price_cents: None,
                discount_percent: None,
                category: "pantry".to_string(),
                description: "Extra virgin".to_string(),
                image: "/img/olive-oil.jpg".to_string(),
                in_stock: true,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_checkout_subtotal_and_cart_cleared() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;

        // qty 2 at $10.00
        store.add_to_cart(id, 2).await.unwrap();
        let order = store.create_order(checkout()).await.unwrap();

        assert_eq!(order.subtotal_cents, 2000);
        assert!(store.cart().is_empty());
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_totals_invariant_at_creation() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;
        store.add_to_cart(id, 3).await.unwrap();

        let mut info = checkout();
        info.discount_cents = 250;
        let order = store.create_order(info).await.unwrap();

        assert_eq!(
            order.total_cents,
            order.subtotal_cents + order.shipping_cents + order.tax_cents - order.discount_cents
        );
    }

    #[tokio::test]
    async fn test_order_items_freeze_product_data() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;
        store.add_to_cart(id, 1).await.unwrap();
        let order = store.create_order(checkout()).await.unwrap();

        // Change the product after checkout: the order keeps the snapshot
        let patch = freshko_core::ProductPatch {
            price_cents: Some(9999),
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        store.update_product(id, patch).await.unwrap();

        let frozen = store.get_order(order.id).unwrap();
        assert_eq!(frozen.items[0].unit_price_cents, 1000);
        assert_eq!(frozen.items[0].name, "Olive Oil 500ml");
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_fails() {
        let store = test_store().await;
        let err = store.create_order(checkout()).await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[tokio::test]
    async fn test_order_ids_are_monotonic() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;

        store.add_to_cart(id, 1).await.unwrap();
        let first = store.create_order(checkout()).await.unwrap();

        store.add_to_cart(id, 1).await.unwrap();
        let second = store.create_order(checkout()).await.unwrap();

        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn test_lifecycle_happy_path() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;
        store.add_to_cart(id, 1).await.unwrap();
        let order = store.create_order(checkout()).await.unwrap();

        let shipped = store
            .update_order_status(order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert!(shipped.completed_at.is_none());

        let completed = store
            .update_order_status(order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        assert!(completed.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_cancelled_order_cannot_ship() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;
        store.add_to_cart(id, 1).await.unwrap();
        let order = store.create_order(checkout()).await.unwrap();

        store
            .update_order_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let err = store
            .update_order_status(order.id, OrderStatus::Shipped)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::IllegalTransition { .. }));

        // Untouched: still cancelled
        assert_eq!(
            store.get_order(order.id).unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_shipped_cannot_go_back_to_processing() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;
        store.add_to_cart(id, 1).await.unwrap();
        let order = store.create_order(checkout()).await.unwrap();

        store
            .update_order_status(order.id, OrderStatus::Shipped)
            .await
            .unwrap();

        let err = store
            .update_order_status(order.id, OrderStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::IllegalTransition { .. }));
    }

    #[tokio::test]
    async fn test_order_events_published() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;
        store.add_to_cart(id, 1).await.unwrap();

        let mut rx = store.events().subscribe();

        let order = store.create_order(checkout()).await.unwrap();
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::OrderCreated);

        store
            .update_order_status(order.id, OrderStatus::Shipped)
            .await
            .unwrap();
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::OrderUpdated);
    }

    #[tokio::test]
    async fn test_order_owned_by_signed_in_user() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;

        store
            .login_federated(freshko_core::VerifiedIdentity::new(
                "Maria@Provider.Test",
                "Maria Silva",
            ))
            .await
            .unwrap();

        store.add_to_cart(id, 1).await.unwrap();
        let order = store.create_order(checkout()).await.unwrap();

        // Owned by the session account (case-folded), not the checkout email
        assert_eq!(order.user_email, "maria@provider.test");
        assert_eq!(store.current_user_orders().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_guest_order_owned_by_checkout_email() {
        let store = test_store().await;
        let id = ten_dollar_product(&store).await;
        store.add_to_cart(id, 1).await.unwrap();

        let order = store.create_order(checkout()).await.unwrap();
        assert_eq!(order.user_email, "anna@freshko.test");

        assert!(matches!(
            store.current_user_orders().unwrap_err(),
            CoreError::NotSignedIn
        ));
        assert_eq!(store.orders_for_user("ANNA@freshko.test").len(), 1);
    }
}
