//! # Checkout Math
//!
//! Deterministic order totals from a set of order lines.
//!
//! ## Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Totals                                   │
//! │                                                                         │
//! │  subtotal = Σ unit_price × quantity                                     │
//! │  shipping = $9.99 flat, waived at subtotal ≥ $50.00                     │
//! │  tax      = 8.00% of subtotal (integer cents, rounded)                  │
//! │  discount = promotion amount, 0 by default                              │
//! │                                                                         │
//! │  total    = subtotal + shipping + tax − discount   (EXACT, i64 cents)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The totals are computed once at checkout and frozen into the order;
//! nothing downstream ever recomputes them.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{OrderItem, TaxRate};
use crate::{FREE_SHIPPING_THRESHOLD_CENTS, SHIPPING_FLAT_CENTS, TAX_RATE_BPS};

/// The five frozen amounts of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl OrderTotals {
    /// Computes totals for a set of order lines under the checkout policy.
    ///
    /// `discount_cents` is clamped into `[0, subtotal]` so a promotion can
    /// never push the total negative.
    ///
    /// ## Example
    /// ```rust
    /// use freshko_core::checkout::OrderTotals;
    /// use freshko_core::types::OrderItem;
    ///
    /// let items = vec![OrderItem {
    ///     product_id: 1,
    ///     name: "Tomatoes".to_string(),
    ///     unit_price_cents: 1000,
    ///     quantity: 2,
    ///     image: "/img/tomatoes.jpg".to_string(),
    /// }];
    /// let totals = OrderTotals::compute(&items, 0);
    /// assert_eq!(totals.subtotal_cents, 2000);
    /// assert_eq!(totals.total_cents, 2000 + 999 + 160);
    /// ```
    pub fn compute(items: &[OrderItem], discount_cents: i64) -> Self {
        let subtotal: i64 = items.iter().map(|i| i.line_total_cents()).sum();

        let shipping = if subtotal >= FREE_SHIPPING_THRESHOLD_CENTS {
            0
        } else {
            SHIPPING_FLAT_CENTS
        };

        let tax = Money::from_cents(subtotal)
            .calculate_tax(TaxRate::from_bps(TAX_RATE_BPS))
            .cents();

        let discount = discount_cents.clamp(0, subtotal);

        OrderTotals {
            subtotal_cents: subtotal,
            shipping_cents: shipping,
            tax_cents: tax,
            discount_cents: discount,
            total_cents: subtotal + shipping + tax - discount,
        }
    }

    /// The creation-time invariant. Holds by construction; exposed so the
    /// store can assert it when rehydrating orders written by older builds.
    pub fn is_consistent(&self) -> bool {
        self.total_cents
            == self.subtotal_cents + self.shipping_cents + self.tax_cents - self.discount_cents
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price_cents: i64, quantity: i64) -> OrderItem {
        OrderItem {
            product_id: 1,
            name: "Test".to_string(),
            unit_price_cents: price_cents,
            quantity,
            image: String::new(),
        }
    }

    #[test]
    fn test_subtotal_from_lines() {
        // The canonical scenario: qty 2 at $10.00 -> subtotal $20.00
        let totals = OrderTotals::compute(&[line(1000, 2)], 0);
        assert_eq!(totals.subtotal_cents, 2000);
    }

    #[test]
    fn test_invariant_holds() {
        let totals = OrderTotals::compute(&[line(1299, 3), line(499, 1)], 200);
        assert!(totals.is_consistent());
        assert_eq!(
            totals.total_cents,
            totals.subtotal_cents + totals.shipping_cents + totals.tax_cents
                - totals.discount_cents
        );
    }

    #[test]
    fn test_flat_shipping_below_threshold() {
        let totals = OrderTotals::compute(&[line(1000, 2)], 0);
        assert_eq!(totals.shipping_cents, SHIPPING_FLAT_CENTS);
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        let totals = OrderTotals::compute(&[line(2500, 2)], 0); // exactly $50.00
        assert_eq!(totals.shipping_cents, 0);
    }

    #[test]
    fn test_tax_is_eight_percent_of_subtotal() {
        let totals = OrderTotals::compute(&[line(2000, 1)], 0);
        assert_eq!(totals.tax_cents, 160); // 8% of $20.00
    }

    #[test]
    fn test_discount_clamped_to_subtotal() {
        let totals = OrderTotals::compute(&[line(500, 1)], 10_000);
        assert_eq!(totals.discount_cents, 500);
        assert!(totals.is_consistent());
        assert!(totals.total_cents >= 0);
    }

    #[test]
    fn test_negative_discount_ignored() {
        let totals = OrderTotals::compute(&[line(500, 1)], -250);
        assert_eq!(totals.discount_cents, 0);
    }

    #[test]
    fn test_empty_lines_yield_zero_subtotal() {
        // The store rejects empty carts before computing; the math itself
        // still behaves.
        let totals = OrderTotals::compute(&[], 0);
        assert_eq!(totals.subtotal_cents, 0);
        assert!(totals.is_consistent());
    }
}
