//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Subtotals, shipping, tax, discounts and totals are all i64 cents,    │
//! │    so `subtotal + shipping + tax - discount == total` holds EXACTLY.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use freshko_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line = price.multiply_quantity(2); // $21.98
//! assert_eq!(line.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// Storage, calculations, and the store API all use cents.
    /// Only the UI converts to dollars for display.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides
    /// rounding at the half-cent boundary. i128 intermediates prevent
    /// overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use freshko_core::money::Money;
    /// use freshko_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(2000); // $20.00
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(800)); // 8%
    /// assert_eq!(tax.cents(), 160); // $1.60
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use freshko_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Computes a basis-point fraction of this amount, rounded - the
    /// building block for percentage promotions.
    ///
    /// ## Arguments
    /// * `bps` - Fraction in basis points (1000 = 10%)
    pub fn percentage_of(&self, bps: u32) -> Money {
        let amount = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(amount as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1099);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1599);
        assert_eq!((a - b).cents(), 599);
        assert_eq!((a * 2).cents(), 2198);
    }

    #[test]
    fn test_tax_calculation() {
        // $20.00 at 8% = $1.60 exactly
        let tax = Money::from_cents(2000).calculate_tax(TaxRate::from_bps(800));
        assert_eq!(tax.cents(), 160);

        // $10.99 at 8% = 87.92 cents → rounds to 88
        let tax = Money::from_cents(1099).calculate_tax(TaxRate::from_bps(800));
        assert_eq!(tax.cents(), 88);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn test_percentage_of() {
        // 10% of $100.00 = $10.00
        assert_eq!(Money::from_cents(10000).percentage_of(1000).cents(), 1000);
    }
}
