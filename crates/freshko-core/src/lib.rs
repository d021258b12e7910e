//! # freshko-core: Pure Business Logic for Freshko
//!
//! This crate is the **heart** of the Freshko state layer. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Freshko Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Views (external collaborators)                │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► Account ──► Admin          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 freshko-store (Domain Store)                    │   │
//! │  │    login, create_order, update_order_status, add_to_cart, ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ freshko-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │ lifecycle │  │ checkout  │   │   │
//! │  │   │ User      │  │   Money   │  │  status   │  │  totals   │   │   │
//! │  │   │ Product   │  │  TaxRate  │  │  graph    │  │  policy   │   │   │
//! │  │   │ Order ... │  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │   └───────────┘                                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  freshko-db (Storage Layer)                     │   │
//! │  │        SQLite object stores, flat fallback, migration           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Article, Order, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`lifecycle`] - Order status state machine
//! - [`checkout`] - Deterministic order totals from cart lines
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use freshko_core::Money` instead of
// `use freshko_core::money::Money`

pub use checkout::OrderTotals;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sales tax applied at checkout, in basis points (800 = 8.00%).
///
/// ## Why a constant?
/// Freshko is single-region; the rate is part of checkout policy, not data.
/// Becomes per-region configuration if the storefront ever localizes.
pub const TAX_RATE_BPS: u32 = 800;

/// Flat shipping fee in cents ($9.99).
pub const SHIPPING_FLAT_CENTS: i64 = 999;

/// Subtotal threshold (in cents) at which shipping is free ($50.00).
pub const FREE_SHIPPING_THRESHOLD_CENTS: i64 = 5000;

/// Maximum items allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable order sizes.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;
