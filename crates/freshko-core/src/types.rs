//! # Domain Types
//!
//! Core domain types used throughout Freshko.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     User        │   │    Product      │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (u64)       │   │  id (u64, mono) │       │
//! │  │  email (unique) │   │  title          │   │  items (frozen) │       │
//! │  │  credential     │   │  price_cents    │   │  status         │       │
//! │  │  role           │   │  origin         │   │  total_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Origin       │   │  OrderStatus    │   │   Credential    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Seed           │   │  Processing     │   │  Password(hash) │       │
//! │  │  User           │   │  Shipped        │   │  Federated      │       │
//! │  └─────────────────┘   │  Completed      │   └─────────────────┘       │
//! │                        │  Cancelled      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Shape
//! Every type here round-trips through JSON in the storage tiers. Field
//! names serialize in camelCase and `Origin` serializes as the legacy
//! `"original"` / `"user"` strings, so the persisted layout matches what
//! the storefront has always kept under the `freshko-*` keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8.00% (the checkout policy rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Origin (seed vs user-created)
// =============================================================================

/// Provenance of a catalog record.
///
/// ## Why a tagged variant instead of an `is_editable` flag?
/// Editability is not independent data; it is a consequence of where the
/// record came from. Modeling it as an enum forces every mutation site to
/// match exhaustively, so seed content can never be edited by a forgotten
/// `if`.
///
/// Serialized as the legacy `createdBy` strings: `"original"` for seed
/// records shipped with the catalog, `"user"` for records created at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Shipped with the application; immutable and undeletable.
    #[serde(rename = "original")]
    Seed,
    /// Created through the store at runtime; fully mutable.
    #[serde(rename = "user")]
    User,
}

impl Origin {
    /// Whether records with this origin may be mutated or deleted.
    #[inline]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Origin::User)
    }
}

// =============================================================================
// User
// =============================================================================

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// How an account authenticates.
///
/// ## Why an enum?
/// Federated accounts have no password at all, rather than a well-known
/// placeholder one. Password login matches `Password` exhaustively, so a
/// federated account can never be entered with a guessed constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    /// Local account: argon2 hash in PHC string format.
    Password { hash: String },
    /// Account created through an external identity provider.
    /// Authentication happens upstream; no local secret exists.
    Federated,
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub first_name: String,
    pub last_name: String,

    /// Unique case-insensitively. Stored as entered; compared case-folded.
    pub email: String,

    pub phone: Option<String>,

    pub role: Role,

    /// Authentication material. Never serialized to API responses;
    /// persisted only inside the storage tiers.
    pub credential: Credential,

    pub avatar: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name shown in the account header.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-folded email for uniqueness checks and lookups.
    pub fn email_key(&self) -> String {
        self.email.trim().to_lowercase()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Input for registering a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// Field-merge patch for updating an account. `None` leaves a field as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<Role>,
}

/// An email + display-name pair the external identity provider has already
/// verified.
///
/// The store maps this into a `User` and a session; it never verifies the
/// identity itself. Construct one only after the upstream handshake has
/// succeeded.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    email: String,
    display_name: String,
}

impl VerifiedIdentity {
    /// Wraps an upstream-verified identity.
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        VerifiedIdentity {
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Numeric identifier, assigned monotonically by the store.
    pub id: u64,

    pub title: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Pre-discount price, when the product is on sale.
    pub original_price_cents: Option<i64>,

    /// Displayed discount percentage, when the product is on sale.
    pub discount_percent: Option<u32>,

    pub category: String,
    pub description: String,

    /// Image path or URL; handled by the view layer.
    pub image: String,

    pub in_stock: bool,

    /// Seed vs user-created; serialized as the legacy `createdBy` field.
    #[serde(rename = "createdBy")]
    pub origin: Origin,

    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether this record may be mutated or deleted.
    #[inline]
    pub fn is_editable(&self) -> bool {
        self.origin.is_editable()
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub price_cents: i64,
    pub original_price_cents: Option<i64>,
    pub discount_percent: Option<u32>,
    pub category: String,
    pub description: String,
    pub image: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

/// Field-merge patch for updating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub title: Option<String>,
    pub price_cents: Option<i64>,
    pub original_price_cents: Option<Option<i64>>,
    pub discount_percent: Option<Option<u32>>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub in_stock: Option<bool>,
}

// =============================================================================
// Article
// =============================================================================

/// A journal/blog article.
///
/// Same provenance pattern as [`Product`]: seed articles ship with the
/// application and are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    #[serde(rename = "createdBy")]
    pub origin: Origin,
}

impl Article {
    #[inline]
    pub fn is_editable(&self) -> bool {
        self.origin.is_editable()
    }
}

/// Input for creating an article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    pub author: String,
}

/// Field-merge patch for updating an article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of an order.
///
/// Transition legality lives in [`crate::lifecycle`]; this enum is just the
/// state names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order accepted; being prepared.
    Processing,
    /// Order handed to the carrier.
    Shipped,
    /// Order delivered; terminal.
    Completed,
    /// Order cancelled before shipping; terminal.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Processing
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at checkout time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: u64,
    /// Product title at checkout time (frozen).
    pub name: String,
    /// Unit price in cents at checkout time (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Image path at checkout time (frozen).
    pub image: String,
}

impl OrderItem {
    /// Line total before tax (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

/// Customer contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Shipping destination captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// How the order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment on an external terminal/provider.
    Card,
    /// Cash on delivery.
    CashOnDelivery,
}

/// A placed order.
///
/// ## Invariants
/// - `items` is immutable after creation (snapshot of the cart)
/// - `total_cents == subtotal_cents + shipping_cents + tax_cents - discount_cents`
/// - Orders are never deleted; cancellation is a status, not a removal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Numeric identifier, monotonically assigned by the store.
    pub id: u64,

    pub items: Vec<OrderItem>,

    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,

    pub status: OrderStatus,

    pub customer: CustomerInfo,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,

    /// Owning account, by case-folded email.
    pub user_email: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the order enters `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Checkout metadata supplied by the caller alongside the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInfo {
    pub customer: CustomerInfo,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    /// Promotion discount in cents; zero unless a promotion applies.
    #[serde(default)]
    pub discount_cents: i64,
}

// =============================================================================
// Cart & Wishlist
// =============================================================================

/// A cart line: product reference plus quantity.
///
/// Deliberately thin - prices are resolved against the live catalog at
/// checkout, unlike order items which freeze them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: u64,
    pub quantity: i64,
}

/// A wishlist entry. Same shape as a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: u64,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_editability() {
        assert!(!Origin::Seed.is_editable());
        assert!(Origin::User.is_editable());
    }

    #[test]
    fn test_origin_serializes_as_legacy_strings() {
        assert_eq!(serde_json::to_string(&Origin::Seed).unwrap(), "\"original\"");
        assert_eq!(serde_json::to_string(&Origin::User).unwrap(), "\"user\"");
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Processing);
    }

    #[test]
    fn test_order_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_email_key_folds_case() {
        let user = User {
            id: "u-1".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Kovacs".to_string(),
            email: " Anna@Freshko.Test ".to_string(),
            phone: None,
            role: Role::User,
            credential: Credential::Federated,
            avatar: None,
            created_at: Utc::now(),
        };
        assert_eq!(user.email_key(), "anna@freshko.test");
    }

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            product_id: 1,
            name: "Avocado".to_string(),
            unit_price_cents: 249,
            quantity: 4,
            image: "/img/avocado.jpg".to_string(),
        };
        assert_eq!(item.line_total_cents(), 996);
    }

    #[test]
    fn test_credential_tagged_serialization() {
        let cred = Credential::Federated;
        assert_eq!(serde_json::to_string(&cred).unwrap(), r#"{"kind":"federated"}"#);

        let parsed: Credential =
            serde_json::from_str(r#"{"kind":"password","hash":"$argon2id$x"}"#).unwrap();
        assert_eq!(
            parsed,
            Credential::Password {
                hash: "$argon2id$x".to_string()
            }
        );
    }
}
