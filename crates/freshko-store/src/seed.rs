//! # Seed Catalog
//!
//! The content Freshko ships with: a small grocery catalog, a few journal
//! articles, and the bundled admin account. Installed once, on the first
//! open of a data directory.
//!
//! Everything here carries `Origin::Seed` and is therefore immutable and
//! undeletable through the store - the catalog a fresh install shows can
//! never be vandalized from the admin screens.

use chrono::Utc;
use tracing::warn;

use freshko_core::{Article, Credential, Origin, Product, Role, User};

/// Email of the bundled admin account.
pub const SEED_ADMIN_EMAIL: &str = "admin@freshko.test";

/// Initial password of the bundled admin account. A deployment is expected
/// to change it on first sign-in.
pub const SEED_ADMIN_PASSWORD: &str = "freshko-admin";

/// The grocery catalog a fresh install starts with.
pub(crate) fn seed_products() -> Vec<Product> {
    let now = Utc::now();

    let rows: [(&str, i64, Option<i64>, &str, &str); 8] = [
        (
            "Organic Avocado",
            249,
            None,
            "fruits",
            "Creamy Hass avocados, ripened on the tree.",
        ),
        (
            "Heirloom Tomatoes 1kg",
            399,
            Some(499),
            "vegetables",
            "Mixed-variety heirloom tomatoes from local growers.",
        ),
        (
            "Sourdough Loaf",
            549,
            None,
            "bakery",
            "Naturally leavened, baked every morning.",
        ),
        (
            "Free-Range Eggs (12)",
            479,
            None,
            "dairy",
            "Large free-range eggs from pasture-raised hens.",
        ),
        (
            "Greek Yogurt 500g",
            329,
            Some(399),
            "dairy",
            "Strained whole-milk yogurt, 10% fat.",
        ),
        (
            "Wild Blueberries 250g",
            599,
            None,
            "fruits",
            "Small, intensely flavored wild blueberries.",
        ),
        (
            "Baby Spinach 200g",
            279,
            None,
            "vegetables",
            "Tender baby spinach, triple-washed.",
        ),
        (
            "Cold-Pressed Orange Juice 1L",
            449,
            Some(529),
            "beverages",
            "Squeezed daily, never from concentrate.",
        ),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (title, price, original, category, description))| {
            let discount = original.map(|o| (((o - price) * 100) / o) as u32);
            Product {
                id: i as u64 + 1,
                title: title.to_string(),
                price_cents: *price,
                original_price_cents: *original,
                discount_percent: discount,
                category: category.to_string(),
                description: description.to_string(),
                image: format!("/images/products/{}.jpg", slug(title)),
                in_stock: true,
                origin: Origin::Seed,
                created_at: now,
            }
        })
        .collect()
}

/// The journal content a fresh install starts with.
pub(crate) fn seed_articles() -> Vec<Article> {
    let now = Utc::now();

    let rows: [(&str, &str, &str, &[&str]); 3] = [
        (
            "A Season for Stone Fruit",
            "What to look for at the peak of peach and apricot season.",
            "recipes",
            &["seasonal", "fruit"],
        ),
        (
            "Why Sourdough Keeps Better",
            "The fermentation chemistry behind a longer shelf life.",
            "kitchen-science",
            &["bread", "fermentation"],
        ),
        (
            "Five-Minute Greens",
            "Three weeknight ways with a bag of baby spinach.",
            "recipes",
            &["vegetables", "quick"],
        ),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (title, excerpt, category, tags))| Article {
            id: i as u64 + 1,
            title: title.to_string(),
            excerpt: excerpt.to_string(),
            content: format!("{excerpt}\n\n(Full article body.)"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: category.to_string(),
            author: "Freshko Kitchen".to_string(),
            published_at: now,
            origin: Origin::Seed,
        })
        .collect()
}

/// The bundled admin account.
///
/// The password is hashed at install time so no plaintext ever persists.
pub(crate) fn seed_users() -> Vec<User> {
    let hash = match crate::auth::hash_password(SEED_ADMIN_PASSWORD) {
        Ok(hash) => hash,
        Err(e) => {
            warn!(error = %e, "Could not hash seed admin password; no admin installed");
            return Vec::new();
        }
    };

    vec![User {
        id: "seed-admin".to_string(),
        first_name: "Freshko".to_string(),
        last_name: "Admin".to_string(),
        email: SEED_ADMIN_EMAIL.to_string(),
        phone: None,
        role: Role::Admin,
        credential: Credential::Password { hash },
        avatar: None,
        created_at: Utc::now(),
    }]
}

/// Lowercase-hyphen image slug from a product title.
fn slug(title: &str) -> String {
    title
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
