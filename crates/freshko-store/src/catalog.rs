//! # Catalog Actions
//!
//! Products and articles: CRUD guarded by provenance, plus the pure read
//! derivations (search, filter, get-by-id).
//!
//! ## Provenance Guard
//! Every mutation site matches on [`Origin`] exhaustively. Seed content -
//! the catalog shipped with the application - can never be edited or
//! deleted; records created at runtime can.
//!
//! ## Events
//! Article mutations broadcast (`articleCreated` / `articleUpdated` /
//! `articleDeleted`) because the journal renders from multiple
//! independently-mounted views. Product mutations do not broadcast; catalog
//! views re-read on navigation.

use chrono::Utc;
use tracing::info;

use freshko_core::validation::{validate_name, validate_price};
use freshko_core::{
    Article, ArticlePatch, CoreError, CoreResult, NewArticle, NewProduct, Origin, Product,
    ProductPatch,
};

use crate::events::StoreEvent;
use crate::state::StoreState;
use crate::store::DomainStore;

// =============================================================================
// Products
// =============================================================================

impl DomainStore {
    /// Adds a product to the catalog.
    pub async fn create_product(&self, input: NewProduct) -> CoreResult<Product> {
        validate_name("title", &input.title)?;
        validate_price(input.price_cents)?;

        let product = self.with_state_mut(|state| {
            let product = Product {
                id: StoreState::next_id(&state.products, |p| p.id),
                title: input.title.trim().to_string(),
                price_cents: input.price_cents,
                original_price_cents: input.original_price_cents,
                discount_percent: input.discount_percent,
                category: input.category,
                description: input.description,
                image: input.image,
                in_stock: input.in_stock,
                origin: Origin::User,
                created_at: Utc::now(),
            };
            state.products.push(product.clone());
            product
        });

        self.persist_products().await;

        info!(product = product.id, title = %product.title, "Product created");
        Ok(product)
    }

    /// Field-merges a patch into a product. Seed products are immutable.
    pub async fn update_product(&self, id: u64, patch: ProductPatch) -> CoreResult<Product> {
        if let Some(title) = patch.title.as_deref() {
            validate_name("title", title)?;
        }
        if let Some(price) = patch.price_cents {
            validate_price(price)?;
        }

        let updated = self.with_state_mut(|state| {
            let product = state
                .products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| CoreError::not_found("Product", id))?;

            match product.origin {
                Origin::Seed => return Err(CoreError::NotEditable { entity: "Product", id }),
                Origin::User => {}
            }

            if let Some(v) = patch.title {
                product.title = v;
            }
            if let Some(v) = patch.price_cents {
                product.price_cents = v;
            }
            if let Some(v) = patch.original_price_cents {
                product.original_price_cents = v;
            }
            if let Some(v) = patch.discount_percent {
                product.discount_percent = v;
            }
            if let Some(v) = patch.category {
                product.category = v;
            }
            if let Some(v) = patch.description {
                product.description = v;
            }
            if let Some(v) = patch.image {
                product.image = v;
            }
            if let Some(v) = patch.in_stock {
                product.in_stock = v;
            }

            Ok(product.clone())
        })?;

        self.persist_products().await;
        Ok(updated)
    }

    /// Removes a product. Seed products are undeletable.
    pub async fn delete_product(&self, id: u64) -> CoreResult<()> {
        self.with_state_mut(|state| {
            let idx = state
                .products
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| CoreError::not_found("Product", id))?;

            match state.products[idx].origin {
                Origin::Seed => Err(CoreError::NotEditable { entity: "Product", id }),
                Origin::User => {
                    state.products.remove(idx);
                    Ok(())
                }
            }
        })?;

        self.persist_products().await;

        info!(product = id, "Product deleted");
        Ok(())
    }

    /// Case-insensitive search over title, description and category.
    /// An empty query returns the whole catalog.
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        let needle = query.trim().to_lowercase();

        self.with_state(|state| {
            if needle.is_empty() {
                return state.products.clone();
            }
            state
                .products
                .iter()
                .filter(|p| {
                    p.title.to_lowercase().contains(&needle)
                        || p.description.to_lowercase().contains(&needle)
                        || p.category.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect()
        })
    }

    /// Every product in a category (exact, case-insensitive).
    pub fn products_by_category(&self, category: &str) -> Vec<Product> {
        let needle = category.to_lowercase();
        self.with_state(|state| {
            state
                .products
                .iter()
                .filter(|p| p.category.to_lowercase() == needle)
                .cloned()
                .collect()
        })
    }

    pub fn get_all_products(&self) -> Vec<Product> {
        self.with_state(|state| state.products.clone())
    }

    pub fn get_product(&self, id: u64) -> Option<Product> {
        self.with_state(|state| state.products.iter().find(|p| p.id == id).cloned())
    }
}

// =============================================================================
// Articles
// =============================================================================

impl DomainStore {
    /// Publishes a journal article.
    pub async fn create_article(&self, input: NewArticle) -> CoreResult<Article> {
        validate_name("title", &input.title)?;

        let article = self.with_state_mut(|state| {
            let article = Article {
                id: StoreState::next_id(&state.articles, |a| a.id),
                title: input.title.trim().to_string(),
                excerpt: input.excerpt,
                content: input.content,
                tags: input.tags,
                category: input.category,
                author: input.author,
                published_at: Utc::now(),
                origin: Origin::User,
            };
            state.articles.push(article.clone());
            article
        });

        self.persist_articles().await;
        self.events().publish(StoreEvent::ArticleCreated);

        info!(article = article.id, title = %article.title, "Article created");
        Ok(article)
    }

    /// Field-merges a patch into an article. Seed articles are immutable.
    pub async fn update_article(&self, id: u64, patch: ArticlePatch) -> CoreResult<Article> {
        let updated = self.with_state_mut(|state| {
            let article = state
                .articles
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| CoreError::not_found("Article", id))?;

            match article.origin {
                Origin::Seed => return Err(CoreError::NotEditable { entity: "Article", id }),
                Origin::User => {}
            }

            if let Some(v) = patch.title {
                article.title = v;
            }
            if let Some(v) = patch.excerpt {
                article.excerpt = v;
            }
            if let Some(v) = patch.content {
                article.content = v;
            }
            if let Some(v) = patch.tags {
                article.tags = v;
            }
            if let Some(v) = patch.category {
                article.category = v;
            }

            Ok(article.clone())
        })?;

        self.persist_articles().await;
        self.events().publish(StoreEvent::ArticleUpdated);

        Ok(updated)
    }

    /// Removes an article. Seed articles are undeletable.
    pub async fn delete_article(&self, id: u64) -> CoreResult<()> {
        self.with_state_mut(|state| {
            let idx = state
                .articles
                .iter()
                .position(|a| a.id == id)
                .ok_or_else(|| CoreError::not_found("Article", id))?;

            match state.articles[idx].origin {
                Origin::Seed => Err(CoreError::NotEditable { entity: "Article", id }),
                Origin::User => {
                    state.articles.remove(idx);
                    Ok(())
                }
            }
        })?;

        self.persist_articles().await;
        self.events().publish(StoreEvent::ArticleDeleted);

        info!(article = id, "Article deleted");
        Ok(())
    }

    /// Every article, newest first.
    pub fn get_all_articles(&self) -> Vec<Article> {
        self.with_state(|state| {
            let mut articles = state.articles.clone();
            articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
            articles
        })
    }

    pub fn get_article(&self, id: u64) -> Option<Article> {
        self.with_state(|state| state.articles.iter().find(|a| a.id == id).cloned())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::test_store;

    fn new_product(title: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            price_cents: 499,
            original_price_cents: None,
            discount_percent: None,
            category: "pantry".to_string(),
            description: "Test pantry item".to_string(),
            image: "/img/test.jpg".to_string(),
            in_stock: true,
        }
    }

    fn new_article(title: &str) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            excerpt: "Short teaser".to_string(),
            content: "Full body".to_string(),
            tags: vec!["seasonal".to_string()],
            category: "recipes".to_string(),
            author: "Test Author".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_product_assigns_monotonic_id() {
        let store = test_store().await;
        let max_seed_id = store.with_state(|s| s.products.iter().map(|p| p.id).max().unwrap());

        let a = store.create_product(new_product("Lentils")).await.unwrap();
        let b = store.create_product(new_product("Couscous")).await.unwrap();

        assert_eq!(a.id, max_seed_id + 1);
        assert_eq!(b.id, max_seed_id + 2);
        assert_eq!(a.origin, Origin::User);
    }

    #[tokio::test]
    async fn test_seed_product_is_not_editable() {
        let store = test_store().await;
        let seed_id = store.with_state(|s| s.products[0].id);
        let before = store.get_product(seed_id).unwrap();

        let patch = ProductPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let err = store.update_product(seed_id, patch).await.unwrap_err();
        assert!(matches!(err, CoreError::NotEditable { .. }));

        let del = store.delete_product(seed_id).await.unwrap_err();
        assert!(matches!(del, CoreError::NotEditable { .. }));

        // Store unchanged on both failures
        let after = store.get_product(seed_id).unwrap();
        assert_eq!(after.title, before.title);
    }

    #[tokio::test]
    async fn test_user_product_full_lifecycle() {
        let store = test_store().await;
        let product = store.create_product(new_product("Lentils")).await.unwrap();

        let patch = ProductPatch {
            price_cents: Some(599),
            in_stock: Some(false),
            ..Default::default()
        };
        let updated = store.update_product(product.id, patch).await.unwrap();
        assert_eq!(updated.price_cents, 599);
        assert!(!updated.in_stock);

        store.delete_product(product.id).await.unwrap();
        assert!(store.get_product(product.id).is_none());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = test_store().await;
        store.create_product(new_product("Wild Rice Mix")).await.unwrap();

        let hits = store.search_products("wILd riCE");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Wild Rice Mix");

        assert!(store.search_products("definitely-absent").is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_returns_everything() {
        let store = test_store().await;
        let all = store.get_all_products();
        assert_eq!(store.search_products("").len(), all.len());
    }

    #[tokio::test]
    async fn test_article_events_published() {
        let store = test_store().await;
        let mut rx = store.events().subscribe();

        let article = store.create_article(new_article("Spring Greens")).await.unwrap();
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::ArticleCreated);

        let patch = ArticlePatch {
            excerpt: Some("Better teaser".to_string()),
            ..Default::default()
        };
        store.update_article(article.id, patch).await.unwrap();
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::ArticleUpdated);

        store.delete_article(article.id).await.unwrap();
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::ArticleDeleted);
    }

    #[tokio::test]
    async fn test_seed_article_not_deletable_and_no_event() {
        let store = test_store().await;
        let seed_id = store.with_state(|s| s.articles[0].id);
        let mut rx = store.events().subscribe();

        let err = store.delete_article(seed_id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotEditable { .. }));

        // Failure publishes nothing
        assert!(rx.try_recv().is_err());
        assert!(store.get_article(seed_id).is_some());
    }

    #[tokio::test]
    async fn test_articles_sorted_newest_first() {
        let store = test_store().await;
        store.create_article(new_article("Newest")).await.unwrap();

        let articles = store.get_all_articles();
        assert_eq!(articles[0].title, "Newest");
    }
}
