//! # Seed Data Installer
//!
//! Opens (creating if needed) a Freshko data directory, which installs the
//! seed catalog on first run, and optionally pads the catalog with demo
//! products for UI work.
//!
//! ## Usage
//! ```bash
//! # Default data directory (./data)
//! cargo run -p freshko-store --bin seed
//!
//! # Custom directory, plus 50 demo products
//! cargo run -p freshko-store --bin seed -- --data-dir /tmp/freshko --extra 50
//! ```

use std::env;
use std::process::ExitCode;

use tracing::info;

use freshko_core::NewProduct;
use freshko_db::StorageConfig;
use freshko_store::{DomainStore, SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD};

/// Demo categories for --extra padding.
const DEMO_CATEGORIES: [&str; 4] = ["pantry", "frozen", "snacks", "beverages"];

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut data_dir = String::from("./data");
    let mut extra: usize = 0;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let Some(value) = args.next() else {
                    eprintln!("--data-dir needs a value");
                    return ExitCode::FAILURE;
                };
                data_dir = value;
            }
            "--extra" => {
                let Some(value) = args.next().and_then(|v| v.parse().ok()) else {
                    eprintln!("--extra needs a number");
                    return ExitCode::FAILURE;
                };
                extra = value;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("Usage: seed [--data-dir DIR] [--extra N]");
                return ExitCode::FAILURE;
            }
        }
    }

    info!(data_dir = %data_dir, "Opening store");
    let store = DomainStore::open(StorageConfig::new(&data_dir)).await;

    for i in 0..extra {
        let category = DEMO_CATEGORIES[i % DEMO_CATEGORIES.len()];
        // Deterministic demo pricing: $0.99 .. $19.99 without pulling in rand
        let price_cents = 99 + ((i as i64 * 137) % 1900);

        let result = store
            .create_product(NewProduct {
                title: format!("Demo {} Item {}", category, i + 1),
                price_cents,
                original_price_cents: None,
                discount_percent: None,
                category: category.to_string(),
                description: format!("Demo product #{} for UI work", i + 1),
                image: format!("/images/products/demo-{}.jpg", i + 1),
                in_stock: true,
            })
            .await;

        if let Err(e) = result {
            eprintln!("Failed to create demo product: {e}");
            return ExitCode::FAILURE;
        }
    }

    info!(
        products = store.get_all_products().len(),
        articles = store.get_all_articles().len(),
        admin_email = SEED_ADMIN_EMAIL,
        admin_password = SEED_ADMIN_PASSWORD,
        "Seed complete"
    );

    if let Some(engine) = store.storage().engine() {
        if let Ok(usage) = engine.estimate_usage().await {
            info!(
                used_bytes = usage.used_bytes,
                quota_bytes = usage.quota_bytes,
                "Storage usage"
            );
        }
    }

    ExitCode::SUCCESS
}
