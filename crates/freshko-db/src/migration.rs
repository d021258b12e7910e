//! # Legacy Migration
//!
//! One-shot copy of legacy flat-store entries into the engine.
//!
//! ## How Migration Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  Process start (DomainStore::open)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  needs_migration?                                                       │
//! │       ├── marker in flat tier?     → no-op (engine not even needed)     │
//! │       ├── marker in engine tier?   → no-op                              │
//! │       ▼                                                                 │
//! │  For each legacy key (freshko-products, -articles, -orders,             │
//! │  -users, -store):                                                       │
//! │       ├── absent?        → skip                                         │
//! │       ├── corrupt JSON?  → log, count as failed, CONTINUE               │
//! │       └── valid          → engine.put(settings, key, value)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Write completion marker into BOTH tiers                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Safety
//! - Idempotent: the marker check makes re-runs no-ops, and the copy itself
//!   only overwrites, never appends - so even a concurrent double-run from
//!   two initializations converges on the same state.
//! - One corrupt key never blocks migrating the others.

use tracing::{debug, info, warn};

use crate::engine::ObjectStore;
use crate::facade::Storage;

/// Every flat key the legacy storefront persisted.
pub const LEGACY_KEYS: [&str; 5] = [
    crate::keys::PRODUCTS,
    crate::keys::ARTICLES,
    crate::keys::ORDERS,
    crate::keys::USERS,
    crate::keys::STORE,
];

/// Marker key recording that migration has completed.
/// Written to both tiers so the check never requires the engine.
pub const MIGRATION_MARKER_KEY: &str = "freshko-migration-complete";

/// Outcome of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Keys copied into the engine.
    pub migrated: usize,
    /// Keys skipped because their value was corrupt or the write failed.
    pub failed: usize,
    /// True when the marker was already present (or no engine exists) and
    /// nothing ran.
    pub skipped: bool,
}

impl MigrationReport {
    const fn skipped() -> Self {
        MigrationReport {
            migrated: 0,
            failed: 0,
            skipped: true,
        }
    }
}

/// Whether migration still needs to run.
///
/// False if the completion marker is present in either tier. The flat tier
/// is checked first: deciding must work even when the engine never came up.
pub async fn needs_migration(storage: &Storage) -> bool {
    if storage.flat().get(MIGRATION_MARKER_KEY).is_some() {
        return false;
    }

    if let Some(engine) = storage.engine() {
        if let Ok(Some(_)) = engine.get(ObjectStore::Settings, MIGRATION_MARKER_KEY).await {
            return false;
        }
    }

    true
}

/// Copies legacy flat-store entries into the engine and records completion.
///
/// Per-key failures are logged and counted, never raised; a batch always
/// runs to the end. Without an engine tier there is nothing to migrate
/// into, so the run is skipped (and will happen on a later start once the
/// engine comes up).
pub async fn migrate_legacy(storage: &Storage) -> MigrationReport {
    if !needs_migration(storage).await {
        debug!("Migration already complete; skipping");
        return MigrationReport::skipped();
    }

    let Some(engine) = storage.engine() else {
        warn!("Engine unavailable; legacy migration deferred to a later start");
        return MigrationReport::skipped();
    };

    info!("Migrating legacy flat-store entries");

    let mut migrated = 0;
    let mut failed = 0;

    for key in LEGACY_KEYS {
        let Some(raw) = storage.flat().get(key) else {
            debug!(key, "No legacy value; skipping");
            continue;
        };

        // Validate before copying: a corrupt entry is logged and left
        // behind, and must not block the rest of the batch.
        if let Err(e) = serde_json::from_str::<serde_json::Value>(&raw) {
            warn!(key, error = %e, "Legacy value is corrupt; not migrated");
            failed += 1;
            continue;
        }

        match engine.put(ObjectStore::Settings, key, &raw).await {
            Ok(()) => {
                debug!(key, "Migrated legacy key");
                migrated += 1;
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to migrate legacy key");
                failed += 1;
            }
        }
    }

    // Completion marker in both tiers. "true" is valid JSON, so the marker
    // survives typed reads too.
    if let Err(e) = engine.put(ObjectStore::Settings, MIGRATION_MARKER_KEY, "true").await {
        warn!(error = %e, "Could not record migration marker in engine");
    }
    storage.flat().set(MIGRATION_MARKER_KEY, "true");

    info!(migrated, failed, "Legacy migration finished");

    MigrationReport {
        migrated,
        failed,
        skipped: false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::StorageConfig;

    async fn storage_with_legacy_data() -> Storage {
        let storage = Storage::open(StorageConfig::in_memory()).await;
        storage
            .flat()
            .set("freshko-products", r#"[{"id":1,"title":"Kale"}]"#);
        storage.flat().set("freshko-users", r#"[]"#);
        storage
    }

    #[tokio::test]
    async fn test_migrates_legacy_keys() {
        let storage = storage_with_legacy_data().await;

        let report = migrate_legacy(&storage).await;

        assert!(!report.skipped);
        assert_eq!(report.migrated, 2);
        assert_eq!(report.failed, 0);

        // Values now readable through the facade's engine tier
        assert_eq!(
            storage.get_item("freshko-products").await.as_deref(),
            Some(r#"[{"id":1,"title":"Kale"}]"#)
        );
    }

    #[tokio::test]
    async fn test_marker_written_to_both_tiers() {
        let storage = storage_with_legacy_data().await;
        migrate_legacy(&storage).await;

        assert!(storage.flat().get(MIGRATION_MARKER_KEY).is_some());
        let engine = storage.engine().unwrap();
        assert!(engine
            .get(ObjectStore::Settings, MIGRATION_MARKER_KEY)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let storage = storage_with_legacy_data().await;

        let first = migrate_legacy(&storage).await;
        assert!(!first.skipped);

        // Mutate the engine copy, then re-run: the re-run must not copy
        // the legacy value over it again.
        let engine = storage.engine().unwrap();
        engine
            .put(ObjectStore::Settings, "freshko-products", "[]")
            .await
            .unwrap();

        let second = migrate_legacy(&storage).await;
        assert!(second.skipped);
        assert_eq!(
            storage.get_item("freshko-products").await.as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_corrupt_key_does_not_block_batch() {
        let storage = Storage::open(StorageConfig::in_memory()).await;
        storage.flat().set("freshko-products", "{{corrupt");
        storage.flat().set("freshko-orders", "[]");

        let report = migrate_legacy(&storage).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.migrated, 1);

        // The healthy key made it across
        assert_eq!(storage.get_item("freshko-orders").await.as_deref(), Some("[]"));
        // Migration still completed
        assert!(!needs_migration(&storage).await);
    }

    #[tokio::test]
    async fn test_needs_migration_honors_flat_marker_without_engine() {
        let storage = Storage::open(StorageConfig::flat_only()).await;
        assert!(needs_migration(&storage).await);

        storage.flat().set(MIGRATION_MARKER_KEY, "true");
        assert!(!needs_migration(&storage).await);
    }

    #[tokio::test]
    async fn test_flat_only_run_is_deferred() {
        let storage = Storage::open(StorageConfig::flat_only()).await;
        storage.flat().set("freshko-products", "[]");

        let report = migrate_legacy(&storage).await;
        assert!(report.skipped);

        // Not marked complete: a later start with an engine must migrate
        assert!(needs_migration(&storage).await);
    }
}
