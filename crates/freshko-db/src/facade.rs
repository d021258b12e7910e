//! # Storage Facade
//!
//! The two-tier storage surface the domain store talks to: a flat
//! get/set/remove/clear API backed by the engine's `settings` store, with
//! every engine failure recovered on the flat tier.
//!
//! ## Fallback Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storage::set_item("k", v)                           │
//! │                                                                         │
//! │   engine available? ──no──────────────────────┐                         │
//! │        │ yes                                  │                         │
//! │        ▼                                      ▼                         │
//! │   engine.put(settings, k, v) ──err──► warn + flat.set(k, v)             │
//! │        │ ok                                                             │
//! │        ▼                                                                │
//! │   done - callers never see a storage error, and never need              │
//! │   failure branches                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The policy is implemented here, visibly, rather than buried in the
//! engine: tests can force the failing state deterministically (open the
//! facade flat-only, or close the engine pool mid-run) and watch the
//! fallback happen.

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{EngineConfig, KvEngine, ObjectStore};
use crate::flat::FlatStore;

// =============================================================================
// Configuration
// =============================================================================

/// Facade configuration: where each tier lives.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Engine configuration; `None` runs flat-only (degraded from the
    /// start - the deterministic failure mode for tests).
    pub engine: Option<EngineConfig>,

    /// Directory for the flat tier's file; `None` keeps the flat tier in
    /// memory.
    pub flat_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Both tiers persisted under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let dir = data_dir.into();
        StorageConfig {
            engine: Some(EngineConfig::new(dir.join("freshko.db"))),
            flat_dir: Some(dir),
        }
    }

    /// Both tiers in memory (for tests).
    pub fn in_memory() -> Self {
        StorageConfig {
            engine: Some(EngineConfig::in_memory()),
            flat_dir: None,
        }
    }

    /// No engine at all: every operation lands on the flat tier.
    pub fn flat_only() -> Self {
        StorageConfig {
            engine: None,
            flat_dir: None,
        }
    }
}

// =============================================================================
// Storage Facade
// =============================================================================

/// The two-tier storage facade.
///
/// Construction never fails: an unopenable engine logs a warning and the
/// facade runs on the flat tier for the life of the process. That is the
/// spec'd worst case - degraded persistence, full functionality.
#[derive(Debug)]
pub struct Storage {
    engine: Option<KvEngine>,
    flat: FlatStore,
}

impl Storage {
    /// Opens both tiers.
    pub async fn open(config: StorageConfig) -> Self {
        if let Some(dir) = &config.flat_dir {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(dir = %dir.display(), error = %e, "Could not create data directory");
            }
        }

        let flat = match &config.flat_dir {
            Some(dir) => FlatStore::open(dir),
            None => FlatStore::in_memory(),
        };

        let engine = match config.engine {
            Some(engine_config) => match KvEngine::open(engine_config).await {
                Ok(engine) => Some(engine),
                Err(e) => {
                    warn!(error = %e, "Engine unavailable; running on flat tier only");
                    None
                }
            },
            None => None,
        };

        Storage { engine, flat }
    }

    /// The engine handle, when the engine tier came up.
    ///
    /// Used by the migration coordinator and by tests that need to close
    /// the pool to force fallback.
    pub fn engine(&self) -> Option<&KvEngine> {
        self.engine.as_ref()
    }

    /// Direct access to the flat tier (migration reads legacy keys here).
    pub fn flat(&self) -> &FlatStore {
        &self.flat
    }

    // =========================================================================
    // Flat-API Surface
    // =========================================================================

    /// Returns the value for `key`, or `None` when absent.
    pub async fn get_item(&self, key: &str) -> Option<String> {
        if let Some(engine) = &self.engine {
            match engine.get(ObjectStore::Settings, key).await {
                Ok(value) => return value,
                Err(e) => {
                    warn!(key, error = %e, "Engine read failed; falling back to flat tier");
                }
            }
        }
        self.flat.get(key)
    }

    /// Stores `value` under `key`.
    pub async fn set_item(&self, key: &str, value: &str) {
        if let Some(engine) = &self.engine {
            match engine.put(ObjectStore::Settings, key, value).await {
                Ok(()) => return,
                Err(e) => {
                    warn!(key, error = %e, "Engine write failed; falling back to flat tier");
                }
            }
        }
        self.flat.set(key, value);
    }

    /// Removes `key` from the backing store.
    pub async fn remove_item(&self, key: &str) {
        if let Some(engine) = &self.engine {
            match engine.delete(ObjectStore::Settings, key).await {
                Ok(()) => return,
                Err(e) => {
                    warn!(key, error = %e, "Engine delete failed; falling back to flat tier");
                }
            }
        }
        self.flat.remove(key);
    }

    /// Clears the facade's backing store (the engine `settings` store) and
    /// the flat tier.
    ///
    /// Both tiers are cleared so a later fallback read cannot resurrect a
    /// key that was cleared while the engine was healthy.
    pub async fn clear(&self) {
        if let Some(engine) = &self.engine {
            if let Err(e) = engine.clear(Some(ObjectStore::Settings)).await {
                warn!(error = %e, "Engine clear failed; flat tier cleared anyway");
            }
        }
        self.flat.clear();
    }

    // =========================================================================
    // Typed Helpers
    // =========================================================================

    /// Reads and deserializes a JSON value.
    ///
    /// A corrupt value is treated as "key absent" - logged, never fatal.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Stored value is corrupt; treating as absent");
                None
            }
        }
    }

    /// Serializes and stores a JSON value.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_item(key, &raw).await,
            Err(e) => {
                // Unreachable for the domain types, but a caller handing us
                // something unserializable must not take the store down.
                warn!(key, error = %e, "Value failed to serialize; nothing written");
            }
        }
    }

    /// Closes the engine tier, forcing every later operation onto the flat
    /// tier. Intended for shutdown and for fallback tests.
    pub async fn close_engine(&self) {
        if let Some(engine) = &self.engine {
            engine.close().await;
            debug!("Engine closed; facade now flat-only");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
