//! # Flat Fallback Store
//!
//! The synchronous flat key-value tier - the `localStorage` analogue the
//! facade falls back to when the engine is unavailable.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         FlatStore                                       │
//! │                                                                         │
//! │   get/set/remove/clear                                                  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Mutex<BTreeMap<String, String>>   ← entire store in memory            │
//! │        │                                                                │
//! │        ▼  every mutation                                                │
//! │   flat.json.tmp ──rename──► flat.json   ← atomic write-through          │
//! │                                                                         │
//! │   A persist failure logs a warning and continues in memory only:        │
//! │   the fallback tier itself never fails the caller.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The map is wrapped in a `Mutex` because multiple store actions may touch
//! it while another is mid-fallback; operations are quick (small map, one
//! file write), so a plain mutex is the right tool.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

/// File name of the persisted map, inside the configured directory.
const FLAT_FILE_NAME: &str = "flat.json";

#[derive(Debug, Default)]
struct FlatInner {
    entries: BTreeMap<String, String>,
    /// `None` for in-memory stores (tests) or after the directory proved
    /// unwritable.
    path: Option<PathBuf>,
}

/// The synchronous flat key-value store.
#[derive(Debug)]
pub struct FlatStore {
    inner: Mutex<FlatInner>,
}

impl FlatStore {
    /// Opens the flat store persisted under `dir`.
    ///
    /// A missing file means an empty store; an unreadable or corrupt file
    /// is logged and treated as empty rather than failing - this tier is
    /// the recovery path and must always come up.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(FLAT_FILE_NAME);

        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => {
                    debug!(path = %path.display(), keys = entries.len(), "Flat store loaded");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Flat store file corrupt; starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Flat store file unreadable; starting empty");
                BTreeMap::new()
            }
        };

        FlatStore {
            inner: Mutex::new(FlatInner {
                entries,
                path: Some(path),
            }),
        }
    }

    /// Creates a memory-only flat store (for tests).
    pub fn in_memory() -> Self {
        FlatStore {
            inner: Mutex::new(FlatInner::default()),
        }
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.lock().expect("flat store mutex poisoned");
        inner.entries.get(key).cloned()
    }

    /// Sets `key` to `value`, writing through to disk.
    pub fn set(&self, key: &str, value: &str) {
        let mut inner = self.inner.lock().expect("flat store mutex poisoned");
        inner.entries.insert(key.to_string(), value.to_string());
        persist(&mut inner);
    }

    /// Removes `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.lock().expect("flat store mutex poisoned");
        if inner.entries.remove(key).is_some() {
            persist(&mut inner);
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("flat store mutex poisoned");
        inner.entries.clear();
        persist(&mut inner);
    }

    /// Returns every key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("flat store mutex poisoned");
        inner.entries.keys().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("flat store mutex poisoned");
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writes the whole map to disk: temp file then rename, so a crash mid-write
/// leaves the previous file intact.
///
/// On failure the store keeps running memory-only (path cleared so we do not
/// warn on every subsequent mutation).
fn persist(inner: &mut FlatInner) {
    let Some(path) = inner.path.clone() else {
        return;
    };

    let serialized = match serde_json::to_string_pretty(&inner.entries) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Flat store serialization failed; keeping memory state");
            return;
        }
    };

    let tmp = path.with_extension("json.tmp");
    let result = fs::write(&tmp, serialized).and_then(|()| fs::rename(&tmp, &path));

    if let Err(e) = result {
        warn!(path = %path.display(), error = %e, "Flat store persist failed; continuing memory-only");
        inner.path = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
