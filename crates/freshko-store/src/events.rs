//! # Event Bus
//!
//! Typed publish/subscribe owned by the store instance.
//!
//! ## Why Not Ambient Broadcast?
//! Independently-mounted views need to hear "the data changed, re-read it"
//! without a server round-trip. An ambient global event target makes that
//! untestable and unscoped; instead the bus is an ordinary value the store
//! owns and hands out, carried by a `tokio::sync::broadcast` channel.
//!
//! ## Contract
//! - Events carry no payload beyond the signal itself; listeners re-read
//!   derived state from the store
//! - Publishing with zero subscribers is fine
//! - A lagged subscriber misses events rather than blocking the publisher

use tokio::sync::broadcast;
use tracing::debug;

/// Buffered events per subscriber before lag kicks in.
const CHANNEL_CAPACITY: usize = 64;

/// The signals the store broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    OrderCreated,
    OrderUpdated,
    ArticleCreated,
    ArticleUpdated,
    ArticleDeleted,
    /// The one-shot legacy migration ran during this open.
    StorageMigrated,
}

impl StoreEvent {
    /// The wire-style signal name, used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            StoreEvent::OrderCreated => "orderCreated",
            StoreEvent::OrderUpdated => "orderUpdated",
            StoreEvent::ArticleCreated => "articleCreated",
            StoreEvent::ArticleUpdated => "articleUpdated",
            StoreEvent::ArticleDeleted => "articleDeleted",
            StoreEvent::StorageMigrated => "storage-migrated",
        }
    }
}

/// The store's broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        EventBus { tx }
    }

    /// Subscribes a new listener. Each subscriber sees every event
    /// published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event to all current subscribers.
    pub fn publish(&self, event: StoreEvent) {
        debug!(event = event.name(), "publish");
        // send only errors when there are no receivers - not a failure
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers (diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
