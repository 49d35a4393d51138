use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::matching_engine::ExecutionReport;
use crate::quote::SeedQuote;
use crate::types::Trade;

/// Events the engine produces for the session layer to re-encode as outbound
/// messages (execution reports, trade prints, rejections).
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// An order was accepted and processed; carries its execution report.
    OrderAccepted { report: ExecutionReport },
    /// An order was rejected before touching the book.
    OrderRejected {
        client_order_id: String,
        symbol: String,
        reason: String,
    },
    /// A trade occurred between a resting order and an aggressor.
    TradeExecuted { trade: Trade },
    /// A book was created and seeded for a newly referenced symbol.
    BookSeeded { symbol: String, quote: SeedQuote },
}

/// Metadata attached to every published event.
#[derive(Debug, Clone)]
pub struct EventMetadata {
    /// Unique identifier for the event.
    pub id: Uuid,
    /// Timestamp when the event was published.
    pub timestamp: DateTime<Utc>,
    /// Sequence number for ordering events from one bus.
    pub sequence: u64,
    /// Source component that generated the event.
    pub source: String,
}

/// Subscription to the event bus.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    receiver: Receiver<(EngineEvent, EventMetadata)>,
}

impl Subscription {
    /// Returns the subscription ID.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Receives the next event, blocking until one arrives or the bus drops.
    pub fn receive(&self) -> Option<(EngineEvent, EventMetadata)> {
        self.receiver.recv().ok()
    }

    /// Tries to receive an event without blocking.
    pub fn try_receive(&self) -> Option<(EngineEvent, EventMetadata)> {
        self.receiver.try_recv().ok()
    }
}

/// Fan-out bus distributing engine events to subscribers.
///
/// Publication is fire-and-forget: a slow or absent subscriber never blocks
/// the matching path.
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<RwLock<EventBusInner>>,
    sequence_counter: Arc<AtomicU64>,
    source: String,
}

#[derive(Debug)]
struct EventBusInner {
    senders: HashMap<Uuid, Sender<(EngineEvent, EventMetadata)>>,
}

impl EventBus {
    /// Creates a new event bus tagged with a source identifier.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(EventBusInner {
                senders: HashMap::new(),
            })),
            sequence_counter: Arc::new(AtomicU64::new(1)),
            source: source.into(),
        }
    }

    /// Subscribes to all events published on this bus.
    pub fn subscribe(&self) -> Subscription {
        let subscription_id = Uuid::new_v4();
        let (sender, receiver) = unbounded();

        self.inner.write().senders.insert(subscription_id, sender);

        Subscription {
            id: subscription_id,
            receiver,
        }
    }

    /// Unsubscribes; returns false if the id was unknown.
    pub fn unsubscribe(&self, subscription_id: Uuid) -> bool {
        self.inner.write().senders.remove(&subscription_id).is_some()
    }

    /// Publishes an event to all current subscribers.
    pub fn publish(&self, event: EngineEvent) {
        let metadata = EventMetadata {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            sequence: self.sequence_counter.fetch_add(1, Ordering::SeqCst),
            source: self.source.clone(),
        };

        // Collect senders first; never hold the lock while delivering
        let senders = {
            let inner = self.inner.read();
            inner.senders.values().cloned().collect::<Vec<_>>()
        };

        for sender in senders {
            let _ = sender.try_send((event.clone(), metadata.clone()));
        }
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().senders.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new("ordermatch")
    }
}
