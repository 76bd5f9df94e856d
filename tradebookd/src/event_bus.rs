//! Event bus for internal daemon communication.
//!
//! The event bus allows decoupled communication between:
//! - Tick sources → Tick processor (market prices)
//! - Tick processor → listeners (break-even candidates, applied moves)
//!
//! Uses tokio broadcast channels for fan-out to multiple receivers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tradebook_domain::{DomainEvent, Price, Symbol, TargetId, TradeId};

// =============================================================================
// Event Types
// =============================================================================

/// Events that flow through the daemon event bus.
#[derive(Debug, Clone)]
pub enum DaemonEvent {
    /// Market price update
    MarketTick(MarketTick),

    /// A trade reached its break-even threshold and awaits confirmation
    BreakEvenCandidate {
        trade_id: TradeId,
        symbol: Symbol,
        stop_target_id: Option<TargetId>,
        threshold: Decimal,
        market_price: Price,
        timestamp: DateTime<Utc>,
    },

    /// Request to apply a previously announced break-even move
    ConfirmBreakEven {
        trade_id: TradeId,
        stop_target_id: Option<TargetId>,
    },

    /// Domain event produced by an applied (and saved) change
    Domain(DomainEvent),

    /// Shutdown signal
    Shutdown,
}

/// Market price update.
#[derive(Debug, Clone)]
pub struct MarketTick {
    /// Symbol this update is for
    pub symbol: Symbol,
    /// Current price
    pub price: Price,
    /// When this price was observed
    pub timestamp: DateTime<Utc>,
}

impl MarketTick {
    /// Create a tick observed now.
    pub fn now(symbol: Symbol, price: Price) -> Self {
        Self {
            symbol,
            price,
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Event Bus
// =============================================================================

/// Broadcast bus shared by tick sources, the daemon and any listeners.
///
/// Every subscriber sees every event sent after it subscribed.
pub struct EventBus {
    sender: broadcast::Sender<DaemonEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` unread events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event and return how many subscribers it reached.
    ///
    /// Zero subscribers is not an error: the event is simply dropped.
    pub fn send(&self, event: DaemonEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// A receiver fell behind and the bus dropped events it had not read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Receiver lagged, missed {0} events")]
pub struct Lagged(pub u64);

/// Receiver for daemon events.
pub struct EventReceiver {
    receiver: broadcast::Receiver<DaemonEvent>,
}

impl EventReceiver {
    /// Receive the next event.
    ///
    /// Returns `None` once every sender has been dropped and the buffer is
    /// drained, and `Lagged` when events were overwritten before being read.
    pub async fn recv(&mut self) -> Option<Result<DaemonEvent, Lagged>> {
        match self.receiver.recv().await {
            Ok(event) => Some(Ok(event)),
            Err(broadcast::error::RecvError::Closed) => None,
            Err(broadcast::error::RecvError::Lagged(count)) => Some(Err(Lagged(count))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
