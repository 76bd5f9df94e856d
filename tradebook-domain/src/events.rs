//! Domain Events for Tradebook
//!
//! Events describe state changes produced by the engine. They are returned to
//! the caller (and may be published on the daemon bus); they are not an
//! event-sourced log.

use crate::entities::TradeId;
use crate::target::TargetId;
use crate::value_objects::Price;
use serde::{Deserialize, Serialize};

/// Domain events emitted by trade targeting
///
/// Serialized as `{"type": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum DomainEvent {
    /// A stop-loss was converted into a break-even stop at the entry price
    #[serde(rename_all = "camelCase")]
    BreakEvenMoved {
        /// Trade the stop belongs to
        trade_id: TradeId,
        /// Stop price before the move
        old_price: Price,
        /// Stop price after the move (the entry price)
        new_price: Price,
        /// Identifier of the moved target, if it had one
        stop_target_id: Option<TargetId>,
    },
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::BreakEvenMoved { .. } => "BreakEvenMoved",
        }
    }

    /// Get the trade ID from any event
    pub fn trade_id(&self) -> TradeId {
        match self {
            DomainEvent::BreakEvenMoved { trade_id, .. } => *trade_id,
        }
    }
}
