//! Domain Entities for Tradebook
//!
//! The `Trade` aggregate: one journal entry with its entry parameters and the
//! ordered exit targets attached to it.

use crate::target::{Target, TargetInput, TargetKind};
use crate::value_objects::{DomainError, Price, Quantity, Side, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a Trade
pub type TradeId = Uuid;

// =============================================================================
// Trade
// =============================================================================

/// Trade represents a journaled position and its exit targets
///
/// Key concepts:
/// - `price` is the entry price, `size` the total position size
/// - `targets` keeps the order the user entered them in; lookups such as
///   "first stop-loss" depend on that order
/// - Analyses are free-text notes with no effect on outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: Symbol,
    #[serde(default)]
    pub side: Side,
    pub price: Price,
    pub size: Quantity,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub analyses: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub opened_at: DateTime<Utc>,
}

/// Unvalidated trade record, as submitted by a form or an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInput {
    #[serde(default)]
    pub id: Option<TradeId>,
    pub symbol: String,
    #[serde(default)]
    pub side: Option<String>,
    pub price: Decimal,
    pub size: Decimal,
    #[serde(default)]
    pub targets: Vec<TargetInput>,
    #[serde(default)]
    pub analyses: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub opened_at: Option<DateTime<Utc>>,
}

impl Trade {
    /// Validate a trade record and its targets
    ///
    /// Side defaults to LONG when absent. A fresh UUID v7 and the current
    /// time are assigned when `id` / `opened_at` are missing.
    ///
    /// # Errors
    ///
    /// Returns the first `DomainError` raised by the symbol, price, size, side
    /// or any target.
    pub fn new(input: TradeInput) -> Result<Self, DomainError> {
        let symbol = Symbol::new(&input.symbol)?;
        let price = Price::new(input.price)?;
        let size = Quantity::new(input.size)?;
        let side = match input.side.as_deref() {
            Some(raw) => raw.parse()?,
            None => Side::default(),
        };

        let targets = input
            .targets
            .into_iter()
            .map(Target::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: input.id.unwrap_or_else(Uuid::now_v7),
            symbol,
            side,
            price,
            size,
            targets,
            analyses: input.analyses,
            note: input.note,
            opened_at: input.opened_at.unwrap_or_else(Utc::now),
        })
    }

    /// First STOP_LOSS target in stored order, whatever its status
    pub fn first_stop_loss(&self) -> Option<&Target> {
        self.targets.iter().find(|t| t.kind() == TargetKind::StopLoss)
    }

    /// Target with the given identifier
    pub fn target_by_id(&self, id: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.id() == Some(id))
    }

    /// Check if any target (open or not) sits at break-even
    pub fn has_break_even(&self) -> bool {
        self.targets.iter().any(|t| t.kind() == TargetKind::BreakEven)
    }
}

// =============================================================================
// Tests
// =============================================================================
