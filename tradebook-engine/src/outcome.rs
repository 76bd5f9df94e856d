//! Trade Outcome Calculation
//!
//! Aggregates the triggered legs of a trade into realized P/L and classifies
//! the trade as WIN, LOSS, BREAKEVEN or PENDING. Read-only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tradebook_domain::Trade;

/// Options for outcome classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeOptions {
    /// Band around zero P/L classified as BREAKEVEN
    pub epsilon: Decimal,
    /// Report an open trade with a break-even stop as WIN
    pub treat_break_even_as_win: bool,
}

impl ComputeOptions {
    /// Default break-even band (0.0001)
    pub const DEFAULT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 4);
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            epsilon: Self::DEFAULT_EPSILON,
            treat_break_even_as_win: true,
        }
    }
}

/// Outcome classification of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeOutcome {
    Win,
    Loss,
    BreakEven,
    /// Size remains open and no break-even policy applies
    Pending,
}

impl fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeOutcome::Win => write!(f, "WIN"),
            TradeOutcome::Loss => write!(f, "LOSS"),
            TradeOutcome::BreakEven => write!(f, "BREAKEVEN"),
            TradeOutcome::Pending => write!(f, "PENDING"),
        }
    }
}

/// Outcome plus the realized figures it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOutcomeReport {
    pub outcome: TradeOutcome,
    pub realized_pl: Decimal,
    pub realized_size: Decimal,
    pub remaining_size: Decimal,
}

/// Compute realized P/L and classify the trade
///
/// Only TRIGGERED targets with an executed price and a size contribute:
///
/// ```text
/// LONG leg:  (executed − entry) × size
/// SHORT leg: (entry − executed) × size
/// ```
///
/// Once no size remains, the sign of realized P/L (outside ±epsilon) decides
/// WIN / LOSS, otherwise BREAKEVEN. While size remains the trade is PENDING,
/// unless `treat_break_even_as_win` is set and any target is a BREAK_EVEN
/// stop, in which case it is reported as a provisional WIN. Realized P/L
/// always reflects filled legs only.
pub fn compute_trade_outcome(trade: &Trade, options: &ComputeOptions) -> TradeOutcomeReport {
    let entry = trade.price.as_decimal();

    let (realized_pl, realized_size) = trade
        .targets
        .iter()
        .filter(|t| t.is_triggered())
        .filter_map(|t| Some((t.executed_price()?, t.size()?)))
        .fold((Decimal::ZERO, Decimal::ZERO), |(pl, size), (executed, leg_size)| {
            let leg_size = leg_size.as_decimal();
            (pl + trade.side.pnl(entry, executed.as_decimal(), leg_size), size + leg_size)
        });

    let remaining_size = (trade.size.as_decimal() - realized_size).max(Decimal::ZERO);

    let outcome = if remaining_size.is_zero() {
        if realized_pl > options.epsilon {
            TradeOutcome::Win
        } else if realized_pl < -options.epsilon {
            TradeOutcome::Loss
        } else {
            TradeOutcome::BreakEven
        }
    } else if options.treat_break_even_as_win && trade.has_break_even() {
        TradeOutcome::Win
    } else {
        TradeOutcome::Pending
    };

    TradeOutcomeReport {
        outcome,
        realized_pl,
        realized_size,
        remaining_size,
    }
}

// =============================================================================
// Tests
// =============================================================================
