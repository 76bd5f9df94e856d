//! Journal summary over many trades.

use crate::outcome::{compute_trade_outcome, ComputeOptions, TradeOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tradebook_domain::Trade;

/// Outcome counts and realized P/L across a journal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSummary {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    pub break_evens: usize,
    pub pending: usize,
    pub realized_pl: Decimal,
}

impl JournalSummary {
    /// Wins as a percentage of decided (non-pending) trades
    ///
    /// `None` until at least one trade is decided.
    pub fn win_rate_pct(&self) -> Option<Decimal> {
        let decided = self.wins + self.losses + self.break_evens;
        if decided == 0 {
            return None;
        }
        Some(Decimal::from(self.wins) * Decimal::ONE_HUNDRED / Decimal::from(decided))
    }
}

impl fmt::Display for JournalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trades: {} win / {} loss / {} breakeven / {} pending, realized P/L {}",
            self.total, self.wins, self.losses, self.break_evens, self.pending, self.realized_pl
        )?;
        if let Some(rate) = self.win_rate_pct() {
            write!(f, ", win rate {}%", rate.round_dp(2))?;
        }
        Ok(())
    }
}

/// Classify every trade and aggregate the results
pub fn summarize<'a, I>(trades: I, options: &ComputeOptions) -> JournalSummary
where
    I: IntoIterator<Item = &'a Trade>,
{
    trades.into_iter().fold(JournalSummary::default(), |mut summary, trade| {
        let report = compute_trade_outcome(trade, options);

        summary.total += 1;
        summary.realized_pl += report.realized_pl;
        match report.outcome {
            TradeOutcome::Win => summary.wins += 1,
            TradeOutcome::Loss => summary.losses += 1,
            TradeOutcome::BreakEven => summary.break_evens += 1,
            TradeOutcome::Pending => summary.pending += 1,
        }

        summary
    })
}
