//! Tradebook Engine Layer
//!
//! Pure decision logic, deterministic, no I/O.
//! Takes a trade snapshot → returns an assessment, an updated trade, or a report.
//!
//! - [`targeting`]: break-even assessment and the stop move
//! - [`outcome`]: realized P/L and outcome classification
//! - [`summary`]: aggregate outcome figures for a journal

#![warn(clippy::all)]

pub mod outcome;
pub mod summary;
pub mod targeting;

pub use outcome::{compute_trade_outcome, ComputeOptions, TradeOutcome, TradeOutcomeReport};
pub use summary::{summarize, JournalSummary};
pub use targeting::{
    apply_move_stop_to_break_even, assess_break_even_candidate, BreakEvenAssessment,
    BreakEvenMove, TargetingPolicy,
};
