//! Break-Even Targeting (Pure Functions)
//!
//! Decides when a trade's stop-loss should be moved to break-even and
//! produces the updated trade when it is.
//!
//! # Break-Even Rule (Risk Multiple)
//!
//! The stop moves to entry once price has travelled `multiplier` times the
//! original entry-to-stop distance in favor of the position:
//!
//! ```text
//! LONG:  threshold = entry + multiplier × (entry − stop)   candidate: price ≥ threshold − ε
//! SHORT: threshold = entry − multiplier × (stop − entry)   candidate: price ≤ threshold + ε
//! ```
//!
//! Both functions are deterministic and never mutate their inputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tradebook_domain::{DomainEvent, Price, Side, Target, TargetKind, Trade};

/// Policy for the break-even rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingPolicy {
    /// Risk multiple price must reach before the stop moves
    pub move_stop_to_break_even_multiplier: Decimal,
    /// Tolerance applied at the threshold boundary
    pub break_even_epsilon: Decimal,
}

impl TargetingPolicy {
    /// Default risk multiple (2R)
    pub const DEFAULT_MULTIPLIER: Decimal = Decimal::TWO;

    /// Default boundary tolerance (1e-8)
    pub const DEFAULT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 8);
}

impl Default for TargetingPolicy {
    fn default() -> Self {
        Self {
            move_stop_to_break_even_multiplier: Self::DEFAULT_MULTIPLIER,
            break_even_epsilon: Self::DEFAULT_EPSILON,
        }
    }
}

/// Result of assessing a trade against the break-even rule
///
/// `be_threshold` and `stop_target` are filled whenever a stop-loss exists,
/// even if the price has not reached the threshold, so callers can show
/// progress toward break-even.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakEvenAssessment {
    pub can_move_to_break_even: bool,
    pub be_threshold: Option<Decimal>,
    pub stop_target: Option<Target>,
}

impl BreakEvenAssessment {
    fn no_stop() -> Self {
        Self {
            can_move_to_break_even: false,
            be_threshold: None,
            stop_target: None,
        }
    }
}

/// Updated trade plus the event describing the move
#[derive(Debug, Clone, PartialEq)]
pub struct BreakEvenMove {
    pub trade: Trade,
    pub event: DomainEvent,
}

/// Assess whether the trade's stop-loss may move to break-even at `market_price`
///
/// Uses the first STOP_LOSS target in stored order. Its status is not
/// considered: a triggered or canceled stop-loss is assessed like an open one.
///
/// # Examples
///
/// ```
/// # use tradebook_domain::{Trade, TradeInput, TargetInput};
/// # use tradebook_engine::targeting::{assess_break_even_candidate, TargetingPolicy};
/// # use rust_decimal_macros::dec;
/// let trade = Trade::new(TradeInput {
///     symbol: "BTCUSDT".to_string(),
///     price: dec!(100),
///     size: dec!(1),
///     targets: vec![TargetInput {
///         kind: "STOP_LOSS".to_string(),
///         price: dec!(90),
///         ..Default::default()
///     }],
///     ..Default::default()
/// })
/// .unwrap();
///
/// let policy = TargetingPolicy::default();
/// let early = assess_break_even_candidate(&trade, dec!(119), &policy);
/// assert!(!early.can_move_to_break_even);
/// assert_eq!(early.be_threshold, Some(dec!(120)));
///
/// assert!(assess_break_even_candidate(&trade, dec!(120), &policy).can_move_to_break_even);
/// ```
pub fn assess_break_even_candidate(
    trade: &Trade,
    market_price: Decimal,
    policy: &TargetingPolicy,
) -> BreakEvenAssessment {
    let stop = match trade.first_stop_loss() {
        Some(stop) => stop,
        None => return BreakEvenAssessment::no_stop(),
    };

    let entry = trade.price.as_decimal();
    let stop_price = stop.price().as_decimal();
    let multiplier = policy.move_stop_to_break_even_multiplier;
    let epsilon = policy.break_even_epsilon;

    let (threshold, reached) = match trade.side {
        Side::Long => {
            let distance = entry - stop_price;
            let threshold = entry + multiplier * distance;
            (threshold, market_price >= threshold - epsilon)
        },
        Side::Short => {
            let distance = stop_price - entry;
            let threshold = entry - multiplier * distance;
            (threshold, market_price <= threshold + epsilon)
        },
    };

    debug!(
        trade_id = %trade.id,
        side = %trade.side,
        %market_price,
        %threshold,
        reached,
        "Assessed break-even candidate"
    );

    BreakEvenAssessment {
        can_move_to_break_even: reached,
        be_threshold: Some(threshold),
        stop_target: Some(stop.clone()),
    }
}

/// Move a stop to the trade's entry price
///
/// The stop is looked up by `stop_target_id` when given, otherwise the first
/// STOP_LOSS target is used. Returns `None` when no target matches or when the
/// matched target is already a BREAK_EVEN stop at exactly the entry price.
///
/// The input trade is left untouched; the returned `BreakEvenMove` carries a
/// copy with the converted target in place. Persisting it is up to the caller.
pub fn apply_move_stop_to_break_even(
    trade: &Trade,
    stop_target_id: Option<&str>,
) -> Option<BreakEvenMove> {
    let index = match stop_target_id {
        Some(id) => trade.targets.iter().position(|t| t.id() == Some(id)),
        None => trade.targets.iter().position(|t| t.kind() == TargetKind::StopLoss),
    }?;

    let entry: Price = trade.price;
    let current = &trade.targets[index];

    if current.kind() == TargetKind::BreakEven && current.price() == entry {
        return None;
    }

    let old_price = current.price();
    let moved = current.moved_to_break_even(entry);
    let event = DomainEvent::BreakEvenMoved {
        trade_id: trade.id,
        old_price,
        new_price: entry,
        stop_target_id: moved.id().map(str::to_string),
    };

    let mut updated = trade.clone();
    updated.targets = trade
        .targets
        .iter()
        .enumerate()
        .map(|(i, t)| if i == index { moved.clone() } else { t.clone() })
        .collect();

    debug!(trade_id = %trade.id, %old_price, new_price = %entry, "Stop moved to break-even");

    Some(BreakEvenMove { trade: updated, event })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tradebook_domain::{TargetInput, TargetStatus, TradeInput};

    fn target(id: &str, kind: &str, price: Decimal) -> TargetInput {
        TargetInput {
            id: Some(id.to_string()),
            kind: kind.to_string(),
            price,
            ..Default::default()
        }
    }

    fn trade(side: &str, entry: Decimal, targets: Vec<TargetInput>) -> Trade {
        Trade::new(TradeInput {
            symbol: "BTCUSDT".to_string(),
            side: Some(side.to_string()),
            price: entry,
            size: dec!(1),
            targets,
            ..Default::default()
        })
        .unwrap()
    }

    // =========================================================================
    // Assessment
    // =========================================================================

    #[test]
    fn test_long_threshold_boundary() {
        let trade = trade("LONG", dec!(100), vec![target("sl1", "STOP_LOSS", dec!(90))]);
        let policy = TargetingPolicy::default();

        let below = assess_break_even_candidate(&trade, dec!(119), &policy);
        assert!(!below.can_move_to_break_even);
        assert_eq!(below.be_threshold, Some(dec!(120)));
        assert_eq!(below.stop_target.unwrap().id(), Some("sl1"));

        let at = assess_break_even_candidate(&trade, dec!(120), &policy);
        assert!(at.can_move_to_break_even);
    }

    #[test]
    fn test_long_epsilon_absorbs_boundary_noise() {
        let trade = trade("LONG", dec!(100), vec![target("sl1", "STOP_LOSS", dec!(90))]);
        let policy = TargetingPolicy::default();

        assert!(assess_break_even_candidate(&trade, dec!(119.999999995), &policy)
            .can_move_to_break_even);
        assert!(!assess_break_even_candidate(&trade, dec!(119.99999998), &policy)
            .can_move_to_break_even);
    }

    #[test]
    fn test_short_threshold_mirrors_long() {
        let trade = trade("SHORT", dec!(100), vec![target("sl1", "STOP_LOSS", dec!(110))]);
        let policy = TargetingPolicy::default();

        let above = assess_break_even_candidate(&trade, dec!(81), &policy);
        assert!(!above.can_move_to_break_even);
        assert_eq!(above.be_threshold, Some(dec!(80)));

        assert!(assess_break_even_candidate(&trade, dec!(80), &policy).can_move_to_break_even);
        assert!(assess_break_even_candidate(&trade, dec!(75), &policy).can_move_to_break_even);
    }

    #[test]
    fn test_custom_multiplier() {
        let trade = trade("LONG", dec!(100), vec![target("sl1", "STOP_LOSS", dec!(90))]);
        let policy = TargetingPolicy {
            move_stop_to_break_even_multiplier: dec!(1),
            ..Default::default()
        };

        let result = assess_break_even_candidate(&trade, dec!(110), &policy);
        assert_eq!(result.be_threshold, Some(dec!(110)));
        assert!(result.can_move_to_break_even);
    }

    #[test]
    fn test_no_stop_loss_means_no_candidate() {
        let trade = trade(
            "LONG",
            dec!(100),
            vec![target("tp1", "TAKE_PROFIT", dec!(120)), target("o1", "OTHER", dec!(95))],
        );
        let policy = TargetingPolicy::default();

        for price in [dec!(1), dec!(100), dec!(1000000)] {
            let result = assess_break_even_candidate(&trade, price, &policy);
            assert!(!result.can_move_to_break_even);
            assert!(result.be_threshold.is_none());
            assert!(result.stop_target.is_none());
        }
    }

    #[test]
    fn test_canceled_stop_loss_is_still_assessed() {
        // The first STOP_LOSS is used whatever its status
        let mut trade = trade(
            "LONG",
            dec!(100),
            vec![target("sl1", "STOP_LOSS", dec!(90)), target("sl2", "STOP_LOSS", dec!(95))],
        );
        trade.targets[0].mark_canceled();

        let result = assess_break_even_candidate(&trade, dec!(120), &TargetingPolicy::default());
        assert!(result.can_move_to_break_even);
        let stop = result.stop_target.unwrap();
        assert_eq!(stop.id(), Some("sl1"));
        assert_eq!(stop.status(), TargetStatus::Canceled);
    }

    #[test]
    fn test_triggered_stop_loss_is_still_assessed() {
        let mut trade = trade(
            "LONG",
            dec!(100),
            vec![target("sl1", "STOP_LOSS", dec!(90)), target("sl2", "STOP_LOSS", dec!(95))],
        );
        trade.targets[0].mark_triggered(Some(Price::new(dec!(90)).unwrap()), None);

        let below = assess_break_even_candidate(&trade, dec!(119), &TargetingPolicy::default());
        assert!(!below.can_move_to_break_even);
        assert_eq!(below.be_threshold, Some(dec!(120)));

        let result = assess_break_even_candidate(&trade, dec!(120), &TargetingPolicy::default());
        assert!(result.can_move_to_break_even);
        let stop = result.stop_target.unwrap();
        assert_eq!(stop.id(), Some("sl1"));
        assert_eq!(stop.status(), TargetStatus::Triggered);
    }

    // =========================================================================
    // Applying the move
    // =========================================================================

    #[test]
    fn test_move_converts_stop_and_emits_event() {
        let trade = trade(
            "LONG",
            dec!(100),
            vec![target("sl1", "STOP_LOSS", dec!(90)), target("tp1", "TAKE_PROFIT", dec!(120))],
        );

        let result = apply_move_stop_to_break_even(&trade, None).unwrap();

        let moved = &result.trade.targets[0];
        assert_eq!(moved.id(), Some("sl1"));
        assert_eq!(moved.kind(), TargetKind::BreakEven);
        assert_eq!(moved.price().as_decimal(), dec!(100));
        assert_eq!(result.trade.targets[1], trade.targets[1]);

        assert_eq!(
            result.event,
            DomainEvent::BreakEvenMoved {
                trade_id: trade.id,
                old_price: Price::new(dec!(90)).unwrap(),
                new_price: Price::new(dec!(100)).unwrap(),
                stop_target_id: Some("sl1".to_string()),
            }
        );
    }

    #[test]
    fn test_short_move_emits_event() {
        let trade = trade(
            "SHORT",
            dec!(100),
            vec![target("tp1", "TAKE_PROFIT", dec!(80)), target("sl1", "STOP_LOSS", dec!(110))],
        );

        let result = apply_move_stop_to_break_even(&trade, None).unwrap();

        assert_eq!(result.trade.targets[1].kind(), TargetKind::BreakEven);
        assert_eq!(result.trade.targets[1].price().as_decimal(), dec!(100));
        assert_eq!(
            result.event,
            DomainEvent::BreakEvenMoved {
                trade_id: trade.id,
                old_price: Price::new(dec!(110)).unwrap(),
                new_price: Price::new(dec!(100)).unwrap(),
                stop_target_id: Some("sl1".to_string()),
            }
        );
    }

    #[test]
    fn test_move_leaves_input_trade_untouched() {
        let trade = trade("LONG", dec!(100), vec![target("sl1", "STOP_LOSS", dec!(90))]);
        let before = trade.clone();

        let _ = apply_move_stop_to_break_even(&trade, None).unwrap();

        assert_eq!(trade, before);
        assert_eq!(trade.targets[0].kind(), TargetKind::StopLoss);
    }

    #[test]
    fn test_move_is_idempotent() {
        let trade = trade("LONG", dec!(100), vec![target("sl1", "STOP_LOSS", dec!(90))]);

        let first = apply_move_stop_to_break_even(&trade, Some("sl1")).unwrap();
        let second = apply_move_stop_to_break_even(&first.trade, Some("sl1"));

        assert!(second.is_none());
    }

    #[test]
    fn test_move_by_id_targets_selected_stop() {
        let trade = trade(
            "SHORT",
            dec!(100),
            vec![target("sl1", "STOP_LOSS", dec!(110)), target("sl2", "STOP_LOSS", dec!(105))],
        );

        let result = apply_move_stop_to_break_even(&trade, Some("sl2")).unwrap();

        assert_eq!(result.trade.targets[0].kind(), TargetKind::StopLoss);
        assert_eq!(result.trade.targets[1].kind(), TargetKind::BreakEven);
        assert_eq!(result.trade.targets[1].price().as_decimal(), dec!(100));
    }

    #[test]
    fn test_move_without_match_is_noop() {
        let no_stop = trade("LONG", dec!(100), vec![target("tp1", "TAKE_PROFIT", dec!(120))]);
        assert!(apply_move_stop_to_break_even(&no_stop, None).is_none());

        let with_stop = trade("LONG", dec!(100), vec![target("sl1", "STOP_LOSS", dec!(90))]);
        assert!(apply_move_stop_to_break_even(&with_stop, Some("missing")).is_none());
    }

    #[test]
    fn test_break_even_stop_away_from_entry_is_realigned() {
        // BREAK_EVEN kind but not at entry: realign the price
        let trade = trade("LONG", dec!(100), vec![target("be1", "BREAK_EVEN", dec!(99.5))]);

        let result = apply_move_stop_to_break_even(&trade, Some("be1")).unwrap();
        assert_eq!(result.trade.targets[0].price().as_decimal(), dec!(100));
    }
}
