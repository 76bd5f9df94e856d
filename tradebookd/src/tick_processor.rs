//! Tick Processor: applies the break-even rule to journaled trades.
//!
//! For every market tick the processor:
//! - Loads trades and keeps those for the tick's symbol that still have open size
//! - Asks the engine whether the stop-loss may move to break-even
//! - Either moves it right away (auto-confirm) or announces a candidate and
//!   waits for `confirm_break_even`
//!
//! # Architecture
//!
//! ```text
//! EventBus (MarketTick) → TickProcessor → Engine (assess / apply)
//!                               ↓
//!                        TradeRepository::save → EventBus (Domain)
//! ```
//!
//! Every move reloads the trade, applies the engine and saves under a single
//! write lock, so two moves never start from the same stored copy. The engine
//! never mutates the loaded trade; a move only becomes visible once `save`
//! succeeds. A failed save leaves the stored trade untouched and the next tick
//! re-evaluates it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use tradebook_domain::{DomainEvent, TargetId, Trade, TradeId};
use tradebook_engine::{
    apply_move_stop_to_break_even, assess_break_even_candidate, compute_trade_outcome,
    BreakEvenMove, ComputeOptions,
};
use tradebook_store::TradeRepository;

use crate::config::TargetingConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::event_bus::{DaemonEvent, EventBus, MarketTick};

type CandidateKey = (TradeId, Option<TargetId>);

// =============================================================================
// Tick Processor
// =============================================================================

/// Evaluates ticks against stored trades and moves stops to break-even.
pub struct TickProcessor<S: TradeRepository + 'static> {
    /// Trade storage
    store: Arc<S>,
    /// Event bus for publishing candidates and applied moves
    event_bus: Arc<EventBus>,
    /// Targeting policy and confirmation mode
    config: TargetingConfig,
    /// Candidates already announced and awaiting confirmation
    announced: RwLock<HashSet<CandidateKey>>,
    /// Held from reload to save of every move
    writes: Mutex<()>,
}

impl<S: TradeRepository + 'static> TickProcessor<S> {
    /// Create a new tick processor.
    pub fn new(store: Arc<S>, event_bus: Arc<EventBus>, config: TargetingConfig) -> Self {
        Self {
            store,
            event_bus,
            config,
            announced: RwLock::new(HashSet::new()),
            writes: Mutex::new(()),
        }
    }

    /// Process a market tick.
    ///
    /// Returns the domain events of the moves applied and saved during this
    /// tick (always empty when confirmation is manual).
    pub async fn process_tick(&self, tick: &MarketTick) -> DaemonResult<Vec<DomainEvent>> {
        let trades = self.store.get_all().await?;
        self.prune_candidates(&trades).await;

        let market_price = tick.price.as_decimal();
        let mut applied = Vec::new();

        for trade in trades.iter().filter(|t| t.symbol == tick.symbol) {
            if is_closed(trade) {
                continue;
            }

            let assessment = assess_break_even_candidate(trade, market_price, &self.config.policy);
            if !assessment.can_move_to_break_even {
                continue;
            }

            if self.config.auto_confirm {
                // Re-assess on the reloaded copy: a confirmation may have moved the stop meanwhile
                let policy = &self.config.policy;
                let event = self
                    .move_and_save(trade.id, |fresh| {
                        assess_break_even_candidate(fresh, market_price, policy)
                            .can_move_to_break_even
                            .then(|| apply_move_stop_to_break_even(fresh, None))
                            .flatten()
                    })
                    .await?;
                applied.extend(event);
                continue;
            }

            let stop_target_id = assessment
                .stop_target
                .as_ref()
                .and_then(|t| t.id())
                .map(str::to_string);

            let key = (trade.id, stop_target_id.clone());
            if !self.announced.write().await.insert(key) {
                continue;
            }

            info!(
                trade_id = %trade.id,
                symbol = %trade.symbol,
                price = %tick.price,
                stop_target_id = ?stop_target_id,
                threshold = ?assessment.be_threshold,
                "Break-even candidate awaiting confirmation"
            );

            self.event_bus.send(DaemonEvent::BreakEvenCandidate {
                trade_id: trade.id,
                symbol: trade.symbol.clone(),
                stop_target_id,
                threshold: assessment.be_threshold.unwrap_or_default(),
                market_price: tick.price,
                timestamp: Utc::now(),
            });
        }

        Ok(applied)
    }

    /// Confirm a pending break-even move.
    ///
    /// Returns `None` when there is nothing to move (no matching stop, or it is
    /// already at break-even). Either way every candidate announced for the
    /// trade is settled.
    pub async fn confirm_break_even(
        &self,
        trade_id: TradeId,
        stop_target_id: Option<TargetId>,
    ) -> DaemonResult<Option<DomainEvent>> {
        let event = self
            .move_and_save(trade_id, |fresh| {
                apply_move_stop_to_break_even(fresh, stop_target_id.as_deref())
            })
            .await?;

        self.announced.write().await.retain(|(id, _)| *id != trade_id);
        Ok(event)
    }

    /// Number of announced candidates still awaiting confirmation.
    pub async fn pending_candidates(&self) -> usize {
        self.announced.read().await.len()
    }

    /// Drop candidates whose trade closed, vanished, or no longer has the
    /// announced stop as its first STOP_LOSS.
    async fn prune_candidates(&self, trades: &[Trade]) {
        let live: HashSet<CandidateKey> = trades
            .iter()
            .filter(|t| !is_closed(t))
            .filter_map(|t| t.first_stop_loss().map(|stop| (t.id, stop.id().map(str::to_string))))
            .collect();

        let mut announced = self.announced.write().await;
        let before = announced.len();
        announced.retain(|key| live.contains(key));

        if announced.len() < before {
            debug!(pruned = before - announced.len(), "Stale break-even candidates dropped");
        }
    }

    /// Reload the trade, let `apply` derive the move and save it.
    async fn move_and_save<F>(&self, trade_id: TradeId, apply: F) -> DaemonResult<Option<DomainEvent>>
    where
        F: FnOnce(&Trade) -> Option<BreakEvenMove>,
    {
        let _guard = self.writes.lock().await;

        let trade = self
            .store
            .find_by_id(trade_id)
            .await?
            .ok_or(DaemonError::TradeNotFound(trade_id))?;

        let Some(moved) = apply(&trade) else {
            debug!(%trade_id, "No stop to move");
            return Ok(None);
        };

        if let Err(e) = self.store.save(&moved.trade).await {
            warn!(%trade_id, error = %e, "Failed to save break-even move");
            return Err(e.into());
        }

        info!(
            %trade_id,
            symbol = %trade.symbol,
            event = moved.event.event_type(),
            "Stop moved to break-even"
        );

        self.event_bus.send(DaemonEvent::Domain(moved.event.clone()));
        Ok(Some(moved.event))
    }
}

/// Fully closed trades have nothing left to protect
fn is_closed(trade: &Trade) -> bool {
    compute_trade_outcome(trade, &ComputeOptions::default()).remaining_size.is_zero()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tradebook_domain::{Price, Symbol, Target, TargetInput, TargetKind, TradeInput};
    use tradebook_engine::TargetingPolicy;
    use tradebook_store::MemoryStore;

    fn long_trade(symbol: &str) -> Trade {
        Trade::new(TradeInput {
            symbol: symbol.to_string(),
            price: dec!(100),
            size: dec!(1),
            targets: vec![TargetInput {
                id: Some("sl1".to_string()),
                kind: "STOP_LOSS".to_string(),
                price: dec!(90),
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap()
    }

    fn tick(symbol: &str, price: Decimal) -> MarketTick {
        MarketTick::now(Symbol::new(symbol).unwrap(), Price::new(price).unwrap())
    }

    fn processor(store: Arc<MemoryStore>, auto_confirm: bool) -> TickProcessor<MemoryStore> {
        TickProcessor::new(
            store,
            Arc::new(EventBus::new(64)),
            TargetingConfig {
                policy: TargetingPolicy::default(),
                auto_confirm,
            },
        )
    }

    #[tokio::test]
    async fn test_auto_confirm_moves_and_saves() {
        let trade = long_trade("BTCUSDT");
        let store = Arc::new(MemoryStore::with_trades([trade.clone()]));
        let processor = processor(store.clone(), true);

        assert!(processor.process_tick(&tick("BTCUSDT", dec!(119))).await.unwrap().is_empty());

        let events = processor.process_tick(&tick("BTCUSDT", dec!(120))).await.unwrap();
        assert_eq!(events.len(), 1);

        let stored = store.find_by_id(trade.id).await.unwrap().unwrap();
        assert_eq!(stored.targets[0].kind(), TargetKind::BreakEven);
        assert_eq!(stored.targets[0].price().as_decimal(), dec!(100));

        // Stop is gone, so further ticks find nothing to do
        assert!(processor.process_tick(&tick("BTCUSDT", dec!(130))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_symbols_are_ignored() {
        let trade = long_trade("ETHUSDT");
        let store = Arc::new(MemoryStore::with_trades([trade.clone()]));
        let processor = processor(store.clone(), true);

        assert!(processor.process_tick(&tick("BTCUSDT", dec!(500))).await.unwrap().is_empty());
        let stored = store.find_by_id(trade.id).await.unwrap().unwrap();
        assert_eq!(stored.targets[0].kind(), TargetKind::StopLoss);
    }

    #[tokio::test]
    async fn test_manual_confirmation_announces_once() {
        let trade = long_trade("BTCUSDT");
        let store = Arc::new(MemoryStore::with_trades([trade.clone()]));
        let processor = processor(store.clone(), false);

        for price in [dec!(120), dec!(125)] {
            assert!(processor.process_tick(&tick("BTCUSDT", price)).await.unwrap().is_empty());
        }
        assert_eq!(processor.pending_candidates().await, 1);

        // Nothing saved before confirmation
        let stored = store.find_by_id(trade.id).await.unwrap().unwrap();
        assert_eq!(stored.targets[0].kind(), TargetKind::StopLoss);

        let event = processor
            .confirm_break_even(trade.id, Some("sl1".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.trade_id(), trade.id);
        assert_eq!(processor.pending_candidates().await, 0);

        // Second confirmation is a no-op
        let again = processor.confirm_break_even(trade.id, Some("sl1".to_string())).await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_confirm_without_stop_id_settles_candidate() {
        let trade = long_trade("BTCUSDT");
        let store = Arc::new(MemoryStore::with_trades([trade.clone()]));
        let processor = processor(store.clone(), false);

        processor.process_tick(&tick("BTCUSDT", dec!(125))).await.unwrap();
        assert_eq!(processor.pending_candidates().await, 1);

        let event = processor.confirm_break_even(trade.id, None).await.unwrap();
        assert!(event.is_some());
        assert_eq!(processor.pending_candidates().await, 0);

        let stored = store.find_by_id(trade.id).await.unwrap().unwrap();
        assert_eq!(stored.targets[0].kind(), TargetKind::BreakEven);
    }

    #[tokio::test]
    async fn test_candidates_of_closed_trades_are_pruned() {
        let trade = long_trade("BTCUSDT");
        let store = Arc::new(MemoryStore::with_trades([trade.clone()]));
        let processor = processor(store.clone(), false);

        processor.process_tick(&tick("BTCUSDT", dec!(125))).await.unwrap();
        assert_eq!(processor.pending_candidates().await, 1);

        // Position closed out before anyone confirmed
        let mut closed = trade.clone();
        closed.targets.push(
            Target::new(TargetInput {
                kind: "TAKE_PROFIT".to_string(),
                price: dec!(125),
                size: Some(dec!(1)),
                status: Some("TRIGGERED".to_string()),
                executed_price: Some(dec!(125)),
                ..Default::default()
            })
            .unwrap(),
        );
        store.save(&closed).await.unwrap();

        processor.process_tick(&tick("ETHUSDT", dec!(10))).await.unwrap();
        assert_eq!(processor.pending_candidates().await, 0);
    }

    #[tokio::test]
    async fn test_candidates_of_moved_stops_are_pruned() {
        let trade = long_trade("BTCUSDT");
        let store = Arc::new(MemoryStore::with_trades([trade.clone()]));
        let processor = processor(store.clone(), false);

        processor.process_tick(&tick("BTCUSDT", dec!(125))).await.unwrap();

        // Stop moved by another writer
        let moved = apply_move_stop_to_break_even(&trade, None).unwrap();
        store.save(&moved.trade).await.unwrap();

        processor.process_tick(&tick("BTCUSDT", dec!(126))).await.unwrap();
        assert_eq!(processor.pending_candidates().await, 0);
    }

    #[tokio::test]
    async fn test_confirm_unknown_trade() {
        let processor = processor(Arc::new(MemoryStore::new()), false);
        let missing = long_trade("BTCUSDT").id;

        let result = processor.confirm_break_even(missing, None).await;
        assert!(matches!(result, Err(DaemonError::TradeNotFound(id)) if id == missing));
    }

    #[tokio::test]
    async fn test_closed_trades_are_skipped() {
        let mut trade = long_trade("BTCUSDT");
        trade.targets.push(
            Target::new(TargetInput {
                kind: "TAKE_PROFIT".to_string(),
                price: dec!(120),
                size: Some(dec!(1)),
                status: Some("TRIGGERED".to_string()),
                executed_price: Some(dec!(120)),
                ..Default::default()
            })
            .unwrap(),
        );
        let store = Arc::new(MemoryStore::with_trades([trade.clone()]));
        let processor = processor(store.clone(), true);

        assert!(processor.process_tick(&tick("BTCUSDT", dec!(150))).await.unwrap().is_empty());
    }
}
