//! Daemon: main runtime orchestrator.
//!
//! Owns the event bus receiver and feeds market ticks and confirmations to
//! the tick processor one at a time, in the order they were published.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use tradebook_engine::{summarize, JournalSummary};
use tradebook_store::TradeRepository;

use crate::config::Config;
use crate::error::DaemonResult;
use crate::event_bus::{DaemonEvent, EventBus, EventReceiver};
use crate::tick_processor::TickProcessor;

/// Main daemon runtime.
pub struct Daemon<S: TradeRepository + 'static> {
    config: Config,
    store: Arc<S>,
    processor: TickProcessor<S>,
    receiver: EventReceiver,
    shutdown_token: CancellationToken,
}

impl<S: TradeRepository + 'static> Daemon<S> {
    /// Create a new daemon.
    ///
    /// Subscribes to the bus immediately, so ticks sent after `new` returns
    /// are never missed by `run`.
    pub fn new(config: Config, store: Arc<S>, event_bus: Arc<EventBus>) -> Self {
        let processor = TickProcessor::new(store.clone(), event_bus.clone(), config.targeting);
        let receiver = event_bus.subscribe();

        Self {
            config,
            store,
            processor,
            receiver,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Token that stops `run` when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Run until shutdown is requested or the bus closes.
    ///
    /// Returns the journal summary at shutdown.
    pub async fn run(mut self) -> DaemonResult<JournalSummary> {
        info!(environment = %self.config.environment, "Daemon started");

        loop {
            let next = tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                next = self.receiver.recv() => next,
            };

            match next {
                Some(Ok(DaemonEvent::MarketTick(tick))) => {
                    if let Err(e) = self.processor.process_tick(&tick).await {
                        error!(symbol = %tick.symbol, error = %e, "Tick processing failed");
                    }
                },
                Some(Ok(DaemonEvent::ConfirmBreakEven { trade_id, stop_target_id })) => {
                    match self.processor.confirm_break_even(trade_id, stop_target_id).await {
                        Ok(Some(event)) => info!(?event, "Break-even confirmed"),
                        Ok(None) => info!(%trade_id, "Nothing to move"),
                        Err(e) => warn!(%trade_id, error = %e, "Confirmation failed"),
                    }
                },
                Some(Ok(DaemonEvent::Shutdown)) | None => break,
                Some(Ok(other)) => debug!(event = ?other, "Ignoring event"),
                Some(Err(lag)) => warn!(missed = lag.0, "Event bus receiver lagged"),
            }
        }

        let trades = self.store.get_all().await?;
        let summary = summarize(&trades, &self.config.outcome);
        info!(%summary, "Daemon stopped");

        Ok(summary)
    }
}
