//! Tradebook Daemon
//!
//! Reads market ticks and confirmations from stdin, moves stops to
//! break-even, and prints the journal summary at end of input.
//!
//! # Usage
//!
//! ```bash
//! # Replay ticks against an imported journal
//! TRADEBOOK_TRADES_FILE=trades.json cargo run -p tradebookd < ticks.txt
//!
//! # Move stops without waiting for confirmation
//! TRADEBOOK_AUTO_BREAK_EVEN=true cargo run -p tradebookd
//! ```
//!
//! # Environment Variables
//!
//! - `TRADEBOOK_ENV`: Environment (test, development, production)
//! - `TRADEBOOK_TRADES_FILE`: JSON trade import (default: none)
//! - `TRADEBOOK_BE_MULTIPLIER`: Break-even risk multiple (default: 2)
//! - `TRADEBOOK_BE_EPSILON`: Break-even threshold tolerance (default: 0.00000001)
//! - `TRADEBOOK_OUTCOME_EPSILON`: P/L band for BREAKEVEN (default: 0.0001)
//! - `TRADEBOOK_TREAT_BE_AS_WIN`: Open break-even trades count as WIN (default: true)
//! - `TRADEBOOK_AUTO_BREAK_EVEN`: Skip confirmation (default: false)

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tradebook_store::MemoryStore;
use tradebookd::{import_trades, parse_command, Command, Config, Daemon, DaemonEvent, EventBus};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("tradebookd=info".parse()?))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        auto_confirm = config.targeting.auto_confirm,
        "Tradebook Daemon"
    );

    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &config.trades_file {
        import_trades(store.as_ref(), path).await?;
    }

    let event_bus = Arc::new(EventBus::default());
    let daemon = Daemon::new(config, store, event_bus.clone());
    let shutdown = daemon.shutdown_token();
    let handle = tokio::spawn(daemon.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        match parse_command(&line) {
            Ok(Some(Command::Tick(tick))) => {
                event_bus.send(DaemonEvent::MarketTick(tick));
            },
            Ok(Some(Command::Confirm { trade_id, stop_target_id })) => {
                event_bus.send(DaemonEvent::ConfirmBreakEven { trade_id, stop_target_id });
            },
            Ok(None) => {},
            Err(e) => warn!(error = %e, "Skipping input line"),
        }
    }

    // Queued ticks and confirmations are drained before the Shutdown event is seen
    if event_bus.send(DaemonEvent::Shutdown) == 0 {
        shutdown.cancel();
    }
    let summary = handle.await??;
    println!("{}", summary);

    Ok(())
}
