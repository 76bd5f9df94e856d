//! Tradebook Daemon Library
//!
//! Runtime orchestrator that applies the break-even rule to journaled trades
//! as market prices arrive.
//!
//! # Architecture
//!
//! ```text
//! stdin / feed → EventBus (MarketTick) → Daemon → TickProcessor → Engine
//!                                                      ↓
//!                                              TradeRepository
//! ```
//!
//! # Components
//!
//! - **Daemon**: Main run loop, sequential tick processing
//! - **Tick Processor**: Assess, confirm and apply break-even moves
//! - **Event Bus**: Internal communication (ticks, candidates, domain events)
//! - **Import**: JSON trade import at startup
//! - **Config**: Environment-based configuration

#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod daemon;
pub mod error;
pub mod event_bus;
pub mod import;
pub mod tick_processor;

// Re-exports for convenience
pub use command::{parse_command, Command};
pub use config::{Config, Environment, TargetingConfig};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use event_bus::{DaemonEvent, EventBus, EventReceiver, Lagged, MarketTick};
pub use import::{import_trades, parse_trades};
pub use tick_processor::TickProcessor;
