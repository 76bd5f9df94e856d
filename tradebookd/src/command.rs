//! Line commands read by the daemon binary.
//!
//! ```text
//! BTCUSDT 120.5              market tick
//! confirm <trade-id> [sl1]   confirm a break-even candidate
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;
use tradebook_domain::{Price, Symbol, TargetId, TradeId};

use crate::error::{DaemonError, DaemonResult};
use crate::event_bus::MarketTick;

/// A parsed input line.
#[derive(Debug, Clone)]
pub enum Command {
    /// Market price for a symbol
    Tick(MarketTick),
    /// Confirm the break-even move of a trade
    Confirm {
        trade_id: TradeId,
        stop_target_id: Option<TargetId>,
    },
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> DaemonResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["confirm", trade_id, rest @ ..] if rest.len() <= 1 => {
            let trade_id = TradeId::from_str(trade_id)
                .map_err(|_| DaemonError::Input(format!("Invalid trade id: {}", trade_id)))?;
            Ok(Some(Command::Confirm {
                trade_id,
                stop_target_id: rest.first().map(|s| s.to_string()),
            }))
        },
        [symbol, price] => {
            let price = Decimal::from_str(price)
                .map_err(|_| DaemonError::Input(format!("Invalid price: {}", price)))?;
            Ok(Some(Command::Tick(MarketTick::now(Symbol::new(symbol)?, Price::new(price)?))))
        },
        _ => Err(DaemonError::Input(format!("Unrecognized line: {}", line))),
    }
}
