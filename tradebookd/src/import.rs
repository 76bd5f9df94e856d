//! Trade import from JSON.
//!
//! Accepts an array of trade records (the same shape forms submit) and
//! validates every entry before anything is stored.

use std::path::Path;

use tracing::info;
use tradebook_domain::{Trade, TradeInput};
use tradebook_store::TradeRepository;

use crate::error::{DaemonError, DaemonResult};

/// Parse and validate a JSON array of trade records.
pub fn parse_trades(json: &str) -> DaemonResult<Vec<Trade>> {
    let inputs: Vec<TradeInput> = serde_json::from_str(json)
        .map_err(|e| DaemonError::Input(format!("Malformed trade import: {}", e)))?;

    inputs
        .into_iter()
        .map(|input| Trade::new(input).map_err(DaemonError::from))
        .collect()
}

/// Load a trade import file and save every trade into `store`.
///
/// Returns the number of imported trades.
pub async fn import_trades<S: TradeRepository>(store: &S, path: &Path) -> DaemonResult<usize> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DaemonError::Input(format!("Cannot read {}: {}", path.display(), e)))?;

    let trades = parse_trades(&json)?;
    for trade in &trades {
        store.save(trade).await?;
    }

    info!(count = trades.len(), path = %path.display(), "Trades imported");
    Ok(trades.len())
}
