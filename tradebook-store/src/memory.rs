//! In-memory store implementation
//!
//! Used for testing and for running the daemon without a backend.
//! Thread-safe using an async RwLock for concurrent access.

use crate::error::StoreError;
use crate::repository::TradeRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use tradebook_domain::{Trade, TradeId};

/// In-memory trade store
pub struct MemoryStore {
    trades: RwLock<HashMap<TradeId, Trade>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            trades: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-loaded with trades
    pub fn with_trades(trades: impl IntoIterator<Item = Trade>) -> Self {
        Self {
            trades: RwLock::new(trades.into_iter().map(|t| (t.id, t)).collect()),
        }
    }

    /// Get the number of trades
    pub async fn trade_count(&self) -> usize {
        self.trades.read().await.len()
    }

    /// Clear all data (useful for test setup)
    pub async fn clear(&self) {
        self.trades.write().await.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeRepository for MemoryStore {
    async fn save(&self, trade: &Trade) -> Result<(), StoreError> {
        let mut trades = self.trades.write().await;
        trades.insert(trade.id, trade.clone());
        debug!(trade_id = %trade.id, symbol = %trade.symbol, "Trade saved");
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Trade>, StoreError> {
        let trades = self.trades.read().await;
        let mut all: Vec<Trade> = trades.values().cloned().collect();
        // UUID v7 ids break ties between trades opened at the same instant
        all.sort_by(|a, b| a.opened_at.cmp(&b.opened_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn find_by_id(&self, id: TradeId) -> Result<Option<Trade>, StoreError> {
        let trades = self.trades.read().await;
        Ok(trades.get(&id).cloned())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use tradebook_domain::{Symbol, TradeInput};
    use uuid::Uuid;

    fn trade(symbol: &str, minutes_ago: i64) -> Trade {
        Trade::new(TradeInput {
            symbol: symbol.to_string(),
            price: dec!(100),
            size: dec!(1),
            opened_at: Some(Utc::now() - Duration::minutes(minutes_ago)),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = MemoryStore::new();
        let trade = trade("BTCUSDT", 0);

        store.save(&trade).await.unwrap();

        assert_eq!(store.trade_count().await, 1);
        assert_eq!(store.find_by_id(trade.id).await.unwrap(), Some(trade));
        assert_eq!(store.find_by_id(Uuid::now_v7()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_existing() {
        let store = MemoryStore::new();
        let mut trade = trade("BTCUSDT", 0);
        store.save(&trade).await.unwrap();

        trade.note = Some("moved stop".to_string());
        store.save(&trade).await.unwrap();

        assert_eq!(store.trade_count().await, 1);
        let stored = store.find_by_id(trade.id).await.unwrap().unwrap();
        assert_eq!(stored.note.as_deref(), Some("moved stop"));
    }

    #[tokio::test]
    async fn test_get_all_is_oldest_first() {
        let newest = trade("ETHUSDT", 1);
        let oldest = trade("BTCUSDT", 30);
        let middle = trade("BTCUSDT", 10);
        let store = MemoryStore::with_trades([newest.clone(), oldest.clone(), middle.clone()]);

        let ids: Vec<_> = store.get_all().await.unwrap().into_iter().map(|t| t.id).collect();

        assert_eq!(ids, vec![oldest.id, middle.id, newest.id]);
    }

    #[tokio::test]
    async fn test_find_by_symbol() -> anyhow::Result<()> {
        let store = MemoryStore::with_trades([trade("BTCUSDT", 2), trade("ETHUSDT", 1)]);

        let btc = store.find_by_symbol(&Symbol::new("btcusdt")?).await?;
        assert_eq!(btc.len(), 1);
        assert_eq!(btc[0].symbol.as_str(), "BTCUSDT");

        store.clear().await;
        assert!(store.get_all().await?.is_empty());
        Ok(())
    }
}
