//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the domain.
//! Implementations can be local storage, in-memory, remote sync, or mocks.

use crate::error::StoreError;
use async_trait::async_trait;
use tradebook_domain::{Symbol, Trade, TradeId};

/// Repository for Trade aggregates
#[async_trait]
pub trait TradeRepository: Send + Sync {
    /// Save a trade (insert or update)
    async fn save(&self, trade: &Trade) -> Result<(), StoreError>;

    /// Load every trade, oldest first
    async fn get_all(&self) -> Result<Vec<Trade>, StoreError>;

    /// Find a trade by ID
    async fn find_by_id(&self, id: TradeId) -> Result<Option<Trade>, StoreError>;

    /// Find all trades for a symbol, oldest first
    async fn find_by_symbol(&self, symbol: &Symbol) -> Result<Vec<Trade>, StoreError> {
        let trades = self.get_all().await?;
        Ok(trades.into_iter().filter(|t| &t.symbol == symbol).collect())
    }
}
