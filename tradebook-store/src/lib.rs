//! Tradebook Storage Layer
//!
//! Provides persistence for trades.
//!
//! # Architecture
//!
//! - **Repository trait**: Defines the storage interface (port)
//! - **In-memory store**: Fast implementation for testing and local runs
//!
//! # Usage
//!
//! ```rust
//! use tradebook_store::{MemoryStore, TradeRepository};
//! use tradebook_domain::{Trade, TradeInput};
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!
//!     let trade = Trade::new(TradeInput {
//!         symbol: "BTCUSDT".to_string(),
//!         price: dec!(95000),
//!         size: dec!(0.1),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!     store.save(&trade).await.unwrap();
//!
//!     let all = store.get_all().await.unwrap();
//!     println!("Journaled trades: {}", all.len());
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
mod repository;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
pub use repository::TradeRepository;
