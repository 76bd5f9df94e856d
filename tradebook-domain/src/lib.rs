//! Tradebook Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains the trade aggregate, exit targets, value objects and events.

#![warn(clippy::all)]

// Public modules
pub mod entities;
pub mod events;
pub mod target;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{Trade, TradeId, TradeInput};
pub use events::DomainEvent;
pub use target::{Target, TargetId, TargetInput, TargetKind, TargetStatus};
pub use value_objects::{DomainError, Price, Quantity, Side, Symbol};
