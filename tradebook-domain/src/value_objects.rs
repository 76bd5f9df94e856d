//! Value Objects for the Tradebook Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain errors for value object and target validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Target kind is not one of the allowed kinds
    #[error("Invalid target kind: {0}")]
    KindInvalid(String),

    /// Price must be positive
    #[error("Invalid price: {0}")]
    PriceInvalid(String),

    /// Take-profit rank must be an integer >= 1
    #[error("Invalid rank: {0}")]
    RankInvalid(String),

    /// Target size must be positive
    #[error("Invalid size: {0}")]
    SizeInvalid(String),

    /// Target status is not one of the allowed statuses
    #[error("Invalid target status: {0}")]
    StatusInvalid(String),

    /// Trade quantity must be positive
    #[error("Invalid quantity: {0}")]
    QuantityInvalid(String),

    /// Symbol must be a non-empty ticker
    #[error("Invalid symbol: {0}")]
    SymbolInvalid(String),

    /// Side must be LONG or SHORT
    #[error("Invalid side: {0}")]
    SideInvalid(String),
}

// =============================================================================
// Price
// =============================================================================

/// Price represents a positive decimal price
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a new Price with validation
    ///
    /// # Errors
    /// Returns `DomainError::PriceInvalid` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::PriceInvalid(format!("Price must be positive, got {}", value)));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Quantity represents a positive position or target size
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a new Quantity with validation
    ///
    /// # Errors
    /// Returns `DomainError::QuantityInvalid` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::QuantityInvalid(format!(
                "Quantity must be positive, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Symbol
// =============================================================================

/// Symbol is a normalized instrument ticker (e.g., `BTCUSDT`, `AAPL`, `EUR/USD`)
///
/// # Invariants
/// - Trimmed and upper-cased
/// - Non-empty, at most 32 characters
/// - ASCII alphanumerics plus `/`, `-`, `.` and `_`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Symbol(String);

impl Symbol {
    const MAX_LEN: usize = 32;

    /// Create a Symbol, normalizing case and surrounding whitespace
    ///
    /// # Examples
    /// ```
    /// # use tradebook_domain::value_objects::Symbol;
    /// let symbol = Symbol::new(" btcusdt ").unwrap();
    /// assert_eq!(symbol.as_str(), "BTCUSDT");
    /// assert!(Symbol::new("   ").is_err());
    /// ```
    ///
    /// # Errors
    /// Returns `DomainError::SymbolInvalid` if the normalized ticker is empty,
    /// too long, or contains unsupported characters
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(DomainError::SymbolInvalid("Symbol must be non-empty".to_string()));
        }

        if normalized.len() > Self::MAX_LEN {
            return Err(DomainError::SymbolInvalid(format!(
                "Symbol exceeds {} characters: {}",
                Self::MAX_LEN,
                normalized
            )));
        }

        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '.' | '_');
        if !normalized.chars().all(allowed) {
            return Err(DomainError::SymbolInvalid(format!(
                "Unsupported characters in symbol: {}",
                normalized
            )));
        }

        Ok(Self(normalized))
    }

    /// Get the ticker as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = DomainError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Side
// =============================================================================

/// Side represents the trade direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Long position (buy low, sell high)
    #[default]
    Long,
    /// Short position (sell high, buy low)
    Short,
}

impl Side {
    /// Signed P/L of closing `size` at `exit` for a trade entered at `entry`
    ///
    /// Long → (exit − entry) × size, Short → (entry − exit) × size
    pub fn pnl(&self, entry: Decimal, exit: Decimal, size: Decimal) -> Decimal {
        match self {
            Side::Long => (exit - entry) * size,
            Side::Short => (entry - exit) * size,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

impl FromStr for Side {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(Side::Long),
            "SHORT" => Ok(Side::Short),
            other => Err(DomainError::SideInvalid(format!(
                "Expected LONG or SHORT, got {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
