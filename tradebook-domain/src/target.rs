//! Exit Targets
//!
//! A `Target` is one exit order attached to a trade: a take-profit, a
//! stop-loss, a stop already moved to break-even, or anything else the user
//! wants to track. Targets arrive as loosely-typed `TargetInput` records
//! (forms, imports) and are validated into `Target` once.
//!
//! # Lifecycle
//!
//! ```text
//! OPEN ──mark_triggered──> TRIGGERED
//!   │
//!   └───mark_canceled───> CANCELED
//! ```
//!
//! A STOP_LOSS moved to break-even keeps its status and becomes a BREAK_EVEN
//! target at the entry price (see `Target::moved_to_break_even`).

use crate::value_objects::{DomainError, Price, Quantity};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier assigned to a target by the caller or the store
pub type TargetId = String;

// =============================================================================
// Target Kind / Status
// =============================================================================

/// What an exit target does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    /// Profit-taking exit
    TakeProfit,
    /// Protective stop below (long) or above (short) entry
    StopLoss,
    /// Stop placed at the entry price
    BreakEven,
    /// Any other exit the user tracks
    Other,
}

impl TargetKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::TakeProfit => "TAKE_PROFIT",
            TargetKind::StopLoss => "STOP_LOSS",
            TargetKind::BreakEven => "BREAK_EVEN",
            TargetKind::Other => "OTHER",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TAKE_PROFIT" => Ok(TargetKind::TakeProfit),
            "STOP_LOSS" => Ok(TargetKind::StopLoss),
            "BREAK_EVEN" => Ok(TargetKind::BreakEven),
            "OTHER" => Ok(TargetKind::Other),
            other => Err(DomainError::KindInvalid(other.to_string())),
        }
    }
}

/// Execution state of a target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetStatus {
    /// Waiting to be hit
    #[default]
    Open,
    /// Filled (terminal)
    Triggered,
    /// Withdrawn (terminal)
    Canceled,
}

impl TargetStatus {
    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Open => "OPEN",
            TargetStatus::Triggered => "TRIGGERED",
            TargetStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(TargetStatus::Open),
            "TRIGGERED" => Ok(TargetStatus::Triggered),
            "CANCELED" => Ok(TargetStatus::Canceled),
            other => Err(DomainError::StatusInvalid(other.to_string())),
        }
    }
}

// =============================================================================
// TargetInput (primitive shape)
// =============================================================================

/// Unvalidated target record, as submitted by a form or an import
///
/// `Target::new` validates it; `Target::to_primitive` reproduces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TargetId>,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<Decimal>,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// =============================================================================
// Target
// =============================================================================

/// Validated exit target
///
/// # Invariants
/// - `price` > 0
/// - `size`, when present, > 0
/// - `rank`, when present, >= 1
/// - `executed_price` / `executed_at` are only set through triggering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TargetInput", into = "TargetInput")]
pub struct Target {
    id: Option<TargetId>,
    kind: TargetKind,
    rank: Option<u32>,
    price: Price,
    size: Option<Quantity>,
    status: TargetStatus,
    executed_price: Option<Price>,
    executed_at: Option<DateTime<Utc>>,
    note: Option<String>,
}

impl Target {
    /// Validate a primitive target record
    ///
    /// # Examples
    /// ```
    /// # use tradebook_domain::target::{Target, TargetInput, TargetKind, TargetStatus};
    /// # use rust_decimal_macros::dec;
    /// let target = Target::new(TargetInput {
    ///     id: Some("tp1".to_string()),
    ///     kind: "TAKE_PROFIT".to_string(),
    ///     rank: Some(dec!(1)),
    ///     price: dec!(120),
    ///     ..Default::default()
    /// })
    /// .unwrap();
    ///
    /// assert_eq!(target.kind(), TargetKind::TakeProfit);
    /// assert_eq!(target.status(), TargetStatus::Open);
    /// ```
    ///
    /// # Errors
    /// - `KindInvalid` if `kind` is not TAKE_PROFIT, STOP_LOSS, BREAK_EVEN or OTHER
    /// - `PriceInvalid` if `price` (or a supplied `executed_price`) is <= 0
    /// - `RankInvalid` if a TAKE_PROFIT carries a non-integer or < 1 rank
    /// - `SizeInvalid` if a supplied `size` is <= 0
    /// - `StatusInvalid` if a supplied `status` is unknown
    pub fn new(input: TargetInput) -> Result<Self, DomainError> {
        let kind: TargetKind = input.kind.parse()?;
        let price = Price::new(input.price)?;

        let rank = match input.rank {
            None => None,
            Some(raw) => match (parse_rank(raw), kind) {
                (Some(rank), _) => Some(rank),
                (None, TargetKind::TakeProfit) => {
                    return Err(DomainError::RankInvalid(format!(
                        "Take-profit rank must be an integer >= 1, got {}",
                        raw
                    )))
                },
                // Rank carries no meaning outside take-profits
                (None, _) => None,
            },
        };

        let size = input
            .size
            .map(|raw| {
                Quantity::new(raw).map_err(|_| {
                    DomainError::SizeInvalid(format!("Target size must be positive, got {}", raw))
                })
            })
            .transpose()?;

        let status = match input.status.as_deref() {
            Some(raw) => raw.parse()?,
            None => TargetStatus::Open,
        };

        let executed_price = input.executed_price.map(Price::new).transpose()?;

        Ok(Self {
            id: input.id,
            kind,
            rank,
            price,
            size,
            status,
            executed_price,
            executed_at: input.executed_at,
            note: input.note,
        })
    }

    /// Convert back to the primitive record shape
    pub fn to_primitive(&self) -> TargetInput {
        TargetInput {
            id: self.id.clone(),
            kind: self.kind.as_str().to_string(),
            rank: self.rank.map(Decimal::from),
            price: self.price.as_decimal(),
            size: self.size.map(|s| s.as_decimal()),
            status: Some(self.status.as_str().to_string()),
            executed_price: self.executed_price.map(|p| p.as_decimal()),
            executed_at: self.executed_at,
            note: self.note.clone(),
        }
    }

    /// Mark the target as filled
    ///
    /// Execution details are only overwritten when supplied. Size is not
    /// checked against the trade here; that is the caller's concern.
    pub fn mark_triggered(
        &mut self,
        executed_price: Option<Price>,
        executed_at: Option<DateTime<Utc>>,
    ) {
        self.status = TargetStatus::Triggered;
        if let Some(price) = executed_price {
            self.executed_price = Some(price);
        }
        if let Some(at) = executed_at {
            self.executed_at = Some(at);
        }
    }

    /// Mark the target as canceled
    pub fn mark_canceled(&mut self) {
        self.status = TargetStatus::Canceled;
    }

    /// Copy of this target converted to a break-even stop at `entry`
    ///
    /// Everything but kind and price is preserved.
    pub fn moved_to_break_even(&self, entry: Price) -> Self {
        Self {
            kind: TargetKind::BreakEven,
            price: entry,
            ..self.clone()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn size(&self) -> Option<Quantity> {
        self.size
    }

    pub fn status(&self) -> TargetStatus {
        self.status
    }

    pub fn executed_price(&self) -> Option<Price> {
        self.executed_price
    }

    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        self.executed_at
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Check if the target has been filled
    pub fn is_triggered(&self) -> bool {
        self.status == TargetStatus::Triggered
    }
}

impl TryFrom<TargetInput> for Target {
    type Error = DomainError;

    fn try_from(input: TargetInput) -> Result<Self, Self::Error> {
        Target::new(input)
    }
}

impl From<Target> for TargetInput {
    fn from(target: Target) -> Self {
        target.to_primitive()
    }
}

fn parse_rank(raw: Decimal) -> Option<u32> {
    if raw < Decimal::ONE || !raw.fract().is_zero() {
        return None;
    }
    raw.to_u32()
}

// =============================================================================
// Tests
// =============================================================================
