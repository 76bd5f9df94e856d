//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tradebook_engine::{ComputeOptions, TargetingPolicy};

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Break-even targeting configuration
    pub targeting: TargetingConfig,

    /// Outcome reporting options
    pub outcome: ComputeOptions,

    /// Optional JSON file of trades imported at startup
    pub trades_file: Option<PathBuf>,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// Break-even targeting configuration.
#[derive(Debug, Clone, Copy)]
pub struct TargetingConfig {
    /// Policy passed to the engine on every assessment
    pub policy: TargetingPolicy,
    /// Move stops as soon as a candidate is found instead of waiting for confirmation
    pub auto_confirm: bool,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let targeting = Self::load_targeting_config()?;
        let outcome = Self::load_outcome_options()?;
        let trades_file = env::var("TRADEBOOK_TRADES_FILE").ok().map(PathBuf::from);

        Ok(Self {
            targeting,
            outcome,
            trades_file,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            targeting: TargetingConfig {
                policy: TargetingPolicy::default(),
                auto_confirm: true,
            },
            outcome: ComputeOptions::default(),
            trades_file: None,
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("TRADEBOOK_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid TRADEBOOK_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_targeting_config() -> DaemonResult<TargetingConfig> {
        let multiplier =
            Self::load_decimal_env("TRADEBOOK_BE_MULTIPLIER", TargetingPolicy::DEFAULT_MULTIPLIER)?;
        if multiplier <= Decimal::ZERO {
            return Err(DaemonError::Config(format!(
                "TRADEBOOK_BE_MULTIPLIER must be positive, got {}",
                multiplier
            )));
        }

        let epsilon =
            Self::load_decimal_env("TRADEBOOK_BE_EPSILON", TargetingPolicy::DEFAULT_EPSILON)?;
        let auto_confirm = Self::load_bool_env("TRADEBOOK_AUTO_BREAK_EVEN", false)?;

        Ok(TargetingConfig {
            policy: TargetingPolicy {
                move_stop_to_break_even_multiplier: multiplier,
                break_even_epsilon: epsilon,
            },
            auto_confirm,
        })
    }

    fn load_outcome_options() -> DaemonResult<ComputeOptions> {
        let epsilon =
            Self::load_decimal_env("TRADEBOOK_OUTCOME_EPSILON", ComputeOptions::DEFAULT_EPSILON)?;
        let treat_break_even_as_win = Self::load_bool_env("TRADEBOOK_TREAT_BE_AS_WIN", true)?;

        Ok(ComputeOptions {
            epsilon,
            treat_break_even_as_win,
        })
    }

    fn load_decimal_env(key: &str, default: Decimal) -> DaemonResult<Decimal> {
        match env::var(key) {
            Ok(val) => parse_decimal(key, &val),
            Err(_) => Ok(default),
        }
    }

    fn load_bool_env(key: &str, default: bool) -> DaemonResult<bool> {
        match env::var(key) {
            Ok(val) => parse_bool(key, &val),
            Err(_) => Ok(default),
        }
    }
}

fn parse_decimal(key: &str, val: &str) -> DaemonResult<Decimal> {
    let parsed = Decimal::from_str(val.trim())
        .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val)))?;
    if parsed.is_sign_negative() {
        return Err(DaemonError::Config(format!("{} must not be negative: {}", key, val)));
    }
    Ok(parsed)
}

fn parse_bool(key: &str, val: &str) -> DaemonResult<bool> {
    match val.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DaemonError::Config(format!("Invalid {} value: {}", key, val))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targeting: TargetingConfig {
                policy: TargetingPolicy::default(),
                auto_confirm: false,
            },
            outcome: ComputeOptions::default(),
            trades_file: None,
            environment: Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
