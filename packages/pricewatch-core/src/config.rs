//! Engine configuration.
//!
//! Every field carries a serde default so partial TOML files load cleanly.
//! Call [`EngineConfig::validate`] (done by [`crate::SignalEngine::new`]) before use.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// How EMA(short) and EMA(long) are turned into a base signal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalPolicy {
    /// BUY/SELL only on the sample where the EMAs change relative order.
    #[default]
    EdgeTriggeredCrossover,
    /// BUY whenever short > long, SELL whenever short < long.
    LevelComparison,
}

/// When an EMA receives its first value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmaSeed {
    /// Seed from the average of whatever is available (at least one point).
    #[default]
    FirstSample,
    /// Stay unset until `period` points exist, then seed from their average.
    FullWindow,
}

fn default_ema_short_period() -> usize {
    12
}

fn default_ema_long_period() -> usize {
    26
}

fn default_rsi_period() -> usize {
    14
}

fn default_max_history() -> usize {
    1200
}

fn default_sim_start_balance() -> f64 {
    10_000.0
}

fn default_rsi_buy_threshold() -> f64 {
    25.0
}

fn default_rsi_sell_threshold() -> f64 {
    75.0
}

/// Tunable parameters for one signal engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_ema_short_period")]
    pub ema_short_period: usize,
    #[serde(default = "default_ema_long_period")]
    pub ema_long_period: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    /// Capacity of the price and portfolio histories
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_sim_start_balance")]
    pub sim_start_balance: f64,
    #[serde(default)]
    pub simulate_trading: bool,
    /// RSI below this turns a HOLD into a BUY
    #[serde(default = "default_rsi_buy_threshold")]
    pub rsi_buy_threshold: f64,
    /// RSI above this turns a HOLD into a SELL
    #[serde(default = "default_rsi_sell_threshold")]
    pub rsi_sell_threshold: f64,
    #[serde(default)]
    pub signal_policy: SignalPolicy,
    #[serde(default)]
    pub ema_seed: EmaSeed,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ema_short_period: default_ema_short_period(),
            ema_long_period: default_ema_long_period(),
            rsi_period: default_rsi_period(),
            max_history: default_max_history(),
            sim_start_balance: default_sim_start_balance(),
            simulate_trading: false,
            rsi_buy_threshold: default_rsi_buy_threshold(),
            rsi_sell_threshold: default_rsi_sell_threshold(),
            signal_policy: SignalPolicy::default(),
            ema_seed: EmaSeed::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults with the stricter 20/80 RSI thresholds.
    pub fn strict() -> Self {
        Self {
            rsi_buy_threshold: 20.0,
            rsi_sell_threshold: 80.0,
            ..Self::default()
        }
    }

    /// Defaults with a 500-point history.
    pub fn compact() -> Self {
        Self {
            max_history: 500,
            ..Self::default()
        }
    }

    /// Reject configurations that would produce a degenerate signal machine.
    pub fn validate(&self) -> Result<()> {
        if self.ema_short_period < 2 {
            return Err(Error::InvalidConfig(format!(
                "ema_short_period must be >= 2, got {}",
                self.ema_short_period
            )));
        }
        if self.ema_long_period <= self.ema_short_period {
            return Err(Error::InvalidConfig(format!(
                "ema_long_period ({}) must be greater than ema_short_period ({})",
                self.ema_long_period, self.ema_short_period
            )));
        }
        if self.rsi_period < 2 {
            return Err(Error::InvalidConfig(format!(
                "rsi_period must be >= 2, got {}",
                self.rsi_period
            )));
        }
        if self.max_history < self.rsi_period + 1 {
            return Err(Error::InvalidConfig(format!(
                "max_history ({}) must be at least rsi_period + 1 ({})",
                self.max_history,
                self.rsi_period + 1
            )));
        }
        if !self.sim_start_balance.is_finite() || self.sim_start_balance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sim_start_balance must be a finite non-negative amount, got {}",
                self.sim_start_balance
            )));
        }
        for (name, value) in [
            ("rsi_buy_threshold", self.rsi_buy_threshold),
            ("rsi_sell_threshold", self.rsi_sell_threshold),
        ] {
            if !(value > 0.0 && value < 100.0) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be within (0, 100), got {value}"
                )));
            }
        }
        if self.rsi_buy_threshold >= self.rsi_sell_threshold {
            return Err(Error::InvalidConfig(format!(
                "rsi_buy_threshold ({}) must be below rsi_sell_threshold ({})",
                self.rsi_buy_threshold, self.rsi_sell_threshold
            )));
        }
        Ok(())
    }

    /// Get the default config file path.
    ///
    /// Default path: `~/.pricewatch/config.toml`
    /// Can be overridden with the `PRICEWATCH_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PRICEWATCH_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".pricewatch/config.toml"))
            .unwrap_or_else(|| PathBuf::from("pricewatch.toml"))
    }

    /// Load and validate config from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load and validate config from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
