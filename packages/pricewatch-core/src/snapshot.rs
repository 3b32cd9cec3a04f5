//! Persisted and presented views of an engine.

use crate::paper_trade::{SimulationState, SimulationStatus};
use crate::types::{PricePoint, Signal};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Persisted EMA values. RSI is recomputed from the history on restore.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct IndicatorSnapshot {
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
}

/// Serializable engine state.
///
/// Signal history is deliberately absent: restoring re-seeds prices,
/// indicators and the simulator without replaying transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSnapshot {
    /// Oldest first
    pub price_history: Vec<PricePoint>,
    pub simulation: SimulationState,
    pub indicator_state: IndicatorSnapshot,
    #[serde(default)]
    pub simulation_enabled: bool,
}

impl EngineSnapshot {
    /// Reject snapshots that would corrupt an engine.
    pub fn validate(&self) -> Result<()> {
        if let Some(point) = self.price_history.iter().find(|p| !p.value.is_finite()) {
            return Err(Error::InvalidSnapshot(format!(
                "non-finite price at {}",
                point.timestamp
            )));
        }

        let sim = &self.simulation;
        if !sim.balance.is_finite() || sim.balance < 0.0 {
            return Err(Error::InvalidSnapshot(format!(
                "invalid balance {}",
                sim.balance
            )));
        }
        if !sim.holdings.is_finite() || sim.holdings < 0.0 {
            return Err(Error::InvalidSnapshot(format!(
                "invalid holdings {}",
                sim.holdings
            )));
        }
        // All-in/all-out: cash and a position never coexist
        if sim.balance > 0.0 && sim.holdings > 0.0 {
            return Err(Error::InvalidSnapshot(format!(
                "balance {} and holdings {} both non-zero",
                sim.balance, sim.holdings
            )));
        }
        if sim.portfolio_history.iter().any(|p| !p.value.is_finite()) {
            return Err(Error::InvalidSnapshot(
                "non-finite portfolio valuation".to_string(),
            ));
        }

        let ema = &self.indicator_state;
        for (name, value) in [("ema_short", ema.ema_short), ("ema_long", ema.ema_long)] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(Error::InvalidSnapshot(format!("non-finite {name}")));
            }
        }

        Ok(())
    }
}

/// Read-only state handed to renderers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineView {
    pub price: Option<f64>,
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
    pub rsi: Option<f64>,
    pub signal: Signal,
    pub history_size: usize,
    /// Change from the oldest retained price to the current one
    pub change_percent: Option<f64>,
    /// Timestamp of the latest accepted price
    pub updated_at: Option<i64>,
    /// Present only while simulated trading is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationStatus>,
}
