//! Per-entity signal engine.
//!
//! Wires the rolling history, indicators, signal decider and paper trading
//! simulator into the single entry point a price source talks to.

use crate::config::EngineConfig;
use crate::indicators::{IndicatorEngine, IndicatorState};
use crate::paper_trade::PaperTradingSimulator;
use crate::series::RollingSeries;
use crate::signal::SignalDecider;
use crate::snapshot::{EngineSnapshot, EngineView, IndicatorSnapshot};
use crate::types::Signal;
use crate::Result;
use tracing::{debug, trace};

/// All state owned by one tracked entity.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: EngineConfig,
    series: RollingSeries,
    indicators: IndicatorEngine,
    decider: SignalDecider,
    simulator: PaperTradingSimulator,
    simulation_enabled: bool,
}

impl SignalEngine {
    /// Create a fresh engine. Fails if the configuration is inconsistent.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            series: RollingSeries::new(config.max_history),
            indicators: IndicatorEngine::from_config(&config),
            decider: SignalDecider::from_config(&config),
            simulator: PaperTradingSimulator::new(config.sim_start_balance, config.max_history),
            simulation_enabled: config.simulate_trading,
            config,
        })
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// The decider is primed with the restored EMAs so the next price can be
    /// compared against them; the signal itself starts again at WARMUP.
    pub fn restore(config: EngineConfig, snapshot: EngineSnapshot) -> Result<Self> {
        config.validate()?;
        snapshot.validate()?;

        let series = RollingSeries::from_points(config.max_history, snapshot.price_history);
        let ema = snapshot.indicator_state;

        let mut indicators = IndicatorEngine::from_config(&config);
        indicators.restore(ema.ema_short, ema.ema_long, &series);

        let mut decider = SignalDecider::from_config(&config);
        decider.prime(ema.ema_short, ema.ema_long);

        let simulator = PaperTradingSimulator::from_state(
            snapshot.simulation,
            config.sim_start_balance,
            config.max_history,
        );

        debug!(history = series.len(), "engine restored");

        Ok(Self {
            series,
            indicators,
            decider,
            simulator,
            simulation_enabled: snapshot.simulation_enabled,
            config,
        })
    }

    /// Feed one price sample observed at `timestamp` (epoch milliseconds).
    ///
    /// Samples must arrive in non-decreasing timestamp order. Non-finite and
    /// non-positive prices are rejected without touching any state; the return
    /// value tells the caller whether the sample was accepted.
    pub fn submit_price(&mut self, value: f64, timestamp: i64) -> bool {
        if !value.is_finite() || value <= 0.0 {
            trace!(value, "rejected price sample");
            return false;
        }

        self.series.push_at(value, timestamp);
        let state = self.indicators.update(&self.series);
        let signal = self.decider.evaluate(state.ema_short, state.ema_long, state.rsi);

        if self.simulation_enabled {
            self.simulator.on_signal(signal, value, timestamp);
        }

        trace!(value, %signal, "price applied");
        true
    }

    /// Feed one price sample stamped with the current time.
    pub fn submit_price_now(&mut self, value: f64) -> bool {
        self.submit_price(value, crate::now_millis())
    }

    /// Clear history, indicators and signal, and return the simulator to its starting balance.
    pub fn reset(&mut self) {
        self.series.clear();
        self.indicators.reset();
        self.decider.reset();
        self.simulator.reset();
        debug!("engine reset");
    }

    /// Reset only the paper trading state; price history and indicators are kept.
    pub fn reset_simulation(&mut self) {
        self.simulator.reset();
    }

    /// Turn simulated trading on or off.
    ///
    /// Any change discards the simulation state, so re-enabling always starts
    /// from the starting balance. Setting the current value is a no-op.
    pub fn set_simulation_enabled(&mut self, enabled: bool) {
        if self.simulation_enabled == enabled {
            return;
        }
        self.simulation_enabled = enabled;
        self.simulator.reset();
        debug!(enabled, "simulation toggled");
    }

    pub fn simulation_enabled(&self) -> bool {
        self.simulation_enabled
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn series(&self) -> &RollingSeries {
        &self.series
    }

    pub fn indicators(&self) -> IndicatorState {
        self.indicators.state()
    }

    pub fn signal(&self) -> Signal {
        self.decider.last()
    }

    pub fn simulator(&self) -> &PaperTradingSimulator {
        &self.simulator
    }

    /// Capture everything needed to rebuild this engine.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            price_history: self.series.points().copied().collect(),
            simulation: self.simulator.state().clone(),
            indicator_state: IndicatorSnapshot {
                ema_short: self.indicators.ema_short(),
                ema_long: self.indicators.ema_long(),
            },
            simulation_enabled: self.simulation_enabled,
        }
    }

    /// Read-only view for rendering.
    pub fn view(&self) -> EngineView {
        let state = self.indicators.state();
        let price = self.series.last();

        let change_percent = match (self.series.first(), price) {
            (Some(first), Some(last)) if self.series.len() > 1 && first != 0.0 => {
                Some((last - first) / first * 100.0)
            }
            _ => None,
        };

        EngineView {
            price,
            ema_short: state.ema_short,
            ema_long: state.ema_long,
            rsi: state.rsi,
            signal: self.decider.last(),
            history_size: self.series.len(),
            change_percent,
            updated_at: self.series.last_point().map(|p| p.timestamp),
            simulation: self
                .simulation_enabled
                .then(|| self.simulator.status(price)),
        }
    }
}
