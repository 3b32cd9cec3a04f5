//! Technical indicators for the signal engine.
//!
//! - **EMA**: Exponential Moving Average, short and long, updated per sample
//! - **RSI**: Relative Strength Index over a fixed window, recomputed per sample

mod ema;
mod rsi;

pub use ema::{init_ema, sma_seed, smoothing, update_ema, Ema};
pub use rsi::compute_rsi;

use crate::config::{EmaSeed, EngineConfig};
use crate::series::RollingSeries;
use serde::{Deserialize, Serialize};

/// Indicator values after the most recent sample. `None` means not yet computable.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct IndicatorState {
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
    pub rsi: Option<f64>,
}

/// Maintains EMA(short) and EMA(long) across samples and computes RSI on demand.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    ema_short: Ema,
    ema_long: Ema,
    rsi_period: usize,
    seed: EmaSeed,
    rsi: Option<f64>,
}

impl IndicatorEngine {
    pub fn new(ema_short_period: usize, ema_long_period: usize, rsi_period: usize, seed: EmaSeed) -> Self {
        Self {
            ema_short: Ema::new(ema_short_period),
            ema_long: Ema::new(ema_long_period),
            rsi_period,
            seed,
            rsi: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.ema_short_period,
            config.ema_long_period,
            config.rsi_period,
            config.ema_seed,
        )
    }

    /// Recompute indicators after a new price has been pushed onto `series`.
    ///
    /// Must be called exactly once per accepted price; each call advances both EMAs.
    pub fn update(&mut self, series: &RollingSeries) -> IndicatorState {
        // The seed window only needs the newest `long_period` points
        let needed = self.ema_long.period().max(self.rsi_period + 1);
        let values = series.tail(needed);

        self.ema_short.advance(&values, self.seed);
        self.ema_long.advance(&values, self.seed);
        self.rsi = compute_rsi(&values, self.rsi_period);

        self.state()
    }

    pub fn state(&self) -> IndicatorState {
        IndicatorState {
            ema_short: self.ema_short.value(),
            ema_long: self.ema_long.value(),
            rsi: self.rsi,
        }
    }

    pub fn ema_short(&self) -> Option<f64> {
        self.ema_short.value()
    }

    pub fn ema_long(&self) -> Option<f64> {
        self.ema_long.value()
    }

    pub fn rsi(&self) -> Option<f64> {
        self.rsi
    }

    /// Re-seed persisted EMAs and recompute RSI from the restored history.
    pub fn restore(&mut self, ema_short: Option<f64>, ema_long: Option<f64>, series: &RollingSeries) {
        self.ema_short.set(ema_short);
        self.ema_long.set(ema_long);
        self.rsi = compute_rsi(&series.tail(self.rsi_period + 1), self.rsi_period);
    }

    pub fn reset(&mut self) {
        self.ema_short.reset();
        self.ema_long.reset();
        self.rsi = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn feed(engine: &mut IndicatorEngine, series: &mut RollingSeries, prices: &[f64]) -> IndicatorState {
        let mut state = IndicatorState::default();
        for (i, &price) in prices.iter().enumerate() {
            series.push_at(price, i as i64);
            state = engine.update(series);
        }
        state
    }

    #[test]
    fn test_first_sample_seeds_both_emas() {
        let mut engine = IndicatorEngine::new(3, 5, 4, EmaSeed::FirstSample);
        let mut series = RollingSeries::new(100);

        let state = feed(&mut engine, &mut series, &[50.0]);
        assert_eq!(state.ema_short, Some(50.0));
        assert_eq!(state.ema_long, Some(50.0));
        assert!(state.rsi.is_none());
    }

    #[test]
    fn test_emas_track_incrementally() {
        let mut engine = IndicatorEngine::new(3, 5, 4, EmaSeed::FirstSample);
        let mut series = RollingSeries::new(100);
        let prices = [10.0, 12.0, 11.0, 14.0, 13.0, 15.0];

        let state = feed(&mut engine, &mut series, &prices);

        let mut short = prices[0];
        let mut long = prices[0];
        for &p in &prices[1..] {
            short = update_ema(short, p, 3);
            long = update_ema(long, p, 5);
        }
        assert_relative_eq!(state.ema_short.unwrap(), short);
        assert_relative_eq!(state.ema_long.unwrap(), long);
        assert!(state.rsi.is_some());
    }

    #[test]
    fn test_full_window_seed_staggers_emas() {
        let mut engine = IndicatorEngine::new(2, 4, 2, EmaSeed::FullWindow);
        let mut series = RollingSeries::new(100);

        let state = feed(&mut engine, &mut series, &[1.0]);
        assert!(state.ema_short.is_none() && state.ema_long.is_none());

        let state = feed(&mut engine, &mut series, &[3.0]);
        assert_eq!(state.ema_short, Some(2.0));
        assert!(state.ema_long.is_none());
    }

    #[test]
    fn test_rsi_saturates_on_rising_prices() {
        let mut engine = IndicatorEngine::new(3, 5, 14, EmaSeed::FirstSample);
        let mut series = RollingSeries::new(100);
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();

        let state = feed(&mut engine, &mut series, &prices);
        assert_eq!(state.rsi, Some(100.0));
    }

    #[test]
    fn test_restore_and_reset() {
        let mut engine = IndicatorEngine::new(3, 5, 2, EmaSeed::FirstSample);
        let series = RollingSeries::from_points(
            10,
            [1.0, 2.0, 3.0]
                .iter()
                .enumerate()
                .map(|(i, &v)| crate::PricePoint::new(i as i64, v)),
        );

        engine.restore(Some(2.5), Some(2.0), &series);
        assert_eq!(engine.ema_short(), Some(2.5));
        assert_eq!(engine.ema_long(), Some(2.0));
        assert_eq!(engine.rsi(), Some(100.0));

        engine.reset();
        assert_eq!(engine.state(), IndicatorState::default());
    }
}
