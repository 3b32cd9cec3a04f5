//! Exponential Moving Average (EMA), maintained incrementally.

use crate::config::EmaSeed;

/// Smoothing factor `k = 2 / (period + 1)`.
#[inline]
pub fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Advance an EMA by one price.
///
/// Uses the formula: EMA = (price - prev) * k + prev
/// where k = 2 / (period + 1)
///
/// # Example
///
/// ```rust
/// use pricewatch_core::indicators::update_ema;
///
/// // k = 2 / 4 = 0.5, so the EMA moves halfway towards the new price
/// assert_eq!(update_ema(10.0, 20.0, 3), 15.0);
/// ```
pub fn update_ema(prev_ema: f64, new_price: f64, period: usize) -> f64 {
    (new_price - prev_ema) * smoothing(period) + prev_ema
}

/// Simple average of the newest `min(period, len)` values.
///
/// Returns `None` for an empty slice or a zero period.
pub fn sma_seed(values: &[f64], period: usize) -> Option<f64> {
    if values.is_empty() || period == 0 {
        return None;
    }

    // Running mean: a plain sum overflows near f64::MAX
    let window = &values[values.len().saturating_sub(period)..];
    let mean = window
        .iter()
        .enumerate()
        .fold(0.0, |mean, (i, &v)| mean + (v - mean) / (i + 1) as f64);
    Some(mean)
}

/// First value of an EMA under the given seeding policy.
///
/// `values` is the price history oldest to newest, including the latest price.
pub fn init_ema(period: usize, values: &[f64], seed: EmaSeed) -> Option<f64> {
    match seed {
        EmaSeed::FirstSample => sma_seed(values, period),
        EmaSeed::FullWindow if values.len() >= period => sma_seed(values, period),
        EmaSeed::FullWindow => None,
    }
}

/// Incrementally maintained EMA for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct Ema {
    period: usize,
    value: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            value: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Feed the history after a new price has been appended to it.
    ///
    /// Seeds from the history while unset, otherwise applies the recursive update
    /// with the newest value only.
    pub fn advance(&mut self, values: &[f64], seed: EmaSeed) -> Option<f64> {
        self.value = match (self.value, values.last()) {
            (Some(prev), Some(&price)) => Some(update_ema(prev, price, self.period)),
            (Some(prev), None) => Some(prev),
            (None, _) => init_ema(self.period, values, seed),
        };
        self.value
    }

    /// Overwrite the current value (used when restoring persisted state).
    pub fn set(&mut self, value: Option<f64>) {
        self.value = value;
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}
