//! Crossover / level signal state machine.

use crate::config::{EngineConfig, SignalPolicy};
use crate::types::Signal;

/// Edge-triggered crossover between two consecutive (short, long) pairs.
///
/// BUY when the short line moves from at-or-below to above the long line,
/// SELL on the opposite move, HOLD otherwise.
pub fn crossover(prev: (f64, f64), cur: (f64, f64)) -> Signal {
    let prev_diff = prev.0 - prev.1;
    let cur_diff = cur.0 - cur.1;

    if prev_diff <= 0.0 && cur_diff > 0.0 {
        Signal::Buy
    } else if prev_diff >= 0.0 && cur_diff < 0.0 {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Level comparison: the signal follows which line is on top.
pub fn level(cur: (f64, f64)) -> Signal {
    if cur.0 > cur.1 {
        Signal::Buy
    } else if cur.0 < cur.1 {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Turns the current and previous indicator values into a discrete signal.
#[derive(Debug, Clone)]
pub struct SignalDecider {
    policy: SignalPolicy,
    rsi_buy_threshold: f64,
    rsi_sell_threshold: f64,
    previous: Option<(f64, f64)>,
    last: Signal,
}

impl SignalDecider {
    pub fn new(policy: SignalPolicy, rsi_buy_threshold: f64, rsi_sell_threshold: f64) -> Self {
        Self {
            policy,
            rsi_buy_threshold,
            rsi_sell_threshold,
            previous: None,
            last: Signal::Warmup,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.signal_policy,
            config.rsi_buy_threshold,
            config.rsi_sell_threshold,
        )
    }

    /// Evaluate the latest indicator values.
    ///
    /// Returns WARMUP (leaving the stored pair untouched) until both EMAs exist.
    /// The stored previous pair is replaced only after it has been compared.
    pub fn evaluate(&mut self, ema_short: Option<f64>, ema_long: Option<f64>, rsi: Option<f64>) -> Signal {
        let (Some(short), Some(long)) = (ema_short, ema_long) else {
            self.last = Signal::Warmup;
            return self.last;
        };

        let mut signal = match (self.policy, self.previous) {
            (SignalPolicy::EdgeTriggeredCrossover, Some(prev)) => crossover(prev, (short, long)),
            (SignalPolicy::EdgeTriggeredCrossover, None) => Signal::Hold,
            (SignalPolicy::LevelComparison, _) => level((short, long)),
        };

        if signal == Signal::Hold {
            if let Some(rsi) = rsi {
                if rsi < self.rsi_buy_threshold {
                    signal = Signal::Buy;
                } else if rsi > self.rsi_sell_threshold {
                    signal = Signal::Sell;
                }
            }
        }

        self.previous = Some((short, long));
        self.last = signal;
        signal
    }

    /// Signal produced by the most recent evaluation.
    pub fn last(&self) -> Signal {
        self.last
    }

    /// Pair that the next evaluation will compare against.
    pub fn previous(&self) -> Option<(f64, f64)> {
        self.previous
    }

    pub fn policy(&self) -> SignalPolicy {
        self.policy
    }

    /// Seed the comparison pair without emitting a signal.
    pub fn prime(&mut self, ema_short: Option<f64>, ema_long: Option<f64>) {
        self.previous = ema_short.zip(ema_long);
        self.last = Signal::Warmup;
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.last = Signal::Warmup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decider() -> SignalDecider {
        SignalDecider::new(SignalPolicy::EdgeTriggeredCrossover, 25.0, 75.0)
    }

    #[test]
    fn test_crossover_pure() {
        assert_eq!(crossover((9.0, 10.0), (11.0, 10.0)), Signal::Buy);
        assert_eq!(crossover((10.0, 10.0), (11.0, 10.0)), Signal::Buy);
        assert_eq!(crossover((11.0, 10.0), (9.0, 10.0)), Signal::Sell);
        assert_eq!(crossover((10.0, 10.0), (9.0, 10.0)), Signal::Sell);
        assert_eq!(crossover((11.0, 10.0), (12.0, 10.0)), Signal::Hold);
        assert_eq!(crossover((10.0, 10.0), (10.0, 10.0)), Signal::Hold);
    }

    #[test]
    fn test_warmup_until_both_emas() {
        let mut d = decider();
        assert_eq!(d.evaluate(Some(10.0), None, None), Signal::Warmup);
        assert_eq!(d.evaluate(None, Some(10.0), Some(10.0)), Signal::Warmup);
        assert!(d.previous().is_none());
        assert_eq!(d.last(), Signal::Warmup);
    }

    #[test]
    fn test_first_complete_pair_holds() {
        let mut d = decider();
        assert_eq!(d.evaluate(Some(11.0), Some(10.0), Some(50.0)), Signal::Hold);
        assert_eq!(d.previous(), Some((11.0, 10.0)));
    }

    #[test]
    fn test_upward_cross_buys() {
        let mut d = decider();
        d.evaluate(Some(9.0), Some(10.0), None);
        assert_eq!(d.evaluate(Some(11.0), Some(10.0), None), Signal::Buy);
        // Staying above is not a new cross
        assert_eq!(d.evaluate(Some(12.0), Some(10.5), None), Signal::Hold);
    }

    #[test]
    fn test_downward_cross_sells() {
        let mut d = decider();
        d.evaluate(Some(11.0), Some(10.0), None);
        assert_eq!(d.evaluate(Some(9.5), Some(10.0), Some(50.0)), Signal::Sell);
    }

    #[test]
    fn test_rsi_overrides_hold_only() {
        let mut d = decider();
        assert_eq!(d.evaluate(Some(11.0), Some(10.0), Some(20.0)), Signal::Buy);
        assert_eq!(d.evaluate(Some(12.0), Some(10.0), Some(80.0)), Signal::Sell);
        assert_eq!(d.evaluate(Some(13.0), Some(10.0), Some(25.0)), Signal::Hold);
        assert_eq!(d.evaluate(Some(14.0), Some(10.0), Some(75.0)), Signal::Hold);

        // A crossover SELL is not flipped by an oversold RSI
        assert_eq!(d.evaluate(Some(9.0), Some(10.0), Some(5.0)), Signal::Sell);
    }

    #[test]
    fn test_strict_thresholds() {
        let mut d = SignalDecider::new(SignalPolicy::EdgeTriggeredCrossover, 20.0, 80.0);
        assert_eq!(d.evaluate(Some(11.0), Some(10.0), Some(22.0)), Signal::Hold);
        assert_eq!(d.evaluate(Some(11.0), Some(10.0), Some(19.9)), Signal::Buy);
    }

    #[test]
    fn test_level_policy_is_continuous() {
        let mut d = SignalDecider::new(SignalPolicy::LevelComparison, 25.0, 75.0);
        assert_eq!(d.evaluate(Some(11.0), Some(10.0), None), Signal::Buy);
        assert_eq!(d.evaluate(Some(12.0), Some(10.0), None), Signal::Buy);
        assert_eq!(d.evaluate(Some(9.0), Some(10.0), None), Signal::Sell);
        assert_eq!(d.evaluate(Some(10.0), Some(10.0), Some(90.0)), Signal::Sell);
    }

    #[test]
    fn test_prime_and_reset() {
        let mut d = decider();
        d.prime(Some(9.0), Some(10.0));
        assert_eq!(d.last(), Signal::Warmup);
        assert_eq!(d.evaluate(Some(11.0), Some(10.0), None), Signal::Buy);

        d.reset();
        assert!(d.previous().is_none());
        assert_eq!(d.evaluate(Some(11.0), Some(10.0), None), Signal::Hold);
    }
}
