//! Signal decisions built on EMA and RSI values.
//!
//! The decider is a small state machine: it starts in WARMUP, and every
//! evaluation with both EMAs present yields HOLD, BUY or SELL. It never
//! terminates; it lives as long as the tracked entity.

mod decider;

pub use decider::{crossover, level, SignalDecider};
