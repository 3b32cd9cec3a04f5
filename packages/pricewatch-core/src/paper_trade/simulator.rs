//! All-in/all-out paper trading simulator.

use crate::types::{PortfolioPoint, Signal, Trade, TradeSide};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Number of trades reported in [`SimulationStatus::recent_trades`].
pub const RECENT_TRADES: usize = 10;

/// Virtual portfolio state.
///
/// `trades` and `portfolio_history` are ordered newest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationState {
    /// Cash available for the next buy
    pub balance: f64,
    /// Units of the asset currently held
    pub holdings: f64,
    /// Trade log, newest first
    pub trades: VecDeque<Trade>,
    /// Valuation after every processed signal, newest first
    pub portfolio_history: VecDeque<PortfolioPoint>,
}

impl SimulationState {
    /// Fresh state holding only cash.
    pub fn with_balance(balance: f64) -> Self {
        Self {
            balance,
            holdings: 0.0,
            trades: VecDeque::new(),
            portfolio_history: VecDeque::new(),
        }
    }

    /// Mark-to-market value at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        self.balance + self.holdings * price
    }
}

/// Reacts to signal transitions by moving the whole portfolio in or out.
#[derive(Debug, Clone)]
pub struct PaperTradingSimulator {
    state: SimulationState,
    starting_balance: f64,
    max_history: usize,
}

impl PaperTradingSimulator {
    /// Create a simulator seeded with `starting_balance` in cash.
    pub fn new(starting_balance: f64, max_history: usize) -> Self {
        Self {
            state: SimulationState::with_balance(starting_balance),
            starting_balance,
            max_history,
        }
    }

    /// Rebuild a simulator from persisted state, trimming the valuation history.
    pub fn from_state(mut state: SimulationState, starting_balance: f64, max_history: usize) -> Self {
        state.portfolio_history.truncate(max_history);
        Self {
            state,
            starting_balance,
            max_history,
        }
    }

    /// Apply a signal at the given price.
    ///
    /// BUY while flat converts the whole balance into holdings; SELL while
    /// holding converts everything back. Any other combination is a no-op, so
    /// repeating a signal never trades twice. A valuation point is recorded on
    /// every call with a usable price.
    ///
    /// Non-finite or non-positive prices are ignored entirely.
    pub fn on_signal(&mut self, signal: Signal, price: f64, timestamp: i64) {
        if !price.is_finite() || price <= 0.0 {
            trace!(price, "ignoring signal with unusable price");
            return;
        }

        match signal {
            Signal::Buy if self.state.holdings == 0.0 && self.state.balance > 0.0 => {
                let quantity = self.state.balance / price;
                self.state.holdings = quantity;
                self.state.balance = 0.0;
                self.record(Trade::new(TradeSide::Buy, price, timestamp));
                debug!(price, quantity, "paper buy");
            }
            Signal::Sell if self.state.holdings > 0.0 => {
                let proceeds = self.state.holdings * price;
                self.state.balance = proceeds;
                self.state.holdings = 0.0;
                self.record(Trade::new(TradeSide::Sell, price, timestamp));
                debug!(price, proceeds, "paper sell");
            }
            _ => {}
        }

        self.state.portfolio_history.push_front(PortfolioPoint {
            timestamp,
            value: self.state.value_at(price),
        });
        self.state.portfolio_history.truncate(self.max_history);
    }

    fn record(&mut self, trade: Trade) {
        self.state.trades.push_front(trade);
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn balance(&self) -> f64 {
        self.state.balance
    }

    pub fn holdings(&self) -> f64 {
        self.state.holdings
    }

    pub fn trades(&self) -> &VecDeque<Trade> {
        &self.state.trades
    }

    pub fn starting_balance(&self) -> f64 {
        self.starting_balance
    }

    /// Discard trades and valuations, returning to the starting balance.
    pub fn reset(&mut self) {
        self.state = SimulationState::with_balance(self.starting_balance);
        debug!(balance = self.starting_balance, "paper trading reset");
    }

    /// Summarize the portfolio, marking holdings at `mark_price`.
    ///
    /// Without a price the latest recorded valuation is used.
    pub fn status(&self, mark_price: Option<f64>) -> SimulationStatus {
        let portfolio_value = match mark_price {
            Some(price) => self.state.value_at(price),
            None => self
                .state
                .portfolio_history
                .front()
                .map(|p| p.value)
                .unwrap_or(self.state.balance),
        };

        let total_return_percent = if self.starting_balance > 0.0 {
            ((portfolio_value - self.starting_balance) / self.starting_balance) * 100.0
        } else {
            0.0
        };

        SimulationStatus {
            starting_balance: self.starting_balance,
            balance: self.state.balance,
            holdings: self.state.holdings,
            portfolio_value,
            total_return_percent,
            trade_count: self.state.trades.len(),
            win_rate_percent: self.win_rate_percent(),
            recent_trades: self.state.trades.iter().take(RECENT_TRADES).copied().collect(),
        }
    }

    /// Share of closed round trips (BUY followed by SELL) that sold higher.
    fn win_rate_percent(&self) -> f64 {
        let mut entry: Option<f64> = None;
        let (mut closed, mut winners) = (0usize, 0usize);

        // Oldest first
        for trade in self.state.trades.iter().rev() {
            match trade.side {
                TradeSide::Buy => entry = Some(trade.price),
                TradeSide::Sell => {
                    if let Some(buy_price) = entry.take() {
                        closed += 1;
                        if trade.price > buy_price {
                            winners += 1;
                        }
                    }
                }
            }
        }

        if closed > 0 {
            (winners as f64 / closed as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Paper trading status summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationStatus {
    pub starting_balance: f64,
    pub balance: f64,
    pub holdings: f64,
    pub portfolio_value: f64,
    pub total_return_percent: f64,
    pub trade_count: usize,
    pub win_rate_percent: f64,
    /// Newest first
    pub recent_trades: Vec<Trade>,
}
