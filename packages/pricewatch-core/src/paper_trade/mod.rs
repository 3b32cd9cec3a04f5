//! Paper trading simulation module.
//!
//! Provides an all-in/all-out virtual position driven by signals, without real money.

mod simulator;

pub use simulator::{PaperTradingSimulator, SimulationState, SimulationStatus, RECENT_TRADES};
