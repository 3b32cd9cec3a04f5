//! Pricewatch Core - Streaming price signal engine.
//!
//! This crate turns a stream of scraped price samples into trading signals:
//!
//! - **Rolling history**: Bounded FIFO buffer of timestamped prices
//! - **Technical indicators**: Incremental EMA (short/long) and windowed RSI
//! - **Signal decisions**: Crossover / level policies with RSI overrides
//! - **Paper trading**: All-in/all-out simulator driven by signals
//! - **Hosting**: Per-entity engines, JSON snapshot store, TOML configuration
//!
//! # Example
//!
//! ```rust
//! use pricewatch_core::{EngineConfig, Signal, SignalEngine};
//!
//! let mut engine = SignalEngine::new(EngineConfig::default()).unwrap();
//!
//! // Feed a few samples (timestamps in milliseconds)
//! for (i, price) in [100.0, 101.5, 99.8, 102.3].iter().enumerate() {
//!     engine.submit_price(*price, 1_700_000_000_000 + i as i64 * 5_000);
//! }
//!
//! let view = engine.view();
//! assert_eq!(view.history_size, 4);
//! assert_ne!(view.signal, Signal::Warmup);
//! ```

pub mod config;
pub mod engine;
pub mod indicators;
pub mod paper_trade;
pub mod registry;
pub mod series;
pub mod signal;
pub mod snapshot;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use types::{ApiResponse, PortfolioPoint, PricePoint, Signal, Trade, TradeSide};

// Re-export main functionality
pub use config::{EmaSeed, EngineConfig, SignalPolicy};
pub use engine::SignalEngine;
pub use indicators::{compute_rsi, update_ema, IndicatorEngine, IndicatorState};
pub use paper_trade::{PaperTradingSimulator, SimulationState, SimulationStatus};
pub use registry::{EngineRegistry, EntityKey};
pub use series::RollingSeries;
pub use signal::SignalDecider;
pub use snapshot::{EngineSnapshot, EngineView, IndicatorSnapshot};
pub use store::SnapshotStore;

/// Error types for pricewatch-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for pricewatch-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
