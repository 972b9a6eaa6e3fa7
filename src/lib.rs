//! Retirement Cycles - Historical-cycle sustainability engine for retirement portfolios
//!
//! This library provides:
//! - Replay of a stock/bond portfolio through consecutive historical years
//! - Fixed, percentage, variable-spending, and guardrails withdrawal policies
//! - Sweeps over every complete historical window with success-rate statistics
//! - Period metrics over notable market episodes
//! - Request validation and a pluggable historical data source

pub mod error;
pub mod history;
pub mod portfolio;
pub mod scenario;
pub mod simulation;
pub mod withdrawal;

// Re-export commonly used types
pub use error::{Result, SimulationError};
pub use history::{CsvSource, HistoricalDataSource, HistoricalSeries, HistoricalYearRecord, YearRange};
pub use portfolio::PortfolioConfig;
pub use scenario::{SimulationParams, SimulationRunner, StrategyComparison};
pub use simulation::{
    CycleResult, CycleRunner, HistoricalSweepAggregator, SimulationType, SweepConfig, SweepResult,
    YearlyResult,
};
pub use withdrawal::{predefined_strategies, WithdrawalPolicy};
