//! Error taxonomy for simulation requests
//!
//! Portfolio depletion is not an error: a depleted cycle is a normal
//! `CycleResult` with `success == false`.

use thiserror::Error;

/// Errors that terminate a simulation request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Requested window runs past the end of the available series
    #[error(
        "insufficient historical data: {duration} years requested from {start_year}, {available} available"
    )]
    InsufficientHistoricalData {
        start_year: i32,
        duration: u32,
        available: usize,
    },

    /// Sweep mode found no complete window
    #[error("no valid historical cycles found for simulation ({duration}-year cycles over {available_years} years of data)")]
    NoValidCycles { duration: u32, available_years: usize },

    /// Structurally invalid withdrawal policy (unknown type, bad parameters)
    #[error("invalid withdrawal policy configuration: {0}")]
    InvalidPolicyConfiguration(String),

    /// Portfolio configuration rejected by upstream validation
    #[error("invalid portfolio configuration: {0}")]
    InvalidPortfolio(String),

    #[error("simulation duration must be at least one year")]
    InvalidDuration,

    /// Series contains the same calendar year twice
    #[error("historical series contains duplicate year {0}")]
    DuplicateYear(i32),

    /// Metrics requested over a range with no records
    #[error("no data found for period {start_year}-{end_year}")]
    NoDataForPeriod { start_year: i32, end_year: i32 },

    /// Failure inside the historical data collaborator
    #[error("historical data source error: {0}")]
    DataSource(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
