//! Historical cycle simulation: one cycle at a time, or a sweep over every
//! complete window of a series

mod engine;
mod results;
mod state;
mod sweep;

pub use engine::CycleRunner;
pub use results::{CycleResult, SimulationType, SweepResult, SweepSummary, YearlyResult};
pub use state::CycleState;
pub use sweep::{aggregate_cycles, HistoricalSweepAggregator, SweepConfig};
