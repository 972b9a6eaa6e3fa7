//! Historical-cycle sweep and aggregate statistics
//!
//! Cycles are independent, so the sweep fans out over start years with rayon
//! and sorts the collected cycles by start year before aggregating. Serial
//! and parallel runs produce identical results.

use crate::error::{Result, SimulationError};
use crate::history::HistoricalSeries;
use crate::portfolio::PortfolioConfig;
use crate::withdrawal::WithdrawalPolicy;
use super::engine::CycleRunner;
use super::results::{CycleResult, SimulationType, SweepResult};
use log::{debug, info, warn};
use rayon::prelude::*;

/// Execution settings for a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// Run cycles on the rayon thread pool
    pub parallel: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Drives [`CycleRunner`] over windows of a historical series
#[derive(Debug, Clone)]
pub struct HistoricalSweepAggregator {
    runner: CycleRunner,
    config: SweepConfig,
}

impl HistoricalSweepAggregator {
    pub fn new(portfolio: PortfolioConfig, policy: WithdrawalPolicy, config: SweepConfig) -> Self {
        Self {
            runner: CycleRunner::new(portfolio, policy),
            config,
        }
    }

    pub fn runner(&self) -> &CycleRunner {
        &self.runner
    }

    /// One cycle of `duration` years from `start_year`
    ///
    /// Fails with `InsufficientHistoricalData` when fewer than `duration`
    /// consecutive years are available, including when a year is missing.
    pub fn run_cycle_at(
        &self,
        series: &HistoricalSeries,
        start_year: i32,
        duration: u32,
    ) -> Result<CycleResult> {
        if duration == 0 {
            return Err(SimulationError::InvalidDuration);
        }

        let window = series.window(start_year, duration);
        if window.len() != duration as usize {
            return Err(SimulationError::InsufficientHistoricalData {
                start_year,
                duration,
                available: window.len(),
            });
        }

        Ok(self.runner.run_cycle(start_year, window))
    }

    /// Single mode: one cycle wrapped in a sweep-shaped result
    pub fn run_single(
        &self,
        series: &HistoricalSeries,
        start_year: i32,
        duration: u32,
    ) -> Result<SweepResult> {
        let cycle = self.run_cycle_at(series, start_year, duration)?;
        aggregate_cycles(SimulationType::Single { start_year }, vec![cycle], duration, series.len())
    }

    /// Sweep mode: every start year from the first year of the series to
    /// `last_year - duration`
    pub fn run_sweep(&self, series: &HistoricalSeries, duration: u32) -> Result<SweepResult> {
        if duration == 0 {
            return Err(SimulationError::InvalidDuration);
        }

        let start_years = candidate_start_years(series, duration);
        info!(
            "Sweeping {} candidate start years ({}-year cycles, {} years of data)",
            start_years.len(),
            duration,
            series.len()
        );

        let evaluate = |&start_year: &i32| -> Option<CycleResult> {
            let window = series.window(start_year, duration);
            if window.len() != duration as usize {
                warn!(
                    "Skipping start year {}: {} of {} years available",
                    start_year,
                    window.len(),
                    duration
                );
                return None;
            }
            let cycle = self.runner.run_cycle(start_year, window);
            debug!(
                "Cycle {}: success={} final_balance={:.2}",
                start_year, cycle.success, cycle.final_balance
            );
            Some(cycle)
        };

        let mut cycles: Vec<CycleResult> = if self.config.parallel {
            start_years.par_iter().filter_map(&evaluate).collect()
        } else {
            start_years.iter().filter_map(&evaluate).collect()
        };
        cycles.sort_by_key(|c| c.start_year);

        let result = aggregate_cycles(SimulationType::HistoricalCycles, cycles, duration, series.len())?;
        info!(
            "Sweep complete: {} cycles, {:.1}% success",
            result.cycles.len(),
            result.success_rate_pct
        );
        Ok(result)
    }
}

/// Start years considered by a sweep, ascending
fn candidate_start_years(series: &HistoricalSeries, duration: u32) -> Vec<i32> {
    match (series.first_year(), series.last_year()) {
        (Some(first), Some(last)) => {
            let last_start = last as i64 - duration as i64;
            (first as i64..=last_start).map(|y| y as i32).collect()
        }
        _ => Vec::new(),
    }
}

/// Success rate and ending-balance distribution over a set of cycles
///
/// `cycles` must already be in ascending start-year order.
pub fn aggregate_cycles(
    simulation_type: SimulationType,
    cycles: Vec<CycleResult>,
    duration: u32,
    available_years: usize,
) -> Result<SweepResult> {
    if cycles.is_empty() {
        return Err(SimulationError::NoValidCycles { duration, available_years });
    }

    let n = cycles.len();
    let successes = cycles.iter().filter(|c| c.success).count();

    let mut final_balances: Vec<f64> = cycles.iter().map(|c| c.final_balance).collect();
    final_balances.sort_by(|a, b| a.total_cmp(b));

    Ok(SweepResult {
        simulation_type,
        success_rate_pct: 100.0 * successes as f64 / n as f64,
        // Lower median for even counts, no interpolation
        median_ending_balance: final_balances[n / 2],
        worst_case_balance: final_balances[0],
        best_case_balance: final_balances[n - 1],
        cycles,
    })
}
