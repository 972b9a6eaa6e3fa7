//! Simulation runner for request-level work
//!
//! Owns the data-source collaborator, validates requests before they reach
//! the engine, and takes a single snapshot of the series per request.

use crate::error::{Result, SimulationError};
use crate::history::{
    calculate_period_metrics, notable_periods, HistoricalDataSource, HistoricalSeries, Period,
    PeriodMetrics, YearRange,
};
use crate::portfolio::PortfolioConfig;
use crate::simulation::{HistoricalSweepAggregator, SimulationType, SweepConfig, SweepResult};
use crate::withdrawal::{NamedStrategy, WithdrawalPolicy};
use log::info;
use serde::{Deserialize, Serialize};

/// A complete simulation request, as submitted over JSON
///
/// # Example
/// ```ignore
/// {
///   "portfolio": { "initialBalance": 1000000, "stockAllocation": 60, "bondAllocation": 40 },
///   "withdrawalStrategy": { "type": "fixed", "amount": 40000, "adjustForInflation": true },
///   "duration": 30,
///   "simulationType": "historical-cycles"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParams {
    pub portfolio: PortfolioConfig,
    pub withdrawal_strategy: WithdrawalPolicy,
    /// Cycle length in years
    pub duration: u32,
    #[serde(flatten)]
    pub simulation_type: SimulationType,
}

impl SimulationParams {
    /// Checks the engine relies on but does not perform itself
    pub fn validate(&self) -> Result<()> {
        self.portfolio.validate()?;
        self.withdrawal_strategy.validate()?;
        if self.duration == 0 {
            return Err(SimulationError::InvalidDuration);
        }
        Ok(())
    }
}

/// Sweep outcome for one named strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub name: String,
    pub policy: WithdrawalPolicy,
    pub result: SweepResult,
}

/// Runs simulation requests against an injected historical data source
#[derive(Debug, Clone)]
pub struct SimulationRunner<S: HistoricalDataSource> {
    source: S,
    config: SweepConfig,
}

impl<S: HistoricalDataSource> SimulationRunner<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, SweepConfig::default())
    }

    pub fn with_config(source: S, config: SweepConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> SweepConfig {
        self.config
    }

    /// Validate and dispatch a request on its simulation type
    pub fn run(&self, params: &SimulationParams) -> Result<SweepResult> {
        params.validate()?;
        match params.simulation_type {
            SimulationType::Single { start_year } => self.run_single_cycle(
                &params.portfolio,
                &params.withdrawal_strategy,
                start_year,
                params.duration,
            ),
            SimulationType::HistoricalCycles => self.run_historical_sweep(
                &params.portfolio,
                &params.withdrawal_strategy,
                params.duration,
            ),
        }
    }

    /// One cycle from `start_year`, fetching only the years it needs
    pub fn run_single_cycle(
        &self,
        portfolio: &PortfolioConfig,
        policy: &WithdrawalPolicy,
        start_year: i32,
        duration: u32,
    ) -> Result<SweepResult> {
        if duration == 0 {
            return Err(SimulationError::InvalidDuration);
        }
        let records = self
            .source
            .fetch_series(Some(YearRange::window(start_year, duration)))?;
        let series = HistoricalSeries::new(records)?;

        info!("Running single {}-year cycle from {}", duration, start_year);
        self.aggregator(portfolio, policy)
            .run_single(&series, start_year, duration)
    }

    /// Every complete window of the full series
    pub fn run_historical_sweep(
        &self,
        portfolio: &PortfolioConfig,
        policy: &WithdrawalPolicy,
        duration: u32,
    ) -> Result<SweepResult> {
        let series = self.snapshot()?;
        self.aggregator(portfolio, policy).run_sweep(&series, duration)
    }

    /// Sweep each strategy against the same snapshot of the series
    pub fn compare_strategies(
        &self,
        portfolio: &PortfolioConfig,
        strategies: &[NamedStrategy],
        duration: u32,
    ) -> Result<Vec<StrategyComparison>> {
        portfolio.validate()?;
        let series = self.snapshot()?;

        strategies
            .iter()
            .map(|strategy| {
                strategy.policy.validate()?;
                let result = self
                    .aggregator(portfolio, &strategy.policy)
                    .run_sweep(&series, duration)?;
                Ok(StrategyComparison {
                    name: strategy.name.to_string(),
                    policy: strategy.policy.clone(),
                    result,
                })
            })
            .collect()
    }

    /// Average market conditions over `start_year..=end_year`
    pub fn period_metrics(&self, start_year: i32, end_year: i32) -> Result<PeriodMetrics> {
        let upper = (end_year as i64 + 1).min(i32::MAX as i64) as i32;
        let records = self
            .source
            .fetch_series(Some(YearRange::new(start_year, upper)))?;
        calculate_period_metrics(&HistoricalSeries::new(records)?, start_year, end_year)
    }

    /// Metrics for every notable period the series covers
    pub fn notable_period_metrics(&self) -> Result<Vec<(Period, PeriodMetrics)>> {
        let series = self.snapshot()?;
        Ok(notable_periods()
            .into_iter()
            .filter_map(|period| {
                calculate_period_metrics(&series, period.start_year, period.end_year)
                    .ok()
                    .map(|metrics| (period, metrics))
            })
            .collect())
    }

    fn snapshot(&self) -> Result<HistoricalSeries> {
        HistoricalSeries::new(self.source.fetch_series(None)?)
    }

    fn aggregator(
        &self,
        portfolio: &PortfolioConfig,
        policy: &WithdrawalPolicy,
    ) -> HistoricalSweepAggregator {
        HistoricalSweepAggregator::new(portfolio.clone(), policy.clone(), self.config)
    }
}
