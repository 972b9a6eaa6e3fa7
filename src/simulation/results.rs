//! Output structures for cycle simulations and sweeps

use serde::{Deserialize, Serialize};

/// One simulated year within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyResult {
    pub year: i32,
    pub starting_balance: f64,
    pub withdrawal: f64,
    pub stock_return_pct: f64,
    pub bond_return_pct: f64,
    pub ending_balance: f64,
    pub inflation_rate_pct: f64,
}

/// Outcome of one historical starting year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleResult {
    pub start_year: i32,

    /// Balance stayed positive through every simulated year
    pub success: bool,

    /// Ending balance of the last year, or 0 for a depleted cycle
    pub final_balance: f64,

    /// Year-by-year trace, truncated at the year of depletion
    pub yearly_results: Vec<YearlyResult>,

    pub lowest_balance: f64,
    pub highest_balance: f64,

    /// Mean annual return (decimal) over the years simulated
    pub average_return: f64,
}

impl CycleResult {
    /// Years simulated before the cycle ended
    pub fn years_simulated(&self) -> usize {
        self.yearly_results.len()
    }

    /// Sum of all withdrawals taken
    pub fn total_withdrawn(&self) -> f64 {
        self.yearly_results.iter().map(|r| r.withdrawal).sum()
    }

    /// Year in which the balance was exhausted
    pub fn depletion_year(&self) -> Option<i32> {
        if self.success {
            None
        } else {
            self.yearly_results.last().map(|r| r.year)
        }
    }
}

/// How the cycles of a result were chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "simulationType", rename_all = "kebab-case")]
pub enum SimulationType {
    /// One cycle from an explicit start year
    Single {
        #[serde(rename = "startYear")]
        start_year: i32,
    },
    /// Every complete window in the series
    HistoricalCycles,
}

/// Cycles of one request plus aggregate statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    #[serde(flatten)]
    pub simulation_type: SimulationType,

    /// Ascending by start year
    pub cycles: Vec<CycleResult>,

    pub success_rate_pct: f64,

    /// Lower median of final balances
    pub median_ending_balance: f64,

    pub worst_case_balance: f64,
    pub best_case_balance: f64,
}

impl SweepResult {
    pub fn successful_cycles(&self) -> usize {
        self.cycles.iter().filter(|c| c.success).count()
    }

    pub fn failed_cycles(&self) -> impl Iterator<Item = &CycleResult> {
        self.cycles.iter().filter(|c| !c.success)
    }

    /// Cycle for a given start year
    pub fn cycle(&self, start_year: i32) -> Option<&CycleResult> {
        self.cycles
            .binary_search_by_key(&start_year, |c| c.start_year)
            .ok()
            .map(|idx| &self.cycles[idx])
    }

    pub fn summary(&self) -> SweepSummary {
        let successful = self.successful_cycles();
        SweepSummary {
            total_cycles: self.cycles.len(),
            successful_cycles: successful,
            failed_cycles: self.cycles.len() - successful,
            success_rate_pct: self.success_rate_pct,
            median_ending_balance: self.median_ending_balance,
            worst_case_balance: self.worst_case_balance,
            best_case_balance: self.best_case_balance,
            earliest_depletion_year: self.failed_cycles().filter_map(|c| c.depletion_year()).min(),
        }
    }
}

/// Headline numbers of a sweep, without the traces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub total_cycles: usize,
    pub successful_cycles: usize,
    pub failed_cycles: usize,
    pub success_rate_pct: f64,
    pub median_ending_balance: f64,
    pub worst_case_balance: f64,
    pub best_case_balance: f64,
    pub earliest_depletion_year: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(year: i32, withdrawal: f64, ending: f64) -> YearlyResult {
        YearlyResult {
            year,
            starting_balance: 0.0,
            withdrawal,
            stock_return_pct: 0.0,
            bond_return_pct: 0.0,
            ending_balance: ending,
            inflation_rate_pct: 0.0,
        }
    }

    fn cycle(start_year: i32, success: bool, final_balance: f64) -> CycleResult {
        CycleResult {
            start_year,
            success,
            final_balance,
            yearly_results: vec![
                year(start_year, 10.0, 50.0),
                year(start_year + 1, 12.0, final_balance),
            ],
            lowest_balance: 0.0,
            highest_balance: 100.0,
            average_return: 0.0,
        }
    }

    #[test]
    fn test_cycle_helpers() {
        let ok = cycle(1990, true, 80.0);
        assert_eq!(ok.years_simulated(), 2);
        assert_eq!(ok.total_withdrawn(), 22.0);
        assert_eq!(ok.depletion_year(), None);

        let failed = cycle(1990, false, 0.0);
        assert_eq!(failed.depletion_year(), Some(1991));
    }

    #[test]
    fn test_summary_counts() {
        let result = SweepResult {
            simulation_type: SimulationType::HistoricalCycles,
            cycles: vec![cycle(1990, true, 80.0), cycle(1991, false, 0.0), cycle(1992, false, 0.0)],
            success_rate_pct: 100.0 / 3.0,
            median_ending_balance: 0.0,
            worst_case_balance: 0.0,
            best_case_balance: 80.0,
        };
        let summary = result.summary();
        assert_eq!(summary.total_cycles, 3);
        assert_eq!(summary.successful_cycles, 1);
        assert_eq!(summary.failed_cycles, 2);
        assert_eq!(summary.earliest_depletion_year, Some(1992));
        assert_eq!(result.cycle(1991).map(|c| c.success), Some(false));
        assert!(result.cycle(1989).is_none());
    }

    #[test]
    fn test_simulation_type_json_shape() {
        let single = serde_json::to_value(SimulationType::Single { start_year: 1990 }).unwrap();
        assert_eq!(single["simulationType"], "single");
        assert_eq!(single["startYear"], 1990);

        let sweep: SimulationType =
            serde_json::from_str(r#"{"simulationType":"historical-cycles"}"#).unwrap();
        assert_eq!(sweep, SimulationType::HistoricalCycles);
    }
}
