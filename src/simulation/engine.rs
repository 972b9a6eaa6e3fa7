//! Year-by-year simulation of one historical cycle

use crate::history::HistoricalYearRecord;
use crate::portfolio::{returns::apply_return, PortfolioConfig, PortfolioReturnModel};
use crate::withdrawal::{calculate_withdrawal, WithdrawalPolicy};
use super::results::{CycleResult, YearlyResult};
use super::state::CycleState;

/// Runs a portfolio and withdrawal policy through consecutive historical years
#[derive(Debug, Clone)]
pub struct CycleRunner {
    portfolio: PortfolioConfig,
    policy: WithdrawalPolicy,
    returns: PortfolioReturnModel,
}

impl CycleRunner {
    pub fn new(portfolio: PortfolioConfig, policy: WithdrawalPolicy) -> Self {
        let returns = PortfolioReturnModel::from_portfolio(&portfolio);
        Self {
            portfolio,
            policy,
            returns,
        }
    }

    pub fn portfolio(&self) -> &PortfolioConfig {
        &self.portfolio
    }

    pub fn policy(&self) -> &WithdrawalPolicy {
        &self.policy
    }

    /// Simulate every record in `records` in order, starting from the
    /// initial balance
    ///
    /// The caller supplies exactly the window to simulate. The cycle stops at
    /// the first year whose ending balance is zero or below.
    pub fn run_cycle(&self, start_year: i32, records: &[HistoricalYearRecord]) -> CycleResult {
        let mut state = CycleState::new(self.portfolio.initial_balance);
        let mut yearly_results = Vec::with_capacity(records.len());

        for record in records {
            let row = self.simulate_year(record, &mut state);
            yearly_results.push(row);

            // Depleted: remaining years are not simulated
            if row.ending_balance <= 0.0 {
                return CycleResult {
                    start_year,
                    success: false,
                    final_balance: 0.0,
                    yearly_results,
                    lowest_balance: state.lowest_balance,
                    highest_balance: state.highest_balance,
                    average_return: state.average_return(),
                };
            }

            state.advance(row.ending_balance, row.withdrawal);
        }

        CycleResult {
            start_year,
            success: true,
            final_balance: state.current_balance,
            yearly_results,
            lowest_balance: state.lowest_balance,
            highest_balance: state.highest_balance,
            average_return: state.average_return(),
        }
    }

    /// Withdraw, grow, and record a single year
    fn simulate_year(&self, record: &HistoricalYearRecord, state: &mut CycleState) -> YearlyResult {
        let blended_pct = self.returns.year_return_pct(record);

        // Policy sees this year's market and last year's inflation factor
        let context = state.withdrawal_context(blended_pct / 100.0);
        let withdrawal = calculate_withdrawal(&self.policy, &context);

        let balance_after_withdrawal = state.current_balance - withdrawal;
        let ending_balance = apply_return(balance_after_withdrawal, blended_pct);

        // (ending - after) / after is the blended rate for any non-zero base
        let year_return = if balance_after_withdrawal != 0.0 {
            (ending_balance - balance_after_withdrawal) / balance_after_withdrawal
        } else {
            blended_pct / 100.0
        };

        state.record_year(ending_balance, year_return, record.inflation_rate_pct);

        YearlyResult {
            year: record.year,
            starting_balance: state.current_balance,
            withdrawal,
            stock_return_pct: record.equity_nominal_return_pct,
            bond_return_pct: record.bond_nominal_return_pct,
            ending_balance,
            inflation_rate_pct: record.inflation_rate_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;

    fn good_years() -> Vec<HistoricalYearRecord> {
        vec![
            HistoricalYearRecord::new(1990, 10.0, 5.0, 2.0),
            HistoricalYearRecord::new(1991, 12.0, 6.0, 2.0),
            HistoricalYearRecord::new(1992, 15.0, 4.0, 3.0),
            HistoricalYearRecord::new(1993, 8.0, 5.0, 2.0),
            HistoricalYearRecord::new(1994, 9.0, 7.0, 2.0),
        ]
    }

    fn constant_dollar() -> WithdrawalPolicy {
        WithdrawalPolicy::Fixed { amount: 40_000.0, adjust_for_inflation: true }
    }

    #[test]
    fn test_fixed_inflation_adjusted_cycle_matches_hand_calculation() {
        let runner = CycleRunner::new(PortfolioConfig::default(), constant_dollar());
        let result = runner.run_cycle(1990, &good_years());

        assert!(result.success);
        assert_eq!(result.yearly_results.len(), 5);

        // 1990: blended 8%, (1,000,000 - 40,000) * 1.08
        let y = &result.yearly_results[0];
        assert_eq!(y.starting_balance, 1_000_000.0);
        assert_eq!(y.withdrawal, 40_000.0);
        assert_relative_eq!(y.ending_balance, 1_036_800.0, max_relative = 1e-12);

        // 1991: withdrawal grown by 1990 inflation only
        let y = &result.yearly_results[1];
        assert_relative_eq!(y.withdrawal, 40_800.0, max_relative = 1e-12);
        assert_relative_eq!(y.ending_balance, 1_091_616.0, max_relative = 1e-12);

        // 1992: 40,000 * 1.02^2
        let y = &result.yearly_results[2];
        assert_relative_eq!(y.withdrawal, 41_616.0, max_relative = 1e-12);
        assert_relative_eq!(y.ending_balance, 1_161_300.0, max_relative = 1e-12);

        let y = &result.yearly_results[3];
        assert_relative_eq!(y.withdrawal, 42_864.48, max_relative = 1e-12);
        assert_relative_eq!(y.ending_balance, 1_194_489.13536, max_relative = 1e-12);

        let y = &result.yearly_results[4];
        assert_relative_eq!(y.withdrawal, 43_721.7696, max_relative = 1e-12);
        assert_relative_eq!(y.ending_balance, 1_245_130.2897523209, max_relative = 1e-12);

        assert_relative_eq!(result.final_balance, 1_245_130.2897523209, max_relative = 1e-12);
        assert_eq!(result.lowest_balance, 1_000_000.0);
        assert_relative_eq!(result.highest_balance, result.final_balance);
        // Blends: 8, 9.6, 10.6, 6.8, 8.2
        assert_abs_diff_eq!(result.average_return, 0.0864, epsilon = 1e-12);
    }

    #[test]
    fn test_depleted_cycle_stops_in_failing_year() {
        let runner = CycleRunner::new(PortfolioConfig::new(100_000.0, 60.0, 40.0), constant_dollar());
        let result = runner.run_cycle(1990, &good_years());

        assert!(!result.success);
        assert_eq!(result.final_balance, 0.0);
        // 100,000 -> 64,800 -> 26,304 -> negative in 1992
        assert_eq!(result.yearly_results.len(), 3);
        assert_eq!(result.yearly_results[2].year, 1992);
        assert!(result.yearly_results[2].ending_balance <= 0.0);
        assert_relative_eq!(result.lowest_balance, -16_935.072, max_relative = 1e-9);
        assert_eq!(result.highest_balance, 100_000.0);
        // Average over the three processed years: 8, 9.6, 10.6
        assert_abs_diff_eq!(result.average_return, 0.094, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_without_inflation_is_constant() {
        let policy = WithdrawalPolicy::Fixed { amount: 35_000.0, adjust_for_inflation: false };
        let runner = CycleRunner::new(PortfolioConfig::default(), policy);
        let result = runner.run_cycle(1990, &good_years());
        assert!(result.yearly_results.iter().all(|y| y.withdrawal == 35_000.0));
    }

    #[test]
    fn test_percentage_tracks_starting_balance() {
        let runner = CycleRunner::new(
            PortfolioConfig::default(),
            WithdrawalPolicy::Percentage { rate_pct: 4.0 },
        );
        let result = runner.run_cycle(1990, &good_years());
        for y in &result.yearly_results {
            assert_relative_eq!(y.withdrawal, y.starting_balance * 0.04, max_relative = 1e-12);
        }
        for pair in result.yearly_results.windows(2) {
            assert_ne!(pair[0].withdrawal, pair[1].withdrawal);
        }
    }

    #[test]
    fn test_guardrails_first_withdrawal_ignores_base_amount() {
        let policy = WithdrawalPolicy::Guardrails {
            base_amount: 1.0,
            base_percentage: 5.0,
            floor_percentage: 3.0,
            ceiling_percentage: 6.0,
        };
        let runner = CycleRunner::new(PortfolioConfig::default(), policy);
        let result = runner.run_cycle(1990, &good_years());
        assert_eq!(result.yearly_results[0].withdrawal, 50_000.0);
    }

    #[test]
    fn test_guardrails_second_year_continues_inflated_withdrawal() {
        let policy = WithdrawalPolicy::Guardrails {
            base_amount: 40_000.0,
            base_percentage: 4.0,
            floor_percentage: 3.0,
            ceiling_percentage: 6.0,
        };
        let runner = CycleRunner::new(PortfolioConfig::default(), policy);
        let result = runner.run_cycle(1990, &good_years());
        // 40,000 / 1,036,800 = 3.86%, inside the corridor
        assert_relative_eq!(result.yearly_results[1].withdrawal, 40_800.0, max_relative = 1e-12);
    }

    #[test]
    fn test_variable_uses_performance_since_start() {
        let policy = WithdrawalPolicy::Variable {
            base_amount: 40_000.0,
            floor_amount: 30_000.0,
            ceiling_amount: 50_000.0,
            market_sensitivity: 0.5,
        };
        let runner = CycleRunner::new(PortfolioConfig::default(), policy);
        let result = runner.run_cycle(1990, &good_years());
        assert_eq!(result.yearly_results[0].withdrawal, 40_000.0);
        // 1991: base 40,800, performance +3.68%, half of it applied
        let expected = 40_800.0 * (1.0 + 0.0368 * 0.5);
        assert_relative_eq!(result.yearly_results[1].withdrawal, expected, max_relative = 1e-9);
    }

    #[test]
    fn test_withdrawal_equal_to_balance_fails_without_nan() {
        let policy = WithdrawalPolicy::Fixed { amount: 1_000_000.0, adjust_for_inflation: false };
        let runner = CycleRunner::new(PortfolioConfig::default(), policy);
        let result = runner.run_cycle(1990, &good_years());
        assert!(!result.success);
        assert_eq!(result.yearly_results.len(), 1);
        assert!(result.average_return.is_finite());
    }

    #[test]
    fn test_rerun_is_bit_identical() {
        let runner = CycleRunner::new(PortfolioConfig::default(), constant_dollar());
        let a = runner.run_cycle(1990, &good_years());
        let b = runner.run_cycle(1990, &good_years());
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_trace_stops_at_first_non_positive_balance(
            returns in proptest::collection::vec((-40i32..40, -10i32..15, 0i32..12), 1..30),
            balance in 1_000u32..2_000_000,
            amount in 1_000u32..150_000,
            stock in 0u32..=100,
        ) {
            let records: Vec<_> = returns
                .iter()
                .enumerate()
                .map(|(i, &(e, b, inf))| {
                    HistoricalYearRecord::new(1950 + i as i32, e as f64, b as f64, inf as f64)
                })
                .collect();
            let portfolio = PortfolioConfig::new(balance as f64, stock as f64, 100.0 - stock as f64);
            let policy = WithdrawalPolicy::Fixed { amount: amount as f64, adjust_for_inflation: true };
            let result = CycleRunner::new(portfolio, policy).run_cycle(1950, &records);

            let trace = &result.yearly_results;
            prop_assert!(!trace.is_empty() && trace.len() <= records.len());
            // Every year before the last kept a positive balance
            prop_assert!(trace[..trace.len() - 1].iter().all(|y| y.ending_balance > 0.0));

            if result.success {
                prop_assert_eq!(trace.len(), records.len());
                prop_assert!(trace.last().unwrap().ending_balance > 0.0);
                prop_assert_eq!(result.final_balance, trace.last().unwrap().ending_balance);
            } else {
                prop_assert!(trace.last().unwrap().ending_balance <= 0.0);
                prop_assert_eq!(result.final_balance, 0.0);
            }

            prop_assert!(result.lowest_balance <= balance as f64);
            prop_assert!(result.highest_balance >= balance as f64);
            for y in trace {
                prop_assert!(result.lowest_balance <= y.ending_balance);
                prop_assert!(result.highest_balance >= y.ending_balance);
            }
        }
    }
}
