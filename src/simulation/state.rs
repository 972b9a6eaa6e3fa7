//! Running state of a single historical cycle

use crate::withdrawal::WithdrawalContext;

/// State carried from one simulated year to the next
#[derive(Debug, Clone)]
pub struct CycleState {
    /// Balance at the start of the current year
    pub current_balance: f64,

    /// Balance at the start of the cycle
    pub initial_balance: f64,

    /// Withdrawal taken in the prior year (0 before the first year)
    pub previous_withdrawal: f64,

    /// Cumulative inflation over years already simulated (1 in year one)
    pub inflation_adjustment: f64,

    /// Lowest balance seen, starting from the initial balance
    pub lowest_balance: f64,

    /// Highest balance seen, starting from the initial balance
    pub highest_balance: f64,

    /// Sum of per-year returns on the post-withdrawal balance
    pub total_return: f64,

    /// Years processed so far
    pub years_simulated: u32,
}

impl CycleState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            current_balance: initial_balance,
            initial_balance,
            previous_withdrawal: 0.0,
            inflation_adjustment: 1.0,
            lowest_balance: initial_balance,
            highest_balance: initial_balance,
            total_return: 0.0,
            years_simulated: 0,
        }
    }

    /// Context handed to the withdrawal policy for the current year
    pub fn withdrawal_context(&self, portfolio_return: f64) -> WithdrawalContext {
        WithdrawalContext {
            current_balance: self.current_balance,
            initial_balance: self.initial_balance,
            previous_withdrawal: self.previous_withdrawal,
            inflation_adjustment: self.inflation_adjustment,
            portfolio_return,
        }
    }

    /// Fold one year's outcome into the running statistics
    ///
    /// Must run before [`CycleState::advance`]: the inflation factor updated
    /// here applies from next year on.
    pub fn record_year(&mut self, ending_balance: f64, year_return: f64, inflation_rate_pct: f64) {
        self.inflation_adjustment *= 1.0 + inflation_rate_pct / 100.0;
        self.lowest_balance = self.lowest_balance.min(ending_balance);
        self.highest_balance = self.highest_balance.max(ending_balance);
        self.total_return += year_return;
        self.years_simulated += 1;
    }

    /// Carry this year's ending balance and withdrawal into the next year
    pub fn advance(&mut self, ending_balance: f64, withdrawal: f64) {
        self.current_balance = ending_balance;
        self.previous_withdrawal = withdrawal;
    }

    /// Mean per-year return over the years processed
    pub fn average_return(&self) -> f64 {
        if self.years_simulated == 0 {
            0.0
        } else {
            self.total_return / self.years_simulated as f64
        }
    }
}
