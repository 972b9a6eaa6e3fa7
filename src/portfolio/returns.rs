//! Blended annual return of a two-asset portfolio

use super::PortfolioConfig;
use crate::history::HistoricalYearRecord;

/// Fixed-weight return model: one blended rate per year, no intra-year
/// rebalancing and no transaction costs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioReturnModel {
    /// Equity weight in percent
    pub stock_allocation: f64,
    /// Bond weight in percent
    pub bond_allocation: f64,
}

impl PortfolioReturnModel {
    pub fn from_portfolio(portfolio: &PortfolioConfig) -> Self {
        Self {
            stock_allocation: portfolio.stock_allocation,
            bond_allocation: portfolio.bond_allocation,
        }
    }

    /// Weighted nominal return in percent
    pub fn blended_return_pct(&self, equity_return_pct: f64, bond_return_pct: f64) -> f64 {
        equity_return_pct * self.stock_allocation / 100.0
            + bond_return_pct * self.bond_allocation / 100.0
    }

    /// Blended return for one year of the series
    pub fn year_return_pct(&self, record: &HistoricalYearRecord) -> f64 {
        self.blended_return_pct(record.equity_nominal_return_pct, record.bond_nominal_return_pct)
    }
}

/// Grow a post-withdrawal balance by a blended percent return
pub fn apply_return(balance_after_withdrawal: f64, blended_return_pct: f64) -> f64 {
    balance_after_withdrawal * (1.0 + blended_return_pct / 100.0)
}
