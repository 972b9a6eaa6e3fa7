//! Portfolio configuration and upstream validation

pub mod returns;

pub use returns::PortfolioReturnModel;

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Smallest starting balance accepted by validation
pub const MIN_INITIAL_BALANCE: f64 = 1_000.0;

/// Rebalancing approach exposed to configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalancingStrategy {
    Periodic,
    Threshold,
    None,
}

/// Rebalancing settings
///
/// Accepted and validated, but the return model always applies the blended
/// annual rate and never reads these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingConfig {
    pub strategy: RebalancingStrategy,
    /// Months between rebalances (periodic only)
    #[serde(default)]
    pub frequency: Option<u32>,
    /// Allowed drift in percent before rebalancing (threshold only)
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Signal driving a dynamic allocation shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DynamicAllocationType {
    Dividend,
    Valuation,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub low: f64,
    pub high: f64,
}

/// Dividend/valuation driven allocation shifting
///
/// Declared only, like [`RebalancingConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicAllocationConfig {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub allocation_type: DynamicAllocationType,
    pub dividend_thresholds: ThresholdBand,
    pub valuation_thresholds: ThresholdBand,
}

/// Starting balance and the growth/income split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioConfig {
    /// Starting balance
    pub initial_balance: f64,

    /// Equity weight in percent (0-100)
    pub stock_allocation: f64,

    /// Bond weight in percent (0-100)
    pub bond_allocation: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebalancing: Option<RebalancingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_allocation: Option<DynamicAllocationConfig>,
}

impl PortfolioConfig {
    pub fn new(initial_balance: f64, stock_allocation: f64, bond_allocation: f64) -> Self {
        Self {
            initial_balance,
            stock_allocation,
            bond_allocation,
            rebalancing: None,
            dynamic_allocation: None,
        }
    }

    /// Check the invariants the engine assumes hold
    pub fn validate(&self) -> Result<()> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(invalid("initial balance must be positive"));
        }
        if self.initial_balance < MIN_INITIAL_BALANCE {
            return Err(invalid("initial balance must be at least $1,000"));
        }
        if !(0.0..=100.0).contains(&self.stock_allocation) {
            return Err(invalid("stock allocation must be between 0 and 100"));
        }
        if !(0.0..=100.0).contains(&self.bond_allocation) {
            return Err(invalid("bond allocation must be between 0 and 100"));
        }
        // Exact comparison: allocations are whole percentages in practice
        if self.stock_allocation + self.bond_allocation != 100.0 {
            return Err(invalid("stock and bond allocations must sum to 100%"));
        }

        if let Some(rebalancing) = &self.rebalancing {
            match rebalancing.strategy {
                RebalancingStrategy::Periodic => match rebalancing.frequency {
                    Some(months) if (1..=12).contains(&months) => {}
                    Some(_) => return Err(invalid("rebalancing frequency must be 1-12 months")),
                    None => return Err(invalid("frequency required for periodic rebalancing")),
                },
                RebalancingStrategy::Threshold => match rebalancing.threshold {
                    Some(pct) if (1.0..=20.0).contains(&pct) => {}
                    Some(_) => return Err(invalid("rebalancing threshold must be 1-20%")),
                    None => {
                        return Err(invalid("threshold required for threshold-based rebalancing"))
                    }
                },
                RebalancingStrategy::None => {}
            }
        }

        if let Some(dynamic) = &self.dynamic_allocation {
            if dynamic.enabled {
                let check_dividend = matches!(
                    dynamic.allocation_type,
                    DynamicAllocationType::Dividend | DynamicAllocationType::Both
                );
                let check_valuation = matches!(
                    dynamic.allocation_type,
                    DynamicAllocationType::Valuation | DynamicAllocationType::Both
                );
                if check_dividend && dynamic.dividend_thresholds.low >= dynamic.dividend_thresholds.high {
                    return Err(invalid("low threshold must be less than high threshold"));
                }
                if check_valuation && dynamic.valuation_thresholds.low >= dynamic.valuation_thresholds.high {
                    return Err(invalid("low threshold must be less than high threshold"));
                }
            }
        }

        Ok(())
    }
}

impl Default for PortfolioConfig {
    /// $1M in a 60/40 split
    fn default() -> Self {
        Self::new(1_000_000.0, 60.0, 40.0)
    }
}

fn invalid(msg: &str) -> SimulationError {
    SimulationError::InvalidPortfolio(msg.to_string())
}
