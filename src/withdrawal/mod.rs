//! Withdrawal policies
//!
//! A policy is a closed set of variants decoded from a JSON object tagged by
//! `type`. An unrecognized tag never falls back to a default policy.

mod strategies;

pub use strategies::calculate_withdrawal;

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Rule deciding how much to withdraw each simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum WithdrawalPolicy {
    /// Constant dollar amount, optionally grown with cumulative inflation
    Fixed {
        amount: f64,
        #[serde(default)]
        adjust_for_inflation: bool,
    },

    /// Fixed percentage of the balance at the start of each year
    Percentage {
        #[serde(alias = "amount")]
        rate_pct: f64,
    },

    /// Inflation-adjusted base scaled by portfolio performance, clamped to a band
    Variable {
        base_amount: f64,
        floor_amount: f64,
        ceiling_amount: f64,
        /// 0-1, how strongly performance moves spending
        market_sensitivity: f64,
    },

    /// Keep the current withdrawal rate inside a percentage corridor
    Guardrails {
        base_amount: f64,
        base_percentage: f64,
        floor_percentage: f64,
        ceiling_percentage: f64,
    },
}

/// Running state the policy sees at the start of a year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalContext {
    /// Balance before this year's withdrawal
    pub current_balance: f64,
    pub initial_balance: f64,
    /// Last year's withdrawal; zero in the first year
    pub previous_withdrawal: f64,
    /// Product of `1 + inflation` over the years already simulated
    pub inflation_adjustment: f64,
    /// This year's blended return as a decimal
    pub portfolio_return: f64,
}

impl WithdrawalPolicy {
    /// Decode a policy from JSON, mapping unknown tags and malformed payloads
    /// to `InvalidPolicyConfiguration`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::InvalidPolicyConfiguration(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| SimulationError::InvalidPolicyConfiguration(e.to_string()))
    }

    /// Discriminant as it appears in the `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            WithdrawalPolicy::Fixed { .. } => "fixed",
            WithdrawalPolicy::Percentage { .. } => "percentage",
            WithdrawalPolicy::Variable { .. } => "variable",
            WithdrawalPolicy::Guardrails { .. } => "guardrails",
        }
    }

    /// Parameter checks performed before a request reaches the engine
    pub fn validate(&self) -> Result<()> {
        match *self {
            WithdrawalPolicy::Fixed { amount, .. } => {
                require_positive("amount", amount)?;
            }
            WithdrawalPolicy::Percentage { rate_pct } => {
                require_positive("rate", rate_pct)?;
                if rate_pct > 100.0 {
                    return Err(invalid("percentage withdrawal must be between 0 and 100"));
                }
            }
            WithdrawalPolicy::Variable {
                base_amount,
                floor_amount,
                ceiling_amount,
                market_sensitivity,
            } => {
                require_positive("base amount", base_amount)?;
                require_positive("floor amount", floor_amount)?;
                require_positive("ceiling amount", ceiling_amount)?;
                if !(floor_amount <= base_amount && base_amount <= ceiling_amount) {
                    return Err(invalid("variable spending requires floor <= base <= ceiling"));
                }
                if !(0.0..=1.0).contains(&market_sensitivity) {
                    return Err(invalid("market sensitivity must be between 0 and 1"));
                }
            }
            WithdrawalPolicy::Guardrails {
                base_amount,
                base_percentage,
                floor_percentage,
                ceiling_percentage,
            } => {
                require_positive("base amount", base_amount)?;
                require_positive("base percentage", base_percentage)?;
                if base_percentage > 100.0 {
                    return Err(invalid("base percentage must be between 0 and 100"));
                }
                if !(floor_percentage < base_percentage && base_percentage < ceiling_percentage) {
                    return Err(invalid("guardrails require floor < base < ceiling percentage"));
                }
            }
        }
        Ok(())
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(&format!("{} must be positive", field)))
    }
}

fn invalid(msg: &str) -> SimulationError {
    SimulationError::InvalidPolicyConfiguration(msg.to_string())
}

/// A policy with its display metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedStrategy {
    pub name: &'static str,
    pub description: &'static str,
    pub policy: WithdrawalPolicy,
}

/// Ready-made policies offered to users
pub fn predefined_strategies() -> Vec<NamedStrategy> {
    vec![
        NamedStrategy {
            name: "Constant Dollar",
            description: "Withdraw a fixed amount each year, optionally adjusted for inflation",
            policy: WithdrawalPolicy::Fixed {
                amount: 40_000.0,
                adjust_for_inflation: true,
            },
        },
        NamedStrategy {
            name: "Percentage of Portfolio",
            description: "Withdraw a fixed percentage of the current portfolio value each year",
            policy: WithdrawalPolicy::Percentage { rate_pct: 4.0 },
        },
        NamedStrategy {
            name: "Variable Spending",
            description: "Adjust withdrawals based on portfolio performance with floor and ceiling limits",
            policy: WithdrawalPolicy::Variable {
                base_amount: 40_000.0,
                floor_amount: 30_000.0,
                ceiling_amount: 50_000.0,
                market_sensitivity: 0.5,
            },
        },
        NamedStrategy {
            name: "Guardrails",
            description: "Adjust spending when withdrawal rate exceeds certain thresholds",
            policy: WithdrawalPolicy::Guardrails {
                base_amount: 40_000.0,
                base_percentage: 4.0,
                floor_percentage: 3.0,
                ceiling_percentage: 6.0,
            },
        },
    ]
}
