//! Per-variant withdrawal rules

use super::{WithdrawalContext, WithdrawalPolicy};

/// Withdrawal amount for the current year
///
/// Percentage-based variants may return zero or a negative amount once the
/// balance has gone non-positive; the cycle is already failing by then.
pub fn calculate_withdrawal(policy: &WithdrawalPolicy, context: &WithdrawalContext) -> f64 {
    match *policy {
        WithdrawalPolicy::Fixed {
            amount,
            adjust_for_inflation,
        } => fixed_withdrawal(amount, adjust_for_inflation, context),
        WithdrawalPolicy::Percentage { rate_pct } => percentage_withdrawal(rate_pct, context),
        WithdrawalPolicy::Variable {
            base_amount,
            floor_amount,
            ceiling_amount,
            market_sensitivity,
        } => variable_withdrawal(
            base_amount,
            floor_amount,
            ceiling_amount,
            market_sensitivity,
            context,
        ),
        WithdrawalPolicy::Guardrails {
            base_percentage,
            floor_percentage,
            ceiling_percentage,
            ..
        } => guardrails_withdrawal(base_percentage, floor_percentage, ceiling_percentage, context),
    }
}

fn fixed_withdrawal(amount: f64, adjust_for_inflation: bool, context: &WithdrawalContext) -> f64 {
    if adjust_for_inflation {
        amount * context.inflation_adjustment
    } else {
        amount
    }
}

fn percentage_withdrawal(rate_pct: f64, context: &WithdrawalContext) -> f64 {
    context.current_balance * rate_pct / 100.0
}

fn variable_withdrawal(
    base_amount: f64,
    floor_amount: f64,
    ceiling_amount: f64,
    market_sensitivity: f64,
    context: &WithdrawalContext,
) -> f64 {
    let base = base_amount * context.inflation_adjustment;

    // Relative gain or loss since the start of the cycle
    let performance =
        (context.current_balance - context.initial_balance) / context.initial_balance;
    let adjusted = base * (1.0 + performance * market_sensitivity);

    let floor = floor_amount * context.inflation_adjustment;
    let ceiling = ceiling_amount * context.inflation_adjustment;

    // Not f64::clamp: that panics when floor > ceiling
    adjusted.max(floor).min(ceiling)
}

fn guardrails_withdrawal(
    base_percentage: f64,
    floor_percentage: f64,
    ceiling_percentage: f64,
    context: &WithdrawalContext,
) -> f64 {
    // First withdrawal year
    if context.previous_withdrawal == 0.0 {
        return context.current_balance * base_percentage / 100.0;
    }

    let current_rate = context.previous_withdrawal / context.current_balance * 100.0;

    if current_rate > ceiling_percentage {
        // Cut spending
        context.current_balance * ceiling_percentage / 100.0
    } else if current_rate < floor_percentage {
        // Raise spending
        context.current_balance * floor_percentage / 100.0
    } else {
        context.previous_withdrawal * context.inflation_adjustment
    }
}
