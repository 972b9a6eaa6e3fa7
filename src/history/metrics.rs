//! Average market conditions over named historical periods

use super::{HistoricalSeries, YearRange};
use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};

/// Named inclusive year range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start_year: i32,
    pub end_year: i32,
    pub name: String,
}

impl Period {
    pub fn new(start_year: i32, end_year: i32, name: &str) -> Self {
        Self {
            start_year,
            end_year,
            name: name.to_string(),
        }
    }
}

/// Simple averages over the records of a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetrics {
    pub stock_returns: f64,
    pub bond_returns: f64,
    pub inflation: f64,
    /// Average over the years that carry a P/E ratio
    pub pe_ratio: Option<f64>,
    /// Average over the years that carry a dividend yield
    pub dividend_yield: Option<f64>,
    pub years: usize,
}

/// Average returns and inflation for `start_year..=end_year`
pub fn calculate_period_metrics(
    series: &HistoricalSeries,
    start_year: i32,
    end_year: i32,
) -> Result<PeriodMetrics> {
    let upper = (end_year as i64 + 1).min(i32::MAX as i64) as i32;
    let data = series.range(YearRange::new(start_year, upper));
    if data.is_empty() {
        return Err(SimulationError::NoDataForPeriod { start_year, end_year });
    }

    let n = data.len() as f64;
    let stock_returns = data.iter().map(|r| r.equity_nominal_return_pct).sum::<f64>() / n;
    let bond_returns = data.iter().map(|r| r.bond_nominal_return_pct).sum::<f64>() / n;
    let inflation = data.iter().map(|r| r.inflation_rate_pct).sum::<f64>() / n;

    Ok(PeriodMetrics {
        stock_returns,
        bond_returns,
        inflation,
        pe_ratio: mean_of_present(data.iter().map(|r| r.pe_ratio)),
        dividend_yield: mean_of_present(data.iter().map(|r| r.dividend_yield)),
        years: data.len(),
    })
}

fn mean_of_present<I: Iterator<Item = Option<f64>>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Market episodes commonly used to stress a withdrawal plan
pub fn notable_periods() -> Vec<Period> {
    vec![
        Period::new(1929, 1932, "Great Depression"),
        Period::new(1970, 1980, "High Inflation Era"),
        Period::new(1990, 2000, "Tech Boom"),
        Period::new(2000, 2002, "Dot-com Crash"),
        Period::new(2008, 2009, "Financial Crisis"),
        Period::new(2020, 2021, "COVID-19 Crisis"),
    ]
}
