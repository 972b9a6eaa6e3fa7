//! Historical market series and the data-source seam
//!
//! The engine never owns the store of annual observations. It asks a
//! [`HistoricalDataSource`] for an ordered snapshot once per request and
//! treats the result as read-only.

pub mod loader;
pub mod metrics;

pub use loader::{LoadError, DEFAULT_SERIES_PATH};
pub use metrics::{calculate_period_metrics, notable_periods, Period, PeriodMetrics};

use crate::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Annual market and inflation observation for one calendar year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalYearRecord {
    /// Calendar year
    pub year: i32,

    /// Nominal equity total return in percent
    pub equity_nominal_return_pct: f64,

    /// Nominal bond return in percent
    pub bond_nominal_return_pct: f64,

    /// Inflation rate in percent
    pub inflation_rate_pct: f64,

    /// Price/earnings ratio, when the source carries valuation data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,

    /// Dividend yield in percent, when the source carries valuation data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
}

impl HistoricalYearRecord {
    pub fn new(year: i32, equity_pct: f64, bond_pct: f64, inflation_pct: f64) -> Self {
        Self {
            year,
            equity_nominal_return_pct: equity_pct,
            bond_nominal_return_pct: bond_pct,
            inflation_rate_pct: inflation_pct,
            pe_ratio: None,
            dividend_yield: None,
        }
    }
}

/// Half-open year filter `[gte, lt)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub gte: i32,
    pub lt: i32,
}

impl YearRange {
    pub fn new(gte: i32, lt: i32) -> Self {
        Self { gte, lt }
    }

    /// Range covering `duration` consecutive years from `start_year`
    pub fn window(start_year: i32, duration: u32) -> Self {
        let lt = (start_year as i64 + duration as i64).min(i32::MAX as i64) as i32;
        Self { gte: start_year, lt }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.gte && year < self.lt
    }
}

/// Ordered, duplicate-free snapshot of annual records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    records: Vec<HistoricalYearRecord>,
}

impl HistoricalSeries {
    /// Build a series, sorting by year and rejecting repeated years
    pub fn new(mut records: Vec<HistoricalYearRecord>) -> Result<Self> {
        records.sort_by_key(|r| r.year);
        if let Some(pair) = records.windows(2).find(|w| w[0].year == w[1].year) {
            return Err(SimulationError::DuplicateYear(pair[0].year));
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[HistoricalYearRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.records.first().map(|r| r.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.records.last().map(|r| r.year)
    }

    /// Record for a specific year
    pub fn get(&self, year: i32) -> Option<&HistoricalYearRecord> {
        self.records
            .binary_search_by_key(&year, |r| r.year)
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Records whose year falls in `range`, in ascending order
    pub fn range(&self, range: YearRange) -> &[HistoricalYearRecord] {
        let lo = self.records.partition_point(|r| r.year < range.gte);
        let hi = self.records.partition_point(|r| r.year < range.lt);
        if lo >= hi {
            &[]
        } else {
            &self.records[lo..hi]
        }
    }

    /// Records for `duration` years from `start_year`; shorter than
    /// `duration` when the series ends early or has gaps
    pub fn window(&self, start_year: i32, duration: u32) -> &[HistoricalYearRecord] {
        self.range(YearRange::window(start_year, duration))
    }
}

/// Read-only access to the store of annual observations
pub trait HistoricalDataSource: Send + Sync {
    /// Records ascending by year, optionally filtered to `range`
    fn fetch_series(&self, range: Option<YearRange>) -> Result<Vec<HistoricalYearRecord>>;
}

impl HistoricalDataSource for HistoricalSeries {
    fn fetch_series(&self, range: Option<YearRange>) -> Result<Vec<HistoricalYearRecord>> {
        Ok(match range {
            Some(range) => self.range(range).to_vec(),
            None => self.records.clone(),
        })
    }
}

/// Data source backed by a CSV file, re-read on every fetch
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Source reading from [`DEFAULT_SERIES_PATH`]
    pub fn default_path() -> Self {
        Self::new(DEFAULT_SERIES_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoricalDataSource for CsvSource {
    fn fetch_series(&self, range: Option<YearRange>) -> Result<Vec<HistoricalYearRecord>> {
        let records = loader::load_series(&self.path)
            .map_err(|e| SimulationError::DataSource(format!("{}: {}", self.path.display(), e)))?;
        let series = HistoricalSeries::new(records)?;
        series.fetch_series(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gapped_series() -> HistoricalSeries {
        HistoricalSeries::new(vec![
            HistoricalYearRecord::new(1993, 8.0, 5.0, 2.0),
            HistoricalYearRecord::new(1990, 10.0, 5.0, 2.0),
            HistoricalYearRecord::new(1991, 12.0, 6.0, 2.0),
            HistoricalYearRecord::new(1994, 9.0, 7.0, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_series_is_sorted_by_year() {
        let series = gapped_series();
        let years: Vec<i32> = series.records().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1990, 1991, 1993, 1994]);
        assert_eq!(series.first_year(), Some(1990));
        assert_eq!(series.last_year(), Some(1994));
    }

    #[test]
    fn test_duplicate_year_rejected() {
        let result = HistoricalSeries::new(vec![
            HistoricalYearRecord::new(1990, 10.0, 5.0, 2.0),
            HistoricalYearRecord::new(1990, 11.0, 5.0, 2.0),
        ]);
        assert_eq!(result, Err(SimulationError::DuplicateYear(1990)));
    }

    #[test]
    fn test_range_is_half_open() {
        let series = gapped_series();
        let slice = series.range(YearRange::new(1991, 1994));
        let years: Vec<i32> = slice.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1991, 1993]);

        assert!(series.range(YearRange::new(2000, 2010)).is_empty());
        assert!(series.range(YearRange::new(1994, 1990)).is_empty());
    }

    #[test]
    fn test_window_is_short_across_a_gap() {
        let series = gapped_series();
        assert_eq!(series.window(1990, 2).len(), 2);
        // 1992 is missing
        assert_eq!(series.window(1990, 4).len(), 3);
    }

    #[test]
    fn test_get_by_year() {
        let series = gapped_series();
        assert_eq!(series.get(1993).map(|r| r.equity_nominal_return_pct), Some(8.0));
        assert!(series.get(1992).is_none());
    }

    #[test]
    fn test_fetch_series_applies_filter() {
        let series = gapped_series();
        assert_eq!(series.fetch_series(None).unwrap().len(), 4);
        let filtered = series.fetch_series(Some(YearRange::window(1993, 5))).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_window_saturates_at_max_year() {
        let range = YearRange::window(i32::MAX - 1, 10);
        assert_eq!(range.lt, i32::MAX);
    }

    #[test]
    fn test_csv_source_reports_missing_file() {
        let source = CsvSource::new("does/not/exist.csv");
        match source.fetch_series(None) {
            Err(SimulationError::DataSource(msg)) => assert!(msg.contains("does/not/exist.csv")),
            other => panic!("expected data source error, got {:?}", other),
        }
    }
}
