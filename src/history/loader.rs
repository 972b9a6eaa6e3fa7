//! CSV-based historical series loader
//!
//! Loads annual return and inflation observations from a CSV file with a
//! `Year,EquityNominal,BondNominal,InflationRate` header. `PERatio` and
//! `DividendYield` columns are optional.

use super::HistoricalYearRecord;
use csv::Reader;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Default path to the bundled sample series
pub const DEFAULT_SERIES_PATH: &str = "data/historical/sample_series.csv";

/// Failure reading a series file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read series file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed series CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Percent columns must be finite numbers
    #[error("non-finite value in {column} for year {year}")]
    NonFinite { year: i32, column: &'static str },
}

/// Raw CSV row matching the series file columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "EquityNominal")]
    equity_nominal: f64,
    #[serde(rename = "BondNominal")]
    bond_nominal: f64,
    #[serde(rename = "InflationRate")]
    inflation_rate: f64,
    #[serde(rename = "PERatio", default)]
    pe_ratio: Option<f64>,
    #[serde(rename = "DividendYield", default)]
    dividend_yield: Option<f64>,
}

impl CsvRow {
    fn to_record(self) -> Result<HistoricalYearRecord, LoadError> {
        for (column, value) in [
            ("EquityNominal", self.equity_nominal),
            ("BondNominal", self.bond_nominal),
            ("InflationRate", self.inflation_rate),
        ] {
            if !value.is_finite() {
                return Err(LoadError::NonFinite { year: self.year, column });
            }
        }

        Ok(HistoricalYearRecord {
            year: self.year,
            equity_nominal_return_pct: self.equity_nominal,
            bond_nominal_return_pct: self.bond_nominal,
            inflation_rate_pct: self.inflation_rate,
            pe_ratio: self.pe_ratio,
            dividend_yield: self.dividend_yield,
        })
    }
}

/// Load all records from a CSV file, in file order
pub fn load_series<P: AsRef<Path>>(path: P) -> Result<Vec<HistoricalYearRecord>, LoadError> {
    let file = std::fs::File::open(path)?;
    load_series_from_reader(file)
}

/// Load records from any reader (e.g., string buffer, network stream)
pub fn load_series_from_reader<R: Read>(reader: R) -> Result<Vec<HistoricalYearRecord>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.to_record()?);
    }

    Ok(records)
}

/// Load the bundled sample series
pub fn load_default_series() -> Result<Vec<HistoricalYearRecord>, LoadError> {
    load_series(DEFAULT_SERIES_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_series() {
        let records = load_default_series().expect("Failed to load sample series");
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].year, 1990);
        assert_eq!(records[0].equity_nominal_return_pct, 10.0);
        assert_eq!(records[9].year, 1999);
    }

    #[test]
    fn test_optional_valuation_columns() {
        let data = "Year,EquityNominal,BondNominal,InflationRate,PERatio,DividendYield\n\
                    1990,10,5,2,15.5,3.1\n\
                    1991,12,6,2,,\n";
        let records = load_series_from_reader(data.as_bytes()).unwrap();
        assert_eq!(records[0].pe_ratio, Some(15.5));
        assert_eq!(records[0].dividend_yield, Some(3.1));
        assert_eq!(records[1].pe_ratio, None);
    }

    #[test]
    fn test_missing_valuation_columns() {
        let data = "Year,EquityNominal,BondNominal,InflationRate\n1990,-5.5,6,3\n";
        let records = load_series_from_reader(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].equity_nominal_return_pct, -5.5);
        assert!(records[0].dividend_yield.is_none());
    }

    #[test]
    fn test_rejects_non_numeric_cell() {
        let data = "Year,EquityNominal,BondNominal,InflationRate\n1990,abc,6,3\n";
        let err = load_series_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn test_rejects_non_finite_value() {
        let data = "Year,EquityNominal,BondNominal,InflationRate\n1990,10,NaN,3\n";
        let err = load_series_from_reader(data.as_bytes()).unwrap_err();
        match err {
            LoadError::NonFinite { year, column } => {
                assert_eq!(year, 1990);
                assert_eq!(column, "BondNominal");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
