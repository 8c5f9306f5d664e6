use crate::data::series::PriceSeries;
use crate::error::{Result, TradegeneError};
use crate::types::Bar;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::Path;
use super::{types::RequiredColumn, validator::DataValidator};

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| TradegeneError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load, validate and convert a CSV file into an ascending price series
    pub fn load_series<P: AsRef<Path>>(
        symbol: &str,
        path: P,
        min_rows: Option<usize>,
    ) -> Result<PriceSeries> {
        let df = Self::load(&path)?;

        DataValidator::validate_minimum_rows(&df, min_rows.unwrap_or(2))?;

        // Warn about nulls but don't fail; incomplete rows are dropped below
        let null_report = DataValidator::check_nulls(&df)?;
        if !null_report.is_empty() {
            log::warn!("Null values detected in {}: {:?}", symbol, null_report);
        }

        let df = Self::normalize_columns(df)?;
        Self::to_price_series(symbol, &df)
    }

    /// Rename OHLCV columns to their standard lowercase names
    pub fn normalize_columns(mut df: DataFrame) -> Result<DataFrame> {
        let column_map = DataValidator::validate_ohlcv(&df)?;

        for (required, actual_name) in column_map {
            let standard_name = required.as_str();
            if actual_name != standard_name {
                df.rename(&actual_name, standard_name.into())
                    .map_err(|e| TradegeneError::DataLoading(format!("Failed to rename column: {}", e)))?;
            }
        }

        Ok(df)
    }

    /// Convert a normalized DataFrame into bars. Row order in the file does not
    /// matter; the series is sorted ascending and duplicate dates are rejected.
    pub fn to_price_series(symbol: &str, df: &DataFrame) -> Result<PriceSeries> {
        let date_column = DataValidator::find_date_column(df)?;
        let dates = df.column(&date_column)?.cast(&DataType::String)?;
        let dates = dates.str()?;

        let numeric = |required: RequiredColumn| -> Result<Column> {
            Ok(df.column(required.as_str())?.cast(&DataType::Float64)?)
        };
        let open = numeric(RequiredColumn::Open)?;
        let high = numeric(RequiredColumn::High)?;
        let low = numeric(RequiredColumn::Low)?;
        let close = numeric(RequiredColumn::Close)?;
        let volume = numeric(RequiredColumn::Volume)?;

        let open = open.f64()?;
        let high = high.f64()?;
        let low = low.f64()?;
        let close = close.f64()?;
        let volume = volume.f64()?;

        let mut bars = Vec::with_capacity(df.height());
        let mut skipped = 0usize;

        for i in 0..df.height() {
            let (Some(raw_date), Some(close)) = (dates.get(i), close.get(i)) else {
                skipped += 1;
                continue;
            };
            let date = Self::parse_date(raw_date)?;
            bars.push(Bar {
                date,
                open: open.get(i).unwrap_or(close),
                high: high.get(i).unwrap_or(close),
                low: low.get(i).unwrap_or(close),
                close,
                volume: volume.get(i).unwrap_or(0.0),
            });
        }

        if skipped > 0 {
            log::warn!("Dropped {} incomplete rows for {}", skipped, symbol);
        }

        PriceSeries::new(symbol, bars)
    }

    /// Accepts `YYYY-MM-DD`, optionally followed by a time component
    pub fn parse_date(raw: &str) -> Result<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
            .map_err(|e| TradegeneError::DataLoading(format!("Unparseable date '{}': {}", raw, e)))
    }
}
