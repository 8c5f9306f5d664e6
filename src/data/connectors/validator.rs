use crate::error::{Result, TradegeneError};
use polars::prelude::*;
use super::types::{RequiredColumn, DATE_COLUMN_ALIASES};
use std::collections::HashMap;

pub struct DataValidator;

impl DataValidator {
    /// Validate that DataFrame has numeric OHLCV columns with sane relationships.
    /// Returns the actual column name found for each required column.
    pub fn validate_ohlcv(df: &DataFrame) -> Result<HashMap<RequiredColumn, String>> {
        let mut column_map = HashMap::new();

        for required in RequiredColumn::all() {
            let col_name = Self::find_column(df, &required).ok_or_else(|| {
                TradegeneError::DataLoading(format!(
                    "Missing required column: {} (tried aliases: {:?})",
                    required.as_str(),
                    required.aliases()
                ))
            })?;
            column_map.insert(required, col_name.to_string());
        }

        for (req_col, actual_name) in &column_map {
            let column = df.column(actual_name)?;
            if !matches!(
                column.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
            ) {
                return Err(TradegeneError::DataLoading(format!(
                    "Column '{}' ({}) must be numeric, found {:?}",
                    actual_name,
                    req_col.as_str(),
                    column.dtype()
                )));
            }
        }

        Self::validate_ohlc_relationships(df, &column_map)?;

        Ok(column_map)
    }

    /// Locate the date column by alias
    pub fn find_date_column(df: &DataFrame) -> Result<String> {
        let columns = df.get_column_names();
        DATE_COLUMN_ALIASES
            .iter()
            .find(|&&alias| columns.iter().any(|col| col.as_str() == alias))
            .map(|alias| alias.to_string())
            .ok_or_else(|| {
                TradegeneError::DataLoading(format!(
                    "Missing date column (tried aliases: {:?})",
                    DATE_COLUMN_ALIASES
                ))
            })
    }

    fn find_column(df: &DataFrame, required: &RequiredColumn) -> Option<&'static str> {
        let columns = df.get_column_names();
        required
            .aliases()
            .into_iter()
            .find(|alias| columns.iter().any(|col| col.as_str() == *alias))
    }

    /// high >= low, high >= open/close, low <= open/close
    fn validate_ohlc_relationships(
        df: &DataFrame,
        column_map: &HashMap<RequiredColumn, String>,
    ) -> Result<()> {
        let as_f64 = |required: RequiredColumn| -> Result<Column> {
            let name = column_map.get(&required).ok_or_else(|| {
                TradegeneError::DataLoading(format!("Column {} not mapped", required.as_str()))
            })?;
            Ok(df.column(name)?.cast(&DataType::Float64)?)
        };

        let high = as_f64(RequiredColumn::High)?;
        let low = as_f64(RequiredColumn::Low)?;
        let open = as_f64(RequiredColumn::Open)?;
        let close = as_f64(RequiredColumn::Close)?;

        let high = high.f64()?;
        let low = low.f64()?;
        let open = open.f64()?;
        let close = close.f64()?;

        for i in 0..df.height() {
            if let (Some(h), Some(l), Some(o), Some(c)) =
                (high.get(i), low.get(i), open.get(i), close.get(i))
            {
                if h < l {
                    return Err(TradegeneError::DataLoading(format!(
                        "Invalid data at row {}: high ({}) < low ({})",
                        i, h, l
                    )));
                }
                if h < o || h < c {
                    return Err(TradegeneError::DataLoading(format!(
                        "Invalid data at row {}: high ({}) < open ({}) or close ({})",
                        i, h, o, c
                    )));
                }
                if l > o || l > c {
                    return Err(TradegeneError::DataLoading(format!(
                        "Invalid data at row {}: low ({}) > open ({}) or close ({})",
                        i, l, o, c
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn validate_minimum_rows(df: &DataFrame, min_rows: usize) -> Result<()> {
        if df.height() < min_rows {
            return Err(TradegeneError::DataLoading(format!(
                "Insufficient data: {} rows, minimum {} required",
                df.height(),
                min_rows
            )));
        }
        Ok(())
    }

    /// Null count per column, only for columns that have any
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for col_name in df.get_column_names() {
            let null_count = df.column(col_name)?.null_count();
            if null_count > 0 {
                null_report.push((col_name.to_string(), null_count));
            }
        }

        Ok(null_report)
    }
}
