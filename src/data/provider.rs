use super::{cache::SeriesCache, connectors::CsvConnector, series::PriceSeries};
use crate::error::{Result, TradegeneError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of historical bars for a symbol
pub trait PriceDataProvider: Send + Sync {
    fn read(&self, symbol: &str) -> Result<Arc<PriceSeries>>;
}

/// Reads `<data_dir>/<SYMBOL>.csv`, caching parsed series.
pub struct CsvDirectoryProvider {
    data_dir: PathBuf,
    cache: SeriesCache,
    min_rows: Option<usize>,
}

impl CsvDirectoryProvider {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            cache: SeriesCache::new(256),
            min_rows: None,
        }
    }

    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = Some(min_rows);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Every symbol with a CSV file in the data directory, sorted.
    pub fn list_symbols(&self) -> Result<Vec<String>> {
        let mut symbols = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if !is_csv {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }
}

impl PriceDataProvider for CsvDirectoryProvider {
    fn read(&self, symbol: &str) -> Result<Arc<PriceSeries>> {
        if let Some(series) = self.cache.get(symbol) {
            return Ok(series);
        }

        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(TradegeneError::DataUnavailable(format!(
                "No price file for {} at {}",
                symbol,
                path.display()
            )));
        }

        log::debug!("Loading {} from {}", symbol, path.display());
        let series = Arc::new(CsvConnector::load_series(symbol, &path, self.min_rows)?);
        self.cache.set(symbol.to_string(), Arc::clone(&series));
        Ok(series)
    }
}

/// Provider over series already held in memory
#[derive(Default)]
pub struct InMemoryProvider {
    series: HashMap<String, Arc<PriceSeries>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), Arc::new(series));
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.series.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl PriceDataProvider for InMemoryProvider {
    fn read(&self, symbol: &str) -> Result<Arc<PriceSeries>> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| TradegeneError::DataUnavailable(format!("Unknown symbol {}", symbol)))
    }
}
