use crate::error::{Result, TradegeneError};
use crate::types::Bar;
use chrono::NaiveDate;

/// Date-indexed daily bars for one instrument, ascending by date.
///
/// Missing calendar days are simply absent; "next day" always means the next
/// bar present in the series.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, sorting bars ascending. Duplicate dates are rejected.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self> {
        let symbol = symbol.into();
        bars.sort_by_key(|bar| bar.date);

        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(TradegeneError::DataLoading(format!(
                "Duplicate bar for {} on {}",
                symbol, pair[0].date
            )));
        }

        Ok(Self { symbol, bars })
    }

    /// Convenience constructor for close-only series on consecutive dates.
    pub fn from_closes(symbol: impl Into<String>, first_date: NaiveDate, closes: &[f64]) -> Result<Self> {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let date = first_date + chrono::Days::new(i as u64);
                Bar::flat(date, close)
            })
            .collect();
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn close(&self, index: usize) -> Option<f64> {
        self.bars.get(index).map(|bar| bar.close)
    }

    /// Bars visible on day `index`: everything up to and including it.
    pub fn window(&self, index: usize) -> &[Bar] {
        let end = (index + 1).min(self.bars.len());
        &self.bars[..end]
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.bars.binary_search_by_key(&date, |bar| bar.date).ok()
    }

    /// Last bar dated on or before `date`.
    pub fn index_on_or_before(&self, date: NaiveDate) -> Option<usize> {
        let upper = self.bars.partition_point(|bar| bar.date <= date);
        upper.checked_sub(1)
    }

    /// First bar dated on or after `date`.
    pub fn index_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let lower = self.bars.partition_point(|bar| bar.date < date);
        (lower < self.bars.len()).then_some(lower)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }
}
