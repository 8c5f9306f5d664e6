pub mod cache;
pub mod connectors;
pub mod provider;
pub mod series;

pub use cache::SeriesCache;
pub use connectors::{CsvConnector, DataValidator};
pub use provider::{CsvDirectoryProvider, InMemoryProvider, PriceDataProvider};
pub use series::PriceSeries;
