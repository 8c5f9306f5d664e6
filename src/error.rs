use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradegeneError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Degenerate benchmark: {0}")]
    DegenerateBenchmark(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("Backtest error: {0}")]
    BacktestError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, TradegeneError>;
