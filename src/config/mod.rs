pub mod evolution;
pub mod experiment;
pub mod manager;
pub mod market;
pub mod traits;

pub use evolution::EvolutionSettings;
pub use experiment::ExperimentSettings;
pub use manager::{AppConfig, ConfigManager};
pub use market::{DateRange, MarketSettings};
pub use traits::ConfigSection;
