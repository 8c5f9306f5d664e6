use super::{
    evolution::EvolutionSettings, experiment::ExperimentSettings, market::MarketSettings,
    traits::ConfigSection,
};
use crate::error::{Result, TradegeneError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Prefix for environment overrides, e.g. `TRADEGENE__EXPERIMENT__SEED=7`
pub const ENV_PREFIX: &str = "TRADEGENE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionSettings,
    pub market: MarketSettings,
    pub experiment: ExperimentSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.evolution.validate()?;
        self.market.validate()?;
        self.experiment.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Load a TOML (or JSON) file, layering `TRADEGENE__*` environment
    /// variables on top. Missing keys keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TradegeneError::Configuration(format!(
                "Config file {} not found",
                path.display()
            )));
        }

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());

        *self.write()? = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(&*self.read()?)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig> {
        Ok(self.read()?.clone())
    }

    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.write()?;
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, AppConfig>> {
        self.config
            .read()
            .map_err(|_| TradegeneError::Configuration("Config lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, AppConfig>> {
        self.config
            .write()
            .map_err(|_| TradegeneError::Configuration("Config lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::BenchmarkPolicy;
    use crate::engines::generation::GenotypeKind;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[evolution]
survival_rate = 0.4
elitism_rate = 0.1

[market]
symbols = ["AAPL", "MSFT"]
benchmark_policy = "fail"

[market.train]
start = "2016-01-04"
end = "2016-06-30"

[experiment]
genotype = "Complex"
seed = 42
"#
        )
        .unwrap();

        let manager = ConfigManager::new();
        manager.load_from_file(file.path()).unwrap();
        let config = manager.get().unwrap();

        assert_eq!(config.evolution.survival_rate, 0.4);
        assert_eq!(config.evolution.mutation_bitwise_rate, 0.5);
        assert_eq!(config.market.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(config.market.benchmark_policy, BenchmarkPolicy::Fail);
        assert_eq!(config.market.train.start.to_string(), "2016-01-04");
        assert_eq!(config.experiment.genotype, GenotypeKind::Complex);
        assert_eq!(config.experiment.seed, Some(42));
        assert_eq!(config.experiment.population_size, 50);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[evolution]\nsurvival_rate = 1.5").unwrap();

        let manager = ConfigManager::new();
        assert!(manager.load_from_file(file.path()).is_err());
        assert_eq!(manager.get().unwrap().evolution.survival_rate, 0.5);
        assert!(manager.load_from_file("does/not/exist.toml").is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tradegene.toml");

        let manager = ConfigManager::new();
        manager
            .update(|c| {
                c.experiment.population_size = 12;
                c.evolution.elitism_rate = 0.25;
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let reloaded = ConfigManager::new();
        reloaded.load_from_file(&path).unwrap();
        let config = reloaded.get().unwrap();
        assert_eq!(config.experiment.population_size, 12);
        assert_eq!(config.evolution.elitism_rate, 0.25);
    }

    #[test]
    fn test_update_validates() {
        let manager = ConfigManager::new();
        assert!(manager.update(|c| c.experiment.population_size = 1).is_err());
        assert_eq!(manager.get().unwrap().experiment.population_size, 50);
    }
}
