use super::traits::ConfigSection;
use crate::engines::generation::GenotypeKind;
use crate::error::{Result, TradegeneError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentSettings {
    pub population_size: usize,
    pub generations: usize,
    pub genotype: GenotypeKind,
    /// Fixed seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 20,
            genotype: GenotypeKind::Real,
            seed: None,
        }
    }
}

impl ConfigSection for ExperimentSettings {
    fn section_name() -> &'static str {
        "experiment"
    }

    fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(TradegeneError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
