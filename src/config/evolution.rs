use super::traits::{check_rate, ConfigSection};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Rates driving one generational step.
///
/// All counts derived from a rate are floored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionSettings {
    /// Fraction of the ranked population that survives selection
    pub survival_rate: f64,
    /// Fraction of survivors used as crossover parents
    pub crossover_rate: f64,
    /// Fraction of the non-elite pool that is mutated
    pub mutation_rate: f64,
    /// Fraction of the population copied unchanged; may be zero
    pub elitism_rate: f64,
    /// Per-locus probability of keeping a value during mutation
    pub mutation_bitwise_rate: f64,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        Self {
            survival_rate: 0.5,
            crossover_rate: 0.6,
            mutation_rate: 0.1,
            elitism_rate: 0.0,
            mutation_bitwise_rate: 0.5,
        }
    }
}

impl EvolutionSettings {
    pub fn new(
        survival_rate: f64,
        crossover_rate: f64,
        mutation_rate: f64,
        elitism_rate: f64,
        mutation_bitwise_rate: f64,
    ) -> Self {
        Self {
            survival_rate,
            crossover_rate,
            mutation_rate,
            elitism_rate,
            mutation_bitwise_rate,
        }
    }
}

impl ConfigSection for EvolutionSettings {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<()> {
        let section = Self::section_name();
        check_rate(section, "survival_rate", self.survival_rate, false)?;
        check_rate(section, "crossover_rate", self.crossover_rate, false)?;
        check_rate(section, "mutation_rate", self.mutation_rate, false)?;
        check_rate(section, "elitism_rate", self.elitism_rate, true)?;
        check_rate(section, "mutation_bitwise_rate", self.mutation_bitwise_rate, false)?;
        Ok(())
    }
}
