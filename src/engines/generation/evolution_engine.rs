use crate::config::{ConfigSection, EvolutionSettings};
use crate::engines::evaluation::Agent;
use crate::engines::generation::{
    genome::GenotypeKind,
    operators::{mutate_genotype, pick_two, portion, rank_by_fitness, shuffle_split, uniform_crossover},
};
use crate::error::{Result, TradegeneError};
use crate::functions::RuleRegistry;
use crate::types::GenerationRecord;
use rand::Rng;
use std::sync::Arc;

/// Sink for generation-by-generation telemetry
pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, record: &GenerationRecord);
    /// Fitness of the population left after the last evolution step
    fn on_final_evaluation(&mut self, record: &GenerationRecord);
}

/// One generational step over a population of rule-weighting agents.
///
/// The engine holds no random state; every stochastic choice draws from the
/// generator passed to [`EvolutionEngine::evolve`].
pub struct EvolutionEngine {
    settings: EvolutionSettings,
    registry: Arc<RuleRegistry>,
}

impl EvolutionEngine {
    pub fn new(settings: EvolutionSettings, registry: Arc<RuleRegistry>) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, registry })
    }

    pub fn settings(&self) -> &EvolutionSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Reject population sizes these rates cannot evolve: elites plus
    /// carried survivors larger than `n`, or children needed from fewer
    /// than two parents.
    pub fn check_population(&self, n: usize) -> Result<()> {
        let survivors = portion(n, self.settings.survival_rate);
        let parents = portion(survivors, self.settings.crossover_rate).min(survivors);
        let carry_over = survivors - parents;
        let elites = portion(n, self.settings.elitism_rate);

        let target = n.checked_sub(carry_over + elites).ok_or_else(|| {
            TradegeneError::Configuration(format!(
                "{} elites and {} carried survivors exceed the population of {}",
                elites, carry_over, n
            ))
        })?;
        if target > 0 && parents < 2 {
            return Err(TradegeneError::Configuration(format!(
                "Population of {} needs {} children but only {} crossover parents",
                n, target, parents
            )));
        }
        Ok(())
    }

    pub fn initialize_population<R: Rng + ?Sized>(
        &self,
        size: usize,
        kind: GenotypeKind,
        rng: &mut R,
    ) -> Result<Vec<Agent>> {
        self.check_population(size)?;
        (0..size).map(|_| Agent::random(kind, &self.registry, rng)).collect()
    }

    /// Next generation, the same size as `population`.
    ///
    /// `fitness[i]` scores `population[i]`. Elites are cloned unchanged and
    /// come first in the result.
    pub fn evolve<R: Rng + ?Sized>(
        &self,
        population: &[Agent],
        fitness: &[f64],
        rng: &mut R,
    ) -> Result<Vec<Agent>> {
        let n = population.len();
        if n == 0 {
            return Err(TradegeneError::Configuration("Cannot evolve an empty population".to_string()));
        }
        if fitness.len() != n {
            return Err(TradegeneError::Configuration(format!(
                "Got {} fitness values for {} agents",
                fitness.len(),
                n
            )));
        }
        self.check_population(n)?;

        let ranked = rank_by_fitness(fitness);
        let survivors: Vec<&Agent> = ranked[..portion(n, self.settings.survival_rate)]
            .iter()
            .map(|&i| &population[i])
            .collect();
        let elites: Vec<Agent> = ranked[..portion(n, self.settings.elitism_rate)]
            .iter()
            .map(|&i| population[i].clone())
            .collect();

        let (parents, carry_over) = shuffle_split(survivors, self.settings.crossover_rate, rng);

        let target = n.checked_sub(carry_over.len() + elites.len()).ok_or_else(|| {
            TradegeneError::Configuration(format!(
                "{} elites and {} carried survivors exceed the population of {}",
                elites.len(),
                carry_over.len(),
                n
            ))
        })?;

        let mut children = Vec::with_capacity(target);
        for _ in 0..target {
            let (p1, p2) = pick_two(&parents, rng)?;
            let genotype = uniform_crossover(p1.genotype(), p2.genotype(), rng)?;
            children.push(p1.derive(genotype, &self.registry)?);
        }

        let pool: Vec<Agent> = carry_over.into_iter().cloned().chain(children).collect();
        let (to_mutate, unchanged) = shuffle_split(pool, self.settings.mutation_rate, rng);

        log::debug!(
            "Evolve: {} survivors, {} elites, {} parents, {} children, {} mutated",
            portion(n, self.settings.survival_rate),
            elites.len(),
            parents.len(),
            target,
            to_mutate.len()
        );

        let mut next = elites;
        next.reserve(n - next.len());
        for agent in &to_mutate {
            let genotype = mutate_genotype(
                agent.genotype(),
                self.settings.mutation_bitwise_rate,
                &self.registry,
                rng,
            )?;
            next.push(agent.derive(genotype, &self.registry)?);
        }
        next.extend(unchanged);

        debug_assert_eq!(next.len(), n);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine(settings: EvolutionSettings) -> EvolutionEngine {
        EvolutionEngine::new(settings, Arc::new(RuleRegistry::standard())).unwrap()
    }

    #[test]
    fn test_invalid_rates_rejected() {
        let registry = Arc::new(RuleRegistry::standard());
        let bad = EvolutionSettings::new(0.5, 0.0, 0.2, 0.0, 0.5);
        assert!(EvolutionEngine::new(bad, registry).is_err());
    }

    #[test]
    fn test_population_size_is_preserved() {
        let engine = engine(EvolutionSettings::new(0.5, 0.5, 0.2, 0.3, 0.5));
        let mut rng = StdRng::seed_from_u64(11);
        let mut population = engine.initialize_population(20, GenotypeKind::Bit, &mut rng).unwrap();

        for _ in 0..5 {
            let fitness: Vec<f64> = (0..population.len()).map(|_| rng.gen::<f64>()).collect();
            population = engine.evolve(&population, &fitness, &mut rng).unwrap();
            assert_eq!(population.len(), 20);
            assert!(population.iter().all(|a| a.gene().len() == 10));
        }
    }

    #[test]
    fn test_fitness_length_mismatch() {
        let engine = engine(EvolutionSettings::default());
        let mut rng = StdRng::seed_from_u64(12);
        let population = engine.initialize_population(10, GenotypeKind::Real, &mut rng).unwrap();
        assert!(engine.evolve(&population, &[1.0, 2.0], &mut rng).is_err());
        assert!(engine.evolve(&[], &[], &mut rng).is_err());
    }

    #[test]
    fn test_check_population() {
        // survivors 3, parents 1, 3 children needed
        let engine = engine(EvolutionSettings::new(0.5, 0.5, 0.2, 0.2, 0.5));
        assert!(matches!(engine.check_population(6), Err(TradegeneError::Configuration(_))));
        assert!(engine.check_population(8).is_ok());
        assert!(engine.check_population(10).is_ok());

        // survivors 3, no parents, but carry-over and elites fill the population
        let engine = self::engine(EvolutionSettings::new(0.75, 0.2, 0.2, 0.25, 0.5));
        assert!(engine.check_population(4).is_ok());

        let crowded = self::engine(EvolutionSettings::new(0.9, 0.1, 0.2, 0.9, 0.5));
        assert!(crowded.check_population(10).is_err());
        let mut rng = StdRng::seed_from_u64(13);
        assert!(crowded.initialize_population(10, GenotypeKind::Bit, &mut rng).is_err());
    }
}
