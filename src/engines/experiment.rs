use crate::config::ExperimentSettings;
use crate::engines::evaluation::{Agent, Market};
use crate::engines::generation::{EvolutionEngine, Genotype, ProgressCallback};
use crate::error::{Result, TradegeneError};
use crate::types::GenerationRecord;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Best and mean fitness of a population on one market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub best: f64,
    pub avg: f64,
}

impl FitnessSummary {
    pub fn from_fitness(fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self { best: f64::NAN, avg: f64::NAN };
        }
        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Summation error can push the mean of equal values past the max
        let avg = (fitness.iter().sum::<f64>() / fitness.len() as f64).min(best);
        Self { best, avg }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    /// One record per generation plus a trailing one for the final population
    pub history: Vec<GenerationRecord>,
    pub final_fitness: Vec<f64>,
    pub best_genotype: Option<Genotype>,
}

impl ExperimentReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Evaluate / evolve loop over one training market.
///
/// Owns the population and the random generator for the whole run.
pub struct Experiment {
    population: Vec<Agent>,
    engine: EvolutionEngine,
    market: Market,
    rng: StdRng,
}

impl Experiment {
    pub fn new(population: Vec<Agent>, engine: EvolutionEngine, market: Market, seed: Option<u64>) -> Result<Self> {
        Self::with_rng(population, engine, market, seeded_rng(seed))
    }

    /// Random initial population as described by `settings`
    pub fn from_settings(settings: &ExperimentSettings, engine: EvolutionEngine, market: Market) -> Result<Self> {
        let mut rng = seeded_rng(settings.seed);
        let population = engine.initialize_population(settings.population_size, settings.genotype, &mut rng)?;
        Self::with_rng(population, engine, market, rng)
    }

    fn with_rng(population: Vec<Agent>, engine: EvolutionEngine, market: Market, rng: StdRng) -> Result<Self> {
        if population.len() < 2 {
            return Err(TradegeneError::Configuration(format!(
                "Experiment needs at least 2 agents, got {}",
                population.len()
            )));
        }
        engine.check_population(population.len())?;
        Ok(Self {
            population,
            engine,
            market,
            rng,
        })
    }

    pub fn population(&self) -> &[Agent] {
        &self.population
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn run<C: ProgressCallback>(&mut self, generations: usize, callback: &mut C) -> Result<ExperimentReport> {
        let mut history = Vec::with_capacity(generations + 1);

        for generation in 0..generations {
            callback.on_generation_start(generation);

            let fitness = self.market.evaluate(&self.population);
            let record = generation_record(generation, &fitness);
            callback.on_generation_complete(&record);
            history.push(record);

            self.population = self.engine.evolve(&self.population, &fitness, &mut self.rng)?;
        }

        let final_fitness = self.market.evaluate(&self.population);
        let last = generation_record(generations, &final_fitness);
        callback.on_final_evaluation(&last);
        history.push(last);

        let best_genotype = best_index(&final_fitness).map(|i| self.population[i].genotype().clone());

        Ok(ExperimentReport {
            history,
            final_fitness,
            best_genotype,
        })
    }

    /// Score the current population on another market, e.g. a test window
    pub fn evaluate_on(&self, market: &Market) -> FitnessSummary {
        FitnessSummary::from_fitness(&market.evaluate(&self.population))
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn generation_record(generation: usize, fitness: &[f64]) -> GenerationRecord {
    let summary = FitnessSummary::from_fitness(fitness);
    GenerationRecord {
        generation,
        best: summary.best,
        avg: summary.avg,
    }
}

fn best_index(fitness: &[f64]) -> Option<usize> {
    fitness
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}
