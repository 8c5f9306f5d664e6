pub mod evaluation;
pub mod experiment;
pub mod generation;

pub use experiment::{Experiment, ExperimentReport, FitnessSummary};
