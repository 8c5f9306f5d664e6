pub mod evolution_engine;
pub mod genome;
pub mod operators;
pub mod progress;

pub use evolution_engine::{EvolutionEngine, ProgressCallback};
pub use genome::{Gene, Genotype, GenotypeKind};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressMessage};
