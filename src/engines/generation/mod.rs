pub mod crossover;
pub mod evolution_engine;
pub mod mutation;
pub mod progress;
pub mod seeding;
pub mod selection;
pub mod stop;

pub use crossover::{
    classification_path, Crossover, RandomNodeCrossover, SemanticSubtreeCrossover,
    SemanticSubtreeSameFeature,
};
pub use evolution_engine::{
    EngineSettings, EngineState, EvolutionEngine, GenerationReport, Operators, RunSummary,
};
pub use mutation::{FeatureSwapMutation, Mutation, NoMutation, ThresholdMutation};
pub use progress::{LogProgressCallback, ProgressCallback, SilentProgressCallback};
pub use seeding::{Id3Seeder, PopulationSeeder};
pub use selection::{Selection, TournamentSelection, WheelSelection};
pub use stop::{AnyOf, FitnessThreshold, GenerationLimit, StopCondition};
