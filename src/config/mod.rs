pub mod evolution;
pub mod features;
pub mod manager;
pub mod run;
pub mod traits;

pub use evolution::{
    CrossoverMethod, EvolutionConfig, FitnessMethod, MutationMethod, SelectionMethod, StopMethod,
};
pub use features::FeaturesConfig;
pub use manager::{AppConfig, ConfigManager};
pub use run::RunConfig;
pub use traits::ConfigSection;
