use super::traits::ConfigSection;
use crate::error::TreevoError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Size of the seed population
    pub population_size: usize,
    /// Reproduction events per generation
    pub draws: usize,
    pub elitism: usize,
    /// Share of the training rows each seed tree is induced from
    pub induction_sample_fraction: f64,
    pub selection: SelectionMethod,
    pub crossover: CrossoverMethod,
    pub mutation: MutationMethod,
    pub fitness: FitnessMethod,
    pub stop: StopMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SelectionMethod {
    Wheel,
    Tournament { size: usize, prob: f64, winners: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CrossoverMethod {
    SemanticSubtree,
    SemanticSubtreeSameFeature,
    /// Swaps the split payload of two interior nodes
    RandomNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MutationMethod {
    /// Threshold shift of up to `scale` times the domain span
    Threshold { scale: f64 },
    FeatureSwap,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum FitnessMethod {
    Accuracy { power: i32 },
    WeightedFormula { alpha: f64, beta: f64 },
    RarityWeighted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum StopMethod {
    Generations { limit: usize },
    Fitness { threshold: f64 },
    Either { limit: usize, threshold: f64 },
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            draws: 25,
            elitism: 2,
            induction_sample_fraction: 0.7,
            selection: SelectionMethod::Wheel,
            crossover: CrossoverMethod::SemanticSubtree,
            mutation: MutationMethod::Threshold { scale: 0.1 },
            fitness: FitnessMethod::Accuracy { power: 2 },
            stop: StopMethod::Generations { limit: 100 },
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), TreevoError> {
        if self.population_size == 0 {
            return Err(TreevoError::Configuration(
                "Population size must be positive".to_string(),
            ));
        }
        if self.draws == 0 {
            return Err(TreevoError::Configuration(
                "At least one draw per generation is required".to_string(),
            ));
        }
        if !(self.induction_sample_fraction > 0.0 && self.induction_sample_fraction <= 1.0) {
            return Err(TreevoError::Configuration(
                "Induction sample fraction must be in (0, 1]".to_string(),
            ));
        }
        if let SelectionMethod::Tournament { size, prob, winners } = self.selection {
            if size == 0 || winners < 2 {
                return Err(TreevoError::Configuration(
                    "Tournament size must be positive and yield at least 2 winners".to_string(),
                ));
            }
            if !(prob > 0.0 && prob <= 1.0) {
                return Err(TreevoError::Configuration(
                    "Tournament probability must be in (0, 1]".to_string(),
                ));
            }
        }
        if let MutationMethod::Threshold { scale } = self.mutation {
            if !(scale >= 0.0) {
                return Err(TreevoError::Configuration(
                    "Mutation scale must be non-negative".to_string(),
                ));
            }
        }
        if let FitnessMethod::WeightedFormula { alpha, beta } = self.fitness {
            if alpha < 0.0 || beta < 0.0 || alpha + beta == 0.0 {
                return Err(TreevoError::Configuration(
                    "Fitness weights must be non-negative with a positive sum".to_string(),
                ));
            }
        }
        Ok(())
    }
}
