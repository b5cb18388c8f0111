use crate::data::Dataset;
use crate::engines::induction::Id3Inducer;
use crate::engines::tree::DecisionTree;
use crate::error::{Result, TreevoError};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use std::sync::Arc;

/// Builds the initial population when no checkpoint exists
pub trait PopulationSeeder: Send + Sync {
    fn seed(&self, rng: &mut dyn RngCore) -> Result<Vec<DecisionTree>>;
}

/// Induces every individual with ID3 from a random sample of the training set
#[derive(Debug, Clone)]
pub struct Id3Seeder {
    training: Arc<Dataset>,
    population_size: usize,
    sample_fraction: f64,
}

impl Id3Seeder {
    pub fn new(training: Arc<Dataset>, population_size: usize) -> Self {
        Self {
            training,
            population_size,
            sample_fraction: 0.7,
        }
    }

    pub fn with_sample_fraction(mut self, fraction: f64) -> Self {
        self.sample_fraction = fraction;
        self
    }
}

impl PopulationSeeder for Id3Seeder {
    /// Runs on the current rayon pool
    fn seed(&self, rng: &mut dyn RngCore) -> Result<Vec<DecisionTree>> {
        if self.training.is_empty() {
            return Err(TreevoError::Configuration(
                "cannot seed a population without training data".to_string(),
            ));
        }
        let seeds: Vec<u64> = (0..self.population_size).map(|_| rng.gen()).collect();
        let inducer = Id3Inducer::new();
        seeds
            .into_par_iter()
            .enumerate()
            .map(|(i, seed)| {
                let mut rng = StdRng::seed_from_u64(seed);
                let sample = self.training.sample(self.sample_fraction, &mut rng);
                log::debug!("Inducing individual {} from {} rows", i, sample.len());
                inducer.induce(&sample)
            })
            .collect()
    }
}
