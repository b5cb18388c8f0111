//! Wiring of a configured run: datasets, operators and the engine.

use crate::config::{
    AppConfig, CrossoverMethod, EvolutionConfig, FitnessMethod, MutationMethod, RunConfig,
    SelectionMethod, StopMethod,
};
use crate::data::{CsvConnector, Dataset};
use crate::engines::checkpoint::CheckpointStore;
use crate::engines::evaluation::{AccuracyFitness, Fitness, RarityWeightedAccuracy, WeightedFormula};
use crate::engines::generation::{
    AnyOf, Crossover, EngineSettings, EvolutionEngine, FeatureSwapMutation, FitnessThreshold,
    GenerationLimit, Id3Seeder, Mutation, NoMutation, Operators, RandomNodeCrossover, Selection,
    SemanticSubtreeCrossover, SemanticSubtreeSameFeature, StopCondition, ThresholdMutation,
    TournamentSelection, WheelSelection,
};
use crate::engines::pruning::Pruner;
use crate::engines::tree::FeatureSet;
use crate::error::{Result, TreevoError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Training and held-out partitions of a run
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub training: Arc<Dataset>,
    pub testing: Arc<Dataset>,
}

/// Loads the recorded dataset and splits off the held-out partition. A run
/// that already saved `testing.csv` keeps it and trains on the other rows.
pub fn prepare_data(
    run: &RunConfig,
    store: &CheckpointStore,
    features: Arc<FeatureSet>,
) -> Result<PreparedData> {
    let dataset = CsvConnector::load_dataset(run.dataset_path(), Arc::clone(&features))?;
    if dataset.is_empty() {
        return Err(TreevoError::Configuration(format!(
            "Dataset {} has no rows",
            run.dataset_path().display()
        )));
    }

    let (training, testing) = match store.load_testing(Arc::clone(&features))? {
        Some(testing) => {
            log::info!("Reusing held-out partition of {} rows", testing.len());
            (dataset.without(&testing), testing)
        }
        None => {
            let mut rng = match run.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let (training, testing) = dataset.split(run.test_fraction, &mut rng);
            if training.is_empty() {
                return Err(empty_training(dataset.len(), run.test_fraction));
            }
            store.save_testing(&testing)?;
            (training, testing)
        }
    };
    if training.is_empty() {
        return Err(empty_training(dataset.len(), run.test_fraction));
    }
    log::info!(
        "Training on {} rows, {} held out",
        training.len(),
        testing.len()
    );
    Ok(PreparedData {
        training: Arc::new(training),
        testing: Arc::new(testing),
    })
}

fn empty_training(rows: usize, test_fraction: f64) -> TreevoError {
    TreevoError::Configuration(format!(
        "No training rows left out of {} with test fraction {}",
        rows, test_fraction
    ))
}

pub fn build_operators(evolution: &EvolutionConfig, data: &PreparedData, pruner: Pruner) -> Operators {
    let training = &data.training;

    let selection: Box<dyn Selection> = match evolution.selection {
        SelectionMethod::Wheel => Box::new(WheelSelection),
        SelectionMethod::Tournament { size, prob, winners } => {
            Box::new(TournamentSelection::new(size, prob).with_winners(winners))
        }
    };
    let crossover: Box<dyn Crossover> = match evolution.crossover {
        CrossoverMethod::SemanticSubtree => Box::new(SemanticSubtreeCrossover::new(
            Arc::clone(training),
            pruner.clone(),
        )),
        CrossoverMethod::SemanticSubtreeSameFeature => Box::new(SemanticSubtreeSameFeature::new(
            Arc::clone(training),
            pruner.clone(),
        )),
        CrossoverMethod::RandomNode => Box::new(RandomNodeCrossover::new(pruner.clone())),
    };
    let mutation: Box<dyn Mutation> = match evolution.mutation {
        MutationMethod::Threshold { scale } => Box::new(ThresholdMutation::new(scale, pruner)),
        MutationMethod::FeatureSwap => Box::new(FeatureSwapMutation::new(pruner)),
        MutationMethod::None => Box::new(NoMutation),
    };
    let fitness: Box<dyn Fitness> = match evolution.fitness {
        FitnessMethod::Accuracy { power } => {
            Box::new(AccuracyFitness::with_power(Arc::clone(training), power))
        }
        FitnessMethod::WeightedFormula { alpha, beta } => Box::new(WeightedFormula::new(
            alpha,
            beta,
            Arc::clone(&data.testing),
            Arc::clone(training),
        )),
        FitnessMethod::RarityWeighted => Box::new(RarityWeightedAccuracy::new(Arc::clone(training))),
    };
    let stop: Box<dyn StopCondition> = match evolution.stop {
        StopMethod::Generations { limit } => Box::new(GenerationLimit(limit)),
        StopMethod::Fitness { threshold } => Box::new(FitnessThreshold(threshold)),
        StopMethod::Either { limit, threshold } => Box::new(AnyOf(vec![
            Box::new(GenerationLimit(limit)),
            Box::new(FitnessThreshold(threshold)),
        ])),
    };
    let seeder = Box::new(
        Id3Seeder::new(Arc::clone(training), evolution.population_size)
            .with_sample_fraction(evolution.induction_sample_fraction),
    );

    Operators {
        seeder,
        fitness,
        selection,
        crossover,
        mutation,
        stop,
    }
}

/// Validated configuration to a ready engine plus its data partitions
pub fn build_engine(config: &AppConfig) -> Result<(EvolutionEngine, PreparedData)> {
    config.validate()?;
    let features = Arc::new(config.features.to_feature_set()?);
    let store = CheckpointStore::open(&config.run.run_dir)?;
    let data = prepare_data(&config.run, &store, Arc::clone(&features))?;

    let pruner = match &config.run.postmortem_dir {
        Some(dir) => Pruner::with_postmortem_dir(dir),
        None => Pruner::with_postmortem_dir(config.run.run_dir.join("postmortem")),
    };
    let operators = build_operators(&config.evolution, &data, pruner);
    let settings = EngineSettings {
        draws: config.evolution.draws,
        elitism: config.evolution.elitism,
        workers: config.run.workers,
        seed: config.run.seed,
    };
    let engine = EvolutionEngine::new(settings, operators, store, features)?;
    Ok((engine, data))
}
