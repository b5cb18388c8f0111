use super::crossover::Crossover;
use super::mutation::Mutation;
use super::progress::ProgressCallback;
use super::seeding::PopulationSeeder;
use super::selection::Selection;
use super::stop::StopCondition;
use crate::engines::checkpoint::{CheckpointStore, HistoryRecord};
use crate::engines::evaluation::Fitness;
use crate::engines::tree::{DecisionTree, FeatureSet};
use crate::error::{Result, TreevoError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Run-level knobs of the engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Reproduction events per generation
    pub draws: usize,
    /// Individuals carried over unmodified
    pub elitism: usize,
    /// Worker threads; 0 uses the host parallelism
    pub workers: usize,
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            draws: 25,
            elitism: 0,
            workers: 0,
            seed: None,
        }
    }
}

/// Strategies plugged into the engine
pub struct Operators {
    pub seeder: Box<dyn PopulationSeeder>,
    pub fitness: Box<dyn Fitness>,
    pub selection: Box<dyn Selection>,
    pub crossover: Box<dyn Crossover>,
    pub mutation: Box<dyn Mutation>,
    pub stop: Box<dyn StopCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Initializing,
    Evaluating,
    Reproducing,
    ApplyingElitism,
    Checkpointing,
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    pub best_fitness: f64,
    pub avg_fitness: f64,
    /// Index of the best individual in the evaluated population
    pub best_index: usize,
    /// Indices, in the evaluated population, of the individuals carried over
    pub elite_indices: Vec<usize>,
    /// Size of the population produced by this generation
    pub population_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub generations_run: usize,
    pub final_generation: usize,
    pub best_fitness: f64,
    pub avg_fitness: f64,
    pub population_size: usize,
}

pub struct EvolutionEngine {
    settings: EngineSettings,
    operators: Operators,
    store: CheckpointStore,
    features: Arc<FeatureSet>,
    pool: ThreadPool,
    rng: StdRng,
    population: Vec<DecisionTree>,
    generation: usize,
    best_fitness: f64,
    avg_fitness: f64,
    state: EngineState,
    initialized: bool,
}

impl EvolutionEngine {
    pub fn new(
        settings: EngineSettings,
        operators: Operators,
        store: CheckpointStore,
        features: Arc<FeatureSet>,
    ) -> Result<Self> {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(settings.workers)
            .build()
            .map_err(|e| TreevoError::Generation(format!("Failed to build worker pool: {}", e)))?;

        Ok(Self {
            settings,
            operators,
            store,
            features,
            pool,
            rng,
            population: Vec::new(),
            generation: 0,
            best_fitness: 0.0,
            avg_fitness: 0.0,
            state: EngineState::Initializing,
            initialized: false,
        })
    }

    pub fn population(&self) -> &[DecisionTree] {
        &self.population
    }

    /// Number of the last completed generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    pub fn avg_fitness(&self) -> f64 {
        self.avg_fitness
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Loads the latest checkpointed population (or the seed population),
    /// seeding and persisting a fresh one when neither exists, and resumes
    /// the counters from the last history record.
    pub fn initialize(&mut self) -> Result<()> {
        self.state = EngineState::Initializing;
        self.store.recover()?;

        self.population = match self.store.load_population(&self.features)? {
            Some(population) => population,
            None => {
                log::info!("No checkpointed population; seeding a new one");
                let seeder = &self.operators.seeder;
                let rng = &mut self.rng;
                let seeded = self.pool.install(|| seeder.seed(rng))?;
                if seeded.is_empty() {
                    return Err(TreevoError::Configuration(
                        "population seeder produced no individuals".to_string(),
                    ));
                }
                self.store.save_first_generation(&seeded)?;
                seeded
            }
        };

        match self.store.load_history()?.pop() {
            Some(last) => {
                self.generation = last.generation;
                self.best_fitness = last.best_fitness;
                self.avg_fitness = last.avg_fitness;
                log::info!(
                    "Resuming evolution: generation {}, best fitness {:.4}, average fitness {:.4}",
                    self.generation,
                    self.best_fitness,
                    self.avg_fitness
                );
            }
            None => {
                self.generation = 0;
                self.best_fitness = 0.0;
                self.avg_fitness = 0.0;
                log::info!("Starting evolution with {} individuals", self.population.len());
            }
        }
        self.initialized = true;
        Ok(())
    }

    /// Runs one full generation. Nothing is checkpointed unless every
    /// evaluation and reproduction task succeeds.
    pub fn step(&mut self) -> Result<GenerationReport> {
        if !self.initialized {
            self.initialize()?;
        }
        if self.population.is_empty() {
            return Err(TreevoError::Generation("population is empty".to_string()));
        }
        let generation = self.generation + 1;

        self.state = EngineState::Evaluating;
        let fitness = self.evaluate_population()?;

        self.state = EngineState::Reproducing;
        let mut next = self.reproduce(&fitness)?;

        self.state = EngineState::ApplyingElitism;
        let elite_indices = self.elite_indices(&fitness);
        next.extend(elite_indices.iter().map(|&i| self.population[i].clone()));
        if next.is_empty() {
            return Err(TreevoError::Configuration(
                "generation produced no individuals; check draws and elitism".to_string(),
            ));
        }

        let best_index = best_index(&fitness);
        let best_fitness = fitness[best_index];
        let avg_fitness = fitness.iter().sum::<f64>() / fitness.len() as f64;

        self.state = EngineState::Checkpointing;
        self.store.write_partial(&next, generation)?;
        self.store.append_history(&HistoryRecord {
            generation,
            best_fitness,
            best_tree: self.population[best_index].to_snapshot(),
            avg_fitness,
        })?;
        self.store.commit_partial()?;

        self.population = next;
        self.generation = generation;
        self.best_fitness = best_fitness;
        self.avg_fitness = avg_fitness;

        Ok(GenerationReport {
            generation,
            best_fitness,
            avg_fitness,
            best_index,
            elite_indices,
            population_size: self.population.len(),
        })
    }

    /// Evolves until the stop condition holds
    pub fn run<C: ProgressCallback>(&mut self, callback: &mut C) -> Result<RunSummary> {
        if !self.initialized {
            self.initialize()?;
        }
        let start = self.generation;

        while !self
            .operators
            .stop
            .should_stop(self.generation, self.best_fitness, self.avg_fitness)
        {
            callback.on_generation_start(self.generation + 1);
            let report = self.step()?;
            callback.on_generation_complete(&report);
        }

        self.state = EngineState::Stopped;
        log::info!(
            "Evolution stopped at generation {} (best fitness {:.4})",
            self.generation,
            self.best_fitness
        );
        Ok(RunSummary {
            generations_run: self.generation - start,
            final_generation: self.generation,
            best_fitness: self.best_fitness,
            avg_fitness: self.avg_fitness,
            population_size: self.population.len(),
        })
    }

    fn evaluate_population(&self) -> Result<Vec<f64>> {
        let fitness = &self.operators.fitness;
        let population = &self.population;
        self.pool.install(|| {
            population
                .par_iter()
                .map(|tree| fitness.evaluate(tree))
                .collect::<Result<Vec<_>>>()
        })
    }

    fn reproduce(&mut self, fitness: &[f64]) -> Result<Vec<DecisionTree>> {
        let seeds: Vec<u64> = (0..self.settings.draws).map(|_| self.rng.gen()).collect();
        let operators = &self.operators;
        let population = &self.population;

        let offspring: Vec<Vec<DecisionTree>> = self.pool.install(|| {
            seeds
                .par_iter()
                .map(|&seed| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let parents = operators.selection.select(fitness, &mut rng)?;
                    let (Some(first), Some(second)) = (
                        parents.first().and_then(|&i| population.get(i)),
                        parents.get(1).and_then(|&i| population.get(i)),
                    ) else {
                        return Err(TreevoError::Selection(format!(
                            "selection returned {:?} for a population of {}",
                            parents,
                            population.len()
                        )));
                    };
                    let mut children = operators.crossover.crossover(first, second, &mut rng)?;
                    for child in children.iter_mut() {
                        operators.mutation.mutate(child, &mut rng)?;
                    }
                    Ok(children)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        Ok(offspring.into_iter().flatten().collect())
    }

    /// Top individuals by fitness; the whole population when it is smaller
    /// than the elitism size
    fn elite_indices(&self, fitness: &[f64]) -> Vec<usize> {
        let k = self.settings.elitism;
        if k == 0 {
            return Vec::new();
        }
        if fitness.len() < k {
            return (0..fitness.len()).collect();
        }
        let mut ranked: Vec<usize> = (0..fitness.len()).collect();
        ranked.sort_by(|&a, &b| {
            fitness[b]
                .partial_cmp(&fitness[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(k);
        ranked
    }
}

/// First index holding the highest fitness
fn best_index(fitness: &[f64]) -> usize {
    let mut best = 0;
    for (i, f) in fitness.iter().enumerate() {
        if *f > fitness[best] {
            best = i;
        }
    }
    best
}
