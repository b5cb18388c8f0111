/// Decides, before each generation, whether the run is over
pub trait StopCondition: Send + Sync {
    fn should_stop(&self, generation: usize, best_fitness: f64, avg_fitness: f64) -> bool;
}

impl<F> StopCondition for F
where
    F: Fn(usize, f64, f64) -> bool + Send + Sync,
{
    fn should_stop(&self, generation: usize, best_fitness: f64, avg_fitness: f64) -> bool {
        self(generation, best_fitness, avg_fitness)
    }
}

/// Stops once `generation` generations have completed
#[derive(Debug, Clone, Copy)]
pub struct GenerationLimit(pub usize);

impl StopCondition for GenerationLimit {
    fn should_stop(&self, generation: usize, _best: f64, _avg: f64) -> bool {
        generation >= self.0
    }
}

/// Stops once the best individual reaches the given fitness
#[derive(Debug, Clone, Copy)]
pub struct FitnessThreshold(pub f64);

impl StopCondition for FitnessThreshold {
    fn should_stop(&self, _generation: usize, best_fitness: f64, _avg: f64) -> bool {
        best_fitness >= self.0
    }
}

pub struct AnyOf(pub Vec<Box<dyn StopCondition>>);

impl StopCondition for AnyOf {
    fn should_stop(&self, generation: usize, best_fitness: f64, avg_fitness: f64) -> bool {
        self.0
            .iter()
            .any(|c| c.should_stop(generation, best_fitness, avg_fitness))
    }
}
