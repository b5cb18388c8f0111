use crate::error::{Result, TreevoError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::index::sample;
use rand::{Rng, RngCore};

/// Picks parents by index into the population, given the fitness of every
/// individual in population order.
pub trait Selection: Send + Sync {
    fn select(&self, fitness: &[f64], rng: &mut dyn RngCore) -> Result<Vec<usize>>;
}

/// Fitness-proportionate selection of two parents.
///
/// The second parent is drawn from the rest of the population; sampling
/// is with replacement only when the population has a single member.
#[derive(Debug, Clone, Copy, Default)]
pub struct WheelSelection;

impl Selection for WheelSelection {
    fn select(&self, fitness: &[f64], rng: &mut dyn RngCore) -> Result<Vec<usize>> {
        if fitness.is_empty() {
            return Err(TreevoError::Selection("empty population".to_string()));
        }
        if let Some(bad) = fitness.iter().find(|f| !f.is_finite() || **f < 0.0) {
            return Err(TreevoError::Selection(format!(
                "wheel selection needs non-negative fitness, got {}",
                bad
            )));
        }
        if fitness.iter().sum::<f64>() <= 0.0 {
            return Err(TreevoError::Selection(
                "total fitness is zero; wheel selection is undefined".to_string(),
            ));
        }

        let wheel = WeightedIndex::new(fitness)
            .map_err(|e| TreevoError::Selection(e.to_string()))?;
        let first = wheel.sample(rng);
        if fitness.len() < 2 {
            return Ok(vec![first, wheel.sample(rng)]);
        }

        let mut rest = fitness.to_vec();
        rest[first] = 0.0;
        let second = if rest.iter().sum::<f64>() > 0.0 {
            WeightedIndex::new(&rest)
                .map_err(|e| TreevoError::Selection(e.to_string()))?
                .sample(rng)
        } else {
            let pick = rng.gen_range(0..fitness.len() - 1);
            if pick >= first {
                pick + 1
            } else {
                pick
            }
        };
        Ok(vec![first, second])
    }
}

/// Tournament selection with geometric acceptance.
///
/// Each winner comes from its own tournament of `size` distinct individuals
/// (with replacement when the population is smaller), ranked by fitness;
/// candidates are accepted in rank order with probability `prob`, cycling
/// through the ranking until one is accepted.
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    pub size: usize,
    pub prob: f64,
    pub winners: usize,
}

impl TournamentSelection {
    pub fn new(size: usize, prob: f64) -> Self {
        Self {
            size,
            prob,
            winners: 2,
        }
    }

    pub fn with_winners(mut self, winners: usize) -> Self {
        self.winners = winners;
        self
    }
}

impl Selection for TournamentSelection {
    fn select(&self, fitness: &[f64], rng: &mut dyn RngCore) -> Result<Vec<usize>> {
        if fitness.is_empty() {
            return Err(TreevoError::Selection("empty population".to_string()));
        }
        if self.size == 0 {
            return Err(TreevoError::Selection("tournament size must be positive".to_string()));
        }
        if !(self.prob > 0.0 && self.prob <= 1.0) {
            return Err(TreevoError::Selection(format!(
                "tournament probability must be in (0, 1], got {}",
                self.prob
            )));
        }

        let mut winners = Vec::with_capacity(self.winners);
        for _ in 0..self.winners {
            let mut contestants: Vec<usize> = if self.size > fitness.len() {
                (0..self.size).map(|_| rng.gen_range(0..fitness.len())).collect()
            } else {
                sample(rng, fitness.len(), self.size).into_vec()
            };
            contestants.sort_by(|a, b| {
                fitness[*b]
                    .partial_cmp(&fitness[*a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let mut i = 0;
            let winner = loop {
                if rng.gen::<f64>() < self.prob {
                    break contestants[i % contestants.len()];
                }
                i += 1;
            };
            winners.push(winner);
        }
        Ok(winners)
    }
}
