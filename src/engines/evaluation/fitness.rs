use crate::data::Dataset;
use crate::engines::tree::DecisionTree;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Scores one individual. Higher is better; evaluators are shared across
/// worker threads. An error aborts the generation being evaluated.
pub trait Fitness: Send + Sync {
    fn evaluate(&self, tree: &DecisionTree) -> Result<f64>;
}

impl<F> Fitness for F
where
    F: Fn(&DecisionTree) -> Result<f64> + Send + Sync,
{
    fn evaluate(&self, tree: &DecisionTree) -> Result<f64> {
        self(tree)
    }
}

/// Fraction of rows whose prediction matches the label (0 on an empty dataset)
pub fn accuracy(tree: &DecisionTree, dataset: &Dataset) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    let correct = dataset
        .rows()
        .iter()
        .filter(|row| tree.predict(&row.values) == Some(&row.label))
        .count();
    correct as f64 / dataset.len() as f64
}

/// `accuracy^power`; powers above 1 sharpen selection pressure
#[derive(Debug, Clone)]
pub struct AccuracyFitness {
    dataset: Arc<Dataset>,
    power: i32,
}

impl AccuracyFitness {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_power(dataset, 1)
    }

    pub fn with_power(dataset: Arc<Dataset>, power: i32) -> Self {
        Self { dataset, power }
    }

    pub fn squared(dataset: Arc<Dataset>) -> Self {
        Self::with_power(dataset, 2)
    }

    pub fn cubed(dataset: Arc<Dataset>) -> Self {
        Self::with_power(dataset, 3)
    }
}

impl Fitness for AccuracyFitness {
    fn evaluate(&self, tree: &DecisionTree) -> Result<f64> {
        Ok(accuracy(tree, &self.dataset).powi(self.power))
    }
}

/// `(alpha · acc(testing)² + beta · acc(training)²) / (alpha + beta)`
#[derive(Debug, Clone)]
pub struct WeightedFormula {
    alpha: f64,
    beta: f64,
    testing: Arc<Dataset>,
    training: Arc<Dataset>,
}

impl WeightedFormula {
    pub fn new(alpha: f64, beta: f64, testing: Arc<Dataset>, training: Arc<Dataset>) -> Self {
        Self {
            alpha,
            beta,
            testing,
            training,
        }
    }
}

impl Fitness for WeightedFormula {
    fn evaluate(&self, tree: &DecisionTree) -> Result<f64> {
        let testing = accuracy(tree, &self.testing).powi(2);
        let training = accuracy(tree, &self.training).powi(2);
        Ok((self.alpha * testing + self.beta * training) / (self.alpha + self.beta))
    }
}

/// Per-label recall weighted by label rarity.
///
/// Each label `L` weighs `1 - freq(L)`; the score is
/// `Σ weight(L) · recall(L) / Σ weight(L)`. A dataset with a single label
/// degenerates to plain accuracy.
#[derive(Debug, Clone)]
pub struct RarityWeightedAccuracy {
    dataset: Arc<Dataset>,
    weights: Vec<(String, f64)>,
}

impl RarityWeightedAccuracy {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let total = dataset.len().max(1) as f64;
        let weights = dataset
            .label_counts()
            .into_iter()
            .map(|(label, count)| (label, 1.0 - count as f64 / total))
            .collect();
        Self { dataset, weights }
    }
}

impl Fitness for RarityWeightedAccuracy {
    fn evaluate(&self, tree: &DecisionTree) -> Result<f64> {
        let normalize: f64 = self.weights.iter().map(|(_, w)| w).sum();
        if normalize <= 0.0 {
            return Ok(accuracy(tree, &self.dataset));
        }
        let mut right: HashMap<&str, usize> = HashMap::new();
        let mut total: HashMap<&str, usize> = HashMap::new();
        for row in self.dataset.rows() {
            *total.entry(row.label.as_str()).or_default() += 1;
            if tree.predict(&row.values) == Some(&row.label) {
                *right.entry(row.label.as_str()).or_default() += 1;
            }
        }
        let score: f64 = self
            .weights
            .iter()
            .map(|(label, weight)| {
                let t = total.get(label.as_str()).copied().unwrap_or(0);
                if t == 0 {
                    return 0.0;
                }
                weight * right.get(label.as_str()).copied().unwrap_or(0) as f64 / t as f64
            })
            .sum();
        Ok(score / normalize)
    }
}
