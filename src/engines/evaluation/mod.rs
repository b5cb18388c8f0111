pub mod fitness;
pub mod report;

pub use fitness::{accuracy, AccuracyFitness, Fitness, RarityWeightedAccuracy, WeightedFormula};
pub use report::{accuracy_report, AccuracyPoint};
