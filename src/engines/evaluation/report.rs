use super::fitness::accuracy;
use crate::data::Dataset;
use crate::engines::checkpoint::HistoryRecord;
use crate::engines::tree::DecisionTree;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Out-of-sample accuracy of one generation's best tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyPoint {
    pub generation: usize,
    pub best_fitness: f64,
    pub accuracy: f64,
}

/// Replays the history log against the held-out partition
pub fn accuracy_report(history: &[HistoryRecord], testing: &Dataset) -> Result<Vec<AccuracyPoint>> {
    history
        .iter()
        .map(|record| {
            let tree = DecisionTree::from_snapshot(
                record.best_tree.clone(),
                Arc::clone(testing.features()),
            )?;
            Ok(AccuracyPoint {
                generation: record.generation,
                best_fitness: record.best_fitness,
                accuracy: accuracy(&tree, testing),
            })
        })
        .collect()
}
