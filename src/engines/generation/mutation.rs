use crate::engines::pruning::Pruner;
use crate::engines::tree::{DecisionTree, Domain};
use crate::error::Result;
use crate::types::NodeId;
use rand::seq::SliceRandom;
use rand::RngCore;

/// Mutates an offspring in place. Returns the mutated node, or `None` when
/// the draw left the tree untouched.
pub trait Mutation: Send + Sync {
    fn mutate(&self, tree: &mut DecisionTree, rng: &mut dyn RngCore) -> Result<Option<NodeId>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoMutation;

impl Mutation for NoMutation {
    fn mutate(&self, _tree: &mut DecisionTree, _rng: &mut dyn RngCore) -> Result<Option<NodeId>> {
        Ok(None)
    }
}

/// Shifts the threshold of a random numeric split by a domain-scaled delta
#[derive(Debug, Clone)]
pub struct ThresholdMutation {
    scale: f64,
    pruner: Pruner,
}

impl ThresholdMutation {
    pub fn new(scale: f64, pruner: Pruner) -> Self {
        Self { scale, pruner }
    }
}

impl Mutation for ThresholdMutation {
    fn mutate(&self, tree: &mut DecisionTree, rng: &mut dyn RngCore) -> Result<Option<NodeId>> {
        let ids = tree.node_ids();
        let Some(&id) = ids.choose(rng) else {
            return Ok(None);
        };
        let Some(node) = tree.node(id) else {
            return Ok(None);
        };
        let (Some(feature), Some(threshold)) = (node.feature.clone(), node.threshold) else {
            return Ok(None);
        };
        let Some(domain) = tree.features().get(&feature).filter(|d| d.is_numeric()) else {
            return Ok(None);
        };
        let delta = domain.random_delta(rng, self.scale);
        tree.set_split(id, &feature, Some(threshold + delta))?;
        self.pruner.prune(tree, id)?;
        Ok(Some(id))
    }
}

/// Replaces the feature of a random numeric split with another numeric
/// feature and draws a fresh threshold from its domain
#[derive(Debug, Clone)]
pub struct FeatureSwapMutation {
    pruner: Pruner,
}

impl FeatureSwapMutation {
    pub fn new(pruner: Pruner) -> Self {
        Self { pruner }
    }
}

impl Mutation for FeatureSwapMutation {
    fn mutate(&self, tree: &mut DecisionTree, rng: &mut dyn RngCore) -> Result<Option<NodeId>> {
        let ids = tree.node_ids();
        let Some(&id) = ids.choose(rng) else {
            return Ok(None);
        };
        let features = tree.features().clone();
        let Some(current) = tree.node(id).and_then(|n| n.feature.clone()) else {
            return Ok(None);
        };
        if !features.is_numeric(&current) {
            return Ok(None);
        }
        let Some(spec) = features.iter().collect::<Vec<_>>().choose(rng).copied() else {
            return Ok(None);
        };
        let Domain::Numeric { .. } = spec.domain else {
            return Ok(None);
        };
        let threshold = spec.domain.random_value(rng).as_number();
        tree.set_split(id, &spec.name, threshold)?;
        self.pruner.prune(tree, id)?;
        Ok(Some(id))
    }
}
