//! Crossover strategies.
//!
//! Semantic subtree crossover classifies a random training row with both
//! parents, picks one node on each classification path and swaps the
//! subtrees rooted there. Random node crossover swaps only the split payload
//! of two interior nodes. Offspring are always pruned at the edited nodes so
//! the result agrees with the splits above it.

use crate::data::Dataset;
use crate::engines::pruning::Pruner;
use crate::engines::tree::{DecisionTree, ROOT};
use crate::error::{Result, TreevoError};
use crate::types::{NodeId, Observation};
use rand::seq::SliceRandom;
use rand::RngCore;
use std::sync::Arc;

/// Produces offspring from two parents. Parents are never modified.
pub trait Crossover: Send + Sync {
    fn crossover(
        &self,
        first: &DecisionTree,
        second: &DecisionTree,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<DecisionTree>>;
}

/// Nodes visited while classifying `example`, root first, ending at the node
/// where descent stops.
pub fn classification_path(tree: &DecisionTree, example: &Observation) -> Vec<NodeId> {
    let mut path = Vec::new();
    if tree.is_empty() {
        return path;
    }
    let mut current = Some(ROOT);
    while let Some(id) = current {
        path.push(id);
        current = tree.query_node(example, id);
    }
    path
}

/// Swaps the subtrees at `at_first` and `at_second` between copies of the parents
fn swap_subtrees(
    pruner: &Pruner,
    first: &DecisionTree,
    at_first: NodeId,
    second: &DecisionTree,
    at_second: NodeId,
) -> Result<Vec<DecisionTree>> {
    let mut a = first.clone();
    let mut b = second.clone();
    let subtree_a = a.extract(at_first)?;
    let subtree_b = b.extract(at_second)?;
    let attached_a = a.substitute(at_first, &subtree_b)?;
    let attached_b = b.substitute(at_second, &subtree_a)?;
    pruner.prune(&mut a, attached_a)?;
    pruner.prune(&mut b, attached_b)?;
    Ok(vec![a, b])
}

#[derive(Debug, Clone)]
pub struct SemanticSubtreeCrossover {
    dataset: Arc<Dataset>,
    pruner: Pruner,
}

impl SemanticSubtreeCrossover {
    pub fn new(dataset: Arc<Dataset>, pruner: Pruner) -> Self {
        Self { dataset, pruner }
    }
}

impl Crossover for SemanticSubtreeCrossover {
    fn crossover(
        &self,
        first: &DecisionTree,
        second: &DecisionTree,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<DecisionTree>> {
        let row = self.dataset.random_row(rng).ok_or_else(|| {
            TreevoError::Generation("crossover needs a non-empty reference dataset".to_string())
        })?;
        let path_a = classification_path(first, &row.values);
        let path_b = classification_path(second, &row.values);
        let (Some(&at_a), Some(&at_b)) = (path_a.choose(rng), path_b.choose(rng)) else {
            return Err(TreevoError::Generation(
                "crossover parents must not be empty".to_string(),
            ));
        };
        swap_subtrees(&self.pruner, first, at_a, second, at_b)
    }
}

/// Variant restricted to nodes testing the same feature on both paths.
///
/// Leaves count as testing "no feature", so two paths always share at least
/// the leaf group unless one stops at an interior node. When the paths share
/// nothing the parents are returned unchanged.
#[derive(Debug, Clone)]
pub struct SemanticSubtreeSameFeature {
    dataset: Arc<Dataset>,
    pruner: Pruner,
}

impl SemanticSubtreeSameFeature {
    pub fn new(dataset: Arc<Dataset>, pruner: Pruner) -> Self {
        Self { dataset, pruner }
    }
}

/// Path nodes grouped by split feature, groups in order of first appearance
fn group_by_feature(tree: &DecisionTree, path: &[NodeId]) -> Vec<(Option<String>, Vec<NodeId>)> {
    let mut groups: Vec<(Option<String>, Vec<NodeId>)> = Vec::new();
    for &id in path {
        let feature = tree.node(id).and_then(|n| n.feature.clone());
        match groups.iter_mut().find(|(f, _)| *f == feature) {
            Some((_, ids)) => ids.push(id),
            None => groups.push((feature, vec![id])),
        }
    }
    groups
}

impl Crossover for SemanticSubtreeSameFeature {
    fn crossover(
        &self,
        first: &DecisionTree,
        second: &DecisionTree,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<DecisionTree>> {
        let row = self.dataset.random_row(rng).ok_or_else(|| {
            TreevoError::Generation("crossover needs a non-empty reference dataset".to_string())
        })?;
        let walk_a = group_by_feature(first, &classification_path(first, &row.values));
        let walk_b = group_by_feature(second, &classification_path(second, &row.values));

        let shared: Vec<(&Vec<NodeId>, &Vec<NodeId>)> = walk_a
            .iter()
            .filter_map(|(feature, ids_a)| {
                walk_b
                    .iter()
                    .find(|(f, _)| f == feature)
                    .map(|(_, ids_b)| (ids_a, ids_b))
            })
            .collect();

        let Some(&(ids_a, ids_b)) = shared.choose(rng) else {
            log::debug!("No shared split feature on the classification paths; parents kept");
            return Ok(vec![first.clone(), second.clone()]);
        };
        let (Some(&at_a), Some(&at_b)) = (ids_a.choose(rng), ids_b.choose(rng)) else {
            return Ok(vec![first.clone(), second.clone()]);
        };
        swap_subtrees(&self.pruner, first, at_a, second, at_b)
    }
}

/// Swaps the split (feature, threshold, default) of a random interior node
/// of each parent. The second node is drawn among those whose feature has
/// the same kind, numeric or categorical, so existing branch labels stay
/// meaningful. Parents without such a pair are returned unchanged.
#[derive(Debug, Clone)]
pub struct RandomNodeCrossover {
    pruner: Pruner,
}

impl RandomNodeCrossover {
    pub fn new(pruner: Pruner) -> Self {
        Self { pruner }
    }
}

fn interior_nodes(tree: &DecisionTree) -> Vec<(NodeId, bool)> {
    tree.node_ids()
        .into_iter()
        .filter_map(|id| {
            let feature = tree.node(id)?.feature.as_ref()?;
            Some((id, tree.features().is_numeric(feature)))
        })
        .collect()
}

impl Crossover for RandomNodeCrossover {
    fn crossover(
        &self,
        first: &DecisionTree,
        second: &DecisionTree,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<DecisionTree>> {
        let Some(&(at_a, numeric)) = interior_nodes(first).choose(rng) else {
            log::debug!("First parent has no interior node; parents kept");
            return Ok(vec![first.clone(), second.clone()]);
        };
        let candidates: Vec<NodeId> = interior_nodes(second)
            .into_iter()
            .filter(|&(_, kind)| kind == numeric)
            .map(|(id, _)| id)
            .collect();
        let Some(&at_b) = candidates.choose(rng) else {
            log::debug!("No interior node of matching kind in second parent; parents kept");
            return Ok(vec![first.clone(), second.clone()]);
        };

        let mut a = first.clone();
        let mut b = second.clone();
        let (Some(node_a), Some(node_b)) = (first.node(at_a), second.node(at_b)) else {
            return Err(TreevoError::Generation(
                "crossover picked a node missing from its tree".to_string(),
            ));
        };
        if let (Some(feature_a), Some(feature_b)) = (&node_a.feature, &node_b.feature) {
            a.set_split(at_a, feature_b, node_b.threshold)?;
            a.set_output(at_a, node_b.out.clone())?;
            b.set_split(at_b, feature_a, node_a.threshold)?;
            b.set_output(at_b, node_a.out.clone())?;
        }
        self.pruner.prune(&mut a, at_a)?;
        self.pruner.prune(&mut b, at_b)?;
        Ok(vec![a, b])
    }
}
