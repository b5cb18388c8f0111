//! Top-down ID3 induction over a labeled partition.
//!
//! Numeric features try every distinct observed value as a `<` threshold,
//! categorical features split on every observed value. The best split is the
//! first one found with strictly greater information gain, scanning features
//! in feature-set order and candidate thresholds in order of first
//! appearance. Rows missing the split feature stay at the node and are
//! counted as their own partition when scoring.

use super::entropy::{information_gain, label_counts, majority_label};
use crate::data::{Dataset, Row};
use crate::engines::tree::{DecisionNode, DecisionTree, FeatureSet};
use crate::error::{Result, TreevoError};
use crate::types::{Branch, NodeId};
use std::sync::Arc;

/// Gains at or below this are treated as no gain
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
enum Split {
    Numeric {
        feature: String,
        threshold: f64,
        below: Vec<usize>,
        above: Vec<usize>,
    },
    Categorical {
        feature: String,
        partitions: Vec<(String, Vec<usize>)>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Id3Inducer;

impl Id3Inducer {
    pub fn new() -> Self {
        Self
    }

    /// Builds one tree from `dataset`. An empty dataset is a configuration error.
    pub fn induce(&self, dataset: &Dataset) -> Result<DecisionTree> {
        if dataset.is_empty() {
            return Err(TreevoError::Configuration(
                "cannot induce a tree from an empty dataset".to_string(),
            ));
        }
        let features = Arc::clone(dataset.features());
        let rows = dataset.rows();
        let mut tree = DecisionTree::new(Arc::clone(&features));
        let root = tree.add(DecisionNode::empty(), None)?;

        let mut stack: Vec<(NodeId, Vec<usize>)> = vec![(root, (0..rows.len()).collect())];
        while let Some((id, indices)) = stack.pop() {
            // Dead branch: keeps the default inherited at creation.
            if indices.is_empty() {
                continue;
            }
            let majority = majority_label(rows, &indices).map(str::to_string);
            tree.set_output(id, majority.clone())?;
            if label_counts(rows, &indices).len() == 1 {
                continue;
            }
            let Some(split) = best_split(&features, rows, &indices) else {
                continue;
            };
            let default = majority.unwrap_or_default();

            match split {
                Split::Numeric {
                    feature,
                    threshold,
                    below,
                    above,
                } => {
                    tree.set_split(id, &feature, Some(threshold))?;
                    let t = tree.add(DecisionNode::leaf(default.clone()), Some((id, Branch::True)))?;
                    let f = tree.add(DecisionNode::leaf(default), Some((id, Branch::False)))?;
                    stack.push((f, above));
                    stack.push((t, below));
                }
                Split::Categorical {
                    feature,
                    partitions,
                } => {
                    tree.set_split(id, &feature, None)?;
                    let mut children = Vec::with_capacity(partitions.len());
                    for (value, part) in partitions {
                        let child = tree.add(
                            DecisionNode::leaf(default.clone()),
                            Some((id, Branch::Category(value))),
                        )?;
                        children.push((child, part));
                    }
                    stack.extend(children.into_iter().rev());
                }
            }
        }

        log::debug!(
            "Induced tree with {} nodes (depth {}) from {} rows",
            tree.len(),
            tree.depth(),
            rows.len()
        );
        Ok(tree)
    }
}

fn best_split(features: &FeatureSet, rows: &[Row], indices: &[usize]) -> Option<Split> {
    let mut best: Option<(f64, Split)> = None;
    let mut consider = |gain: f64, split: Split| {
        if gain > MIN_GAIN && best.as_ref().map_or(true, |(g, _)| gain > *g) {
            best = Some((gain, split));
        }
    };

    for spec in features.iter() {
        let name = spec.name.as_str();
        if spec.domain.is_numeric() {
            let mut missing = Vec::new();
            let mut observed: Vec<(usize, f64)> = Vec::with_capacity(indices.len());
            for &i in indices {
                match rows[i].values.get(name).and_then(|v| v.as_number()) {
                    Some(v) if !v.is_nan() => observed.push((i, v)),
                    _ => missing.push(i),
                }
            }
            let mut candidates: Vec<f64> = Vec::new();
            for &(_, v) in &observed {
                if !candidates.contains(&v) {
                    candidates.push(v);
                }
            }
            for threshold in candidates {
                let (below, above): (Vec<(usize, f64)>, Vec<(usize, f64)>) =
                    observed.iter().partition(|(_, v)| *v < threshold);
                let below: Vec<usize> = below.into_iter().map(|(i, _)| i).collect();
                let above: Vec<usize> = above.into_iter().map(|(i, _)| i).collect();
                let gain = information_gain(rows, indices, &[&below, &above, &missing]);
                consider(
                    gain,
                    Split::Numeric {
                        feature: name.to_string(),
                        threshold,
                        below,
                        above,
                    },
                );
            }
        } else {
            let mut missing = Vec::new();
            let mut partitions: Vec<(String, Vec<usize>)> = Vec::new();
            for &i in indices {
                let Some(value) = rows[i].values.get(name) else {
                    missing.push(i);
                    continue;
                };
                let value = value.as_category();
                match partitions.iter_mut().find(|(v, _)| *v == value) {
                    Some((_, part)) => part.push(i),
                    None => partitions.push((value, vec![i])),
                }
            }
            let mut parts: Vec<&[usize]> = partitions.iter().map(|(_, p)| p.as_slice()).collect();
            parts.push(&missing);
            let gain = information_gain(rows, indices, &parts);
            consider(
                gain,
                Split::Categorical {
                    feature: name.to_string(),
                    partitions,
                },
            );
        }
    }
    best.map(|(_, split)| split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::tree::Domain;
    use crate::types::FeatureValue;

    #[test]
    fn test_missing_values_stay_at_node() {
        let features = Arc::new(FeatureSet::new().with("x", Domain::numeric(0.0, 10.0, 1.0)));
        let with_x = |label: &str, x: f64| {
            Row::from_ordered(label, &features, vec![FeatureValue::Number(x)])
        };
        let rows = vec![
            with_x("A", 1.0),
            with_x("A", 2.0),
            with_x("B", 8.0),
            Row::new("A", Default::default()),
        ];
        let dataset = Dataset::new(Arc::clone(&features), rows);
        let tree = Id3Inducer::new().induce(&dataset).unwrap();

        for row in dataset.rows() {
            assert_eq!(tree.predict(&row.values), Some(&row.label));
        }
    }
}
