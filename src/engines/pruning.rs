//! Consistency-restoring pruning.
//!
//! After a structural edit at some node, the constraints imposed by the
//! node's ancestors may make parts of the edited region unreachable (a
//! categorical feature already fixed, or a threshold outside the range still
//! open at that point). The pruner collects those constraints on the way to
//! the root and then walks the edited region with an explicit stack,
//! collapsing every split whose outcome is already decided.

use crate::engines::tree::DecisionTree;
use crate::error::{Result, TreevoError};
use crate::types::{Branch, NodeId};
use chrono::Local;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Constraint accumulated for one feature: `lower <= x < upper`, or `x == fixed`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBound {
    pub lower: f64,
    pub fixed: Option<Branch>,
    pub upper: f64,
}

impl Default for FeatureBound {
    fn default() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            fixed: None,
            upper: f64::INFINITY,
        }
    }
}

pub type DomainBounds = HashMap<String, FeatureBound>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Upper,
    Lower,
    Equality,
}

/// An ancestor split contradicting a tighter split closer to the edit point
#[derive(Debug, Clone, PartialEq)]
pub struct Inconsistency {
    pub node: NodeId,
    pub feature: String,
    pub kind: BoundKind,
}

#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    pub inconsistencies: Vec<Inconsistency>,
    /// Number of interior nodes collapsed into one of their branches
    pub replaced: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Pruner {
    postmortem_dir: Option<PathBuf>,
}

impl Pruner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trees found inconsistent are dumped into `dir` for inspection.
    pub fn with_postmortem_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            postmortem_dir: Some(dir.into()),
        }
    }

    /// Restores consistency of the region rooted at `node_id`.
    pub fn prune(&self, tree: &mut DecisionTree, node_id: NodeId) -> Result<PruneReport> {
        let mut report = PruneReport::default();
        let bounds = self.accumulate(tree, node_id, &mut report)?;

        if !report.inconsistencies.is_empty() {
            for issue in &report.inconsistencies {
                log::error!(
                    "Inconsistent partitioning of feature '{}' at node {} ({:?} bound)",
                    issue.feature,
                    issue.node,
                    issue.kind
                );
            }
            self.persist(tree);
        }

        let mut stack: Vec<(NodeId, DomainBounds)> = vec![(node_id, bounds)];
        while let Some((id, bounds)) = stack.pop() {
            let Some(node) = tree.node(id) else { continue };
            let Some(feature) = node.feature.clone() else { continue };
            let threshold = node.threshold;
            let bound = bounds.get(&feature).cloned().unwrap_or_default();

            let replaced_by = if !tree.features().is_numeric(&feature) {
                match &bound.fixed {
                    Some(fixed) => Some(tree.remove_node(id, fixed)?),
                    None => None,
                }
            } else {
                match threshold {
                    Some(t) if t <= bound.lower => Some(tree.remove_node(id, &Branch::False)?),
                    Some(t) if t >= bound.upper => Some(tree.remove_node(id, &Branch::True)?),
                    _ => None,
                }
            };

            match replaced_by {
                Some(replacement) => {
                    report.replaced += 1;
                    stack.push((replacement, bounds));
                }
                None => {
                    let children: Vec<(Branch, NodeId)> = tree
                        .node(id)
                        .map(|n| n.children.iter().map(|(b, &c)| (b.clone(), c)).collect())
                        .unwrap_or_default();
                    for (branch, child) in children {
                        let mut next = bounds.clone();
                        let entry = next.entry(feature.clone()).or_default();
                        match (&branch, threshold) {
                            (Branch::True, Some(t)) => entry.upper = t,
                            (Branch::False, Some(t)) => entry.lower = t,
                            (Branch::Category(_), _) => entry.fixed = Some(branch.clone()),
                            _ => {}
                        }
                        stack.push((child, next));
                    }
                }
            }
        }
        Ok(report)
    }

    /// Walks from `node_id` up to the root collecting per-feature bounds
    pub fn accumulate(
        &self,
        tree: &DecisionTree,
        node_id: NodeId,
        report: &mut PruneReport,
    ) -> Result<DomainBounds> {
        let mut bounds: DomainBounds = tree
            .features()
            .names()
            .map(|n| (n.to_string(), FeatureBound::default()))
            .collect();

        let mut current = node_id;
        while let Some(node) = tree.node(current) {
            let (Some(parent_id), Some(label)) = (node.parent, node.label.clone()) else {
                break;
            };
            let Some(parent) = tree.node(parent_id) else { break };
            current = parent_id;
            let Some(feature) = parent.feature.clone() else { continue };
            let bound = bounds.entry(feature.clone()).or_default();

            match (label, parent.threshold) {
                (Branch::True, Some(t)) => {
                    if bound.upper == f64::INFINITY {
                        bound.upper = t;
                    } else if t < bound.upper {
                        report.inconsistencies.push(Inconsistency {
                            node: parent_id,
                            feature,
                            kind: BoundKind::Upper,
                        });
                        bound.upper = t;
                    }
                }
                (Branch::False, Some(t)) => {
                    if bound.lower == f64::NEG_INFINITY {
                        bound.lower = t;
                    } else if t >= bound.lower {
                        report.inconsistencies.push(Inconsistency {
                            node: parent_id,
                            feature,
                            kind: BoundKind::Lower,
                        });
                        bound.lower = t;
                    }
                }
                (Branch::Category(value), _) => {
                    if bound.fixed.is_some() {
                        report.inconsistencies.push(Inconsistency {
                            node: parent_id,
                            feature,
                            kind: BoundKind::Equality,
                        });
                    }
                    bound.fixed = Some(Branch::Category(value));
                }
                _ => {}
            }
        }
        Ok(bounds)
    }

    fn persist(&self, tree: &DecisionTree) {
        let Some(dir) = &self.postmortem_dir else { return };
        let stem = format!("broken_{}", Local::now().format("%Y%m%d-%H%M%S-%6f"));
        let result = fs::create_dir_all(dir)
            .map_err(TreevoError::from)
            .and_then(|_| tree.save(dir.join(format!("{}.json", stem))))
            .and_then(|_| tree.write_dot(dir.join(format!("{}.dot", stem))));
        match result {
            Ok(()) => log::error!("Inconsistent tree saved as {}", dir.join(&stem).display()),
            Err(e) => log::warn!("Could not save inconsistent tree: {}", e),
        }
    }
}
