use super::decision_tree::{DecisionTree, ROOT};
use super::domain::FeatureSet;
use super::node::DecisionNode;
use crate::error::{Result, TreevoError};
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Serialized form of a tree: the arena plus its id counter.
///
/// The feature set is not part of the snapshot; it is re-attached on load so
/// every tree of a run keeps sharing the same instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub next_id: NodeId,
    pub nodes: BTreeMap<NodeId, DecisionNode>,
}

impl DecisionTree {
    pub fn to_snapshot(&self) -> TreeSnapshot {
        let (nodes, next_id) = self.parts();
        TreeSnapshot {
            next_id,
            nodes: nodes.clone(),
        }
    }

    pub fn from_snapshot(snapshot: TreeSnapshot, features: Arc<FeatureSet>) -> Result<Self> {
        let tree = DecisionTree::from_parts(features, snapshot.nodes, snapshot.next_id);
        tree.check_invariants()?;
        Ok(tree)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(&self.to_snapshot())?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P, features: Arc<FeatureSet>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            TreevoError::Checkpoint(format!(
                "Failed to read tree {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let snapshot: TreeSnapshot = serde_json::from_str(&contents)?;
        Self::from_snapshot(snapshot, features)
    }

    /// Graphviz rendering for inspection only
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("graph tree {\n  ranksep=1;\n  edge [fontsize=10];\n");
        let mut stack = if self.is_empty() { Vec::new() } else { vec![ROOT] };
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            let text = match (&node.feature, node.threshold) {
                (None, _) => node.out.clone().unwrap_or_default(),
                (Some(f), Some(t)) if self.features().is_numeric(f) => format!("{} < {}", f, t),
                (Some(f), _) => f.clone(),
            };
            let _ = writeln!(dot, "  {} [label=\"{}\"];", id, escape(&text));
            if let (Some(parent), Some(label)) = (node.parent, &node.label) {
                let _ = writeln!(
                    dot,
                    "  {} -- {} [label=\"{}\"];",
                    parent,
                    id,
                    escape(&label.to_string())
                );
            }
            stack.extend(node.child_ids());
        }
        dot.push_str("}\n");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_dot())?;
        Ok(())
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
