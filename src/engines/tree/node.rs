use crate::types::{Branch, Label, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of a [`DecisionTree`](super::DecisionTree).
///
/// Interior nodes carry a split feature (and a threshold when the feature is
/// numeric) plus a majority-class default in `out`; leaves carry their
/// classification in `out`. All links are ids owned by the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionNode {
    pub feature: Option<String>,
    pub threshold: Option<f64>,
    #[serde(with = "branch_map")]
    pub children: BTreeMap<Branch, NodeId>,
    pub parent: Option<NodeId>,
    pub label: Option<Branch>,
    pub out: Option<Label>,
}

impl DecisionNode {
    pub fn leaf(out: impl Into<Label>) -> Self {
        Self {
            out: Some(out.into()),
            ..Self::empty()
        }
    }

    pub fn empty() -> Self {
        Self {
            feature: None,
            threshold: None,
            children: BTreeMap::new(),
            parent: None,
            label: None,
            out: None,
        }
    }

    /// Numeric split `feature < threshold`
    pub fn numeric_split(
        feature: impl Into<String>,
        threshold: f64,
        default: impl Into<Label>,
    ) -> Self {
        Self {
            feature: Some(feature.into()),
            threshold: Some(threshold),
            out: Some(default.into()),
            ..Self::empty()
        }
    }

    /// Categorical split: one branch per value
    pub fn categorical_split(feature: impl Into<String>, default: impl Into<Label>) -> Self {
        Self {
            feature: Some(feature.into()),
            out: Some(default.into()),
            ..Self::empty()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child_ids(&self) -> Vec<NodeId> {
        self.children.values().copied().collect()
    }

    /// Copy of the node's own payload, without any links
    pub(crate) fn detached(&self) -> Self {
        Self {
            feature: self.feature.clone(),
            threshold: self.threshold,
            out: self.out.clone(),
            ..Self::empty()
        }
    }

    pub(crate) fn same_payload(&self, other: &Self) -> bool {
        self.feature == other.feature
            && self.threshold == other.threshold
            && self.out == other.out
            && self.label == other.label
    }
}

// JSON object keys must be strings, so children are stored as (branch, id) pairs.
mod branch_map {
    use crate::types::{Branch, NodeId};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<Branch, NodeId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Branch, NodeId>, D::Error> {
        let pairs = Vec::<(Branch, NodeId)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
