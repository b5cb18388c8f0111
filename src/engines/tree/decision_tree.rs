use super::domain::FeatureSet;
use super::node::DecisionNode;
use crate::error::{Result, TreevoError};
use crate::types::{Branch, Label, NodeId, Observation};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Id of the root node of every non-empty tree
pub const ROOT: NodeId = 0;

/// Decision tree stored as an arena of nodes keyed by id.
///
/// Invariant after every structural operation: the tree is empty or a single
/// rooted structure with root [`ROOT`], and every `(label, child)` entry of a
/// node's children map points at a node whose `parent` is that node and whose
/// `label` is that branch. Ids are never reused until the whole tree is
/// cleared.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    features: Arc<FeatureSet>,
    nodes: BTreeMap<NodeId, DecisionNode>,
    next_id: NodeId,
}

impl PartialEq for DecisionTree {
    fn eq(&self, other: &Self) -> bool {
        self.next_id == other.next_id && self.nodes == other.nodes
    }
}

impl DecisionTree {
    pub fn new(features: Arc<FeatureSet>) -> Self {
        Self {
            features,
            nodes: BTreeMap::new(),
            next_id: ROOT,
        }
    }

    pub(crate) fn from_parts(
        features: Arc<FeatureSet>,
        nodes: BTreeMap<NodeId, DecisionNode>,
        next_id: NodeId,
    ) -> Self {
        Self {
            features,
            nodes,
            next_id,
        }
    }

    pub(crate) fn parts(&self) -> (&BTreeMap<NodeId, DecisionNode>, NodeId) {
        (&self.nodes, self.next_id)
    }

    pub fn features(&self) -> &Arc<FeatureSet> {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<&DecisionNode> {
        self.nodes.get(&ROOT)
    }

    pub fn node(&self, id: NodeId) -> Option<&DecisionNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut DecisionNode> {
        self.nodes.get_mut(&id).ok_or(TreevoError::UnknownNode(id))
    }

    fn get(&self, id: NodeId) -> Result<&DecisionNode> {
        self.nodes.get(&id).ok_or(TreevoError::UnknownNode(id))
    }

    /// Ids of all nodes in ascending order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Ids of all leaves in ascending order
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.is_leaf())
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_leaf()).count()
    }

    /// Number of edges on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = match self.root() {
            Some(_) => vec![(ROOT, 0)],
            None => return 0,
        };
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.values().map(|&c| (c, depth + 1)));
            }
        }
        max_depth
    }

    /// Installs a split on an existing node, keeping its links.
    pub fn set_split(&mut self, id: NodeId, feature: &str, threshold: Option<f64>) -> Result<()> {
        let node = self.node_mut(id)?;
        node.feature = Some(feature.to_string());
        node.threshold = threshold;
        Ok(())
    }

    pub fn set_output(&mut self, id: NodeId, out: Option<Label>) -> Result<()> {
        self.node_mut(id)?.out = out;
        Ok(())
    }

    /// Registers `node` under the next id. With `parent`, the node is wired
    /// into the parent's children under the given branch.
    pub fn add(&mut self, mut node: DecisionNode, parent: Option<(NodeId, Branch)>) -> Result<NodeId> {
        let id = self.next_id;
        node.children.clear();
        match parent {
            Some((parent_id, branch)) => {
                let parent_node = self.node_mut(parent_id)?;
                if parent_node.children.contains_key(&branch) {
                    return Err(TreevoError::InvalidTree(format!(
                        "node {} already has a child on branch {}",
                        parent_id, branch
                    )));
                }
                parent_node.children.insert(branch.clone(), id);
                node.parent = Some(parent_id);
                node.label = Some(branch);
            }
            None => {
                if !self.nodes.is_empty() {
                    return Err(TreevoError::InvalidTree(
                        "a parentless node can only be added to an empty tree".to_string(),
                    ));
                }
                node.parent = None;
                node.label = None;
            }
        }
        self.nodes.insert(id, node);
        self.next_id += 1;
        Ok(id)
    }

    /// Branch an observation takes at an interior node, if it can be computed
    fn branch_for(&self, node: &DecisionNode, example: &Observation) -> Option<Branch> {
        let feature = node.feature.as_ref()?;
        let value = example.get(feature)?;
        if self.features.is_numeric(feature) {
            let threshold = node.threshold?;
            let v = value.as_number()?;
            if v.is_nan() {
                return None;
            }
            Some(Branch::from_comparison(v < threshold))
        } else {
            Some(Branch::Category(value.as_category()))
        }
    }

    /// Single descent step: next node id, or `None` at a leaf or unmatched branch
    pub fn query_node(&self, example: &Observation, id: NodeId) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        if node.is_leaf() {
            return None;
        }
        let branch = self.branch_for(node, example)?;
        node.children.get(&branch).copied()
    }

    /// Classifies `example`. Unseen or missing values stop the descent and the
    /// current node's default is returned. `None` only for an empty tree or a
    /// node that never received an output.
    pub fn predict(&self, example: &Observation) -> Option<&Label> {
        let mut current = self.root()?;
        loop {
            let next = if current.is_leaf() {
                None
            } else {
                self.branch_for(current, example)
                    .and_then(|b| current.children.get(&b))
                    .and_then(|id| self.nodes.get(id))
            };
            match next {
                Some(node) => current = node,
                None => return current.out.as_ref(),
            }
        }
    }

    /// Removes `id` and all its descendants. Removing the root clears the
    /// tree and resets the id counter.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<()> {
        let node = self.get(id)?;
        match (node.parent, node.label.clone()) {
            (Some(parent), Some(label)) => {
                self.node_mut(parent)?.children.remove(&label);
            }
            _ => {
                self.nodes.clear();
                self.next_id = ROOT;
                return Ok(());
            }
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&current) {
                stack.extend(removed.children.values().copied());
            }
        }
        Ok(())
    }

    /// Replaces `id` with its child on `branch`, or with a fresh leaf carrying
    /// `id`'s default when that branch does not exist. The rest of `id`'s
    /// subtree is discarded. Returns the replacement's id.
    pub fn remove_node(&mut self, id: NodeId, branch: &Branch) -> Result<NodeId> {
        let node = self.node_mut(id)?;
        let replacer = node.children.remove(branch);
        let out = node.out.clone();
        let attach = match (node.parent, node.label.clone()) {
            (Some(parent), Some(label)) => Some((parent, label)),
            _ => None,
        };

        let Some(attach) = attach else {
            // Root replacement: the surviving subtree becomes the whole tree.
            let replacement = match replacer {
                Some(child) => self.extract(child)?,
                None => {
                    let mut leaf = DecisionTree::new(Arc::clone(&self.features));
                    leaf.add(DecisionNode { out, ..DecisionNode::empty() }, None)?;
                    leaf
                }
            };
            self.nodes = replacement.nodes;
            self.next_id = replacement.next_id;
            return Ok(ROOT);
        };

        // The kept branch is no longer listed as a child, so it survives this.
        self.remove_subtree(id)?;

        match replacer {
            None => self.add(DecisionNode { out, ..DecisionNode::empty() }, Some(attach)),
            Some(child) => {
                let (parent, label) = attach;
                self.node_mut(parent)?.children.insert(label.clone(), child);
                let child_node = self.node_mut(child)?;
                child_node.parent = Some(parent);
                child_node.label = Some(label);
                Ok(child)
            }
        }
    }

    /// Deep copy of the subtree rooted at `id` as a standalone tree sharing
    /// the same feature set.
    pub fn extract(&self, id: NodeId) -> Result<DecisionTree> {
        let mut tree = DecisionTree::new(Arc::clone(&self.features));
        tree.graft(self, id, None)?;
        Ok(tree)
    }

    /// Replaces the subtree at `id` with a deep copy of `donor`, attached at
    /// `id`'s former parent and branch. Returns the id of the attached root.
    pub fn substitute(&mut self, id: NodeId, donor: &DecisionTree) -> Result<NodeId> {
        if donor.is_empty() {
            return Err(TreevoError::InvalidTree(
                "cannot substitute an empty tree".to_string(),
            ));
        }
        let node = self.get(id)?;
        let attach = match (node.parent, node.label.clone()) {
            (Some(parent), Some(label)) => Some((parent, label)),
            _ => None,
        };
        self.remove_subtree(id)?;
        self.graft(donor, ROOT, attach)
    }

    /// Copies `source`'s subtree at `source_root` into this tree under `attach`
    fn graft(
        &mut self,
        source: &DecisionTree,
        source_root: NodeId,
        attach: Option<(NodeId, Branch)>,
    ) -> Result<NodeId> {
        let root = source.get(source_root)?;
        let new_root = self.add(root.detached(), attach)?;
        let mut stack: Vec<(NodeId, Branch, NodeId)> = root
            .children
            .iter()
            .map(|(b, &c)| (new_root, b.clone(), c))
            .collect();
        while let Some((parent, branch, source_id)) = stack.pop() {
            let source_node = source.get(source_id)?;
            let new_id = self.add(source_node.detached(), Some((parent, branch)))?;
            stack.extend(
                source_node
                    .children
                    .iter()
                    .map(|(b, &c)| (new_id, b.clone(), c)),
            );
        }
        Ok(new_root)
    }

    /// Same shape, payloads and branch labels, regardless of node ids
    pub fn structurally_eq(&self, other: &DecisionTree) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let (Some(_), Some(_)) = (self.root(), other.root()) else {
            return self.is_empty() && other.is_empty();
        };
        let mut stack = vec![(ROOT, ROOT)];
        while let Some((a, b)) = stack.pop() {
            let (Some(na), Some(nb)) = (self.nodes.get(&a), other.nodes.get(&b)) else {
                return false;
            };
            if !na.same_payload(nb) || na.children.len() != nb.children.len() {
                return false;
            }
            for (branch, &ca) in &na.children {
                match nb.children.get(branch) {
                    Some(&cb) => stack.push((ca, cb)),
                    None => return false,
                }
            }
        }
        true
    }

    /// Verifies the referential invariant and single-rootedness
    pub fn check_invariants(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Ok(());
        }
        let root = self
            .root()
            .ok_or_else(|| TreevoError::InvalidTree("missing root node 0".to_string()))?;
        if !root.is_root() {
            return Err(TreevoError::InvalidTree("root node has a parent".to_string()));
        }
        for (&id, node) in &self.nodes {
            if id >= self.next_id {
                return Err(TreevoError::InvalidTree(format!(
                    "node id {} is not below the id counter {}",
                    id, self.next_id
                )));
            }
            for (branch, &child) in &node.children {
                let child_node = self.get(child).map_err(|_| {
                    TreevoError::InvalidTree(format!("node {} links missing child {}", id, child))
                })?;
                if child_node.parent != Some(id) || child_node.label.as_ref() != Some(branch) {
                    return Err(TreevoError::InvalidTree(format!(
                        "child {} of node {} on branch {} has parent {:?} and label {:?}",
                        child, id, branch, child_node.parent, child_node.label
                    )));
                }
            }
            if id != ROOT && node.parent.is_none() {
                return Err(TreevoError::InvalidTree(format!("node {} is a second root", id)));
            }
        }
        let mut reachable = 0;
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            reachable += 1;
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.values().copied());
            }
        }
        if reachable != self.nodes.len() {
            return Err(TreevoError::InvalidTree(format!(
                "{} of {} nodes are unreachable from the root",
                self.nodes.len() - reachable,
                self.nodes.len()
            )));
        }
        Ok(())
    }
}
