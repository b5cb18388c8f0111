mod common;

use common::{features, obs, probe_observations, sample_tree, temp_dir};
use treevolve::engines::tree::{DecisionNode, DecisionTree, ROOT};
use treevolve::types::Branch;

#[test]
fn test_sample_tree_is_consistent() {
    let tree = sample_tree();
    assert_eq!(tree.len(), 5);
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.leaf_count(), 3);
    assert_eq!(tree.leaves(), vec![1, 3, 4]);
    tree.check_invariants().unwrap();
}

#[test]
fn test_predict_follows_splits() {
    let tree = sample_tree();
    assert_eq!(tree.predict(&obs(Some(2.0), Some("b"))).unwrap(), "LEFT");
    assert_eq!(tree.predict(&obs(Some(5.0), Some("a"))).unwrap(), "UP");
    assert_eq!(tree.predict(&obs(Some(7.0), Some("b"))).unwrap(), "RIGHT");
}

#[test]
fn test_predict_is_total() {
    let tree = sample_tree();
    // Missing split value: the default of the node where descent stops.
    assert_eq!(tree.predict(&obs(None, Some("a"))).unwrap(), "LEFT");
    assert_eq!(tree.predict(&obs(Some(6.0), None)).unwrap(), "RIGHT");
    // Value outside the categorical domain.
    assert_eq!(tree.predict(&obs(Some(6.0), Some("z"))).unwrap(), "RIGHT");
    assert!(DecisionTree::new(features()).predict(&obs(Some(1.0), None)).is_none());
}

#[test]
fn test_add_rejects_occupied_branch_and_second_root() {
    let mut tree = sample_tree();
    assert!(tree
        .add(DecisionNode::leaf("X"), Some((ROOT, Branch::True)))
        .is_err());
    assert!(tree.add(DecisionNode::leaf("X"), None).is_err());
    tree.check_invariants().unwrap();
}

#[test]
fn test_extract_substitute_round_trip() {
    let original = sample_tree();
    for id in original.node_ids() {
        let mut copy = original.clone();
        let extracted = original.extract(id).unwrap();
        extracted.check_invariants().unwrap();
        copy.substitute(id, &extracted).unwrap();
        copy.check_invariants().unwrap();

        assert!(copy.structurally_eq(&original), "round trip at node {}", id);
        for probe in probe_observations() {
            assert_eq!(copy.predict(&probe), original.predict(&probe));
        }
    }
}

#[test]
fn test_extract_renumbers_from_root() {
    let tree = sample_tree();
    let subtree = tree.extract(2).unwrap();
    assert_eq!(subtree.len(), 3);
    assert_eq!(subtree.root().unwrap().feature.as_deref(), Some("dir"));
    assert!(subtree.root().unwrap().is_root());
}

#[test]
fn test_remove_subtree_detaches_branch() {
    let mut tree = sample_tree();
    tree.remove_subtree(2).unwrap();
    assert_eq!(tree.len(), 2);
    tree.check_invariants().unwrap();
    // Descent stops at the root for the missing branch.
    assert_eq!(tree.predict(&obs(Some(7.0), Some("a"))).unwrap(), "LEFT");

    tree.remove_subtree(ROOT).unwrap();
    assert!(tree.is_empty());
    let id = tree.add(DecisionNode::leaf("X"), None).unwrap();
    assert_eq!(id, ROOT);
}

#[test]
fn test_remove_node_keeps_chosen_branch() {
    let mut tree = sample_tree();
    let replacement = tree.remove_node(2, &Branch::Category("a".into())).unwrap();
    tree.check_invariants().unwrap();
    assert_eq!(replacement, 3);
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.predict(&obs(Some(7.0), Some("b"))).unwrap(), "UP");
}

#[test]
fn test_remove_node_with_missing_branch_leaves_default() {
    let mut tree = sample_tree();
    let replacement = tree.remove_node(2, &Branch::Category("c".into())).unwrap();
    tree.check_invariants().unwrap();
    let node = tree.node(replacement).unwrap();
    assert!(node.is_leaf());
    assert_eq!(node.out.as_deref(), Some("RIGHT"));
    assert_eq!(node.parent, Some(ROOT));
    assert_eq!(node.label, Some(Branch::False));
}

#[test]
fn test_remove_root_reroots_tree() {
    let mut tree = sample_tree();
    let new_root = tree.remove_node(ROOT, &Branch::False).unwrap();
    assert_eq!(new_root, ROOT);
    tree.check_invariants().unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.root().unwrap().feature.as_deref(), Some("dir"));
    assert_eq!(tree.predict(&obs(Some(1.0), Some("a"))).unwrap(), "UP");
}

#[test]
fn test_ids_are_not_reused() {
    let mut tree = sample_tree();
    tree.remove_subtree(2).unwrap();
    let id = tree
        .add(DecisionNode::leaf("RIGHT"), Some((ROOT, Branch::False)))
        .unwrap();
    assert_eq!(id, 5);
}

#[test]
fn test_snapshot_save_and_load() {
    let dir = temp_dir("snapshot");
    let tree = sample_tree();
    let path = dir.join("tree.json");
    tree.save(&path).unwrap();

    let loaded = DecisionTree::load(&path, features()).unwrap();
    assert_eq!(loaded, tree);
    for probe in probe_observations() {
        assert_eq!(loaded.predict(&probe), tree.predict(&probe));
    }
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_dot_export_labels_nodes_and_edges() {
    let dot = sample_tree().to_dot();
    assert!(dot.starts_with("graph tree {"));
    assert!(dot.contains("x < 5"));
    assert!(dot.contains("0 -- 2"));
    assert!(dot.contains("[label=\"UP\"]"));
}
