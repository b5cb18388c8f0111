mod common;

use common::{consistent_dataset, features, obs, sample_tree};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use treevolve::data::{Dataset, Row};
use treevolve::engines::evaluation::{
    accuracy, AccuracyFitness, Fitness, RarityWeightedAccuracy, WeightedFormula,
};
use treevolve::engines::generation::{
    classification_path, Crossover, FeatureSwapMutation, Mutation, NoMutation, RandomNodeCrossover,
    Selection,
    SemanticSubtreeCrossover, SemanticSubtreeSameFeature, ThresholdMutation, TournamentSelection,
    WheelSelection,
};
use treevolve::engines::induction::Id3Inducer;
use treevolve::engines::pruning::Pruner;
use treevolve::engines::tree::{DecisionNode, DecisionTree, ROOT};
use treevolve::types::Branch;

fn other_tree() -> DecisionTree {
    let mut tree = DecisionTree::new(features());
    tree.add(DecisionNode::categorical_split("dir", "UP"), None).unwrap();
    let a = tree
        .add(
            DecisionNode::numeric_split("x", 3.0, "UP"),
            Some((ROOT, Branch::Category("a".into()))),
        )
        .unwrap();
    tree.add(DecisionNode::leaf("LEFT"), Some((a, Branch::True))).unwrap();
    tree.add(DecisionNode::leaf("UP"), Some((a, Branch::False))).unwrap();
    tree.add(DecisionNode::leaf("RIGHT"), Some((ROOT, Branch::Category("b".into()))))
        .unwrap();
    tree
}

#[test]
fn test_classification_path_ends_where_descent_stops() {
    let tree = sample_tree();
    assert_eq!(classification_path(&tree, &obs(Some(7.0), Some("b"))), vec![0, 2, 4]);
    assert_eq!(classification_path(&tree, &obs(Some(7.0), None)), vec![0, 2]);
    assert_eq!(classification_path(&tree, &obs(Some(1.0), None)), vec![0, 1]);
}

#[test]
fn test_semantic_crossover_keeps_parents_and_invariants() {
    let dataset = Arc::new(consistent_dataset());
    let crossover = SemanticSubtreeCrossover::new(Arc::clone(&dataset), Pruner::new());
    let (a, b) = (sample_tree(), other_tree());

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let children = crossover.crossover(&a, &b, &mut rng).unwrap();
        assert_eq!(children.len(), 2);
        for child in &children {
            child.check_invariants().unwrap();
            assert!(!child.is_empty());
            for row in dataset.rows() {
                assert!(child.predict(&row.values).is_some());
            }
        }
    }
    assert!(a.structurally_eq(&sample_tree()));
    assert!(b.structurally_eq(&other_tree()));
}

#[test]
fn test_same_feature_crossover_keeps_invariants() {
    let dataset = Arc::new(consistent_dataset());
    let crossover = SemanticSubtreeSameFeature::new(Arc::clone(&dataset), Pruner::new());
    let (a, b) = (sample_tree(), other_tree());

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let children = crossover.crossover(&a, &b, &mut rng).unwrap();
        assert_eq!(children.len(), 2);
        for child in &children {
            child.check_invariants().unwrap();
        }
    }
}

#[test]
fn test_crossover_of_identical_induced_trees() {
    let dataset = Arc::new(consistent_dataset());
    let tree = Id3Inducer::new().induce(&dataset).unwrap();
    let crossover = SemanticSubtreeCrossover::new(Arc::clone(&dataset), Pruner::new());
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..20 {
        for child in crossover.crossover(&tree, &tree, &mut rng).unwrap() {
            child.check_invariants().unwrap();
        }
    }
}

fn numeric_stump(threshold: f64, below: &str, above: &str) -> DecisionTree {
    let mut tree = DecisionTree::new(features());
    tree.add(DecisionNode::numeric_split("x", threshold, below), None).unwrap();
    tree.add(DecisionNode::leaf(below), Some((ROOT, Branch::True))).unwrap();
    tree.add(DecisionNode::leaf(above), Some((ROOT, Branch::False))).unwrap();
    tree
}

#[test]
fn test_random_node_crossover_swaps_split_payloads() {
    let a = numeric_stump(5.0, "LEFT", "UP");
    let b = numeric_stump(3.0, "RIGHT", "DOWN");
    let mut rng = StdRng::seed_from_u64(4);
    let children = RandomNodeCrossover::new(Pruner::new())
        .crossover(&a, &b, &mut rng)
        .unwrap();

    let root_a = children[0].root().unwrap();
    assert_eq!(root_a.threshold, Some(3.0));
    assert_eq!(root_a.out.as_deref(), Some("RIGHT"));
    let root_b = children[1].root().unwrap();
    assert_eq!(root_b.threshold, Some(5.0));
    assert_eq!(root_b.out.as_deref(), Some("LEFT"));
    assert_eq!(children[0].len(), 3);
    assert!(a.structurally_eq(&numeric_stump(5.0, "LEFT", "UP")));
}

#[test]
fn test_random_node_crossover_keeps_invariants() {
    let crossover = RandomNodeCrossover::new(Pruner::new());
    let (a, b) = (sample_tree(), other_tree());
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let children = crossover.crossover(&a, &b, &mut rng).unwrap();
        assert_eq!(children.len(), 2);
        for child in &children {
            child.check_invariants().unwrap();
        }
    }
}

#[test]
fn test_random_node_crossover_without_interior_nodes_keeps_parents() {
    let mut leaf = DecisionTree::new(features());
    leaf.add(DecisionNode::leaf("LEFT"), None).unwrap();
    let mut categorical = DecisionTree::new(features());
    categorical.add(DecisionNode::categorical_split("dir", "UP"), None).unwrap();
    let crossover = RandomNodeCrossover::new(Pruner::new());
    let mut rng = StdRng::seed_from_u64(9);

    let children = crossover.crossover(&leaf, &sample_tree(), &mut rng).unwrap();
    assert_eq!(children, vec![leaf.clone(), sample_tree()]);

    // numeric split on one side, categorical only on the other
    let stump = numeric_stump(4.0, "LEFT", "UP");
    let children = crossover.crossover(&stump, &categorical, &mut rng).unwrap();
    assert_eq!(children, vec![stump, categorical]);
}

#[test]
fn test_crossover_without_reference_rows_fails() {
    let crossover = SemanticSubtreeCrossover::new(Arc::new(Dataset::empty(features())), Pruner::new());
    let mut rng = StdRng::seed_from_u64(1);
    assert!(crossover
        .crossover(&sample_tree(), &other_tree(), &mut rng)
        .is_err());
}

#[test]
fn test_threshold_mutation_only_touches_numeric_splits() {
    let mutation = ThresholdMutation::new(0.3, Pruner::new());
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tree = sample_tree();
        if let Some(id) = mutation.mutate(&mut tree, &mut rng).unwrap() {
            assert_eq!(id, ROOT);
        }
        tree.check_invariants().unwrap();
    }

    let mut leaf = DecisionTree::new(features());
    leaf.add(DecisionNode::leaf("LEFT"), None).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(mutation.mutate(&mut leaf, &mut rng).unwrap(), None);
}

#[test]
fn test_feature_swap_and_no_mutation() {
    let swap = FeatureSwapMutation::new(Pruner::new());
    for seed in 0..30 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut tree = sample_tree();
        swap.mutate(&mut tree, &mut rng).unwrap();
        tree.check_invariants().unwrap();
    }

    let mut tree = sample_tree();
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(NoMutation.mutate(&mut tree, &mut rng).unwrap(), None);
    assert_eq!(tree, sample_tree());
}

#[test]
fn test_accuracy_based_fitness() {
    let dataset = Arc::new(consistent_dataset());
    let perfect = Id3Inducer::new().induce(&dataset).unwrap();
    assert_eq!(AccuracyFitness::new(Arc::clone(&dataset)).evaluate(&perfect).unwrap(), 1.0);

    // Always answers LEFT: right on the 6 rows with x < 3 out of 20.
    let mut constant = DecisionTree::new(features());
    constant.add(DecisionNode::leaf("LEFT"), None).unwrap();
    let acc = accuracy(&constant, &dataset);
    assert!((acc - 0.3).abs() < 1e-12);
    let squared = AccuracyFitness::squared(Arc::clone(&dataset)).evaluate(&constant).unwrap();
    assert!((squared - 0.09).abs() < 1e-12);
    let cubed = AccuracyFitness::cubed(Arc::clone(&dataset)).evaluate(&constant).unwrap();
    assert!((cubed - 0.027).abs() < 1e-12);
}

#[test]
fn test_weighted_formula_normalizes_by_weights() {
    let fs = features();
    let testing = Arc::new(Dataset::new(
        Arc::clone(&fs),
        vec![
            Row::new("LEFT", obs(Some(1.0), Some("a"))),
            Row::new("UP", obs(Some(6.0), Some("a"))),
        ],
    ));
    let training = Arc::new(Dataset::new(
        Arc::clone(&fs),
        vec![Row::new("LEFT", obs(Some(1.0), Some("b")))],
    ));
    let mut constant = DecisionTree::new(fs);
    constant.add(DecisionNode::leaf("LEFT"), None).unwrap();

    // testing accuracy 0.5, training accuracy 1.0
    let fitness = WeightedFormula::new(1.0, 3.0, testing, training);
    let expected = (1.0 * 0.25 + 3.0 * 1.0) / 4.0;
    assert!((fitness.evaluate(&constant).unwrap() - expected).abs() < 1e-12);
}

#[test]
fn test_rarity_weighted_accuracy_favours_rare_labels() {
    let fs = features();
    let mut rows: Vec<Row> = (0..9)
        .map(|x| Row::new("COMMON", obs(Some(x as f64), Some("a"))))
        .collect();
    rows.push(Row::new("RARE", obs(Some(9.0), Some("b"))));
    let fitness = RarityWeightedAccuracy::new(Arc::new(Dataset::new(Arc::clone(&fs), rows)));

    let mut common = DecisionTree::new(Arc::clone(&fs));
    common.add(DecisionNode::leaf("COMMON"), None).unwrap();
    let mut rare = DecisionTree::new(fs);
    rare.add(DecisionNode::leaf("RARE"), None).unwrap();

    // weights: COMMON 0.1, RARE 0.9
    assert!((fitness.evaluate(&common).unwrap() - 0.1).abs() < 1e-12);
    assert!((fitness.evaluate(&rare).unwrap() - 0.9).abs() < 1e-12);
}

#[test]
fn test_selection_strategies() {
    let mut rng = StdRng::seed_from_u64(5);
    let fitness = [0.2, 0.0, 0.7, 0.1];
    for _ in 0..50 {
        let picked = WheelSelection.select(&fitness, &mut rng).unwrap();
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|&i| i != 1));
    }
    assert!(WheelSelection.select(&[0.0; 4], &mut rng).is_err());

    let tournament = TournamentSelection::new(3, 0.6).with_winners(4);
    let picked = tournament.select(&fitness, &mut rng).unwrap();
    assert_eq!(picked.len(), 4);
    assert!(picked.iter().all(|&i| i < fitness.len()));
}
