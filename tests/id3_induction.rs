mod common;

use common::{consistent_dataset, features, obs};
use std::sync::Arc;
use treevolve::data::{Dataset, Row};
use treevolve::engines::evaluation::accuracy;
use treevolve::engines::induction::Id3Inducer;
use treevolve::engines::tree::{Domain, FeatureSet, ROOT};
use treevolve::types::{Branch, FeatureValue};

#[test]
fn test_single_label_yields_single_leaf() {
    let fs = features();
    let rows = (0..6)
        .map(|x| Row::new("STAY", obs(Some(x as f64), Some("a"))))
        .collect();
    let tree = Id3Inducer::new().induce(&Dataset::new(fs, rows)).unwrap();

    assert_eq!(tree.len(), 1);
    let root = tree.root().unwrap();
    assert!(root.is_leaf());
    assert_eq!(root.out.as_deref(), Some("STAY"));
}

#[test]
fn test_four_row_scenario_picks_best_threshold() {
    let fs = Arc::new(
        FeatureSet::new()
            .with("A", Domain::categorical(["0", "1"]))
            .with("B", Domain::numeric(0.0, 10.0, 1.0)),
    );
    let row = |a: &str, b: f64, label: &str| {
        Row::from_ordered(label, &fs, vec![FeatureValue::from(a), FeatureValue::Number(b)])
    };
    let dataset = Dataset::new(
        Arc::clone(&fs),
        vec![
            row("0", 1.0, "X"),
            row("0", 5.0, "Y"),
            row("1", 2.0, "X"),
            row("1", 6.0, "Y"),
        ],
    );

    let tree = Id3Inducer::new().induce(&dataset).unwrap();
    tree.check_invariants().unwrap();

    let root = tree.root().unwrap();
    assert_eq!(root.feature.as_deref(), Some("B"));
    assert_eq!(root.threshold, Some(5.0));
    assert_eq!(tree.len(), 3);
    for r in dataset.rows() {
        assert_eq!(tree.predict(&r.values), Some(&r.label));
    }
}

#[test]
fn test_consistent_data_is_fit_exactly() {
    let dataset = consistent_dataset();
    let tree = Id3Inducer::new().induce(&dataset).unwrap();
    tree.check_invariants().unwrap();
    assert_eq!(accuracy(&tree, &dataset), 1.0);
}

#[test]
fn test_categorical_split_has_one_child_per_value() {
    let fs = features();
    let rows = vec![
        Row::new("UP", obs(Some(1.0), Some("a"))),
        Row::new("DOWN", obs(Some(1.0), Some("b"))),
        Row::new("UP", obs(Some(1.0), Some("a"))),
    ];
    let tree = Id3Inducer::new().induce(&Dataset::new(fs, rows)).unwrap();

    let root = tree.root().unwrap();
    assert_eq!(root.feature.as_deref(), Some("dir"));
    assert_eq!(root.threshold, None);
    assert_eq!(root.out.as_deref(), Some("UP"));
    let branches: Vec<&Branch> = root.children.keys().collect();
    assert_eq!(
        branches,
        vec![&Branch::Category("a".into()), &Branch::Category("b".into())]
    );
}

#[test]
fn test_conflicting_duplicates_fall_back_to_majority() {
    let fs = features();
    let rows = vec![
        Row::new("A", obs(Some(1.0), Some("a"))),
        Row::new("B", obs(Some(1.0), Some("a"))),
        Row::new("A", obs(Some(1.0), Some("a"))),
    ];
    let tree = Id3Inducer::new().induce(&Dataset::new(fs, rows)).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.node(ROOT).unwrap().out.as_deref(), Some("A"));
}

#[test]
fn test_empty_dataset_is_rejected() {
    assert!(Id3Inducer::new()
        .induce(&Dataset::empty(features()))
        .is_err());
}
