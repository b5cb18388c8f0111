#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use treevolve::data::{Dataset, Row};
use treevolve::engines::tree::{DecisionNode, DecisionTree, Domain, FeatureSet};
use treevolve::types::{Branch, FeatureValue, Observation};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fresh, empty directory under the system temp dir
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "treevolve_{}_{}_{}",
        name,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// `x` numeric in [0, 9] step 1, `dir` categorical {a, b}
pub fn features() -> Arc<FeatureSet> {
    Arc::new(
        FeatureSet::new()
            .with("x", Domain::numeric(0.0, 9.0, 1.0))
            .with("dir", Domain::categorical(["a", "b"])),
    )
}

pub fn obs(x: Option<f64>, dir: Option<&str>) -> Observation {
    let mut o = Observation::new();
    if let Some(x) = x {
        o.insert("x".to_string(), FeatureValue::Number(x));
    }
    if let Some(d) = dir {
        o.insert("dir".to_string(), FeatureValue::from(d));
    }
    o
}

/// Label fully determined by the features
pub fn target(x: f64, dir: &str) -> &'static str {
    if x < 3.0 {
        "LEFT"
    } else if dir == "a" {
        "UP"
    } else {
        "RIGHT"
    }
}

/// Every point of the feature grid, labelled by [`target`]
pub fn consistent_dataset() -> Dataset {
    let fs = features();
    let mut rows = Vec::new();
    for x in 0..10 {
        for dir in ["a", "b"] {
            let x = x as f64;
            rows.push(Row::new(target(x, dir), obs(Some(x), Some(dir))));
        }
    }
    Dataset::new(fs, rows)
}

/// ```text
/// 0: x < 5 (LEFT)
/// ├─ True  -> 1: LEFT
/// └─ False -> 2: dir (RIGHT)
///             ├─ a -> 3: UP
///             └─ b -> 4: RIGHT
/// ```
pub fn sample_tree() -> DecisionTree {
    let mut tree = DecisionTree::new(features());
    let root = tree
        .add(DecisionNode::numeric_split("x", 5.0, "LEFT"), None)
        .unwrap();
    tree.add(DecisionNode::leaf("LEFT"), Some((root, Branch::True)))
        .unwrap();
    let dir = tree
        .add(
            DecisionNode::categorical_split("dir", "RIGHT"),
            Some((root, Branch::False)),
        )
        .unwrap();
    tree.add(DecisionNode::leaf("UP"), Some((dir, Branch::Category("a".into()))))
        .unwrap();
    tree.add(DecisionNode::leaf("RIGHT"), Some((dir, Branch::Category("b".into()))))
        .unwrap();
    tree
}

/// Observations covering the whole feature grid, plus missing values
pub fn probe_observations() -> Vec<Observation> {
    let mut probes = Vec::new();
    for x in 0..10 {
        for dir in ["a", "b"] {
            probes.push(obs(Some(x as f64), Some(dir)));
        }
        probes.push(obs(Some(x as f64), None));
    }
    probes.push(obs(None, Some("a")));
    probes.push(obs(None, None));
    probes
}
