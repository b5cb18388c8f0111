pub mod decision_tree;
pub mod domain;
pub mod export;
pub mod node;

pub use decision_tree::{DecisionTree, ROOT};
pub use domain::{Domain, FeatureSet, FeatureSpec};
pub use export::TreeSnapshot;
pub use node::DecisionNode;
