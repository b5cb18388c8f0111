use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a node, unique within its owning tree
pub type NodeId = usize;

/// Classification output (the action chosen by a tree)
pub type Label = String;

/// One observation of the world: feature name -> observed value
pub type Observation = HashMap<String, FeatureValue>;

/// Observed value of a single feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Category(_) => None,
        }
    }

    /// Branch key used when this value is tested by a categorical node
    pub fn as_category(&self) -> String {
        match self {
            Self::Number(v) => v.to_string(),
            Self::Category(s) => s.clone(),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Category(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        Self::Category(v.to_string())
    }
}

/// Label of the edge between a node and one of its children.
///
/// Numeric splits use `True` for `value < threshold` and `False` otherwise;
/// categorical splits carry the matched value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Branch {
    True,
    False,
    Category(String),
}

impl Branch {
    pub fn from_comparison(is_less: bool) -> Self {
        if is_less {
            Self::True
        } else {
            Self::False
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Category(s) => write!(f, "{}", s),
        }
    }
}
