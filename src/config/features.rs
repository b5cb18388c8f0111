use super::traits::ConfigSection;
use crate::engines::tree::{FeatureSet, FeatureSpec};
use crate::error::TreevoError;
use serde::{Deserialize, Serialize};

/// Declared features, in dataset column order:
///
/// ```toml
/// [[features]]
/// name = "distance"
/// domain = { kind = "numeric", min = 0.0, max = 20.0, step = 1.0 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeaturesConfig {
    pub specs: Vec<FeatureSpec>,
}

impl FeaturesConfig {
    pub fn to_feature_set(&self) -> Result<FeatureSet, TreevoError> {
        let features: FeatureSet = self.specs.iter().cloned().collect();
        features.validate()?;
        Ok(features)
    }
}

impl ConfigSection for FeaturesConfig {
    fn section_name() -> &'static str {
        "features"
    }

    fn validate(&self) -> Result<(), TreevoError> {
        self.to_feature_set().map(|_| ())
    }
}
