use crate::error::{Result, TreevoError};
use crate::types::FeatureValue;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Legal value space of a feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Domain {
    Numeric { min: f64, max: f64, step: f64 },
    Categorical { values: Vec<String> },
}

impl Domain {
    pub fn numeric(min: f64, max: f64, step: f64) -> Self {
        Self::Numeric { min, max, step }
    }

    pub fn categorical<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Categorical {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric { .. })
    }

    /// Every value of the domain, in order
    pub fn values(&self) -> Vec<FeatureValue> {
        match self {
            Self::Numeric { min, max, step } => {
                let mut out = Vec::new();
                if *step <= 0.0 {
                    return out;
                }
                let mut i = 0.0;
                loop {
                    let v = min + i * step;
                    if v > *max {
                        break;
                    }
                    out.push(FeatureValue::Number(v));
                    i += 1.0;
                }
                out
            }
            Self::Categorical { values } => values
                .iter()
                .map(|v| FeatureValue::Category(v.clone()))
                .collect(),
        }
    }

    /// Uniform draw from the domain
    pub fn random_value<R: Rng + ?Sized>(&self, rng: &mut R) -> FeatureValue {
        match self {
            Self::Numeric { min, max, .. } => {
                if max <= min {
                    FeatureValue::Number(*min)
                } else {
                    FeatureValue::Number(rng.gen_range(*min..=*max))
                }
            }
            Self::Categorical { values } => {
                let idx = rng.gen_range(0..values.len().max(1));
                FeatureValue::Category(values.get(idx).cloned().unwrap_or_default())
            }
        }
    }

    /// Threshold perturbation in `±scale * (max - min)`, snapped to the step grid.
    /// Categorical domains have no meaningful delta and always yield 0.
    pub fn random_delta<R: Rng + ?Sized>(&self, rng: &mut R, scale: f64) -> f64 {
        match self {
            Self::Numeric { min, max, step } => {
                let span = (max - min) * scale;
                if span <= 0.0 {
                    return 0.0;
                }
                let raw = rng.gen_range(-span..=span);
                if *step > 0.0 {
                    (raw / step).round() * step
                } else {
                    raw
                }
            }
            Self::Categorical { .. } => 0.0,
        }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        match self {
            Self::Numeric { min, max, step } => {
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(TreevoError::Configuration(format!(
                        "Feature '{}' has an invalid numeric range [{}, {}]",
                        name, min, max
                    )));
                }
                if *step <= 0.0 {
                    return Err(TreevoError::Configuration(format!(
                        "Feature '{}' must have a positive step, got {}",
                        name, step
                    )));
                }
            }
            Self::Categorical { values } => {
                if values.is_empty() {
                    return Err(TreevoError::Configuration(format!(
                        "Feature '{}' has an empty categorical domain",
                        name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub domain: Domain,
}

/// Ordered mapping feature name -> domain, shared read-only by every tree of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    features: Vec<FeatureSpec>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion. Duplicate names are logged and skipped; use
    /// [`FeatureSet::insert`] to get the error instead.
    pub fn with(mut self, name: impl Into<String>, domain: Domain) -> Self {
        if let Err(e) = self.insert(name, domain) {
            log::warn!("{}; keeping the first declaration", e);
        }
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, domain: Domain) -> Result<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(TreevoError::Configuration(format!(
                "Duplicate feature '{}'",
                name
            )));
        }
        self.features.push(FeatureSpec { name, domain });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Domain> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.domain)
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.get(name).map(Domain::is_numeric).unwrap_or(false)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(TreevoError::Configuration(
                "At least one feature must be declared".to_string(),
            ));
        }
        for (i, spec) in self.features.iter().enumerate() {
            if self.features[..i].iter().any(|f| f.name == spec.name) {
                return Err(TreevoError::Configuration(format!(
                    "Duplicate feature '{}'",
                    spec.name
                )));
            }
            spec.domain.validate(&spec.name)?;
        }
        Ok(())
    }
}

impl FromIterator<FeatureSpec> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = FeatureSpec>>(iter: T) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}
