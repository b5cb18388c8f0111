use super::traits::ConfigSection;
use crate::error::TreevoError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a run keeps its data and how it executes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Checkpoint directory
    pub run_dir: PathBuf,
    /// Recorded dataset, relative to `run_dir` unless absolute
    pub dataset_file: PathBuf,
    /// Share of the dataset held out as `testing.csv`
    pub test_fraction: f64,
    pub workers: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Where inconsistent trees are dumped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postmortem_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            run_dir: PathBuf::from("run"),
            dataset_file: PathBuf::from("dataset.csv"),
            test_fraction: 0.3,
            workers: 0,
            seed: None,
            postmortem_dir: None,
        }
    }
}

impl RunConfig {
    pub fn dataset_path(&self) -> PathBuf {
        if self.dataset_file.is_absolute() {
            self.dataset_file.clone()
        } else {
            self.run_dir.join(&self.dataset_file)
        }
    }
}

impl ConfigSection for RunConfig {
    fn section_name() -> &'static str {
        "run"
    }

    fn validate(&self) -> Result<(), TreevoError> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(TreevoError::Configuration(
                "Test fraction must be in [0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}
