//! Durable run directory.
//!
//! ```text
//! <root>/firstgen/{n}.json      seed population
//! <root>/firstgen.partial/      seed population being written
//! <root>/lastgen/{n}.json       population to evolve next
//! <root>/lastgen.partial/       replacement being written
//! <root>/history.ga             one JSON record per completed generation
//! <root>/testing.csv            held-out partition
//! ```

use super::history::{HistoryLog, HistoryRecord};
use crate::data::{CsvConnector, Dataset};
use crate::engines::tree::{DecisionTree, FeatureSet};
use crate::error::{Result, TreevoError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const HISTORY_FILE_NAME: &str = "history.ga";
pub const FIRST_GEN_DIR: &str = "firstgen";
pub const FIRST_PARTIAL_DIR: &str = "firstgen.partial";
pub const LAST_GEN_DIR: &str = "lastgen";
pub const PARTIAL_GEN_DIR: &str = "lastgen.partial";
pub const TESTING_SET_NAME: &str = "testing.csv";
const GENERATION_MARKER: &str = "generation";

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    root: PathBuf,
    history: HistoryLog,
}

impl CheckpointStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let history = HistoryLog::new(root.join(HISTORY_FILE_NAME));
        Ok(Self { root, history })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn load_history(&self) -> Result<Vec<HistoryRecord>> {
        self.history.load()
    }

    pub fn append_history(&mut self, record: &HistoryRecord) -> Result<()> {
        self.history.append(record)
    }

    pub fn testing_path(&self) -> PathBuf {
        self.root.join(TESTING_SET_NAME)
    }

    pub fn save_testing(&self, testing: &Dataset) -> Result<()> {
        testing.write_csv(self.testing_path())
    }

    pub fn load_testing(&self, features: Arc<FeatureSet>) -> Result<Option<Dataset>> {
        let path = self.testing_path();
        if !path.is_file() {
            return Ok(None);
        }
        CsvConnector::load_dataset(path, features).map(Some)
    }

    /// Settles a replacement left behind by an interrupted checkpoint. A
    /// partial snapshot whose generation already made it into the history is
    /// promoted; anything else is discarded, including an unfinished seed
    /// population.
    pub fn recover(&self) -> Result<()> {
        let seed_partial = self.root.join(FIRST_PARTIAL_DIR);
        if seed_partial.is_dir() {
            log::warn!("Discarding incomplete seed population {}", seed_partial.display());
            fs::remove_dir_all(&seed_partial)?;
        }

        let partial = self.root.join(PARTIAL_GEN_DIR);
        if !partial.is_dir() {
            return Ok(());
        }
        let marker = fs::read_to_string(partial.join(GENERATION_MARKER))
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok());
        let last = self.history.last()?.map(|r| r.generation);

        if marker.is_some() && marker == last {
            log::warn!(
                "Promoting snapshot of generation {} left by an interrupted checkpoint",
                marker.unwrap_or_default()
            );
            self.commit_partial()
        } else {
            log::warn!("Discarding incomplete snapshot {}", partial.display());
            fs::remove_dir_all(&partial)?;
            Ok(())
        }
    }

    /// Most recent population, falling back to the seed population
    pub fn load_population(&self, features: &Arc<FeatureSet>) -> Result<Option<Vec<DecisionTree>>> {
        for dir in [LAST_GEN_DIR, FIRST_GEN_DIR] {
            let population = self.load_dir(&self.root.join(dir), features)?;
            if !population.is_empty() {
                log::info!("Loaded {} individuals from {}", population.len(), dir);
                return Ok(Some(population));
            }
        }
        Ok(None)
    }

    /// Writes the seed population next to `firstgen/` and renames it into
    /// place once every individual is on disk
    pub fn save_first_generation(&self, population: &[DecisionTree]) -> Result<()> {
        let partial = self.root.join(FIRST_PARTIAL_DIR);
        let dir = self.root.join(FIRST_GEN_DIR);
        Self::write_dir(&partial, population)?;
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::rename(&partial, &dir)?;
        Ok(())
    }

    /// Writes `population` as the pending replacement of the last generation
    pub fn write_partial(&self, population: &[DecisionTree], generation: usize) -> Result<()> {
        let dir = self.root.join(PARTIAL_GEN_DIR);
        Self::write_dir(&dir, population)?;
        fs::write(dir.join(GENERATION_MARKER), generation.to_string())?;
        Ok(())
    }

    /// Replaces the last-generation snapshot with the pending one
    pub fn commit_partial(&self) -> Result<()> {
        let partial = self.root.join(PARTIAL_GEN_DIR);
        let last = self.root.join(LAST_GEN_DIR);
        if !partial.is_dir() {
            return Err(TreevoError::Checkpoint(
                "No pending snapshot to commit".to_string(),
            ));
        }
        if last.exists() {
            fs::remove_dir_all(&last)?;
        }
        fs::rename(&partial, &last)?;
        let marker = last.join(GENERATION_MARKER);
        if marker.exists() {
            fs::remove_file(marker)?;
        }
        Ok(())
    }

    fn write_dir(dir: &Path, population: &[DecisionTree]) -> Result<()> {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(dir)?;
        for (n, tree) in population.iter().enumerate() {
            tree.save(dir.join(format!("{}.json", n)))?;
        }
        Ok(())
    }

    fn load_dir(&self, dir: &Path, features: &Arc<FeatureSet>) -> Result<Vec<DecisionTree>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files: Vec<(usize, PathBuf)> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let index = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(usize::MAX);
            files.push((index, path));
        }
        files.sort();
        files
            .into_iter()
            .map(|(_, path)| DecisionTree::load(path, Arc::clone(features)))
            .collect()
    }
}
