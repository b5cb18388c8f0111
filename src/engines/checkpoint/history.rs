use crate::engines::tree::TreeSnapshot;
use crate::error::{Result, TreevoError};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One line of the history log: the outcome of a completed generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub generation: usize,
    pub best_fitness: f64,
    pub best_tree: TreeSnapshot,
    pub avg_fitness: f64,
}

/// Append-only, newline-delimited JSON log
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
    /// Generation of the last record, once read from disk or appended
    last_generation: Option<Option<usize>>,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_generation: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in file order; a missing file is an empty history
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    TreevoError::Checkpoint(format!(
                        "Corrupt history record at {}:{}: {}",
                        self.path.display(),
                        n + 1,
                        e
                    ))
                })
            })
            .collect()
    }

    pub fn last(&self) -> Result<Option<HistoryRecord>> {
        Ok(self.load()?.pop())
    }

    /// Generation of the last record. The file is parsed at most once per log.
    pub fn last_generation(&mut self) -> Result<Option<usize>> {
        if let Some(cached) = self.last_generation {
            return Ok(cached);
        }
        let last = self.last()?.map(|r| r.generation);
        self.last_generation = Some(last);
        Ok(last)
    }

    /// Appends `record`, refusing anything but the next generation number
    pub fn append(&mut self, record: &HistoryRecord) -> Result<()> {
        let expected = self.last_generation()?.map_or(1, |g| g + 1);
        if record.generation != expected {
            return Err(TreevoError::Checkpoint(format!(
                "History expects generation {}, got {}",
                expected, record.generation
            )));
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        file.sync_data()?;
        self.last_generation = Some(Some(record.generation));
        Ok(())
    }
}
