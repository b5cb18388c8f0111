//! Incremental recording of labeled observations into a dataset file.

use super::dataset::{csv_header, Row};
use crate::engines::tree::FeatureSet;
use crate::error::Result;
use crate::types::{Label, Observation};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Turns a raw state snapshot of the controlled system into an observation
pub trait FeatureExtractor<S>: Send + Sync {
    fn extract(&self, snapshot: &S) -> Observation;
}

impl<S, F> FeatureExtractor<S> for F
where
    F: Fn(&S) -> Observation + Send + Sync,
{
    fn extract(&self, snapshot: &S) -> Observation {
        self(snapshot)
    }
}

/// Appends rows to a dataset file, skipping lines already present
pub struct DatasetRecorder {
    path: PathBuf,
    features: Arc<FeatureSet>,
    seen: HashSet<String>,
    file: File,
}

impl DatasetRecorder {
    /// Opens `path` for recording. An existing file is extended unless
    /// `overwrite` is set, in which case it is truncated to a fresh header.
    pub fn open<P: AsRef<Path>>(path: P, features: Arc<FeatureSet>, overwrite: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut seen = HashSet::new();

        let file = if path.exists() && !overwrite {
            let contents = fs::read_to_string(&path)?;
            seen.extend(
                contents
                    .lines()
                    .skip(1)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string),
            );
            OpenOptions::new().append(true).open(&path)?
        } else {
            let mut file = File::create(&path)?;
            writeln!(file, "{}", csv_header(&features))?;
            file
        };

        log::debug!(
            "Recording into {} ({} existing rows)",
            path.display(),
            seen.len()
        );
        Ok(Self {
            path,
            features,
            seen,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct rows in the file
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Returns `false` when an identical line was already recorded
    pub fn record_row(&mut self, row: &Row) -> Result<bool> {
        let line = row.to_csv_line(&self.features);
        if self.seen.contains(&line) {
            return Ok(false);
        }
        writeln!(self.file, "{}", line)?;
        self.seen.insert(line);
        Ok(true)
    }

    pub fn record<S, E>(&mut self, extractor: &E, snapshot: &S, label: impl Into<Label>) -> Result<bool>
    where
        E: FeatureExtractor<S> + ?Sized,
    {
        let row = Row::new(label, extractor.extract(snapshot));
        self.record_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::tree::Domain;
    use crate::types::FeatureValue;

    struct Sensor {
        distance: f64,
    }

    #[test]
    fn test_duplicate_lines_are_skipped() {
        let dir = std::env::temp_dir().join(format!("treevolve_recorder_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dataset.csv");
        let features = Arc::new(FeatureSet::new().with("distance", Domain::numeric(0.0, 10.0, 1.0)));
        let extractor = |s: &Sensor| {
            let mut obs = Observation::new();
            obs.insert("distance".to_string(), FeatureValue::Number(s.distance));
            obs
        };

        let mut recorder = DatasetRecorder::open(&path, Arc::clone(&features), true).unwrap();
        assert!(recorder.record(&extractor, &Sensor { distance: 3.0 }, "STOP").unwrap());
        assert!(!recorder.record(&extractor, &Sensor { distance: 3.0 }, "STOP").unwrap());
        assert!(recorder.record(&extractor, &Sensor { distance: 4.0 }, "GO").unwrap());
        drop(recorder);

        let reopened = DatasetRecorder::open(&path, features, false).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            ",distance\nSTOP,3\nGO,4\n"
        );
        fs::remove_dir_all(&dir).ok();
    }
}
