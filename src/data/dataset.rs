use crate::engines::tree::FeatureSet;
use crate::error::Result;
use crate::types::{FeatureValue, Label, Observation};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// One recorded observation tagged with its true label
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: Label,
    pub values: Observation,
}

impl Row {
    pub fn new(label: impl Into<Label>, values: Observation) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Builds a row from values given in feature-set order
    pub fn from_ordered<I>(label: impl Into<Label>, features: &FeatureSet, values: I) -> Self
    where
        I: IntoIterator<Item = FeatureValue>,
    {
        let values = features
            .names()
            .map(str::to_string)
            .zip(values)
            .collect();
        Self::new(label, values)
    }

    /// `{label},{values in feature order}`; missing values are left empty
    pub fn to_csv_line(&self, features: &FeatureSet) -> String {
        let mut line = self.label.clone();
        for name in features.names() {
            line.push(',');
            if let Some(v) = self.values.get(name) {
                line.push_str(&v.to_string());
            }
        }
        line
    }
}

/// Header line of a dataset file: an unnamed label column, then the features
pub fn csv_header(features: &FeatureSet) -> String {
    let names: Vec<&str> = features.names().collect();
    format!(",{}", names.join(","))
}

/// Labeled partition of recorded observations sharing one feature set
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Arc<FeatureSet>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(features: Arc<FeatureSet>, rows: Vec<Row>) -> Self {
        Self { features, rows }
    }

    pub fn empty(features: Arc<FeatureSet>) -> Self {
        Self::new(features, Vec::new())
    }

    pub fn features(&self) -> &Arc<FeatureSet> {
        &self.features
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn random_row<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Row> {
        self.rows.choose(rng)
    }

    /// Shuffled split into `(training, testing)`
    pub fn split<R: Rng + ?Sized>(&self, test_fraction: f64, rng: &mut R) -> (Dataset, Dataset) {
        let mut rows = self.rows.clone();
        rows.shuffle(rng);
        let test_len = ((rows.len() as f64) * test_fraction).round() as usize;
        let training = rows.split_off(test_len.min(rows.len()));
        (
            Dataset::new(Arc::clone(&self.features), training),
            Dataset::new(Arc::clone(&self.features), rows),
        )
    }

    /// Random subset without replacement holding `fraction` of the rows
    pub fn sample<R: Rng + ?Sized>(&self, fraction: f64, rng: &mut R) -> Dataset {
        let mut amount = ((self.rows.len() as f64) * fraction).round() as usize;
        if amount == 0 && !self.rows.is_empty() {
            amount = 1;
        }
        let rows = self
            .rows
            .choose_multiple(rng, amount.min(self.rows.len()))
            .cloned()
            .collect();
        Dataset::new(Arc::clone(&self.features), rows)
    }

    /// Rows of `self` whose serialized line does not appear in `other`
    pub fn without(&self, other: &Dataset) -> Dataset {
        let excluded: HashSet<String> = other
            .rows
            .iter()
            .map(|r| r.to_csv_line(&self.features))
            .collect();
        let rows = self
            .rows
            .iter()
            .filter(|r| !excluded.contains(&r.to_csv_line(&self.features)))
            .cloned()
            .collect();
        Dataset::new(Arc::clone(&self.features), rows)
    }

    /// Label frequencies in order of first appearance
    pub fn label_counts(&self) -> Vec<(Label, usize)> {
        let mut counts: Vec<(Label, usize)> = Vec::new();
        for row in &self.rows {
            match counts.iter_mut().find(|(l, _)| *l == row.label) {
                Some((_, c)) => *c += 1,
                None => counts.push((row.label.clone(), 1)),
            }
        }
        counts
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut contents = csv_header(&self.features);
        contents.push('\n');
        for row in &self.rows {
            contents.push_str(&row.to_csv_line(&self.features));
            contents.push('\n');
        }
        fs::write(path, contents)?;
        Ok(())
    }
}
