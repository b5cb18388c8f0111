use super::{types::DatasetMetadata, validator::DataValidator};
use crate::data::dataset::{Dataset, Row};
use crate::engines::tree::FeatureSet;
use crate::error::{Result, TreevoError};
use crate::types::{FeatureValue, Observation};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| TreevoError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Loads a labeled dataset: first column is the label, features are matched by name
    pub fn load_dataset<P: AsRef<Path>>(path: P, features: Arc<FeatureSet>) -> Result<Dataset> {
        let df = Self::load(&path)?;
        DataValidator::validate_labels(&df)?;
        DataValidator::validate_feature_columns(&df, &features)?;

        let null_report = DataValidator::check_nulls(&df)?;
        if !null_report.is_empty() {
            log::warn!("Null values detected: {:?}", null_report);
        }

        let label_column = df.get_columns()[0].cast(&DataType::String)?;
        let labels = label_column.str()?;

        let mut columns = Vec::with_capacity(features.len());
        for spec in features.iter() {
            let target = if spec.domain.is_numeric() {
                DataType::Float64
            } else {
                DataType::String
            };
            columns.push((spec.name.clone(), df.column(&spec.name)?.cast(&target)?));
        }

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let label = labels.get(i).ok_or_else(|| {
                TreevoError::DataLoading(format!("Missing label at row {}", i))
            })?;
            let mut values = Observation::new();
            for (name, column) in &columns {
                let value = match column.dtype() {
                    DataType::Float64 => column.f64()?.get(i).map(FeatureValue::Number),
                    _ => column.str()?.get(i).map(FeatureValue::from),
                };
                if let Some(value) = value {
                    values.insert(name.clone(), value);
                }
            }
            rows.push(Row::new(label, values));
        }

        log::info!(
            "Loaded {} rows from {}",
            rows.len(),
            path.as_ref().display()
        );
        Ok(Dataset::new(features, rows))
    }

    pub fn create_metadata<P: AsRef<Path>>(
        path: P,
        df: &DataFrame,
        features: &FeatureSet,
    ) -> Result<DatasetMetadata> {
        let label_column = df
            .get_column_names()
            .first()
            .map(|s| s.to_string())
            .unwrap_or_default();
        let mut label_counts: Vec<(String, usize)> = Vec::new();
        if let Some(column) = df.get_columns().first() {
            let labels = column.cast(&DataType::String)?;
            for label in labels.str()?.into_iter().flatten() {
                match label_counts.iter_mut().find(|(l, _)| l == label) {
                    Some((_, c)) => *c += 1,
                    None => label_counts.push((label.to_string(), 1)),
                }
            }
        }

        Ok(DatasetMetadata {
            file_path: path.as_ref().to_string_lossy().to_string(),
            num_rows: df.height(),
            num_columns: df.width(),
            label_column,
            feature_columns: features.names().map(str::to_string).collect(),
            label_counts,
            null_counts: DataValidator::check_nulls(df)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::tree::Domain;
    use polars::df;

    #[test]
    fn test_create_metadata() {
        let df = df! {
            "label" => &["L", "R", "L"],
            "x" => &[1.0, 2.0, 3.0],
        }
        .unwrap();
        let features = FeatureSet::new().with("x", Domain::numeric(0.0, 5.0, 1.0));

        let metadata = CsvConnector::create_metadata("test.csv", &df, &features).unwrap();
        assert_eq!(metadata.num_rows, 3);
        assert_eq!(metadata.label_column, "label");
        assert_eq!(
            metadata.label_counts,
            vec![("L".to_string(), 2), ("R".to_string(), 1)]
        );
    }
}
