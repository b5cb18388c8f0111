use crate::engines::tree::FeatureSet;
use crate::error::{Result, TreevoError};
use polars::prelude::*;

pub struct DataValidator;

impl DataValidator {
    /// Every feature must have a column; numeric features need a numeric dtype
    pub fn validate_feature_columns(df: &DataFrame, features: &FeatureSet) -> Result<()> {
        let columns = df.get_column_names();
        for spec in features.iter() {
            if !columns.iter().any(|col| col.as_str() == spec.name) {
                return Err(TreevoError::DataLoading(format!(
                    "Missing feature column: {}",
                    spec.name
                )));
            }
            // Header-only files carry no usable dtype.
            if !spec.domain.is_numeric() || df.height() == 0 {
                continue;
            }
            let series = df.column(&spec.name)?;
            if !matches!(
                series.dtype(),
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
                    | DataType::Null
            ) {
                return Err(TreevoError::DataLoading(format!(
                    "Column '{}' must be numeric, found {:?}",
                    spec.name,
                    series.dtype()
                )));
            }
        }
        Ok(())
    }

    /// The label is the first column and may not be missing
    pub fn validate_labels(df: &DataFrame) -> Result<()> {
        let Some(labels) = df.get_columns().first() else {
            return Err(TreevoError::DataLoading("Dataset has no columns".to_string()));
        };
        if labels.null_count() > 0 {
            return Err(TreevoError::DataLoading(format!(
                "Label column has {} missing values",
                labels.null_count()
            )));
        }
        Ok(())
    }

    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();
        for series in df.get_columns() {
            let null_count = series.null_count();
            if null_count > 0 {
                null_report.push((series.name().to_string(), null_count));
            }
        }
        Ok(null_report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::tree::Domain;
    use polars::df;

    fn features() -> FeatureSet {
        FeatureSet::new()
            .with("x", Domain::numeric(0.0, 10.0, 1.0))
            .with("dir", Domain::categorical(["a", "b"]))
    }

    #[test]
    fn test_validate_good_columns() {
        let df = df! {
            "label" => &["L", "R"],
            "x" => &[1.0, 2.0],
            "dir" => &["a", "b"],
        }
        .unwrap();
        assert!(DataValidator::validate_feature_columns(&df, &features()).is_ok());
        assert!(DataValidator::validate_labels(&df).is_ok());
    }

    #[test]
    fn test_missing_feature_column() {
        let df = df! {
            "label" => &["L", "R"],
            "x" => &[1.0, 2.0],
        }
        .unwrap();
        assert!(DataValidator::validate_feature_columns(&df, &features()).is_err());
    }

    #[test]
    fn test_numeric_feature_with_text_values() {
        let df = df! {
            "label" => &["L", "R"],
            "x" => &["high", "low"],
            "dir" => &["a", "b"],
        }
        .unwrap();
        assert!(DataValidator::validate_feature_columns(&df, &features()).is_err());
    }
}
