use serde::{Deserialize, Serialize};

/// Summary of a loaded dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub file_path: String,
    pub num_rows: usize,
    pub num_columns: usize,
    pub label_column: String,
    pub feature_columns: Vec<String>,
    /// Label frequencies in order of first appearance
    pub label_counts: Vec<(String, usize)>,
    pub null_counts: Vec<(String, usize)>,
}
