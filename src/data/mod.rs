pub mod connectors;
pub mod dataset;
pub mod recorder;

pub use connectors::{CsvConnector, DataValidator, DatasetMetadata};
pub use dataset::{csv_header, Dataset, Row};
pub use recorder::{DatasetRecorder, FeatureExtractor};
