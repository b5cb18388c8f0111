use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreevoError {
    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    #[error("Unknown node id {0}")]
    UnknownNode(usize),

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TreevoError>;
