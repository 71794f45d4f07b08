use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Dictionary unavailable at {}: {source}", path.display())]
    DictionaryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker failed: {0}")]
    WorkerFailed(String),

    #[error("Incomplete build: merged {merged} of {expected} partitions")]
    IncompleteBuild { merged: usize, expected: usize },

    #[error("{0}")]
    Other(String),
}
