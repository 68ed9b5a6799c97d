use std::path::PathBuf;

use planet_solver::ConstraintError;

/// Errors while loading a distance dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset: {0}")]
    ParseError(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    #[error("file version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("invalid constraint data: {0}")]
    Constraint(#[from] ConstraintError),
}

/// Errors while writing a distance dataset.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to serialize dataset: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
