use std::path::Path;

use planet_solver::{Constraint, ConstraintSet};
use serde::Serialize;

use crate::errors::SaveError;

/// Format identifier written into every dataset file.
pub const FORMAT_NAME: &str = "planet-distances";

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// The top-level file structure.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetFile<'a> {
    /// Format identifier.
    pub format: &'a str,
    /// Format version number.
    pub version: u32,
    /// Every point, in solver order.
    pub planets: &'a [String],
    /// Measured distances, in load order.
    pub distances: &'a [Constraint],
}

/// Serialize a constraint set to a pretty-printed JSON string.
///
/// The planet list is always written, so loading the result reproduces the
/// same point order even for points without constraints.
pub fn save_dataset(set: &ConstraintSet) -> Result<String, SaveError> {
    let file = DatasetFile {
        format: FORMAT_NAME,
        version: FORMAT_VERSION,
        planets: set.names(),
        distances: set.constraints(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn save_dataset_file(set: &ConstraintSet, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let path = path.as_ref();
    let json = save_dataset(set)?;
    std::fs::write(path, json).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}
