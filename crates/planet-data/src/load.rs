use std::path::Path;

use planet_solver::{Constraint, ConstraintSet};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::LoadError;
use crate::save::{FORMAT_NAME, FORMAT_VERSION};

/// The top-level file structure for deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetFileRaw {
    pub format: String,
    pub version: u32,
    /// Optional explicit universe. When present it fixes the point order.
    #[serde(default)]
    pub planets: Option<Vec<String>>,
    pub distances: Vec<Constraint>,
}

/// Deserialize a constraint set from a JSON string.
///
/// Accepts either a full dataset document or a bare array of distance
/// records. Validates the format identifier, the version and every record.
pub fn load_dataset(json: &str) -> Result<ConstraintSet, LoadError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    let set = if value.is_array() {
        let records: Vec<Constraint> =
            serde_json::from_value(value).map_err(|e| LoadError::ParseError(e.to_string()))?;
        debug!(records = records.len(), "loading bare distance list");
        ConstraintSet::new(records)?
    } else {
        let raw: DatasetFileRaw =
            serde_json::from_value(value).map_err(|e| LoadError::ParseError(e.to_string()))?;

        if raw.format != FORMAT_NAME {
            return Err(LoadError::UnknownFormat(raw.format));
        }
        if raw.version > FORMAT_VERSION {
            return Err(LoadError::FutureVersion {
                file_version: raw.version,
                supported_version: FORMAT_VERSION,
            });
        }

        match raw.planets {
            Some(planets) => ConstraintSet::with_points(planets, raw.distances)?,
            None => ConstraintSet::new(raw.distances)?,
        }
    };

    info!(
        points = set.len_points(),
        constraints = set.constraints().len(),
        "dataset loaded"
    );
    Ok(set)
}

/// Read and deserialize a dataset file.
pub fn load_dataset_file(path: impl AsRef<Path>) -> Result<ConstraintSet, LoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_dataset(&json)
}
