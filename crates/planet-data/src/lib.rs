//! On-disk format for planet distance datasets.

pub mod errors;
pub mod load;
pub mod save;

pub use errors::{LoadError, SaveError};
pub use load::{load_dataset, load_dataset_file};
pub use save::{save_dataset, save_dataset_file, FORMAT_NAME, FORMAT_VERSION};
