//! Tactile Datasets
//!
//! Sources of evaluation samples:
//! - Manifest files listing image (and label) paths
//! - Real-sensor and simulated datasets
//! - A batch loader with fixed batch size, optional shuffling and `drop_last`

pub mod config;
pub mod dataset;
pub mod loader;
pub mod manifest;

pub use config::DatasetConfig;
pub use dataset::{Dataset, RealDataset, Sample, SimDataset};
pub use loader::{Batch, BatchLoader, BatchSource};
pub use manifest::read_manifest;

use std::path::PathBuf;
use thiserror::Error;

/// Dataset error types
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest length mismatch: {images} images but {labels} labels")]
    ManifestLengthMismatch { images: usize, labels: usize },

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Sample index {index} out of range for dataset of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Frame(#[from] tactile_frame::FrameError),
}
