//! Tactile Frame Types
//!
//! Data carried between the dataset, the estimator and the metrics:
//! - RGB sensor images at the fixed sensor resolution
//! - Height fields in pixel units
//! - Boolean contact masks

pub mod frame;
pub mod heightmap;
pub mod mask;

pub use frame::RgbFrame;
pub use heightmap::HeightMap;
pub use mask::ContactMask;

use std::path::PathBuf;
use thiserror::Error;

/// Frame error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Buffer length {actual} does not match {width}x{height}x{channels}")]
    BufferSize {
        width: u32,
        height: u32,
        channels: u32,
        actual: usize,
    },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}
