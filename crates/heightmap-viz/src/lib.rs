//! Height-Field Visualization
//!
//! - Perceptually uniform color maps for 2D height-field images
//! - Off-screen rendering of a masked height field as a textured 3D surface
//! - Batch export over paired height-field and mask directories

pub mod colormap;
pub mod export;
pub mod surface;

pub use colormap::{save_colormapped, Colormap};
pub use export::{export_directory, sorted_by_numeric_prefix};
pub use surface::{RenderConfig, SurfaceRenderer};

use std::path::PathBuf;
use thiserror::Error;

/// Visualization error types
#[derive(Error, Debug)]
pub enum VizError {
    #[error("Failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File name has no numeric prefix: {0}")]
    NoNumericPrefix(PathBuf),

    #[error("Surface needs at least 2x2 samples, got {rows}x{cols}")]
    Degenerate { rows: usize, cols: usize },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Frame(#[from] tactile_frame::FrameError),
}
