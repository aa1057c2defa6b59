//! FCRN Estimator
//!
//! Height-field and contact-mask estimation for tactile images:
//! - Background frames the network input is normalized against
//! - The `Estimator` capability used by the evaluation driver
//! - An ONNX-backed FCRN implementation running on tract

pub mod background;
pub mod config;
pub mod contact;
pub mod fcrn;

pub use background::{BackgroundProvider, FrameKind, ImageBackgrounds};
pub use config::{BackgroundConfig, EstimatorConfig};
pub use contact::ContactThreshold;
pub use fcrn::FcrnEstimator;

use tactile_frame::{ContactMask, HeightMap, RgbFrame};
use thiserror::Error;

/// Errors during estimation
#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Invalid output shape: expected {expected}, got {actual}")]
    InvalidOutputShape { expected: String, actual: String },

    #[error("No background image configured for {0:?} frames")]
    MissingBackground(FrameKind),

    #[error(transparent)]
    Frame(#[from] tactile_frame::FrameError),
}

/// Image to height field to contact mask
pub trait Estimator {
    /// Predict a height field (pixel units) at the image's resolution
    fn image_to_heightmap(&self, image: &RgbFrame) -> Result<HeightMap, EstimatorError>;

    /// Pixels of the height field considered in contact
    fn heightmap_to_mask(&self, heightmap: &HeightMap) -> ContactMask;
}
