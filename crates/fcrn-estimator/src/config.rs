//! Estimator configuration

use serde::{Deserialize, Serialize};

use crate::{ContactThreshold, FrameKind};

/// FCRN estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// ONNX export of the pretrained checkpoint
    pub checkpoint: Option<String>,

    /// Network input resolution
    pub input_width: u32,
    pub input_height: u32,

    /// Multiplier applied to raw network output
    pub output_scale: f32,

    /// Background the input is normalized against
    pub background_kind: FrameKind,

    /// Height-to-contact thresholding
    pub contact: ContactThreshold,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            checkpoint: None,
            input_width: 240,
            input_height: 320,
            output_scale: 1.0,
            background_kind: FrameKind::Gel,
            contact: ContactThreshold::default(),
        }
    }
}

/// Background image paths per frame kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Simulator-rendered gel without contact
    pub gel: Option<String>,
    /// No-contact frame captured on the physical sensor
    pub real: Option<String>,
}
