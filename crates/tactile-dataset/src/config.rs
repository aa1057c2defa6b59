//! Dataset configuration

use serde::{Deserialize, Serialize};

/// Loader and sample-decoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Samples per batch
    pub batch_size: usize,

    /// Shuffle sample order once per loader
    pub shuffle: bool,

    /// Seed for shuffling; random when unset
    pub seed: Option<u64>,

    /// Drop a trailing batch smaller than `batch_size`
    pub drop_last: bool,

    /// Sensor resolution every image and label is resized to
    pub sensor_width: u32,
    pub sensor_height: u32,

    /// Multiplier from stored label values to height in pixel units
    pub label_scale: f32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            shuffle: false,
            seed: None,
            drop_last: true,
            sensor_width: 240,
            sensor_height: 320,
            label_scale: 1.0,
        }
    }
}
