//! Evaluation configuration
//!
//! Layered with the `config` crate: an optional TOML file first, then
//! `FCRN_`-prefixed environment variables using `__` between nested keys
//! (`FCRN_MODEL__CHECKPOINT=/weights/fcrn.onnx`).

use std::path::{Path, PathBuf};

use depth_metrics::{EmptyMaskPolicy, DEFAULT_PIXEL_TO_MM};
use fcrn_estimator::{BackgroundConfig, EstimatorConfig};
use heightmap_viz::{Colormap, RenderConfig};
use serde::{Deserialize, Serialize};
use tactile_dataset::DatasetConfig;
use tracing::debug;

use crate::EvalError;

/// Complete harness configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub model: EstimatorConfig,
    pub background: BackgroundConfig,
    pub manifests: ManifestConfig,
    pub loader: DatasetConfig,
    pub metrics: MetricsConfig,
    pub output: OutputConfig,
    pub render: RenderConfig,
    pub logging: LoggingConfig,
}

/// Sample lists for each evaluation mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Real-sensor image paths
    pub real: Option<String>,
    /// Simulator image paths
    pub sim_data: Option<String>,
    /// Ground-truth height labels, line-aligned with `sim_data`
    pub sim_labels: Option<String>,
}

/// Metric computation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Millimeters per height-field pixel unit
    pub pixel_to_mm: f64,
    /// IoU reported when prediction and ground truth are both empty
    pub empty_mask: EmptyMaskPolicy,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            pixel_to_mm: DEFAULT_PIXEL_TO_MM,
            empty_mask: EmptyMaskPolicy::Exclude,
        }
    }
}

/// Where and how results are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    /// Run summary, relative to `dir`
    pub summary_file: String,
    /// Also write per-sample metrics as JSON (simulated runs)
    pub sample_report: bool,
    /// Color scale for `<index>_pred_heightmap.png`
    pub heightmap_colormap: Colormap,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "fcrn-testing".to_string(),
            summary_file: "fcrn_error.txt".to_string(),
            sample_report: false,
            heightmap_colormap: Colormap::Viridis,
        }
    }
}

impl OutputConfig {
    /// Run summary file inside the output directory
    pub fn summary_path(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.summary_file)
    }

    /// Per-sample JSON report inside the output directory
    pub fn sample_report_path(&self) -> PathBuf {
        Path::new(&self.dir).join("fcrn_samples.json")
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EvalConfig {
    /// Load defaults, then `path` (if given), then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, EvalError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                ::config::Environment::with_prefix("FCRN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Configured checkpoint path, required by both evaluation modes
    pub fn checkpoint(&self) -> Result<&str, EvalError> {
        self.model
            .checkpoint
            .as_deref()
            .ok_or(EvalError::MissingSetting("model.checkpoint"))
    }
}
