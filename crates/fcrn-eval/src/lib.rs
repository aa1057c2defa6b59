//! FCRN Evaluation Harness
//!
//! Runs a height-map estimator over real or simulated tactile datasets,
//! writes per-sample artifacts and reduces simulated runs to an RMSE/IoU
//! summary file.

pub mod artifacts;
pub mod config;
pub mod driver;
pub mod logging;
pub mod pipeline;

pub use artifacts::ArtifactWriter;
pub use config::EvalConfig;
pub use driver::{Evaluator, RunReport};
pub use logging::init_logging;
pub use pipeline::{evaluate_real, evaluate_sim, visualize};

use std::path::PathBuf;
use thiserror::Error;

/// Evaluation error types
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Missing setting `{0}`")]
    MissingSetting(&'static str),

    #[error("Invalid value {value:?} for `{key}`")]
    InvalidSetting { key: &'static str, value: String },

    #[error("Failed to install log subscriber: {0}")]
    Logging(String),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sample {index} ({path}) has no ground-truth height field")]
    MissingGroundTruth { index: usize, path: PathBuf },

    #[error("Failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode report: {0}")]
    ReportEncode(#[from] serde_json::Error),

    #[error(transparent)]
    Frame(#[from] tactile_frame::FrameError),

    #[error(transparent)]
    Dataset(#[from] tactile_dataset::DatasetError),

    #[error(transparent)]
    Estimator(#[from] fcrn_estimator::EstimatorError),

    #[error(transparent)]
    Metric(#[from] depth_metrics::MetricError),

    #[error(transparent)]
    Viz(#[from] heightmap_viz::VizError),
}
