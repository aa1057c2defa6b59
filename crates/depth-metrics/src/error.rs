//! Metric Error Types

use thiserror::Error;

/// Errors while computing or reducing metrics
#[derive(Debug, Error)]
pub enum MetricError {
    /// Prediction and ground truth differ in resolution
    #[error("{metric}: prediction is {prediction:?} but ground truth is {ground_truth:?}")]
    ShapeMismatch {
        metric: &'static str,
        prediction: (usize, usize),
        ground_truth: (usize, usize),
    },

    /// Every recorded value was NaN (or nothing was recorded)
    #[error("No valid {metric} values to average ({recorded} recorded)")]
    NoValidSamples { metric: &'static str, recorded: usize },

    /// Failed to write the summary file
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
