//! Run-level metric aggregation

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::MetricError;

/// Metrics recorded for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleMetrics {
    /// Zero-based position in the evaluation pass
    pub index: usize,
    /// Height-map RMSE in millimeters
    pub rmse: f64,
    /// Contact-mask IoU
    pub iou: f64,
}

/// Append-only per-sample RMSE and IoU sequences.
///
/// NaN entries are kept here and only dropped by [`MetricAccumulator::summarize`].
#[derive(Debug, Default)]
pub struct MetricAccumulator {
    rmse: Vec<f64>,
    iou: Vec<f64>,
}

impl MetricAccumulator {
    /// Empty accumulator for a new run
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample; returns what was stored
    pub fn record(&mut self, rmse: f64, iou: f64) -> SampleMetrics {
        let index = self.rmse.len();
        self.rmse.push(rmse);
        self.iou.push(iou);
        SampleMetrics { index, rmse, iou }
    }

    /// Number of recorded samples, NaNs included
    pub fn len(&self) -> usize {
        self.rmse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rmse.is_empty()
    }

    /// Per-sample RMSE in record order
    pub fn rmse_values(&self) -> &[f64] {
        &self.rmse
    }

    /// Per-sample IoU in record order
    pub fn iou_values(&self) -> &[f64] {
        &self.iou
    }

    /// Recorded samples with their indices
    pub fn samples(&self) -> impl Iterator<Item = SampleMetrics> + '_ {
        self.rmse
            .iter()
            .zip(&self.iou)
            .enumerate()
            .map(|(index, (&rmse, &iou))| SampleMetrics { index, rmse, iou })
    }

    /// Average both sequences with NaNs removed
    pub fn summarize(self) -> Result<MetricSummary, MetricError> {
        let recorded = self.len();
        let (mean_rmse, valid_rmse) = nan_filtered_mean(&self.rmse, "rmse")?;
        let (mean_iou, valid_iou) = nan_filtered_mean(&self.iou, "iou")?;

        if valid_rmse < recorded || valid_iou < recorded {
            warn!(
                recorded,
                dropped_rmse = recorded - valid_rmse,
                dropped_iou = recorded - valid_iou,
                "Excluded NaN metrics from averages"
            );
        }

        Ok(MetricSummary {
            mean_rmse,
            mean_iou,
            recorded,
            valid_rmse,
            valid_iou,
        })
    }
}

fn nan_filtered_mean(values: &[f64], metric: &'static str) -> Result<(f64, usize), MetricError> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.is_empty() {
        return Err(MetricError::NoValidSamples {
            metric,
            recorded: values.len(),
        });
    }
    let mean = valid.iter().sum::<f64>() / valid.len() as f64;
    Ok((mean, valid.len()))
}

/// Reduced metrics for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean_rmse: f64,
    pub mean_iou: f64,
    /// Samples recorded, NaNs included
    pub recorded: usize,
    /// Denominator of `mean_rmse`
    pub valid_rmse: usize,
    /// Denominator of `mean_iou`
    pub valid_iou: usize,
}

impl MetricSummary {
    /// `"<mean_rmse>,<mean_iou>"`, floats always printed with a fractional part
    pub fn summary_line(&self) -> String {
        format!("{:?},{:?}", self.mean_rmse, self.mean_iou)
    }

    /// Overwrite `path` with the summary line
    pub fn write_summary(&self, path: impl AsRef<Path>) -> Result<(), MetricError> {
        let path = path.as_ref();
        std::fs::write(path, format!("{}\n", self.summary_line())).map_err(|source| {
            MetricError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;
        info!("Wrote metric summary to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for MetricSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rmse={:.4}mm over {} samples, iou={:.4} over {} samples",
            self.mean_rmse, self.valid_rmse, self.mean_iou, self.valid_iou
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_record_keeps_nan_entries() {
        let mut acc = MetricAccumulator::new();
        acc.record(0.1, f64::NAN);
        acc.record(0.3, 0.5);
        assert_eq!(acc.len(), 2);
        assert!(acc.iou_values()[0].is_nan());
    }

    #[test]
    fn test_summarize_excludes_nan() {
        let mut acc = MetricAccumulator::new();
        acc.record(0.2, f64::NAN);
        acc.record(0.4, 0.5);
        acc.record(f64::NAN, 1.0);

        let summary = acc.summarize().unwrap();
        assert!((summary.mean_rmse - 0.3).abs() < 1e-12);
        assert!((summary.mean_iou - 0.75).abs() < 1e-12);
        assert_eq!(summary.recorded, 3);
        assert_eq!((summary.valid_rmse, summary.valid_iou), (2, 2));
    }

    #[test]
    fn test_all_nan_has_no_mean() {
        let mut acc = MetricAccumulator::new();
        acc.record(0.5, f64::NAN);
        let err = acc.summarize().unwrap_err();
        assert!(matches!(err, MetricError::NoValidSamples { metric: "iou", recorded: 1 }));
    }

    #[test]
    fn test_empty_accumulator_fails() {
        assert!(MetricAccumulator::new().summarize().is_err());
    }

    #[test]
    fn test_summary_line_format() {
        let summary = MetricSummary {
            mean_rmse: 0.25,
            mean_iou: 1.0,
            recorded: 1,
            valid_rmse: 1,
            valid_iou: 1,
        };
        assert_eq!(summary.summary_line(), "0.25,1.0");
    }

    #[test]
    fn test_write_summary_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fcrn_error.txt");
        std::fs::write(&path, "stale,content\nmore\n").unwrap();

        let summary = MetricSummary {
            mean_rmse: 0.5,
            mean_iou: 0.75,
            recorded: 2,
            valid_rmse: 2,
            valid_iou: 2,
        };
        summary.write_summary(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.5,0.75\n");
    }

    #[test]
    fn test_samples_are_indexed_in_order() {
        let mut acc = MetricAccumulator::new();
        acc.record(1.0, 0.1);
        let second = acc.record(2.0, 0.2);
        assert_eq!(second.index, 1);
        let indices: Vec<usize> = acc.samples().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn prop_denominator_excludes_nan(
            entries in prop::collection::vec(prop::option::of(0.0f64..10.0), 1..40)
        ) {
            let mut acc = MetricAccumulator::new();
            for entry in &entries {
                let v = entry.unwrap_or(f64::NAN);
                acc.record(v, v);
            }
            prop_assert_eq!(acc.len(), entries.len());

            let valid: Vec<f64> = entries.iter().flatten().copied().collect();
            match acc.summarize() {
                Ok(summary) => {
                    prop_assert_eq!(summary.valid_rmse, valid.len());
                    let expected = valid.iter().sum::<f64>() / valid.len() as f64;
                    prop_assert!((summary.mean_rmse - expected).abs() < 1e-9);
                }
                Err(_) => prop_assert!(valid.is_empty()),
            }
        }
    }
}
