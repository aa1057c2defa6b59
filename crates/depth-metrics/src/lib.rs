//! Depth Estimation Metrics
//!
//! Per-sample error metrics for predicted height fields and contact masks,
//! plus the run-level accumulator that reduces them to the summary file.

mod accumulator;
mod error;
mod metrics;

pub use accumulator::{MetricAccumulator, MetricSummary, SampleMetrics};
pub use error::MetricError;
pub use metrics::{contact_iou, heightmap_rmse, EmptyMaskPolicy, DEFAULT_PIXEL_TO_MM};
