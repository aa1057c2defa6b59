//! Batched evaluation loops

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use depth_metrics::{contact_iou, heightmap_rmse, MetricAccumulator, MetricSummary, SampleMetrics};
use fcrn_estimator::Estimator;
use heightmap_viz::{save_colormapped, SurfaceRenderer};
use tactile_dataset::BatchSource;
use tactile_frame::ContactMask;
use tracing::{debug, info};

use crate::config::{EvalConfig, MetricsConfig, OutputConfig};
use crate::{ArtifactWriter, EvalError};

/// Counts for a completed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    pub batches: usize,
    pub samples: usize,
}

/// Drives an estimator over batch sources, one sample at a time
pub struct Evaluator<'a, E: Estimator> {
    estimator: &'a E,
    metrics: MetricsConfig,
    output: OutputConfig,
    renderer: SurfaceRenderer,
}

impl<'a, E: Estimator> Evaluator<'a, E> {
    pub fn new(estimator: &'a E, config: &EvalConfig) -> Self {
        Self {
            estimator,
            metrics: config.metrics.clone(),
            output: config.output.clone(),
            renderer: SurfaceRenderer::new(config.render.clone()),
        }
    }

    /// Real sensor images: write input, color-mapped height field, mask and
    /// surface snapshot for every sample.
    pub fn run_real<S: BatchSource>(
        &self,
        source: &mut S,
        artifacts: &mut ArtifactWriter,
    ) -> Result<RunReport, EvalError> {
        info!("Testing on real data");
        let total = source.batch_count();
        let mut report = RunReport::default();

        while let Some(batch) = source.next_batch()? {
            for sample in &batch.samples {
                let heightmap = self.estimator.image_to_heightmap(&sample.image)?;
                let mask = self.estimator.heightmap_to_mask(&heightmap);

                let index = artifacts.advance();
                sample.image.save(artifacts.path(index, "input"))?;
                save_colormapped(
                    &heightmap,
                    self.output.heightmap_colormap,
                    artifacts.path(index, "pred_heightmap"),
                )?;
                mask.save(artifacts.path(index, "pred_mask"))?;
                self.renderer
                    .render_to_file(&heightmap, &mask, artifacts.path(index, "pred_cloud"))?;

                debug!(index, source = %sample.source.display(), contact_pixels = mask.count(), "Wrote sample artifacts");
                report.samples += 1;
            }
            report.batches += 1;
            info!(batch = report.batches, total, samples = report.samples, "Processed batch");
        }

        info!("Real-data pass complete: {} samples in {}", report.samples, artifacts.dir().display());
        Ok(report)
    }

    /// Simulated images with ground truth: accumulate RMSE and IoU, then
    /// write the summary file.
    pub fn run_sim<S: BatchSource>(&self, source: &mut S) -> Result<MetricSummary, EvalError> {
        info!("Testing on sim data");
        let out_dir = Path::new(&self.output.dir);
        std::fs::create_dir_all(out_dir).map_err(|source| EvalError::OutputDir {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let accumulator = self.accumulate_sim(source)?;
        if self.output.sample_report {
            let samples: Vec<SampleMetrics> = accumulator.samples().collect();
            write_sample_report(&self.output.sample_report_path(), &samples)?;
        }

        let summary = accumulator.summarize()?;
        summary.write_summary(self.output.summary_path())?;
        info!("Sim-data pass complete: {}", summary);
        Ok(summary)
    }

    /// Per-sample metrics for a whole pass, NaNs included
    pub fn accumulate_sim<S: BatchSource>(&self, source: &mut S) -> Result<MetricAccumulator, EvalError> {
        let total = source.batch_count();
        let mut accumulator = MetricAccumulator::new();
        let mut batches = 0;

        while let Some(batch) = source.next_batch()? {
            for sample in &batch.samples {
                let ground_truth = sample.depth.as_ref().ok_or_else(|| EvalError::MissingGroundTruth {
                    index: accumulator.len(),
                    path: sample.source.clone(),
                })?;

                let heightmap = self.estimator.image_to_heightmap(&sample.image)?;
                let mask = self.estimator.heightmap_to_mask(&heightmap);

                let rmse = heightmap_rmse(&heightmap, ground_truth, self.metrics.pixel_to_mm)?;
                let iou = contact_iou(
                    &mask,
                    &ContactMask::from_nonzero(ground_truth),
                    self.metrics.empty_mask,
                )?;
                let recorded = accumulator.record(rmse, iou);
                debug!(index = recorded.index, rmse, iou, "Sample metrics");
            }
            batches += 1;
            info!(batch = batches, total, samples = accumulator.len(), "Processed batch");
        }

        Ok(accumulator)
    }
}

fn write_sample_report(path: &Path, samples: &[SampleMetrics]) -> Result<(), EvalError> {
    let report_err = |source| EvalError::Report {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(report_err)?);
    serde_json::to_writer_pretty(&mut writer, samples)?;
    writer.flush().map_err(report_err)?;
    info!("Wrote {} per-sample metrics to {}", samples.len(), path.display());
    Ok(())
}
