//! Wiring from configuration to a finished run

use std::path::Path;

use depth_metrics::MetricSummary;
use fcrn_estimator::{BackgroundProvider, FcrnEstimator, ImageBackgrounds};
use heightmap_viz::{export_directory, SurfaceRenderer};
use tactile_dataset::{BatchLoader, RealDataset, SimDataset};
use tracing::info;

use crate::{ArtifactWriter, EvalConfig, EvalError, Evaluator, RunReport};

fn load_estimator(config: &EvalConfig) -> Result<FcrnEstimator, EvalError> {
    let checkpoint = config.checkpoint()?;
    let backgrounds = ImageBackgrounds::new(
        &config.background,
        config.loader.sensor_width,
        config.loader.sensor_height,
    );
    let background = backgrounds.get_background(config.model.background_kind)?;
    Ok(FcrnEstimator::from_checkpoint(checkpoint, background, &config.model)?)
}

/// Evaluate on the real-image manifest, writing artifacts to `output.dir`
pub fn evaluate_real(config: &EvalConfig) -> Result<RunReport, EvalError> {
    let manifest = config
        .manifests
        .real
        .as_deref()
        .ok_or(EvalError::MissingSetting("manifests.real"))?;

    let estimator = load_estimator(config)?;
    let mut artifacts = ArtifactWriter::create(&config.output.dir)?;
    let mut loader = BatchLoader::new(RealDataset::open(manifest, &config.loader)?, &config.loader)?;

    Evaluator::new(&estimator, config).run_real(&mut loader, &mut artifacts)
}

/// Evaluate on the simulated manifests and write the RMSE/IoU summary
pub fn evaluate_sim(config: &EvalConfig) -> Result<MetricSummary, EvalError> {
    let data = config
        .manifests
        .sim_data
        .as_deref()
        .ok_or(EvalError::MissingSetting("manifests.sim_data"))?;
    let labels = config
        .manifests
        .sim_labels
        .as_deref()
        .ok_or(EvalError::MissingSetting("manifests.sim_labels"))?;

    let estimator = load_estimator(config)?;
    let mut loader = BatchLoader::new(SimDataset::open(data, labels, &config.loader)?, &config.loader)?;

    Evaluator::new(&estimator, config).run_sim(&mut loader)
}

/// Render every height-field/mask pair in two directories to surface snapshots
pub fn visualize(
    config: &EvalConfig,
    heightmap_dir: &Path,
    mask_dir: &Path,
    output_dir: &Path,
    value_scale: f32,
) -> Result<usize, EvalError> {
    let renderer = SurfaceRenderer::new(config.render.clone());
    let written = export_directory(heightmap_dir, mask_dir, output_dir, &renderer, value_scale)?;
    info!("Wrote {} surface snapshots to {}", written, output_dir.display());
    Ok(written)
}
