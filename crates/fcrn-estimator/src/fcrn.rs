//! ONNX-backed FCRN estimator

use std::path::{Path, PathBuf};
use std::time::Instant;

use tactile_frame::{ContactMask, HeightMap, RgbFrame};
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::{ContactThreshold, Estimator, EstimatorConfig, EstimatorError};

/// FCRN encoder-decoder loaded from an ONNX export of the checkpoint
pub struct FcrnEstimator {
    model: TypedRunnableModel<TypedModel>,
    checkpoint: PathBuf,
    /// Background at the network input resolution
    background: RgbFrame,
    input_width: u32,
    input_height: u32,
    output_scale: f32,
    contact: ContactThreshold,
}

impl FcrnEstimator {
    /// Load and optimize the network for a fixed `[1, 3, H, W]` input
    pub fn from_checkpoint(
        checkpoint: impl AsRef<Path>,
        background: RgbFrame,
        config: &EstimatorConfig,
    ) -> Result<Self, EstimatorError> {
        let checkpoint = checkpoint.as_ref().to_path_buf();
        info!("Loading FCRN weights: {}", checkpoint.display());

        let (width, height) = (config.input_width as usize, config.input_height as usize);
        let model = tract_onnx::onnx()
            .model_for_path(&checkpoint)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, 3, height, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| EstimatorError::ModelLoad(format!("{}: {e}", checkpoint.display())))?;

        info!("Model loaded successfully ({}x{} input)", width, height);

        Ok(Self {
            model,
            checkpoint,
            background: background.resize(config.input_width, config.input_height)?,
            input_width: config.input_width,
            input_height: config.input_height,
            output_scale: config.output_scale,
            contact: config.contact,
        })
    }

    /// Path the weights were loaded from
    pub fn checkpoint(&self) -> &Path {
        &self.checkpoint
    }
}

impl Estimator for FcrnEstimator {
    fn image_to_heightmap(&self, image: &RgbFrame) -> Result<HeightMap, EstimatorError> {
        let start = Instant::now();
        let resized = image.resize(self.input_width, self.input_height)?;
        let data = network_input(&resized, &self.background)?;

        let input = Tensor::from_shape(
            &[1, 3, self.input_height as usize, self.input_width as usize],
            &data,
        )
        .map_err(|e| EstimatorError::InferenceFailed(e.to_string()))?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| EstimatorError::InferenceFailed(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or_else(|| EstimatorError::InferenceFailed("model produced no outputs".into()))?;
        let values = output
            .as_slice::<f32>()
            .map_err(|e| EstimatorError::InferenceFailed(e.to_string()))?;

        let heightmap = output_heightmap(output.shape(), values, self.output_scale)?
            .resize(image.width as usize, image.height as usize)?
            .clamp_min(0.0);

        debug!("Inference completed in {}ms", start.elapsed().as_millis());
        Ok(heightmap)
    }

    fn heightmap_to_mask(&self, heightmap: &HeightMap) -> ContactMask {
        self.contact.apply(heightmap)
    }
}

/// Background-subtracted image in CHW order, scaled to roughly `[-1, 1]`
pub fn network_input(image: &RgbFrame, background: &RgbFrame) -> Result<Vec<f32>, EstimatorError> {
    if (image.width, image.height) != (background.width, background.height) {
        return Err(tactile_frame::FrameError::ShapeMismatch {
            expected: (background.height as usize, background.width as usize),
            actual: (image.height as usize, image.width as usize),
        }
        .into());
    }

    let plane = image.width as usize * image.height as usize;
    let mut data = vec![0.0f32; plane * 3];
    for (i, (px, bg)) in image
        .data
        .chunks_exact(3)
        .zip(background.data.chunks_exact(3))
        .enumerate()
    {
        for c in 0..3 {
            data[c * plane + i] = (f32::from(px[c]) - f32::from(bg[c])) / 255.0;
        }
    }
    Ok(data)
}

/// Interpret a `[.., 1, H, W]` output as a height field
pub fn output_heightmap(shape: &[usize], values: &[f32], scale: f32) -> Result<HeightMap, EstimatorError> {
    let invalid = || EstimatorError::InvalidOutputShape {
        expected: "[1, 1, H, W]".to_string(),
        actual: format!("{shape:?}"),
    };

    let [leading @ .., height, width] = shape else {
        return Err(invalid());
    };
    if leading.iter().any(|&d| d != 1) || values.len() != height * width {
        return Err(invalid());
    }

    let scaled = values.iter().map(|v| v * scale).collect();
    Ok(HeightMap::from_vec(*width, *height, scaled)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_input_subtracts_background() {
        let image = RgbFrame::new(vec![255, 0, 10, 100, 100, 100], 2, 1).unwrap();
        let background = RgbFrame::filled(2, 1, [0, 0, 10]);
        let data = network_input(&image, &background).unwrap();

        // CHW: R plane, G plane, B plane
        assert_eq!(data.len(), 6);
        assert!((data[0] - 1.0).abs() < 1e-6);
        assert!((data[1] - 100.0 / 255.0).abs() < 1e-6);
        assert_eq!(data[2], 0.0);
        assert_eq!(data[4], 0.0);
        assert!((data[5] - 90.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_network_input_requires_matching_background() {
        let image = RgbFrame::filled(2, 2, [0, 0, 0]);
        let background = RgbFrame::filled(3, 2, [0, 0, 0]);
        assert!(network_input(&image, &background).is_err());
    }

    #[test]
    fn test_output_heightmap_shapes() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let h = output_heightmap(&[1, 1, 2, 3], &values, 2.0).unwrap();
        assert_eq!(h.dim(), (2, 3));
        assert_eq!(h.get(1, 2), Some(12.0));

        assert!(output_heightmap(&[2, 3], &values, 1.0).is_ok());
        assert!(matches!(
            output_heightmap(&[1, 2, 1, 3], &values, 1.0),
            Err(EstimatorError::InvalidOutputShape { .. })
        ));
        assert!(output_heightmap(&[6], &values, 1.0).is_err());
    }

    #[test]
    fn test_missing_checkpoint_fails() {
        let result = FcrnEstimator::from_checkpoint(
            "nonexistent_fcrn.onnx",
            RgbFrame::filled(4, 4, [0, 0, 0]),
            &EstimatorConfig::default(),
        );
        assert!(matches!(result, Err(EstimatorError::ModelLoad(_))));
    }

    #[test]
    fn test_invalid_checkpoint_bytes_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.onnx");
        std::fs::write(&path, b"not a valid onnx model").unwrap();
        let result = FcrnEstimator::from_checkpoint(&path, RgbFrame::filled(4, 4, [0, 0, 0]), &EstimatorConfig::default());
        assert!(result.is_err());
    }
}
