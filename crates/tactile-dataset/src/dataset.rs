//! Real and simulated datasets

use std::path::{Path, PathBuf};

use tactile_frame::{HeightMap, RgbFrame};
use tracing::info;

use crate::{read_manifest, DatasetConfig, DatasetError};

/// One evaluation sample
#[derive(Debug, Clone)]
pub struct Sample {
    /// Sensor image at the configured resolution
    pub image: RgbFrame,
    /// Ground-truth height field, simulated data only
    pub depth: Option<HeightMap>,
    /// Image path the sample was decoded from
    pub source: PathBuf,
}

/// Random-access sample collection
pub trait Dataset {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode the sample at `index`
    fn get(&self, index: usize) -> Result<Sample, DatasetError>;
}

/// Images captured on the physical sensor, no ground truth
pub struct RealDataset {
    images: Vec<PathBuf>,
    width: u32,
    height: u32,
}

impl RealDataset {
    pub fn new(images: Vec<PathBuf>, config: &DatasetConfig) -> Self {
        Self {
            images,
            width: config.sensor_width,
            height: config.sensor_height,
        }
    }

    /// Dataset over every image listed in `manifest`
    pub fn open(manifest: impl AsRef<Path>, config: &DatasetConfig) -> Result<Self, DatasetError> {
        let images = read_manifest(manifest)?;
        info!("Real dataset: {} images", images.len());
        Ok(Self::new(images, config))
    }
}

impl Dataset for RealDataset {
    fn len(&self) -> usize {
        self.images.len()
    }

    fn get(&self, index: usize) -> Result<Sample, DatasetError> {
        let path = self.images.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.images.len(),
        })?;
        let image = RgbFrame::open(path)?.resize(self.width, self.height)?;
        Ok(Sample {
            image,
            depth: None,
            source: path.clone(),
        })
    }
}

/// Simulator renders paired with ground-truth height labels
pub struct SimDataset {
    images: Vec<PathBuf>,
    labels: Vec<PathBuf>,
    width: u32,
    height: u32,
    label_scale: f32,
}

impl SimDataset {
    pub fn new(
        images: Vec<PathBuf>,
        labels: Vec<PathBuf>,
        config: &DatasetConfig,
    ) -> Result<Self, DatasetError> {
        if images.len() != labels.len() {
            return Err(DatasetError::ManifestLengthMismatch {
                images: images.len(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            images,
            labels,
            width: config.sensor_width,
            height: config.sensor_height,
            label_scale: config.label_scale,
        })
    }

    /// Dataset pairing two line-aligned manifests
    pub fn open(
        data_manifest: impl AsRef<Path>,
        label_manifest: impl AsRef<Path>,
        config: &DatasetConfig,
    ) -> Result<Self, DatasetError> {
        let images = read_manifest(data_manifest)?;
        let labels = read_manifest(label_manifest)?;
        info!("Sim dataset: {} image/label pairs", images.len());
        Self::new(images, labels, config)
    }
}

impl Dataset for SimDataset {
    fn len(&self) -> usize {
        self.images.len()
    }

    fn get(&self, index: usize) -> Result<Sample, DatasetError> {
        let out_of_range = DatasetError::IndexOutOfRange {
            index,
            len: self.images.len(),
        };
        let (Some(image_path), Some(label_path)) = (self.images.get(index), self.labels.get(index))
        else {
            return Err(out_of_range);
        };

        let image = RgbFrame::open(image_path)?.resize(self.width, self.height)?;
        let depth = HeightMap::open(label_path, self.label_scale)?
            .resize(self.width as usize, self.height as usize)?;
        Ok(Sample {
            image,
            depth: Some(depth),
            source: image_path.clone(),
        })
    }
}
