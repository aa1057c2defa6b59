//! Background frames

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tactile_frame::RgbFrame;
use tracing::info;

use crate::{BackgroundConfig, EstimatorError};

/// Which no-contact reference frame to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// Rendered by the tactile simulator
    Gel,
    /// Captured on the physical sensor
    Real,
}

/// Supplies reference frames with nothing touching the gel
pub trait BackgroundProvider {
    fn get_background(&self, kind: FrameKind) -> Result<RgbFrame, EstimatorError>;
}

/// Backgrounds stored as image files, resized to the sensor resolution
pub struct ImageBackgrounds {
    gel: Option<PathBuf>,
    real: Option<PathBuf>,
    width: u32,
    height: u32,
}

impl ImageBackgrounds {
    pub fn new(config: &BackgroundConfig, width: u32, height: u32) -> Self {
        Self {
            gel: config.gel.as_ref().map(PathBuf::from),
            real: config.real.as_ref().map(PathBuf::from),
            width,
            height,
        }
    }
}

impl BackgroundProvider for ImageBackgrounds {
    fn get_background(&self, kind: FrameKind) -> Result<RgbFrame, EstimatorError> {
        let path = match kind {
            FrameKind::Gel => self.gel.as_ref(),
            FrameKind::Real => self.real.as_ref(),
        }
        .ok_or(EstimatorError::MissingBackground(kind))?;

        info!("Loading {:?} background from {}", kind, path.display());
        Ok(RgbFrame::open(path)?.resize(self.width, self.height)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_background_kind() {
        let backgrounds = ImageBackgrounds::new(&BackgroundConfig::default(), 4, 4);
        assert!(matches!(
            backgrounds.get_background(FrameKind::Real),
            Err(EstimatorError::MissingBackground(FrameKind::Real))
        ));
    }

    #[test]
    fn test_background_resized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        RgbFrame::filled(10, 10, [9, 9, 9]).save(&path).unwrap();

        let config = BackgroundConfig {
            gel: Some(path.display().to_string()),
            real: None,
        };
        let bg = ImageBackgrounds::new(&config, 4, 6).get_background(FrameKind::Gel).unwrap();
        assert_eq!((bg.width, bg.height), (4, 6));
        assert_eq!(bg.get_pixel(0, 0), Some([9, 9, 9]));
    }
}
