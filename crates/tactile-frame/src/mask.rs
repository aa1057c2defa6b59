//! Contact masks

use std::path::Path;

use image::GrayImage;
use ndarray::{Array2, Zip};

use crate::{FrameError, HeightMap};

/// Luma level above which a stored mask pixel counts as contact
const MASK_ON_LEVEL: u8 = 127;

/// Boolean contact mask indexed `[row, col]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMask(Array2<bool>);

impl ContactMask {
    pub fn from_array(values: Array2<bool>) -> Self {
        Self(values)
    }

    /// Mask with no pixel in contact
    pub fn empty(width: usize, height: usize) -> Self {
        Self(Array2::from_elem((height, width), false))
    }

    /// Contact wherever the height is non-zero
    pub fn from_nonzero(heightmap: &HeightMap) -> Self {
        Self(heightmap.values().mapv(|v| v != 0.0))
    }

    /// Read a grayscale image; bright pixels are contact
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| FrameError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .to_luma8();
        let (width, height) = (img.width() as usize, img.height() as usize);
        let values: Vec<bool> = img.into_raw().into_iter().map(|v| v > MASK_ON_LEVEL).collect();
        let actual = values.len();
        Array2::from_shape_vec((height, width), values)
            .map(Self)
            .map_err(|_| FrameError::BufferSize {
                width: width as u32,
                height: height as u32,
                channels: 1,
                actual,
            })
    }

    /// Write as a black/white 8-bit PNG
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FrameError> {
        let path = path.as_ref();
        self.to_image()?.save(path).map_err(|source| FrameError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Black/white grayscale image, 255 for contact
    pub fn to_image(&self) -> Result<GrayImage, FrameError> {
        let raw: Vec<u8> = self.0.iter().map(|&v| if v { u8::MAX } else { 0 }).collect();
        let actual = raw.len();
        GrayImage::from_raw(self.width() as u32, self.height() as u32, raw).ok_or(FrameError::BufferSize {
            width: self.width() as u32,
            height: self.height() as u32,
            channels: 1,
            actual,
        })
    }

    /// Mask width in pixels
    pub fn width(&self) -> usize {
        self.0.ncols()
    }

    /// Mask height in pixels
    pub fn height(&self) -> usize {
        self.0.nrows()
    }

    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// Underlying `[row, col]` array
    pub fn values(&self) -> &Array2<bool> {
        &self.0
    }

    /// Number of pixels in contact
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of pixels in contact in both masks
    pub fn intersection_count(&self, other: &ContactMask) -> Result<usize, FrameError> {
        if self.dim() != other.dim() {
            return Err(FrameError::ShapeMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        let mut count = 0;
        Zip::from(&self.0).and(&other.0).for_each(|&a, &b| {
            if a && b {
                count += 1;
            }
        });
        Ok(count)
    }
}
