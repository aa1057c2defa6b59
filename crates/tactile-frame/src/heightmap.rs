//! Height fields

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ColorType, ImageBuffer, Luma};
use ndarray::{s, Array2, Zip};
use tracing::debug;

use crate::{ContactMask, FrameError};

/// Dense height field indexed `[row, col]`, values in pixel units
#[derive(Debug, Clone, PartialEq)]
pub struct HeightMap(Array2<f32>);

impl HeightMap {
    pub fn from_array(values: Array2<f32>) -> Self {
        Self(values)
    }

    /// All-zero height field of `width` x `height` pixels
    pub fn zeros(width: usize, height: usize) -> Self {
        Self(Array2::zeros((height, width)))
    }

    /// Build from row-major values
    pub fn from_vec(width: usize, height: usize, values: Vec<f32>) -> Result<Self, FrameError> {
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

    /// Load a single-channel image; each luma value times `scale` is one height.
    ///
    /// 16-bit images keep their full range, everything else is read as 8-bit luma.
    pub fn open(path: impl AsRef<Path>, scale: f32) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| FrameError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let (width, height) = (img.width() as usize, img.height() as usize);
        let values: Vec<f32> = match img.color() {
            ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => img
                .to_luma16()
                .into_raw()
                .into_iter()
                .map(|v| f32::from(v) * scale)
                .collect(),
            _ => img
                .to_luma8()
                .into_raw()
                .into_iter()
                .map(|v| f32::from(v) * scale)
                .collect(),
        };
        debug!("Loaded {}x{} height field from {}", width, height, path.display());
        Self::from_vec(width, height, values)
    }

    /// Store as a 16-bit grayscale image, inverse of [`HeightMap::open`]
    pub fn save_raw(&self, path: impl AsRef<Path>, scale: f32) -> Result<(), FrameError> {
        let path = path.as_ref();
        let raw: Vec<u16> = self
            .0
            .iter()
            .map(|&v| (v / scale).round().clamp(0.0, u16::MAX as f32) as u16)
            .collect();
        let buf = ImageBuffer::<Luma<u16>, _>::from_raw(self.width() as u32, self.height() as u32, raw)
            .ok_or(FrameError::BufferSize {
                width: self.width() as u32,
                height: self.height() as u32,
                channels: 1,
                actual: self.0.len(),
            })?;
        buf.save(path).map_err(|source| FrameError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Field width in pixels
    pub fn width(&self) -> usize {
        self.0.ncols()
    }

    /// Field height in pixels
    pub fn height(&self) -> usize {
        self.0.nrows()
    }

    /// `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// Underlying `[row, col]` array
    pub fn values(&self) -> &Array2<f32> {
        &self.0
    }

    /// Take the underlying array
    pub fn into_inner(self) -> Array2<f32> {
        self.0
    }

    /// Height at `(row, col)`, `None` outside the field
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.0.get((row, col)).copied()
    }

    /// Smallest and largest finite value, `None` if there is none
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.0
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Zero every height outside the mask
    pub fn masked(&self, mask: &ContactMask) -> Result<HeightMap, FrameError> {
        if mask.dim() != self.dim() {
            return Err(FrameError::ShapeMismatch {
                expected: self.dim(),
                actual: mask.dim(),
            });
        }
        let values = Zip::from(&self.0)
            .and(mask.values())
            .map_collect(|&h, &in_contact| if in_contact { h } else { 0.0 });
        Ok(Self(values))
    }

    /// Every height with its sign flipped
    pub fn negated(&self) -> HeightMap {
        Self(self.0.mapv(|v| -v))
    }

    /// Mirror rows so row 0 becomes the last row
    pub fn flip_vertical(&self) -> HeightMap {
        Self(self.0.slice(s![..;-1, ..]).to_owned())
    }

    /// Replace values below `floor` (and NaNs) with `floor`
    pub fn clamp_min(mut self, floor: f32) -> HeightMap {
        self.0.mapv_inplace(|v| if v >= floor { v } else { floor });
        self
    }

    /// Bilinear-ish resample via the triangle filter
    pub fn resize(&self, new_width: usize, new_height: usize) -> Result<HeightMap, FrameError> {
        if new_width == self.width() && new_height == self.height() {
            return Ok(self.clone());
        }
        let raw: Vec<f32> = self.0.iter().copied().collect();
        let buf = ImageBuffer::<Luma<f32>, _>::from_raw(self.width() as u32, self.height() as u32, raw)
            .ok_or(FrameError::BufferSize {
                width: self.width() as u32,
                height: self.height() as u32,
                channels: 1,
                actual: self.0.len(),
            })?;
        let resized = imageops::resize(&buf, new_width as u32, new_height as u32, FilterType::Triangle);
        Self::from_vec(new_width, new_height, resized.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_masked_zeroes_outside() {
        let h = HeightMap::from_array(array![[1.0, 2.0], [3.0, 4.0]]);
        let m = ContactMask::from_array(array![[true, false], [false, true]]);
        let masked = h.masked(&m).unwrap();
        assert_eq!(masked.values(), &array![[1.0, 0.0], [0.0, 4.0]]);
    }

    #[test]
    fn test_masked_shape_mismatch() {
        let h = HeightMap::zeros(3, 2);
        let m = ContactMask::empty(2, 2);
        assert!(matches!(h.masked(&m), Err(FrameError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_flip_vertical() {
        let h = HeightMap::from_array(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(h.flip_vertical().values(), &array![[5.0, 6.0], [3.0, 4.0], [1.0, 2.0]]);
    }

    #[test]
    fn test_min_max_skips_nan() {
        let h = HeightMap::from_array(array![[f32::NAN, -1.0], [7.5, 0.0]]);
        assert_eq!(h.min_max(), Some((-1.0, 7.5)));
        assert_eq!(HeightMap::from_array(array![[f32::NAN]]).min_max(), None);
    }

    #[test]
    fn test_clamp_min() {
        let h = HeightMap::from_array(array![[-2.0, 0.5]]).clamp_min(0.0);
        assert_eq!(h.values(), &array![[0.0, 0.5]]);
    }

    #[test]
    fn test_resize_dimensions() {
        let h = HeightMap::from_vec(4, 2, vec![1.0; 8]).unwrap();
        let r = h.resize(8, 4).unwrap();
        assert_eq!((r.width(), r.height()), (8, 4));
        assert!(r.values().iter().all(|v| (v - 1.0).abs() < 1e-4));
    }

    #[test]
    fn test_raw_png_keeps_heights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0_heightmap.png");
        let h = HeightMap::from_array(array![[0.0, 12.0], [300.0, 4.0]]);
        h.save_raw(&path, 1.0).unwrap();
        assert_eq!(HeightMap::open(&path, 1.0).unwrap(), h);
    }

    #[test]
    fn test_eight_bit_image_is_not_rescaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        let buf = image::GrayImage::from_raw(2, 1, vec![0, 200]).unwrap();
        buf.save(&path).unwrap();
        let h = HeightMap::open(&path, 0.5).unwrap();
        assert_eq!(h.values(), &array![[0.0, 100.0]]);
    }

    proptest::proptest! {
        #[test]
        fn prop_double_flip_is_identity(values in proptest::collection::vec(-50.0f32..50.0, 12)) {
            let h = HeightMap::from_vec(4, 3, values).unwrap();
            proptest::prop_assert_eq!(h.flip_vertical().flip_vertical(), h);
        }
    }
}
