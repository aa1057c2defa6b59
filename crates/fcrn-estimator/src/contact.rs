//! Height-to-contact thresholding

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tactile_frame::{ContactMask, HeightMap};

/// Relative height threshold over the frame interior
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactThreshold {
    /// Pixels this close to the frame edge are never in contact
    pub border: usize,
    /// Fraction of the interior height range a pixel must exceed
    pub ratio: f32,
    /// Interior range below which the frame has no contact at all
    pub min_range: f32,
}

impl Default for ContactThreshold {
    fn default() -> Self {
        Self {
            border: 10,
            ratio: 0.1,
            min_range: 1e-3,
        }
    }
}

impl ContactThreshold {
    pub fn apply(&self, heightmap: &HeightMap) -> ContactMask {
        let (rows, cols) = heightmap.dim();
        let mut mask = Array2::from_elem((rows, cols), false);
        if rows <= 2 * self.border || cols <= 2 * self.border {
            return ContactMask::from_array(mask);
        }

        let interior = heightmap
            .values()
            .slice(s![self.border..rows - self.border, self.border..cols - self.border]);
        let Some((lo, hi)) = interior
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f32, f32)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
        else {
            return ContactMask::from_array(mask);
        };

        if hi - lo <= self.min_range {
            return ContactMask::from_array(mask);
        }

        let threshold = lo + self.ratio * (hi - lo);
        mask.slice_mut(s![self.border..rows - self.border, self.border..cols - self.border])
            .zip_mut_with(&interior, |m, &h| *m = h > threshold);
        ContactMask::from_array(mask)
    }
}
