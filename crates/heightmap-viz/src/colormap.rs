//! Color maps

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tactile_frame::{FrameError, HeightMap};

use crate::VizError;

/// Evenly spaced stops sampled from the matplotlib tables
const VIRIDIS: [[u8; 3]; 9] = [
    [0x44, 0x01, 0x54],
    [0x47, 0x2d, 0x7b],
    [0x3b, 0x52, 0x8b],
    [0x2c, 0x72, 0x8e],
    [0x21, 0x91, 0x8c],
    [0x28, 0xae, 0x80],
    [0x5e, 0xc9, 0x62],
    [0xad, 0xdc, 0x30],
    [0xfd, 0xe7, 0x25],
];

const PLASMA: [[u8; 3]; 9] = [
    [0x0d, 0x08, 0x87],
    [0x4c, 0x02, 0xa1],
    [0x7e, 0x03, 0xa8],
    [0xa9, 0x23, 0x95],
    [0xcc, 0x47, 0x78],
    [0xe5, 0x6b, 0x5d],
    [0xf8, 0x95, 0x40],
    [0xfd, 0xc3, 0x28],
    [0xf0, 0xf9, 0x21],
];

/// Perceptually uniform color scale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    #[default]
    Viridis,
    Plasma,
}

impl Colormap {
    fn stops(self) -> &'static [[u8; 3]] {
        match self {
            Colormap::Viridis => &VIRIDIS,
            Colormap::Plasma => &PLASMA,
        }
    }

    /// Color at `t` in `[0, 1]`; out-of-range values clamp, NaN maps to the low end
    pub fn map(self, t: f32) -> [u8; 3] {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (stops.len() - 1) as f32;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - i as f32;

        let (a, b) = (stops[i], stops[i + 1]);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let v = f32::from(a[c]) + (f32::from(b[c]) - f32::from(a[c])) * frac;
            out[c] = v.round() as u8;
        }
        out
    }

    /// Per-pixel colors, normalized over the field's own finite min..max
    pub fn colorize_values(self, heightmap: &HeightMap) -> Vec<[u8; 3]> {
        let (lo, hi) = heightmap.min_max().unwrap_or((0.0, 0.0));
        let range = hi - lo;
        heightmap
            .values()
            .iter()
            .map(|&v| {
                let t = if range > 0.0 { (v - lo) / range } else { 0.0 };
                self.map(t)
            })
            .collect()
    }

    /// Color-mapped RGB image at the field's resolution
    pub fn colorize(self, heightmap: &HeightMap) -> Result<RgbImage, VizError> {
        let (width, height) = (heightmap.width() as u32, heightmap.height() as u32);
        let raw: Vec<u8> = self.colorize_values(heightmap).into_iter().flatten().collect();
        let actual = raw.len();
        let image = RgbImage::from_raw(width, height, raw).ok_or(FrameError::BufferSize {
            width,
            height,
            channels: 3,
            actual,
        })?;
        Ok(image)
    }
}

/// Write a height field as a color-mapped RGB image
pub fn save_colormapped(
    heightmap: &HeightMap,
    colormap: Colormap,
    path: impl AsRef<Path>,
) -> Result<(), VizError> {
    let path = path.as_ref();
    colormap
        .colorize(heightmap)?
        .save(path)
        .map_err(|source| VizError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_endpoints_match_table() {
        assert_eq!(Colormap::Viridis.map(0.0), VIRIDIS[0]);
        assert_eq!(Colormap::Viridis.map(1.0), VIRIDIS[8]);
        assert_eq!(Colormap::Plasma.map(1.0), PLASMA[8]);
        assert_eq!(Colormap::Plasma.map(0.5), PLASMA[4]);
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(Colormap::Viridis.map(-3.0), VIRIDIS[0]);
        assert_eq!(Colormap::Viridis.map(7.0), VIRIDIS[8]);
        assert_eq!(Colormap::Viridis.map(f32::NAN), VIRIDIS[0]);
    }

    #[test]
    fn test_colorize_normalizes_range() {
        let h = HeightMap::from_array(array![[2.0, 4.0], [6.0, 6.0]]);
        let img = Colormap::Viridis.colorize(&h).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, VIRIDIS[0]);
        assert_eq!(img.get_pixel(0, 1).0, VIRIDIS[8]);
        assert_eq!(img.get_pixel(1, 0).0, Colormap::Viridis.map(0.5));
    }

    #[test]
    fn test_flat_field_uses_low_color() {
        let img = Colormap::Plasma.colorize(&HeightMap::zeros(3, 2)).unwrap();
        assert!(img.pixels().all(|p| p.0 == PLASMA[0]));
    }

    #[test]
    fn test_save_colormapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0_pred_heightmap.png");
        save_colormapped(&HeightMap::zeros(5, 4), Colormap::Viridis, &path).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (5, 4));
    }
}
