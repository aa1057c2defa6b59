//! RGB sensor frames

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::debug;

use crate::FrameError;

/// Decoded RGB sensor image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
}

impl RgbFrame {
    /// Create a frame from raw interleaved RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                channels: 3,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// Create a frame where every pixel has the same color
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self { data, width, height }
    }

    /// Decode an image file (any format the `image` crate reads) as RGB8
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| FrameError::Read {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        debug!("Loaded {}x{} frame from {}", img.width(), img.height(), path.display());
        Ok(Self::from_image(img))
    }

    /// Take ownership of a decoded `image` buffer
    pub fn from_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
        }
    }

    /// Copy into an `image` buffer; fails if `data` no longer matches the size
    pub fn to_image(&self) -> Result<RgbImage, FrameError> {
        RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or(FrameError::BufferSize {
            width: self.width,
            height: self.height,
            channels: 3,
            actual: self.data.len(),
        })
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// Resize with a triangle filter. Returns a clone when the size already matches.
    pub fn resize(&self, new_width: u32, new_height: u32) -> Result<RgbFrame, FrameError> {
        if new_width == self.width && new_height == self.height {
            return Ok(self.clone());
        }
        let resized = imageops::resize(&self.to_image()?, new_width, new_height, FilterType::Triangle);
        Ok(Self::from_image(resized))
    }

    /// Encode to a file; format follows the extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FrameError> {
        let path = path.as_ref();
        self.to_image()?.save(path).map_err(|source| FrameError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
