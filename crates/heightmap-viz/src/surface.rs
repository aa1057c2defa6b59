//! Off-screen 3D surface rendering
//!
//! The height field becomes a regular grid mesh, one vertex per pixel, drawn
//! with an orthographic isometric camera into a z-buffered RGB image. Vertex
//! colors come from the color-mapped, negated, masked heights, so deep
//! contacts show up at the low end of the scale.

use std::path::Path;

use image::RgbImage;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tactile_frame::{ContactMask, FrameError, HeightMap};
use tracing::debug;

use crate::{Colormap, VizError};

/// Fraction of the viewport left empty on each side
const MARGIN: f32 = 0.05;

/// Surface rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Snapshot size in pixels
    pub width: u32,
    pub height: u32,

    /// Physical size of one height-field pixel
    pub scale: f32,

    /// Heights are multiplied by `height_gain * scale`
    pub height_gain: f32,

    /// Constant added to every displaced vertex
    pub z_offset: f32,

    pub colormap: Colormap,

    pub background: [u8; 3],

    /// Camera position relative to the surface center (direction only)
    pub view_direction: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            scale: 0.002,
            height_gain: 0.5,
            z_offset: -0.2,
            colormap: Colormap::Plasma,
            background: [76, 76, 76],
            view_direction: [1.0, -1.0, 1.0],
        }
    }
}

/// Orthographic camera basis
struct Camera {
    right: Vector3<f32>,
    up: Vector3<f32>,
    toward_eye: Vector3<f32>,
}

impl Camera {
    fn looking_from(direction: Vector3<f32>) -> Self {
        let toward_eye = direction.try_normalize(0.0).unwrap_or_else(Vector3::z);
        let forward = -toward_eye;
        // Looking straight down the z axis leaves `right` undefined
        let right = forward
            .cross(&Vector3::z())
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&forward);
        Self {
            right,
            up,
            toward_eye,
        }
    }

    /// `(u, v, depth)`; larger depth is closer to the eye
    fn project(&self, p: &Vector3<f32>) -> Vector3<f32> {
        Vector3::new(p.dot(&self.right), p.dot(&self.up), p.dot(&self.toward_eye))
    }
}

/// Screen-space vertex
#[derive(Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    color: [f32; 3],
}

/// Renders masked height fields as shaded, textured surfaces
pub struct SurfaceRenderer {
    config: RenderConfig,
}

impl SurfaceRenderer {
    /// Renderer drawing with `config`
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Settings this renderer draws with
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Draw one (height field, mask) pair
    pub fn render(&self, heightmap: &HeightMap, mask: &ContactMask) -> Result<RgbImage, VizError> {
        let (rows, cols) = heightmap.dim();
        if rows < 2 || cols < 2 {
            return Err(VizError::Degenerate { rows, cols });
        }

        let masked = heightmap.masked(mask)?;
        let texture = self.config.colormap.colorize_values(&masked.negated());
        let world = self.world_vertices(&masked);

        let camera = Camera::looking_from(Vector3::from(self.config.view_direction));
        let projected: Vec<Vector3<f32>> = world.iter().map(|p| camera.project(p)).collect();
        let screen = self.fit_to_viewport(&projected, &texture);

        let (width, height) = (self.config.width as usize, self.config.height as usize);
        let mut color_buf = vec![self.config.background; width * height];
        let mut depth_buf = vec![f32::NEG_INFINITY; width * height];

        let idx = |r: usize, c: usize| r * cols + c;
        for r in 0..rows - 1 {
            for c in 0..cols - 1 {
                let quad = [idx(r, c), idx(r, c + 1), idx(r + 1, c + 1), idx(r + 1, c)];
                for tri in [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]] {
                    let normal = (world[tri[1]] - world[tri[0]])
                        .cross(&(world[tri[2]] - world[tri[0]]))
                        .try_normalize(0.0)
                        .unwrap_or_else(Vector3::zeros);
                    let shade = 0.3 + 0.7 * normal.dot(&camera.toward_eye).abs();
                    rasterize(
                        [screen[tri[0]], screen[tri[1]], screen[tri[2]]],
                        shade,
                        width,
                        height,
                        &mut color_buf,
                        &mut depth_buf,
                    );
                }
            }
        }

        let raw: Vec<u8> = color_buf.into_iter().flatten().collect();
        let actual = raw.len();
        let image = RgbImage::from_raw(self.config.width, self.config.height, raw).ok_or(
            FrameError::BufferSize {
                width: self.config.width,
                height: self.config.height,
                channels: 3,
                actual,
            },
        )?;
        Ok(image)
    }

    /// Render and write a PNG
    pub fn render_to_file(
        &self,
        heightmap: &HeightMap,
        mask: &ContactMask,
        path: impl AsRef<Path>,
    ) -> Result<(), VizError> {
        let path = path.as_ref();
        self.render(heightmap, mask)?
            .save(path)
            .map_err(|source| VizError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Saved surface snapshot {}", path.display());
        Ok(())
    }

    /// Grid spanning `cols*scale x rows*scale`, image row 0 at +y
    fn world_vertices(&self, masked: &HeightMap) -> Vec<Vector3<f32>> {
        let (rows, cols) = masked.dim();
        let s = self.config.scale;
        let (span_x, span_y) = (cols as f32 * s, rows as f32 * s);
        let lift = self.config.height_gain * s;

        masked
            .values()
            .indexed_iter()
            .map(|((r, c), &h)| {
                let x = (c as f32 / (cols - 1) as f32 - 0.5) * span_x;
                let y = (0.5 - r as f32 / (rows - 1) as f32) * span_y;
                let z = h * lift + self.config.z_offset;
                Vector3::new(x, y, z)
            })
            .collect()
    }

    fn fit_to_viewport(&self, projected: &[Vector3<f32>], texture: &[[u8; 3]]) -> Vec<ScreenVertex> {
        let (mut u_min, mut u_max, mut v_min, mut v_max) =
            (f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY);
        for p in projected {
            u_min = u_min.min(p.x);
            u_max = u_max.max(p.x);
            v_min = v_min.min(p.y);
            v_max = v_max.max(p.y);
        }

        let (w, h) = (self.config.width as f32, self.config.height as f32);
        let usable = 1.0 - 2.0 * MARGIN;
        let span_u = (u_max - u_min).max(f32::EPSILON);
        let span_v = (v_max - v_min).max(f32::EPSILON);
        let k = (w * usable / span_u).min(h * usable / span_v);
        let (u_mid, v_mid) = ((u_min + u_max) / 2.0, (v_min + v_max) / 2.0);

        projected
            .iter()
            .zip(texture)
            .map(|(p, rgb)| ScreenVertex {
                x: w / 2.0 + (p.x - u_mid) * k,
                y: h / 2.0 - (p.y - v_mid) * k,
                depth: p.z,
                color: [f32::from(rgb[0]), f32::from(rgb[1]), f32::from(rgb[2])],
            })
            .collect()
    }
}

/// Fill one triangle with barycentric color interpolation and depth test
fn rasterize(
    tri: [ScreenVertex; 3],
    shade: f32,
    width: usize,
    height: usize,
    color_buf: &mut [[u8; 3]],
    depth_buf: &mut [f32],
) {
    let [a, b, c] = tri;
    let area = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if area.abs() < f32::EPSILON {
        return;
    }

    let x0 = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
    let y0 = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
    let x1 = (a.x.max(b.x).max(c.x).ceil() as usize).min(width.saturating_sub(1));
    let y1 = (a.y.max(b.y).max(c.y).ceil() as usize).min(height.saturating_sub(1));

    for py in y0..=y1 {
        for px in x0..=x1 {
            let (sx, sy) = (px as f32 + 0.5, py as f32 + 0.5);
            let w0 = ((b.x - sx) * (c.y - sy) - (b.y - sy) * (c.x - sx)) / area;
            let w1 = ((c.x - sx) * (a.y - sy) - (c.y - sy) * (a.x - sx)) / area;
            let w2 = 1.0 - w0 - w1;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
            let i = py * width + px;
            if depth <= depth_buf[i] {
                continue;
            }
            depth_buf[i] = depth;

            let mut rgb = [0u8; 3];
            for ch in 0..3 {
                let v = (w0 * a.color[ch] + w1 * b.color[ch] + w2 * c.color[ch]) * shade;
                rgb[ch] = v.round().clamp(0.0, 255.0) as u8;
            }
            color_buf[i] = rgb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use proptest::prelude::*;

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 64,
            height: 48,
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_has_configured_size() {
        let renderer = SurfaceRenderer::new(small_config());
        let img = renderer
            .render(&HeightMap::zeros(10, 8), &ContactMask::empty(10, 8))
            .unwrap();
        assert_eq!(img.dimensions(), (64, 48));
    }

    #[test]
    fn test_surface_covers_center_and_leaves_corners() {
        let config = small_config();
        let background = config.background;
        let renderer = SurfaceRenderer::new(config);
        let img = renderer
            .render(&HeightMap::zeros(10, 8), &ContactMask::empty(10, 8))
            .unwrap();
        assert_ne!(img.get_pixel(32, 24).0, background);
        assert_eq!(img.get_pixel(0, 0).0, background);
    }

    #[test]
    fn test_degenerate_field_rejected() {
        let renderer = SurfaceRenderer::new(small_config());
        let result = renderer.render(&HeightMap::zeros(1, 5), &ContactMask::empty(1, 5));
        assert!(matches!(result, Err(VizError::Degenerate { rows: 5, cols: 1 })));
    }

    #[test]
    fn test_mask_shape_must_match() {
        let renderer = SurfaceRenderer::new(small_config());
        let result = renderer.render(&HeightMap::zeros(4, 4), &ContactMask::empty(3, 4));
        assert!(matches!(result, Err(VizError::Frame(_))));
    }

    #[test]
    fn test_world_grid_flips_rows_up() {
        let renderer = SurfaceRenderer::new(RenderConfig {
            scale: 1.0,
            height_gain: 1.0,
            z_offset: 0.0,
            ..Default::default()
        });
        let mut values = Array2::zeros((3, 2));
        values[[0, 0]] = 4.0;
        let world = renderer.world_vertices(&HeightMap::from_array(values));

        // Row 0 sits at +y, the last row at -y
        assert_eq!(world[0], Vector3::new(-1.0, 1.5, 4.0));
        assert_eq!(world[5], Vector3::new(1.0, -1.5, 0.0));
    }

    #[test]
    fn test_camera_basis_is_orthonormal() {
        for direction in [Vector3::new(1.0, -1.0, 1.0), Vector3::new(0.0, 0.0, 2.0)] {
            let camera = Camera::looking_from(direction);
            for axis in [camera.right, camera.up, camera.toward_eye] {
                assert!((axis.norm() - 1.0).abs() < 1e-5);
            }
            assert!(camera.right.dot(&camera.up).abs() < 1e-5);
            assert!(camera.up.dot(&camera.toward_eye).abs() < 1e-5);
        }
    }

    proptest! {
        #[test]
        fn prop_render_any_field(values in prop::collection::vec(0.0f32..40.0, 30), bits in prop::collection::vec(any::<bool>(), 30)) {
            let heightmap = HeightMap::from_vec(6, 5, values).unwrap();
            let mask = ContactMask::from_array(Array2::from_shape_vec((5, 6), bits).unwrap());
            let img = SurfaceRenderer::new(small_config()).render(&heightmap, &mask).unwrap();
            prop_assert_eq!(img.dimensions(), (64, 48));
        }
    }
}
