//! Directory export of surface snapshots

use std::fs;
use std::path::{Path, PathBuf};

use tactile_frame::{ContactMask, HeightMap};
use tracing::{debug, info};

use crate::{SurfaceRenderer, VizError};

fn numeric_prefix(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let prefix = name.split('_').next()?;
    // "12.png" has no underscore; use the stem
    let prefix = prefix.split('.').next()?;
    prefix.parse().ok()
}

/// Files in `dir` ordered by the integer before the first `_` of their name
pub fn sorted_by_numeric_prefix(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, VizError> {
    let dir = dir.as_ref();
    let read_err = |source| VizError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut keyed = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if !path.is_file() {
            continue;
        }
        let key = numeric_prefix(&path).ok_or_else(|| VizError::NoNumericPrefix(path.clone()))?;
        keyed.push((key, path));
    }
    keyed.sort();
    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}

/// Render every (height field, mask) pair to `<i>_pred_cloud.png`.
///
/// Pairs are matched by position after sorting both directories; `i` is that
/// position, not the prefix in the file names. Height files are read with
/// `value_scale` per luma unit. Returns the number of snapshots written.
pub fn export_directory(
    heightmap_dir: impl AsRef<Path>,
    mask_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    renderer: &SurfaceRenderer,
    value_scale: f32,
) -> Result<usize, VizError> {
    let heightmaps = sorted_by_numeric_prefix(&heightmap_dir)?;
    let masks = sorted_by_numeric_prefix(&mask_dir)?;
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir).map_err(|source| VizError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let total = heightmaps.len().min(masks.len());
    info!(
        "Rendering {} surfaces ({} height fields, {} masks) into {}",
        total,
        heightmaps.len(),
        masks.len(),
        output_dir.display()
    );

    for (i, (heightmap_path, mask_path)) in heightmaps.iter().zip(&masks).enumerate() {
        let heightmap = HeightMap::open(heightmap_path, value_scale)?;
        let mask = ContactMask::open(mask_path)?;
        renderer.render_to_file(&heightmap, &mask, output_dir.join(format!("{i}_pred_cloud.png")))?;
        debug!(
            "[{}/{}] {} + {}",
            i + 1,
            total,
            heightmap_path.display(),
            mask_path.display()
        );
    }

    Ok(total)
}
