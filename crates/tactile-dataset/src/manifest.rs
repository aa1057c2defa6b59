//! Manifest files: one sample path per line

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::DatasetError;

/// Read a manifest, skipping blank lines and `#` comments.
///
/// Relative entries resolve against the manifest's own directory.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let entries: Vec<PathBuf> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let entry = Path::new(line);
            if entry.is_absolute() {
                entry.to_path_buf()
            } else {
                base.join(entry)
            }
        })
        .collect();

    debug!("Manifest {} lists {} entries", path.display(), entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_comments_and_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("test_data.txt");
        fs::write(&manifest, "# header\nimg/0.png\n\n  img/1.png  \n/abs/2.png\n").unwrap();

        let entries = read_manifest(&manifest).unwrap();
        assert_eq!(
            entries,
            vec![
                dir.path().join("img/0.png"),
                dir.path().join("img/1.png"),
                PathBuf::from("/abs/2.png"),
            ]
        );
    }

    #[test]
    fn test_missing_manifest() {
        let err = read_manifest("/nonexistent/manifest.txt").unwrap_err();
        assert!(matches!(err, DatasetError::Manifest { .. }));
    }
}
