//! Per-sample output files

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::EvalError;

/// Names run artifacts `<index>_<kind>.png` with a dense zero-based counter
pub struct ArtifactWriter {
    dir: PathBuf,
    next_index: usize,
}

impl ArtifactWriter {
    /// Create `dir` (and parents) if missing; the counter starts at zero
    pub fn create(dir: impl AsRef<Path>) -> Result<Self, EvalError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            info!("Creating output directory {}", dir.display());
        }
        fs::create_dir_all(&dir).map_err(|source| EvalError::OutputDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, next_index: 0 })
    }

    /// Directory artifacts are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Index the next sample will get; equals the number of samples so far
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Claim the next index
    pub fn advance(&mut self) -> usize {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    /// `<dir>/<index>_<kind>.png`
    pub fn path(&self, index: usize, kind: &str) -> PathBuf {
        self.dir.join(format!("{index}_{kind}.png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_nested_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a/b/c");
        let writer = ArtifactWriter::create(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(writer.next_index(), 0);
    }

    #[test]
    fn test_dense_indices() {
        let root = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::create(root.path()).unwrap();
        assert_eq!(writer.advance(), 0);
        assert_eq!(writer.advance(), 1);
        assert_eq!(writer.path(1, "pred_mask"), root.path().join("1_pred_mask.png"));
    }
}
