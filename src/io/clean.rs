//! Remove generated output directories.

use std::fs::remove_dir_all;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;

/// Remove each directory that exists. Returns the ones actually removed.
pub fn remove_output_dirs(dirs: &[&Path]) -> Result<Vec<PathBuf>, AppError> {
    let mut removed = Vec::new();
    for dir in dirs {
        if !dir.exists() {
            continue;
        }
        remove_dir_all(dir)
            .map_err(|e| AppError::new(2, format!("Failed to remove '{}': {e}", dir.display())))?;
        info!(dir = %dir.display(), "removed");
        removed.push(dir.to_path_buf());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_existing_and_ignores_missing() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("csv_outputs");
        std::fs::create_dir_all(out.join("nested")).unwrap();
        std::fs::write(out.join("processed.csv"), "x").unwrap();
        let missing = root.path().join("render");

        let removed = remove_output_dirs(&[out.as_path(), missing.as_path()]).unwrap();
        assert_eq!(removed, vec![out.clone()]);
        assert!(!out.exists());
    }
}
