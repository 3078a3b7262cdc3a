//! Tile discovery and opening.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{DemError, RasterTile, Result};

/// List the tile files in `dir` whose extension matches `extension`.
///
/// Matching is case-insensitive and `extension` is given without the dot.
/// Paths are sorted lexicographically so that merge precedence does not
/// depend on the platform's directory enumeration order.
///
/// Returns [`DemError::NoTiles`] if nothing matches.
pub fn discover_tiles<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let extension = extension.trim_start_matches('.');
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type()?.is_file() {
            continue;
        }

        if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(DemError::NoTiles {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    paths.sort();
    info!("Found {} tile(s) in {}", paths.len(), dir.display());
    for path in &paths {
        debug!("  {}", path.display());
    }

    Ok(paths)
}

/// Open every tile in order.
///
/// If one fails, the tiles opened so far are dropped (and their files
/// closed) before the error is returned.
pub fn open_tiles(paths: &[PathBuf]) -> Result<Vec<RasterTile>> {
    paths.iter().map(RasterTile::open).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.tif", "a.TIF", "b.tif", "notes.txt", "d.tiff"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("sub.tif")).unwrap();

        let paths = discover_tiles(dir.path(), "tif").unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.TIF", "b.tif", "c.tif"]);
    }

    #[test]
    fn test_discover_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"").unwrap();

        let err = discover_tiles(dir.path(), ".tif").unwrap_err();
        assert!(matches!(err, DemError::NoTiles { .. }));
    }

    #[test]
    fn test_discover_missing_dir() {
        let err = discover_tiles("/definitely/not/here", "tif").unwrap_err();
        assert!(matches!(err, DemError::Io(_)));
    }

    #[test]
    fn test_open_invalid_tile_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tif");
        fs::write(&path, b"not a tiff").unwrap();

        assert!(open_tiles(&[path]).is_err());
    }
}
