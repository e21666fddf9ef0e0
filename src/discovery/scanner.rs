//! File system scanner for discovering texture containers.
//!
//! Recursively walks an add-on folder, reads every texture file's header
//! and records its dimensions. Unreadable files are skipped, never fatal.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::config::Config;
use crate::types::TextureAsset;

use super::metadata::read_dimensions;

/// A texture the scanner could not measure.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of scanning a directory for textures.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Textures with readable dimensions, in walk order.
    pub assets: Vec<TextureAsset>,
    /// Texture files whose header could not be read.
    pub skipped: Vec<SkippedFile>,
}

impl ScanResult {
    /// Create a new empty scan result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of texture files seen, readable or not.
    pub fn total(&self) -> usize {
        self.assets.len() + self.skipped.len()
    }

    /// Check if no texture files were found.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Scan a directory tree for texture containers.
///
/// Walk order follows the filesystem, so callers that display results
/// should build an [`Inventory`](super::Inventory) instead.
pub fn scan_textures(root: &Path, config: &Config) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    // Links are not followed, so each file is listed under one path only.
    for entry in WalkDir::new(root).into_iter() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();

        if !config.is_texture(path) {
            continue;
        }

        // Match excludes against the path inside the add-on.
        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_excluded(relative) {
            log::debug!("Excluded {}", relative.display());
            continue;
        }

        match read_dimensions(path) {
            Ok(dimensions) => {
                log::debug!("Found {} ({})", path.display(), dimensions);
                result.assets.push(TextureAsset::new(path, dimensions));
            }
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                result.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::metadata::write_test_dds;
    use crate::types::Dimensions;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempdir().unwrap();

        let result = scan_textures(dir.path(), &Config::default());

        assert!(result.is_empty());
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_scan_recursive() {
        let dir = tempdir().unwrap();

        write_test_dds(&dir.path().join("texture/a.dds"), 4096, 4096);
        write_test_dds(&dir.path().join("model/texture/deep/b.DDS"), 16384, 8192);
        fs::write(dir.path().join("texture/readme.txt"), "hello").unwrap();
        fs::write(dir.path().join("texture/a.dds.json"), "{}").unwrap();

        let result = scan_textures(dir.path(), &Config::default());

        assert_eq!(result.assets.len(), 2);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_scan_skips_corrupt_files() {
        let dir = tempdir().unwrap();

        write_test_dds(&dir.path().join("good.dds"), 8192, 8192);
        fs::write(dir.path().join("bad.dds"), b"garbage").unwrap();

        let result = scan_textures(dir.path(), &Config::default());

        assert_eq!(result.assets.len(), 1);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].path.ends_with("bad.dds"));
        assert_eq!(result.total(), 2);
    }

    #[test]
    fn test_scan_with_excludes() {
        let dir = tempdir().unwrap();

        write_test_dds(&dir.path().join("texture/a.dds"), 8192, 8192);
        write_test_dds(&dir.path().join("backup/a.dds"), 8192, 8192);

        let config = Config {
            excludes: vec!["**/backup/*".to_string()],
            ..Default::default()
        };
        let result = scan_textures(dir.path(), &config);

        assert_eq!(result.assets.len(), 1);
        assert!(result.assets[0].path.to_string_lossy().contains("texture"));
    }

    #[test]
    fn test_scan_is_deterministic() {
        let dir = tempdir().unwrap();
        for (i, size) in [1024u32, 8192, 16384, 2048].iter().enumerate() {
            write_test_dds(&dir.path().join(format!("t{}/x.dds", i)), *size, *size);
        }

        let collect = || {
            scan_textures(dir.path(), &Config::default())
                .assets
                .into_iter()
                .map(|a| (a.path, a.dimensions))
                .collect::<BTreeSet<(PathBuf, Dimensions)>>()
        };

        assert_eq!(collect(), collect());
        assert_eq!(collect().len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_not_listed_twice() {
        let dir = tempdir().unwrap();
        write_test_dds(&dir.path().join("texture/b.dds"), 16384, 16384);
        std::os::unix::fs::symlink(dir.path().join("texture"), dir.path().join("alias")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("texture/b.dds"), dir.path().join("b-link.dds")).unwrap();

        let result = scan_textures(dir.path(), &Config::default());

        let paths: Vec<_> = result.assets.iter().map(|a| a.path.clone()).collect();
        assert_eq!(paths, vec![dir.path().join("texture/b.dds")]);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_scan_nonexistent_directory() {
        let result = scan_textures(Path::new("/nonexistent/path"), &Config::default());
        assert!(result.is_empty());
    }
}
