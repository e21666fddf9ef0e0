//! Texture discovery for add-on folders.
//!
//! Finds every texture container under a root, reads its dimensions from
//! the header and classifies it against the size threshold.
//!
//! # Example
//!
//! ```ignore
//! use texopt::discovery::discover;
//!
//! let discovery = discover("./my-addon", &Config::default());
//! for asset in discovery.inventory.oversized(8192) {
//!     println!("{} ({})", asset.path.display(), asset.dimensions);
//! }
//! ```

mod metadata;
mod scanner;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::types::TextureAsset;

pub use metadata::{read_dimensions, MetadataError};
pub use scanner::{scan_textures, ScanResult, SkippedFile};

#[cfg(test)]
pub(crate) use metadata::write_test_dds;

/// Textures from one scan, largest first.
///
/// An inventory is immutable; rescanning produces a new one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inventory {
    assets: Vec<TextureAsset>,
}

impl Inventory {
    /// Sort scanned assets by descending area, then by path.
    pub fn new(mut assets: Vec<TextureAsset>) -> Self {
        assets.sort_by(|a, b| b.area().cmp(&a.area()).then_with(|| a.path.cmp(&b.path)));
        Self { assets }
    }

    pub fn from_scan(scan: &ScanResult) -> Self {
        Self::new(scan.assets.clone())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureAsset> {
        self.assets.iter()
    }

    pub fn as_slice(&self) -> &[TextureAsset] {
        &self.assets
    }

    /// Assets with either side at or above `threshold`, in inventory order.
    pub fn oversized(&self, threshold: u32) -> Vec<TextureAsset> {
        self.assets
            .iter()
            .filter(|a| a.dimensions.exceeds(threshold))
            .cloned()
            .collect()
    }
}

/// Result of discovering textures in an add-on folder.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The scanned root.
    pub root: PathBuf,

    /// Raw scan output, including skipped files.
    pub scan: ScanResult,

    /// Sorted view of the readable textures.
    pub inventory: Inventory,
}

/// Scan `root` and build the sorted inventory.
pub fn discover(root: impl AsRef<Path>, config: &Config) -> DiscoveryResult {
    let root = root.as_ref().to_path_buf();
    let scan = scan_textures(&root, config);
    let inventory = Inventory::from_scan(&scan);

    DiscoveryResult {
        root,
        scan,
        inventory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimensions;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_inventory_sorted_by_area() {
        let inventory = Inventory::new(vec![
            TextureAsset::new("small.dds", Dimensions::new(1024, 1024)),
            TextureAsset::new("huge.dds", Dimensions::new(16384, 16384)),
            TextureAsset::new("wide.dds", Dimensions::new(16384, 8192)),
        ]);

        let names: Vec<_> = inventory
            .iter()
            .map(|a| a.path.to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["huge.dds", "wide.dds", "small.dds"]);
    }

    #[test]
    fn test_inventory_ties_broken_by_path() {
        let inventory = Inventory::new(vec![
            TextureAsset::new("b.dds", Dimensions::new(2048, 1024)),
            TextureAsset::new("a.dds", Dimensions::new(1024, 2048)),
        ]);

        assert_eq!(inventory.as_slice()[0].path, PathBuf::from("a.dds"));
    }

    #[test]
    fn test_oversized_classification() {
        let dir = tempdir().unwrap();
        write_test_dds(&dir.path().join("a.dds"), 4096, 4096);
        write_test_dds(&dir.path().join("b.dds"), 8192, 8192);
        write_test_dds(&dir.path().join("c.dds"), 16384, 8192);

        let discovery = discover(dir.path(), &Config::default());
        let oversized = discovery.inventory.oversized(8192);

        let dims: Vec<_> = oversized.iter().map(|a| a.dimensions).collect();
        assert_eq!(
            dims,
            vec![Dimensions::new(16384, 8192), Dimensions::new(8192, 8192)]
        );
        assert_eq!(discovery.inventory.len(), 3);
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempdir().unwrap();

        let discovery = discover(dir.path(), &Config::default());

        assert!(discovery.inventory.is_empty());
        assert!(discovery.scan.is_empty());
        assert_eq!(discovery.root, dir.path());
    }
}
