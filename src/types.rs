//! Core value types shared by the scanner, resizer and pipeline.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Default size limit, in pixels, for either side of a texture.
pub const DEFAULT_THRESHOLD: u32 = 8192;

/// Pixel dimensions of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel count, widened so 65535x65535 textures cannot overflow.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// True if either side reaches the threshold.
    pub fn exceeds(&self, threshold: u32) -> bool {
        self.width >= threshold || self.height >= threshold
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A texture file found under an add-on root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureAsset {
    /// Path of the texture; unique within one scan.
    pub path: PathBuf,

    /// Dimensions read when the asset was scanned.
    pub dimensions: Dimensions,
}

impl TextureAsset {
    pub fn new(path: impl Into<PathBuf>, dimensions: Dimensions) -> Self {
        Self {
            path: path.into(),
            dimensions,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn area(&self) -> u64 {
        self.dimensions.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dimensions() {
        assert_eq!(Dimensions::new(4096, 2048).to_string(), "4096x2048");
    }

    #[test]
    fn test_area_does_not_overflow() {
        let dims = Dimensions::new(u32::MAX, u32::MAX);
        assert_eq!(dims.area(), u64::from(u32::MAX) * u64::from(u32::MAX));
    }

    #[test]
    fn test_exceeds_is_inclusive() {
        assert!(Dimensions::new(8192, 16).exceeds(8192));
        assert!(Dimensions::new(16, 8192).exceeds(8192));
        assert!(!Dimensions::new(8191, 8191).exceeds(8192));
    }
}
