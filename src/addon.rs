//! Add-on root detection.
//!
//! A folder is an add-on root when it directly contains both a
//! `layout.json` descriptor and a `manifest.json` package manifest.

use std::path::{Path, PathBuf};

use crate::error::{Result, TexoptError};

/// The layout descriptor, rebuilt after textures change.
pub const LAYOUT_FILENAME: &str = "layout.json";

/// The package manifest.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Result of checking a folder for the add-on marker files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,

    /// Where the layout descriptor is (or would be).
    pub layout_path: PathBuf,
}

/// Check whether `path` is an add-on root.
///
/// Never fails: a missing folder, a missing marker or any filesystem error
/// simply yields `is_valid == false`.
pub fn validate(path: impl AsRef<Path>) -> Validation {
    let path = path.as_ref();
    let layout_path = path.join(LAYOUT_FILENAME);
    let manifest_path = path.join(MANIFEST_FILENAME);

    let is_valid = path.is_dir() && is_regular_file(&layout_path) && is_regular_file(&manifest_path);

    Validation {
        is_valid,
        layout_path,
    }
}

fn is_regular_file(path: &Path) -> bool {
    // Exact file name match, so case-insensitive filesystems can't pass
    // `Layout.json` off as `layout.json`.
    let Some(name) = path.file_name() else {
        return false;
    };
    let Some(parent) = path.parent() else {
        return false;
    };

    match std::fs::read_dir(parent) {
        Ok(entries) => entries.filter_map(|e| e.ok()).any(|entry| {
            entry.file_name() == name && entry.file_type().map(|t| t.is_file()).unwrap_or(false)
        }),
        Err(_) => false,
    }
}

/// A validated add-on root.
#[derive(Debug, Clone)]
pub struct AddonRoot {
    root: PathBuf,
    layout_path: PathBuf,
}

impl AddonRoot {
    /// Validate `path` and return the root, or `InvalidRoot`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let validation = validate(path);

        if !validation.is_valid {
            return Err(TexoptError::InvalidRoot {
                path: path.to_path_buf(),
                help: Some(format!(
                    "An add-on folder must directly contain {} and {}",
                    LAYOUT_FILENAME, MANIFEST_FILENAME
                )),
            });
        }

        Ok(Self {
            root: path.to_path_buf(),
            layout_path: validation.layout_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn layout_path(&self) -> &Path {
        &self.layout_path
    }
}
