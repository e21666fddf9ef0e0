//! Optimizer configuration (texopt.yaml).
//!
//! The config file is optional. When present in the add-on root (or passed
//! with `--config`) it sets the threshold, tool locations and scan filters.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TexoptError};
use crate::types::DEFAULT_THRESHOLD;

/// The name of the config file looked up in the add-on root.
pub const CONFIG_FILENAME: &str = "texopt.yaml";

#[cfg(windows)]
const DEFAULT_ENCODER: &str = "texconv.exe";
#[cfg(not(windows))]
const DEFAULT_ENCODER: &str = "texconv";

#[cfg(windows)]
const DEFAULT_LAYOUT_GENERATOR: &str = "MSFSLayoutGenerator.exe";
#[cfg(not(windows))]
const DEFAULT_LAYOUT_GENERATOR: &str = "MSFSLayoutGenerator";

/// Optimizer settings loaded from texopt.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Textures with either side at or above this size are downsampled.
    pub threshold: u32,

    /// File extensions treated as texture containers (case-insensitive).
    pub extensions: Vec<String>,

    /// Texture compiler executable.
    pub encoder: PathBuf,

    /// Layout generator executable.
    pub layout_generator: PathBuf,

    /// Number of concurrent workers. Defaults to available parallelism.
    pub jobs: Option<usize>,

    /// Per-call limit for external tools, in seconds.
    pub timeout_secs: Option<u64>,

    /// Patterns to exclude from scanning.
    pub excludes: Vec<String>,

    /// Rebuild layout.json even when no texture needed work.
    pub regenerate_when_empty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            extensions: vec!["dds".to_string()],
            encoder: PathBuf::from(DEFAULT_ENCODER),
            layout_generator: PathBuf::from(DEFAULT_LAYOUT_GENERATOR),
            jobs: None,
            timeout_secs: None,
            excludes: vec![],
            regenerate_when_empty: false,
        }
    }
}

impl Config {
    /// Load config from a texopt.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TexoptError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Load `texopt.yaml` from `root` if it exists, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILENAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content).map_err(|e| TexoptError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.threshold < 2 {
            return Err(TexoptError::Config {
                message: "threshold must be at least 2".to_string(),
                help: Some(format!("The usual limit is {}", DEFAULT_THRESHOLD)),
            });
        }
        if self.jobs == Some(0) {
            return Err(TexoptError::Config {
                message: "jobs must be greater than zero".to_string(),
                help: Some("Leave jobs unset to use every available core".to_string()),
            });
        }
        if self.extensions.is_empty() {
            return Err(TexoptError::Config {
                message: "at least one texture extension is required".to_string(),
                help: Some("e.g. extensions: [dds]".to_string()),
            });
        }
        Ok(())
    }

    /// Worker count for the pool.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Whether a file name carries one of the texture extensions.
    pub fn is_texture(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|known| known.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");

        self.excludes
            .iter()
            .any(|pattern| Self::matches_pattern(&path_str, pattern))
    }

    /// Simple glob pattern matching.
    fn matches_pattern(path: &str, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix("**/") {
            // **/dir/* matches anything inside dir anywhere in the path
            if let Some(dir) = suffix.strip_suffix("/*") {
                return path.contains(&format!("/{}/", dir)) || path.starts_with(&format!("{}/", dir));
            }
            return path.contains(suffix);
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            if !pattern.contains('/') {
                return path.to_lowercase().ends_with(&suffix.to_lowercase());
            }
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", prefix)) || path.contains(&format!("/{}/", prefix));
        }

        path.contains(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.threshold, 8192);
        assert_eq!(config.extensions, vec!["dds"]);
        assert!(config.jobs.is_none());
        assert!(!config.regenerate_when_empty);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
threshold: 4096
extensions: [dds, png]
encoder: tools/texconv.exe
layout_generator: tools/MSFSLayoutGenerator.exe
jobs: 3
timeout_secs: 120
excludes:
  - "**/backup/*"
regenerate_when_empty: true
"#;
        let config = Config::parse(yaml).unwrap();

        assert_eq!(config.threshold, 4096);
        assert_eq!(config.extensions, vec!["dds", "png"]);
        assert_eq!(config.encoder, PathBuf::from("tools/texconv.exe"));
        assert_eq!(config.layout_generator, PathBuf::from("tools/MSFSLayoutGenerator.exe"));
        assert_eq!(config.effective_jobs(), 3);
        assert_eq!(config.timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.excludes, vec!["**/backup/*"]);
        assert!(config.regenerate_when_empty);
    }

    #[test]
    fn test_tiny_threshold_rejected() {
        let err = Config::parse("threshold: 0").unwrap_err();
        assert!(matches!(err, TexoptError::Config { .. }));
        assert!(Config::parse("threshold: 1").is_err());
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Config::parse("jobs: 0").is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::parse("threshold: [not a number]").is_err());
    }

    #[test]
    fn test_is_texture_case_insensitive() {
        let config = Config::default();

        assert!(config.is_texture(Path::new("a/b/wing.dds")));
        assert!(config.is_texture(Path::new("a/b/WING.DDS")));
        assert!(config.is_texture(Path::new("fuselage.Dds")));
        assert!(!config.is_texture(Path::new("fuselage.dds.json")));
        assert!(!config.is_texture(Path::new("dds")));
    }

    #[test]
    fn test_is_texture_dotted_extension() {
        let config = Config {
            extensions: vec![".png".to_string()],
            ..Default::default()
        };

        assert!(config.is_texture(Path::new("decal.png")));
        assert!(!config.is_texture(Path::new("decal.dds")));
    }

    #[test]
    fn test_is_excluded_directory() {
        let config = Config {
            excludes: vec!["**/backup/*".to_string()],
            ..Default::default()
        };

        assert!(config.is_excluded(Path::new("backup/a.dds")));
        assert!(config.is_excluded(Path::new("root/backup/a.dds")));
        assert!(!config.is_excluded(Path::new("root/texture/a.dds")));
    }

    #[test]
    fn test_is_excluded_extension() {
        let config = Config {
            excludes: vec!["*.bak.dds".to_string()],
            ..Default::default()
        };

        assert!(config.is_excluded(Path::new("texture/a.bak.dds")));
        assert!(!config.is_excluded(Path::new("texture/a.dds")));
    }

    #[test]
    fn test_discover_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_discover_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "threshold: 2048\n").unwrap();

        let config = Config::discover(dir.path()).unwrap();

        assert_eq!(config.threshold, 2048);
    }
}
