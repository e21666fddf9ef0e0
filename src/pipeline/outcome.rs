//! Per-asset results and the run report built from them.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::discovery::MetadataError;
use crate::external::ToolError;
use crate::resize::ResizeError;
use crate::types::{Dimensions, TextureAsset};

/// Why a single texture could not be processed.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Resize(#[from] ResizeError),

    #[error("encoder failed: {0}")]
    Encode(#[from] ToolError),

    #[error("cancelled before processing started")]
    Cancelled,

    #[error("worker panicked: {0}")]
    Panicked(String),
}

/// Result of processing one texture. Exactly one per submitted asset.
#[derive(Debug)]
pub enum WorkOutcome {
    /// Re-encoded at a smaller size.
    Resized {
        from: Dimensions,
        to: Dimensions,
        halvings: u32,
    },

    /// The file was already below the threshold when re-read, so the
    /// encoder was not called.
    AlreadyWithinLimit { current: Dimensions },

    Failed(AssetError),
}

impl WorkOutcome {
    /// The size to display for the asset, or `None` on failure so the
    /// caller keeps its previous value.
    pub fn dimension_string(&self) -> Option<String> {
        match self {
            WorkOutcome::Resized { to, .. } => Some(to.to_string()),
            WorkOutcome::AlreadyWithinLimit { current } => Some(current.to_string()),
            WorkOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WorkOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&AssetError> {
        match self {
            WorkOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// One asset and what happened to it.
#[derive(Debug)]
pub struct RunEntry {
    pub asset: TextureAsset,
    pub outcome: WorkOutcome,
}

/// Outcomes of a run, in submission order.
#[derive(Debug, Default)]
pub struct RunReport {
    entries: Vec<RunEntry>,
}

impl RunReport {
    pub(crate) fn new(entries: Vec<RunEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RunEntry] {
        &self.entries
    }

    pub fn resized_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, WorkOutcome::Resized { .. }))
            .count()
    }

    pub fn unchanged_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, WorkOutcome::AlreadyWithinLimit { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failed()).count()
    }

    /// Every failed asset with its reason.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &AssetError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.error().map(|err| (e.asset.path(), err)))
    }

    /// Serializable rows for `--json` output.
    pub fn records(&self) -> Vec<AssetRecord<'_>> {
        self.entries.iter().map(AssetRecord::from).collect()
    }
}

/// Flat, serializable view of a [`RunEntry`].
#[derive(Debug, Serialize)]
pub struct AssetRecord<'a> {
    pub path: &'a Path,
    pub status: &'static str,
    pub before: Dimensions,
    pub after: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> From<&'a RunEntry> for AssetRecord<'a> {
    fn from(entry: &'a RunEntry) -> Self {
        let (status, before, after, error) = match &entry.outcome {
            WorkOutcome::Resized { from, to, .. } => ("resized", *from, Some(*to), None),
            WorkOutcome::AlreadyWithinLimit { current } => ("unchanged", *current, Some(*current), None),
            WorkOutcome::Failed(e) => ("failed", entry.asset.dimensions, None, Some(e.to_string())),
        };

        Self {
            path: entry.asset.path(),
            status,
            before,
            after,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, outcome: WorkOutcome) -> RunEntry {
        RunEntry {
            asset: TextureAsset::new(name, Dimensions::new(16384, 16384)),
            outcome,
        }
    }

    #[test]
    fn test_dimension_string() {
        let resized = WorkOutcome::Resized {
            from: Dimensions::new(16384, 16384),
            to: Dimensions::new(4096, 4096),
            halvings: 2,
        };
        assert_eq!(resized.dimension_string().as_deref(), Some("4096x4096"));
        assert_eq!(WorkOutcome::Failed(AssetError::Cancelled).dimension_string(), None);
    }

    #[test]
    fn test_report_counts() {
        let report = RunReport::new(vec![
            entry(
                "a.dds",
                WorkOutcome::Resized {
                    from: Dimensions::new(16384, 16384),
                    to: Dimensions::new(4096, 4096),
                    halvings: 2,
                },
            ),
            entry(
                "b.dds",
                WorkOutcome::AlreadyWithinLimit {
                    current: Dimensions::new(2048, 2048),
                },
            ),
            entry("c.dds", WorkOutcome::Failed(AssetError::Cancelled)),
        ]);

        assert_eq!(report.len(), 3);
        assert_eq!(report.resized_count(), 1);
        assert_eq!(report.unchanged_count(), 1);
        assert_eq!(report.failed_count(), 1);

        let failures: Vec<_> = report.failures().map(|(p, _)| p.to_path_buf()).collect();
        assert_eq!(failures, vec![std::path::PathBuf::from("c.dds")]);
    }

    #[test]
    fn test_failed_record_keeps_scan_dimensions() {
        let report = RunReport::new(vec![entry(
            "c.dds",
            WorkOutcome::Failed(AssetError::Panicked("boom".into())),
        )]);

        let json = serde_json::to_value(report.records()).unwrap();

        assert_eq!(json[0]["status"], "failed");
        assert_eq!(json[0]["before"]["width"], 16384);
        assert!(json[0]["after"].is_null());
        assert_eq!(json[0]["error"], "worker panicked: boom");
    }
}
