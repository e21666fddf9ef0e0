//! Rebuilding an add-on's layout.json after textures change.

use std::path::Path;

use serde::Serialize;

use crate::external::{ExternalTool, ToolError};

/// Something that can regenerate a layout descriptor.
pub trait LayoutGenerator {
    fn regenerate(&self, layout_path: &Path) -> Result<(), ToolError>;
}

/// Calls the layout generator with the descriptor path as its only argument.
#[derive(Debug, Clone)]
pub struct LayoutTool {
    tool: ExternalTool,
}

impl LayoutTool {
    pub fn new(tool: ExternalTool) -> Self {
        Self { tool }
    }
}

impl LayoutGenerator for LayoutTool {
    fn regenerate(&self, layout_path: &Path) -> Result<(), ToolError> {
        log::info!("Regenerating {}", layout_path.display());
        self.tool.run([layout_path.as_os_str()])
    }
}

/// What happened to the layout descriptor at the end of a session.
///
/// Regeneration is best effort: a failure never reverts texture changes
/// and does not fail the session, it is only reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum LayoutStatus {
    NotRun,
    Regenerated,
    Failed(String),
}

impl LayoutStatus {
    /// Run `generator` once and record the outcome.
    pub fn from_attempt(generator: &dyn LayoutGenerator, layout_path: &Path) -> Self {
        match generator.regenerate(layout_path) {
            Ok(()) => LayoutStatus::Regenerated,
            Err(e) => {
                log::warn!("Layout regeneration failed: {}", e);
                LayoutStatus::Failed(e.to_string())
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LayoutStatus::Failed(_))
    }
}
