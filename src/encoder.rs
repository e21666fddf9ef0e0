//! Re-encoding textures through the external texture compiler.
//!
//! The encoder is the only component that writes texture files. It is
//! trusted to overwrite the source in place at the requested size; only
//! its exit status is checked, and a failed call is not rolled back.

use std::path::Path;

use crate::external::{ExternalTool, ToolError};
use crate::types::Dimensions;

/// Something that can rewrite a texture at new dimensions.
///
/// Implementations are shared across worker threads.
pub trait Encoder: Send + Sync {
    fn reencode(&self, path: &Path, target: Dimensions) -> Result<(), ToolError>;
}

/// texconv-compatible command line:
/// `<path> -w <width> -h <height> -o <dir> -y`.
#[derive(Debug, Clone)]
pub struct Texconv {
    tool: ExternalTool,
}

impl Texconv {
    pub fn new(tool: ExternalTool) -> Self {
        Self { tool }
    }

    /// Arguments for one in-place re-encode.
    pub fn arguments(path: &Path, target: Dimensions) -> Vec<std::ffi::OsString> {
        let output_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        vec![
            path.as_os_str().to_owned(),
            "-w".into(),
            target.width.to_string().into(),
            "-h".into(),
            target.height.to_string().into(),
            "-o".into(),
            output_dir.as_os_str().to_owned(),
            "-y".into(),
        ]
    }
}

impl Encoder for Texconv {
    fn reencode(&self, path: &Path, target: Dimensions) -> Result<(), ToolError> {
        log::debug!("Encoding {} at {}", path.display(), target);
        self.tool.run(Self::arguments(path, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn test_arguments() {
        let path = PathBuf::from("addon/texture/wing.dds");
        let args = Texconv::arguments(&path, Dimensions::new(4096, 2048));

        let expected: Vec<OsString> = [
            "addon/texture/wing.dds",
            "-w",
            "4096",
            "-h",
            "2048",
            "-o",
            "addon/texture",
            "-y",
        ]
        .iter()
        .map(OsString::from)
        .collect();

        assert_eq!(args, expected);
    }

    #[test]
    fn test_bare_file_name_outputs_to_current_dir() {
        let args = Texconv::arguments(Path::new("wing.dds"), Dimensions::new(1, 1));
        assert_eq!(args[6], OsString::from("."));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_the_result() {
        let ok = Texconv::new(ExternalTool::new("true"));
        let failing = Texconv::new(ExternalTool::new("false"));
        let path = Path::new("wing.dds");

        assert!(ok.reencode(path, Dimensions::new(4096, 4096)).is_ok());
        assert!(matches!(
            failing.reencode(path, Dimensions::new(4096, 4096)),
            Err(ToolError::Exit { .. })
        ));
    }
}
