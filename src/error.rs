use miette::Diagnostic;
use thiserror::Error;

/// Main error type for texopt operations.
///
/// Only conditions that stop a session from starting end up here. Problems
/// with individual textures are recorded per asset and never abort a run.
#[derive(Error, Diagnostic, Debug)]
pub enum TexoptError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(texopt::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(texopt::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Not an add-on folder: {path}")]
    #[diagnostic(code(texopt::addon))]
    InvalidRoot {
        path: std::path::PathBuf,
        #[help]
        help: Option<String>,
    },

    #[error("Pipeline error: {message}")]
    #[diagnostic(code(texopt::pipeline))]
    Pipeline {
        message: String,
        #[help]
        help: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, TexoptError>;
