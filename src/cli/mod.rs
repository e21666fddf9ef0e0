pub mod completions;
pub mod optimize;
pub mod scan;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;

/// texopt - Downsample oversized add-on textures
#[derive(Parser, Debug)]
#[command(name = "texopt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List textures in an add-on folder and flag oversized ones
    Scan(scan::ScanArgs),

    /// Downsample every oversized texture and regenerate layout.json
    Optimize(optimize::OptimizeArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Settings shared by commands that read a config.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Config file (default: texopt.yaml in the add-on folder, if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Size limit in pixels; textures at or above it are downsampled
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Number of textures to process at once
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// Texture compiler executable
    #[arg(long)]
    pub encoder: Option<PathBuf>,

    /// Layout generator executable
    #[arg(long)]
    pub layout_generator: Option<PathBuf>,

    /// Give up on an external tool call after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl ConfigArgs {
    /// Load the config for `root` and apply command-line overrides.
    pub fn load(&self, root: &Path) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::discover(root)?,
        };

        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = Some(jobs);
        }
        if let Some(encoder) = &self.encoder {
            config.encoder = encoder.clone();
        }
        if let Some(layout_generator) = &self.layout_generator {
            config.layout_generator = layout_generator.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = Some(timeout);
        }

        config.validate()?;
        Ok(config)
    }
}
