//! Scan command implementation.
//!
//! Validates an add-on folder and prints its texture inventory.

use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use crate::addon::AddonRoot;
use crate::discovery::{discover, DiscoveryResult};
use crate::error::{Result, TexoptError};
use crate::output::{display_path, plural, Printer};

use super::ConfigArgs;

/// List textures in an add-on folder
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Add-on folder (must contain layout.json and manifest.json)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// List every texture, not only oversized ones
    #[arg(long)]
    pub all: bool,

    /// Print the inventory as JSON on stdout
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: ScanArgs, printer: &Printer) -> Result<()> {
    let root = AddonRoot::open(&args.path)?;
    let config = args.config.load(root.path())?;

    printer.status("Scanning", &display_path(root.path()));
    let discovery = discover(root.path(), &config);

    if args.json {
        return print_json(&discovery, config.threshold);
    }

    let oversized = discovery.inventory.oversized(config.threshold);

    for asset in discovery.inventory.iter() {
        let is_oversized = asset.dimensions.exceeds(config.threshold);
        if is_oversized {
            printer.warning(
                "Oversized",
                &format!("{} {}", display_path(&asset.path), printer.bold(&asset.dimensions.to_string())),
            );
        } else if args.all {
            printer.info(
                "Texture",
                &format!("{} {}", display_path(&asset.path), printer.dim(&asset.dimensions.to_string())),
            );
        }
    }

    for skipped in &discovery.scan.skipped {
        printer.error("Skipped", &format!("{} ({})", display_path(&skipped.path), skipped.reason));
    }

    printer.success(
        "Found",
        &format!(
            "{}, {} at or above {}px",
            plural(discovery.inventory.len(), "texture", "textures"),
            oversized.len(),
            config.threshold
        ),
    );

    Ok(())
}

fn print_json(discovery: &DiscoveryResult, threshold: u32) -> Result<()> {
    let textures: Vec<_> = discovery
        .inventory
        .iter()
        .map(|asset| {
            json!({
                "path": asset.path,
                "width": asset.dimensions.width,
                "height": asset.dimensions.height,
                "oversized": asset.dimensions.exceeds(threshold),
            })
        })
        .collect();

    let output = json!({
        "root": discovery.root,
        "threshold": threshold,
        "textures": textures,
        "skipped": discovery.scan.skipped,
    });

    let text = serde_json::to_string_pretty(&output).map_err(|e| TexoptError::Pipeline {
        message: format!("Failed to serialize inventory: {}", e),
        help: None,
    })?;
    println!("{}", text);

    Ok(())
}
