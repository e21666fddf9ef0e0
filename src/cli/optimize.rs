//! Optimize command implementation.
//!
//! Runs a full session: scan, downsample oversized textures through the
//! texture compiler, then regenerate layout.json.

use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use crate::error::{Result, TexoptError};
use crate::layout::LayoutStatus;
use crate::output::{display_path, plural, Printer};
use crate::pipeline::{plan_resizes, RunObserver, WorkOutcome};
use crate::session::{Session, SessionReport, SessionStatus};
use crate::types::TextureAsset;

use super::ConfigArgs;

/// Downsample oversized textures in place
#[derive(Args, Debug)]
pub struct OptimizeArgs {
    /// Add-on folder (must contain layout.json and manifest.json)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Show the planned sizes without running any tool
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: OptimizeArgs, printer: &Printer) -> Result<()> {
    let config = args.config.load(&args.path)?;
    let session = Session::open(&args.path, config)?;

    if args.dry_run {
        return dry_run(&session, printer);
    }

    printer.status("Scanning", &display_path(session.root().path()));

    let mut observer = ProgressPrinter::new(printer);
    let report = session.optimize(&mut observer)?;

    for skipped in &report.discovery.scan.skipped {
        printer.warning("Skipped", &format!("{} ({})", display_path(&skipped.path), skipped.reason));
    }

    if args.json {
        print_json(&report)?;
    }

    match report.status {
        SessionStatus::NothingToDo => {
            printer.info(
                "Finished",
                &format!("no texture reaches {}px, add-on is already optimized", session.config().threshold),
            );
        }
        SessionStatus::Completed => {
            let run = &report.run;
            let mut summary = format!("{} resized", plural(run.resized_count(), "texture", "textures"));
            if run.unchanged_count() > 0 {
                summary.push_str(&format!(", {} already within limit", run.unchanged_count()));
            }
            if run.failed_count() > 0 {
                summary.push_str(&format!(", {} failed", run.failed_count()));
                printer.warning("Finished", &summary);
            } else {
                printer.success("Finished", &summary);
            }
        }
    }

    report_layout(&report.layout, printer);

    Ok(())
}

fn report_layout(layout: &LayoutStatus, printer: &Printer) {
    match layout {
        LayoutStatus::NotRun => {}
        LayoutStatus::Regenerated => printer.success("Regenerated", "layout.json"),
        LayoutStatus::Failed(message) => printer.warning("Layout", &format!("regeneration failed: {}", message)),
    }
}

fn dry_run(session: &Session, printer: &Printer) -> Result<()> {
    let threshold = session.config().threshold;
    let discovery = session.discover();
    let oversized = discovery.inventory.oversized(threshold);

    for (asset, plan) in plan_resizes(&oversized, threshold) {
        match plan {
            Ok(plan) => printer.info(
                "Would resize",
                &format!(
                    "{} {}",
                    display_path(&asset.path),
                    printer.transition(asset.dimensions, plan.target)
                ),
            ),
            Err(e) => printer.error("Invalid", &format!("{}: {}", display_path(&asset.path), e)),
        }
    }

    printer.success(
        "Planned",
        &format!("{} (dry run, nothing changed)", plural(oversized.len(), "texture", "textures")),
    );
    Ok(())
}

fn print_json(report: &SessionReport) -> Result<()> {
    let status = match report.status {
        SessionStatus::NothingToDo => "nothing_to_do",
        SessionStatus::Completed => "completed",
    };

    let output = json!({
        "status": status,
        "root": report.discovery.root,
        "resized": report.run.resized_count(),
        "unchanged": report.run.unchanged_count(),
        "failed": report.run.failed_count(),
        "outcomes": report.run.records(),
        "skipped": report.discovery.scan.skipped,
        "layout": report.layout,
    });

    let text = serde_json::to_string_pretty(&output).map_err(|e| TexoptError::Pipeline {
        message: format!("Failed to serialize report: {}", e),
        help: None,
    })?;
    println!("{}", text);

    Ok(())
}

/// Prints one `[k/N]` line per finished texture.
struct ProgressPrinter<'a> {
    printer: &'a Printer,
    completed: usize,
    total: usize,
}

impl<'a> ProgressPrinter<'a> {
    fn new(printer: &'a Printer) -> Self {
        Self {
            printer,
            completed: 0,
            total: 0,
        }
    }
}

impl RunObserver for ProgressPrinter<'_> {
    fn on_start(&mut self, total: usize) {
        self.total = total;
        if total > 0 {
            self.printer
                .status("Optimizing", &plural(total, "oversized texture", "oversized textures"));
        }
    }

    fn on_progress(&mut self, completed: usize, total: usize) {
        self.completed = completed;
        self.total = total;
    }

    fn on_outcome(&mut self, _index: usize, asset: &TextureAsset, outcome: &WorkOutcome) {
        let counter = self.printer.dim(&format!("[{}/{}]", self.completed, self.total));
        let path = display_path(&asset.path);

        match outcome {
            WorkOutcome::Resized { from, to, .. } => self.printer.status(
                "Resized",
                &format!("{} {} {}", counter, path, self.printer.transition(*from, *to)),
            ),
            WorkOutcome::AlreadyWithinLimit { current } => self
                .printer
                .info("Unchanged", &format!("{} {} is already {}", counter, path, current)),
            WorkOutcome::Failed(e) => self
                .printer
                .error("Failed", &format!("{} {}: {}", counter, path, e)),
        }
    }
}
