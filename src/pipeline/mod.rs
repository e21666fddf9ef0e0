//! Concurrent resize-and-re-encode of oversized textures.
//!
//! Each asset is one task on a bounded rayon pool. A task re-reads the
//! file's dimensions, computes the target size, calls the encoder once and
//! sends its outcome over a channel. The calling thread is the only
//! aggregator: it owns the outcome slots, the progress counter and the
//! observer, so workers never touch shared report state.
//!
//! # Example
//!
//! ```ignore
//! use texopt::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new(Arc::new(texconv)).with_jobs(4);
//! let report = pipeline.run(&oversized, &mut ())?;
//! println!("{} resized, {} failed", report.resized_count(), report.failed_count());
//! ```

mod outcome;
mod progress;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::discovery::read_dimensions;
use crate::encoder::Encoder;
use crate::error::{Result, TexoptError};
use crate::resize::{target_dimensions, ResizeError, ResizePlan};
use crate::types::{TextureAsset, DEFAULT_THRESHOLD};

pub use outcome::{AssetError, AssetRecord, RunEntry, RunReport, WorkOutcome};
pub use progress::{CancelToken, ProgressCounter};

/// Receives results as they arrive, on the thread that called `run`.
pub trait RunObserver {
    /// A run is starting with `total` assets.
    fn on_start(&mut self, _total: usize) {}

    /// The completed count went up by one. Always followed by the
    /// `on_outcome` call for the asset that finished.
    fn on_progress(&mut self, _completed: usize, _total: usize) {}

    /// An asset finished. `index` is its position in the submitted slice.
    fn on_outcome(&mut self, _index: usize, _asset: &TextureAsset, _outcome: &WorkOutcome) {}
}

impl RunObserver for () {}

/// The resize worker pool.
pub struct Pipeline {
    encoder: Arc<dyn Encoder>,
    threshold: u32,
    jobs: usize,
    progress: ProgressCounter,
    cancel: CancelToken,
}

impl Pipeline {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            encoder,
            threshold: DEFAULT_THRESHOLD,
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            progress: ProgressCounter::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Maximum number of assets processed at once (at least one).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Report progress through an existing counter.
    pub fn with_progress(mut self, progress: ProgressCounter) -> Self {
        self.progress = progress;
        self
    }

    /// Handle to the live progress counter.
    pub fn progress(&self) -> ProgressCounter {
        self.progress.clone()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Process every asset and return one outcome per asset, in input order.
    ///
    /// Returns only after every task has reported. Per-asset failures are
    /// recorded in the report; `Err` means the pool itself could not start.
    pub fn run(&self, assets: &[TextureAsset], observer: &mut dyn RunObserver) -> Result<RunReport> {
        let total = assets.len();
        self.progress.reset(total);
        observer.on_start(total);

        if assets.is_empty() {
            return Ok(RunReport::default());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.min(total))
            .thread_name(|i| format!("texopt-worker-{}", i))
            .build()
            .map_err(|e| TexoptError::Pipeline {
                message: format!("Failed to start worker pool: {}", e),
                help: Some("Try a lower --jobs value".to_string()),
            })?;

        log::info!("Processing {} texture(s) on {} worker(s)", total, pool.current_num_threads());

        let (tx, rx) = crossbeam_channel::unbounded::<(usize, WorkOutcome)>();
        let mut slots: Vec<Option<WorkOutcome>> = (0..total).map(|_| None).collect();

        pool.in_place_scope(|scope| {
            for (index, asset) in assets.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = self.process(asset);
                    // The receiver outlives every task.
                    let _ = tx.send((index, outcome));
                });
            }
            drop(tx);

            for (index, outcome) in rx.iter() {
                let completed = self.progress.tick();
                observer.on_progress(completed, total);
                observer.on_outcome(index, &assets[index], &outcome);
                slots[index] = Some(outcome);
            }
        });

        let entries = assets
            .iter()
            .zip(slots)
            .map(|(asset, slot)| {
                slot.map(|outcome| RunEntry {
                    asset: asset.clone(),
                    outcome,
                })
                .ok_or_else(|| TexoptError::Pipeline {
                    message: format!("No outcome recorded for {}", asset.path.display()),
                    help: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RunReport::new(entries))
    }

    /// One task. Never panics and never returns early without an outcome.
    fn process(&self, asset: &TextureAsset) -> WorkOutcome {
        if self.cancel.is_cancelled() {
            return WorkOutcome::Failed(AssetError::Cancelled);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| self.resize_asset(asset))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                log::warn!("Failed to optimize {}: {}", asset.path.display(), e);
                WorkOutcome::Failed(e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Worker panicked on {}: {}", asset.path.display(), message);
                WorkOutcome::Failed(AssetError::Panicked(message))
            }
        }
    }

    fn resize_asset(&self, asset: &TextureAsset) -> std::result::Result<WorkOutcome, AssetError> {
        // Live dimensions, not the scan-time ones.
        let current = read_dimensions(&asset.path)?;
        let plan = target_dimensions(current, self.threshold)?;

        if plan.is_noop() {
            log::debug!("{} is already {}, skipping", asset.path.display(), current);
            return Ok(WorkOutcome::AlreadyWithinLimit { current });
        }

        self.encoder.reencode(&asset.path, plan.target)?;
        log::debug!("{}: {} -> {}", asset.path.display(), current, plan.target);

        Ok(WorkOutcome::Resized {
            from: current,
            to: plan.target,
            halvings: plan.halvings,
        })
    }
}

/// Target sizes from scan-time dimensions, without touching any file.
pub fn plan_resizes(
    assets: &[TextureAsset],
    threshold: u32,
) -> Vec<(&TextureAsset, std::result::Result<ResizePlan, ResizeError>)> {
    assets
        .iter()
        .map(|asset| (asset, target_dimensions(asset.dimensions, threshold)))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
