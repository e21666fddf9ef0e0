//! One optimization pass over an add-on folder.
//!
//! Validates the root, scans it, hands the oversized textures to the
//! pipeline and, once every outcome is in, regenerates layout.json once.

use std::path::Path;
use std::sync::Arc;

use crate::addon::AddonRoot;
use crate::config::Config;
use crate::discovery::{discover, DiscoveryResult};
use crate::encoder::{Encoder, Texconv};
use crate::error::Result;
use crate::external::ExternalTool;
use crate::layout::{LayoutGenerator, LayoutStatus, LayoutTool};
use crate::pipeline::{CancelToken, Pipeline, ProgressCounter, RunObserver, RunReport};
use crate::types::TextureAsset;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No texture reached the threshold.
    NothingToDo,
    /// Every oversized texture has an outcome (some may have failed).
    Completed,
}

/// Everything a session produced.
#[derive(Debug)]
pub struct SessionReport {
    pub status: SessionStatus,
    pub discovery: DiscoveryResult,
    pub oversized: Vec<TextureAsset>,
    pub run: RunReport,
    pub layout: LayoutStatus,
}

/// An add-on folder plus the tools used to optimize it.
pub struct Session {
    root: AddonRoot,
    config: Config,
    encoder: Arc<dyn Encoder>,
    layout: Box<dyn LayoutGenerator>,
    progress: ProgressCounter,
    cancel: CancelToken,
}

impl Session {
    /// Validate `path` and set up the configured tools.
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        config.validate()?;
        let root = AddonRoot::open(path)?;
        let timeout = config.timeout();

        let encoder = Texconv::new(ExternalTool::new(&config.encoder).with_timeout(timeout));
        let layout = LayoutTool::new(ExternalTool::new(&config.layout_generator).with_timeout(timeout));

        Ok(Self {
            root,
            config,
            encoder: Arc::new(encoder),
            layout: Box::new(layout),
            progress: ProgressCounter::new(),
            cancel: CancelToken::new(),
        })
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_layout_generator(mut self, layout: Box<dyn LayoutGenerator>) -> Self {
        self.layout = layout;
        self
    }

    pub fn root(&self) -> &AddonRoot {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Live progress of the current run; safe to read from other threads.
    pub fn progress(&self) -> ProgressCounter {
        self.progress.clone()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Scan the add-on. Each call is a fresh scan.
    pub fn discover(&self) -> DiscoveryResult {
        discover(self.root.path(), &self.config)
    }

    /// Process a previously computed oversized set, then regenerate the
    /// layout once. An empty set only regenerates when
    /// `regenerate_when_empty` is set.
    pub fn run(&self, oversized: &[TextureAsset], observer: &mut dyn RunObserver) -> Result<(RunReport, LayoutStatus)> {
        let pipeline = Pipeline::new(self.encoder.clone())
            .with_threshold(self.config.threshold)
            .with_jobs(self.config.effective_jobs())
            .with_progress(self.progress.clone())
            .with_cancel_token(self.cancel.clone());

        let report = pipeline.run(oversized, observer)?;
        let layout = self.regenerate_layout(oversized.is_empty());

        Ok((report, layout))
    }

    fn regenerate_layout(&self, nothing_processed: bool) -> LayoutStatus {
        if nothing_processed && !self.config.regenerate_when_empty {
            log::debug!("No textures processed, leaving layout.json alone");
            return LayoutStatus::NotRun;
        }
        LayoutStatus::from_attempt(self.layout.as_ref(), self.root.layout_path())
    }

    /// Scan, process and regenerate in one go.
    pub fn optimize(&self, observer: &mut dyn RunObserver) -> Result<SessionReport> {
        let discovery = self.discover();
        let oversized = discovery.inventory.oversized(self.config.threshold);

        if oversized.is_empty() {
            self.progress.reset(0);
            let layout = self.regenerate_layout(true);

            return Ok(SessionReport {
                status: SessionStatus::NothingToDo,
                discovery,
                oversized,
                run: RunReport::default(),
                layout,
            });
        }

        let (run, layout) = self.run(&oversized, observer)?;

        Ok(SessionReport {
            status: SessionStatus::Completed,
            discovery,
            oversized,
            run,
            layout,
        })
    }
}
