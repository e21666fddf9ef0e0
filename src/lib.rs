//! texopt - Oversized texture downsampler for simulator add-ons
//!
//! Finds every texture in an add-on folder whose width or height reaches a
//! size limit, re-encodes each one in parallel at the largest power-of-two
//! reduction that fits, then regenerates the add-on's layout descriptor.

pub mod addon;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod encoder;
pub mod error;
pub mod external;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod resize;
pub mod session;
pub mod types;

pub use addon::{validate, AddonRoot, Validation};
pub use config::Config;
pub use discovery::{discover, read_dimensions, scan_textures, DiscoveryResult, Inventory, ScanResult};
pub use encoder::{Encoder, Texconv};
pub use error::{Result, TexoptError};
pub use external::{ExternalTool, ToolError};
pub use layout::{LayoutGenerator, LayoutStatus, LayoutTool};
pub use pipeline::{
    plan_resizes, AssetError, CancelToken, Pipeline, ProgressCounter, RunObserver, RunReport, WorkOutcome,
};
pub use resize::{target_dimensions, ResizeError, ResizePlan};
pub use session::{Session, SessionReport, SessionStatus};
pub use types::{Dimensions, TextureAsset, DEFAULT_THRESHOLD};
