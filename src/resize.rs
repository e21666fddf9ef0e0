//! Target size computation.
//!
//! Both sides are halved together until neither reaches the threshold.
//! Odd sides round half to even, so 8193 becomes 4096 and 8195 becomes
//! 4098. A side never drops below one pixel, which is why the threshold
//! must be at least two.

use serde::Serialize;
use thiserror::Error;

use crate::types::Dimensions;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResizeError {
    #[error("cannot resize {dimensions} against threshold {threshold}")]
    InvalidInput {
        dimensions: Dimensions,
        threshold: u32,
    },
}

/// Final size plus the number of halvings that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResizePlan {
    pub target: Dimensions,
    pub halvings: u32,
}

impl ResizePlan {
    pub fn is_noop(&self) -> bool {
        self.halvings == 0
    }
}

/// Compute the size a texture must be encoded at.
///
/// Returns the input unchanged (zero halvings) when both sides are already
/// below `threshold`. Zero-sized input or a threshold below two is
/// rejected rather than looped on.
pub fn target_dimensions(dimensions: Dimensions, threshold: u32) -> Result<ResizePlan, ResizeError> {
    if dimensions.width == 0 || dimensions.height == 0 || threshold < 2 {
        return Err(ResizeError::InvalidInput {
            dimensions,
            threshold,
        });
    }

    let mut target = dimensions;
    let mut halvings = 0;

    while target.exceeds(threshold) {
        target = Dimensions::new(halve(target.width), halve(target.height));
        halvings += 1;
    }

    Ok(ResizePlan { target, halvings })
}

/// `n / 2` rounded half to even, floored at 1.
fn halve(n: u32) -> u32 {
    let q = n / 2;
    let rounded = if n % 2 == 1 && q % 2 == 1 { q + 1 } else { q };
    rounded.max(1)
}
