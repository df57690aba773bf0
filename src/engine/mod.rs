//! Data-parallel execution engines.
//!
//! - [`map`] - elementwise: each output pixel depends only on the co-located
//!   input pixel(s). Safe to run in place.
//! - [`overlap`] - neighborhood (stencil): each output pixel depends on a
//!   window around its position, read from an oversampled copy of the source.
//!
//! Both engines split the output across the rayon pool that is current when
//! they are called (see [`crate::config::ExecutionConfig::run`]) and return
//! only once every pixel is written.

pub mod map;
pub mod overlap;

pub use map::{generate, map_in_place, map_into, zip_map_in_place, zip_map_into};
pub use overlap::{map_overlap, map_overlap_clamped, oversample, Overlap};

use crate::error::{KernelError, Result};

pub(crate) fn ensure_same_shape(expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected != actual {
        return Err(KernelError::ShapeMismatch { expected, actual });
    }
    Ok(())
}
