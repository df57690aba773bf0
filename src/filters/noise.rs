//! Median filter.
//!
//! Each channel of each output pixel is the median of its
//! `(2r + 1) x (2r + 1)` neighborhood. The median is found with a two-level
//! histogram instead of sorting:
//!
//! 1. Count the window into 16 coarse buckets (`value / 16`) and 256 fine buckets.
//! 2. Walk the coarse buckets, spending the rank budget, until a bucket holds
//!    more values than the remaining budget.
//! 3. Walk the fine buckets of that coarse range the same way.
//!
//! The histogram is rebuilt for every pixel and channel, so cost is
//! proportional to the window area.

use std::time::Duration;

use ndarray::ArrayView2;

use crate::config::ExecutionConfig;
use crate::engine::{map_overlap_clamped, Overlap};
use crate::error::Result;
use crate::matrix::PixelMatrix;
use crate::pixel::Pixel;

const COARSE_BUCKETS: usize = 16;
const FINE_BUCKETS: usize = 256;

/// Zero-based rank of the median in a `(2r + 1)^2` window: `2r(r + 1)`.
#[inline]
pub fn median_rank(radius: usize) -> usize {
    radius.saturating_mul(2).saturating_mul(radius.saturating_add(1))
}

/// Value at zero-based `rank` of `values`, via a coarse/fine histogram.
///
/// `rank` must be less than the number of values.
pub fn histogram_select<I: IntoIterator<Item = u8>>(values: I, rank: usize) -> u8 {
    let mut fine = [0usize; FINE_BUCKETS];
    let mut coarse = [0usize; COARSE_BUCKETS];
    for v in values {
        fine[v as usize] += 1;
        coarse[v as usize / 16] += 1;
    }

    let mut budget = rank;
    let mut coarse_index = COARSE_BUCKETS - 1;
    for (i, &count) in coarse.iter().enumerate() {
        if count > budget {
            coarse_index = i;
            break;
        }
        budget -= count;
    }

    let mut fine_index = coarse_index * 16;
    while fine_index < FINE_BUCKETS - 1 && fine[fine_index] <= budget {
        budget -= fine[fine_index];
        fine_index += 1;
    }
    fine_index as u8
}

#[inline]
fn window_median<P: Pixel>(window: &ArrayView2<'_, P>, channel: usize, rank: usize) -> u8 {
    histogram_select(window.iter().map(|p| p.channel(channel)), rank)
}

/// Apply a median filter in place.
///
/// # Arguments
/// * `image` - Grayscale or RGB matrix
/// * `radius` - Window half-width; must stay below half the image extent
///
/// # Returns
/// Elapsed time of the kernel
pub fn median<P: Pixel>(config: &ExecutionConfig, image: &mut PixelMatrix<P>, radius: usize) -> Result<Duration> {
    config.run("median", || {
        let overlap = Overlap::square(radius);
        overlap.validate(image.dim())?;
        let rank = median_rank(radius);
        let filtered = map_overlap_clamped(image, overlap, |w| {
            P::from_channels(|c| window_median(&w, c, rank))
        })?;
        *image = filtered;
        Ok(())
    })
}
