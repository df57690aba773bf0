//! Generic 2D stencil convolution.
//!
//! The filter matrix is laid over every pixel's neighborhood and each
//! channel becomes `clamp(0, 255, scaling * sum(pixel * coefficient))`.
//! Filter extents must be odd; the overlap radius on each axis is half the
//! extent, rounded down.

use std::time::Duration;

use ndarray::{Array2, ArrayView2};

use crate::config::ExecutionConfig;
use crate::engine::{map_overlap_clamped, Overlap};
use crate::error::{KernelError, Result};
use crate::matrix::{FilterMatrix, PixelMatrix};
use crate::pixel::Pixel;

/// 3x3 filter that leaves the image unchanged (with scaling 1).
pub fn identity_filter() -> FilterMatrix {
    let mut f = Array2::zeros((3, 3));
    f[(1, 1)] = 1.0;
    f
}

/// Overlap implied by a filter's shape.
pub fn filter_overlap(filter: &FilterMatrix) -> Result<Overlap> {
    let (rows, cols) = filter.dim();
    if rows == 0 || cols == 0 || rows % 2 == 0 || cols % 2 == 0 {
        return Err(KernelError::invalid(
            "filter",
            format!("extent must be odd on both axes, got {rows}x{cols}"),
        ));
    }
    Ok(Overlap::Full {
        rows: rows / 2,
        cols: cols / 2,
    })
}

#[inline]
fn apply_filter<P: Pixel>(window: ArrayView2<'_, P>, filter: &FilterMatrix, scaling: f32) -> P {
    P::from_channels(|c| {
        let sum: f32 = window
            .iter()
            .zip(filter.iter())
            .map(|(p, &k)| p.channel(c) as f32 * k)
            .sum();
        (sum * scaling).clamp(0.0, 255.0) as u8
    })
}

/// Convolve the image with an arbitrary odd-sized filter, in place.
///
/// # Arguments
/// * `image` - Grayscale or RGB matrix
/// * `filter` - Coefficients, odd extent on both axes
/// * `scaling` - Multiplier applied to each weighted sum
///
/// # Returns
/// Elapsed time of the kernel
pub fn stencil<P: Pixel>(
    config: &ExecutionConfig,
    image: &mut PixelMatrix<P>,
    filter: &FilterMatrix,
    scaling: f32,
) -> Result<Duration> {
    config.run("stencil", || {
        let overlap = filter_overlap(filter)?;
        if !scaling.is_finite() {
            return Err(KernelError::invalid("scaling", format!("must be finite, got {scaling}")));
        }
        *image = map_overlap_clamped(image, overlap, |w| apply_filter(w, filter, scaling))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{GrayscalePixel, RgbPixel};
    use ndarray::arr2;

    fn sample() -> PixelMatrix<RgbPixel> {
        PixelMatrix::from_fn(6, 5, |r, c| RgbPixel::new((r * 30) as u8, (c * 40) as u8, ((r * c) * 5) as u8)).unwrap()
    }

    #[test]
    fn test_identity_filter_unchanged() {
        let mut img = sample();
        let before = img.clone();
        stencil(&ExecutionConfig::default(), &mut img, &identity_filter(), 1.0).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_box_filter_with_scaling() {
        let mut img = PixelMatrix::filled(5, 5, GrayscalePixel::new(90)).unwrap();
        let filter = Array2::from_elem((3, 3), 1.0);
        stencil(&ExecutionConfig::sequential(), &mut img, &filter, 1.0 / 9.0).unwrap();
        // 810 / 9 may land a hair under 90
        assert!(img.iter().all(|p| p.intensity == 90 || p.intensity == 89));
    }

    #[test]
    fn test_clamps_to_byte_range() {
        let mut img = PixelMatrix::filled(3, 3, GrayscalePixel::new(100)).unwrap();
        let mut up = img.clone();
        stencil(&ExecutionConfig::sequential(), &mut up, &identity_filter(), 10.0).unwrap();
        assert!(up.iter().all(|p| p.intensity == 255));

        stencil(&ExecutionConfig::sequential(), &mut img, &identity_filter(), -1.0).unwrap();
        assert!(img.iter().all(|p| p.intensity == 0));
    }

    #[test]
    fn test_edge_padding_matches_manual_reference() {
        // Shift filter: output takes the pixel above-left
        let filter = arr2(&[[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        let src = sample();
        let mut img = src.clone();
        stencil(&ExecutionConfig::sequential(), &mut img, &filter, 1.0).unwrap();

        for r in 0..src.rows() {
            for c in 0..src.cols() {
                let expected = src[(r.saturating_sub(1), c.saturating_sub(1))];
                assert_eq!(img[(r, c)], expected, "at ({r}, {c})");
            }
        }
    }

    #[test]
    fn test_non_square_filter() {
        // 1x3 horizontal difference picks the right neighbor
        let filter = arr2(&[[0.0, 0.0, 1.0]]);
        let src = sample();
        let mut img = src.clone();
        stencil(&ExecutionConfig::sequential(), &mut img, &filter, 1.0).unwrap();
        assert_eq!(img[(2, 1)], src[(2, 2)]);
        assert_eq!(img[(2, 4)], src[(2, 4)]);
    }

    #[test]
    fn test_even_filter_rejected() {
        let mut img = sample();
        let before = img.clone();
        let err = stencil(&ExecutionConfig::sequential(), &mut img, &Array2::zeros((2, 3)), 1.0);
        assert!(matches!(err, Err(KernelError::InvalidParameter { .. })));
        assert_eq!(img, before);
    }
}
