//! Shared pieces used by several filters:
//! - Gaussian kernel generation
//! - Fixed Sobel kernels
//! - The 1D convolution stencil and the separable pass built on it

use ndarray::{arr1, Array1, ArrayView2};

use crate::engine::{map_overlap_clamped, Overlap};
use crate::error::{KernelError, Result};
use crate::matrix::{FilterVector, PixelMatrix};
use crate::pixel::Pixel;

/// Radius of the Gaussian kernel for `sigma`: `ceil(3 * sigma)`, saturating at `usize::MAX`.
pub fn gaussian_radius(sigma: f32) -> Result<usize> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(KernelError::invalid(
            "sigma",
            format!("must be a positive finite number, got {sigma}"),
        ));
    }
    Ok((3.0 * sigma).ceil() as usize)
}

/// Generate a 1D Gaussian kernel of length `2 * radius + 1`.
///
/// `weight[i] = exp(-(i - r)^2 / (2 sigma^2)) / sqrt(2 pi sigma^2)`.
/// The weights are *not* rescaled to sum to one; for small sigma the
/// truncated tail makes them sum to slightly less.
pub fn gaussian_kernel_1d(sigma: f32) -> Result<FilterVector> {
    let radius = gaussian_radius(sigma)?;
    let norm = (2.0 * std::f32::consts::PI * sigma * sigma).sqrt();

    Ok(Array1::from_shape_fn(2 * radius + 1, |i| {
        let x = i as f32 - radius as f32;
        (-x * x / (2.0 * sigma * sigma)).exp() / norm
    }))
}

/// Sobel smoothing kernel `[1, 2, 1]`.
pub fn sobel_average() -> FilterVector {
    arr1(&[1.0, 2.0, 1.0])
}

/// Sobel derivative kernel `[-1, 0, 1]`.
pub fn sobel_difference() -> FilterVector {
    arr1(&[-1.0, 0.0, 1.0])
}

/// Weighted sum of a 1D window per channel, then `(sum + offset) * scaling`
/// clamped to 0..=255.
///
/// The window is a single row or column, so its logical iteration order
/// lines up with the filter.
#[inline]
pub(crate) fn convolve_1d<P: Pixel>(
    window: ArrayView2<'_, P>,
    filter: &FilterVector,
    offset: f32,
    scaling: f32,
) -> P {
    P::from_channels(|c| {
        let sum: f32 = window
            .iter()
            .zip(filter.iter())
            .map(|(p, &k)| p.channel(c) as f32 * k)
            .sum();
        ((sum + offset) * scaling).clamp(0.0, 255.0) as u8
    })
}

/// One row- or column-wise convolution pass into a fresh matrix.
pub(crate) fn separable_pass<P: Pixel>(
    src: &PixelMatrix<P>,
    overlap: Overlap,
    filter: &FilterVector,
    offset: f32,
    scaling: f32,
) -> Result<PixelMatrix<P>> {
    let (wy, wx) = overlap.window_dim();
    if filter.len() != wy * wx {
        return Err(KernelError::invalid(
            "filter",
            format!("length {} does not match window {}x{}", filter.len(), wy, wx),
        ));
    }
    map_overlap_clamped(src, overlap, |w| convolve_1d(w, filter, offset, scaling))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::GrayscalePixel;

    #[test]
    fn test_gaussian_radius() {
        assert_eq!(gaussian_radius(1.0).unwrap(), 3);
        assert_eq!(gaussian_radius(0.5).unwrap(), 2);
        assert_eq!(gaussian_radius(0.1).unwrap(), 1);
        assert!(gaussian_radius(0.0).is_err());
        assert!(gaussian_radius(-1.0).is_err());
        assert!(gaussian_radius(f32::NAN).is_err());
    }

    #[test]
    fn test_gaussian_kernel_symmetric() {
        for sigma in [0.3f32, 1.0, 1.7, 2.5, 4.0] {
            let k = gaussian_kernel_1d(sigma).unwrap();
            let n = k.len();
            assert_eq!(n % 2, 1);
            for i in 0..n / 2 {
                assert_eq!(k[i], k[n - 1 - i], "sigma {sigma} index {i}");
            }
            // Peak at the center
            assert!(k.iter().all(|&v| v <= k[n / 2]));
        }
    }

    #[test]
    fn test_gaussian_kernel_center_value() {
        let k = gaussian_kernel_1d(1.0).unwrap();
        assert_eq!(k.len(), 7);
        let expected = 1.0 / (2.0 * std::f32::consts::PI).sqrt();
        assert!((k[3] - expected).abs() < 1e-6);
        // Not renormalized
        let sum: f32 = k.iter().sum();
        assert!(sum < 1.0 && sum > 0.99);
    }

    #[test]
    fn test_separable_pass_rejects_wrong_filter_length() {
        let src = PixelMatrix::<GrayscalePixel>::new(4, 4).unwrap();
        let err = separable_pass(&src, Overlap::RowWise(1), &arr1(&[1.0, 1.0]), 0.0, 1.0);
        assert!(matches!(err, Err(KernelError::InvalidParameter { .. })));
    }

    #[test]
    fn test_separable_pass_difference() {
        // Horizontal ramp 0, 10, 20, 30
        let src = PixelMatrix::from_fn(3, 4, |_, c| GrayscalePixel::new((c * 10) as u8)).unwrap();
        let out = separable_pass(&src, Overlap::RowWise(1), &sobel_difference(), 255.0, 0.5).unwrap();

        // Interior: (20 - 0 + 255) * 0.5 = 137.5
        assert_eq!(out[(1, 1)], GrayscalePixel::new(137));
        // Left border replicates: (10 - 0 + 255) * 0.5 = 132.5
        assert_eq!(out[(1, 0)], GrayscalePixel::new(132));
    }
}
