//! Gaussian blur.
//!
//! Separable 2-pass convolution: a row-wise pass followed by a column-wise
//! pass with the same 1D kernel, each into its own temporary. Edges are
//! extended by replication.

use std::time::Duration;

use super::core::{gaussian_kernel_1d, gaussian_radius, separable_pass};
use crate::config::ExecutionConfig;
use crate::engine::Overlap;
use crate::error::Result;
use crate::matrix::PixelMatrix;
use crate::pixel::Pixel;

/// Apply Gaussian blur in place.
///
/// # Arguments
/// * `image` - Grayscale or RGB matrix
/// * `sigma` - Standard deviation, must be positive. Radius is `ceil(3 * sigma)`
///   and must stay below half the image extent on both axes.
///
/// # Returns
/// Elapsed time of the kernel
pub fn gaussian<P: Pixel>(config: &ExecutionConfig, image: &mut PixelMatrix<P>, sigma: f32) -> Result<Duration> {
    config.run("gaussian", || {
        let radius = gaussian_radius(sigma)?;
        Overlap::square(radius).validate(image.dim())?;
        let kernel = gaussian_kernel_1d(sigma)?;

        let rows = separable_pass(image, Overlap::RowWise(radius), &kernel, 0.0, 1.0)?;
        *image = separable_pass(&rows, Overlap::ColWise(radius), &kernel, 0.0, 1.0)?;
        Ok(())
    })
}
