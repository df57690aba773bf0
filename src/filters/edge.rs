//! Sobel edge detection.
//!
//! The 3x3 Sobel operator is applied as two separable passes per gradient:
//!
//! | Gradient | Row pass | Column pass |
//! |----------|----------|-------------|
//! | X | `[-1, 0, 1]`, offset 255, scale 0.5 | `[1, 2, 1]`, scale 0.25 |
//! | Y | `[1, 2, 1]`, scale 0.25 | `[-1, 0, 1]`, offset 255, scale 0.5 |
//!
//! The offset keeps signed differences in 0..=255 with 127 meaning "no
//! change". Both gradients are then combined into a magnitude, drawn as
//! dark edges on a white background. Color input is reduced to its channel
//! average first and the result is written back to every channel.

use std::time::Duration;

use super::core::{separable_pass, sobel_average, sobel_difference};
use crate::config::ExecutionConfig;
use crate::engine::{map_into, zip_map_into, Overlap};
use crate::error::Result;
use crate::matrix::PixelMatrix;
use crate::pixel::{GrayscalePixel, Pixel};

/// Combine offset-encoded X and Y gradients: `255 - |(dx, dy)| * 2 * 255`.
#[inline]
pub fn gradient_distance(x: GrayscalePixel, y: GrayscalePixel) -> GrayscalePixel {
    let xf = x.intensity as f32 / 255.0 - 0.5;
    let yf = y.intensity as f32 / 255.0 - 0.5;
    GrayscalePixel::new((255.0 - (xf * xf + yf * yf).sqrt() * 2.0 * 255.0) as u8)
}

fn sobel_gray(image: &PixelMatrix<GrayscalePixel>) -> Result<PixelMatrix<GrayscalePixel>> {
    Overlap::square(1).validate(image.dim())?;
    let avg = sobel_average();
    let diff = sobel_difference();

    let x_rows = separable_pass(image, Overlap::RowWise(1), &diff, 255.0, 0.5)?;
    let y_rows = separable_pass(image, Overlap::RowWise(1), &avg, 0.0, 0.25)?;
    let dx = separable_pass(&x_rows, Overlap::ColWise(1), &avg, 0.0, 0.25)?;
    let dy = separable_pass(&y_rows, Overlap::ColWise(1), &diff, 255.0, 0.5)?;

    let mut out = PixelMatrix::new(image.rows(), image.cols())?;
    zip_map_into(&mut out, &dx, &dy, gradient_distance)?;
    Ok(out)
}

/// Apply Sobel edge detection in place.
///
/// For grayscale input the conversions are identity copies.
///
/// # Arguments
/// * `image` - Grayscale or RGB matrix, at least 3x3
///
/// # Returns
/// Elapsed time of the kernel
pub fn edge_detect<P: Pixel>(config: &ExecutionConfig, image: &mut PixelMatrix<P>) -> Result<Duration> {
    config.run("edge_detect", || {
        let mut gray = PixelMatrix::<GrayscalePixel>::new(image.rows(), image.cols())?;
        map_into(&mut gray, image, |p| GrayscalePixel::new(p.intensity()))?;

        let edges = sobel_gray(&gray)?;
        map_into(image, &edges, |g| P::splat(g.intensity))
    })
}
