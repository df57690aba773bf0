//! Grayscale <-> RGB conversion.
//!
//! Grayscale uses the plain channel average `(r + g + b) / 3`, truncated.
//! Going back to RGB replicates the intensity into all three channels.

use std::time::Duration;

use crate::config::ExecutionConfig;
use crate::engine::map_into;
use crate::error::Result;
use crate::matrix::PixelMatrix;
use crate::pixel::{GrayscalePixel, Pixel, RgbPixel};

#[inline]
pub fn rgb_to_gray_pixel(p: RgbPixel) -> GrayscalePixel {
    GrayscalePixel::new(p.intensity())
}

#[inline]
pub fn gray_to_rgb_pixel(p: GrayscalePixel) -> RgbPixel {
    RgbPixel::splat(p.intensity)
}

/// Write the intensity of `src` into `dst`. Shapes must match.
pub fn rgb_to_grayscale(
    config: &ExecutionConfig,
    dst: &mut PixelMatrix<GrayscalePixel>,
    src: &PixelMatrix<RgbPixel>,
) -> Result<Duration> {
    config.run("rgb_to_grayscale", || map_into(dst, src, rgb_to_gray_pixel))
}

/// Expand `src` into gray RGB pixels in `dst`. Shapes must match.
pub fn grayscale_to_rgb(
    config: &ExecutionConfig,
    dst: &mut PixelMatrix<RgbPixel>,
    src: &PixelMatrix<GrayscalePixel>,
) -> Result<Duration> {
    config.run("grayscale_to_rgb", || map_into(dst, src, gray_to_rgb_pixel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;

    #[test]
    fn test_rgb_to_grayscale_average() {
        let src = PixelMatrix::filled(2, 3, RgbPixel::new(200, 100, 50)).unwrap();
        let mut dst = PixelMatrix::new(2, 3).unwrap();
        rgb_to_grayscale(&ExecutionConfig::default(), &mut dst, &src).unwrap();
        assert!(dst.iter().all(|p| p.intensity == 116));
    }

    #[test]
    fn test_grayscale_to_rgb_replicates() {
        let src = PixelMatrix::from_fn(2, 2, |r, c| GrayscalePixel::new((r * 2 + c) as u8)).unwrap();
        let mut dst = PixelMatrix::new(2, 2).unwrap();
        grayscale_to_rgb(&ExecutionConfig::default(), &mut dst, &src).unwrap();
        assert_eq!(dst[(1, 1)], RgbPixel::new(3, 3, 3));
    }

    #[test]
    fn test_conversion_shape_mismatch() {
        let src = PixelMatrix::<RgbPixel>::new(2, 3).unwrap();
        let mut dst = PixelMatrix::<GrayscalePixel>::new(3, 2).unwrap();
        let err = rgb_to_grayscale(&ExecutionConfig::sequential(), &mut dst, &src).unwrap_err();
        assert!(matches!(err, KernelError::ShapeMismatch { .. }));
    }
}
