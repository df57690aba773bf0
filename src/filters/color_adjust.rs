//! Pixel-wise color adjustments: Desaturate, Invert.
//!
//! Both run through the elementwise engine and overwrite the image in place.

use std::time::Duration;

use crate::config::ExecutionConfig;
use crate::engine::map_in_place;
use crate::error::{KernelError, Result};
use crate::matrix::PixelMatrix;
use crate::pixel::{Pixel, RgbPixel};

// ============================================================================
// Desaturate
// ============================================================================

/// Blend a pixel toward its intensity.
///
/// `out = in * saturation + intensity * (1 - saturation)`, with the
/// intensity term truncated to 8 bits before the blend.
#[inline]
pub fn desaturate_pixel(input: RgbPixel, saturation: f32) -> RgbPixel {
    let gray = (input.intensity() as f32 * (1.0 - saturation)) as u8 as f32;
    input.map_channels(|v| (v as f32 * saturation + gray) as u8)
}

/// Desaturate an RGB image in place.
///
/// # Arguments
/// * `saturation` - 0.0 gives pure intensity, 1.0 leaves the image unchanged
///
/// # Returns
/// Elapsed time of the kernel
pub fn desaturate(config: &ExecutionConfig, image: &mut PixelMatrix<RgbPixel>, saturation: f32) -> Result<Duration> {
    config.run("desaturate", || {
        if !(0.0..=1.0).contains(&saturation) {
            return Err(KernelError::invalid(
                "saturation",
                format!("must be within 0.0..=1.0, got {saturation}"),
            ));
        }
        map_in_place(image, |p| desaturate_pixel(p, saturation));
        Ok(())
    })
}

// ============================================================================
// Invert
// ============================================================================

/// Invert every channel: `255 - v`. Works on grayscale and RGB.
pub fn invert<P: Pixel>(config: &ExecutionConfig, image: &mut PixelMatrix<P>) -> Result<Duration> {
    config.run("invert", || {
        map_in_place(image, |p| p.map_channels(|v| 255 - v));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::GrayscalePixel;

    fn sample() -> PixelMatrix<RgbPixel> {
        PixelMatrix::from_fn(4, 5, |r, c| RgbPixel::new((r * 60) as u8, (c * 50 + 3) as u8, ((r + c) * 25) as u8)).unwrap()
    }

    // ========================================================================
    // Desaturate Tests
    // ========================================================================

    #[test]
    fn test_desaturate_zero_gives_intensity() {
        let src = sample();
        let mut img = src.clone();
        desaturate(&ExecutionConfig::default(), &mut img, 0.0).unwrap();
        for (out, orig) in img.iter().zip(src.iter()) {
            assert_eq!(*out, RgbPixel::splat(orig.intensity()));
        }
    }

    #[test]
    fn test_desaturate_one_is_identity() {
        let src = sample();
        let mut img = src.clone();
        desaturate(&ExecutionConfig::default(), &mut img, 1.0).unwrap();
        assert_eq!(img, src);
    }

    #[test]
    fn test_desaturate_half() {
        // intensity 116, 116 * 0.5 = 58
        let p = desaturate_pixel(RgbPixel::new(200, 100, 50), 0.5);
        assert_eq!(p, RgbPixel::new(158, 108, 83));
    }

    #[test]
    fn test_desaturate_out_of_range_rejected() {
        let mut img = sample();
        let before = img.clone();
        assert!(desaturate(&ExecutionConfig::sequential(), &mut img, 1.5).is_err());
        assert!(desaturate(&ExecutionConfig::sequential(), &mut img, f32::NAN).is_err());
        assert_eq!(img, before);
    }

    // ========================================================================
    // Invert Tests
    // ========================================================================

    #[test]
    fn test_invert_rgb() {
        let mut img = PixelMatrix::filled(1, 1, RgbPixel::new(10, 20, 30)).unwrap();
        invert(&ExecutionConfig::sequential(), &mut img).unwrap();
        assert_eq!(img[(0, 0)], RgbPixel::new(245, 235, 225));
    }

    #[test]
    fn test_invert_grayscale() {
        let mut img = PixelMatrix::filled(2, 2, GrayscalePixel::new(100)).unwrap();
        invert(&ExecutionConfig::sequential(), &mut img).unwrap();
        assert!(img.iter().all(|p| p.intensity == 155));
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let src = sample();
        let mut img = src.clone();
        let cfg = ExecutionConfig::default();
        invert(&cfg, &mut img).unwrap();
        for (out, orig) in img.iter().zip(src.iter()) {
            assert_eq!(*out, orig.map_channels(|v| 255 - v));
        }
        invert(&cfg, &mut img).unwrap();
        assert_eq!(img, src);
    }
}
