//! Hue rotation in an intensity/chroma decomposition.
//!
//! Each pixel is split into intensity `I` and two chroma components using a
//! linear approximation of RGB -> HSI:
//!
//! ```text
//! I     = (R + G + B) / 3
//! alpha = 1.5 * (R - I)
//! beta  = sqrt(3) / 2 * (G - B)
//! ```
//!
//! The chroma vector keeps its length `C` but is turned to the requested
//! angle, then RGB is rebuilt from `I` and the new components. Channels are
//! clamped to 0.0..=1.0 before scaling back to 8 bits. Achromatic pixels
//! (`C = 0`) keep their intensity.

use std::time::Duration;

use crate::config::ExecutionConfig;
use crate::engine::map_in_place;
use crate::error::{KernelError, Result};
use crate::matrix::PixelMatrix;
use crate::pixel::RgbPixel;

const SQRT_3: f32 = 1.732_050_8;

/// Set the pixel's hue angle (radians), keeping intensity and chroma.
#[inline]
pub fn hue_pixel(input: RgbPixel, angle: f32) -> RgbPixel {
    let r = input.red as f32 / 255.0;
    let g = input.green as f32 / 255.0;
    let b = input.blue as f32 / 255.0;

    let i = (r + g + b) / 3.0;
    let alpha = 1.5 * (r - i);
    let beta = SQRT_3 * 0.5 * (g - b);
    let chroma = (alpha * alpha + beta * beta).sqrt();

    let alpha = angle.cos() * chroma;
    let beta = angle.sin() * chroma;

    let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
    RgbPixel {
        red: to_byte(i + (2.0 / 3.0) * alpha),
        green: to_byte(i - alpha / 3.0 + beta / SQRT_3),
        blue: to_byte(i - alpha / 3.0 - beta / SQRT_3),
    }
}

/// Rotate every pixel's chroma to `angle` radians, in place.
///
/// # Returns
/// Elapsed time of the kernel
pub fn hue_rotate(config: &ExecutionConfig, image: &mut PixelMatrix<RgbPixel>, angle: f32) -> Result<Duration> {
    config.run("hue_rotate", || {
        if !angle.is_finite() {
            return Err(KernelError::invalid("angle", format!("must be finite, got {angle}")));
        }
        map_in_place(image, |p| hue_pixel(p, angle));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Pixel;
    use std::f32::consts::PI;

    fn close(a: RgbPixel, b: RgbPixel) -> bool {
        let d = |x: u8, y: u8| (x as i32 - y as i32).abs() <= 1;
        d(a.red, b.red) && d(a.green, b.green) && d(a.blue, b.blue)
    }

    #[test]
    fn test_hue_red_at_zero_stays_red() {
        let p = hue_pixel(RgbPixel::new(255, 0, 0), 0.0);
        assert!(close(p, RgbPixel::new(255, 0, 0)), "{p}");
    }

    #[test]
    fn test_hue_red_to_green_and_blue() {
        let green = hue_pixel(RgbPixel::new(255, 0, 0), 2.0 * PI / 3.0);
        assert!(close(green, RgbPixel::new(0, 255, 0)), "{green}");

        let blue = hue_pixel(RgbPixel::new(255, 0, 0), 4.0 * PI / 3.0);
        assert!(close(blue, RgbPixel::new(0, 0, 255)), "{blue}");
    }

    #[test]
    fn test_hue_gray_keeps_intensity() {
        for v in [0u8, 64, 128, 255] {
            let p = hue_pixel(RgbPixel::splat(v), 1.0);
            assert!(close(p, RgbPixel::splat(v)), "{p}");
        }
    }

    #[test]
    fn test_hue_rotate_in_place() {
        let mut img = PixelMatrix::filled(3, 3, RgbPixel::new(255, 0, 0)).unwrap();
        hue_rotate(&ExecutionConfig::default(), &mut img, 2.0 * PI / 3.0).unwrap();
        assert!(img.iter().all(|p| close(*p, RgbPixel::new(0, 255, 0))));
    }

    #[test]
    fn test_hue_rejects_nan() {
        let mut img = PixelMatrix::filled(1, 1, RgbPixel::new(1, 2, 3)).unwrap();
        assert!(hue_rotate(&ExecutionConfig::sequential(), &mut img, f32::NAN).is_err());
        assert_eq!(img[(0, 0)], RgbPixel::new(1, 2, 3));
    }
}
