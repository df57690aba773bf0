//! Mandelbrot set renderer.
//!
//! Every pixel is mapped to a point `c` of the complex plane and `z <- z^2 + c`
//! is iterated from `z = c`. Pixels escaping (`|z|^2 > 4`) on iteration `i`
//! get gradient color `i / max_iters`; points that never escape get the last
//! gradient entry.

use std::num::NonZeroUsize;
use std::sync::OnceLock;
use std::time::Duration;

use super::gradient::ColorGradient;
use crate::config::ExecutionConfig;
use crate::engine::generate;
use crate::error::{KernelError, Result};
use crate::matrix::PixelMatrix;
use crate::pixel::RgbPixel;

pub const CENTER_X: f32 = -0.5;
pub const CENTER_Y: f32 = 0.0;
pub const DEFAULT_MAX_ITERS: usize = 50;
pub const GRADIENT_LEN: usize = 64;

const GRADIENT_START: RgbPixel = RgbPixel::new(219, 57, 0);
const GRADIENT_STOP: RgbPixel = RgbPixel::new(0, 0, 0);

/// Complex coordinate of pixel `(row, col)` in a `rows x cols` image.
///
/// Both axes are scaled by `scale / rows` and centered on `cols / 2`, so the
/// view is only centered vertically for square images.
#[inline]
pub fn pixel_to_complex(row: usize, col: usize, rows: usize, cols: usize, scale: f32) -> (f32, f32) {
    let step = scale / rows as f32;
    let half = cols as f32 / 2.0;
    (
        step * (col as f32 - half) + CENTER_X,
        step * (row as f32 - half) + CENTER_Y,
    )
}

/// Iteration on which `z <- z^2 + c` (from `z = c`) leaves radius 2, if any.
#[inline]
pub fn escape_iteration(c: (f32, f32), max_iters: usize) -> Option<usize> {
    let (cr, ci) = c;
    let (mut zr, mut zi) = c;
    for i in 0..max_iters {
        let next_r = zr * zr - zi * zi + cr;
        let next_i = zi * zr + zr * zi + ci;
        zr = next_r;
        zi = next_i;
        if zr * zr + zi * zi > 4.0 {
            return Some(i);
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
pub struct MandelbrotGenerator {
    gradient: ColorGradient,
    max_iters: usize,
}

impl MandelbrotGenerator {
    /// Warm orange-to-black gradient of 64 colors.
    pub fn new(max_iters: usize) -> Result<Self> {
        let gradient = ColorGradient::linear(GRADIENT_START, GRADIENT_STOP, GRADIENT_LEN)?;
        Self::with_gradient(gradient, max_iters)
    }

    pub fn with_gradient(gradient: ColorGradient, max_iters: usize) -> Result<Self> {
        if max_iters == 0 {
            return Err(KernelError::invalid("max_iters", "must be at least 1"));
        }
        Ok(MandelbrotGenerator { gradient, max_iters })
    }

    /// Process-wide generator with the default gradient, built on first use.
    pub fn shared() -> &'static MandelbrotGenerator {
        static SHARED: OnceLock<MandelbrotGenerator> = OnceLock::new();
        SHARED.get_or_init(|| MandelbrotGenerator {
            gradient: default_gradient(),
            max_iters: DEFAULT_MAX_ITERS,
        })
    }

    pub fn gradient(&self) -> &ColorGradient {
        &self.gradient
    }

    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[inline]
    pub fn color_of(&self, c: (f32, f32)) -> RgbPixel {
        match escape_iteration(c, self.max_iters) {
            Some(i) => self.gradient.sample(i as f32 / self.max_iters as f32),
            None => self.gradient.last(),
        }
    }

    /// Render into `image`, overwriting every pixel.
    ///
    /// # Arguments
    /// * `scale` - Width of the visible region relative to the image height
    ///
    /// # Returns
    /// Elapsed time of the kernel
    pub fn render(&self, config: &ExecutionConfig, image: &mut PixelMatrix<RgbPixel>, scale: f32) -> Result<Duration> {
        config.run("mandelbrot", || {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(KernelError::invalid(
                    "scale",
                    format!("must be a positive finite number, got {scale}"),
                ));
            }
            let (rows, cols) = image.dim();
            generate(image, |row, col| self.color_of(pixel_to_complex(row, col, rows, cols, scale)));
            Ok(())
        })
    }
}

fn default_gradient() -> ColorGradient {
    const LEN: NonZeroUsize = match NonZeroUsize::new(GRADIENT_LEN) {
        Some(n) => n,
        None => panic!("gradient length must be non-zero"),
    };
    ColorGradient::interpolate(GRADIENT_START, GRADIENT_STOP, LEN)
}

/// Render the Mandelbrot set with the shared 64-color gradient and 50 iterations.
pub fn mandelbrot(config: &ExecutionConfig, image: &mut PixelMatrix<RgbPixel>, scale: f32) -> Result<Duration> {
    MandelbrotGenerator::shared().render(config, image, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_pixel_maps_to_center() {
        let (re, im) = pixel_to_complex(32, 32, 64, 64, 1.0);
        assert_eq!(re, CENTER_X);
        assert_eq!(im, CENTER_Y);
    }

    #[test]
    fn test_pixel_to_complex_step() {
        let (re0, _) = pixel_to_complex(0, 10, 20, 20, 2.0);
        let (re1, _) = pixel_to_complex(0, 11, 20, 20, 2.0);
        assert!((re1 - re0 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_escape_iteration() {
        // Origin and -1 are in the set
        assert_eq!(escape_iteration((0.0, 0.0), 100), None);
        assert_eq!(escape_iteration((-1.0, 0.0), 100), None);
        // c = 2: z1 = 6, escapes immediately
        assert_eq!(escape_iteration((2.0, 0.0), 100), Some(0));
        // c = 1: 2, 5
        assert_eq!(escape_iteration((1.0, 0.0), 100), Some(1));
    }

    #[test]
    fn test_color_of_interior_and_escape() {
        let gen = MandelbrotGenerator::new(50).unwrap();
        assert_eq!(gen.color_of((-0.5, 0.0)), gen.gradient().last());
        assert_eq!(gen.color_of((2.0, 0.0)), gen.gradient().colors()[0]);
        // Escape on iteration 1 of 50 -> index floor(1/50 * 64) = 1
        assert_eq!(gen.color_of((1.0, 0.0)), gen.gradient().colors()[1]);
    }

    #[test]
    fn test_render_matches_direct_iteration() {
        let mut img = PixelMatrix::<RgbPixel>::new(24, 24).unwrap();
        let scale = 3.0;
        mandelbrot(&ExecutionConfig::default(), &mut img, scale).unwrap();

        let gen = MandelbrotGenerator::shared();
        for r in 0..24 {
            for c in 0..24 {
                let point = pixel_to_complex(r, c, 24, 24, scale);
                let expected = match escape_iteration(point, DEFAULT_MAX_ITERS) {
                    Some(i) => gen.gradient().colors()[i * GRADIENT_LEN / DEFAULT_MAX_ITERS],
                    None => gen.gradient().last(),
                };
                assert_eq!(img[(r, c)], expected, "at ({r}, {c})");
            }
        }
        // Center lies inside the set
        assert_eq!(img[(12, 12)], gen.gradient().last());
    }

    #[test]
    fn test_shared_generator_is_cached() {
        let a = MandelbrotGenerator::shared() as *const _;
        let b = MandelbrotGenerator::shared() as *const _;
        assert_eq!(a, b);
        assert_eq!(MandelbrotGenerator::shared().gradient().len(), GRADIENT_LEN);
    }

    #[test]
    fn test_render_rejects_bad_scale() {
        let mut img = PixelMatrix::filled(4, 4, RgbPixel::new(1, 1, 1)).unwrap();
        assert!(mandelbrot(&ExecutionConfig::sequential(), &mut img, 0.0).is_err());
        assert!(img.iter().all(|p| *p == RgbPixel::new(1, 1, 1)));
    }
}
