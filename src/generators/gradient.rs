//! Linear color gradient lookup table.

use std::num::NonZeroUsize;

use crate::error::{KernelError, Result};
use crate::pixel::RgbPixel;

/// Fixed-size table of colors interpolated between two endpoints.
///
/// Entry `i` of `n` is `start + (stop - start) * i / n`, so the last entry
/// stops one step short of `stop`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGradient {
    colors: Vec<RgbPixel>,
}

impl ColorGradient {
    pub fn linear(start: RgbPixel, stop: RgbPixel, len: usize) -> Result<Self> {
        let len = NonZeroUsize::new(len)
            .ok_or_else(|| KernelError::invalid("len", "gradient needs at least one color"))?;
        Ok(Self::interpolate(start, stop, len))
    }

    pub(crate) fn interpolate(start: RgbPixel, stop: RgbPixel, len: NonZeroUsize) -> Self {
        let len = len.get();
        let lerp = |a: u8, b: u8, t: f64| ((b as f64 - a as f64) * t + a as f64) as u8;
        let colors = (0..len)
            .map(|i| {
                let t = i as f64 / len as f64;
                RgbPixel {
                    red: lerp(start.red, stop.red, t),
                    green: lerp(start.green, stop.green, t),
                    blue: lerp(start.blue, stop.blue, t),
                }
            })
            .collect();
        ColorGradient { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false: construction requires at least one color.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for a fraction in `0.0..1.0`; values outside are clamped to the ends.
    #[inline]
    pub fn sample(&self, t: f32) -> RgbPixel {
        let idx = (t * self.colors.len() as f32) as usize;
        self.colors[idx.min(self.colors.len() - 1)]
    }

    pub fn last(&self) -> RgbPixel {
        self.colors[self.colors.len() - 1]
    }

    pub fn colors(&self) -> &[RgbPixel] {
        &self.colors
    }
}
