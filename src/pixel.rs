//! Pixel types.
//!
//! Two 8-bit formats are supported:
//!
//! | Type | Channels | Byte layout |
//! |------|----------|-------------|
//! | [`GrayscalePixel`] | 1 | intensity |
//! | [`RgbPixel`] | 3 | red, green, blue |
//!
//! Kernels are written once against the [`Pixel`] trait and instantiated
//! per format by ordinary type dispatch.

use std::fmt;

/// Single-channel 8-bit intensity.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GrayscalePixel {
    pub intensity: u8,
}

/// Three-channel 8-bit color.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RgbPixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl GrayscalePixel {
    pub const fn new(intensity: u8) -> Self {
        GrayscalePixel { intensity }
    }
}

impl RgbPixel {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        RgbPixel { red, green, blue }
    }
}

impl fmt::Display for RgbPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}|{}|{}}}", self.red, self.green, self.blue)
    }
}

/// Capability set every pixel format provides to the kernels.
pub trait Pixel: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Number of 8-bit channels, also the size of the pixel in bytes.
    const CHANNELS: usize;

    /// Channel value by index (`0..CHANNELS`). Out-of-range indices read 0.
    fn channel(&self, index: usize) -> u8;

    /// Build a pixel channel by channel.
    fn from_channels<F: FnMut(usize) -> u8>(f: F) -> Self;

    /// Mean of the channels, truncated.
    fn intensity(&self) -> u8;

    fn map_channels<F: FnMut(u8) -> u8>(&self, mut f: F) -> Self {
        Self::from_channels(|c| f(self.channel(c)))
    }

    /// Same value in every channel.
    fn splat(value: u8) -> Self {
        Self::from_channels(|_| value)
    }
}

impl Pixel for GrayscalePixel {
    const CHANNELS: usize = 1;

    #[inline]
    fn channel(&self, index: usize) -> u8 {
        match index {
            0 => self.intensity,
            _ => 0,
        }
    }

    #[inline]
    fn from_channels<F: FnMut(usize) -> u8>(mut f: F) -> Self {
        GrayscalePixel { intensity: f(0) }
    }

    #[inline]
    fn intensity(&self) -> u8 {
        self.intensity
    }
}

impl Pixel for RgbPixel {
    const CHANNELS: usize = 3;

    #[inline]
    fn channel(&self, index: usize) -> u8 {
        match index {
            0 => self.red,
            1 => self.green,
            2 => self.blue,
            _ => 0,
        }
    }

    #[inline]
    fn from_channels<F: FnMut(usize) -> u8>(mut f: F) -> Self {
        RgbPixel {
            red: f(0),
            green: f(1),
            blue: f(2),
        }
    }

    #[inline]
    fn intensity(&self) -> u8 {
        ((self.red as u32 + self.green as u32 + self.blue as u32) / 3) as u8
    }
}
