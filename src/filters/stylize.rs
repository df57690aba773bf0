//! Black & white threshold.

use std::time::Duration;

use crate::config::ExecutionConfig;
use crate::engine::map_in_place;
use crate::error::Result;
use crate::matrix::PixelMatrix;
use crate::pixel::Pixel;

/// Intensities strictly above this become white.
pub const BW_THRESHOLD: u8 = 127;

#[inline]
pub fn threshold_pixel<P: Pixel>(input: P) -> P {
    P::splat(if input.intensity() > BW_THRESHOLD { 255 } else { 0 })
}

/// Apply a binary threshold in place.
///
/// Every channel becomes 255 when the pixel's channel-average intensity is
/// above 127, and 0 otherwise.
pub fn black_white<P: Pixel>(config: &ExecutionConfig, image: &mut PixelMatrix<P>) -> Result<Duration> {
    config.run("black_white", || {
        map_in_place(image, threshold_pixel);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{GrayscalePixel, RgbPixel};

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(threshold_pixel(GrayscalePixel::new(127)), GrayscalePixel::new(0));
        assert_eq!(threshold_pixel(GrayscalePixel::new(128)), GrayscalePixel::new(255));
        // (128 + 128 + 127) / 3 = 127
        assert_eq!(threshold_pixel(RgbPixel::new(128, 128, 127)), RgbPixel::splat(0));
        assert_eq!(threshold_pixel(RgbPixel::new(128, 128, 128)), RgbPixel::splat(255));
    }

    #[test]
    fn test_black_white_output_is_binary() {
        let src = PixelMatrix::from_fn(8, 8, |r, c| RgbPixel::new((r * 31) as u8, (c * 29) as u8, ((r * c) % 256) as u8))
            .unwrap();
        let mut img = src.clone();
        black_white(&ExecutionConfig::default(), &mut img).unwrap();

        for (out, orig) in img.iter().zip(src.iter()) {
            let expected = if orig.intensity() > 127 { 255 } else { 0 };
            assert_eq!(*out, RgbPixel::splat(expected));
        }
    }
}
