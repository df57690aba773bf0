//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Buffer Layout
//!
//! Images travel as flat interleaved `u8` buffers in row-major order:
//! - **RGB**: length = width * height * 3
//! - **Grayscale**: length = width * height
//!
//! Every export runs on the calling thread and returns a new buffer of the
//! same layout, except the conversions, which switch layout. Bad dimensions
//! or parameters are thrown as JS errors.
//!
//! Kernels that accept both pixel kinds have an `_rgb_wasm` and a
//! `_gray_wasm` export. Desaturate and hue rotation are RGB only.

use wasm_bindgen::prelude::*;

use crate::config::ExecutionConfig;
use crate::error::KernelError;
use crate::filters;
use crate::generators;
use crate::matrix::{FilterMatrix, PixelMatrix};
use crate::pixel::{GrayscalePixel, Pixel, RgbPixel};

fn to_js(err: KernelError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Decode `data`, apply `kernel` and encode the result.
fn apply<P, F>(data: &[u8], width: usize, height: usize, kernel: F) -> Result<Vec<u8>, JsValue>
where
    P: Pixel,
    F: FnOnce(&ExecutionConfig, &mut PixelMatrix<P>) -> crate::Result<std::time::Duration>,
{
    let mut image = PixelMatrix::<P>::from_bytes(height, width, data).map_err(to_js)?;
    kernel(&ExecutionConfig::sequential(), &mut image).map_err(to_js)?;
    Ok(image.to_bytes())
}

// ============================================================================
// Neighborhood Filters
// ============================================================================

/// Gaussian blur of an RGB image.
///
/// # Arguments
/// * `data` - Flat array of RGB bytes (length = width * height * 3)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `sigma` - Standard deviation in pixels (> 0)
///
/// # Returns
/// Flat array of blurred RGB bytes
#[wasm_bindgen]
pub fn gaussian_rgb_wasm(data: &[u8], width: usize, height: usize, sigma: f32) -> Result<Vec<u8>, JsValue> {
    apply::<RgbPixel, _>(data, width, height, |c, img| filters::gaussian(c, img, sigma))
}

/// Gaussian blur of a grayscale image.
#[wasm_bindgen]
pub fn gaussian_gray_wasm(data: &[u8], width: usize, height: usize, sigma: f32) -> Result<Vec<u8>, JsValue> {
    apply::<GrayscalePixel, _>(data, width, height, |c, img| filters::gaussian(c, img, sigma))
}

/// Sobel edge detection of an RGB image; output channels are equal.
#[wasm_bindgen]
pub fn edge_detect_rgb_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    apply::<RgbPixel, _>(data, width, height, filters::edge_detect)
}

/// Sobel edge detection of a grayscale image.
#[wasm_bindgen]
pub fn edge_detect_gray_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    apply::<GrayscalePixel, _>(data, width, height, filters::edge_detect)
}

/// Per-channel median filter with a `(2r+1) x (2r+1)` window.
#[wasm_bindgen]
pub fn median_rgb_wasm(data: &[u8], width: usize, height: usize, radius: usize) -> Result<Vec<u8>, JsValue> {
    apply::<RgbPixel, _>(data, width, height, |c, img| filters::median(c, img, radius))
}

#[wasm_bindgen]
pub fn median_gray_wasm(data: &[u8], width: usize, height: usize, radius: usize) -> Result<Vec<u8>, JsValue> {
    apply::<GrayscalePixel, _>(data, width, height, |c, img| filters::median(c, img, radius))
}

fn filter_from_slice(filter: &[f32], filter_width: usize, filter_height: usize) -> Result<FilterMatrix, JsValue> {
    FilterMatrix::from_shape_vec((filter_height, filter_width), filter.to_vec())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Generic convolution of an RGB image.
///
/// # Arguments
/// * `filter` - Row-major kernel weights (length = filter_width * filter_height, odd extents)
/// * `scaling` - Factor applied to each weighted sum
#[wasm_bindgen]
pub fn stencil_rgb_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    filter: &[f32],
    filter_width: usize,
    filter_height: usize,
    scaling: f32,
) -> Result<Vec<u8>, JsValue> {
    let filter = filter_from_slice(filter, filter_width, filter_height)?;
    apply::<RgbPixel, _>(data, width, height, |c, img| filters::stencil(c, img, &filter, scaling))
}

/// Generic convolution of a grayscale image; arguments as [`stencil_rgb_wasm`].
#[wasm_bindgen]
pub fn stencil_gray_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    filter: &[f32],
    filter_width: usize,
    filter_height: usize,
    scaling: f32,
) -> Result<Vec<u8>, JsValue> {
    let filter = filter_from_slice(filter, filter_width, filter_height)?;
    apply::<GrayscalePixel, _>(data, width, height, |c, img| filters::stencil(c, img, &filter, scaling))
}

// ============================================================================
// Pixel-wise Filters
// ============================================================================

/// Blend toward the channel average; `saturation` in 0.0..=1.0.
#[wasm_bindgen]
pub fn desaturate_wasm(data: &[u8], width: usize, height: usize, saturation: f32) -> Result<Vec<u8>, JsValue> {
    apply::<RgbPixel, _>(data, width, height, |c, img| filters::desaturate(c, img, saturation))
}

#[wasm_bindgen]
pub fn invert_rgb_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    apply::<RgbPixel, _>(data, width, height, filters::invert)
}

#[wasm_bindgen]
pub fn invert_gray_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    apply::<GrayscalePixel, _>(data, width, height, filters::invert)
}

#[wasm_bindgen]
pub fn black_white_rgb_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    apply::<RgbPixel, _>(data, width, height, filters::black_white)
}

/// Threshold at 127: values above become 255, the rest 0.
#[wasm_bindgen]
pub fn black_white_gray_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    apply::<GrayscalePixel, _>(data, width, height, filters::black_white)
}

/// Set every pixel's hue to `angle` radians.
#[wasm_bindgen]
pub fn hue_rotate_wasm(data: &[u8], width: usize, height: usize, angle: f32) -> Result<Vec<u8>, JsValue> {
    apply::<RgbPixel, _>(data, width, height, |c, img| filters::hue_rotate(c, img, angle))
}

// ============================================================================
// Conversions
// ============================================================================

/// RGB bytes to one intensity byte per pixel.
#[wasm_bindgen]
pub fn rgb_to_grayscale_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    let src = PixelMatrix::<RgbPixel>::from_bytes(height, width, data).map_err(to_js)?;
    let mut dst = PixelMatrix::<GrayscalePixel>::new(height, width).map_err(to_js)?;
    filters::rgb_to_grayscale(&ExecutionConfig::sequential(), &mut dst, &src).map_err(to_js)?;
    Ok(dst.to_bytes())
}

/// One intensity byte per pixel to RGB bytes with equal channels.
#[wasm_bindgen]
pub fn grayscale_to_rgb_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsValue> {
    let src = PixelMatrix::<GrayscalePixel>::from_bytes(height, width, data).map_err(to_js)?;
    let mut dst = PixelMatrix::<RgbPixel>::new(height, width).map_err(to_js)?;
    filters::grayscale_to_rgb(&ExecutionConfig::sequential(), &mut dst, &src).map_err(to_js)?;
    Ok(dst.to_bytes())
}

// ============================================================================
// Generators
// ============================================================================

/// Render a Mandelbrot image as flat RGB bytes.
#[wasm_bindgen]
pub fn mandelbrot_wasm(width: usize, height: usize, scale: f32) -> Result<Vec<u8>, JsValue> {
    let mut image = PixelMatrix::<RgbPixel>::new(height, width).map_err(to_js)?;
    generators::mandelbrot(&ExecutionConfig::sequential(), &mut image, scale).map_err(to_js)?;
    Ok(image.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Only success paths: building a `JsValue` needs a wasm host.

    #[test]
    fn test_grayscale_to_rgb_wasm() {
        let out = grayscale_to_rgb_wasm(&[10, 20], 2, 1).unwrap();
        assert_eq!(out, vec![10, 10, 10, 20, 20, 20]);
    }

    #[test]
    fn test_gray_round_trip_through_rgb() {
        let gray = [0u8, 90, 180, 255];
        let rgb = grayscale_to_rgb_wasm(&gray, 2, 2).unwrap();
        assert_eq!(rgb_to_grayscale_wasm(&rgb, 2, 2).unwrap(), gray.to_vec());
    }

    #[test]
    fn test_invert_gray_wasm() {
        let out = invert_gray_wasm(&[0, 100, 255], 3, 1).unwrap();
        assert_eq!(out, vec![255, 155, 0]);
    }

    #[test]
    fn test_black_white_gray_wasm() {
        let out = black_white_gray_wasm(&[127, 128, 3, 250], 2, 2).unwrap();
        assert_eq!(out, vec![0, 255, 0, 255]);
    }

    #[test]
    fn test_gray_neighborhood_exports_keep_layout() {
        let flat = vec![77u8; 5 * 4];
        assert_eq!(median_gray_wasm(&flat, 5, 4, 1).unwrap(), flat);
        assert_eq!(edge_detect_gray_wasm(&flat, 5, 4).unwrap().len(), flat.len());

        let identity = [0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(stencil_gray_wasm(&flat, 5, 4, &identity, 3, 3, 1.0).unwrap(), flat);
    }
}
