//! Pixelkernels
//!
//! Data-parallel image filters and generators over in-memory pixel
//! matrices, with optional Python bindings via PyO3, WASM bindings for
//! JavaScript and a command-line front-end.
//!
//! ## Image Format
//! Images are row-major [`PixelMatrix`] values of one of two pixel types:
//! - **Grayscale**: [`GrayscalePixel`] - single 8-bit channel
//! - **RGB**: [`RgbPixel`] - 3 8-bit color channels
//!
//! The bindings exchange `(height, width, 1)` / `(height, width, 3)` `u8`
//! arrays (or flat interleaved buffers) and convert at the boundary.
//!
//! ## Execution
//! Every kernel takes an [`ExecutionConfig`] (backend name and worker count),
//! runs on a rayon pool sized from it and returns the elapsed
//! [`Duration`](std::time::Duration) of the run. Invalid parameters are
//! reported as [`KernelError`] before any pixel is written.

pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod generators;
pub mod matrix;
pub mod pixel;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{Backend, ExecutionConfig};
pub use error::{KernelError, Result};
pub use matrix::{FilterMatrix, FilterVector, PixelMatrix};
pub use pixel::{GrayscalePixel, Pixel, RgbPixel};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    use ndarray::{Array3, ArrayView3};
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::config::{seconds_or_sentinel, ExecutionConfig};
    use crate::error::KernelError;
    use crate::filters::{self, grayscale};
    use crate::generators;
    use crate::matrix::PixelMatrix;
    use crate::pixel::{GrayscalePixel, Pixel, RgbPixel};

    type Output<'py> = (Bound<'py, PyArray3<u8>>, f32);

    impl From<KernelError> for PyErr {
        fn from(err: KernelError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    // ========================================================================
    // Execution Settings
    // ========================================================================

    fn settings() -> &'static Mutex<ExecutionConfig> {
        static SETTINGS: OnceLock<Mutex<ExecutionConfig>> = OnceLock::new();
        SETTINGS.get_or_init(|| Mutex::new(ExecutionConfig::default()))
    }

    /// Snapshot of the current settings, taken when a kernel starts.
    fn current() -> ExecutionConfig {
        *settings().lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update<F: FnOnce(&mut ExecutionConfig) -> crate::Result<()>>(f: F) -> PyResult<()> {
        let mut guard = settings().lock().unwrap_or_else(|e| e.into_inner());
        f(&mut *guard)?;
        Ok(())
    }

    /// Select the backend used by subsequent kernels.
    ///
    /// # Arguments
    /// * `name` - One of `cpu`, `openmp`, `opencl`, `cuda` (case-insensitive)
    #[pyfunction]
    pub fn set_backend(name: &str) -> PyResult<()> {
        update(|c| c.set_backend_name(name))
    }

    #[pyfunction]
    pub fn get_backend() -> String {
        current().backend().name().to_string()
    }

    /// Set the worker count for subsequent kernels, clamped to 1..=32.
    #[pyfunction]
    pub fn set_thread_count(threads: i64) -> PyResult<()> {
        let threads = usize::try_from(threads.max(0)).unwrap_or(usize::MAX);
        update(|c| {
            c.set_thread_count(threads);
            Ok(())
        })
    }

    #[pyfunction]
    pub fn get_thread_count() -> usize {
        current().thread_count()
    }

    // ========================================================================
    // Array Conversion
    // ========================================================================

    fn to_matrix<P: Pixel>(image: ArrayView3<'_, u8>) -> PyResult<PixelMatrix<P>> {
        let (height, width, channels) = image.dim();
        if channels != P::CHANNELS {
            return Err(PyValueError::new_err(format!(
                "expected {} channel(s), got {channels}",
                P::CHANNELS
            )));
        }
        let contiguous = image.as_standard_layout();
        let bytes = contiguous
            .as_slice()
            .ok_or_else(|| PyValueError::new_err("image is not contiguous"))?;
        Ok(PixelMatrix::from_bytes(height, width, bytes)?)
    }

    fn to_array<P: Pixel>(matrix: &PixelMatrix<P>) -> PyResult<Array3<u8>> {
        let (height, width) = matrix.dim();
        Array3::from_shape_vec((height, width, P::CHANNELS), matrix.to_bytes())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    /// Run a kernel on a copy of `image` and return it with elapsed seconds.
    ///
    /// A failing kernel leaves the copy unchanged and reports `-1.0`.
    fn apply<'py, P, F>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>, kernel: F) -> PyResult<Output<'py>>
    where
        P: Pixel,
        F: FnOnce(&ExecutionConfig, &mut PixelMatrix<P>) -> crate::Result<Duration>,
    {
        let mut matrix = to_matrix::<P>(image.as_array())?;
        let elapsed = kernel(&current(), &mut matrix);
        Ok((to_array(&matrix)?.into_pyarray(py), seconds_or_sentinel(&elapsed)))
    }

    /// Dispatch on the channel count for kernels defined on both pixel types.
    macro_rules! apply_any {
        ($py:expr, $image:expr, |$config:ident, $matrix:ident| $body:expr) => {{
            let channels = $image.as_array().dim().2;
            if channels == GrayscalePixel::CHANNELS {
                apply::<GrayscalePixel, _>($py, $image, |$config, $matrix| $body)
            } else {
                apply::<RgbPixel, _>($py, $image, |$config, $matrix| $body)
            }
        }};
    }

    // ========================================================================
    // Neighborhood Filters
    // ========================================================================

    /// Separable Gaussian blur.
    ///
    /// # Arguments
    /// * `image` - Input image (1 or 3 channels)
    /// * `sigma` - Standard deviation in pixels (> 0)
    #[pyfunction]
    pub fn gaussian<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>, sigma: f32) -> PyResult<Output<'py>> {
        apply_any!(py, image, |config, matrix| filters::gaussian(config, matrix, sigma))
    }

    /// Sobel edge detection; the result is gray in every channel.
    #[pyfunction]
    pub fn edge_detect<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Output<'py>> {
        apply_any!(py, image, |config, matrix| filters::edge_detect(config, matrix))
    }

    /// Per-channel median over a `(2r+1) x (2r+1)` window.
    #[pyfunction]
    pub fn median<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>, radius: usize) -> PyResult<Output<'py>> {
        apply_any!(py, image, |config, matrix| filters::median(config, matrix, radius))
    }

    /// Generic 2D convolution.
    ///
    /// # Arguments
    /// * `image` - Input image (1 or 3 channels)
    /// * `filter` - 2D float kernel with odd extents (default: 3x3 identity)
    /// * `scaling` - Factor applied to each weighted sum (default: 1.0)
    #[pyfunction]
    #[pyo3(signature = (image, filter=None, scaling=1.0))]
    pub fn stencil<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        filter: Option<PyReadonlyArray2<'py, f32>>,
        scaling: f32,
    ) -> PyResult<Output<'py>> {
        let filter = match filter {
            Some(f) => f.as_array().to_owned(),
            None => filters::stencil::identity_filter(),
        };
        apply_any!(py, image, |config, matrix| filters::stencil(config, matrix, &filter, scaling))
    }

    // ========================================================================
    // Pixel-wise Filters
    // ========================================================================

    /// Blend toward the channel average; `saturation` in 0.0..=1.0.
    #[pyfunction]
    pub fn desaturate<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>, saturation: f32) -> PyResult<Output<'py>> {
        apply::<RgbPixel, _>(py, image, |config, matrix| filters::desaturate(config, matrix, saturation))
    }

    #[pyfunction]
    pub fn invert<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Output<'py>> {
        apply_any!(py, image, |config, matrix| filters::invert(config, matrix))
    }

    #[pyfunction]
    pub fn black_white<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Output<'py>> {
        apply_any!(py, image, |config, matrix| filters::black_white(config, matrix))
    }

    /// Set every pixel's hue to `angle` radians.
    #[pyfunction]
    pub fn hue_rotate<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>, angle: f32) -> PyResult<Output<'py>> {
        apply::<RgbPixel, _>(py, image, |config, matrix| filters::hue_rotate(config, matrix, angle))
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// `(H, W, 3)` -> `(H, W, 1)` channel average.
    #[pyfunction]
    pub fn rgb_to_grayscale<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Output<'py>> {
        let src = to_matrix::<RgbPixel>(image.as_array())?;
        let mut dst = PixelMatrix::<GrayscalePixel>::new(src.rows(), src.cols())?;
        let elapsed = grayscale::rgb_to_grayscale(&current(), &mut dst, &src);
        Ok((to_array(&dst)?.into_pyarray(py), seconds_or_sentinel(&elapsed)))
    }

    /// `(H, W, 1)` -> `(H, W, 3)` with the intensity replicated.
    #[pyfunction]
    pub fn grayscale_to_rgb<'py>(py: Python<'py>, image: PyReadonlyArray3<'py, u8>) -> PyResult<Output<'py>> {
        let src = to_matrix::<GrayscalePixel>(image.as_array())?;
        let mut dst = PixelMatrix::<RgbPixel>::new(src.rows(), src.cols())?;
        let elapsed = grayscale::grayscale_to_rgb(&current(), &mut dst, &src);
        Ok((to_array(&dst)?.into_pyarray(py), seconds_or_sentinel(&elapsed)))
    }

    // ========================================================================
    // Generators
    // ========================================================================

    /// Render a `height x width` Mandelbrot image.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `scale` - Visible extent relative to the image height (default: 3.0)
    #[pyfunction]
    #[pyo3(signature = (width, height, scale=3.0))]
    pub fn mandelbrot<'py>(py: Python<'py>, width: usize, height: usize, scale: f32) -> PyResult<Output<'py>> {
        let mut matrix = PixelMatrix::<RgbPixel>::new(height, width)?;
        let elapsed = generators::mandelbrot(&current(), &mut matrix, scale);
        Ok((to_array(&matrix)?.into_pyarray(py), seconds_or_sentinel(&elapsed)))
    }

    /// Python module definition
    #[pymodule]
    pub fn pixelkernels(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Execution settings
        m.add_function(wrap_pyfunction!(set_backend, m)?)?;
        m.add_function(wrap_pyfunction!(get_backend, m)?)?;
        m.add_function(wrap_pyfunction!(set_thread_count, m)?)?;
        m.add_function(wrap_pyfunction!(get_thread_count, m)?)?;

        // Neighborhood filters
        m.add_function(wrap_pyfunction!(gaussian, m)?)?;
        m.add_function(wrap_pyfunction!(edge_detect, m)?)?;
        m.add_function(wrap_pyfunction!(median, m)?)?;
        m.add_function(wrap_pyfunction!(stencil, m)?)?;

        // Pixel-wise filters
        m.add_function(wrap_pyfunction!(desaturate, m)?)?;
        m.add_function(wrap_pyfunction!(invert, m)?)?;
        m.add_function(wrap_pyfunction!(black_white, m)?)?;
        m.add_function(wrap_pyfunction!(hue_rotate, m)?)?;

        // Conversions
        m.add_function(wrap_pyfunction!(rgb_to_grayscale, m)?)?;
        m.add_function(wrap_pyfunction!(grayscale_to_rgb, m)?)?;

        // Generators
        m.add_function(wrap_pyfunction!(mandelbrot, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::pixelkernels;
