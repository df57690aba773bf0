//! Image generators.
//!
//! Generators overwrite every pixel of the target matrix from its
//! coordinates alone; nothing is read from the previous contents.

pub mod gradient;
pub mod mandelbrot;

pub use gradient::ColorGradient;
pub use mandelbrot::{mandelbrot, MandelbrotGenerator};
