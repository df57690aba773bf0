//! Filter modules.
//!
//! ## Supported Formats
//!
//! | Filter | Grayscale | RGB |
//! |--------|-----------|-----|
//! | gaussian, median, stencil, edge_detect | yes | yes |
//! | invert, black_white | yes | yes |
//! | desaturate, hue_rotate | - | yes |
//!
//! Every filter takes an [`ExecutionConfig`](crate::config::ExecutionConfig),
//! rewrites the matrix in place and returns the elapsed time. Parameters are
//! validated before any pixel is written.
//!
//! ## Filter Categories
//!
//! - **Neighborhood**: gaussian, edge_detect, median, stencil
//! - **Pixel-wise**: desaturate, invert, black_white, hue_rotate
//! - **Conversion**: rgb_to_grayscale, grayscale_to_rgb

pub mod core;
pub mod blur;
pub mod edge;
pub mod noise;
pub mod stencil;
pub mod color_adjust;
pub mod color_science;
pub mod stylize;
pub mod grayscale;

pub use blur::gaussian;
pub use color_adjust::{desaturate, invert};
pub use color_science::hue_rotate;
pub use edge::edge_detect;
pub use grayscale::{grayscale_to_rgb, rgb_to_grayscale};
pub use noise::median;
pub use stencil::stencil;
pub use stylize::black_white;
