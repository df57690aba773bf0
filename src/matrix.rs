//! Dense row-major pixel storage.
//!
//! [`PixelMatrix`] owns `rows * cols` pixels in standard (C) layout, so
//! index `(row, col)` lives at `row * cols + col`. Bulk byte access uses
//! the same order with channels interleaved (`R,G,B` for RGB).

use std::ops::Index;

use ndarray::{Array1, Array2, ArrayView2};

use crate::error::{KernelError, Result};
use crate::pixel::Pixel;

/// 1D filter coefficients. Length `2 * radius + 1`.
pub type FilterVector = Array1<f32>;

/// 2D filter coefficients. Odd extent on both axes.
pub type FilterMatrix = Array2<f32>;

#[derive(Debug, Clone, PartialEq)]
pub struct PixelMatrix<P> {
    data: Array2<P>,
}

/// Validate a shape and return its size in bytes.
fn check_dims<P: Pixel>(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(KernelError::invalid(
            "dimensions",
            format!("matrix must be non-empty, got {rows}x{cols}"),
        ));
    }
    rows.checked_mul(cols)
        .and_then(|n| n.checked_mul(P::CHANNELS))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| KernelError::invalid("dimensions", format!("{rows}x{cols} pixels overflow the address space")))
}

impl<P: Pixel> PixelMatrix<P> {
    /// Create a `rows x cols` matrix of default (black) pixels.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        Self::filled(rows, cols, P::default())
    }

    pub fn filled(rows: usize, cols: usize, value: P) -> Result<Self> {
        check_dims::<P>(rows, cols)?;
        Ok(PixelMatrix {
            data: Array2::from_elem((rows, cols), value),
        })
    }

    /// Create a matrix whose pixel at `(row, col)` is `f(row, col)`.
    pub fn from_fn<F: FnMut(usize, usize) -> P>(rows: usize, cols: usize, mut f: F) -> Result<Self> {
        check_dims::<P>(rows, cols)?;
        Ok(PixelMatrix {
            data: Array2::from_shape_fn((rows, cols), |(r, c)| f(r, c)),
        })
    }

    /// Wrap an existing array. Non-standard layouts are copied into row-major order.
    pub fn from_array(array: Array2<P>) -> Result<Self> {
        let (rows, cols) = array.dim();
        check_dims::<P>(rows, cols)?;
        let data = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };
        Ok(PixelMatrix { data })
    }

    /// Populate a new matrix from interleaved channel bytes.
    pub fn from_bytes(rows: usize, cols: usize, bytes: &[u8]) -> Result<Self> {
        let expected = check_dims::<P>(rows, cols)?;
        if bytes.len() != expected {
            return Err(KernelError::BufferLength {
                expected,
                actual: bytes.len(),
            });
        }

        let pixels: Vec<P> = bytes
            .chunks_exact(P::CHANNELS)
            .map(|px| P::from_channels(|c| px[c]))
            .collect();

        let data = Array2::from_shape_vec((rows, cols), pixels)
            .map_err(|e| KernelError::invalid("bytes", e.to_string()))?;
        Ok(PixelMatrix { data })
    }

    /// Overwrite every pixel from interleaved channel bytes, keeping the shape.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let (rows, cols) = self.dim();
        *self = Self::from_bytes(rows, cols, bytes)?;
        Ok(())
    }

    /// Interleaved channel bytes in row-major order, `byte_len()` long.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        for px in self.data.iter() {
            for c in 0..P::CHANNELS {
                out.push(px.channel(c));
            }
        }
        out
    }

    /// Reallocate as `rows x cols`. Previous contents are discarded.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        check_dims::<P>(rows, cols)?;
        self.data = Array2::from_elem((rows, cols), P::default());
        Ok(())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// `(rows, cols)`
    #[inline]
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: matrices are at least 1x1.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn byte_len(&self) -> usize {
        self.len() * P::CHANNELS
    }

    pub fn get(&self, row: usize, col: usize) -> Option<P> {
        self.data.get((row, col)).copied()
    }

    pub fn view(&self) -> ArrayView2<'_, P> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array2<P> {
        &self.data
    }

    pub fn into_array(self) -> Array2<P> {
        self.data
    }

    /// Row-major pixel iterator.
    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.data.iter()
    }

    /// Engines write through this; nothing else mutates pixels in place.
    pub(crate) fn array_mut(&mut self) -> &mut Array2<P> {
        &mut self.data
    }
}

impl<P: Pixel> Index<(usize, usize)> for PixelMatrix<P> {
    type Output = P;

    fn index(&self, index: (usize, usize)) -> &P {
        &self.data[index]
    }
}
