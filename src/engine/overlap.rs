//! Neighborhood (stencil) engine.
//!
//! A stencil reads a `(2ry + 1) x (2rx + 1)` window centered on each output
//! position. Instead of bounds checks inside the hot loop, the source is
//! first *oversampled*: copied into a buffer grown by the radius on every
//! active side, with padding cells replicating the nearest edge pixel. The
//! engine then slices every window straight out of that buffer.
//!
//! The output must be a different matrix from the padded input; the borrow
//! rules enforce this.

use ndarray::{s, ArrayView2, Zip};

use super::map::generate;
use crate::error::{KernelError, Result};
use crate::matrix::PixelMatrix;
use crate::pixel::Pixel;

/// Which axes the window extends along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Neighbors within the same row: window is `1 x (2r + 1)`.
    RowWise(usize),
    /// Neighbors within the same column: window is `(2r + 1) x 1`.
    ColWise(usize),
    /// Full rectangle, `rows` above/below and `cols` left/right.
    Full { rows: usize, cols: usize },
}

impl Overlap {
    /// Square window with the same radius on both axes.
    pub fn square(radius: usize) -> Self {
        Overlap::Full {
            rows: radius,
            cols: radius,
        }
    }

    /// `(vertical radius, horizontal radius)`
    pub fn radii(&self) -> (usize, usize) {
        match *self {
            Overlap::RowWise(r) => (0, r),
            Overlap::ColWise(r) => (r, 0),
            Overlap::Full { rows, cols } => (rows, cols),
        }
    }

    /// Shape of the window handed to the stencil function, saturating at `usize::MAX`.
    pub fn window_dim(&self) -> (usize, usize) {
        let (ry, rx) = self.radii();
        let extent = |r: usize| r.saturating_mul(2).saturating_add(1);
        (extent(ry), extent(rx))
    }

    /// Reject radii that reach past the middle of the matrix on their axis
    /// (`2 * radius >= extent`).
    pub fn validate(&self, dim: (usize, usize)) -> Result<()> {
        let (ry, rx) = self.radii();
        for (radius, extent) in [(ry, dim.0), (rx, dim.1)] {
            if radius > 0 && radius >= extent.div_ceil(2) {
                return Err(KernelError::InvalidRadius { radius, extent });
            }
        }
        Ok(())
    }
}

/// Copy `src` into a buffer padded by the overlap radii, replicating edges.
pub fn oversample<P: Pixel>(src: &PixelMatrix<P>, overlap: Overlap) -> Result<PixelMatrix<P>> {
    overlap.validate(src.dim())?;
    let (ry, rx) = overlap.radii();
    let (rows, cols) = src.dim();

    let mut padded = PixelMatrix::new(rows + 2 * ry, cols + 2 * rx)?;
    let data = src.as_array();
    generate(&mut padded, |r, c| {
        let y = r.clamp(ry, rows + ry - 1) - ry;
        let x = c.clamp(rx, cols + rx - 1) - rx;
        data[(y, x)]
    });
    Ok(padded)
}

/// Write `f(window)` for every output position.
///
/// `padded` must be exactly the output shape grown by the overlap radii,
/// as produced by [`oversample`].
pub fn map_overlap<P, Q, F>(
    output: &mut PixelMatrix<Q>,
    padded: &PixelMatrix<P>,
    overlap: Overlap,
    f: F,
) -> Result<()>
where
    P: Pixel,
    Q: Pixel,
    F: Fn(ArrayView2<'_, P>) -> Q + Sync + Send,
{
    overlap.validate(output.dim())?;
    let (ry, rx) = overlap.radii();
    let (wy, wx) = overlap.window_dim();
    let expected = (output.rows() + 2 * ry, output.cols() + 2 * rx);
    if padded.dim() != expected {
        return Err(KernelError::ShapeMismatch {
            expected,
            actual: padded.dim(),
        });
    }

    let src = padded.as_array();
    Zip::indexed(output.array_mut()).par_for_each(|(row, col), o| {
        *o = f(src.slice(s![row..row + wy, col..col + wx]));
    });
    Ok(())
}

/// Oversample `src` and run `f` over it into a fresh matrix of the same shape.
pub fn map_overlap_clamped<P, Q, F>(src: &PixelMatrix<P>, overlap: Overlap, f: F) -> Result<PixelMatrix<Q>>
where
    P: Pixel,
    Q: Pixel,
    F: Fn(ArrayView2<'_, P>) -> Q + Sync + Send,
{
    let padded = oversample(src, overlap)?;
    let mut output = PixelMatrix::new(src.rows(), src.cols())?;
    map_overlap(&mut output, &padded, overlap, f)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::GrayscalePixel;

    fn ramp(rows: usize, cols: usize) -> PixelMatrix<GrayscalePixel> {
        PixelMatrix::from_fn(rows, cols, |r, c| GrayscalePixel::new((r * 10 + c) as u8)).unwrap()
    }

    #[test]
    fn test_oversample_replicates_edges() {
        let src = ramp(3, 4);
        let padded = oversample(&src, Overlap::square(1)).unwrap();
        assert_eq!(padded.dim(), (5, 6));

        // Corners take the corner pixel
        assert_eq!(padded[(0, 0)], src[(0, 0)]);
        assert_eq!(padded[(4, 5)], src[(2, 3)]);
        // Edge rows and columns are copies of the border
        for c in 0..4 {
            assert_eq!(padded[(0, c + 1)], src[(0, c)]);
            assert_eq!(padded[(4, c + 1)], src[(2, c)]);
        }
        for r in 0..3 {
            assert_eq!(padded[(r + 1, 0)], src[(r, 0)]);
            assert_eq!(padded[(r + 1, 5)], src[(r, 3)]);
        }
        // Interior is the source
        assert_eq!(padded[(2, 2)], src[(1, 1)]);
    }

    #[test]
    fn test_oversample_row_wise_pads_columns_only() {
        let src = ramp(2, 5);
        let padded = oversample(&src, Overlap::RowWise(2)).unwrap();
        assert_eq!(padded.dim(), (2, 9));
        assert_eq!(padded[(1, 0)], src[(1, 0)]);
        assert_eq!(padded[(1, 1)], src[(1, 0)]);
        assert_eq!(padded[(1, 8)], src[(1, 4)]);
    }

    #[test]
    fn test_window_shapes() {
        assert_eq!(Overlap::RowWise(2).window_dim(), (1, 5));
        assert_eq!(Overlap::ColWise(1).window_dim(), (3, 1));
        assert_eq!(Overlap::Full { rows: 1, cols: 2 }.window_dim(), (3, 5));
    }

    #[test]
    fn test_radius_validation() {
        assert!(Overlap::square(1).validate((3, 3)).is_ok());
        assert!(Overlap::square(0).validate((1, 1)).is_ok());
        assert_eq!(
            Overlap::square(2).validate((4, 10)),
            Err(KernelError::InvalidRadius { radius: 2, extent: 4 })
        );
        // Row-wise overlap only constrains the column count
        assert!(Overlap::RowWise(2).validate((1, 5)).is_ok());
        assert!(Overlap::ColWise(2).validate((1, 5)).is_err());
        // Odd extents: 2r = 4 < 5 passes, 2r = 6 >= 5 fails
        assert!(Overlap::square(2).validate((5, 5)).is_ok());
        assert!(Overlap::square(3).validate((5, 5)).is_err());
    }

    #[test]
    fn test_huge_radius_rejected_without_overflow() {
        let radius = 1usize << (usize::BITS - 1);
        assert_eq!(
            Overlap::square(radius).validate((8, 8)),
            Err(KernelError::InvalidRadius { radius, extent: 8 })
        );
        assert!(Overlap::RowWise(usize::MAX).validate((1, 8)).is_err());
        assert_eq!(Overlap::RowWise(usize::MAX).window_dim(), (1, usize::MAX));

        let src = ramp(4, 4);
        let mut out = PixelMatrix::<GrayscalePixel>::new(4, 4).unwrap();
        let err = map_overlap(&mut out, &src, Overlap::square(radius), |w| w[(0, 0)]).unwrap_err();
        assert!(matches!(err, KernelError::InvalidRadius { .. }));
        assert!(oversample(&src, Overlap::ColWise(usize::MAX)).is_err());
    }

    #[test]
    fn test_map_overlap_window_centered() {
        let src = ramp(4, 4);
        let out: PixelMatrix<GrayscalePixel> =
            map_overlap_clamped(&src, Overlap::square(1), |w| w[(1, 1)]).unwrap();
        assert_eq!(out, src);

        // Left neighbor, clamped at column 0
        let left: PixelMatrix<GrayscalePixel> =
            map_overlap_clamped(&src, Overlap::RowWise(1), |w| w[(0, 0)]).unwrap();
        assert_eq!(left[(2, 0)], src[(2, 0)]);
        assert_eq!(left[(2, 3)], src[(2, 2)]);

        // Lower neighbor, clamped at the last row
        let down: PixelMatrix<GrayscalePixel> =
            map_overlap_clamped(&src, Overlap::ColWise(1), |w| w[(2, 0)]).unwrap();
        assert_eq!(down[(0, 1)], src[(1, 1)]);
        assert_eq!(down[(3, 1)], src[(3, 1)]);
    }

    #[test]
    fn test_map_overlap_rejects_unpadded_input() {
        let src = ramp(4, 4);
        let mut out = PixelMatrix::<GrayscalePixel>::new(4, 4).unwrap();
        let err = map_overlap(&mut out, &src, Overlap::square(1), |w| w[(1, 1)]).unwrap_err();
        assert_eq!(
            err,
            KernelError::ShapeMismatch { expected: (6, 6), actual: (4, 4) }
        );
    }
}
