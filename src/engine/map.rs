//! Elementwise map engine.
//!
//! `output[i] = f(input[i], ...)` for every index, independently. Because no
//! output pixel reads a neighbor, the in-place variants may overwrite their
//! input while iterating.

use ndarray::Zip;

use super::ensure_same_shape;
use crate::error::Result;
use crate::matrix::PixelMatrix;
use crate::pixel::Pixel;

/// Apply `f` to every pixel, overwriting it.
pub fn map_in_place<P, F>(matrix: &mut PixelMatrix<P>, f: F)
where
    P: Pixel,
    F: Fn(P) -> P + Sync + Send,
{
    matrix.array_mut().par_map_inplace(|p| *p = f(*p));
}

/// Write `f(input[i])` into `output[i]`. The pixel type may change.
pub fn map_into<A, B, F>(output: &mut PixelMatrix<B>, input: &PixelMatrix<A>, f: F) -> Result<()>
where
    A: Pixel,
    B: Pixel,
    F: Fn(A) -> B + Sync + Send,
{
    ensure_same_shape(output.dim(), input.dim())?;
    Zip::from(output.array_mut())
        .and(input.as_array())
        .par_for_each(|o, &i| *o = f(i));
    Ok(())
}

/// Two-input map: `output[i] = f(a[i], b[i])`.
pub fn zip_map_into<A, B, C, F>(
    output: &mut PixelMatrix<C>,
    a: &PixelMatrix<A>,
    b: &PixelMatrix<B>,
    f: F,
) -> Result<()>
where
    A: Pixel,
    B: Pixel,
    C: Pixel,
    F: Fn(A, B) -> C + Sync + Send,
{
    ensure_same_shape(output.dim(), a.dim())?;
    ensure_same_shape(output.dim(), b.dim())?;
    Zip::from(output.array_mut())
        .and(a.as_array())
        .and(b.as_array())
        .par_for_each(|o, &x, &y| *o = f(x, y));
    Ok(())
}

/// Two-input map where the first input is also the output.
pub fn zip_map_in_place<A, B, F>(target: &mut PixelMatrix<A>, other: &PixelMatrix<B>, f: F) -> Result<()>
where
    A: Pixel,
    B: Pixel,
    F: Fn(A, B) -> A + Sync + Send,
{
    ensure_same_shape(target.dim(), other.dim())?;
    Zip::from(target.array_mut())
        .and(other.as_array())
        .par_for_each(|t, &o| *t = f(*t, o));
    Ok(())
}

/// Fill every pixel from its `(row, col)` position alone.
pub fn generate<P, F>(output: &mut PixelMatrix<P>, f: F)
where
    P: Pixel,
    F: Fn(usize, usize) -> P + Sync + Send,
{
    Zip::indexed(output.array_mut()).par_for_each(|(row, col), o| *o = f(row, col));
}
