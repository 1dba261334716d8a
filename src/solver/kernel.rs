//! Per-cell kernel dispatch.
//!
//! A stage is a pure function of the cell coordinate that only reads fields
//! finished by earlier stages, so rows can be evaluated in any order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::state::Grid;

/// Evaluate `cell(x, y)` for every cell, writing row-major into `out`.
pub fn dispatch<F>(grid: Grid, out: &mut [f64], cell: F)
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    debug_assert_eq!(out.len(), grid.len());
    let width = grid.width;

    #[cfg(feature = "parallel")]
    {
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(row, y, &cell));
    }
    #[cfg(not(feature = "parallel"))]
    {
        out.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| fill_row(row, y, &cell));
    }
}

/// Two-component variant of [`dispatch`] for velocity outputs.
pub fn dispatch_vector<F>(grid: Grid, out_x: &mut [f64], out_y: &mut [f64], cell: F)
where
    F: Fn(usize, usize) -> (f64, f64) + Sync,
{
    debug_assert_eq!(out_x.len(), grid.len());
    debug_assert_eq!(out_y.len(), grid.len());
    let width = grid.width;

    #[cfg(feature = "parallel")]
    {
        out_x
            .par_chunks_mut(width)
            .zip(out_y.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row_x, row_y))| fill_row_vector(row_x, row_y, y, &cell));
    }
    #[cfg(not(feature = "parallel"))]
    {
        out_x
            .chunks_mut(width)
            .zip(out_y.chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row_x, row_y))| fill_row_vector(row_x, row_y, y, &cell));
    }
}

#[inline]
fn fill_row<F: Fn(usize, usize) -> f64>(row: &mut [f64], y: usize, cell: &F) {
    for (x, v) in row.iter_mut().enumerate() {
        *v = cell(x, y);
    }
}

#[inline]
fn fill_row_vector<F: Fn(usize, usize) -> (f64, f64)>(row_x: &mut [f64], row_y: &mut [f64], y: usize, cell: &F) {
    for (x, (vx, vy)) in row_x.iter_mut().zip(row_y.iter_mut()).enumerate() {
        (*vx, *vy) = cell(x, y);
    }
}
