use serde::Deserialize;

use crate::state::Grid;

/// How out-of-range cell indices are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressing {
    /// Repeat the nearest edge cell (zero-gradient walls).
    #[default]
    Clamp,
    /// Periodic domain.
    Wrap,
}

impl Addressing {
    /// Map a possibly out-of-range index into `0..n`.
    #[inline]
    pub fn resolve(self, i: isize, n: usize) -> usize {
        match self {
            Addressing::Clamp => i.clamp(0, n as isize - 1) as usize,
            Addressing::Wrap => i.rem_euclid(n as isize) as usize,
        }
    }
}

/// Read-only view over one field plane. Every read goes through the addressing mode.
#[derive(Clone, Copy)]
pub struct FieldView<'a> {
    values: &'a [f64],
    grid: Grid,
    addressing: Addressing,
}

impl<'a> FieldView<'a> {
    pub fn new(values: &'a [f64], grid: Grid, addressing: Addressing) -> Self {
        debug_assert_eq!(values.len(), grid.len());
        Self { values, grid, addressing }
    }

    /// Value at an in-range cell.
    #[inline(always)]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.values[self.grid.idx(x, y)]
    }

    /// Value at any integer cell, resolved by the addressing mode.
    #[inline]
    pub fn fetch(&self, x: isize, y: isize) -> f64 {
        let xi = self.addressing.resolve(x, self.grid.width);
        let yi = self.addressing.resolve(y, self.grid.height);
        self.values[self.grid.idx(xi, yi)]
    }

    /// Bilinear sample at a continuous position; cell centres sit on integer coordinates.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let xf = x.floor();
        let yf = y.floor();
        let fx = x - xf;
        let fy = y - yf;
        // Float-to-int casts saturate, so far-off positions still resolve.
        let x0 = xf as isize;
        let y0 = yf as isize;
        let x1 = x0.saturating_add(1);
        let y1 = y0.saturating_add(1);

        let v00 = self.fetch(x0, y0);
        let v10 = self.fetch(x1, y0);
        let v01 = self.fetch(x0, y1);
        let v11 = self.fetch(x1, y1);

        v00 * (1.0 - fx) * (1.0 - fy) + v10 * fx * (1.0 - fy) + v01 * (1.0 - fx) * fy + v11 * fx * fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(grid: Grid) -> Vec<f64> {
        let mut v = vec![0.0; grid.len()];
        for y in 0..grid.height {
            for x in 0..grid.width {
                v[grid.idx(x, y)] = x as f64 + 10.0 * y as f64;
            }
        }
        v
    }

    #[test]
    fn test_resolve_clamp() {
        assert_eq!(Addressing::Clamp.resolve(-3, 5), 0);
        assert_eq!(Addressing::Clamp.resolve(2, 5), 2);
        assert_eq!(Addressing::Clamp.resolve(9, 5), 4);
    }

    #[test]
    fn test_resolve_wrap() {
        assert_eq!(Addressing::Wrap.resolve(-1, 5), 4);
        assert_eq!(Addressing::Wrap.resolve(5, 5), 0);
        assert_eq!(Addressing::Wrap.resolve(12, 5), 2);
    }

    #[test]
    fn test_fetch_edges() {
        let grid = Grid::new(4, 3).unwrap();
        let values = ramp(grid);
        let clamp = FieldView::new(&values, grid, Addressing::Clamp);
        assert_eq!(clamp.fetch(-1, 0), 0.0);
        assert_eq!(clamp.fetch(4, 2), 23.0);

        let wrap = FieldView::new(&values, grid, Addressing::Wrap);
        assert_eq!(wrap.fetch(-1, 0), 3.0);
        assert_eq!(wrap.fetch(0, -1), 20.0);
    }

    #[test]
    fn test_sample_interpolates() {
        let grid = Grid::new(4, 3).unwrap();
        let values = ramp(grid);
        let view = FieldView::new(&values, grid, Addressing::Clamp);
        assert!((view.sample(1.0, 1.0) - 11.0).abs() < 1e-12);
        assert!((view.sample(1.5, 1.0) - 11.5).abs() < 1e-12);
        assert!((view.sample(1.25, 1.5) - 16.25).abs() < 1e-12);
    }

    #[test]
    fn test_sample_far_outside_is_finite() {
        let grid = Grid::new(4, 3).unwrap();
        let values = ramp(grid);
        for addressing in [Addressing::Clamp, Addressing::Wrap] {
            let view = FieldView::new(&values, grid, addressing);
            for &(x, y) in &[(-1e9, 0.0), (1e9, 1e9), (f64::MAX, -f64::MAX), (-0.5, 2.7)] {
                let v = view.sample(x, y);
                assert!(v.is_finite(), "{addressing:?} sample at ({x}, {y}) = {v}");
                assert!((0.0..=23.0).contains(&v));
            }
        }
    }
}
