use super::sampler::{Addressing, FieldView};
use crate::state::{Grid, VelocityField};

/// Mean |div v| over all cells, using the same stencil as the divergence stage.
pub fn mean_abs_divergence(grid: Grid, velocity: &VelocityField, addressing: Addressing) -> f64 {
    let vx = FieldView::new(&velocity.vx, grid, addressing);
    let vy = FieldView::new(&velocity.vy, grid, addressing);
    let mut sum = 0.0;
    for y in 0..grid.height as isize {
        for x in 0..grid.width as isize {
            let d = 0.5 * ((vx.fetch(x + 1, y) - vx.fetch(x - 1, y)) + (vy.fetch(x, y + 1) - vy.fetch(x, y - 1)));
            sum += d.abs();
        }
    }
    sum / grid.len() as f64
}

/// Mean |value| of an already computed scalar field.
pub fn mean_abs(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

/// Volume-averaged kinetic energy: KE = 0.5 * <vx^2 + vy^2>.
pub fn kinetic_energy(vx: &[f64], vy: &[f64]) -> f64 {
    if vx.is_empty() {
        return 0.0;
    }
    let sum: f64 = vx.iter().zip(vy).map(|(u, v)| u * u + v * v).sum();
    0.5 * sum / vx.len() as f64
}

/// (min, max) of a pressure (or any scalar) field; `(0, 0)` when empty.
pub fn pressure_range(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Largest per-cell absolute difference between two equally sized fields.
pub fn max_abs_difference(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}
