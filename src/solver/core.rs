use super::kernel::{dispatch, dispatch_vector};
use super::sampler::{Addressing, FieldView};
use crate::state::{Grid, ScalarField, VelocityField};

/// Semi-Lagrangian advection with a unit time step.
/// Each cell takes the velocity found one step upstream, at `d - v(d)`.
pub fn advect(grid: Grid, velocity: &VelocityField, out: &mut VelocityField, addressing: Addressing) {
    let vx = FieldView::new(&velocity.vx, grid, addressing);
    let vy = FieldView::new(&velocity.vy, grid, addressing);

    dispatch_vector(grid, &mut out.vx, &mut out.vy, |x, y| {
        let px = x as f64 - vx.at(x, y);
        let py = y as f64 - vy.at(x, y);
        (vx.sample(px, py), vy.sample(px, py))
    });
}

/// Central-difference divergence: 0.5 * ((vx_r - vx_l) + (vy_u - vy_d)).
pub fn divergence(grid: Grid, velocity: &VelocityField, out: &mut ScalarField, addressing: Addressing) {
    let vx = FieldView::new(&velocity.vx, grid, addressing);
    let vy = FieldView::new(&velocity.vy, grid, addressing);

    dispatch(grid, &mut out.values, |x, y| {
        let (x, y) = (x as isize, y as isize);
        let ddx = vx.fetch(x + 1, y) - vx.fetch(x - 1, y);
        let ddy = vy.fetch(x, y + 1) - vy.fetch(x, y - 1);
        0.5 * (ddx + ddy)
    });
}

/// One Jacobi sweep of the pressure Poisson equation.
/// Reads only the previous estimate, so every cell is independent.
#[allow(clippy::too_many_arguments)]
pub fn jacobi(
    grid: Grid,
    divergence: &ScalarField,
    pressure: &ScalarField,
    out: &mut ScalarField,
    coefficient: f64,
    limit: f64,
    addressing: Addressing,
) {
    let div = FieldView::new(&divergence.values, grid, addressing);
    let p = FieldView::new(&pressure.values, grid, addressing);

    dispatch(grid, &mut out.values, |x, y| {
        let d = div.at(x, y);
        let (x, y) = (x as isize, y as isize);
        let neighbors = p.fetch(x - 1, y) + p.fetch(x + 1, y) + p.fetch(x, y + 1) + p.fetch(x, y - 1);
        ((neighbors - d) * coefficient).clamp(-limit, limit)
    });
}

/// Projection: subtract the central-difference pressure gradient from `velocity`.
pub fn subtract_gradient(
    grid: Grid,
    velocity: &VelocityField,
    pressure: &ScalarField,
    out: &mut VelocityField,
    limit: f64,
    addressing: Addressing,
) {
    let vx = FieldView::new(&velocity.vx, grid, addressing);
    let vy = FieldView::new(&velocity.vy, grid, addressing);
    let p = FieldView::new(&pressure.values, grid, addressing);

    dispatch_vector(grid, &mut out.vx, &mut out.vy, |x, y| {
        let (u, v) = (vx.at(x, y), vy.at(x, y));
        let (x, y) = (x as isize, y as isize);
        let gx = 0.5 * (p.fetch(x + 1, y) - p.fetch(x - 1, y));
        let gy = 0.5 * (p.fetch(x, y + 1) - p.fetch(x, y - 1));
        ((u - gx).clamp(-limit, limit), (v - gy).clamp(-limit, limit))
    });
}
