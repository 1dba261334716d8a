mod core;
pub mod diagnostics;
mod forcing;
mod kernel;
mod params;
mod sampler;

// Re-export public API
pub use forcing::{inject, DragEvent};
pub use params::{ForcingParams, SolverParams, DEFAULT_RELAX_COEFFICIENT, DEFAULT_RELAX_ITERATIONS};
pub use sampler::Addressing;

use crate::error::SimError;
use crate::state::SimState;
use self::core::{advect, divergence, jacobi, subtract_gradient};

/// Per-frame solver statistics, shipped with each snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    /// Jacobi sweeps actually run.
    pub iterations: usize,
    /// Largest pressure change in the last sweep; only tracked with a tolerance.
    pub max_update: Option<f64>,
    /// Mean |div v| of the advected velocity, before projection.
    pub mean_divergence: f64,
}

/// Advance the simulation by one frame.
///
/// Runs advection, divergence, the Jacobi pressure relaxation and the gradient
/// projection in order, then publishes the new velocity and pressure. On error
/// nothing is written.
pub fn fluid_step(state: &mut SimState, params: &SolverParams) -> Result<FrameStats, SimError> {
    state.check_fields()?;
    let grid = state.grid;
    let addressing = params.addressing;
    let limit = params.field_limit;

    // 1. Advect velocity along itself
    advect(grid, state.velocity.front(), &mut state.advected, addressing);

    // 2. Divergence of the advected velocity
    divergence(grid, &state.advected, &mut state.divergence, addressing);

    // 3. Relax pressure, warm-started from last frame
    let mut iterations = 0;
    let mut max_update = None;
    while iterations < params.relax_iterations {
        let (current, next) = state.pressure.split();
        jacobi(grid, &state.divergence, current, next, params.relax_coefficient, limit, addressing);
        let update = params
            .tolerance
            .map(|_| diagnostics::max_abs_difference(&current.values, &next.values));
        state.pressure.swap();
        iterations += 1;
        max_update = update;
        if let (Some(tol), Some(u)) = (params.tolerance, update) {
            if u < tol {
                break;
            }
        }
    }

    // 4. Project: subtract the pressure gradient
    subtract_gradient(
        grid,
        &state.advected,
        state.pressure.front(),
        state.velocity.back_mut(),
        limit,
        addressing,
    );
    state.velocity.swap();

    state.frame += 1;
    Ok(FrameStats {
        frame: state.frame,
        iterations,
        max_update,
        mean_divergence: diagnostics::mean_abs(&state.divergence.values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Grid;

    /// Deterministic pseudo-random value in [-1, 1].
    fn hash(x: usize, y: usize, salt: u64) -> f64 {
        let mut h = (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            ^ salt.wrapping_mul(0x1656_67B1_9E37_79F9);
        h ^= h >> 29;
        h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h ^= h >> 32;
        (h % 20001) as f64 / 10000.0 - 1.0
    }

    fn noisy_state(grid: Grid, amplitude: f64) -> SimState {
        let mut state = SimState::new(grid);
        let v = state.velocity.front_mut();
        for y in 0..grid.height {
            for x in 0..grid.width {
                v.vx[grid.idx(x, y)] = amplitude * hash(x, y, 1);
                v.vy[grid.idx(x, y)] = amplitude * hash(x, y, 2);
            }
        }
        state
    }

    #[test]
    fn test_fluid_step_no_panic() {
        let grid = Grid::new(48, 32).unwrap();
        let mut state = noisy_state(grid, 0.5);
        let params = SolverParams::for_grid(grid);
        for _ in 0..5 {
            fluid_step(&mut state, &params).unwrap();
        }
        assert_eq!(state.frame, 5);
    }

    #[test]
    fn test_zero_state_is_fixed_point() {
        let grid = Grid::new(32, 32).unwrap();
        let mut state = SimState::new(grid);
        let params = SolverParams::for_grid(grid);
        for _ in 0..3 {
            fluid_step(&mut state, &params).unwrap();
        }
        let v = state.velocity.front();
        assert!(v.vx.iter().chain(v.vy.iter()).all(|&c| c == 0.0));
        assert!(state.pressure.front().values.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_deterministic() {
        let grid = Grid::new(40, 40).unwrap();
        let params = SolverParams::for_grid(grid);
        let run = || {
            let mut state = SimState::new(grid);
            for i in 0..6 {
                let x = 10.0 + 3.0 * i as f64;
                inject(&mut state, &DragEvent::new((x - 2.0, 20.0), (x, 21.0)), &params.forcing);
                fluid_step(&mut state, &params).unwrap();
            }
            state.snapshot()
        };
        let a = run();
        let b = run();
        assert_eq!(a.vx, b.vx);
        assert_eq!(a.vy, b.vy);
        assert_eq!(a.pressure, b.pressure);
    }

    #[test]
    fn test_projection_reduces_divergence() {
        let grid = Grid::new(48, 48).unwrap();
        let mut state = noisy_state(grid, 0.2);
        let params = SolverParams::for_grid(grid);
        fluid_step(&mut state, &params).unwrap();
        let before = diagnostics::mean_abs_divergence(grid, &state.advected, params.addressing);
        let after = diagnostics::mean_abs_divergence(grid, state.velocity.front(), params.addressing);
        assert!(
            after < before,
            "projection should reduce divergence: before={before}, after={after}"
        );
    }

    #[test]
    fn test_boundary_cells_stay_in_range() {
        let grid = Grid::new(24, 16).unwrap();
        let mut state = noisy_state(grid, 1.0);
        state.pressure.front_mut().values.fill(0.9);
        for addressing in [Addressing::Clamp, Addressing::Wrap] {
            let params = SolverParams { addressing, ..SolverParams::for_grid(grid) };
            for _ in 0..10 {
                fluid_step(&mut state, &params).unwrap();
            }
            let v = state.velocity.front();
            let p = &state.pressure.front().values;
            for c in v.vx.iter().chain(v.vy.iter()).chain(p.iter()) {
                assert!(c.is_finite() && c.abs() <= params.field_limit, "out of range: {c}");
            }
        }
    }

    #[test]
    fn test_drag_end_to_end() {
        let grid = Grid::new(64, 64).unwrap();
        let mut state = SimState::new(grid);
        let params = SolverParams::for_grid(grid);
        assert!(inject(&mut state, &DragEvent::new((32.0, 32.0), (40.0, 32.0)), &params.forcing));

        let stats = fluid_step(&mut state, &params).unwrap();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.iterations, 4);

        let c = grid.idx(32, 32);
        let v = state.velocity.front();
        assert!(v.vx[c] > 0.0, "drag direction should survive: vx={}", v.vx[c]);
        assert!(v.vy[c].abs() < 1e-9, "no cross-flow on the stroke axis: vy={}", v.vy[c]);
        assert!(state.pressure.front().values[c] > 0.0);
        assert_eq!(state.pressure.front().values[grid.idx(0, 0)], 0.0);
        assert_eq!(v.vx[grid.idx(0, 0)], 0.0);
    }

    #[test]
    fn test_off_grid_drag_leaves_step_unchanged() {
        let grid = Grid::new(32, 32).unwrap();
        let params = SolverParams::for_grid(grid);
        let mut a = noisy_state(grid, 0.3);
        let mut b = noisy_state(grid, 0.3);
        assert!(!inject(&mut b, &DragEvent::new((5.0, 5.0), (-3.0, 40.0)), &params.forcing));
        fluid_step(&mut a, &params).unwrap();
        fluid_step(&mut b, &params).unwrap();
        assert_eq!(a.snapshot().vx, b.snapshot().vx);
        assert_eq!(a.snapshot().pressure, b.snapshot().pressure);
    }

    #[test]
    fn test_missing_input_leaves_fields_untouched() {
        let grid = Grid::new(16, 16).unwrap();
        let mut state = noisy_state(grid, 0.4);
        let before = state.snapshot();
        state.advected.vx.truncate(10);
        let params = SolverParams::for_grid(grid);
        match fluid_step(&mut state, &params) {
            Err(SimError::MissingInput { field, expected, found }) => {
                assert_eq!(field, "advected.x");
                assert_eq!(expected, 256);
                assert_eq!(found, 10);
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
        let after = state.snapshot();
        assert_eq!(after.vx, before.vx);
        assert_eq!(after.pressure, before.pressure);
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn test_tolerance_stops_early() {
        let grid = Grid::new(16, 16).unwrap();
        let mut state = SimState::new(grid);
        let params = SolverParams { tolerance: Some(1e-6), ..SolverParams::for_grid(grid) };
        let stats = fluid_step(&mut state, &params).unwrap();
        assert_eq!(stats.iterations, 1);
        assert_eq!(stats.max_update, Some(0.0));

        let fixed = SolverParams { relax_iterations: 7, ..SolverParams::for_grid(grid) };
        let stats = fluid_step(&mut state, &fixed).unwrap();
        assert_eq!(stats.iterations, 7);
        assert_eq!(stats.max_update, None);
    }

    #[test]
    fn test_pressure_warm_starts() {
        // Pressure persists across frames; a single interior impulse spreads out.
        let grid = Grid::new(32, 32).unwrap();
        let mut state = SimState::new(grid);
        state.pressure.front_mut().values[grid.idx(16, 16)] = 0.8;
        let params = SolverParams { relax_iterations: 1, ..SolverParams::for_grid(grid) };
        fluid_step(&mut state, &params).unwrap();
        let p = &state.pressure.front().values;
        assert!((p[grid.idx(17, 16)] - 0.8 * params.relax_coefficient).abs() < 1e-12);
        assert_eq!(p[grid.idx(16, 16)], 0.0);
    }
}
