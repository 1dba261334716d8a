use super::sampler::Addressing;
use crate::error::ConfigError;
use crate::state::Grid;

/// Reference Jacobi iteration count per frame.
pub const DEFAULT_RELAX_ITERATIONS: usize = 4;
/// Reference relaxation coefficient, a touch above 1/4.
pub const DEFAULT_RELAX_COEFFICIENT: f64 = 0.25175;

/// Pointer-drag stamp parameters. Lengths are in cells.
#[derive(Clone, Debug, PartialEq)]
pub struct ForcingParams {
    pub velocity_radius: f64,
    pub velocity_blur: f64,
    pub pressure_radius: f64,
    pub pressure_blur: f64,
    /// Drag deltas are clamped to `[-delta_clamp, delta_clamp]` and normalised by it.
    pub delta_clamp: f64,
    pub pressure_impulse: f64,
}

impl Default for ForcingParams {
    /// Values tuned for the 640-cell reference grid.
    fn default() -> Self {
        Self {
            velocity_radius: 15.0,
            velocity_blur: 5.0,
            pressure_radius: 20.0,
            pressure_blur: 10.0,
            delta_clamp: 10.0,
            pressure_impulse: 1.0,
        }
    }
}

impl ForcingParams {
    /// Rescale radii and blur from the reference extent to `grid`.
    /// The delta clamp is rescaled too so a drag across the same fraction of the
    /// domain produces the same stamp.
    pub fn scaled_to(&self, grid: Grid) -> Self {
        let s = grid.reference_scale();
        Self {
            velocity_radius: self.velocity_radius * s,
            velocity_blur: self.velocity_blur * s,
            pressure_radius: self.pressure_radius * s,
            pressure_blur: self.pressure_blur * s,
            delta_clamp: self.delta_clamp * s,
            pressure_impulse: self.pressure_impulse,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("forcing.velocity_radius", self.velocity_radius)?;
        non_negative("forcing.velocity_blur", self.velocity_blur)?;
        positive("forcing.pressure_radius", self.pressure_radius)?;
        non_negative("forcing.pressure_blur", self.pressure_blur)?;
        positive("forcing.delta_clamp", self.delta_clamp)?;
        finite("forcing.pressure_impulse", self.pressure_impulse)?;
        Ok(())
    }
}

/// Solver parameters for the fluid simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParams {
    /// Jacobi sweeps per frame (K).
    pub relax_iterations: usize,
    /// Jacobi weight (omega).
    pub relax_coefficient: f64,
    /// Velocity components and pressure are kept within `[-field_limit, field_limit]`.
    pub field_limit: f64,
    /// Stop relaxing early once the largest pressure update drops below this.
    /// `None` always runs exactly `relax_iterations` sweeps.
    pub tolerance: Option<f64>,
    pub addressing: Addressing,
    pub forcing: ForcingParams,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            relax_iterations: DEFAULT_RELAX_ITERATIONS,
            relax_coefficient: DEFAULT_RELAX_COEFFICIENT,
            field_limit: 1.0,
            tolerance: None,
            addressing: Addressing::Clamp,
            forcing: ForcingParams::default(),
        }
    }
}

impl SolverParams {
    /// Defaults with forcing radii scaled to `grid`.
    pub fn for_grid(grid: Grid) -> Self {
        let mut params = Self::default();
        params.forcing = params.forcing.scaled_to(grid);
        params
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relax_iterations == 0 {
            return Err(ConfigError::param("solver.relax_iterations", "at least 1", 0.0));
        }
        positive("solver.relax_coefficient", self.relax_coefficient)?;
        positive("solver.field_limit", self.field_limit)?;
        if let Some(tol) = self.tolerance {
            positive("solver.tolerance", tol)?;
        }
        self.forcing.validate()
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::param(name, "finite", value))
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::param(name, "finite and > 0", value))
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::param(name, "finite and >= 0", value))
    }
}
