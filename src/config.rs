use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::renderer::ColorMap;
use crate::solver::{Addressing, ForcingParams, SolverParams, DEFAULT_RELAX_COEFFICIENT, DEFAULT_RELAX_ITERATIONS};
use crate::state::{Grid, DEFAULT_EXTENT};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_PATH: &str = "pressureflow.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub solver: SolverConfig,
    pub forcing: ForcingConfig,
    pub display: DisplayConfig,
    /// `error`, `warn`, `info`, `debug` or `trace`. Falls back to `RUST_LOG`.
    pub log_level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub addressing: Addressing,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub relax_iterations: usize,
    pub relax_coefficient: f64,
    pub field_limit: f64,
    pub tolerance: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ForcingConfig {
    pub velocity_radius: f64,
    pub velocity_blur: f64,
    pub pressure_radius: f64,
    pub pressure_blur: f64,
    pub delta_clamp: f64,
    pub pressure_impulse: f64,
    /// Treat the lengths above as reference-grid values and rescale them.
    pub scale_to_grid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub target_fps: usize,
    pub colormap: ColorMap,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_EXTENT,
            height: DEFAULT_EXTENT,
            addressing: Addressing::Clamp,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            relax_iterations: DEFAULT_RELAX_ITERATIONS,
            relax_coefficient: DEFAULT_RELAX_COEFFICIENT,
            field_limit: 1.0,
            tolerance: None,
        }
    }
}

impl Default for ForcingConfig {
    fn default() -> Self {
        let f = ForcingParams::default();
        Self {
            velocity_radius: f.velocity_radius,
            velocity_blur: f.velocity_blur,
            pressure_radius: f.pressure_radius,
            pressure_blur: f.pressure_blur,
            delta_clamp: f.delta_clamp,
            pressure_impulse: f.pressure_impulse,
            scale_to_grid: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
            target_fps: 60,
            colormap: ColorMap::Grayscale,
        }
    }
}

impl Config {
    pub fn grid(&self) -> Result<Grid, ConfigError> {
        Grid::new(self.grid.width, self.grid.height)
    }

    /// Build validated solver parameters for the configured grid.
    pub fn solver_params(&self) -> Result<SolverParams, ConfigError> {
        let grid = self.grid()?;
        let f = &self.forcing;
        let mut forcing = ForcingParams {
            velocity_radius: f.velocity_radius,
            velocity_blur: f.velocity_blur,
            pressure_radius: f.pressure_radius,
            pressure_blur: f.pressure_blur,
            delta_clamp: f.delta_clamp,
            pressure_impulse: f.pressure_impulse,
        };
        if f.scale_to_grid {
            forcing = forcing.scaled_to(grid);
        }
        let params = SolverParams {
            relax_iterations: self.solver.relax_iterations,
            relax_coefficient: self.solver.relax_coefficient,
            field_limit: self.solver.field_limit,
            tolerance: self.solver.tolerance,
            addressing: self.grid.addressing,
            forcing,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate_display(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::param("display.width/height", "at least 1", 0.0));
        }
        if self.display.target_fps == 0 {
            return Err(ConfigError::param("display.target_fps", "at least 1", 0.0));
        }
        Ok(())
    }

    /// Check everything the frame loop will rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver_params()?;
        self.validate_display()
    }
}

/// Parse and validate YAML text. `source` labels errors.
pub fn from_yaml(contents: &str, source: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: source.to_string(),
        source: e,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load the configuration.
///
/// With an explicit `path` the file must exist. Without one, `pressureflow.yaml`
/// is used if present and defaults otherwise.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_PATH), false),
    };
    if !required && !path.exists() {
        log::debug!("no {} found, using defaults", path.display());
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    let cfg = from_yaml(&contents, &path.display().to_string())?;
    log::info!("loaded config from {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.grid.width, 640);
        assert_eq!(cfg.grid.height, 640);
        assert_eq!(cfg.grid.addressing, Addressing::Clamp);
        assert_eq!(cfg.solver.relax_iterations, 4);
        assert_eq!(cfg.solver.relax_coefficient, 0.25175);
        assert_eq!(cfg.solver.field_limit, 1.0);
        assert_eq!(cfg.solver.tolerance, None);
        assert_eq!(cfg.forcing.velocity_radius, 15.0);
        assert_eq!(cfg.forcing.pressure_radius, 20.0);
        assert!(cfg.forcing.scale_to_grid);
        assert_eq!(cfg.display.target_fps, 60);
        assert_eq!(cfg.display.colormap, ColorMap::Grayscale);
        assert_eq!(cfg.log_level, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "solver:\n  relax_iterations: 8\ngrid:\n  width: 320\n";
        let cfg = from_yaml(yaml, "test").unwrap();
        assert_eq!(cfg.solver.relax_iterations, 8);
        assert_eq!(cfg.solver.relax_coefficient, 0.25175); // default
        assert_eq!(cfg.grid.width, 320);
        assert_eq!(cfg.grid.height, 640); // default
        assert_eq!(cfg.display.width, 640); // default
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
grid:
  width: 128
  height: 96
  addressing: wrap
solver:
  relax_iterations: 12
  relax_coefficient: 0.25
  field_limit: 2.0
  tolerance: 0.0001
forcing:
  velocity_radius: 4.0
  velocity_blur: 1.0
  pressure_radius: 6.0
  pressure_blur: 2.0
  delta_clamp: 3.0
  pressure_impulse: 0.5
  scale_to_grid: false
display:
  width: 512
  height: 384
  target_fps: 30
  colormap: ocean_lava
log_level: debug
"#;
        let cfg = from_yaml(yaml, "test").unwrap();
        assert_eq!(cfg.grid.addressing, Addressing::Wrap);
        assert_eq!(cfg.solver.tolerance, Some(0.0001));
        assert_eq!(cfg.display.colormap, ColorMap::OceanLava);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));

        let params = cfg.solver_params().unwrap();
        assert_eq!(params.relax_iterations, 12);
        assert_eq!(params.field_limit, 2.0);
        assert_eq!(params.addressing, Addressing::Wrap);
        // Not rescaled.
        assert_eq!(params.forcing.velocity_radius, 4.0);
        assert_eq!(params.forcing.delta_clamp, 3.0);
        assert_eq!(params.forcing.pressure_impulse, 0.5);
    }

    #[test]
    fn test_forcing_scaled_to_grid() {
        let cfg = from_yaml("grid:\n  width: 320\n  height: 320\n", "test").unwrap();
        let params = cfg.solver_params().unwrap();
        assert!((params.forcing.velocity_radius - 7.5).abs() < 1e-12);
        assert!((params.forcing.pressure_blur - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = from_yaml("solver:\n  relax_iterations: 0\n", "test").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParam { name: "solver.relax_iterations", .. }));
    }

    #[test]
    fn test_zero_extent_rejected() {
        let err = from_yaml("grid:\n  width: 0\n", "test").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGrid { width: 0, height: 640 }));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let err = from_yaml("forcing:\n  pressure_radius: -2.0\n", "test").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParam { name: "forcing.pressure_radius", .. }));
    }

    #[test]
    fn test_unknown_addressing_is_parse_error() {
        let err = from_yaml("grid:\n  addressing: mirror\n", "bad.yaml").unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, "bad.yaml"),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_default_file() {
        // When no pressureflow.yaml exists, load(None) returns defaults
        let cfg = load(None).unwrap();
        assert_eq!(cfg.solver.relax_iterations, 4);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = load(Some(Path::new("does/not/exist.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
