use thiserror::Error;

/// Invalid or unreadable configuration. Raised before the frame loop starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid grid extent {width}x{height}: both sides must be at least 1")]
    InvalidGrid { width: usize, height: usize },

    #[error("{name} must be {requirement}, got {value}")]
    InvalidParam {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    pub(crate) fn param(name: &'static str, requirement: &'static str, value: f64) -> Self {
        ConfigError::InvalidParam { name, requirement, value }
    }
}

/// Runtime simulation errors. A failing frame leaves every persisted field untouched.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("missing input field `{field}`: expected {expected} cells, found {found}")]
    MissingInput {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Top-level failure of the application, reported by `main`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Usage(String),

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    #[error("failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let e = ConfigError::InvalidGrid { width: 0, height: 10 };
        assert!(e.to_string().contains("0x10"));

        let e = ConfigError::param("relax_iterations", "at least 1", 0.0);
        assert_eq!(e.to_string(), "relax_iterations must be at least 1, got 0");

        let e = SimError::MissingInput { field: "pressure", expected: 4, found: 0 };
        assert!(e.to_string().contains("pressure"));
    }

    #[test]
    fn test_config_error_converts() {
        let e: AppError = ConfigError::InvalidGrid { width: 0, height: 3 }.into();
        assert!(e.to_string().starts_with("invalid grid extent 0x3"));
    }
}
