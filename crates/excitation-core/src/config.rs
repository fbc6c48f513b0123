//! Configuration loading and typed config structures for the Excitation simulator.
//!
//! The optional configuration file is `excitation-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure and a loader
//! that reads and validates the file. Every field has a default, so an empty
//! file (or no file at all) yields the reference medium:
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `medium.dt` | 0.2 | Diffusion time step |
//! | `medium.diffusion_coeff` | 0.5 | Diffusion coefficient |
//! | `medium.threshold` | 0.2 | Activation threshold `V_t` |
//! | `medium.peak` | 1.0 | Peak potential `V_p` |
//! | `medium.rest` | 0.001 | Rest floor `V_r` |

use std::path::Path;

use serde::Deserialize;

use crate::voltage::Kinetics;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is outside the range the simulation can run with.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `excitation-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Properties of the medium (time step, diffusion, thresholds).
    #[serde(default)]
    pub medium: MediumConfig,

    /// Parameters of one run (duration and phase rates).
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check that every value is usable by the simulation.
    ///
    /// The sign of `a_incr` is not checked here; a non-positive rising rate
    /// is reported with the offending cell the first time a cell fires.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.medium.validate()?;
        self.run.validate()
    }
}

/// Properties of the excitable medium.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MediumConfig {
    /// Diffusion time step.
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Diffusion coefficient applied to the discrete Laplacian.
    #[serde(default = "default_diffusion_coeff")]
    pub diffusion_coeff: f64,

    /// Activation threshold `V_t`: a resting cell whose potential exceeds
    /// it starts increasing.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Peak potential `V_p`: an increasing cell reaching it starts decreasing.
    #[serde(default = "default_peak")]
    pub peak: f64,

    /// Rest floor `V_r`: a decreasing cell reaching it rests again.
    #[serde(default = "default_rest")]
    pub rest: f64,
}

impl MediumConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_finite("medium.dt", self.dt)?;
        require_finite("medium.diffusion_coeff", self.diffusion_coeff)?;
        require_finite("medium.threshold", self.threshold)?;
        require_finite("medium.peak", self.peak)?;
        require_finite("medium.rest", self.rest)?;
        require_positive("medium.dt", self.dt)?;
        require_positive("medium.peak", self.peak)?;
        require_positive("medium.rest", self.rest)
    }
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            diffusion_coeff: default_diffusion_coeff(),
            threshold: default_threshold(),
            peak: default_peak(),
            rest: default_rest(),
        }
    }
}

/// Parameters of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Total simulated time. The run executes `ceil(final_time / dt)` steps.
    #[serde(default = "default_final_time")]
    pub final_time: f64,

    /// Exponential rate of the increasing phase.
    #[serde(default = "default_a_incr")]
    pub a_incr: f64,

    /// Exponential rate of the decreasing phase (negative for decay).
    #[serde(default = "default_a_decr")]
    pub a_decr: f64,
}

impl RunConfig {
    /// The phase rates as a [`Kinetics`] pair.
    pub const fn kinetics(&self) -> Kinetics {
        Kinetics {
            a_incr: self.a_incr,
            a_decr: self.a_decr,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require_finite("run.final_time", self.final_time)?;
        require_finite("run.a_incr", self.a_incr)?;
        require_finite("run.a_decr", self.a_decr)?;
        require_positive("run.final_time", self.final_time)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            final_time: default_final_time(),
            a_incr: default_a_incr(),
            a_decr: default_a_decr(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes
    /// precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn require_finite(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{key} must be finite, got {value}"),
        })
    }
}

fn require_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{key} must be positive, got {value}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_dt() -> f64 {
    0.2
}

const fn default_diffusion_coeff() -> f64 {
    0.5
}

const fn default_threshold() -> f64 {
    0.2
}

const fn default_peak() -> f64 {
    1.0
}

const fn default_rest() -> f64 {
    0.001
}

const fn default_final_time() -> f64 {
    5.0
}

const fn default_a_incr() -> f64 {
    1.0
}

const fn default_a_decr() -> f64 {
    -1.0
}

fn default_log_level() -> String {
    "info".to_owned()
}
