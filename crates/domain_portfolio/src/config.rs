//! Solver configuration
//!
//! Tolerances and the iteration budget are read once per process. The
//! environment variables use the `XIRR_` prefix:
//!
//! * `XIRR_MAX_ITERATIONS` - iteration budget per solver phase (default: 100)
//! * `XIRR_NPV_TOLERANCE` - accept a rate once |NPV| drops below this (default: 1e-6)
//! * `XIRR_RATE_TOLERANCE` - accept a rate once the step drops below this (default: 1e-8)
//! * `XIRR_INITIAL_GUESS` - Newton starting point (default: 0.1)

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::warn;

use core_kernel::CoreError;

static GLOBAL: Lazy<SolverConfig> = Lazy::new(SolverConfig::load);

/// Numerical settings for the XIRR solver
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Iteration budget for each solver phase
    pub max_iterations: u32,
    /// Absolute NPV below which a rate is accepted
    pub npv_tolerance: f64,
    /// Rate step below which a rate is accepted
    pub rate_tolerance: f64,
    /// Newton starting point
    pub initial_guess: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            npv_tolerance: 1e-6,
            rate_tolerance: 1e-8,
            initial_guess: 0.1,
        }
    }
}

impl SolverConfig {
    /// Loads configuration from `XIRR_*` environment variables, falling back
    /// to defaults for anything unset
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        config::Config::builder()
            .set_default("max_iterations", i64::from(defaults.max_iterations))?
            .set_default("npv_tolerance", defaults.npv_tolerance)?
            .set_default("rate_tolerance", defaults.rate_tolerance)?
            .set_default("initial_guess", defaults.initial_guess)?
            .add_source(config::Environment::with_prefix("XIRR").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Reads `.env` and the environment, validating the result.
    ///
    /// Invalid settings are logged and replaced by defaults; a bad environment
    /// must not take the returns calculation down with it.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let loaded = Self::from_env()
            .map_err(|e| CoreError::configuration(e.to_string()))
            .and_then(|config| config.validate().map(|_| config));

        match loaded {
            Ok(config) => config,
            Err(error) => {
                warn!(%error, "invalid solver configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Process-wide configuration, loaded on first use
    pub fn global() -> &'static SolverConfig {
        &GLOBAL
    }

    /// Checks that tolerances are positive and the budget is non-zero
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_iterations == 0 {
            return Err(CoreError::configuration("max_iterations must be positive"));
        }
        if !(self.npv_tolerance > 0.0 && self.npv_tolerance.is_finite()) {
            return Err(CoreError::configuration("npv_tolerance must be a positive number"));
        }
        if !(self.rate_tolerance > 0.0 && self.rate_tolerance.is_finite()) {
            return Err(CoreError::configuration("rate_tolerance must be a positive number"));
        }
        if !(self.initial_guess > -1.0 && self.initial_guess.is_finite()) {
            return Err(CoreError::configuration("initial_guess must be greater than -1"));
        }
        Ok(())
    }

    /// Sets the iteration budget
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the Newton starting point
    pub fn with_initial_guess(mut self, initial_guess: f64) -> Self {
        self.initial_guess = initial_guess;
        self
    }
}
