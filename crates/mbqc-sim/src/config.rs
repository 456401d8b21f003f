//! Simulator configuration.
//!
//! Values come from, highest precedence first:
//! 1. Environment variables (`MBQC_BACKEND`, `MBQC_SEED`, `MBQC_TOLERANCE`)
//! 2. A YAML document
//! 3. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::error::{SimError, SimResult};

/// Environment variable selecting the backend.
pub const ENV_BACKEND: &str = "MBQC_BACKEND";
/// Environment variable holding the RNG seed.
pub const ENV_SEED: &str = "MBQC_SEED";
/// Environment variable holding the probability tolerance.
pub const ENV_TOLERANCE: &str = "MBQC_TOLERANCE";

fn default_tolerance() -> f64 {
    1e-12
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Numeric backend.
    #[serde(default)]
    pub backend: BackendKind,

    /// Seed of the outcome sampler; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Branch probabilities at or below this value are never sampled.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            seed: None,
            tolerance: default_tolerance(),
        }
    }
}

impl SimulatorConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> SimResult<Self> {
        let config: Self =
            serde_yaml_ng::from_str(yaml).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SimError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> SimResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Load the file if given, then apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> SimResult<Self> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Override fields from the process environment.
    ///
    /// Only variables that are set take effect; malformed values are
    /// rejected rather than ignored.
    pub fn with_env_overrides(self) -> SimResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(ENV_BACKEND) {
            self.backend = backend.parse()?;
        }
        if let Some(seed) = lookup(ENV_SEED) {
            self.seed = Some(
                seed.trim()
                    .parse()
                    .map_err(|e| SimError::Config(format!("{ENV_SEED}={seed}: {e}")))?,
            );
        }
        if let Some(tolerance) = lookup(ENV_TOLERANCE) {
            self.tolerance = tolerance
                .trim()
                .parse()
                .map_err(|e| SimError::Config(format!("{ENV_TOLERANCE}={tolerance}: {e}")))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> SimResult<()> {
        if !(0.0..0.5).contains(&self.tolerance) {
            return Err(SimError::Config(format!(
                "tolerance must lie in [0, 0.5), got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Set the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
