//! Configuration types for the probe engine
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Upper bound for `RunConfig::concurrency`
pub const MAX_CONCURRENCY: usize = 64;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V6ProbeConfig {
    /// Registry store configuration
    pub registry: RegistryConfig,

    /// Path to the override policy file, if any
    #[serde(default)]
    pub overrides_path: Option<String>,

    /// Probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Per-invocation settings
    #[serde(default)]
    pub run: RunConfig,
}

impl V6ProbeConfig {
    /// Create a configuration for the registry at `path` with defaults
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            registry: RegistryConfig::File { path: path.into() },
            overrides_path: None,
            probe: ProbeConfig::default(),
            run: RunConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.registry.validate()?;
        self.probe.validate()?;
        self.run.validate()?;

        if let Some(path) = &self.overrides_path
            && path.is_empty()
        {
            return Err(crate::Error::config("Override policy path cannot be empty"));
        }

        Ok(())
    }
}

/// Registry store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryConfig {
    /// JSON file on disk
    File {
        /// Path to the registry file
        path: String,
    },
}

impl RegistryConfig {
    /// Validate the registry configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            RegistryConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("Registry path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

/// Probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Deadline for each HTTP request (in seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// How many resolved addresses to keep for diagnostics
    #[serde(default = "default_address_sample_size")]
    pub address_sample_size: usize,

    /// User-Agent header sent with HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ProbeConfig {
    /// Validate the probe settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(1..=60).contains(&self.http_timeout_secs) {
            return Err(crate::Error::config(format!(
                "HTTP timeout must be between 1 and 60 seconds. Got: {}",
                self.http_timeout_secs
            )));
        }
        if self.address_sample_size == 0 {
            return Err(crate::Error::config("Address sample size must be > 0"));
        }
        Ok(())
    }

    /// HTTP deadline as a `Duration`
    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout_secs(),
            address_sample_size: default_address_sample_size(),
            user_agent: default_user_agent(),
        }
    }
}

/// Per-invocation settings, threaded through the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Print per-endpoint probe detail
    #[serde(default)]
    pub verbose: bool,

    /// Full per-variant breakdown plus status mismatch checks
    #[serde(default)]
    pub detail: bool,

    /// Run the full pass but never write the registry
    #[serde(default)]
    pub dry_run: bool,

    /// How many endpoints may be probed at the same time
    ///
    /// Reconciliation always happens one endpoint at a time, in registry
    /// order, regardless of this value.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl RunConfig {
    /// Validate the run settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(crate::Error::config(format!(
                "Concurrency must be between 1 and {}. Got: {}",
                MAX_CONCURRENCY, self.concurrency
            )));
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            detail: false,
            dry_run: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_http_timeout_secs() -> u64 {
    5
}

fn default_address_sample_size() -> usize {
    2
}

fn default_user_agent() -> String {
    concat!("v6probe/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_concurrency() -> usize {
    1
}
