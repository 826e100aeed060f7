//! Container configuration.
//!
//! Defaults suit almost every use; the environment and (with the `config`
//! feature) JSON loaders exist for deployments that want to tune resolution
//! depth or force eager singleton creation without recompiling.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{IocError, IocResult};

/// Default maximum nesting of resolutions within one top-level `resolve`.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Environment variable overriding [`ContainerConfig::max_depth`].
pub const ENV_MAX_DEPTH: &str = "FERROUS_IOC_MAX_DEPTH";
/// Environment variable overriding [`ContainerConfig::eager_singletons`].
pub const ENV_EAGER_SINGLETONS: &str = "FERROUS_IOC_EAGER_SINGLETONS";

/// Tunables for a [`Container`](crate::Container).
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Container, ContainerConfig};
///
/// let config = ContainerConfig::default().with_max_depth(64).with_eager_singletons(true);
/// let container = Container::with_config(config);
/// assert_eq!(container.config().max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerConfig {
    /// Maximum nesting of resolutions before failing with `DepthExceeded`.
    pub max_depth: usize,
    /// Instantiate every singleton at start, not only those marked eager.
    pub eager_singletons: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            eager_singletons: false,
        }
    }
}

impl ContainerConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_eager_singletons(mut self, eager: bool) -> Self {
        self.eager_singletons = eager;
        self
    }

    /// Defaults overridden by `FERROUS_IOC_*` environment variables.
    ///
    /// Unset variables keep their default; malformed ones fail with
    /// [`IocError::Config`].
    pub fn from_env() -> IocResult<Self> {
        let mut config = Self::default();

        if let Ok(raw) = env::var(ENV_MAX_DEPTH) {
            config.max_depth = raw
                .trim()
                .parse()
                .map_err(|_| IocError::Config(format!("{} must be a positive integer, got `{}`", ENV_MAX_DEPTH, raw)))?;
        }

        if let Ok(raw) = env::var(ENV_EAGER_SINGLETONS) {
            config.eager_singletons = parse_bool(&raw)
                .ok_or_else(|| IocError::Config(format!("{} must be a boolean, got `{}`", ENV_EAGER_SINGLETONS, raw)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults.
    ///
    /// ```
    /// # #[cfg(feature = "config")]
    /// # {
    /// use ferrous_ioc::ContainerConfig;
    ///
    /// let config = ContainerConfig::from_json(r#"{ "eager_singletons": true }"#).unwrap();
    /// assert!(config.eager_singletons);
    /// assert_eq!(config.max_depth, 1024);
    /// # }
    /// ```
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> IocResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| IocError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> IocResult<()> {
        if self.max_depth == 0 {
            return Err(IocError::Config("max_depth must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
