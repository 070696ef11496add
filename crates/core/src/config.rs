// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! source = "billing"
//! environment = "production"
//! validation = true
//! catalog = "events.toml"
//! subscriber_capacity = 1024
//! handler_timeout = "5s"
//! anonymous_routes = ["/health", "/login", "/public/*"]
//! ```

use crate::context::AnonymousRoutes;
use crate::events::BusSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SOURCE: &str = "herald";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_ANONYMOUS_ROUTES: [&str; 3] = ["/health", "/login", "/public/*"];

pub const SOURCE_ENV: &str = "HERALD_SOURCE";
pub const ENVIRONMENT_ENV: &str = "HERALD_ENVIRONMENT";
pub const CATALOG_ENV: &str = "HERALD_CATALOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("subscriber_capacity must be at least 1")]
    ZeroCapacity,

    #[error("handler_timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Emitter name stamped on events
    pub source: String,
    pub environment: String,
    /// Whether the factory validates what it creates
    pub validation: bool,
    /// Template catalog file; builtins only when absent
    pub catalog: Option<PathBuf>,
    pub subscriber_capacity: usize,
    #[serde(with = "humantime_serde")]
    pub handler_timeout: Duration,
    pub anonymous_routes: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let bus = BusSettings::default();
        Self {
            source: DEFAULT_SOURCE.to_string(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
            validation: true,
            catalog: None,
            subscriber_capacity: bus.capacity,
            handler_timeout: bus.handler_timeout,
            anonymous_routes: DEFAULT_ANONYMOUS_ROUTES.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Load a config file. A relative `catalog` path is resolved against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content)?;

        if let (Some(catalog), Some(dir)) = (&config.catalog, path.parent()) {
            if catalog.is_relative() {
                config.catalog = Some(dir.join(catalog));
            }
        }
        Ok(config)
    }

    /// Override fields from `HERALD_*` environment variables
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup. Empty values are ignored.
    pub fn apply_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(source) = get(SOURCE_ENV) {
            self.source = source;
        }
        if let Some(environment) = get(ENVIRONMENT_ENV) {
            self.environment = environment;
        }
        if let Some(catalog) = get(CATALOG_ENV) {
            self.catalog = Some(PathBuf::from(catalog));
        }
        self
    }

    pub fn bus_settings(&self) -> BusSettings {
        BusSettings {
            capacity: self.subscriber_capacity,
            handler_timeout: self.handler_timeout,
        }
    }

    pub fn anonymous_routes(&self) -> AnonymousRoutes {
        AnonymousRoutes::new(self.anonymous_routes.iter().cloned())
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.subscriber_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.handler_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
