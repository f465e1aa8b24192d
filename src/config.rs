//! Configuration management for the bundle validator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (bundle-validator.toml)
//! - Environment variables (BUNDLE_VALIDATOR_*)
//!
//! ## Example config file (bundle-validator.toml):
//! ```toml
//! [resources]
//! root = "./resources"
//! required_fields = ["apiVersion", "metadata", "kind"]
//! data_required_kinds = ["ConfigMap", "Secret"]
//!
//! [fetch]
//! enabled = true
//! timeout_secs = 30
//!
//! [output]
//! format = "pretty"
//! only_errors = false
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::fetch::{HttpSchemaFetcher, OfflineSchemaFetcher, SchemaFetcher};
use crate::validate::ResourceRules;

/// Main configuration for the validator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Resource file settings
    #[serde(default)]
    pub resources: ResourceRules,

    /// Meta-schema fetching
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Report output
    #[serde(default)]
    pub output: OutputConfig,
}

/// Meta-schema fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Allow fetching meta-schemas missing from the bundle
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Report output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Print only error outcomes
    #[serde(default)]
    pub only_errors: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FetchConfig {
    /// Build the fetcher this configuration describes
    pub fn fetcher(&self) -> Result<Arc<dyn SchemaFetcher>> {
        if self.enabled {
            Ok(Arc::new(HttpSchemaFetcher::new(Duration::from_secs(self.timeout_secs))?))
        } else {
            Ok(Arc::new(OfflineSchemaFetcher))
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "bundle-validator.toml",
            ".bundle-validator.toml",
            "config/bundle-validator.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) =
            directories::ProjectDirs::from("dev", "bundle-validator", "bundle-validator")
        {
            let xdg_config = config_dir.config_dir().join("bundle-validator.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // BUNDLE_VALIDATOR_RESOURCES__ROOT, BUNDLE_VALIDATOR_FETCH__ENABLED, ...
        builder = builder.add_source(
            Environment::with_prefix("BUNDLE_VALIDATOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
