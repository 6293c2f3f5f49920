//! Configuration management for metamodel tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (metamodel.toml)
//! - Environment variables (METAMODEL__*)
//!
//! ## Example config file (metamodel.toml):
//! ```toml
//! [baseline]
//! path = "metamodels/core-1.0.json"
//!
//! [codegen]
//! output_dir = "generated"
//! filename = "metamodel"
//!
//! [validation]
//! fail_on_incompatible = true
//! fail_on_high_impact = false
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::loader;
use crate::metamodel::Metamodel;

/// Main configuration for metamodel tooling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetamodelConfig {
    /// Baseline metamodel settings
    #[serde(default)]
    pub baseline: BaselineConfig,

    /// Schema generation settings
    #[serde(default)]
    pub codegen: CodegenConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// The metamodel new versions are compared against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Path to a baseline metamodel JSON file (built-in core metamodel if unset)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Schema generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Directory generated files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Base file name of the generated schema, also used as the package name
    #[serde(default = "default_filename")]
    pub filename: String,
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Fail when the new metamodel breaks backward compatibility
    #[serde(default = "default_true")]
    pub fail_on_incompatible: bool,

    /// Fail when the migration plan contains high impact changes
    #[serde(default)]
    pub fail_on_high_impact: bool,
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_filename() -> String {
    "metamodel".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            filename: default_filename(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fail_on_incompatible: true,
            fail_on_high_impact: false,
        }
    }
}

impl MetamodelConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["metamodel.toml", ".metamodel.toml", "config/metamodel.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "metamodel", "metamodel") {
            let xdg_config = config_dir.config_dir().join("metamodel.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // METAMODEL__VALIDATION__FAIL_ON_HIGH_IMPACT=true
        builder = builder.add_source(
            Environment::with_prefix("METAMODEL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the configured baseline, falling back to the built-in core metamodel
    pub fn baseline_metamodel(&self) -> Result<Metamodel> {
        match &self.baseline.path {
            Some(path) => loader::load_metamodel(path),
            None => loader::core_metamodel(),
        }
    }

    /// Path the generated schema is written to
    pub fn schema_path(&self) -> PathBuf {
        self.codegen
            .output_dir
            .join(format!("{}.proto", self.codegen.filename))
    }
}
