//! Error types for metamodel construction and loading
//!
//! Only construction and I/O failures are errors. Validation, compatibility
//! and change-validation findings are reported through
//! [`ValidationReport`](crate::validator::ValidationReport) instead.

use thiserror::Error;

/// Result type for metamodel operations
pub type Result<T> = std::result::Result<T, MetamodelError>;

/// Metamodel errors
#[derive(Error, Debug)]
pub enum MetamodelError {
    #[error("{kind} name cannot be empty")]
    EmptyName { kind: &'static str },

    #[error("{kind} name too long (max {max} characters): {name}")]
    NameTooLong {
        kind: &'static str,
        name: String,
        max: usize,
    },

    #[error("{kind} description cannot be empty")]
    EmptyDescription { kind: &'static str },

    #[error("Group '{group}' must contain at least one attribute")]
    EmptyGroup { group: String },

    #[error("Metamodel '{name}' must contain at least one group")]
    NoGroups { name: String },

    #[error("Version must follow semantic versioning (e.g., 1.0.0), got '{0}'")]
    InvalidVersion(String),

    #[error("Unknown attribute type: {0}")]
    UnknownAttributeType(String),

    #[error("Change target path cannot be empty")]
    EmptyTargetPath,

    #[error("Change description cannot be empty")]
    EmptyChangeDescription,

    #[error("Metamodel not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
