//! Metamodel Core
//!
//! Validation, versioning and migration planning for data product
//! metamodels: named, versioned schemas made of groups of typed attributes.
//!
//! ## Features
//!
//! - **Structural Validation**: duplicate names and misplaced enums are reported, not thrown
//! - **Compatibility Checking**: detects dropped or weakened requirements and type changes
//! - **Change Analysis**: name-keyed diff of two versions into typed change records
//! - **Migration Planning**: every change sorted into a high/medium/low impact tier
//! - **Schema Generation**: proto3 rendering of a metamodel
//!
//! ## Example
//!
//! ```
//! use metamodel_core::{core_metamodel, ChangeAnalyzer, MigrationPlanner};
//!
//! let old = core_metamodel().unwrap();
//! let mut new = old.clone();
//! new.groups[1].attributes[1].required = true;
//!
//! let changes = ChangeAnalyzer::new().detect_changes(&old, &new);
//! let plan = MigrationPlanner::new().generate_migration_plan(&changes);
//! assert_eq!(plan.high_impact.len(), 1);
//! ```

pub mod analyzer;
pub mod change;
pub mod codegen;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod loader;
pub mod metamodel;
pub mod planner;
pub mod validator;
pub mod version;

pub use analyzer::ChangeAnalyzer;
pub use change::{ChangeRecord, ChangeType};
pub use codegen::ProtobufGenerator;
pub use compatibility::CompatibilityChecker;
pub use config::MetamodelConfig;
pub use error::{MetamodelError, Result};
pub use loader::{core_metamodel, load_metamodel};
pub use metamodel::{Attribute, AttributeType, Group, Metamodel, RequiredAttribute};
pub use planner::{ImpactTier, MigrationPlan, MigrationPlanner, PlanEntry};
pub use validator::{MetamodelValidator, ValidationReport};
pub use version::MetamodelVersion;
