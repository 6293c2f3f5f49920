//! Metamodel loading
//!
//! Metamodels come from JSON documents on disk or from the definitions
//! compiled into the crate under `data/`. Either way the document goes
//! through the validating constructors, so a loaded value is always
//! well-formed.

use include_dir::{include_dir, Dir};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{MetamodelError, Result};
use crate::metamodel::Metamodel;

static DATA_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/data");

/// File name of the built-in core metamodel
pub const CORE_METAMODEL_FILE: &str = "core_metamodel.json";

/// Load a metamodel from a JSON file
pub fn load_metamodel(path: impl AsRef<Path>) -> Result<Metamodel> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let metamodel = Metamodel::from_json_str(&content)?;

    debug!(
        path = %path.display(),
        name = %metamodel.name,
        version = %metamodel.version,
        "loaded metamodel"
    );
    Ok(metamodel)
}

/// Load a metamodel compiled into the crate, by file name
pub fn embedded_metamodel(file_name: &str) -> Result<Metamodel> {
    let file = DATA_DIR
        .get_file(file_name)
        .ok_or_else(|| MetamodelError::NotFound(file_name.to_string()))?;
    let content = file
        .contents_utf8()
        .ok_or_else(|| MetamodelError::NotFound(format!("{} is not valid UTF-8", file_name)))?;
    Metamodel::from_json_str(content)
}

/// Names of every metamodel compiled into the crate
pub fn embedded_metamodels() -> Vec<&'static str> {
    let mut names: Vec<_> = DATA_DIR
        .files()
        .filter_map(|f| f.path().to_str())
        .filter(|p| p.ends_with(".json"))
        .collect();
    names.sort_unstable();
    names
}

/// The built-in core data product metamodel
pub fn core_metamodel() -> Result<Metamodel> {
    embedded_metamodel(CORE_METAMODEL_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::MetamodelValidator;
    use std::io::Write;

    #[test]
    fn test_core_metamodel_is_valid() {
        let core = core_metamodel().unwrap();
        assert_eq!(core.name, "Core Data Product Metamodel");
        assert_eq!(core.version.as_str(), "1.0.0");
        assert_eq!(core.groups.len(), 5);
        assert!(MetamodelValidator::new().validate_metamodel(&core).is_valid);
    }

    #[test]
    fn test_embedded_listing() {
        assert!(embedded_metamodels().contains(&CORE_METAMODEL_FILE));
        assert!(matches!(
            embedded_metamodel("missing.json"),
            Err(MetamodelError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let core = core_metamodel().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(core.to_json_pretty().unwrap().as_bytes()).unwrap();

        let loaded = load_metamodel(file.path()).unwrap();
        assert_eq!(loaded, core);
    }

    #[test]
    fn test_load_rejects_malformed_documents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"name": "X", "version": "one", "description": "d", "groups": []}"#)
            .unwrap();
        assert!(matches!(load_metamodel(file.path()), Err(MetamodelError::Json(_))));

        assert!(matches!(
            load_metamodel("/nonexistent/metamodel.json"),
            Err(MetamodelError::Io(_))
        ));
    }
}
