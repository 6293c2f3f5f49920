//! Metamodel versioning utilities
//!
//! Metamodel documents carry a `MAJOR.MINOR` or `MAJOR.MINOR.PATCH` version
//! string. The string is kept verbatim for round-tripping and a normalized
//! [`semver::Version`] is kept alongside it for ordering.

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{MetamodelError, Result};

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").expect("valid version regex"))
}

/// A validated metamodel version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetamodelVersion {
    /// Version exactly as written in the document (e.g., "1.2")
    raw: String,
    /// Normalized semantic version (e.g., 1.2.0)
    version: Version,
}

impl MetamodelVersion {
    /// Parse a version string, rejecting anything but `N.N` or `N.N.N`
    pub fn parse(version_str: &str) -> Result<Self> {
        if !version_pattern().is_match(version_str) {
            return Err(MetamodelError::InvalidVersion(version_str.to_string()));
        }

        let normalized = if version_str.matches('.').count() == 1 {
            format!("{}.0", version_str)
        } else {
            version_str.to_string()
        };
        let version = Version::parse(&normalized)?;

        Ok(Self {
            raw: version_str.to_string(),
            version,
        })
    }

    /// The version string as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The normalized semantic version
    pub fn semver(&self) -> &Version {
        &self.version
    }

    /// Check if this is a major version bump from another version
    pub fn is_major_bump_from(&self, other: &MetamodelVersion) -> bool {
        self.version.major > other.version.major
    }

    /// Check if this is a minor version bump from another version
    pub fn is_minor_bump_from(&self, other: &MetamodelVersion) -> bool {
        self.version.major == other.version.major && self.version.minor > other.version.minor
    }

    /// Check if this is a patch version bump from another version
    pub fn is_patch_bump_from(&self, other: &MetamodelVersion) -> bool {
        self.version.major == other.version.major
            && self.version.minor == other.version.minor
            && self.version.patch > other.version.patch
    }
}

impl FromStr for MetamodelVersion {
    type Err = MetamodelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MetamodelVersion {
    type Error = MetamodelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MetamodelVersion> for String {
    fn from(value: MetamodelVersion) -> Self {
        value.raw
    }
}

impl fmt::Display for MetamodelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// Two versions are equal when their text is equal; "1.0" and "1.0.0" differ
// as documents even though they order the same.
impl PartialEq for MetamodelVersion {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for MetamodelVersion {}

impl PartialOrd for MetamodelVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetamodelVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v = MetamodelVersion::parse("1.2.3").unwrap();
        assert_eq!(v.as_str(), "1.2.3");
        assert_eq!(v.semver(), &Version::new(1, 2, 3));
    }

    #[test]
    fn test_two_part_version_is_normalized() {
        let v = MetamodelVersion::parse("2.1").unwrap();
        assert_eq!(v.to_string(), "2.1");
        assert_eq!(v.semver(), &Version::new(2, 1, 0));
    }

    #[test]
    fn test_invalid_versions_rejected() {
        for bad in ["", "1", "v1.0.0", "1.0.0-beta", "1.0.0.0", "a.b", "1..0"] {
            assert!(
                matches!(MetamodelVersion::parse(bad), Err(MetamodelError::InvalidVersion(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_version_bumps() {
        let base = MetamodelVersion::parse("1.2.3").unwrap();

        assert!(MetamodelVersion::parse("2.0").unwrap().is_major_bump_from(&base));
        assert!(MetamodelVersion::parse("1.3.0").unwrap().is_minor_bump_from(&base));
        assert!(MetamodelVersion::parse("1.2.4").unwrap().is_patch_bump_from(&base));
        assert!(!MetamodelVersion::parse("1.2").unwrap().is_patch_bump_from(&base));
    }

    #[test]
    fn test_serde_roundtrip_keeps_text() {
        let v: MetamodelVersion = serde_json::from_str("\"1.0\"").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"1.0\"");
        assert!(serde_json::from_str::<MetamodelVersion>("\"one\"").is_err());
    }
}
