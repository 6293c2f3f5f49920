//! Change records
//!
//! A [`ChangeRecord`] describes one structural difference between two
//! metamodel versions. The shape of `old_value` / `new_value` depends on the
//! change type:
//!
//! | change type          | `old_value`                    | `new_value`                    |
//! |----------------------|--------------------------------|--------------------------------|
//! | `add_group`          | none                           | full group object              |
//! | `remove_group`       | full group object              | none                           |
//! | `modify_group`       | `{"description": old}`         | `{"description": new}`         |
//! | `add_attribute`      | none                           | full attribute object          |
//! | `remove_attribute`   | full attribute object          | none                           |
//! | `modify_attribute`   | changed keys only, old values  | changed keys only, new values  |
//! | `change_requirement` | boolean                        | boolean                        |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{MetamodelError, Result};

/// Kind of structural change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    AddGroup,
    RemoveGroup,
    ModifyGroup,
    AddAttribute,
    RemoveAttribute,
    ModifyAttribute,
    ChangeRequirement,
}

impl ChangeType {
    /// Serialized name (e.g., "add_group")
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::AddGroup => "add_group",
            ChangeType::RemoveGroup => "remove_group",
            ChangeType::ModifyGroup => "modify_group",
            ChangeType::AddAttribute => "add_attribute",
            ChangeType::RemoveAttribute => "remove_attribute",
            ChangeType::ModifyAttribute => "modify_attribute",
            ChangeType::ChangeRequirement => "change_requirement",
        }
    }

    /// The change that undoes this one
    pub fn inverse(&self) -> ChangeType {
        match self {
            ChangeType::AddGroup => ChangeType::RemoveGroup,
            ChangeType::RemoveGroup => ChangeType::AddGroup,
            ChangeType::AddAttribute => ChangeType::RemoveAttribute,
            ChangeType::RemoveAttribute => ChangeType::AddAttribute,
            other => *other,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// One structural difference between two metamodel versions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Type of change
    pub change_type: ChangeType,
    /// `"<group>"` or `"<group>/<attribute>"`
    pub target_path: String,
    /// Value before the change (shape depends on `change_type`)
    pub old_value: Option<Value>,
    /// Value after the change (shape depends on `change_type`)
    pub new_value: Option<Value>,
    /// When this record was created (informational)
    pub timestamp: DateTime<Utc>,
    /// Human-readable summary
    pub description: String,
}

impl ChangeRecord {
    /// Create a change record, e.g. a proposed change to be checked with
    /// [`MetamodelValidator::validate_change`](crate::validator::MetamodelValidator::validate_change)
    pub fn new(
        change_type: ChangeType,
        target_path: impl Into<String>,
        old_value: Option<Value>,
        new_value: Option<Value>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let target_path = target_path.into();
        let description = description.into();
        if target_path.trim().is_empty() {
            return Err(MetamodelError::EmptyTargetPath);
        }
        if description.trim().is_empty() {
            return Err(MetamodelError::EmptyChangeDescription);
        }
        Ok(Self::recorded(change_type, target_path, old_value, new_value, description))
    }

    /// Build a record from values the analyzer already knows are well-formed
    pub(crate) fn recorded(
        change_type: ChangeType,
        target_path: String,
        old_value: Option<Value>,
        new_value: Option<Value>,
        description: String,
    ) -> Self {
        Self {
            change_type,
            target_path,
            old_value,
            new_value,
            timestamp: Utc::now(),
            description,
        }
    }

    /// Split an attribute path into `(group, attribute)`.
    ///
    /// Returns `None` unless the path has exactly one `/`.
    pub fn attribute_target(&self) -> Option<(&str, &str)> {
        let mut parts = self.target_path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(group), Some(attribute), None) => Some((group, attribute)),
            _ => None,
        }
    }

    /// Serialized payload of this record
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// The timestamp only records when the analyzer ran.
impl PartialEq for ChangeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.change_type == other.change_type
            && self.target_path == other.target_path
            && self.old_value == other.old_value
            && self.new_value == other.new_value
            && self.description == other.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_rejects_empty_fields() {
        assert!(matches!(
            ChangeRecord::new(ChangeType::AddGroup, " ", None, None, "desc"),
            Err(MetamodelError::EmptyTargetPath)
        ));
        assert!(matches!(
            ChangeRecord::new(ChangeType::AddGroup, "G", None, None, ""),
            Err(MetamodelError::EmptyChangeDescription)
        ));
    }

    #[test]
    fn test_attribute_target_parsing() {
        let change =
            ChangeRecord::new(ChangeType::AddAttribute, "Group/attr", None, None, "add").unwrap();
        assert_eq!(change.attribute_target(), Some(("Group", "attr")));

        let group_only = ChangeRecord::new(ChangeType::AddAttribute, "Group", None, None, "add").unwrap();
        assert_eq!(group_only.attribute_target(), None);

        let too_deep = ChangeRecord::new(ChangeType::AddAttribute, "a/b/c", None, None, "add").unwrap();
        assert_eq!(too_deep.attribute_target(), None);
    }

    #[test]
    fn test_change_type_serialization() {
        assert_eq!(serde_json::to_value(ChangeType::ChangeRequirement).unwrap(), json!("change_requirement"));
        assert_eq!(ChangeType::AddGroup.to_string(), "ADD_GROUP");
        assert_eq!(ChangeType::AddAttribute.inverse(), ChangeType::RemoveAttribute);
        assert_eq!(ChangeType::ModifyGroup.inverse(), ChangeType::ModifyGroup);
    }

    #[test]
    fn test_equality_ignores_timestamp() {
        let a = ChangeRecord::new(ChangeType::ChangeRequirement, "G/a", Some(json!(false)), Some(json!(true)), "req")
            .unwrap();
        let mut b = a.clone();
        b.timestamp = b.timestamp - chrono::Duration::seconds(30);
        assert_eq!(a, b);
    }
}
