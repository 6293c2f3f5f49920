//! Structural validation of metamodels and proposed changes
//!
//! Validation never stops at the first problem: every check runs and every
//! finding is collected into a [`ValidationReport`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::change::{ChangeRecord, ChangeType};
use crate::metamodel::{AttributeType, Metamodel};

/// Verdict plus every finding that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True iff `errors` is empty
    pub is_valid: bool,
    /// Findings in the order they were detected
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Build a report from collected findings
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// A report without findings
    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }

    /// Whether any finding contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.errors.iter().any(|e| e.contains(needle))
    }

    /// `(is_valid, errors)` pair
    pub fn into_parts(self) -> (bool, Vec<String>) {
        (self.is_valid, self.errors)
    }
}

/// Validates single metamodels and changes proposed against them
#[derive(Debug, Default, Clone, Copy)]
pub struct MetamodelValidator;

impl MetamodelValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Check a metamodel for internal consistency
    pub fn validate_metamodel(&self, metamodel: &Metamodel) -> ValidationReport {
        let mut errors = Vec::new();

        let mut seen_groups = HashSet::new();
        if !metamodel.groups.iter().all(|g| seen_groups.insert(g.name.as_str())) {
            errors.push("Duplicate group names found".to_string());
        }

        // attribute name -> owning groups, in first-seen order
        let mut owners: Vec<(&str, Vec<&str>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for group in &metamodel.groups {
            for attr in &group.attributes {
                match index.get(attr.name.as_str()) {
                    Some(&i) => owners[i].1.push(group.name.as_str()),
                    None => {
                        index.insert(attr.name.as_str(), owners.len());
                        owners.push((attr.name.as_str(), vec![group.name.as_str()]));
                    }
                }
            }
        }
        for (name, groups) in owners.iter().filter(|(_, groups)| groups.len() > 1) {
            errors.push(format!(
                "Attribute '{}' is duplicated across groups: {}",
                name,
                groups.join(", ")
            ));
        }

        for group in &metamodel.groups {
            for attr in &group.attributes {
                if attr.has_enum() && attr.attribute_type != AttributeType::String {
                    errors.push(format!(
                        "Attribute '{}' in group '{}' has enum values but is not of type string",
                        attr.name, group.name
                    ));
                }
            }
        }

        debug!(
            metamodel = %metamodel.name,
            findings = errors.len(),
            "validated metamodel structure"
        );
        ValidationReport::from_errors(errors)
    }

    /// Check whether `change` can be applied to `current`
    pub fn validate_change(&self, current: &Metamodel, change: &ChangeRecord) -> ValidationReport {
        let mut errors = Vec::new();

        match change.change_type {
            ChangeType::AddGroup => match change.new_value.as_ref().and_then(Value::as_object) {
                None => errors.push("New group value must be a dictionary".to_string()),
                Some(group) => {
                    let name = group.get("name").and_then(Value::as_str);
                    if let Some(name) = name.filter(|n| current.group(n).is_some()) {
                        errors.push(format!("Group '{}' already exists", name));
                    }
                }
            },

            ChangeType::RemoveGroup => match current.group(&change.target_path) {
                None => errors.push(format!("Group '{}' does not exist", change.target_path)),
                Some(group) if group.has_required_attributes() => errors.push(format!(
                    "Cannot remove group '{}' because it contains required attributes",
                    change.target_path
                )),
                Some(_) => {}
            },

            ChangeType::AddAttribute => {
                if let Some((group_name, attr_name)) =
                    Self::attribute_target(change, "add_attribute", &mut errors)
                {
                    match current.group(group_name) {
                        None => errors.push(format!("Group '{}' does not exist", group_name)),
                        Some(group) => {
                            if group.attribute(attr_name).is_some() {
                                errors.push(format!(
                                    "Attribute '{}' already exists in group '{}'",
                                    attr_name, group_name
                                ));
                            }
                            // Attribute names are unique across the whole metamodel.
                            for other in current.groups.iter().filter(|g| g.name != group_name) {
                                if other.attribute(attr_name).is_some() {
                                    errors.push(format!(
                                        "Attribute '{}' already exists in group '{}'",
                                        attr_name, other.name
                                    ));
                                }
                            }
                        }
                    }
                }
            }

            ChangeType::RemoveAttribute => {
                if let Some((group_name, attr_name)) =
                    Self::attribute_target(change, "remove_attribute", &mut errors)
                {
                    match current.group(group_name) {
                        None => errors.push(format!("Group '{}' does not exist", group_name)),
                        Some(group) => match group.attribute(attr_name) {
                            None => errors.push(format!(
                                "Attribute '{}' does not exist in group '{}'",
                                attr_name, group_name
                            )),
                            Some(attr) if attr.required => errors.push(format!(
                                "Cannot remove required attribute '{}' from group '{}'",
                                attr_name, group_name
                            )),
                            Some(_) => {}
                        },
                    }
                }
            }

            ChangeType::ChangeRequirement => {
                if let Some((group_name, attr_name)) =
                    Self::attribute_target(change, "change_requirement", &mut errors)
                {
                    let new_required = change.new_value.as_ref().and_then(Value::as_bool);
                    if new_required.is_none() {
                        errors.push("New value for change_requirement must be a boolean".to_string());
                    }

                    match current.group(group_name) {
                        None => errors.push(format!("Group '{}' does not exist", group_name)),
                        Some(group) => match (group.attribute(attr_name), new_required) {
                            (None, _) => errors.push(format!(
                                "Attribute '{}' does not exist in group '{}'",
                                attr_name, group_name
                            )),
                            (Some(attr), Some(false)) if !attr.required => {
                                errors.push(format!("Attribute '{}' is already not required", attr_name))
                            }
                            (Some(attr), Some(true)) if attr.required => {
                                errors.push(format!("Attribute '{}' is already required", attr_name))
                            }
                            _ => {}
                        },
                    }
                }
            }

            ChangeType::ModifyGroup | ChangeType::ModifyAttribute => {}
        }

        debug!(
            change_type = %change.change_type,
            target = %change.target_path,
            findings = errors.len(),
            "validated proposed change"
        );
        ValidationReport::from_errors(errors)
    }

    fn attribute_target<'a>(
        change: &'a ChangeRecord,
        label: &str,
        errors: &mut Vec<String>,
    ) -> Option<(&'a str, &'a str)> {
        let target = change.attribute_target();
        if target.is_none() {
            errors.push(format!(
                "Target path for {} must be in format 'group_name/attribute_name'",
                label
            ));
        }
        target
    }
}
