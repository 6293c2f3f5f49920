//! Backward compatibility checking
//!
//! A new metamodel is backward compatible with an old one when every
//! attribute required in the old version is still present and still
//! required, and no attribute present in both versions changed its type.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::metamodel::Metamodel;
use crate::validator::ValidationReport;

/// Compatibility checker for metamodel versions
#[derive(Debug, Default, Clone, Copy)]
pub struct CompatibilityChecker;

impl CompatibilityChecker {
    /// Create a new compatibility checker
    pub fn new() -> Self {
        Self
    }

    /// Check that `new` is backward compatible with `old`
    pub fn validate_backward_compatibility(&self, old: &Metamodel, new: &Metamodel) -> ValidationReport {
        let mut errors = Vec::new();

        let still_required: HashSet<(&str, &str)> = required_pairs(new).collect();

        // each pair is reported once, in first-seen order
        let mut seen = HashSet::new();
        let previously_required: Vec<(&str, &str)> =
            required_pairs(old).filter(|pair| seen.insert(*pair)).collect();

        for (group_name, attr_name) in previously_required {
            if still_required.contains(&(group_name, attr_name)) {
                continue;
            }

            let message = match new.group(group_name) {
                None => format!("Required group '{}' was removed", group_name),
                Some(group) => match group.attribute(attr_name) {
                    None => format!(
                        "Required attribute '{}' was removed from group '{}'",
                        attr_name, group_name
                    ),
                    Some(_) => format!(
                        "Required attribute '{}' in group '{}' was made optional",
                        attr_name, group_name
                    ),
                },
            };
            errors.push(message);
        }

        for old_group in &old.groups {
            let Some(new_group) = new.group(&old_group.name) else {
                continue;
            };
            for old_attr in &old_group.attributes {
                if let Some(new_attr) = new_group.attribute(&old_attr.name) {
                    if old_attr.attribute_type != new_attr.attribute_type {
                        errors.push(format!(
                            "Type of attribute '{}' in group '{}' changed from '{}' to '{}'",
                            old_attr.name, old_group.name, old_attr.attribute_type, new_attr.attribute_type
                        ));
                    }
                }
            }
        }

        if errors.is_empty() {
            debug!(from = %old.version, to = %new.version, "metamodel is backward compatible");
        } else {
            warn!(
                from = %old.version,
                to = %new.version,
                violations = errors.len(),
                "metamodel is not backward compatible"
            );
        }
        ValidationReport::from_errors(errors)
    }
}

/// `(group, attribute)` for every required attribute, in metamodel order
fn required_pairs<'a>(metamodel: &'a Metamodel) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    metamodel.groups.iter().flat_map(|group| {
        group
            .attributes
            .iter()
            .filter(|a| a.required)
            .map(move |a| (group.name.as_str(), a.name.as_str()))
    })
}
