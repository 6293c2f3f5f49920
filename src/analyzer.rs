//! Change detection between metamodel versions
//!
//! Groups and attributes are matched by name, never by position. Records
//! are emitted phase by phase:
//!
//! 1. groups only in the new version (`add_group`)
//! 2. groups only in the old version (`remove_group`)
//! 3. for each group in both versions: description change (`modify_group`),
//!    then added, removed and modified attributes
//!
//! Within a phase names come out in sorted order.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::change::{ChangeRecord, ChangeType};
use crate::metamodel::{Attribute, Group, Metamodel};

/// Diffs two metamodel versions into change records
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeAnalyzer;

impl ChangeAnalyzer {
    /// Create a new analyzer
    pub fn new() -> Self {
        Self
    }

    /// Detect every structural change from `old` to `new`
    pub fn detect_changes(&self, old: &Metamodel, new: &Metamodel) -> Vec<ChangeRecord> {
        let mut changes = Vec::new();

        let old_groups = by_name(&old.groups);
        let new_groups = by_name(&new.groups);

        for (name, group) in new_groups.iter().filter(|(n, _)| !old_groups.contains_key(*n)) {
            changes.push(ChangeRecord::recorded(
                ChangeType::AddGroup,
                name.to_string(),
                None,
                Some(group.to_value()),
                format!("Added new group '{}'", name),
            ));
        }

        for (name, group) in old_groups.iter().filter(|(n, _)| !new_groups.contains_key(*n)) {
            changes.push(ChangeRecord::recorded(
                ChangeType::RemoveGroup,
                name.to_string(),
                Some(group.to_value()),
                None,
                format!("Removed group '{}'", name),
            ));
        }

        for (name, old_group) in &old_groups {
            if let Some(new_group) = new_groups.get(name) {
                self.diff_group(name, old_group, new_group, &mut changes);
            }
        }

        debug!(
            from = %old.version,
            to = %new.version,
            changes = changes.len(),
            "detected metamodel changes"
        );
        changes
    }

    fn diff_group(&self, group_name: &str, old: &Group, new: &Group, changes: &mut Vec<ChangeRecord>) {
        if old.description != new.description {
            changes.push(ChangeRecord::recorded(
                ChangeType::ModifyGroup,
                group_name.to_string(),
                Some(serde_json::json!({ "description": old.description })),
                Some(serde_json::json!({ "description": new.description })),
                format!("Modified description of group '{}'", group_name),
            ));
        }

        let old_attrs = by_name(&old.attributes);
        let new_attrs = by_name(&new.attributes);

        for (name, attr) in new_attrs.iter().filter(|(n, _)| !old_attrs.contains_key(*n)) {
            changes.push(ChangeRecord::recorded(
                ChangeType::AddAttribute,
                format!("{}/{}", group_name, name),
                None,
                Some(attr.to_value()),
                format!("Added new attribute '{}' to group '{}'", name, group_name),
            ));
        }

        for (name, attr) in old_attrs.iter().filter(|(n, _)| !new_attrs.contains_key(*n)) {
            changes.push(ChangeRecord::recorded(
                ChangeType::RemoveAttribute,
                format!("{}/{}", group_name, name),
                Some(attr.to_value()),
                None,
                format!("Removed attribute '{}' from group '{}'", name, group_name),
            ));
        }

        for (name, old_attr) in &old_attrs {
            let Some(new_attr) = new_attrs.get(name) else {
                continue;
            };
            let path = format!("{}/{}", group_name, name);

            if let Some((before, after)) = property_diff(old_attr, new_attr) {
                trace!(target_path = %path, fields = ?before.keys().collect::<Vec<_>>(), "attribute modified");
                changes.push(ChangeRecord::recorded(
                    ChangeType::ModifyAttribute,
                    path.clone(),
                    Some(Value::Object(before)),
                    Some(Value::Object(after)),
                    format!("Modified properties of attribute '{}' in group '{}'", name, group_name),
                ));
            }

            if old_attr.required != new_attr.required {
                changes.push(ChangeRecord::recorded(
                    ChangeType::ChangeRequirement,
                    path,
                    Some(Value::Bool(old_attr.required)),
                    Some(Value::Bool(new_attr.required)),
                    format!(
                        "Changed attribute '{}' in group '{}' to {}",
                        name,
                        group_name,
                        if new_attr.required { "required" } else { "optional" }
                    ),
                ));
            }
        }
    }
}

trait Named {
    fn name(&self) -> &str;
}

impl Named for Group {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Attribute {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Index items by name. A repeated name keeps the last item.
fn by_name<T: Named>(items: &[T]) -> BTreeMap<&str, &T> {
    items.iter().map(|item| (item.name(), item)).collect()
}

/// Old and new values of the changed description/type/enum fields, if any.
/// `required` is reported separately as a requirement change.
fn property_diff(old: &Attribute, new: &Attribute) -> Option<(Map<String, Value>, Map<String, Value>)> {
    let mut before = Map::new();
    let mut after = Map::new();

    if old.description != new.description {
        before.insert("description".into(), Value::from(old.description.as_str()));
        after.insert("description".into(), Value::from(new.description.as_str()));
    }
    if old.attribute_type != new.attribute_type {
        before.insert("type".into(), Value::from(old.attribute_type.as_str()));
        after.insert("type".into(), Value::from(new.attribute_type.as_str()));
    }
    if old.enum_values != new.enum_values {
        before.insert("enum".into(), serde_json::json!(old.enum_values));
        after.insert("enum".into(), serde_json::json!(new.enum_values));
    }

    (!before.is_empty()).then_some((before, after))
}
