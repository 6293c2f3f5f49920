//! Migration planning
//!
//! Sorts change records into impact tiers and attaches the remediation
//! steps each kind of change calls for. Rules are tried top to bottom and
//! the first match wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::change::{ChangeRecord, ChangeType};

/// Operational risk of applying a change to live data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImpactTier {
    #[serde(rename = "high_impact")]
    High,
    #[serde(rename = "medium_impact")]
    Medium,
    #[serde(rename = "low_impact")]
    Low,
}

impl ImpactTier {
    /// Key used in serialized plans (e.g., "high_impact")
    pub fn key(&self) -> &'static str {
        match self {
            ImpactTier::High => "high_impact",
            ImpactTier::Medium => "medium_impact",
            ImpactTier::Low => "low_impact",
        }
    }
}

impl fmt::Display for ImpactTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One planned remediation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// The change record, verbatim
    pub change: Value,
    /// One-line summary of what to do
    pub action: String,
    /// Ordered remediation steps
    pub steps: Vec<String>,
}

/// Plan entries grouped by impact tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub high_impact: Vec<PlanEntry>,
    pub medium_impact: Vec<PlanEntry>,
    pub low_impact: Vec<PlanEntry>,
}

impl MigrationPlan {
    /// Entries of one tier
    pub fn tier(&self, tier: ImpactTier) -> &[PlanEntry] {
        match tier {
            ImpactTier::High => &self.high_impact,
            ImpactTier::Medium => &self.medium_impact,
            ImpactTier::Low => &self.low_impact,
        }
    }

    fn tier_mut(&mut self, tier: ImpactTier) -> &mut Vec<PlanEntry> {
        match tier {
            ImpactTier::High => &mut self.high_impact,
            ImpactTier::Medium => &mut self.medium_impact,
            ImpactTier::Low => &mut self.low_impact,
        }
    }

    /// Total number of planned entries
    pub fn total(&self) -> usize {
        self.high_impact.len() + self.medium_impact.len() + self.low_impact.len()
    }

    /// Whether nothing needs to be done
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Classification rules
// =============================================================================

struct PlanRule {
    change_type: ChangeType,
    applies: fn(&ChangeRecord) -> bool,
    tier: ImpactTier,
    action: &'static str,
    steps: &'static [&'static str],
}

fn always(_: &ChangeRecord) -> bool {
    true
}

/// Loose truthiness of a JSON payload: null, false, 0, "" and empty
/// containers count as false.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

fn adds_required(change: &ChangeRecord) -> bool {
    truthy(change.new_value.as_ref().and_then(|v| v.get("required")))
}

fn makes_required(change: &ChangeRecord) -> bool {
    truthy(change.new_value.as_ref())
}

const RULES: &[PlanRule] = &[
    PlanRule {
        change_type: ChangeType::AddAttribute,
        applies: adds_required,
        tier: ImpactTier::High,
        action: "Add required attribute and populate existing data",
        steps: &[
            "Define default value for existing data",
            "Create migration script to populate attribute",
            "Update all data ingestion processes",
            "Notify data product owners",
        ],
    },
    PlanRule {
        change_type: ChangeType::ChangeRequirement,
        applies: makes_required,
        tier: ImpactTier::High,
        action: "Make attribute required and populate existing data",
        steps: &[
            "Define default value for null/missing values",
            "Create migration script to populate attribute",
            "Update validation rules",
            "Notify data product owners",
        ],
    },
    PlanRule {
        change_type: ChangeType::RemoveGroup,
        applies: always,
        tier: ImpactTier::High,
        action: "Remove group from schema and data",
        steps: &[
            "Archive existing data",
            "Update schema definition",
            "Create database migration",
            "Update all dependent applications",
            "Notify data product owners",
        ],
    },
    PlanRule {
        change_type: ChangeType::RemoveAttribute,
        applies: always,
        tier: ImpactTier::Medium,
        action: "Remove attribute from schema and data",
        steps: &[
            "Update schema definition",
            "Create migration script to remove attribute from existing data",
            "Update all dependent applications",
            "Notify data product owners",
        ],
    },
    PlanRule {
        change_type: ChangeType::ModifyAttribute,
        applies: always,
        tier: ImpactTier::Medium,
        action: "Modify attribute properties",
        steps: &[
            "Update schema definition",
            "Update validation rules",
            "Create migration script for type conversions if needed",
            "Notify data product owners",
        ],
    },
    PlanRule {
        change_type: ChangeType::AddGroup,
        applies: always,
        tier: ImpactTier::Medium,
        action: "Add new group to schema",
        steps: &[
            "Update schema definition",
            "Create database migration if needed",
            "Update validation rules",
            "Notify data product owners",
        ],
    },
    PlanRule {
        change_type: ChangeType::ChangeRequirement,
        applies: always,
        tier: ImpactTier::Low,
        action: "Make attribute optional",
        steps: &[
            "Update schema definition",
            "Update validation rules",
            "Notify data product owners",
        ],
    },
    PlanRule {
        change_type: ChangeType::AddAttribute,
        applies: always,
        tier: ImpactTier::Low,
        action: "Add optional attribute",
        steps: &[
            "Update schema definition",
            "Update validation rules",
            "Notify data product owners",
        ],
    },
    PlanRule {
        change_type: ChangeType::ModifyGroup,
        applies: always,
        tier: ImpactTier::Low,
        action: "Modify group properties",
        steps: &[
            "Update schema definition",
            "Update documentation",
            "Notify data product owners",
        ],
    },
];

/// Builds migration plans from change records
#[derive(Debug, Default, Clone, Copy)]
pub struct MigrationPlanner;

impl MigrationPlanner {
    /// Create a new planner
    pub fn new() -> Self {
        Self
    }

    /// Classify a single change, returning its tier and the matching rule's action
    pub fn classify(&self, change: &ChangeRecord) -> Option<(ImpactTier, &'static str)> {
        find_rule(change).map(|rule| (rule.tier, rule.action))
    }

    /// Build a plan covering every change, in input order within each tier
    pub fn generate_migration_plan(&self, changes: &[ChangeRecord]) -> MigrationPlan {
        let mut plan = MigrationPlan::default();

        for change in changes {
            let Some(rule) = find_rule(change) else {
                continue;
            };
            plan.tier_mut(rule.tier).push(PlanEntry {
                change: change.to_value(),
                action: rule.action.to_string(),
                steps: rule.steps.iter().map(|s| s.to_string()).collect(),
            });
        }

        debug!(
            high = plan.high_impact.len(),
            medium = plan.medium_impact.len(),
            low = plan.low_impact.len(),
            "generated migration plan"
        );
        plan
    }
}

fn find_rule(change: &ChangeRecord) -> Option<&'static PlanRule> {
    RULES
        .iter()
        .find(|rule| rule.change_type == change.change_type && (rule.applies)(change))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(change_type: ChangeType, path: &str, old: Option<Value>, new: Option<Value>) -> ChangeRecord {
        ChangeRecord::new(change_type, path, old, new, "test change").unwrap()
    }

    #[test]
    fn test_required_attribute_addition_is_high_impact() {
        let required = change(
            ChangeType::AddAttribute,
            "G/a",
            None,
            Some(json!({"name": "a", "required": true})),
        );
        let optional = change(
            ChangeType::AddAttribute,
            "G/a",
            None,
            Some(json!({"name": "a", "required": false})),
        );

        let plan = MigrationPlanner::new().generate_migration_plan(&[required, optional]);
        assert_eq!(plan.high_impact.len(), 1);
        assert_eq!(plan.high_impact[0].action, "Add required attribute and populate existing data");
        assert_eq!(plan.low_impact.len(), 1);
        assert_eq!(plan.low_impact[0].action, "Add optional attribute");
        assert!(plan.medium_impact.is_empty());
    }

    #[test]
    fn test_requirement_direction_decides_tier() {
        let planner = MigrationPlanner::new();
        let stricter = change(ChangeType::ChangeRequirement, "G/a", Some(json!(false)), Some(json!(true)));
        let looser = change(ChangeType::ChangeRequirement, "G/a", Some(json!(true)), Some(json!(false)));

        assert_eq!(
            planner.classify(&stricter),
            Some((ImpactTier::High, "Make attribute required and populate existing data"))
        );
        assert_eq!(planner.classify(&looser), Some((ImpactTier::Low, "Make attribute optional")));
    }

    #[test]
    fn test_every_change_type_is_planned() {
        let changes = vec![
            change(ChangeType::AddGroup, "G", None, Some(json!({"name": "G"}))),
            change(ChangeType::RemoveGroup, "H", Some(json!({"name": "H"})), None),
            change(ChangeType::ModifyGroup, "I", Some(json!({"description": "a"})), Some(json!({"description": "b"}))),
            change(ChangeType::RemoveAttribute, "I/x", Some(json!({"name": "x"})), None),
            change(ChangeType::ModifyAttribute, "I/y", Some(json!({"type": "string"})), Some(json!({"type": "integer"}))),
        ];

        let plan = MigrationPlanner::new().generate_migration_plan(&changes);
        assert_eq!(plan.total(), changes.len());

        let actions = |tier| plan.tier(tier).iter().map(|e| e.action.as_str()).collect::<Vec<_>>();
        assert_eq!(actions(ImpactTier::High), vec!["Remove group from schema and data"]);
        assert_eq!(
            actions(ImpactTier::Medium),
            vec!["Add new group to schema", "Remove attribute from schema and data", "Modify attribute properties"]
        );
        assert_eq!(actions(ImpactTier::Low), vec!["Modify group properties"]);
    }

    #[test]
    fn test_steps_are_fixed_text() {
        let removal = change(ChangeType::RemoveGroup, "G", Some(json!({"name": "G"})), None);
        let plan = MigrationPlanner::new().generate_migration_plan(&[removal.clone()]);

        let entry = &plan.high_impact[0];
        assert_eq!(entry.steps.first().map(String::as_str), Some("Archive existing data"));
        assert_eq!(entry.steps.len(), 5);
        assert_eq!(entry.change, removal.to_value());
    }

    #[test]
    fn test_plan_json_keys() {
        let json = MigrationPlanner::new().generate_migration_plan(&[]).to_json();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["high_impact", "low_impact", "medium_impact"]);
    }

    #[test]
    fn test_missing_required_flag_counts_as_optional() {
        let bare = change(ChangeType::AddAttribute, "G/a", None, None);
        assert_eq!(
            MigrationPlanner::new().classify(&bare),
            Some((ImpactTier::Low, "Add optional attribute"))
        );
    }
}
