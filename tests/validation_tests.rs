//! Structural and compatibility validation against fixture metamodels

use metamodel_core::{
    core_metamodel, CompatibilityChecker, Metamodel, MetamodelError, MetamodelValidator,
};

fn fixture(json: &str) -> Metamodel {
    Metamodel::from_json_str(json).unwrap()
}

// =============================================================================
// Structural validation
// =============================================================================

#[test]
fn test_fixture_metamodels_are_valid() {
    let validator = MetamodelValidator::new();
    for json in [
        include_str!("fixtures/product_v1.json"),
        include_str!("fixtures/product_v2.json"),
    ] {
        let report = validator.validate_metamodel(&fixture(json));
        assert!(report.is_valid, "unexpected findings: {:?}", report.errors);
    }
    assert!(validator.validate_metamodel(&core_metamodel().unwrap()).is_valid);
}

#[test]
fn test_enum_on_non_string_attribute() {
    let metamodel = fixture(include_str!("fixtures/enum_on_boolean.json"));
    let report = MetamodelValidator::new().validate_metamodel(&metamodel);

    assert!(!report.is_valid);
    assert!(report.mentions("has enum values but is not of type string"));
    assert!(report.mentions("'Status'"));
}

#[test]
fn test_attribute_duplicated_across_groups() {
    let metamodel = fixture(include_str!("fixtures/duplicate_attribute.json"));
    let report = MetamodelValidator::new().validate_metamodel(&metamodel);

    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("Identification"));
    assert!(report.errors[0].contains("Governance"));
}

#[test]
fn test_validation_is_idempotent() {
    let metamodel = fixture(include_str!("fixtures/duplicate_attribute.json"));
    let validator = MetamodelValidator::new();
    assert_eq!(
        validator.validate_metamodel(&metamodel),
        validator.validate_metamodel(&metamodel)
    );
}

#[test]
fn test_malformed_documents_never_construct() {
    let no_groups = r#"{"name": "M", "version": "1.0", "description": "d", "groups": []}"#;
    assert!(matches!(Metamodel::from_json_str(no_groups), Err(MetamodelError::Json(_))));

    let bad_version = r#"{"name": "M", "version": "v1", "description": "d", "groups": []}"#;
    assert!(Metamodel::from_json_str(bad_version).is_err());

    let unknown_type = r#"{"name": "M", "version": "1.0", "description": "d", "groups": [
        {"name": "G", "description": "d", "attributes": [
            {"name": "a", "description": "d", "type": "uuid", "required": true}]}]}"#;
    assert!(Metamodel::from_json_str(unknown_type).is_err());
}

// =============================================================================
// Backward compatibility
// =============================================================================

#[test]
fn test_additive_release_is_compatible() {
    let v1 = fixture(include_str!("fixtures/product_v1.json"));
    let v2 = fixture(include_str!("fixtures/product_v2.json"));

    let report = CompatibilityChecker::new().validate_backward_compatibility(&v1, &v2);
    assert!(report.is_valid, "unexpected findings: {:?}", report.errors);
}

#[test]
fn test_rollback_is_not_compatible() {
    let v1 = fixture(include_str!("fixtures/product_v1.json"));
    let v2 = fixture(include_str!("fixtures/product_v2.json"));

    let report = CompatibilityChecker::new().validate_backward_compatibility(&v2, &v1);
    assert!(!report.is_valid);
    assert_eq!(
        report.errors,
        vec![
            "Required attribute 'summary' was removed from group 'Identification'",
            "Required attribute 'reviewDate' in group 'Governance' was made optional",
        ]
    );
}

#[test]
fn test_removed_required_group() {
    let old = core_metamodel().unwrap();
    let mut new = old.clone();
    new.groups.retain(|g| g.name != "Ownership");

    let report = CompatibilityChecker::new().validate_backward_compatibility(&old, &new);
    assert!(!report.is_valid);
    assert!(report.mentions("Required group 'Ownership' was removed"));
}

#[test]
fn test_type_change_breaks_compatibility() {
    let old = core_metamodel().unwrap();
    let mut new = old.clone();
    let retention = new
        .groups
        .iter_mut()
        .flat_map(|g| g.attributes.iter_mut())
        .find(|a| a.name == "retentionDays")
        .unwrap();
    retention.attribute_type = metamodel_core::AttributeType::String;

    let report = CompatibilityChecker::new().validate_backward_compatibility(&old, &new);
    assert_eq!(
        report.errors,
        vec!["Type of attribute 'retentionDays' in group 'Lifecycle' changed from 'integer' to 'string'"]
    );
}
