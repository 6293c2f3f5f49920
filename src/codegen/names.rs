//! Name transliteration for generated schemas
//!
//! Metamodel names are free text ("Data Quality", "productId",
//! "User's First Name"). Protobuf wants `lower_snake` field names,
//! `PascalCase` message names and `UPPER_SNAKE` enum values.

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    capitalized_word: Regex,
    lower_upper: Regex,
    invalid: Regex,
    underscores: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        capitalized_word: Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"),
        lower_upper: Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"),
        invalid: Regex::new(r"[^a-zA-Z0-9_]").expect("valid regex"),
        underscores: Regex::new(r"_{2,}").expect("valid regex"),
    })
}

/// Convert a metamodel name to a `lower_snake` field name.
///
/// ```
/// use metamodel_core::codegen::names::format_field_name;
///
/// assert_eq!(format_field_name("productId"), "product_id");
/// assert_eq!(format_field_name("Data Quality"), "data_quality");
/// ```
pub fn format_field_name(name: &str) -> String {
    let p = patterns();
    let split = p.capitalized_word.replace_all(name, "${1}_${2}");
    let split = p.lower_upper.replace_all(&split, "${1}_${2}");
    let cleaned = p.invalid.replace_all(&split, "_").to_lowercase();
    p.underscores.replace_all(&cleaned, "_").into_owned()
}

/// Upper-case every letter that follows a non-letter, lower-case the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut after_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

/// `first_name` -> `FirstName`
pub fn pascal_case(field_name: &str) -> String {
    title_case(field_name).replace('_', "")
}

/// Message name for a group (`Data Quality` -> `DataQualityGroup`)
pub fn group_message_name(group_name: &str) -> String {
    format!("{}Group", pascal_case(&format_field_name(group_name)))
}

/// Enum type name for an enum-valued attribute (`status` -> `StatusEnum`)
pub fn enum_type_name(field_name: &str) -> String {
    format!("{}Enum", pascal_case(field_name))
}

/// Prefix for the values of an enum type (`StatusEnum` -> `STATUS_ENUM`)
pub fn enum_value_prefix(enum_name: &str) -> String {
    format_field_name(enum_name).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_names() {
        assert_eq!(format_field_name("name"), "name");
        assert_eq!(format_field_name("first_name"), "first_name");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(format_field_name("firstName"), "first_name");
        assert_eq!(format_field_name("FirstName"), "first_name");
        assert_eq!(format_field_name("containsPersonalData"), "contains_personal_data");
    }

    #[test]
    fn test_separators() {
        assert_eq!(format_field_name("First Name"), "first_name");
        assert_eq!(format_field_name("First-Name"), "first_name");
        assert_eq!(format_field_name("First.Name"), "first_name");
        assert_eq!(format_field_name("First@Name"), "first_name");
    }

    #[test]
    fn test_mixed() {
        assert_eq!(format_field_name("User's First Name"), "user_s_first_name");
        assert_eq!(format_field_name("CamelCase With Spaces"), "camel_case_with_spaces");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(group_message_name("Identification"), "IdentificationGroup");
        assert_eq!(group_message_name("Test Group"), "TestGroupGroup");
        assert_eq!(enum_type_name("status"), "StatusEnum");
        assert_eq!(enum_type_name("data_sensitivity"), "DataSensitivityEnum");
        assert_eq!(enum_value_prefix("StatusEnum"), "STATUS_ENUM");
    }

    #[test]
    fn test_title_case_after_digits() {
        assert_eq!(pascal_case("field2x"), "Field2X");
    }
}
