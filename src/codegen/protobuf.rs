//! Protobuf emitter
//!
//! Renders a metamodel as a single proto3 file: one `Metadata` message
//! holding a field per group, then one message per group holding a field
//! per attribute. Field numbers follow declaration order starting at 1.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::names::{enum_type_name, enum_value_prefix, format_field_name, group_message_name};
use crate::error::Result;
use crate::metamodel::{Attribute, AttributeType, Group, Metamodel};

const TIMESTAMP_IMPORT: &str = "import \"google/protobuf/timestamp.proto\";";

/// Protobuf type for an attribute type
pub fn proto_type(attribute_type: AttributeType) -> &'static str {
    match attribute_type {
        AttributeType::String => "string",
        AttributeType::Boolean => "bool",
        AttributeType::Integer => "int32",
        AttributeType::Number => "double",
        AttributeType::Array => "repeated string",
        // serialized JSON
        AttributeType::Object => "bytes",
        AttributeType::Datetime => "google.protobuf.Timestamp",
    }
}

/// Writes `.proto` files for metamodels
#[derive(Debug, Clone)]
pub struct ProtobufGenerator {
    output_dir: PathBuf,
}

impl Default for ProtobufGenerator {
    fn default() -> Self {
        Self::new("generated")
    }
}

impl ProtobufGenerator {
    /// Create a generator writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Directory generated files are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render the proto3 text for a metamodel
    pub fn generate(&self, metamodel: &Metamodel, package: &str) -> String {
        let mut output = String::new();

        output.push_str("syntax = \"proto3\";\n");
        output.push_str(&format!("package {};\n", package));
        output.push('\n');

        let imports = imports(metamodel);
        for import in &imports {
            output.push_str(import);
            output.push('\n');
        }
        if !imports.is_empty() {
            output.push('\n');
        }

        output.push_str(&format!(
            "// Generated from metamodel \"{}\" version {}\n",
            metamodel.name, metamodel.version
        ));
        output.push_str(&format!("// {}\n", metamodel.description));
        output.push('\n');

        output.push_str("// Main metadata message containing all groups\n");
        output.push_str("message Metadata {\n");
        for (index, group) in metamodel.groups.iter().enumerate() {
            output.push_str(&format!("  // {}\n", group.description));
            output.push_str(&format!(
                "  {} {} = {};\n",
                group_message_name(&group.name),
                format_field_name(&group.name),
                index + 1
            ));
        }
        output.push_str("}\n");

        for group in &metamodel.groups {
            output.push('\n');
            emit_group(&mut output, group);
        }

        output
    }

    /// Write `<filename>.proto` (package `<filename>`) and return its path
    pub fn write_schema(&self, metamodel: &Metamodel, filename: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join(format!("{}.proto", filename));
        let content = self.generate(metamodel, filename);
        std::fs::write(&path, content)?;

        info!(path = %path.display(), groups = metamodel.groups.len(), "wrote protobuf schema");
        Ok(path)
    }
}

fn imports(metamodel: &Metamodel) -> Vec<&'static str> {
    let has_datetime = metamodel
        .groups
        .iter()
        .flat_map(|g| &g.attributes)
        .any(|a| a.attribute_type == AttributeType::Datetime);

    if has_datetime {
        vec![TIMESTAMP_IMPORT]
    } else {
        Vec::new()
    }
}

fn emit_group(output: &mut String, group: &Group) {
    output.push_str(&format!("// {}\n", group.description));
    output.push_str(&format!("message {} {{\n", group_message_name(&group.name)));

    for (index, attr) in group.attributes.iter().enumerate() {
        emit_field(output, attr, index + 1);
    }

    output.push_str("}\n");
}

fn emit_field(output: &mut String, attr: &Attribute, number: usize) {
    let field_name = format_field_name(&attr.name);
    output.push_str(&format!("  // {}\n", attr.description));

    let field_type = match attr.enum_values.as_deref() {
        Some(values) if !values.is_empty() => {
            let enum_name = enum_type_name(&field_name);
            emit_enum(output, &enum_name, values);
            enum_name
        }
        _ => proto_type(attr.attribute_type).to_string(),
    };
    debug!(field = %field_name, proto_type = %field_type, "emitting field");

    output.push_str(&format!("  {} {} = {};\n", field_type, field_name, number));
}

fn emit_enum(output: &mut String, enum_name: &str, values: &[String]) {
    let prefix = enum_value_prefix(enum_name);

    output.push_str(&format!("  enum {} {{\n", enum_name));
    output.push_str(&format!("    {}_UNSPECIFIED = 0;\n", prefix));
    for (i, value) in values.iter().enumerate() {
        output.push_str(&format!(
            "    {}_{} = {};\n",
            prefix,
            format_field_name(value).to_uppercase(),
            i + 1
        ));
    }
    output.push_str("  }\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::MetamodelVersion;

    fn enum_metamodel() -> Metamodel {
        let status = Attribute::new("Status", "Status of the item", AttributeType::String, true)
            .unwrap()
            .with_enum(["Active", "Inactive", "Pending"]);
        Metamodel::new(
            "Enum Test Metamodel",
            MetamodelVersion::parse("1.0").unwrap(),
            "A test metamodel with enum attributes",
            vec![Group::new("Test Group", "A test group", vec![status]).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(proto_type(AttributeType::String), "string");
        assert_eq!(proto_type(AttributeType::Boolean), "bool");
        assert_eq!(proto_type(AttributeType::Integer), "int32");
        assert_eq!(proto_type(AttributeType::Number), "double");
        assert_eq!(proto_type(AttributeType::Array), "repeated string");
        assert_eq!(proto_type(AttributeType::Object), "bytes");
        assert_eq!(proto_type(AttributeType::Datetime), "google.protobuf.Timestamp");
    }

    #[test]
    fn test_enum_generation() {
        let proto = ProtobufGenerator::default().generate(&enum_metamodel(), "enum_test");

        assert!(proto.contains("  enum StatusEnum {\n"));
        assert!(proto.contains("    STATUS_ENUM_UNSPECIFIED = 0;\n"));
        assert!(proto.contains("    STATUS_ENUM_ACTIVE = 1;\n"));
        assert!(proto.contains("    STATUS_ENUM_INACTIVE = 2;\n"));
        assert!(proto.contains("    STATUS_ENUM_PENDING = 3;\n"));
        assert!(proto.contains("  StatusEnum status = 1;\n"));
    }

    #[test]
    fn test_layout() {
        let proto = ProtobufGenerator::default().generate(&enum_metamodel(), "enum_test");
        let expected = "\
syntax = \"proto3\";
package enum_test;

// Generated from metamodel \"Enum Test Metamodel\" version 1.0
// A test metamodel with enum attributes

// Main metadata message containing all groups
message Metadata {
  // A test group
  TestGroupGroup test_group = 1;
}

// A test group
message TestGroupGroup {
  // Status of the item
  enum StatusEnum {
    STATUS_ENUM_UNSPECIFIED = 0;
    STATUS_ENUM_ACTIVE = 1;
    STATUS_ENUM_INACTIVE = 2;
    STATUS_ENUM_PENDING = 3;
  }
  StatusEnum status = 1;
}
";
        assert_eq!(proto, expected);
    }

    #[test]
    fn test_timestamp_import_only_with_datetime() {
        let generator = ProtobufGenerator::default();
        assert!(!generator.generate(&enum_metamodel(), "t").contains("import"));

        let mut with_time = enum_metamodel();
        with_time.groups[0]
            .attributes
            .push(Attribute::new("createdAt", "Creation time", AttributeType::Datetime, false).unwrap());
        let proto = generator.generate(&with_time, "t");
        assert!(proto.contains("package t;\n\nimport \"google/protobuf/timestamp.proto\";\n\n// Generated"));
        assert!(proto.contains("  google.protobuf.Timestamp created_at = 2;\n"));
    }

    #[test]
    fn test_write_schema_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let generator = ProtobufGenerator::new(&out);

        let path = generator.write_schema(&enum_metamodel(), "enum_test").unwrap();
        assert_eq!(path, out.join("enum_test.proto"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("syntax = \"proto3\";\npackage enum_test;\n"));
    }
}
