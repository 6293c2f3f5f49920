//! Metamodel types and structures
//!
//! A metamodel is a named, versioned set of groups, each holding typed
//! attributes. Every type here validates its own fields on construction, and
//! deserialization goes through the same constructors, so a malformed
//! document never produces a value.
//!
//! Rules that span several entities (unique group names, attribute names
//! unique across the whole metamodel, enum only on strings) are not checked
//! here; see [`MetamodelValidator`](crate::validator::MetamodelValidator).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MetamodelError, Result};
use crate::version::MetamodelVersion;

/// Maximum length of group and attribute names
pub const MAX_NAME_LENGTH: usize = 100;

/// Type of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Boolean,
    Integer,
    Number,
    Array,
    Object,
    Datetime,
}

impl AttributeType {
    /// All attribute types, in declaration order
    pub const ALL: [AttributeType; 7] = [
        AttributeType::String,
        AttributeType::Boolean,
        AttributeType::Integer,
        AttributeType::Number,
        AttributeType::Array,
        AttributeType::Object,
        AttributeType::Datetime,
    ];

    /// Get the name used in metamodel documents
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Boolean => "boolean",
            AttributeType::Integer => "integer",
            AttributeType::Number => "number",
            AttributeType::Array => "array",
            AttributeType::Object => "object",
            AttributeType::Datetime => "datetime",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = MetamodelError;

    fn from_str(s: &str) -> Result<Self> {
        AttributeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| MetamodelError::UnknownAttributeType(s.to_string()))
    }
}

fn check_name(kind: &'static str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MetamodelError::EmptyName { kind });
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(MetamodelError::NameTooLong {
            kind,
            name: name.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

fn check_description(kind: &'static str, description: &str) -> Result<()> {
    if description.trim().is_empty() {
        return Err(MetamodelError::EmptyDescription { kind });
    }
    Ok(())
}

// =============================================================================
// Attribute
// =============================================================================

/// A single typed attribute belonging to a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAttribute")]
pub struct Attribute {
    /// Attribute name, unique across the whole metamodel
    pub name: String,
    /// What the attribute holds
    pub description: String,
    /// Value type
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Whether every record must carry a value
    pub required: bool,
    /// Allowed values (only meaningful for string attributes)
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RawAttribute {
    name: String,
    description: String,
    #[serde(rename = "type")]
    attribute_type: AttributeType,
    required: bool,
    #[serde(rename = "enum", default)]
    enum_values: Option<Vec<String>>,
}

impl TryFrom<RawAttribute> for Attribute {
    type Error = MetamodelError;

    fn try_from(raw: RawAttribute) -> Result<Self> {
        let attribute = Attribute::new(raw.name, raw.description, raw.attribute_type, raw.required)?;
        Ok(match raw.enum_values {
            Some(values) => attribute.with_enum(values),
            None => attribute,
        })
    }
}

impl Attribute {
    /// Create a new attribute
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        attribute_type: AttributeType,
        required: bool,
    ) -> Result<Self> {
        let name = name.into();
        let description = description.into();
        check_name("Attribute", &name)?;
        check_description("Attribute", &description)?;

        Ok(Self {
            name,
            description,
            attribute_type,
            required,
            enum_values: None,
        })
    }

    /// Attach a list of allowed values
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the attribute declares at least one allowed value
    pub fn has_enum(&self) -> bool {
        self.enum_values.as_ref().is_some_and(|v| !v.is_empty())
    }

    /// Full JSON payload of this attribute
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "type": self.attribute_type,
            "required": self.required,
            "enum": self.enum_values,
        })
    }
}

// =============================================================================
// Group
// =============================================================================

/// A named collection of attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGroup")]
pub struct Group {
    /// Group name, unique within the metamodel
    pub name: String,
    /// What the group covers
    pub description: String,
    /// Attributes in declaration order (never empty)
    pub attributes: Vec<Attribute>,
}

#[derive(Deserialize)]
struct RawGroup {
    name: String,
    description: String,
    attributes: Vec<Attribute>,
}

impl TryFrom<RawGroup> for Group {
    type Error = MetamodelError;

    fn try_from(raw: RawGroup) -> Result<Self> {
        Group::new(raw.name, raw.description, raw.attributes)
    }
}

impl Group {
    /// Create a new group
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Result<Self> {
        let name = name.into();
        let description = description.into();
        check_name("Group", &name)?;
        check_description("Group", &description)?;
        if attributes.is_empty() {
            return Err(MetamodelError::EmptyGroup { group: name });
        }

        Ok(Self {
            name,
            description,
            attributes,
        })
    }

    /// Get an attribute of this group by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether any attribute of this group is required
    pub fn has_required_attributes(&self) -> bool {
        self.attributes.iter().any(|a| a.required)
    }

    /// Full JSON payload of this group, attributes included
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "attributes": self.attributes.iter().map(Attribute::to_value).collect::<Vec<_>>(),
        })
    }
}

// =============================================================================
// Metamodel
// =============================================================================

/// A required attribute together with the group that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub group: String,
}

/// The complete metamodel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMetamodel")]
pub struct Metamodel {
    /// Metamodel name
    pub name: String,
    /// Version of this metamodel document
    pub version: MetamodelVersion,
    /// What the metamodel describes
    pub description: String,
    /// Groups in declaration order (never empty)
    pub groups: Vec<Group>,
}

#[derive(Deserialize)]
struct RawMetamodel {
    name: String,
    version: MetamodelVersion,
    description: String,
    groups: Vec<Group>,
}

impl TryFrom<RawMetamodel> for Metamodel {
    type Error = MetamodelError;

    fn try_from(raw: RawMetamodel) -> Result<Self> {
        Metamodel::new(raw.name, raw.version, raw.description, raw.groups)
    }
}

impl Metamodel {
    /// Create a new metamodel
    pub fn new(
        name: impl Into<String>,
        version: MetamodelVersion,
        description: impl Into<String>,
        groups: Vec<Group>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MetamodelError::EmptyName { kind: "Metamodel" });
        }
        if groups.is_empty() {
            return Err(MetamodelError::NoGroups { name });
        }

        Ok(Self {
            name,
            version,
            description: description.into(),
            groups,
        })
    }

    /// Parse a metamodel from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render this metamodel as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Get a group by name
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Find an attribute by name in any group
    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.groups.iter().find_map(|g| g.attribute(name))
    }

    /// All required attributes, in metamodel order
    pub fn required_attributes(&self) -> Vec<RequiredAttribute> {
        self.groups
            .iter()
            .flat_map(|group| {
                group
                    .attributes
                    .iter()
                    .filter(|a| a.required)
                    .map(move |a| RequiredAttribute {
                        name: a.name.clone(),
                        attribute_type: a.attribute_type,
                        group: group.name.clone(),
                    })
            })
            .collect()
    }
}
