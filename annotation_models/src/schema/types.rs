//! Declarative annotation schema types

use indexmap::IndexMap;
use std::fmt;

use crate::error::{Error, Result};

/// Name of the field a reference annotation uses to point at another annotation row
pub const TARGET_ID_FIELD: &str = "target_id";

/// A named annotation schema: an ordered set of typed fields
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub fields: IndexMap<String, Field>,
    /// Rows of this type refer to a row of another annotation type via `target_id`
    pub reference: bool,
}

impl Schema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            reference: false,
        }
    }

    /// Create a reference annotation schema whose `target_id` points at `reference_type`
    pub fn reference(name: impl Into<String>, reference_type: impl Into<String>) -> Self {
        let mut schema = Self::new(name).as_reference();
        schema.fields.insert(
            TARGET_ID_FIELD.to_string(),
            Field::new(FieldKind::Integer).reference_type(reference_type),
        );
        schema
    }

    /// Mark this schema as a reference annotation
    pub fn as_reference(mut self) -> Self {
        self.reference = true;
        self
    }

    /// Append a field, replacing any earlier field of the same name in place
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Consume the schema, keeping only its fields
    pub fn into_fields(self) -> IndexMap<String, Field> {
        self.fields
    }

    /// The annotation type a reference schema points at.
    ///
    /// Returns `Ok(None)` for plain schemas and an error when a reference
    /// schema lacks `target_id` or its `reference_type` metadata.
    pub fn reference_target(&self) -> Result<Option<&str>> {
        if !self.reference {
            return Ok(None);
        }

        let target = self.fields.get(TARGET_ID_FIELD).ok_or_else(|| {
            Error::ReferenceError(format!(
                "reference schema {} has no {} field",
                self.name, TARGET_ID_FIELD
            ))
        })?;

        match target.metadata.reference_type.as_deref() {
            Some(reference_type) if !reference_type.is_empty() => Ok(Some(reference_type)),
            _ => Err(Error::ReferenceError(format!(
                "{}.{} is missing reference_type metadata",
                self.name, TARGET_ID_FIELD
            ))),
        }
    }

    /// Check the structural rules of reference metadata
    pub fn validate(&self) -> Result<()> {
        for (name, field) in &self.fields {
            if field.metadata.reference_type.is_some() && name != TARGET_ID_FIELD {
                return Err(Error::ReferenceError(format!(
                    "{}.{}: reference_type is only valid on {}",
                    self.name, name, TARGET_ID_FIELD
                )));
            }
        }
        self.reference_target().map(|_| ())
    }
}

/// A single schema field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind: FieldKind,
    pub metadata: FieldMetadata,
}

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            metadata: FieldMetadata::default(),
        }
    }

    pub fn numeric() -> Self {
        Self::new(FieldKind::Numeric)
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// A single nested group of sub-fields
    pub fn nested(fields: IndexMap<String, Field>) -> Self {
        Self::new(FieldKind::Nested(NestedGroup { fields, many: false }))
    }

    /// A repeating nested group of sub-fields
    pub fn nested_many(fields: IndexMap<String, Field>) -> Self {
        Self::new(FieldKind::Nested(NestedGroup { fields, many: true }))
    }

    pub fn list(items: FieldKind) -> Self {
        Self::new(FieldKind::List(Box::new(items)))
    }

    /// Request an index on the generated column
    pub fn indexed(mut self) -> Self {
        self.metadata.index = true;
        self
    }

    /// Keep the field in the schema but out of the table
    pub fn drop_column(mut self) -> Self {
        self.metadata.drop_column = true;
        self
    }

    /// Store this field as a PostGIS geometry of the given subtype
    pub fn postgis_geometry(mut self, subtype: impl Into<String>) -> Self {
        self.metadata.postgis_geometry = Some(subtype.into());
        self
    }

    pub fn reference_type(mut self, reference_type: impl Into<String>) -> Self {
        self.metadata.reference_type = Some(reference_type.into());
        self
    }
}

/// The closed set of field kinds a schema can declare
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Arbitrary-precision number, used for 64-bit unsigned segment ids
    Numeric,
    Integer,
    Float,
    String,
    Boolean,
    Nested(NestedGroup),
    List(Box<FieldKind>),
    /// A type this crate has no translation for
    Other(String),
}

impl FieldKind {
    /// Parse a type tag as written in schema files
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "numeric" | "numeric_field" => FieldKind::Numeric,
            "int" | "integer" => FieldKind::Integer,
            "float" => FieldKind::Float,
            "str" | "string" => FieldKind::String,
            "bool" | "boolean" => FieldKind::Boolean,
            _ => FieldKind::Other(tag.to_string()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Numeric => write!(f, "Numeric"),
            FieldKind::Integer => write!(f, "Integer"),
            FieldKind::Float => write!(f, "Float"),
            FieldKind::String => write!(f, "String"),
            FieldKind::Boolean => write!(f, "Boolean"),
            FieldKind::Nested(group) if group.many => write!(f, "Nested(many=true)"),
            FieldKind::Nested(_) => write!(f, "Nested"),
            FieldKind::List(items) => write!(f, "List({})", items),
            FieldKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Sub-fields of a nested field
#[derive(Debug, Clone, PartialEq)]
pub struct NestedGroup {
    pub fields: IndexMap<String, Field>,
    /// Multi-valued (one-to-many) group
    pub many: bool,
}

/// Per-field metadata controlling column generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMetadata {
    pub index: bool,
    pub drop_column: bool,
    pub postgis_geometry: Option<String>,
    pub reference_type: Option<String>,
}

/// A Rust type that describes an annotation schema.
///
/// Usually implemented with `#[derive(AnnotationSchema)]`.
pub trait AnnotationSchema {
    fn schema() -> Schema;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Int", FieldKind::Integer)]
    #[case("integer", FieldKind::Integer)]
    #[case("numeric", FieldKind::Numeric)]
    #[case("Str", FieldKind::String)]
    #[case("bool", FieldKind::Boolean)]
    #[case("float", FieldKind::Float)]
    #[case("DateTime", FieldKind::Other("DateTime".to_string()))]
    fn test_kind_from_tag(#[case] tag: &str, #[case] expected: FieldKind) {
        assert_eq!(FieldKind::from_tag(tag), expected);
    }

    #[test]
    fn test_field_order_is_preserved() {
        let schema = Schema::new("synapse")
            .field("size", Field::float())
            .field("label", Field::string())
            .field("valid", Field::boolean());

        let names: Vec<&str> = schema.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["size", "label", "valid"]);
    }

    #[test]
    fn test_reference_target() {
        let schema = Schema::reference("presynaptic_bouton_type", "synapse");
        assert_eq!(schema.reference_target().unwrap(), Some("synapse"));
        assert!(schema.validate().is_ok());

        let plain = Schema::new("synapse");
        assert_eq!(plain.reference_target().unwrap(), None);
    }

    #[test]
    fn test_reference_without_metadata_fails() {
        let schema = Schema::new("broken")
            .as_reference()
            .field(TARGET_ID_FIELD, Field::integer());
        assert!(matches!(schema.reference_target(), Err(Error::ReferenceError(_))));

        let missing = Schema::new("broken").as_reference();
        assert!(matches!(missing.validate(), Err(Error::ReferenceError(_))));
    }

    #[test]
    fn test_reference_type_outside_target_id_fails() {
        let schema = Schema::new("odd").field("other_id", Field::integer().reference_type("synapse"));
        assert!(matches!(schema.validate(), Err(Error::ReferenceError(_))));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FieldKind::List(Box::new(FieldKind::Integer)).to_string(), "List(Integer)");
        assert_eq!(
            Field::nested_many(IndexMap::new()).kind.to_string(),
            "Nested(many=true)"
        );
    }
}
