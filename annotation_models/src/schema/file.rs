//! Schema documents on disk
//!
//! Schemas can be written as TOML, YAML or JSON documents of the shape
//!
//! ```toml
//! name = "synapse"
//!
//! [[fields]]
//! name = "pre_pt"
//! type = "nested"
//!
//!   [[fields.fields]]
//!   name = "position"
//!   type = "list"
//!   items = "integer"
//!   postgis_geometry = "POINTZ"
//!
//! [[fields]]
//! name = "size"
//! type = "float"
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::types::{Field, FieldKind, FieldMetadata, NestedGroup, Schema};
use crate::error::{Error, Result};

/// Top-level schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFile {
    pub name: String,
    #[serde(default)]
    pub reference: bool,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// One field entry of a schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Element type of a `list` field
    pub items: Option<String>,
    /// Sub-fields of a `nested` field
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub many: bool,
    #[serde(default)]
    pub index: bool,
    #[serde(default)]
    pub drop_column: bool,
    pub postgis_geometry: Option<String>,
    pub reference_type: Option<String>,
}

/// Document formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Toml,
    Yaml,
    Json,
}

impl SchemaFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(SchemaFormat::Toml),
            Some("yaml") | Some("yml") => Ok(SchemaFormat::Yaml),
            Some("json") => Ok(SchemaFormat::Json),
            _ => Err(Error::SerializationError(format!(
                "Unrecognized schema file extension: {}",
                path.display()
            ))),
        }
    }
}

/// Parse a schema document
pub fn parse(content: &str, format: SchemaFormat) -> Result<Schema> {
    let file: SchemaFile = match format {
        SchemaFormat::Toml => toml::from_str(content)
            .map_err(|e| Error::SerializationError(format!("Failed to parse schema: {}", e)))?,
        SchemaFormat::Yaml => serde_yaml::from_str(content)?,
        SchemaFormat::Json => serde_json::from_str(content)?,
    };

    file.into_schema()
}

/// Read and parse a schema document, choosing the format by extension
pub fn read(path: &Path) -> Result<Schema> {
    let format = SchemaFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    parse(&content, format)
}

impl SchemaFile {
    pub fn into_schema(self) -> Result<Schema> {
        let mut schema = Schema::new(self.name);
        schema.reference = self.reference;
        schema.fields = convert_fields(self.fields)?;
        Ok(schema)
    }
}

fn convert_fields(specs: Vec<FieldSpec>) -> Result<IndexMap<String, Field>> {
    let mut fields = IndexMap::with_capacity(specs.len());
    for spec in specs {
        let (name, field) = spec.into_field()?;
        fields.insert(name, field);
    }
    Ok(fields)
}

impl FieldSpec {
    fn into_field(self) -> Result<(String, Field)> {
        let kind = match self.kind.to_lowercase().as_str() {
            "nested" => FieldKind::Nested(NestedGroup {
                fields: convert_fields(self.fields)?,
                many: self.many,
            }),
            "list" => {
                let items = self.items.as_deref().ok_or_else(|| {
                    Error::SerializationError(format!("List field {} has no items type", self.name))
                })?;
                FieldKind::List(Box::new(FieldKind::from_tag(items)))
            }
            _ => FieldKind::from_tag(&self.kind),
        };

        let field = Field {
            kind,
            metadata: FieldMetadata {
                index: self.index,
                drop_column: self.drop_column,
                postgis_geometry: self.postgis_geometry,
                reference_type: self.reference_type,
            },
        };

        Ok((self.name, field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin;
    use pretty_assertions::assert_eq;

    const SYNAPSE_TOML: &str = r#"
        name = "synapse"

        [[fields]]
        name = "pre_pt"
        type = "nested"

          [[fields.fields]]
          name = "position"
          type = "list"
          items = "integer"
          postgis_geometry = "POINTZ"

          [[fields.fields]]
          name = "supervoxel_id"
          type = "numeric"
          index = true

          [[fields.fields]]
          name = "root_id"
          type = "numeric"
          index = true

        [[fields]]
        name = "ctr_pt"
        type = "nested"

          [[fields.fields]]
          name = "position"
          type = "list"
          items = "integer"
          postgis_geometry = "POINTZ"

        [[fields]]
        name = "post_pt"
        type = "nested"

          [[fields.fields]]
          name = "position"
          type = "list"
          items = "integer"
          postgis_geometry = "POINTZ"

          [[fields.fields]]
          name = "supervoxel_id"
          type = "numeric"
          index = true

          [[fields.fields]]
          name = "root_id"
          type = "numeric"
          index = true

        [[fields]]
        name = "size"
        type = "float"
    "#;

    #[test]
    fn test_toml_matches_stock_synapse() {
        let schema = parse(SYNAPSE_TOML, SchemaFormat::Toml).unwrap();
        assert_eq!(schema, builtin::synapse());
    }

    #[test]
    fn test_yaml_reference_schema() {
        let yaml = r#"
name: presynaptic_bouton_type
reference: true
fields:
  - name: target_id
    type: integer
    reference_type: synapse
  - name: bouton_type
    type: string
"#;
        let schema = parse(yaml, SchemaFormat::Yaml).unwrap();
        assert_eq!(schema, builtin::presynaptic_bouton_type());
    }

    #[test]
    fn test_json_unknown_type_is_kept() {
        let json = r#"{"name": "timed", "fields": [{"name": "seen_at", "type": "DateTime"}]}"#;
        let schema = parse(json, SchemaFormat::Json).unwrap();
        assert_eq!(
            schema.fields["seen_at"].kind,
            FieldKind::Other("DateTime".to_string())
        );
    }

    #[test]
    fn test_list_without_items_fails() {
        let json = r#"{"name": "bad", "fields": [{"name": "pts", "type": "list"}]}"#;
        assert!(matches!(
            parse(json, SchemaFormat::Json),
            Err(Error::SerializationError(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SchemaFormat::from_path(Path::new("a/b.yml")).unwrap(), SchemaFormat::Yaml);
        assert_eq!(SchemaFormat::from_path(Path::new("b.toml")).unwrap(), SchemaFormat::Toml);
        assert!(SchemaFormat::from_path(Path::new("b.txt")).is_err());
    }
}
