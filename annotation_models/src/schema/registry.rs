//! Schema lookup
//!
//! The model synthesizer only needs two things from a schema provider: resolve
//! a type name to its schema, and enumerate the known type names.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use super::builtin;
use super::file;
use super::types::{AnnotationSchema, Schema};
use crate::error::{Error, Result};
use crate::utils::naming;

/// A provider of annotation schemas
pub trait SchemaSource {
    /// Resolve an annotation type name to its schema
    fn get_schema(&self, annotation_type: &str) -> Result<Arc<Schema>>;

    /// All annotation type names this source knows
    fn get_types(&self) -> BTreeSet<String>;
}

/// In-memory schema source
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Create an empty schema registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the stock annotation types
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for schema in builtin::all() {
            registry.schemas.insert(schema.name.clone(), Arc::new(schema));
        }
        registry
    }

    /// Register a schema under its own name, replacing any previous one
    pub fn register(&mut self, schema: Schema) -> Result<()> {
        naming::validate_identifier("annotation type", &schema.name)?;
        schema.validate()?;
        tracing::debug!(annotation_type = %schema.name, fields = schema.fields.len(), "Registered schema");
        self.schemas.insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    /// Register the schema described by a Rust type
    pub fn register_type<T: AnnotationSchema>(&mut self) -> Result<()> {
        self.register(T::schema())
    }

    /// Load a single TOML/YAML/JSON schema document
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let schema = file::read(path)?;
        tracing::info!(path = %path.display(), annotation_type = %schema.name, "Loaded schema file");
        self.register(schema)
    }

    /// Load every schema document matching a glob pattern, in path order
    pub fn load_glob(&mut self, pattern: &str) -> Result<usize> {
        let mut paths = Vec::new();
        for entry in glob::glob(pattern)? {
            let path = entry.map_err(|e| Error::IoError(e.into()))?;
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }

        Ok(paths.len())
    }

    pub fn contains(&self, annotation_type: &str) -> bool {
        self.schemas.contains_key(annotation_type)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaSource for SchemaRegistry {
    fn get_schema(&self, annotation_type: &str) -> Result<Arc<Schema>> {
        self.schemas
            .get(annotation_type)
            .cloned()
            .ok_or_else(|| Error::SchemaNotFound(annotation_type.to_string()))
    }

    fn get_types(&self) -> BTreeSet<String> {
        self.schemas.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Field;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_types() {
        let registry = SchemaRegistry::builtin();
        let types = registry.get_types();

        assert!(types.contains("synapse"));
        assert!(types.contains("presynaptic_bouton_type"));
        assert!(!types.contains(builtin::CONTACT));
        assert_eq!(types.len(), builtin::all().len());
    }

    #[test]
    fn test_unknown_schema() {
        let registry = SchemaRegistry::builtin();
        match registry.get_schema("no_such_type") {
            Err(Error::SchemaNotFound(name)) => assert_eq!(name, "no_such_type"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_register_rejects_malformed_reference() {
        let mut registry = SchemaRegistry::new();
        let schema = Schema::new("broken").as_reference().field("target_id", Field::integer());

        assert!(matches!(registry.register(schema), Err(Error::ReferenceError(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_unusable_type_name() {
        let mut registry = SchemaRegistry::new();
        let schema = Schema::new("cell-type").field("label", Field::string());

        assert!(matches!(registry.register(schema), Err(Error::IdentifierError(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_glob_rejects_unusable_type_name() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("cell_type.yaml"),
            "name: cell-type\nfields:\n  - name: label\n    type: string\n",
        )
        .unwrap();

        let mut registry = SchemaRegistry::new();
        let pattern = format!("{}/*.yaml", dir.path().display());

        assert!(matches!(registry.load_glob(&pattern), Err(Error::IdentifierError(_))));
        assert!(!registry.contains("cell-type"));
    }

    #[test]
    fn test_load_glob() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("tag.toml"),
            "name = \"tag\"\n[[fields]]\nname = \"tag\"\ntype = \"string\"\nindex = true\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("score.yaml"),
            "name: score\nfields:\n  - name: value\n    type: float\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();

        let mut registry = SchemaRegistry::new();
        let pattern = format!("{}/*.*ml", dir.path().display());
        let loaded = registry.load_glob(&pattern).unwrap();

        assert_eq!(loaded, 2);
        assert!(registry.contains("tag"));
        assert!(registry.contains("score"));
        assert!(registry.get_schema("tag").unwrap().fields["tag"].metadata.index);
    }
}
