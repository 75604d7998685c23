//! Generated annotation models

use serde::Serialize;

use super::table::{Column, ForeignKey, PrimaryKey, Table};

/// What a generated model maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Rows of an annotation type
    Annotation,
    /// A dataset's root segment entity
    RootEntity,
}

/// A table mapping synthesized for one `(dataset, annotation_type)` pair.
///
/// Models are shared through the [`ModelRegistry`](super::ModelRegistry) as
/// `Arc<AnnotationModel>`; callers compare identity with `Arc::ptr_eq`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationModel {
    /// Registry key, `Capitalize(dataset) + Capitalize(annotation_type)`
    pub name: String,
    pub dataset: String,
    pub annotation_type: String,
    pub kind: ModelKind,
    pub table: Table,
}

impl AnnotationModel {
    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    /// Models of one dataset share a polymorphic identity
    pub fn polymorphic_identity(&self) -> &str {
        &self.dataset
    }

    pub fn columns(&self) -> &[Column] {
        &self.table.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.table.column(name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.table.primary_key.as_ref()
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.table.foreign_keys
    }

    /// Geometry columns
    pub fn spatial_columns(&self) -> Vec<&Column> {
        self.table
            .columns
            .iter()
            .filter(|c| c.column_type.is_spatial())
            .collect()
    }

    /// Columns carrying a single-column index
    pub fn indexed_columns(&self) -> Vec<&str> {
        self.table
            .columns
            .iter()
            .filter(|c| self.table.is_indexed(&c.name))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Tables this model's foreign keys point at, without duplicates
    pub fn referenced_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for fk in &self.table.foreign_keys {
            if !tables.contains(&fk.ref_table.as_str()) {
                tables.push(&fk.ref_table);
            }
        }
        tables
    }
}
