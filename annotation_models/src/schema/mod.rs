//! Annotation schemas
//!
//! Declarative field descriptions, the stock annotation types, schema
//! documents on disk, and the lookup contract the model synthesizer reads.

pub mod builtin;
pub mod file;
pub mod registry;
pub mod types;

pub use registry::{SchemaRegistry, SchemaSource};
pub use types::{
    AnnotationSchema, Field, FieldKind, FieldMetadata, NestedGroup, Schema, TARGET_ID_FIELD,
};
