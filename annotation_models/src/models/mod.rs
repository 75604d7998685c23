//! Annotation models
//!
//! Table descriptions generated from schemas, the registry that caches them,
//! and the synthesizer that builds them.

pub mod columns;
pub mod model;
pub mod registry;
pub mod synthesizer;
pub mod table;

pub use model::{AnnotationModel, ModelKind};
pub use registry::ModelRegistry;
pub use synthesizer::{ModelSet, ModelSynthesizer, ROOT_ENTITY_KEY};
pub use table::{Column, ColumnType, ForeignKey, Index, PrimaryKey, Table};
