//! Model synthesis
//!
//! Builds per-dataset models from annotation schemas and caches them in a
//! caller-owned [`ModelRegistry`].

use std::collections::BTreeMap;
use std::sync::Arc;

use super::columns::TableBuilder;
use super::model::{AnnotationModel, ModelKind};
use super::registry::ModelRegistry;
use super::table::Table;
use crate::config::NamingConfig;
use crate::error::Result;
use crate::schema::{builtin, Schema, SchemaSource};
use crate::utils::naming;

/// Key under which the root entity model appears in a [`ModelSet`]
pub const ROOT_ENTITY_KEY: &str = "cellsegment";

/// Models grouped by dataset, then by annotation type
pub type ModelSet = BTreeMap<String, BTreeMap<String, Arc<AnnotationModel>>>;

/// Synthesizes annotation models from a schema source
pub struct ModelSynthesizer<'a, S: SchemaSource + ?Sized> {
    schemas: &'a S,
    registry: &'a ModelRegistry,
    naming: NamingConfig,
}

impl<'a, S: SchemaSource + ?Sized> ModelSynthesizer<'a, S> {
    /// Create a synthesizer reading `schemas` and caching into `registry`
    pub fn new(schemas: &'a S, registry: &'a ModelRegistry) -> Self {
        Self {
            schemas,
            registry,
            naming: NamingConfig::default(),
        }
    }

    /// Use custom index and constraint naming
    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    /// Model of `annotation_type` within `dataset`.
    ///
    /// The schema lookup's own error is returned as-is for unknown types.
    pub fn synthesize(&self, dataset: &str, annotation_type: &str) -> Result<Arc<AnnotationModel>> {
        naming::validate_identifier("dataset", dataset)?;
        naming::validate_identifier("annotation type", annotation_type)?;
        let schema = self.schemas.get_schema(annotation_type)?;
        self.synthesize_from_schema(dataset, annotation_type, &schema)
    }

    /// Model of `annotation_type` within `dataset`, built from a schema supplied directly
    pub fn synthesize_from_schema(
        &self,
        dataset: &str,
        annotation_type: &str,
        schema: &Schema,
    ) -> Result<Arc<AnnotationModel>> {
        naming::validate_identifier("dataset", dataset)?;
        naming::validate_identifier("annotation type", annotation_type)?;

        let model_name = naming::model_name(dataset, annotation_type);
        let table_name = naming::table_name(dataset, annotation_type);

        let model = self.registry.get_or_try_insert_with(&model_name, || {
            let table = self.build_table(dataset, &table_name, schema)?;
            tracing::debug!(
                dataset,
                annotation_type,
                table = %table_name,
                columns = table.columns.len(),
                "Synthesized annotation model"
            );
            Ok(AnnotationModel {
                name: model_name.clone(),
                dataset: dataset.to_string(),
                annotation_type: annotation_type.to_string(),
                kind: ModelKind::Annotation,
                table,
            })
        })?;

        warn_on_alias(&model, &table_name);
        Ok(model)
    }

    /// The dataset's root entity model: only the `id` primary key
    pub fn synthesize_root_entity(&self, dataset: &str) -> Result<Arc<AnnotationModel>> {
        naming::validate_identifier("dataset", dataset)?;

        let model_name = naming::root_model_name(dataset);
        let table_name = naming::root_table_name(dataset);

        let model = self.registry.get_or_try_insert_with(&model_name, || {
            tracing::debug!(dataset, table = %table_name, "Synthesized root entity model");
            Ok(AnnotationModel {
                name: model_name.clone(),
                dataset: dataset.to_string(),
                annotation_type: naming::ROOT_MODEL_NAME.to_string(),
                kind: ModelKind::RootEntity,
                table: Table::with_id_primary_key(&table_name),
            })
        })?;

        warn_on_alias(&model, &table_name);
        Ok(model)
    }

    /// Models of every known annotation type for each dataset.
    ///
    /// With `include_root_entity`, each dataset also gets its root entity
    /// (under `"cellsegment"`) and the stock `contact` model.
    pub fn synthesize_all<D: AsRef<str>>(
        &self,
        datasets: &[D],
        include_root_entity: bool,
    ) -> Result<ModelSet> {
        let types = self.schemas.get_types();
        let mut model_set = ModelSet::new();

        for dataset in datasets {
            let dataset = dataset.as_ref();
            let mut models = BTreeMap::new();

            for annotation_type in &types {
                let model = self.synthesize(dataset, annotation_type)?;
                models.insert(annotation_type.clone(), model);
            }

            if include_root_entity {
                models.insert(
                    ROOT_ENTITY_KEY.to_string(),
                    self.synthesize_root_entity(dataset)?,
                );
                let contact = builtin::contact();
                models.insert(
                    builtin::CONTACT.to_string(),
                    self.synthesize_from_schema(dataset, builtin::CONTACT, &contact)?,
                );
            }

            tracing::info!(dataset, models = models.len(), "Synthesized dataset models");
            model_set.insert(dataset.to_string(), models);
        }

        Ok(model_set)
    }

    fn build_table(&self, dataset: &str, table_name: &str, schema: &Schema) -> Result<Table> {
        let mut builder = TableBuilder::new(dataset, table_name, &self.naming);

        for (name, field) in &schema.fields {
            builder.add_field(name, field)?;
        }

        if let Some(reference_type) = schema.reference_target()? {
            builder.set_reference_target(reference_type);
        }

        Ok(builder.finish())
    }
}

// Model names collapse case, so a cached model may belong to another table.
fn warn_on_alias(model: &AnnotationModel, requested_table: &str) {
    if model.table.name != requested_table {
        tracing::warn!(
            model = %model.name,
            registered_table = %model.table.name,
            requested_table,
            "Model name is already registered for a different table"
        );
    }
}
