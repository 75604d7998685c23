//! annotation_models: per-dataset table models for annotation schemas
//!
//! Annotation types are described by declarative schemas (built in code, derived
//! from Rust structs, or loaded from TOML/YAML/JSON documents). For every
//! `(dataset, annotation_type)` pair the [`ModelSynthesizer`] produces an
//! [`AnnotationModel`] describing the table `{dataset}_{annotation_type}`, and
//! caches it in a [`ModelRegistry`] so that each model exists exactly once.
//! Models can be rendered as PostGIS DDL and created in a PostgreSQL database.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod utils;

// Re-export main types for easier access
pub use annotation_models_macros::AnnotationSchema;
pub use config::Config;
pub use db::{DatabaseConnection, DdlGenerator, SqlExecutor};
pub use error::{Error, Result};
pub use models::{AnnotationModel, ModelRegistry, ModelSet, ModelSynthesizer};
pub use schema::{AnnotationSchema, Schema, SchemaRegistry, SchemaSource};

/// Load configuration from a file and build a catalog from it
pub fn init(config_path: &str) -> Result<ModelCatalog> {
    let config = config::load_from_file(config_path)?;
    ModelCatalog::new(config)
}

/// Schemas, generated models and configuration bundled together
pub struct ModelCatalog {
    config: Config,
    schemas: SchemaRegistry,
    models: ModelRegistry,
}

impl ModelCatalog {
    /// Create a catalog, loading the schemas the configuration names
    pub fn new(config: Config) -> Result<Self> {
        let mut schemas = if config.schemas.include_builtin {
            SchemaRegistry::builtin()
        } else {
            SchemaRegistry::new()
        };

        for pattern in &config.schemas.paths {
            let loaded = schemas.load_glob(pattern)?;
            if loaded == 0 {
                tracing::warn!(pattern = %pattern, "Schema path pattern matched no files");
            }
        }

        Ok(Self {
            config,
            schemas,
            models: ModelRegistry::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// A synthesizer over this catalog's schemas and model registry
    pub fn synthesizer(&self) -> ModelSynthesizer<'_, SchemaRegistry> {
        ModelSynthesizer::new(&self.schemas, &self.models).with_naming(self.config.naming.clone())
    }

    /// Synthesize the model of one annotation type
    pub fn synthesize(
        &self,
        dataset: &str,
        annotation_type: &str,
    ) -> Result<std::sync::Arc<AnnotationModel>> {
        self.synthesizer().synthesize(dataset, annotation_type)
    }

    /// Synthesize every model of the configured datasets
    pub fn synthesize_configured(&self) -> Result<ModelSet> {
        let models = &self.config.models;
        if models.datasets.is_empty() {
            return Err(Error::ConfigError("No datasets configured".to_string()));
        }
        self.synthesizer()
            .synthesize_all(&models.datasets, models.include_root_entity)
    }

    /// DDL statements creating every model of a model set
    pub fn generate_ddl(&self, model_set: &ModelSet) -> Vec<String> {
        DdlGenerator::new().create_model_set_sql(model_set)
    }

    /// Create the tables of a model set in the configured database
    pub async fn create_tables(&self, model_set: &ModelSet) -> Result<()> {
        let database = self
            .config
            .database
            .as_ref()
            .ok_or_else(|| Error::ConfigError("No [database] section configured".to_string()))?;

        let connection = DatabaseConnection::connect(database).await?;
        let statements = self.generate_ddl(model_set);
        SqlExecutor::new(connection).execute_batch(&statements).await
    }
}
