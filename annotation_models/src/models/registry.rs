//! Model registry
//!
//! Holds every model synthesized so far, keyed by model name. A model is
//! created at most once per name and then shared for the life of the registry.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::AnnotationModel;
use crate::error::Result;

/// Registry of synthesized models
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Mutex<HashMap<String, Arc<AnnotationModel>>>,
}

impl ModelRegistry {
    /// Create an empty model registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a registered model by name
    pub fn get(&self, name: &str) -> Option<Arc<AnnotationModel>> {
        self.models.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.lock().contains_key(name)
    }

    /// Return the model registered under `name`, building and registering it first if absent.
    ///
    /// The lock is held while `build` runs, so concurrent first requests for a
    /// name yield one model. A failed build registers nothing.
    pub fn get_or_try_insert_with<F>(&self, name: &str, build: F) -> Result<Arc<AnnotationModel>>
    where
        F: FnOnce() -> Result<AnnotationModel>,
    {
        let mut models = self.models.lock();
        if let Some(model) = models.get(name) {
            tracing::trace!(model = name, "Model registry hit");
            return Ok(Arc::clone(model));
        }

        let model = Arc::new(build()?);
        models.insert(name.to_string(), Arc::clone(&model));
        tracing::debug!(model = name, table = %model.table.name, "Registered model");
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.models.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.lock().is_empty()
    }

    /// Sorted names of all registered models
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.lock().keys().cloned().collect();
        names.sort();
        names
    }
}
