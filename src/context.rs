use std::sync::Arc;

use crate::{inject::ConverterRegistry, option::ProjectionOptions, schema::TypeCatalog};

/// Runtime state a worker supplies when it turns a
/// [`KvProjectorSupplier`](crate::projector::KvProjectorSupplier) into a live
/// projector.
#[derive(Debug, Clone)]
pub struct ProjectionContext {
    catalog: Arc<TypeCatalog>,
    converters: ConverterRegistry,
    options: ProjectionOptions,
}

impl ProjectionContext {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            converters: ConverterRegistry::default(),
            options: ProjectionOptions::default(),
        }
    }

    pub fn with_converters(self, converters: ConverterRegistry) -> Self {
        Self { converters, ..self }
    }

    pub fn with_options(self, options: ProjectionOptions) -> Self {
        Self { options, ..self }
    }

    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }
}

impl Default for ProjectionContext {
    fn default() -> Self {
        Self::new(Arc::new(TypeCatalog::new()))
    }
}
