//! The API root: catalog, store, global hooks and the exposed entities.

use crate::config::ResolvedConfig;
use crate::entity::{Entity, EntityOptions};
use crate::error::{ApiError, ConfigError};
use crate::hooks::{Hook, HookRegistry};
use crate::schema::Catalog;
use crate::store::Store;
use std::collections::HashSet;
use std::sync::Arc;

/// Wired API. Immutable once built; clone the `Arc`s to share.
#[derive(Debug)]
pub struct Api {
    catalog: Arc<Catalog>,
    hooks: Arc<HookRegistry>,
    entities: Vec<Arc<Entity>>,
}

impl Api {
    pub fn builder(catalog: Arc<Catalog>, store: Arc<dyn Store>) -> ApiBuilder {
        ApiBuilder::new(catalog, store)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn entities(&self) -> &[Arc<Entity>] {
        &self.entities
    }

    /// Entity by plural name.
    pub fn entity(&self, plural: &str) -> Option<&Arc<Entity>> {
        self.entities.iter().find(|e| e.name().plural == plural)
    }
}

pub struct ApiBuilder {
    catalog: Arc<Catalog>,
    store: Arc<dyn Store>,
    hooks: HookRegistry,
    entities: Vec<(String, EntityOptions)>,
}

impl ApiBuilder {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn Store>) -> Self {
        ApiBuilder {
            catalog,
            store,
            hooks: HookRegistry::new(),
            entities: Vec::new(),
        }
    }

    /// Wire an API from a resolved declarative config.
    pub fn from_config(config: ResolvedConfig, store: Arc<dyn Store>) -> Self {
        let mut builder = ApiBuilder::new(Arc::new(config.catalog), store);
        for hook in config.hooks {
            builder = builder.hook(hook);
        }
        for (model, options) in config.entities {
            builder = builder.entity(model, options);
        }
        builder
    }

    /// Register a global hook; global hooks run before entity hooks.
    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.register(hook);
        self
    }

    /// Expose a catalog model as an entity.
    pub fn entity(mut self, model: impl Into<String>, options: EntityOptions) -> Self {
        self.entities.push((model.into(), options));
        self
    }

    pub fn build(self) -> Result<Api, ApiError> {
        let hooks = Arc::new(self.hooks);
        let mut seen = HashSet::new();
        let mut entities = Vec::with_capacity(self.entities.len());
        for (model_name, options) in self.entities {
            let model = self.catalog.get(&model_name).ok_or(ConfigError::MissingReference {
                kind: "model",
                id: model_name.clone(),
            })?;
            let entity = Entity::new(model, self.catalog.clone(), self.store.clone(), hooks.clone(), options);
            if !seen.insert(entity.name().plural.clone()) {
                return Err(ConfigError::Duplicate {
                    kind: "entity",
                    name: entity.name().plural.clone(),
                }
                .into());
            }
            tracing::debug!(entity = %entity.name().plural, model = %model_name, "entity registered");
            entities.push(Arc::new(entity));
        }
        Ok(Api {
            catalog: self.catalog,
            hooks,
            entities,
        })
    }
}
