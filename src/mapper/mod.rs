//! Mapping Engine
//!
//! Turns a [`CodeModel`] into a resolved [`Client`]. All per-run state lives in
//! a [`MappingContext`]: one identity-keyed cache per schema kind, the model
//! arena and the method-group cache. A fresh context is built for every run,
//! so nothing leaks between independent generations.

pub mod client;
pub mod factory;
pub mod method;
pub mod method_group;
pub mod model;
pub mod parameter;
pub mod schema;
pub mod service_client;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use std::thread::{self, ThreadId};

use thiserror::Error;
use tracing::{debug, info};

use crate::clientmodel::{Client, ClientModel, ClientType, MethodGroupClient, ModelId};
use crate::codemodel::{CodeModel, SchemaId};
use crate::settings::Settings;

pub use factory::{
    factory_for, AndroidMapperFactory, DefaultMapperFactory, Flavor, FluentMapperFactory, MapperFactory,
};

#[derive(Debug, Error)]
pub enum MapperError {
    /// Schema kind no mapper handles
    #[error("unsupported schema: {key}")]
    UnsupportedSchema { key: String },

    /// A schema handle that points outside the schema arena
    #[error("dangling schema reference {id}")]
    DanglingReference { id: SchemaId },

    /// A setting required for the requested construct is absent
    #[error("missing required setting '{setting}' for {context}")]
    MissingSetting { setting: String, context: String },

    /// Flavor configuration that cannot be resolved for the package
    #[error("cannot resolve flavor configuration for package '{package}'")]
    AmbiguousFlavor { package: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MapperError>;

/// Identity-keyed memoization cache for one schema kind.
///
/// Get-or-compute is atomic per key: the first inserted value wins and every
/// caller observes that same `Arc`.
#[derive(Debug, Default)]
pub struct TypeCache {
    entries: RwLock<HashMap<SchemaId, Arc<ClientType>>>,
}

impl TypeCache {
    pub fn get(&self, id: SchemaId) -> Option<Arc<ClientType>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Insert unless another caller got there first; returns the cached value.
    pub fn insert(&self, id: SchemaId, value: Arc<ClientType>) -> Arc<ClientType> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(value)
            .clone()
    }

    /// Insert a value built under the write lock; the flag tells whether this
    /// call inserted it. Used for placeholders that must be allocated once.
    pub fn get_or_insert_with(&self, id: SchemaId, make: impl FnOnce() -> ClientType) -> (Arc<ClientType>, bool) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(&id) {
            return (existing.clone(), false);
        }
        let value = Arc::new(make());
        entries.insert(id, value.clone());
        (value, true)
    }

    /// Compute outside the lock, then insert first-wins.
    pub fn get_or_compute(
        &self,
        id: SchemaId,
        compute: impl FnOnce() -> Result<ClientType>,
    ) -> Result<Arc<ClientType>> {
        if let Some(cached) = self.get(id) {
            return Ok(cached);
        }
        let computed = Arc::new(compute()?);
        Ok(self.insert(id, computed))
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Per-kind caches.
#[derive(Debug, Default)]
pub struct SchemaCaches {
    pub primitive: TypeCache,
    pub array: TypeCache,
    pub dictionary: TypeCache,
    pub choice: TypeCache,
    pub sealed_choice: TypeCache,
    pub object: TypeCache,
    pub constant: TypeCache,
    pub any: TypeCache,
    pub binary: TypeCache,
    pub union: TypeCache,
}

impl SchemaCaches {
    fn clear(&self) {
        for cache in [
            &self.primitive,
            &self.array,
            &self.dictionary,
            &self.choice,
            &self.sealed_choice,
            &self.object,
            &self.constant,
            &self.any,
            &self.binary,
            &self.union,
        ] {
            cache.clear();
        }
    }
}

/// Everything one generation run reads and memoizes.
pub struct MappingContext<'a> {
    pub code_model: &'a CodeModel,
    pub settings: &'a Settings,
    pub factory: &'a dyn MapperFactory,
    pub caches: SchemaCaches,
    /// Model arena; a slot is `None` between placeholder allocation and fill-in
    models: RwLock<Vec<Option<ClientModel>>>,
    method_groups: RwLock<HashMap<String, Arc<MethodGroupClient>>>,
    /// Unions under resolution, per thread
    unions_in_progress: Mutex<HashSet<(ThreadId, SchemaId)>>,
    client_property_names: OnceLock<HashSet<String>>,
}

impl<'a> MappingContext<'a> {
    pub fn new(code_model: &'a CodeModel, settings: &'a Settings, factory: &'a dyn MapperFactory) -> Self {
        Self {
            code_model,
            settings,
            factory,
            caches: SchemaCaches::default(),
            models: RwLock::new(Vec::new()),
            method_groups: RwLock::new(HashMap::new()),
            unions_in_progress: Mutex::new(HashSet::new()),
            client_property_names: OnceLock::new(),
        }
    }

    /// Drop every memoized entry.
    pub fn reset(&self) {
        self.caches.clear();
        self.models.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.method_groups.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.unions_in_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Property names of client-level parameters, shared by every method.
    pub fn client_property_names(&self) -> &HashSet<String> {
        self.client_property_names.get_or_init(|| {
            self.code_model
                .all_operations()
                .flat_map(|(_, operation)| operation.parameters.iter())
                .filter(|p| p.is_client())
                .map(|p| crate::naming::get_property_name(&p.name))
                .collect()
        })
    }

    /// Map a schema slot; `None` in, `None` out.
    pub fn map_schema(&self, schema: Option<SchemaId>) -> Result<Option<Arc<ClientType>>> {
        schema::map(self, schema)
    }

    /// Map a schema that must be present.
    pub fn map_type(&self, schema: SchemaId) -> Result<Arc<ClientType>> {
        schema::map_required(self, schema)
    }

    // ------------------------------------------------------------------------
    // Model arena
    // ------------------------------------------------------------------------

    /// Reserve a model slot to be filled in later.
    pub fn allocate_model(&self) -> ModelId {
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        models.push(None);
        ModelId(models.len() - 1)
    }

    pub fn store_model(&self, model: ClientModel) {
        let mut models = self.models.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = models.get_mut(model.id.0) {
            *slot = Some(model);
        }
    }

    pub fn model(&self, id: ModelId) -> Option<ClientModel> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.0)
            .cloned()
            .flatten()
    }

    /// Every model, failing if any placeholder was never filled in.
    pub fn finished_models(&self) -> Result<Vec<ClientModel>> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.clone()
                    .ok_or_else(|| MapperError::InvalidInput(format!("model #{i} was never resolved")))
            })
            .collect()
    }

    pub fn model_count(&self) -> usize {
        self.models.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    // ------------------------------------------------------------------------
    // Method groups
    // ------------------------------------------------------------------------

    pub fn cached_method_group(&self, name: &str) -> Option<Arc<MethodGroupClient>> {
        self.method_groups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn cache_method_group(&self, name: &str, group: Arc<MethodGroupClient>) -> Arc<MethodGroupClient> {
        self.method_groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert(group)
            .clone()
    }

    // ------------------------------------------------------------------------
    // Union cycle tracking
    // ------------------------------------------------------------------------

    /// Mark a union as under resolution; false when it already is on this thread.
    pub(crate) fn enter_union(&self, id: SchemaId) -> bool {
        self.unions_in_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((thread::current().id(), id))
    }

    pub(crate) fn leave_union(&self, id: SchemaId) {
        self.unions_in_progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(thread::current().id(), id));
    }
}

/// Run the whole mapping pipeline with the given flavor.
pub fn map_code_model(code_model: &CodeModel, settings: &Settings, factory: &dyn MapperFactory) -> Result<Client> {
    settings.validate()?;
    code_model.check_references()?;

    info!(
        flavor = ?factory.flavor(),
        schemas = code_model.schemas.len(),
        groups = code_model.operation_groups.len(),
        "mapping code model '{}'",
        code_model.name
    );

    let ctx = MappingContext::new(code_model, settings, factory);
    let client = factory.map_client(&ctx)?;

    debug!(
        models = client.models.len(),
        enums = client.enums.len(),
        exceptions = client.exceptions.len(),
        "mapped client '{}'",
        client.client_name
    );
    Ok(client)
}
