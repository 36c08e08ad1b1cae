//! Build-wide context threaded through every synthesis step.

use std::fmt;
use std::sync::Arc;

use octoql_model::{Collection, Inventory};

use crate::error::SchemaError;
use crate::fields::FieldEntries;
use crate::schema::{CollectionOutputType, SchemaBuilderConfig, TypeRegistry};

/// Extension hook contributing extra fields to a collection type.
///
/// Returning `None` contributes nothing. The hook runs while the type's own
/// field list is being computed, so it must not call
/// [`CollectionOutputType::fields`] on the type it extends.
pub type FieldEntriesHook =
    Arc<dyn Fn(&CollectionOutputType, &BuildContext) -> Option<FieldEntries> + Send + Sync>;

/// Everything a synthesis step may consult: the model, the configuration,
/// the memoizing type registry and the optional extension hook.
pub struct BuildContext {
    inventory: Arc<Inventory>,
    config: SchemaBuilderConfig,
    registry: TypeRegistry,
    hook: Option<FieldEntriesHook>,
}

impl BuildContext {
    pub(crate) fn new(inventory: Arc<Inventory>, config: SchemaBuilderConfig) -> Self {
        Self {
            inventory,
            config,
            registry: TypeRegistry::new(),
            hook: None,
        }
    }

    pub(crate) fn set_hook(&mut self, hook: FieldEntriesHook) {
        self.hook = Some(hook);
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn config(&self) -> &SchemaBuilderConfig {
        &self.config
    }

    pub(crate) fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub(crate) fn hook(&self) -> Option<&FieldEntriesHook> {
        self.hook.as_ref()
    }

    pub fn collection(&self, name: &str) -> Result<&Arc<Collection>, SchemaError> {
        self.inventory
            .collection(name)
            .ok_or_else(|| SchemaError::UnknownCollection(name.to_string()))
    }

    /// The memoized output type of a collection. Creating it registers the
    /// type name only; fields are computed on first use.
    pub fn collection_type(&self, name: &str) -> Result<Arc<CollectionOutputType>, SchemaError> {
        let collection = self.collection(name)?;
        self.registry.collection_type(collection)
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("collections", &self.inventory.collections().count())
            .field("relations", &self.inventory.relations().len())
            .field("config", &self.config)
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}
