//! Memoizing registry for generated GraphQL types.
//!
//! Every generated type name is claimed here first, which is how two sources
//! asking for one name are detected. Collection output types, enums,
//! composite objects, condition inputs and connection types are cached so
//! that repeated requests hand back the same definition.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dynamic::Type;
use indexmap::IndexMap;
use octoql_model::{Collection, EnumType, ObjectType};
use parking_lot::Mutex;

use super::collection_type::CollectionOutputType;
use super::condition_types::ConditionType;
use super::connection::ConnectionTypes;
use super::output_types::EnumMapping;
use crate::error::SchemaError;
use crate::naming::{self, is_valid_graphql_name};

/// Names owned by the schema assembler itself.
const BUILT_IN_TYPES: &[&str] = &[
    "Query", "Node", "PageInfo", "JSON", "String", "Int", "Float", "Boolean", "ID",
];

#[derive(Default)]
struct RegistryState {
    /// GraphQL type name -> description of the claiming source.
    claimed: HashMap<String, String>,
    collection_types: IndexMap<String, Arc<CollectionOutputType>>,
    /// Enum GraphQL name -> (source definition, mapping).
    enums: HashMap<String, (Arc<EnumType>, Arc<EnumMapping>)>,
    /// Composite object GraphQL name -> source definition.
    objects: HashMap<String, Arc<ObjectType>>,
    conditions: HashMap<String, Option<Arc<ConditionType>>>,
    connections: HashMap<String, ConnectionTypes>,
    /// Generated types waiting to be registered with the schema.
    pending: Vec<Type>,
}

impl RegistryState {
    fn claim(&mut self, name: &str, owner: &str) -> Result<(), SchemaError> {
        if !is_valid_graphql_name(name) {
            return Err(SchemaError::InvalidName(name.to_string()));
        }
        match self.claimed.get(name) {
            Some(existing) if existing == owner => Ok(()),
            Some(existing) => Err(SchemaError::TypeNameConflict {
                name: name.to_string(),
                first: existing.clone(),
                second: owner.to_string(),
            }),
            None => {
                self.claimed.insert(name.to_string(), owner.to_string());
                Ok(())
            }
        }
    }

    /// Conflict between the recorded claimant of `name` and `owner`.
    fn conflict(&self, name: &str, owner: &str) -> SchemaError {
        let first = self
            .claimed
            .get(name)
            .cloned()
            .unwrap_or_else(|| "unknown source".to_string());
        let second = if first == owner {
            format!("a separate definition of {owner}")
        } else {
            owner.to_string()
        };
        SchemaError::TypeNameConflict {
            name: name.to_string(),
            first,
            second,
        }
    }
}

/// Registry for tracking generated GraphQL types.
pub struct TypeRegistry {
    state: Mutex<RegistryState>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry with the built-in names already claimed.
    pub fn new() -> Self {
        let mut state = RegistryState::default();
        for name in BUILT_IN_TYPES {
            state
                .claimed
                .insert((*name).to_string(), "built-in type".to_string());
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Claims a type name for `owner`. Claiming again with the same owner is
    /// a no-op.
    pub fn claim(&self, name: &str, owner: &str) -> Result<(), SchemaError> {
        self.state.lock().claim(name, owner)
    }

    /// Queues a generated type for registration with the schema.
    pub fn register(&self, ty: impl Into<Type>) {
        self.state.lock().pending.push(ty.into());
    }

    /// Takes all generated types for registration.
    pub fn take_types(&self) -> Vec<Type> {
        std::mem::take(&mut self.state.lock().pending)
    }

    /// Returns the cached output type of `collection`, creating its shell on
    /// first request.
    pub fn collection_type(
        &self,
        collection: &Arc<Collection>,
    ) -> Result<Arc<CollectionOutputType>, SchemaError> {
        let mut state = self.state.lock();
        if let Some(existing) = state.collection_types.get(&collection.name) {
            return Ok(Arc::clone(existing));
        }
        let type_name = naming::type_name(&collection.name)?;
        state.claim(&type_name, &format!("collection '{}'", collection.name))?;

        let output = Arc::new(CollectionOutputType::new(Arc::clone(collection), type_name));
        state
            .collection_types
            .insert(collection.name.clone(), Arc::clone(&output));
        Ok(output)
    }

    /// All collection output types created so far, in creation order.
    pub fn collection_types(&self) -> Vec<Arc<CollectionOutputType>> {
        self.state.lock().collection_types.values().cloned().collect()
    }

    /// Cached enum mapping for `name`, or the result of `build`.
    ///
    /// Enums are memoized by value: equal definitions share one type, a
    /// different definition claiming the same name is a conflict.
    pub fn enum_mapping<F>(
        &self,
        name: &str,
        definition: &Arc<EnumType>,
        owner: &str,
        build: F,
    ) -> Result<Arc<EnumMapping>, SchemaError>
    where
        F: FnOnce() -> Result<(EnumMapping, Type), SchemaError>,
    {
        let mut state = self.state.lock();
        if let Some((existing, mapping)) = state.enums.get(name) {
            if **existing == **definition {
                return Ok(Arc::clone(mapping));
            }
            return Err(state.conflict(name, owner));
        }
        state.claim(name, owner)?;
        let (mapping, ty) = build()?;
        let mapping = Arc::new(mapping);
        state
            .enums
            .insert(name.to_string(), (Arc::clone(definition), Arc::clone(&mapping)));
        state.pending.push(ty);
        Ok(mapping)
    }

    /// Claims a composite object name. Returns `true` when the caller must
    /// generate and register the object, `false` when it already exists.
    ///
    /// Objects carry accessor closures and are memoized by `Arc` identity.
    pub fn claim_object(
        &self,
        name: &str,
        definition: &Arc<ObjectType>,
        owner: &str,
    ) -> Result<bool, SchemaError> {
        let mut state = self.state.lock();
        if let Some(existing) = state.objects.get(name) {
            if Arc::ptr_eq(existing, definition) {
                return Ok(false);
            }
            return Err(state.conflict(name, owner));
        }
        state.claim(name, owner)?;
        state.objects.insert(name.to_string(), Arc::clone(definition));
        Ok(true)
    }

    /// Cached condition type of a collection (`Some(None)` when it has no
    /// filterable field).
    pub fn condition(&self, collection: &str) -> Option<Option<Arc<ConditionType>>> {
        self.state.lock().conditions.get(collection).cloned()
    }

    /// Stores a condition type; the first stored value wins and its input
    /// type is queued for registration.
    pub fn insert_condition(
        &self,
        collection: &str,
        condition: Option<(ConditionType, Type)>,
    ) -> Option<Arc<ConditionType>> {
        let mut state = self.state.lock();
        if let Some(existing) = state.conditions.get(collection) {
            return existing.clone();
        }
        let stored = condition.map(|(condition, ty)| {
            state.pending.push(ty);
            Arc::new(condition)
        });
        state
            .conditions
            .insert(collection.to_string(), stored.clone());
        stored
    }

    pub fn connection(&self, collection: &str) -> Option<ConnectionTypes> {
        self.state.lock().connections.get(collection).cloned()
    }

    /// Stores connection type names; the first stored value wins and its
    /// types are queued for registration.
    pub fn insert_connection(
        &self,
        collection: &str,
        names: ConnectionTypes,
        types: Vec<Type>,
    ) -> ConnectionTypes {
        let mut state = self.state.lock();
        if let Some(existing) = state.connections.get(collection) {
            return existing.clone();
        }
        state.pending.extend(types);
        state
            .connections
            .insert(collection.to_string(), names.clone());
        names
    }

    /// Whether any connection type has been generated.
    pub fn has_connections(&self) -> bool {
        !self.state.lock().connections.is_empty()
    }
}
