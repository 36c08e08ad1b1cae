//! Collections: named entity types with optional key and pagination support.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ModelError, Result};
use crate::paginator::Paginator;
use crate::value_type::{Field, ObjectType};

/// Loads a single value by its key.
#[async_trait]
pub trait RecordReader: Send + Sync {
    async fn read(&self, key: &[Value]) -> Result<Option<Value>>;
}

/// Predicate deciding whether a value belongs to a collection.
pub type IsTypeOf = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// An ordered list of field names whose combined values identify a value.
#[derive(Clone)]
pub struct CollectionKey {
    pub field_names: Vec<String>,
    pub reader: Option<Arc<dyn RecordReader>>,
}

impl CollectionKey {
    pub fn new(field_names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            field_names: field_names.into_iter().map(Into::into).collect(),
            reader: None,
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn RecordReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Checks that a key value list has this key's arity.
    pub fn check_arity(&self, key: &[Value]) -> Result<()> {
        if key.len() == self.field_names.len() {
            Ok(())
        } else {
            Err(ModelError::KeyArity {
                expected: self.field_names.len(),
                actual: key.len(),
            })
        }
    }
}

impl fmt::Debug for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionKey")
            .field("field_names", &self.field_names)
            .field("has_reader", &self.reader.is_some())
            .finish()
    }
}

/// A named entity type.
#[derive(Clone)]
pub struct Collection {
    pub name: String,
    pub description: Option<String>,
    pub object_type: Arc<ObjectType>,
    pub primary_key: Option<CollectionKey>,
    pub paginator: Option<Arc<dyn Paginator>>,
    is_type_of: Option<IsTypeOf>,
}

impl Collection {
    pub fn new(name: impl Into<String>, object_type: Arc<ObjectType>) -> Self {
        Self {
            name: name.into(),
            description: None,
            object_type,
            primary_key: None,
            paginator: None,
            is_type_of: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_primary_key(mut self, key: CollectionKey) -> Self {
        self.primary_key = Some(key);
        self
    }

    pub fn with_paginator(mut self, paginator: Arc<dyn Paginator>) -> Self {
        self.paginator = Some(paginator);
        self
    }

    pub fn with_is_type_of<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.is_type_of = Some(Arc::new(predicate));
        self
    }

    /// Whether connection fields over this collection can be built.
    pub fn supports_connections(&self) -> bool {
        self.paginator
            .as_ref()
            .is_some_and(|p| p.has_connection_support())
    }

    /// Applies the collection's own membership predicate; `true` when absent.
    pub fn accepts(&self, value: &Value) -> bool {
        self.is_type_of.as_ref().is_none_or(|f| f(value))
    }

    /// Resolves the primary key field names to fields of the collection type.
    pub fn primary_key_fields(&self) -> Option<Result<Vec<&Field>>> {
        self.primary_key.as_ref().map(|key| {
            key.field_names
                .iter()
                .map(|name| {
                    self.object_type.field(name).ok_or_else(|| {
                        ModelError::definition(format!(
                            "primary key of '{}' references unknown field '{}'",
                            self.name, name
                        ))
                    })
                })
                .collect()
        })
    }

    /// Reads the primary key values of `value` in key order.
    pub fn key_of(&self, value: &Value) -> Result<Option<Vec<Value>>> {
        match self.primary_key_fields() {
            None => Ok(None),
            Some(fields) => fields?
                .into_iter()
                .map(|f| f.get(value))
                .collect::<Result<Vec<_>>>()
                .map(Some),
        }
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("object_type", &self.object_type.name)
            .field("primary_key", &self.primary_key)
            .field("paginated", &self.paginator.is_some())
            .finish()
    }
}
