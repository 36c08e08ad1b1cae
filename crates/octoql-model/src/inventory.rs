//! Registry of collections and relations making up one data model.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::collection::Collection;
use crate::error::{ModelError, Result};
use crate::relation::Relation;

/// The assembled data model.
///
/// Collections keep their registration order, as do relations; both orders
/// drive the order of generated schema types and fields.
#[derive(Debug, Default, Clone)]
pub struct Inventory {
    collections: IndexMap<String, Arc<Collection>>,
    relations: Vec<Arc<Relation>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_collection(&mut self, collection: Collection) -> Result<Arc<Collection>> {
        if self.collections.contains_key(&collection.name) {
            return Err(ModelError::DuplicateCollection(collection.name));
        }
        trace!(collection = %collection.name, "Registered collection");
        let collection = Arc::new(collection);
        self.collections
            .insert(collection.name.clone(), Arc::clone(&collection));
        Ok(collection)
    }

    /// Registers a relation; both ends must already be registered.
    pub fn add_relation(&mut self, relation: Relation) -> Result<Arc<Relation>> {
        for end in [&relation.head, &relation.tail] {
            if !self.collections.contains_key(end) {
                return Err(ModelError::UnknownCollection(end.clone()));
            }
        }
        trace!(
            relation = %relation.name,
            head = %relation.head,
            tail = %relation.tail,
            "Registered relation"
        );
        let relation = Arc::new(relation);
        self.relations.push(Arc::clone(&relation));
        Ok(relation)
    }

    pub fn collection(&self, name: &str) -> Option<&Arc<Collection>> {
        self.collections.get(name)
    }

    pub fn collections(&self) -> impl Iterator<Item = &Arc<Collection>> {
        self.collections.values()
    }

    pub fn relations(&self) -> &[Arc<Relation>] {
        &self.relations
    }

    /// Relations whose head is `collection`, in registration order.
    pub fn relations_with_head<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a Arc<Relation>> + 'a {
        self.relations.iter().filter(move |r| r.head == collection)
    }

    /// Relations whose tail is `collection`, in registration order.
    pub fn relations_with_tail<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a Arc<Relation>> + 'a {
        self.relations.iter().filter(move |r| r.tail == collection)
    }
}
