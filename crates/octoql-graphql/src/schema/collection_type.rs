//! Collection output types.
//!
//! A [`CollectionOutputType`] is created as a named shell so other types can
//! refer to it right away. Its field list is computed on first request and
//! memoized, which lets collections that reference each other through
//! relations be declared in any order.

use std::fmt;
use std::sync::{Arc, OnceLock};

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, Object, TypeRef};
use octoql_model::{Collection, Record};
use tracing::debug;

use super::node::NODE_INTERFACE;
use super::output_types::intrinsic_entries;
use super::relations::{forward_relation_fields, reverse_relation_fields};
use crate::context::BuildContext;
use crate::error::SchemaError;
use crate::fields::{FieldEntries, FieldEntry, FieldSource, merge_entries, placeholder_field, resolver_fn};
use crate::node_id::NodeId;

/// The synthesized GraphQL object type of one collection.
pub struct CollectionOutputType {
    collection: Arc<Collection>,
    type_name: String,
    fields: OnceLock<Result<Arc<FieldEntries>, SchemaError>>,
}

impl CollectionOutputType {
    pub(crate) fn new(collection: Arc<Collection>, type_name: String) -> Self {
        Self {
            collection,
            type_name,
            fields: OnceLock::new(),
        }
    }

    /// GraphQL type name.
    pub fn name(&self) -> &str {
        &self.type_name
    }

    pub fn collection(&self) -> &Arc<Collection> {
        &self.collection
    }

    /// Whether values of this type carry a global identifier and implement
    /// the `Node` interface.
    pub fn is_node(&self) -> bool {
        self.collection.primary_key.is_some()
    }

    /// Whether the field list has been computed yet.
    pub fn is_evaluated(&self) -> bool {
        self.fields.get().is_some()
    }

    /// The merged field list, computed once.
    ///
    /// Order: identity, intrinsic fields in declaration order, extension
    /// hook fields, reverse relation fields, forward relation fields.
    pub fn fields(&self, ctx: &BuildContext) -> Result<Arc<FieldEntries>, SchemaError> {
        self.fields
            .get_or_init(|| self.compute_fields(ctx).map(Arc::new))
            .clone()
    }

    /// Whether `record` may be presented as this type.
    ///
    /// Records fetched through the node lookup carry their collection of
    /// origin and only match that collection; untagged records fall back to
    /// the collection's own predicate.
    pub fn is_type_of(&self, record: &Record) -> bool {
        let origin_matches = record
            .origin
            .as_deref()
            .is_none_or(|origin| origin == self.collection.name);
        origin_matches && self.collection.accepts(&record.data)
    }

    fn compute_fields(&self, ctx: &BuildContext) -> Result<FieldEntries, SchemaError> {
        let mut fields = FieldEntries::new();

        if let Some(identity) = self.identity_field(ctx)? {
            merge_entries(&self.type_name, &mut fields, [identity], FieldSource::Identity)?;
        }
        merge_entries(
            &self.type_name,
            &mut fields,
            intrinsic_entries(ctx, self.collection.object_type.fields())?,
            FieldSource::Intrinsic,
        )?;
        if let Some(hook) = ctx.hook() {
            if let Some(extension) = hook(self, ctx) {
                merge_entries(
                    &self.type_name,
                    &mut fields,
                    extension.into_values(),
                    FieldSource::Extension,
                )?;
            }
        }
        merge_entries(
            &self.type_name,
            &mut fields,
            reverse_relation_fields(ctx, &self.collection)?.into_values(),
            FieldSource::Reverse,
        )?;
        merge_entries(
            &self.type_name,
            &mut fields,
            forward_relation_fields(ctx, &self.collection)?.into_values(),
            FieldSource::Forward,
        )?;

        debug!(
            collection = %self.collection.name,
            type_name = %self.type_name,
            fields = fields.len(),
            "Computed collection type fields"
        );
        Ok(fields)
    }

    fn identity_field(&self, ctx: &BuildContext) -> Result<Option<FieldEntry>, SchemaError> {
        let Some(fields) = self.collection.primary_key_fields() else {
            return Ok(None);
        };
        fields.map_err(|e| SchemaError::InvalidPrimaryKey {
            collection: self.collection.name.clone(),
            reason: e.to_string(),
        })?;

        let collection = Arc::clone(&self.collection);
        let entry = FieldEntry::new(
            ctx.config().node_id_field_name.clone(),
            TypeRef::named_nn(TypeRef::ID),
            FieldSource::Identity,
            resolver_fn(move |ctx| {
                let collection = Arc::clone(&collection);
                FieldFuture::new(async move {
                    let record = ctx.parent_value.try_downcast_ref::<Record>()?;
                    let id = NodeId::of_value(&collection, &record.data)?.ok_or_else(|| {
                        async_graphql::Error::new(format!(
                            "Collection '{}' has no primary key",
                            collection.name
                        ))
                    })?;
                    Ok(Some(Value::String(id.encode())))
                })
            }),
        )
        .with_description("Globally unique identifier");
        Ok(Some(entry))
    }

    /// Builds the dynamic object from the computed field list.
    pub(crate) fn to_object(&self, ctx: &BuildContext) -> Result<Object, SchemaError> {
        let fields = self.fields(ctx)?;

        let mut object = Object::new(&self.type_name);
        if let Some(description) = &self.collection.description {
            object = object.description(description);
        }
        if self.is_node() {
            object = object.implement(NODE_INTERFACE);
        }
        if fields.is_empty() {
            object = object.field(placeholder_field());
        }
        for entry in fields.values() {
            object = object.field(entry.to_field());
        }
        Ok(object)
    }
}

impl fmt::Debug for CollectionOutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionOutputType")
            .field("collection", &self.collection.name)
            .field("type_name", &self.type_name)
            .field("evaluated", &self.is_evaluated())
            .finish()
    }
}
