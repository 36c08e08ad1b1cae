//! The `Node` interface and the root `node(id:)` lookup.

use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, FieldValue, Interface, InterfaceField, TypeRef};
use octoql_model::{Inventory, Record};
use tracing::debug;

use super::collection_type::CollectionOutputType;
use crate::error::NodeIdError;
use crate::fields::{ArgumentEntry, FieldEntry, FieldSource, resolver_fn};
use crate::node_id::NodeId;

pub const NODE_INTERFACE: &str = "Node";

pub(crate) fn node_interface(id_field: &str) -> Interface {
    Interface::new(NODE_INTERFACE)
        .description("A value identified by a global identifier")
        .field(InterfaceField::new(id_field, TypeRef::named_nn(TypeRef::ID)))
}

/// Root field resolving any identifiable value from its global identifier.
///
/// The value is read through its collection key's record reader, tagged with
/// its collection of origin, and presented as the first node type whose
/// `is_type_of` accepts it.
pub(crate) fn node_field(
    inventory: Arc<Inventory>,
    node_types: Vec<Arc<CollectionOutputType>>,
) -> FieldEntry {
    let node_types = Arc::new(node_types);

    FieldEntry::new(
        "node",
        TypeRef::named(NODE_INTERFACE),
        FieldSource::Root,
        resolver_fn(move |ctx| {
            let inventory = Arc::clone(&inventory);
            let node_types = Arc::clone(&node_types);
            FieldFuture::new(async move {
                let encoded = ctx.args.try_get("id")?.string()?.to_string();
                let id = NodeId::decode(&encoded)?;
                let collection = inventory
                    .collection(&id.collection)
                    .ok_or_else(|| NodeIdError::UnknownCollection(id.collection.clone()))?;
                let Some(key) = &collection.primary_key else {
                    return Err(async_graphql::Error::from(NodeIdError::UnknownCollection(
                        id.collection.clone(),
                    )));
                };
                key.check_arity(&id.key)?;
                let Some(reader) = &key.reader else {
                    return Err(async_graphql::Error::new(format!(
                        "Collection '{}' cannot be read by key",
                        collection.name
                    )));
                };

                debug!(collection = %collection.name, "Resolving node by identifier");
                let Some(value) = reader.read(&id.key).await? else {
                    return Ok(None);
                };
                let record = Record::new(value).with_origin(collection.name.clone());
                let type_name = node_types
                    .iter()
                    .find(|ty| ty.is_type_of(&record))
                    .map(|ty| ty.name().to_string())
                    .ok_or_else(|| {
                        async_graphql::Error::new(format!(
                            "No node type accepts the value read from '{}'",
                            collection.name
                        ))
                    })?;
                Ok(Some(FieldValue::owned_any(record).with_type(type_name)))
            })
        }),
    )
    .with_description("Fetches a value by its global identifier")
    .with_argument(ArgumentEntry::new("id", TypeRef::named_nn(TypeRef::ID)))
}
