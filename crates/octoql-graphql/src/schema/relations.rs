//! Relation-derived fields.
//!
//! Forward fields live on a relation's head collection: one connection over
//! the tail per relation, named `<tail>-by-<relation>` (camelCased). Reverse
//! fields live on the tail collection: one nullable field per relation,
//! named after the relation, resolving the referenced head value.
//!
//! Both sides are feature-gated. A forward field needs a tail paginator with
//! connection support and a way to derive the tail condition; a reverse
//! field needs a relation key over the head's primary key and a record
//! reader. Relations missing a prerequisite are skipped, not reported as
//! errors.

use std::collections::HashSet;
use std::sync::Arc;

use async_graphql::dynamic::{FieldFuture, FieldValue, TypeRef};
use octoql_model::{Collection, Record, Relation};
use tracing::{trace, warn};

use super::connection::{ConnectionScope, connection_field};
use crate::context::BuildContext;
use crate::error::SchemaError;
use crate::fields::{FieldEntries, FieldEntry, FieldSource, merge_entries, resolver_fn};
use crate::naming;

fn skipped(ctx: &BuildContext, relation: &Relation, side: &str, reason: &str) {
    if ctx.config().warn_on_skipped_relations {
        warn!(
            relation = %relation.name,
            head = %relation.head,
            tail = %relation.tail,
            side,
            reason,
            "Relation field skipped"
        );
    } else {
        trace!(
            relation = %relation.name,
            head = %relation.head,
            tail = %relation.tail,
            side,
            reason,
            "Relation field skipped"
        );
    }
}

/// Connection fields for relations whose head is `collection`, in relation
/// registration order.
///
/// # Errors
///
/// Two relations with the same tail and name produce the same field name and
/// fail with [`SchemaError::DuplicateRelation`], whether or not they are
/// eligible.
pub fn forward_relation_fields(
    ctx: &BuildContext,
    collection: &Collection,
) -> Result<FieldEntries, SchemaError> {
    let type_name = ctx.collection_type(&collection.name)?.name().to_string();
    let mut seen = HashSet::new();
    let mut entries = FieldEntries::new();

    for relation in ctx.inventory().relations_with_head(&collection.name) {
        if !seen.insert((relation.tail.as_str(), relation.name.as_str())) {
            return Err(SchemaError::DuplicateRelation {
                head: relation.head.clone(),
                tail: relation.tail.clone(),
                relation: relation.name.clone(),
            });
        }

        let tail = ctx.collection(&relation.tail)?;
        if !tail.supports_connections() {
            skipped(ctx, relation, "forward", "tail collection has no connection support");
            continue;
        }
        if !relation.can_derive_tail_condition() {
            skipped(ctx, relation, "forward", "relation cannot derive a tail condition");
            continue;
        }

        let name = naming::field_name(&format!("{}-by-{}", tail.name, relation.name))?;
        let entry = connection_field(
            ctx,
            &name,
            tail,
            ConnectionScope::Relation(Arc::clone(relation)),
        )?;
        merge_entries(&type_name, &mut entries, [entry], FieldSource::Forward)?;
    }
    Ok(entries)
}

/// Fields resolving the head value for relations whose tail is `collection`.
pub fn reverse_relation_fields(
    ctx: &BuildContext,
    collection: &Collection,
) -> Result<FieldEntries, SchemaError> {
    let type_name = ctx.collection_type(&collection.name)?.name().to_string();
    let mut entries = FieldEntries::new();

    for relation in ctx.inventory().relations_with_tail(&collection.name) {
        let head = ctx.collection(&relation.head)?;
        let Some(key) = &relation.key else {
            skipped(ctx, relation, "reverse", "relation has no key");
            continue;
        };
        let Some(primary_key) = &head.primary_key else {
            skipped(ctx, relation, "reverse", "head collection has no primary key");
            continue;
        };
        if key.head_fields != primary_key.field_names {
            skipped(ctx, relation, "reverse", "relation key is not the head primary key");
            continue;
        }
        let Some(reader) = primary_key.reader.clone() else {
            skipped(ctx, relation, "reverse", "head primary key has no reader");
            continue;
        };

        let head_type = ctx.collection_type(&head.name)?;
        let name = naming::field_name(&relation.name)?;
        let resolver_relation = Arc::clone(relation);

        let entry = FieldEntry::new(
            name,
            TypeRef::named(head_type.name()),
            FieldSource::Reverse,
            resolver_fn(move |ctx| {
                let relation = Arc::clone(&resolver_relation);
                let reader = Arc::clone(&reader);
                FieldFuture::new(async move {
                    let tail = ctx.parent_value.try_downcast_ref::<Record>()?;
                    let Some(key) = relation.head_key_from_tail_value(&tail.data) else {
                        return Ok(None);
                    };
                    let head = reader.read(&key).await?;
                    Ok(head.map(|value| FieldValue::owned_any(Record::new(value))))
                })
            }),
        )
        .with_description(format!(
            "The {} value referenced through '{}'",
            head.name, relation.name
        ));
        merge_entries(&type_name, &mut entries, [entry], FieldSource::Reverse)?;
    }
    Ok(entries)
}
