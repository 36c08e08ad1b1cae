//! Connection fields over paginated collections.
//!
//! Each paginated collection gets `<Type>Connection` and `<Type>Edge` types,
//! and all connections share one `PageInfo`. A connection field takes
//! `first`/`last`/`after`/`before` plus an optional `condition`, and hands the
//! conjunction of its scope condition and the submitted condition to the
//! collection's paginator. Cursor format and page-size policy belong to the
//! paginator.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, Object, ResolverContext, Type, TypeRef,
};
use octoql_model::{
    Collection, Condition, Page, PageEntry, PageInfo, PageRequest, Record, Relation,
};
use tracing::{debug, trace};

use super::condition_types::condition_type;
use crate::context::BuildContext;
use crate::error::SchemaError;
use crate::fields::{ArgumentEntry, FieldEntry, FieldSource, resolver_fn};

/// Name of the page info type shared by all connections.
pub const PAGE_INFO_TYPE: &str = "PageInfo";

/// Names of the connection and edge types generated for one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTypes {
    pub connection: String,
    pub edge: String,
}

/// What a connection field ranges over.
#[derive(Debug, Clone)]
pub enum ConnectionScope {
    /// Every value of the collection.
    All,
    /// Tail values related to the parent head value.
    Relation(Arc<Relation>),
}

/// The shared `PageInfo` object.
pub(crate) fn page_info_object() -> Object {
    Object::new(PAGE_INFO_TYPE)
        .description("Information about the current page of a connection")
        .field(Field::new(
            "hasNextPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(Some(Value::Boolean(info.has_next_page)))
                })
            },
        ))
        .field(Field::new(
            "hasPreviousPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(Some(Value::Boolean(info.has_previous_page)))
                })
            },
        ))
        .field(Field::new(
            "startCursor",
            TypeRef::named(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(info.start_cursor.clone().map(Value::String))
                })
            },
        ))
        .field(Field::new(
            "endCursor",
            TypeRef::named(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(info.end_cursor.clone().map(Value::String))
                })
            },
        ))
}

fn connection_object(names: &ConnectionTypes, node_type: &str) -> Object {
    Object::new(&names.connection)
        .description(format!("A page of {node_type} values"))
        .field(Field::new(
            "edges",
            TypeRef::named_nn_list_nn(&names.edge),
            |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(Some(FieldValue::list(
                        page.entries.iter().cloned().map(FieldValue::owned_any),
                    )))
                })
            },
        ))
        .field(Field::new(
            "nodes",
            TypeRef::named_nn_list_nn(node_type),
            |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(Some(FieldValue::list(
                        page.entries
                            .iter()
                            .map(|entry| FieldValue::owned_any(entry.record.clone())),
                    )))
                })
            },
        ))
        .field(Field::new(
            "pageInfo",
            TypeRef::named_nn(PAGE_INFO_TYPE),
            |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(Some(FieldValue::owned_any(page.info.clone())))
                })
            },
        ))
        .field(
            Field::new("totalCount", TypeRef::named(TypeRef::INT), |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(page.total_count.map(|n| Value::Number(n.into())))
                })
            })
            .description("Number of values matching the condition, when known"),
        )
}

fn edge_object(names: &ConnectionTypes, node_type: &str) -> Object {
    Object::new(&names.edge)
        .description(format!("A {node_type} value and its cursor"))
        .field(Field::new(
            "cursor",
            TypeRef::named_nn(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let entry = ctx.parent_value.try_downcast_ref::<PageEntry>()?;
                    Ok(Some(Value::String(entry.cursor.clone())))
                })
            },
        ))
        .field(Field::new("node", TypeRef::named_nn(node_type), |ctx| {
            FieldFuture::new(async move {
                let entry = ctx.parent_value.try_downcast_ref::<PageEntry>()?;
                Ok(Some(FieldValue::owned_any(entry.record.clone())))
            })
        }))
}

/// Returns (generating once) the connection types of `collection`.
pub fn connection_types(
    ctx: &BuildContext,
    collection: &Collection,
) -> Result<ConnectionTypes, SchemaError> {
    if let Some(cached) = ctx.registry().connection(&collection.name) {
        return Ok(cached);
    }

    let node_type = ctx.collection_type(&collection.name)?.name().to_string();
    let names = ConnectionTypes {
        connection: format!("{node_type}Connection"),
        edge: format!("{node_type}Edge"),
    };
    let owner = format!("connection of '{}'", collection.name);
    ctx.registry().claim(&names.connection, &owner)?;
    ctx.registry().claim(&names.edge, &owner)?;

    trace!(
        collection = %collection.name,
        connection_type = %names.connection,
        "Generated connection types"
    );
    let types = vec![
        Type::from(connection_object(&names, &node_type)),
        Type::from(edge_object(&names, &node_type)),
    ];
    Ok(ctx
        .registry()
        .insert_connection(&collection.name, names, types))
}

fn optional_i64(ctx: &ResolverContext<'_>, name: &str) -> async_graphql::Result<Option<i64>> {
    match ctx.args.get(name) {
        Some(value) if !value.is_null() => Ok(Some(value.i64()?)),
        _ => Ok(None),
    }
}

fn optional_string(ctx: &ResolverContext<'_>, name: &str) -> async_graphql::Result<Option<String>> {
    match ctx.args.get(name) {
        Some(value) if !value.is_null() => Ok(Some(value.string()?.to_string())),
        _ => Ok(None),
    }
}

fn page_request(ctx: &ResolverContext<'_>) -> async_graphql::Result<PageRequest> {
    Ok(PageRequest {
        first: PageRequest::limit_from_i64("first", optional_i64(ctx, "first")?)?,
        last: PageRequest::limit_from_i64("last", optional_i64(ctx, "last")?)?,
        after: optional_string(ctx, "after")?,
        before: optional_string(ctx, "before")?,
    })
}

/// Builds a connection field named `name` over `tail`.
///
/// # Errors
///
/// Fails when `tail` has no paginator or when one of the generated type
/// names is unavailable.
pub fn connection_field(
    ctx: &BuildContext,
    name: &str,
    tail: &Arc<Collection>,
    scope: ConnectionScope,
) -> Result<FieldEntry, SchemaError> {
    let paginator = tail.paginator.clone().ok_or_else(|| {
        SchemaError::Build(format!("collection '{}' has no paginator", tail.name))
    })?;
    let names = connection_types(ctx, tail)?;
    let condition = condition_type(ctx, tail)?;

    let tail_name = tail.name.clone();
    let field_name = name.to_string();
    let description = match &scope {
        ConnectionScope::All => format!("All {} values", tail.name),
        ConnectionScope::Relation(relation) => {
            format!("{} values related through '{}'", tail.name, relation.name)
        }
    };
    let resolver_condition = condition.clone();

    let mut entry = FieldEntry::new(
        name,
        TypeRef::named_nn(&names.connection),
        FieldSource::Forward,
        resolver_fn(move |ctx| {
            let paginator = Arc::clone(&paginator);
            let condition_type = resolver_condition.clone();
            let scope = scope.clone();
            let tail_name = tail_name.clone();
            let field_name = field_name.clone();
            FieldFuture::new(async move {
                let intrinsic = match &scope {
                    ConnectionScope::All => Condition::TRUE,
                    ConnectionScope::Relation(relation) => {
                        let head = ctx.parent_value.try_downcast_ref::<Record>()?;
                        relation
                            .tail_condition_from_head_value(&head.data)
                            .ok_or_else(|| {
                                async_graphql::Error::new(format!(
                                    "Relation '{}' cannot derive a condition",
                                    relation.name
                                ))
                            })?
                    }
                };
                let submitted = match &condition_type {
                    Some(condition_type) => {
                        let argument = ctx.args.get("condition");
                        condition_type.from_input(argument.as_ref().map(|a| a.as_value()))?
                    }
                    None => Condition::TRUE,
                };
                let request = page_request(&ctx)?;

                debug!(
                    collection = %tail_name,
                    field = %field_name,
                    first = ?request.first,
                    last = ?request.last,
                    "Resolving connection"
                );
                let page = paginator
                    .read_page(&intrinsic.and(submitted), &request)
                    .await?;
                Ok(Some(FieldValue::owned_any(page)))
            })
        }),
    )
    .with_description(description)
    .with_argument(ArgumentEntry::new("first", TypeRef::named(TypeRef::INT)))
    .with_argument(ArgumentEntry::new("last", TypeRef::named(TypeRef::INT)))
    .with_argument(ArgumentEntry::new("after", TypeRef::named(TypeRef::STRING)))
    .with_argument(ArgumentEntry::new("before", TypeRef::named(TypeRef::STRING)));

    if let Some(condition) = condition {
        entry = entry.with_argument(
            ArgumentEntry::new("condition", TypeRef::named(&condition.type_name))
                .with_description("Constraint combined with the field's own scope"),
        );
    }
    Ok(entry)
}
