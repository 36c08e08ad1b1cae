//! Field type resolution.
//!
//! Maps a model [`ValueType`] to a GraphQL [`TypeRef`] plus an [`OutputShape`]
//! that turns runtime JSON into the matching [`FieldValue`]. Named types
//! (enums, composite objects) are generated once and memoized in the
//! registry; list and nullable wrappers only wrap the inner result.

use std::sync::Arc;

use async_graphql::dynamic::{Enum, EnumItem, FieldFuture, FieldValue, Object, Type, TypeRef};
use async_graphql::{Name, Value};
use indexmap::IndexMap;
use octoql_model::{EnumType, Field, ObjectType, Record, ScalarType, ValueType};
use tracing::trace;

use crate::context::BuildContext;
use crate::error::SchemaError;
use crate::fields::{
    FieldEntries, FieldEntry, FieldSource, json_to_graphql_value, merge_entries,
    placeholder_field, resolver_fn,
};
use crate::naming;

/// Name of the scalar used for free-form JSON values.
pub const JSON_SCALAR: &str = "JSON";

/// Raw enum variants and their GraphQL value names.
#[derive(Debug)]
pub struct EnumMapping {
    pub type_name: String,
    variants: IndexMap<String, String>,
}

impl EnumMapping {
    pub(crate) fn new(type_name: impl Into<String>, variants: IndexMap<String, String>) -> Self {
        Self {
            type_name: type_name.into(),
            variants,
        }
    }

    pub fn graphql_value(&self, raw: &str) -> Option<&str> {
        self.variants.get(raw).map(String::as_str)
    }

    pub fn raw_value(&self, graphql: &str) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, name)| name.as_str() == graphql)
            .map(|(raw, _)| raw.as_str())
    }
}

/// How a runtime value is handed to the execution runtime.
#[derive(Debug, Clone)]
pub enum OutputShape {
    Scalar(ScalarType),
    Enum(Arc<EnumMapping>),
    Object,
    List(Box<OutputShape>),
    Nullable(Box<OutputShape>),
}

impl OutputShape {
    /// Converts a field value produced by an accessor.
    pub fn to_output<'a>(&self, value: serde_json::Value) -> async_graphql::Result<FieldValue<'a>> {
        match self {
            Self::Nullable(inner) => {
                if value.is_null() {
                    Ok(FieldValue::NULL)
                } else {
                    inner.to_output(value)
                }
            }
            _ if value.is_null() => Err(async_graphql::Error::new(
                "Non-null field resolved to null",
            )),
            Self::Scalar(ScalarType::Id) => Ok(FieldValue::value(match value {
                serde_json::Value::String(s) => Value::String(s),
                other => Value::String(other.to_string()),
            })),
            Self::Scalar(_) => Ok(FieldValue::value(json_to_graphql_value(value))),
            Self::Enum(mapping) => {
                let raw = value.as_str().ok_or_else(|| {
                    async_graphql::Error::new(format!(
                        "Expected a string variant of enum {}",
                        mapping.type_name
                    ))
                })?;
                let name = mapping.graphql_value(raw).ok_or_else(|| {
                    async_graphql::Error::new(format!(
                        "'{raw}' is not a variant of enum {}",
                        mapping.type_name
                    ))
                })?;
                Ok(FieldValue::value(Value::Enum(Name::new(name))))
            }
            Self::Object => {
                if !value.is_object() {
                    return Err(async_graphql::Error::new("Expected an object value"));
                }
                Ok(FieldValue::owned_any(Record::new(value)))
            }
            Self::List(inner) => match value {
                serde_json::Value::Array(items) => {
                    let items = items
                        .into_iter()
                        .map(|item| inner.to_output(item))
                        .collect::<async_graphql::Result<Vec<_>>>()?;
                    Ok(FieldValue::list(items))
                }
                _ => Err(async_graphql::Error::new("Expected a list value")),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedOutput {
    pub type_ref: TypeRef,
    pub shape: OutputShape,
}

fn nullable(type_ref: TypeRef) -> TypeRef {
    match type_ref {
        TypeRef::NonNull(inner) => *inner,
        other => other,
    }
}

/// Resolves the output type of a model value type.
pub fn resolve_output(
    ctx: &BuildContext,
    value_type: &ValueType,
) -> Result<ResolvedOutput, SchemaError> {
    match value_type {
        ValueType::Nullable(inner) => {
            let inner = resolve_output(ctx, inner)?;
            Ok(ResolvedOutput {
                type_ref: nullable(inner.type_ref),
                shape: OutputShape::Nullable(Box::new(inner.shape)),
            })
        }
        ValueType::List(inner) => {
            let inner = resolve_output(ctx, inner)?;
            Ok(ResolvedOutput {
                type_ref: TypeRef::NonNull(Box::new(TypeRef::List(Box::new(inner.type_ref)))),
                shape: OutputShape::List(Box::new(inner.shape)),
            })
        }
        ValueType::Scalar(scalar) => Ok(ResolvedOutput {
            type_ref: TypeRef::named_nn(scalar.name()),
            shape: OutputShape::Scalar(*scalar),
        }),
        ValueType::Enum(ty) => {
            let mapping = enum_type(ctx, ty)?;
            Ok(ResolvedOutput {
                type_ref: TypeRef::named_nn(mapping.type_name.clone()),
                shape: OutputShape::Enum(mapping),
            })
        }
        ValueType::Object(ty) => {
            let name = object_type(ctx, ty)?;
            Ok(ResolvedOutput {
                type_ref: TypeRef::named_nn(name),
                shape: OutputShape::Object,
            })
        }
    }
}

/// Generates (once) the GraphQL enum for a model enum.
pub(crate) fn enum_type(
    ctx: &BuildContext,
    ty: &Arc<EnumType>,
) -> Result<Arc<EnumMapping>, SchemaError> {
    let type_name = naming::type_name(&ty.name)?;
    let owner = format!("enum '{}' ({})", ty.name, ty.variants.join(", "));

    ctx.registry()
        .enum_mapping(&type_name, ty, &owner, || {
            let mut variants = IndexMap::new();
            let mut graphql_enum = Enum::new(&type_name);
            if let Some(description) = &ty.description {
                graphql_enum = graphql_enum.description(description);
            }
            for raw in &ty.variants {
                let value = naming::enum_value_name(raw)?;
                if variants.values().any(|existing| existing == &value) {
                    return Err(SchemaError::DuplicateEnumValue {
                        type_name: type_name.clone(),
                        value,
                    });
                }
                graphql_enum = graphql_enum.item(EnumItem::new(&value));
                variants.insert(raw.clone(), value);
            }
            trace!(enum_type = %type_name, variants = variants.len(), "Generated enum type");
            Ok((
                EnumMapping::new(type_name.clone(), variants),
                Type::from(graphql_enum),
            ))
        })
}

/// Generates (once) the GraphQL object for a composite model object.
fn object_type(ctx: &BuildContext, ty: &Arc<ObjectType>) -> Result<String, SchemaError> {
    let type_name = naming::type_name(&ty.name)?;
    let field_names: Vec<&str> = ty.fields().iter().map(|field| field.name.as_str()).collect();
    let owner = format!("object '{}' ({})", ty.name, field_names.join(", "));

    if !ctx.registry().claim_object(&type_name, ty, &owner)? {
        return Ok(type_name);
    }

    let mut entries = FieldEntries::new();
    merge_entries(
        &type_name,
        &mut entries,
        intrinsic_entries(ctx, ty.fields())?,
        FieldSource::Intrinsic,
    )?;

    let mut object = Object::new(&type_name);
    if let Some(description) = &ty.description {
        object = object.description(description);
    }
    if entries.is_empty() {
        object = object.field(placeholder_field());
    }
    for entry in entries.values() {
        object = object.field(entry.to_field());
    }
    trace!(object_type = %type_name, fields = entries.len(), "Generated composite type");
    ctx.registry().register(object);
    Ok(type_name)
}

/// One field entry per model field, reading from the parent [`Record`].
pub(crate) fn intrinsic_entries(
    ctx: &BuildContext,
    fields: &[Field],
) -> Result<Vec<FieldEntry>, SchemaError> {
    fields
        .iter()
        .map(|field| {
            let name = naming::field_name(&field.name)?;
            let resolved = resolve_output(ctx, &field.value_type)?;
            let model_field = field.clone();
            let shape = resolved.shape;

            let mut entry = FieldEntry::new(
                name,
                resolved.type_ref,
                FieldSource::Intrinsic,
                resolver_fn(move |ctx| {
                    let model_field = model_field.clone();
                    let shape = shape.clone();
                    FieldFuture::new(async move {
                        let record = ctx.parent_value.try_downcast_ref::<Record>()?;
                        let value = model_field.get(&record.data)?;
                        Ok(Some(shape.to_output(value)?))
                    })
                }),
            );
            if let Some(description) = &field.description {
                entry = entry.with_description(description);
            }
            Ok(entry)
        })
        .collect()
}
