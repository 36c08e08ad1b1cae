//! Condition input types.
//!
//! `<Type>Condition` exposes one optional operand per filterable field
//! (scalars other than JSON, and enums, optionally nullable). Naming an
//! operand adds an equality constraint on that field; an explicit `null`
//! matches values where the field is null or missing. Computed fields have no
//! stored property to compare against and are left out.

use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{InputObject, InputValue, Type, TypeRef};
use octoql_model::{Collection, Condition, ScalarType, ValueType};
use tracing::trace;

use super::output_types::{EnumMapping, enum_type};
use crate::context::BuildContext;
use crate::error::SchemaError;
use crate::naming;

#[derive(Debug)]
enum OperandKind {
    Scalar(ScalarType),
    Enum(Arc<EnumMapping>),
}

#[derive(Debug)]
struct Operand {
    graphql_name: String,
    field_name: String,
    kind: OperandKind,
}

/// A collection's condition input type and its payload parser.
#[derive(Debug)]
pub struct ConditionType {
    pub type_name: String,
    operands: Vec<Operand>,
}

impl ConditionType {
    /// GraphQL names of the operands, in field declaration order.
    pub fn operand_names(&self) -> impl Iterator<Item = &str> {
        self.operands.iter().map(|o| o.graphql_name.as_str())
    }

    /// Turns a submitted condition payload into a [`Condition`].
    ///
    /// A missing, `null` or empty payload is no constraint at all.
    pub fn from_input(&self, input: Option<&Value>) -> async_graphql::Result<Condition> {
        let Some(Value::Object(payload)) = input else {
            return Ok(Condition::TRUE);
        };

        let mut condition = Condition::TRUE;
        for operand in &self.operands {
            let Some(value) = payload.get(operand.graphql_name.as_str()) else {
                continue;
            };
            let value = match (&operand.kind, value) {
                (_, Value::Null) => serde_json::Value::Null,
                (OperandKind::Scalar(ScalarType::Id), Value::String(id)) => {
                    condition = condition.and(Condition::id_equal(operand.field_name.clone(), id));
                    continue;
                }
                (OperandKind::Scalar(ScalarType::Id), Value::Number(id)) => {
                    condition = condition
                        .and(Condition::id_equal(operand.field_name.clone(), id.to_string()));
                    continue;
                }
                (OperandKind::Enum(mapping), Value::Enum(name)) => {
                    let raw = mapping.raw_value(name.as_str()).ok_or_else(|| {
                        async_graphql::Error::new(format!(
                            "'{name}' is not a value of enum {}",
                            mapping.type_name
                        ))
                    })?;
                    serde_json::Value::String(raw.to_string())
                }
                (OperandKind::Enum(mapping), Value::String(name)) => mapping
                    .raw_value(name)
                    .map(|raw| serde_json::Value::String(raw.to_string()))
                    .ok_or_else(|| {
                        async_graphql::Error::new(format!(
                            "'{name}' is not a value of enum {}",
                            mapping.type_name
                        ))
                    })?,
                (OperandKind::Scalar(_), value) => value.clone().into_json()?,
                (OperandKind::Enum(mapping), other) => {
                    return Err(async_graphql::Error::new(format!(
                        "Expected a value of enum {}, got {other}",
                        mapping.type_name
                    )));
                }
            };
            condition = condition.and(Condition::equal(operand.field_name.clone(), value));
        }
        Ok(condition)
    }
}

fn operand_kind(ctx: &BuildContext, value_type: &ValueType) -> Result<Option<OperandKind>, SchemaError> {
    match value_type {
        ValueType::Nullable(inner) => operand_kind(ctx, inner),
        ValueType::Scalar(ScalarType::Json) => Ok(None),
        ValueType::Scalar(scalar) => Ok(Some(OperandKind::Scalar(*scalar))),
        ValueType::Enum(ty) => Ok(Some(OperandKind::Enum(enum_type(ctx, ty)?))),
        ValueType::List(_) | ValueType::Object(_) => Ok(None),
    }
}

/// Returns the (memoized) condition type of `collection`, or `None` when the
/// collection has no filterable field.
pub fn condition_type(
    ctx: &BuildContext,
    collection: &Collection,
) -> Result<Option<Arc<ConditionType>>, SchemaError> {
    if let Some(cached) = ctx.registry().condition(&collection.name) {
        return Ok(cached);
    }

    let mut operands = Vec::new();
    for field in collection.object_type.fields() {
        if field.is_computed() {
            continue;
        }
        if let Some(kind) = operand_kind(ctx, &field.value_type)? {
            operands.push(Operand {
                graphql_name: naming::field_name(&field.name)?,
                field_name: field.name.clone(),
                kind,
            });
        }
    }

    if operands.is_empty() {
        trace!(collection = %collection.name, "No filterable fields, condition type omitted");
        return Ok(ctx.registry().insert_condition(&collection.name, None));
    }

    let type_name = format!("{}Condition", naming::type_name(&collection.name)?);
    ctx.registry()
        .claim(&type_name, &format!("condition of '{}'", collection.name))?;

    let mut input = InputObject::new(&type_name).description(format!(
        "Equality filter on {} fields; omitted fields are unconstrained",
        collection.name
    ));
    for operand in &operands {
        let type_name = match &operand.kind {
            OperandKind::Scalar(scalar) => scalar.name().to_string(),
            OperandKind::Enum(mapping) => mapping.type_name.clone(),
        };
        input = input.field(InputValue::new(&operand.graphql_name, TypeRef::named(type_name)));
    }

    trace!(
        collection = %collection.name,
        condition_type = %type_name,
        operands = operands.len(),
        "Generated condition type"
    );
    let condition = ConditionType {
        type_name,
        operands,
    };
    Ok(ctx
        .registry()
        .insert_condition(&collection.name, Some((condition, Type::from(input)))))
}
