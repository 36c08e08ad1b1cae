//! Field entries: the unit every field source contributes.
//!
//! Sources produce ordered [`FieldEntries`] that are merged into one output
//! type. A name claimed twice is a configuration error; nothing is
//! overwritten.

use std::fmt;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, InputValue, ResolverContext, TypeRef};
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::error::SchemaError;

/// Shared resolver closure.
pub type ResolverFn = Arc<dyn for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync>;

/// Wraps a closure as a [`ResolverFn`].
pub fn resolver_fn<F>(f: F) -> ResolverFn
where
    F: for<'a> Fn(ResolverContext<'a>) -> FieldFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Which part of the synthesis contributed a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Identity,
    Intrinsic,
    Extension,
    Reverse,
    Forward,
    Root,
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Intrinsic => "intrinsic",
            Self::Extension => "extension",
            Self::Reverse => "reverse relation",
            Self::Forward => "forward relation",
            Self::Root => "query root",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentEntry {
    pub name: String,
    pub type_ref: TypeRef,
    pub description: Option<String>,
}

impl ArgumentEntry {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn to_input_value(&self) -> InputValue {
        let input = InputValue::new(&self.name, self.type_ref.clone());
        match &self.description {
            Some(description) => input.description(description),
            None => input,
        }
    }
}

/// A field waiting to be placed on an object type.
#[derive(Clone)]
pub struct FieldEntry {
    pub name: String,
    pub type_ref: TypeRef,
    pub description: Option<String>,
    pub arguments: Vec<ArgumentEntry>,
    pub source: FieldSource,
    resolver: ResolverFn,
}

impl FieldEntry {
    pub fn new(
        name: impl Into<String>,
        type_ref: TypeRef,
        source: FieldSource,
        resolver: ResolverFn,
    ) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: None,
            arguments: Vec::new(),
            source,
            resolver,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_argument(mut self, argument: ArgumentEntry) -> Self {
        self.arguments.push(argument);
        self
    }

    pub(crate) fn to_field(&self) -> Field {
        let resolver = Arc::clone(&self.resolver);
        let mut field = Field::new(&self.name, self.type_ref.clone(), move |ctx| resolver(ctx));
        if let Some(description) = &self.description {
            field = field.description(description);
        }
        for argument in &self.arguments {
            field = field.argument(argument.to_input_value());
        }
        field
    }
}

impl fmt::Debug for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEntry")
            .field("name", &self.name)
            .field("type_ref", &self.type_ref.to_string())
            .field("source", &self.source)
            .field("arguments", &self.arguments.len())
            .finish()
    }
}

/// Ordered field entries keyed by GraphQL field name.
pub type FieldEntries = IndexMap<String, FieldEntry>;

/// Appends `entries` to `target`, tagging each with `source`.
///
/// # Errors
///
/// Returns [`SchemaError::FieldNameCollision`] when a name is already taken.
pub fn merge_entries(
    type_name: &str,
    target: &mut FieldEntries,
    entries: impl IntoIterator<Item = FieldEntry>,
    source: FieldSource,
) -> Result<(), SchemaError> {
    for mut entry in entries {
        entry.source = source;
        match target.entry(entry.name.clone()) {
            Entry::Occupied(existing) => {
                return Err(SchemaError::FieldNameCollision {
                    type_name: type_name.to_string(),
                    field: entry.name,
                    existing: existing.get().source,
                    incoming: source,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }
    Ok(())
}

/// Nullable `_placeholder: String` for types without fields.
pub(crate) fn placeholder_field() -> Field {
    Field::new("_placeholder", TypeRef::named(TypeRef::STRING), |_| {
        FieldFuture::new(async { Ok(None::<Value>) })
    })
    .description("Placeholder - this type has no fields")
}

/// Converts serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: async_graphql::indexmap::IndexMap<async_graphql::Name, Value> = obj
                .into_iter()
                .map(|(k, v)| (async_graphql::Name::new(k), json_to_graphql_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str) -> FieldEntry {
        FieldEntry::new(
            name,
            TypeRef::named(TypeRef::STRING),
            FieldSource::Extension,
            resolver_fn(|_| FieldFuture::new(async { Ok(None::<Value>) })),
        )
    }

    #[test]
    fn test_merge_preserves_order_and_tags_source() {
        let mut fields = FieldEntries::new();
        merge_entries("Person", &mut fields, [entry("b"), entry("a")], FieldSource::Intrinsic)
            .unwrap();
        merge_entries("Person", &mut fields, [entry("c")], FieldSource::Forward).unwrap();

        let names: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(fields["a"].source, FieldSource::Intrinsic);
        assert_eq!(fields["c"].source, FieldSource::Forward);
    }

    #[test]
    fn test_merge_rejects_collision() {
        let mut fields = FieldEntries::new();
        merge_entries("Person", &mut fields, [entry("id")], FieldSource::Identity).unwrap();
        let err = merge_entries("Person", &mut fields, [entry("id")], FieldSource::Extension)
            .unwrap_err();
        match err {
            SchemaError::FieldNameCollision {
                type_name,
                field,
                existing,
                incoming,
            } => {
                assert_eq!(type_name, "Person");
                assert_eq!(field, "id");
                assert_eq!(existing, FieldSource::Identity);
                assert_eq!(incoming, FieldSource::Extension);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_to_graphql_value() {
        let value = json_to_graphql_value(json!({"a": [1, 2.5, null], "b": "x", "c": true}));
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        assert_eq!(map["b"], Value::String("x".into()));
        assert_eq!(map["c"], Value::Boolean(true));
        assert!(matches!(&map["a"], Value::List(items) if items.len() == 3));
    }
}
