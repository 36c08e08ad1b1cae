//! Abstract value types and fields.
//!
//! A [`ValueType`] describes the shape of a value independently of any query
//! language. Bare types are non-null; [`ValueType::Nullable`] marks a maybe
//! value and [`ValueType::List`] a list of values.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ModelError, Result};

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    Int,
    Float,
    String,
    Id,
    Json,
}

impl ScalarType {
    /// Parses a scalar from its canonical name (`Int`, `JSON`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Boolean" => Some(Self::Boolean),
            "Int" => Some(Self::Int),
            "Float" => Some(Self::Float),
            "String" => Some(Self::String),
            "ID" => Some(Self::Id),
            "JSON" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Id => "ID",
            Self::Json => "JSON",
        }
    }
}

/// A named set of string variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub variants: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, variants: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A named composite type with ordered fields.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    fields: Vec<Field>,
}

impl ObjectType {
    /// Creates an object type, rejecting duplicate field names.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ModelError::DuplicateField {
                    type_name: name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self {
            name,
            description: None,
            fields,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The shape of a value.
#[derive(Debug, Clone)]
pub enum ValueType {
    Scalar(ScalarType),
    Enum(Arc<EnumType>),
    Object(Arc<ObjectType>),
    List(Box<ValueType>),
    Nullable(Box<ValueType>),
}

impl ValueType {
    pub fn nullable(inner: ValueType) -> Self {
        Self::Nullable(Box::new(inner))
    }

    pub fn list(inner: ValueType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Strips a single `Nullable` wrapper.
    pub fn non_null(&self) -> &ValueType {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }
}

impl ValueType {
    fn fmt_named(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => f.write_str(s.name()),
            Self::Enum(e) => f.write_str(&e.name),
            Self::Object(o) => f.write_str(&o.name),
            Self::List(item) => write!(f, "[{item}]"),
            Self::Nullable(inner) => inner.fmt_named(f),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nullable(inner) => inner.fmt_named(f),
            other => {
                other.fmt_named(f)?;
                f.write_str("!")
            }
        }
    }
}

/// Function reading a field's value out of a containing value.
pub type Accessor = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// A named, typed accessor on an object value.
#[derive(Clone)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub value_type: ValueType,
    accessor: Option<Accessor>,
}

impl Field {
    /// A field read from the property with the same name.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            description: None,
            value_type,
            accessor: None,
        }
    }

    /// A computed field with its own accessor.
    pub fn computed<F>(name: impl Into<String>, value_type: ValueType, accessor: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            value_type,
            accessor: Some(Arc::new(accessor)),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_computed(&self) -> bool {
        self.accessor.is_some()
    }

    /// Reads this field from `value`. Missing properties read as `null`.
    pub fn get(&self, value: &Value) -> Result<Value> {
        match &self.accessor {
            Some(accessor) => accessor(value),
            None => Ok(value.get(&self.name).cloned().unwrap_or(Value::Null)),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("computed", &self.is_computed())
            .finish()
    }
}
