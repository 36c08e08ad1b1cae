//! Named directed links between collections.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::condition::Condition;

/// Derives the tail-side condition for one head value.
pub type TailConditionFn = Arc<dyn Fn(&Value) -> Condition + Send + Sync>;

/// Pairs head key fields with the tail fields referencing them, position by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationKey {
    pub head_fields: Vec<String>,
    pub tail_fields: Vec<String>,
}

impl RelationKey {
    pub fn new(
        head_fields: impl IntoIterator<Item = impl Into<String>>,
        tail_fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            head_fields: head_fields.into_iter().map(Into::into).collect(),
            tail_fields: tail_fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Connects a `head` collection (the referenced side) to a `tail` collection
/// (the many side).
#[derive(Clone)]
pub struct Relation {
    pub name: String,
    pub head: String,
    pub tail: String,
    pub key: Option<RelationKey>,
    tail_condition: Option<TailConditionFn>,
}

impl Relation {
    pub fn new(name: impl Into<String>, head: impl Into<String>, tail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            head: head.into(),
            tail: tail.into(),
            key: None,
            tail_condition: None,
        }
    }

    pub fn with_key(mut self, key: RelationKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_tail_condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Condition + Send + Sync + 'static,
    {
        self.tail_condition = Some(Arc::new(f));
        self
    }

    /// Whether a tail condition can be derived at all.
    pub fn can_derive_tail_condition(&self) -> bool {
        self.tail_condition.is_some() || self.key.is_some()
    }

    /// Condition scoping the tail collection to values related to `head_value`.
    ///
    /// An explicit condition function wins over the key.
    pub fn tail_condition_from_head_value(&self, head_value: &Value) -> Option<Condition> {
        if let Some(f) = &self.tail_condition {
            return Some(f(head_value));
        }
        let key = self.key.as_ref()?;
        Some(Condition::all(key.head_fields.iter().zip(&key.tail_fields).map(
            |(head_field, tail_field)| {
                let value = head_value.get(head_field).cloned().unwrap_or(Value::Null);
                Condition::equal(tail_field.clone(), value)
            },
        )))
    }

    /// Head key values referenced by `tail_value`, or `None` when the relation
    /// has no key or any referencing field is null.
    pub fn head_key_from_tail_value(&self, tail_value: &Value) -> Option<Vec<Value>> {
        let key = self.key.as_ref()?;
        key.tail_fields
            .iter()
            .map(|f| match tail_value.get(f) {
                None | Some(Value::Null) => None,
                Some(v) => Some(v.clone()),
            })
            .collect()
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.name)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("key", &self.key)
            .field("has_tail_condition", &self.tail_condition.is_some())
            .finish()
    }
}
