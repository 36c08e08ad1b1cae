//! Global node identifiers.
//!
//! An identifier is the standard base64 encoding of the JSON array
//! `[collectionName, ...keyValues]`. It carries no process-local state, so
//! identifiers stay valid across restarts, and the collection name keeps keys
//! of different collections apart.

use base64::Engine;
use octoql_model::{Collection, ModelError};
use serde_json::Value;

use crate::error::NodeIdError;

/// A decoded global identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeId {
    pub collection: String,
    pub key: Vec<Value>,
}

impl NodeId {
    pub fn new(collection: impl Into<String>, key: Vec<Value>) -> Self {
        Self {
            collection: collection.into(),
            key,
        }
    }

    /// Identifier of `value` within `collection`, or `None` when the
    /// collection has no primary key.
    pub fn of_value(collection: &Collection, value: &Value) -> Result<Option<Self>, ModelError> {
        Ok(collection
            .key_of(value)?
            .map(|key| Self::new(collection.name.clone(), key)))
    }

    pub fn encode(&self) -> String {
        let mut parts = Vec::with_capacity(self.key.len() + 1);
        parts.push(Value::String(self.collection.clone()));
        parts.extend(self.key.iter().cloned());
        let json = Value::Array(parts).to_string();
        base64::engine::general_purpose::STANDARD.encode(json)
    }

    pub fn decode(encoded: &str) -> Result<Self, NodeIdError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| NodeIdError::Malformed(e.to_string()))?;
        let parts: Vec<Value> =
            serde_json::from_slice(&bytes).map_err(|e| NodeIdError::Malformed(e.to_string()))?;

        let mut parts = parts.into_iter();
        match parts.next() {
            Some(Value::String(collection)) => Ok(Self::new(collection, parts.collect())),
            _ => Err(NodeIdError::Malformed(
                "expected a collection name as the first element".into(),
            )),
        }
    }

    /// Decodes `encoded` and checks that it belongs to `expected`.
    pub fn decode_for(encoded: &str, expected: &str) -> Result<Vec<Value>, NodeIdError> {
        let id = Self::decode(encoded)?;
        if id.collection != expected {
            return Err(NodeIdError::CollectionMismatch {
                expected: expected.to_string(),
                actual: id.collection,
            });
        }
        Ok(id.key)
    }
}
