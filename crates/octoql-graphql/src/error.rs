//! Error types for schema synthesis.
//!
//! [`SchemaError`] covers configuration errors, all of which surface while the
//! schema is being built. [`NodeIdError`] covers global identifiers that
//! cannot be decoded; those are reported per field at query time.

use thiserror::Error;

use crate::fields::FieldSource;

/// Fatal configuration errors found while building a schema.
///
/// `Clone` so that a memoized field-list failure can be handed out again on
/// every access.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("'{0}' is not a valid GraphQL name")]
    InvalidName(String),

    #[error("Type name '{name}' is claimed by both {first} and {second}")]
    TypeNameConflict {
        name: String,
        first: String,
        second: String,
    },

    #[error("Field '{field}' on type '{type_name}' is defined by both {existing} and {incoming}")]
    FieldNameCollision {
        type_name: String,
        field: String,
        existing: FieldSource,
        incoming: FieldSource,
    },

    #[error("Relations from '{head}' to '{tail}' share the name '{relation}'")]
    DuplicateRelation {
        head: String,
        tail: String,
        relation: String,
    },

    #[error("Enum '{type_name}' maps more than one variant to '{value}'")]
    DuplicateEnumValue { type_name: String, value: String },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Invalid primary key on '{collection}': {reason}")]
    InvalidPrimaryKey { collection: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build GraphQL schema: {0}")]
    Build(String),
}

impl SchemaError {
    /// Returns the error code used in diagnostics.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidName(_) => "INVALID_NAME",
            Self::TypeNameConflict { .. } => "TYPE_NAME_CONFLICT",
            Self::FieldNameCollision { .. } => "FIELD_NAME_COLLISION",
            Self::DuplicateRelation { .. } => "DUPLICATE_RELATION",
            Self::DuplicateEnumValue { .. } => "DUPLICATE_ENUM_VALUE",
            Self::UnknownCollection(_) => "UNKNOWN_COLLECTION",
            Self::InvalidPrimaryKey { .. } => "INVALID_PRIMARY_KEY",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Build(_) => "SCHEMA_BUILD_FAILED",
        }
    }
}

/// Errors decoding a global node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeIdError {
    #[error("Malformed node identifier: {0}")]
    Malformed(String),

    #[error("Node identifier belongs to '{actual}', expected '{expected}'")]
    CollectionMismatch { expected: String, actual: String },

    #[error("Node identifier refers to unknown collection '{0}'")]
    UnknownCollection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaError::InvalidName("a-b".into()).error_code(),
            "INVALID_NAME"
        );
        assert_eq!(
            SchemaError::DuplicateRelation {
                head: "person".into(),
                tail: "post".into(),
                relation: "author".into(),
            }
            .error_code(),
            "DUPLICATE_RELATION"
        );
    }

    #[test]
    fn test_collision_message() {
        let err = SchemaError::FieldNameCollision {
            type_name: "Person".into(),
            field: "id".into(),
            existing: FieldSource::Identity,
            incoming: FieldSource::Intrinsic,
        };
        assert_eq!(
            err.to_string(),
            "Field 'id' on type 'Person' is defined by both identity and intrinsic"
        );
    }

    #[test]
    fn test_node_id_mismatch_message() {
        let err = NodeIdError::CollectionMismatch {
            expected: "person".into(),
            actual: "post".into(),
        };
        assert_eq!(
            err.to_string(),
            "Node identifier belongs to 'post', expected 'person'"
        );
    }
}
