use thiserror::Error;

/// Errors raised while assembling or reading the data model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Collection '{0}' is already registered")]
    DuplicateCollection(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Field '{field}' is declared twice on type '{type_name}'")]
    DuplicateField { type_name: String, field: String },

    #[error("Field '{field}' failed to resolve: {message}")]
    FieldAccess { field: String, message: String },

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),

    #[error("Key has {actual} values but {expected} were expected")]
    KeyArity { expected: usize, actual: usize },

    #[error("Invalid model definition: {0}")]
    Definition(String),

    #[error("Failed to parse model definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Create a new FieldAccess error
    pub fn field_access(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldAccess {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new Definition error
    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition(message.into())
    }

    /// Check if this error was caused by the caller's input rather than the model
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCursor(_) | Self::InvalidPageRequest(_) | Self::KeyArity { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
