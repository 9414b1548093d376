//! Error types for symbo-sql

use thiserror::Error;

/// The result type for symbo-sql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, editing or printing a tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A builder was given a value that violates a domain rule.
    ///
    /// Nothing is constructed when this is returned; fix the input and retry.
    #[error("invalid {field} {value:?}: {rule}")]
    Validation {
        field: String,
        value: String,
        rule: String,
    },

    /// A structural edit targeted a detached or foreign node, or a slot that
    /// does not support the requested edit.
    #[error("cannot edit {path}: {message}")]
    StructuralEdit { path: String, message: String },

    /// The tree violates a printer precondition, typically because it was
    /// assembled by hand instead of through the builders.
    #[error("cannot serialize {node}: {message}")]
    Serialization { node: String, message: String },
}

impl Error {
    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        value: impl ToString,
        rule: impl Into<String>,
    ) -> Self {
        Error::Validation {
            field: field.into(),
            value: value.to_string(),
            rule: rule.into(),
        }
    }

    /// Create a structural edit error
    pub fn structural_edit(path: impl ToString, message: impl Into<String>) -> Self {
        Error::StructuralEdit {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(node: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Serialization {
            node: node.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_structural_edit(&self) -> bool {
        matches!(self, Error::StructuralEdit { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::Serialization { .. })
    }

    /// The field a validation error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
