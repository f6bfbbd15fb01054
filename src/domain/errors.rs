//! Domain validation errors.

use std::fmt;

/// Errors that can occur during domain value object validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided ID is empty.
    EmptyId,

    /// The provided ID contains path separators or parent references.
    InvalidId(String),

    /// The provided type name is empty.
    EmptyTypeName,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "ID cannot be empty"),
            Self::InvalidId(id) => write!(f, "Invalid ID '{}'", id),
            Self::EmptyTypeName => write!(f, "Type name cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}
