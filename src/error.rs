//! Error types for the check suite engine.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use crate::domain::TestId;
use std::fmt;
use thiserror::Error;

/// Errors raised when a declaration cannot be turned into metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// Declaration has no name
    #[error("Test definition name cannot be empty")]
    EmptyName,

    /// Declaration has no owning module
    #[error("Test definition module cannot be empty")]
    EmptyModule,

    /// Parameter name is not a valid identifier
    #[error("Invalid parameter name '{0}'")]
    InvalidParameterName(String),

    /// Same parameter declared twice
    #[error("Duplicate parameter '{0}'")]
    DuplicateParameter(String),

    /// Default value does not fit the declared type
    #[error("Default for parameter '{name}' does not match declared type {expected}")]
    DefaultTypeMismatch { name: String, expected: String },

    /// Name is not an identifier
    #[error("Invalid test definition name '{0}'")]
    InvalidName(String),

    /// Module is not a dotted path of identifiers
    #[error("Invalid test definition module '{0}'")]
    InvalidModule(String),

    /// Identity already belongs to a different declaration
    #[error("Test definition {id} is already registered with a different declaration than {module}.{name}")]
    Conflict {
        id: TestId,
        module: String,
        name: String,
    },
}

/// A parameter that could not be resolved, with its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingParameter {
    pub name: String,
    pub declared_type: String,
    /// Shared input the parameter was wired to, if any.
    pub input: Option<String>,
}

impl fmt::Display for MissingParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.input {
            Some(input) if input != &self.name => write!(
                f,
                "'{}' (shared input '{}'): {}",
                self.name, input, self.declared_type
            ),
            _ => write!(f, "'{}': {}", self.name, self.declared_type),
        }
    }
}

/// Everything wrong with the bindings of one test instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceBindings {
    /// Position of the instance in its suite (add order)
    pub position: usize,
    pub test_id: TestId,
    pub test_name: String,
    pub missing: Vec<MissingParameter>,
    /// Bound names the definition does not declare
    pub unexpected: Vec<String>,
}

impl InstanceBindings {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

impl fmt::Display for InstanceBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}:", self.position, self.test_name)?;
        if !self.missing.is_empty() {
            write!(
                f,
                " Missing {} required parameters: {{",
                self.missing.len()
            )?;
            for (i, param) in self.missing.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", param)?;
            }
            write!(f, "}}")?;
        }
        if !self.unexpected.is_empty() {
            write!(f, " Unexpected parameters: {:?}", self.unexpected)?;
        }
        Ok(())
    }
}

/// Errors raised while binding arguments to test instances.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// One or more instances have missing or unexpected parameters
    #[error("{}", render_unresolved(.0))]
    Unresolved(Vec<InstanceBindings>),

    /// A shared input name is declared with two different types
    #[error("Shared input '{name}' declared as both {first} and {second}")]
    ConflictingInput {
        name: String,
        first: String,
        second: String,
    },
}

impl BindingError {
    /// Per-instance reports, empty for input conflicts.
    pub fn reports(&self) -> &[InstanceBindings] {
        match self {
            Self::Unresolved(reports) => reports,
            Self::ConflictingInput { .. } => &[],
        }
    }
}

fn render_unresolved(reports: &[InstanceBindings]) -> String {
    reports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur when talking to a definition store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Store returned an error status code
    #[error("Store error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse JSON
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// Authentication failed
    #[error("Authentication failed")]
    Unauthorized,

    /// Definition unknown to the store or the registry
    #[error("Definition not found: {0}")]
    NotFound(String),

    /// Stored version disagrees with the registered one
    #[error("Version conflict for {id}: registered {registered}, stored {stored}")]
    VersionConflict {
        id: TestId,
        registered: u32,
        stored: u32,
    },

    /// Generic store error with context
    #[error("Store error: {0}")]
    Other(String),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Convenience type alias for Results with DefinitionError
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Convenience type alias for Results with BindingError
pub type BindingResult<T> = Result<T, BindingError>;

/// Convenience type alias for Results with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
