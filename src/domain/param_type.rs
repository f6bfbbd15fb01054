//! Declared parameter types.

use super::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The declared type of a test parameter.
///
/// Scalars are checked against JSON defaults at registration. Anything else
/// (models, datasets, slicing functions) is carried by name and passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Int,
    Float,
    Str,
    Bool,
    /// An opaque collaborator type, e.g. `Dataset` or `BaseModel`.
    Object(String),
}

impl ParamType {
    /// Build an opaque object type.
    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    /// Name of the type as written in metadata.
    pub fn name(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Object(name) => name,
        }
    }

    /// Whether a JSON default fits this type. `null` fits every type.
    pub fn accepts_default(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Int, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Float, Value::Number(_)) => true,
            (Self::Str, Value::String(_)) => true,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Object(_), _) => true,
            _ => false,
        }
    }
}

impl FromStr for ParamType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "" => Err(ValidationError::EmptyTypeName),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "str" => Ok(Self::Str),
            "bool" => Ok(Self::Bool),
            other => Ok(Self::Object(other.to_string())),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for ParamType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
