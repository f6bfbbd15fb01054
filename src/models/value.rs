//! Argument values passed to check bodies.

use anyhow::{anyhow, Context};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A value bound to a test parameter.
///
/// Scalars travel as JSON so they can be compared with declared defaults and
/// persisted. Collaborators such as models and datasets travel as shared
/// opaque objects; the engine never looks inside them.
#[derive(Clone)]
pub enum ArgValue {
    Json(serde_json::Value),
    Object {
        type_name: &'static str,
        value: Arc<dyn Any + Send + Sync>,
    },
}

impl ArgValue {
    /// Wrap an opaque collaborator value.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Self::shared(Arc::new(value))
    }

    /// Wrap an already shared collaborator value.
    pub fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self::Object {
            type_name: std::any::type_name::<T>(),
            value,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Object { .. } => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(serde_json::Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_json().and_then(serde_json::Value::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(serde_json::Value::as_str)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(serde_json::Value::as_bool)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(serde_json::Value::Null))
    }

    /// Borrow the collaborator value as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object { value, .. } => value.downcast_ref::<T>(),
            Self::Json(_) => None,
        }
    }

    /// Whether two values are the very same run-time value.
    ///
    /// Objects compare by allocation, JSON by content.
    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object { value: a, .. }, Self::Object { value: b, .. }) => Arc::ptr_eq(a, b),
            (Self::Json(a), Self::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{}", value),
            Self::Object { type_name, .. } => write!(f, "<{}>", type_name),
        }
    }
}

impl From<serde_json::Value> for ArgValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Json(value.into())
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Json(value.into())
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Json(value.into())
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Json(value.into())
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Json(value.into())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Json(value.into())
    }
}

/// Fully resolved arguments handed to a check body.
///
/// Accessors return `anyhow::Result` so check bodies can use `?`.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: BTreeMap<String, ArgValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of `insert`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The value bound to `name`.
    pub fn value(&self, name: &str) -> anyhow::Result<&ArgValue> {
        self.values
            .get(name)
            .ok_or_else(|| anyhow!("argument '{}' is not bound", name))
    }

    pub fn i64(&self, name: &str) -> anyhow::Result<i64> {
        self.value(name)?
            .as_i64()
            .with_context(|| format!("argument '{}' is not an int", name))
    }

    pub fn f64(&self, name: &str) -> anyhow::Result<f64> {
        self.value(name)?
            .as_f64()
            .with_context(|| format!("argument '{}' is not a float", name))
    }

    pub fn str(&self, name: &str) -> anyhow::Result<&str> {
        self.value(name)?
            .as_str()
            .with_context(|| format!("argument '{}' is not a str", name))
    }

    pub fn bool(&self, name: &str) -> anyhow::Result<bool> {
        self.value(name)?
            .as_bool()
            .with_context(|| format!("argument '{}' is not a bool", name))
    }

    /// Borrow a collaborator argument as `T`.
    pub fn object<T: Any>(&self, name: &str) -> anyhow::Result<&T> {
        self.value(name)?.downcast_ref::<T>().with_context(|| {
            format!(
                "argument '{}' is not a {}",
                name,
                std::any::type_name::<T>()
            )
        })
    }

    /// Borrow an optional collaborator argument; `null` reads as `None`.
    pub fn optional_object<T: Any>(&self, name: &str) -> anyhow::Result<Option<&T>> {
        match self.values.get(name) {
            None => Ok(None),
            Some(value) if value.is_null() => Ok(None),
            Some(_) => self.object(name).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Dataset {
        rows: usize,
    }

    #[test]
    fn test_scalar_accessors() {
        let args = Arguments::new()
            .with("a", 3)
            .with("threshold", 0.5)
            .with("label", "yes")
            .with("strict", true);

        assert_eq!(args.i64("a").unwrap(), 3);
        assert_eq!(args.f64("threshold").unwrap(), 0.5);
        assert_eq!(args.f64("a").unwrap(), 3.0);
        assert_eq!(args.str("label").unwrap(), "yes");
        assert!(args.bool("strict").unwrap());
    }

    #[test]
    fn test_accessor_errors() {
        let args = Arguments::new().with("a", "text");
        let err = args.i64("a").unwrap_err();
        assert!(err.to_string().contains("not an int"));

        let err = args.i64("missing").unwrap_err();
        assert!(err.to_string().contains("not bound"));
    }

    #[test]
    fn test_object_arguments() {
        let args = Arguments::new()
            .with("dataset", ArgValue::object(Dataset { rows: 10 }))
            .with("slicing_function", json!(null));

        assert_eq!(args.object::<Dataset>("dataset").unwrap().rows, 10);
        assert!(args.object::<String>("dataset").is_err());
        assert!(args
            .optional_object::<Dataset>("slicing_function")
            .unwrap()
            .is_none());
        assert!(args.optional_object::<Dataset>("absent").unwrap().is_none());
    }

    #[test]
    fn test_is_same() {
        let shared = ArgValue::object(Dataset { rows: 1 });
        let copy = shared.clone();
        let other = ArgValue::object(Dataset { rows: 1 });

        assert!(shared.is_same(&copy));
        assert!(!shared.is_same(&other));
        assert!(ArgValue::from(5).is_same(&ArgValue::from(5)));
    }

    #[test]
    fn test_debug_hides_objects() {
        let value = ArgValue::object(Dataset { rows: 1 });
        assert!(format!("{:?}", value).contains("Dataset"));
        assert_eq!(format!("{:?}", ArgValue::from(2)), "2");
    }
}
