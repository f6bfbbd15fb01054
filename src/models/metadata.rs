//! Test definition metadata.

use crate::domain::{ParamType, TestId};
use serde::{Deserialize, Serialize};

/// Whether a definition is backed by a plain function or a check class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    #[default]
    Function,
    Class,
}

/// One declared parameter of a test definition.
///
/// A parameter is optional exactly when it carries a default; `optional()`
/// is derived and cannot disagree with the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ArgumentRepr", into = "ArgumentRepr")]
pub struct TestFunctionArgument {
    pub name: String,
    pub param_type: ParamType,
    default: Option<serde_json::Value>,
}

impl TestFunctionArgument {
    /// A required parameter.
    pub fn required(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            default: None,
        }
    }

    /// An optional parameter with its default (which may be `null`).
    pub fn optional(
        name: impl Into<String>,
        param_type: ParamType,
        default: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            default: Some(default),
        }
    }

    pub fn default(&self) -> Option<&serde_json::Value> {
        self.default.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// Wire shape of an argument: `{name, type, default, optional}`.
#[derive(Serialize, Deserialize)]
struct ArgumentRepr {
    name: String,
    #[serde(rename = "type")]
    param_type: ParamType,
    #[serde(default)]
    default: serde_json::Value,
    #[serde(default)]
    optional: bool,
}

impl From<ArgumentRepr> for TestFunctionArgument {
    fn from(repr: ArgumentRepr) -> Self {
        Self {
            name: repr.name,
            param_type: repr.param_type,
            default: repr.optional.then_some(repr.default),
        }
    }
}

impl From<TestFunctionArgument> for ArgumentRepr {
    fn from(arg: TestFunctionArgument) -> Self {
        let optional = arg.is_optional();
        Self {
            name: arg.name,
            param_type: arg.param_type,
            default: arg.default.unwrap_or(serde_json::Value::Null),
            optional,
        }
    }
}

/// Immutable description of a registered test definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFunctionMeta {
    pub uuid: TestId,
    pub name: String,
    pub display_name: String,
    pub module: String,
    #[serde(default)]
    pub doc: String,
    #[serde(default)]
    pub module_doc: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub args: Vec<TestFunctionArgument>,
    #[serde(default)]
    pub kind: DefinitionKind,
    /// Absent until the definition has been persisted.
    #[serde(default)]
    pub version: Option<u32>,
}

impl TestFunctionMeta {
    /// Look up a declared parameter by name.
    pub fn arg(&self, name: &str) -> Option<&TestFunctionArgument> {
        self.args.iter().find(|arg| arg.name == name)
    }

    /// Declared parameters without a default.
    pub fn required_args(&self) -> impl Iterator<Item = &TestFunctionArgument> {
        self.args.iter().filter(|arg| !arg.is_optional())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Copy of this metadata carrying a persisted version.
    pub fn with_version(&self, version: u32) -> Self {
        Self {
            version: Some(version),
            ..self.clone()
        }
    }

    /// Same definition, ignoring the persisted version.
    pub fn same_definition(&self, other: &Self) -> bool {
        self.uuid == other.uuid
            && self.name == other.name
            && self.display_name == other.display_name
            && self.module == other.module
            && self.doc == other.doc
            && self.module_doc == other.module_doc
            && self.code == other.code
            && self.tags == other.tags
            && self.args == other.args
            && self.kind == other.kind
    }
}
