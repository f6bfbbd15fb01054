//! Declarations: the introspectable description of a check.

use crate::domain::{ParamType, TestId};
use crate::error::{DefinitionError, DefinitionResult};
use crate::models::{DefinitionKind, TestFunctionArgument, TestFunctionMeta};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static PARAM_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Failed to compile parameter name regex")
});

static MODULE_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("Failed to compile module path regex")
});

/// Everything the registry needs to know about a check before it is
/// registered: where it lives, what it is called, and what it accepts.
///
/// # Example
///
/// ```
/// use check_suite::domain::ParamType;
/// use check_suite::registry::Declaration;
///
/// let declaration = Declaration::new("checks.performance", "test_auc")
///     .doc("Passes when the AUC is above the threshold")
///     .param("model", ParamType::object("BaseModel"))
///     .param("dataset", ParamType::object("Dataset"))
///     .optional_param("threshold", ParamType::Float, 1.0)
///     .tag("performance");
///
/// let meta = declaration.to_meta().unwrap();
/// assert_eq!(meta.args.len(), 3);
/// assert!(meta.arg("threshold").unwrap().is_optional());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    module: String,
    name: String,
    display_name: Option<String>,
    doc: String,
    module_doc: String,
    code: String,
    tags: Vec<String>,
    params: Vec<TestFunctionArgument>,
    kind: DefinitionKind,
}

impl Declaration {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            display_name: None,
            doc: String::new(),
            module_doc: String::new(),
            code: String::new(),
            tags: Vec::new(),
            params: Vec::new(),
            kind: DefinitionKind::Function,
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn module_doc(mut self, module_doc: impl Into<String>) -> Self {
        self.module_doc = module_doc.into();
        self
    }

    /// Source text shown alongside the definition.
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Declare a required parameter.
    pub fn param(mut self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.params
            .push(TestFunctionArgument::required(name, param_type));
        self
    }

    /// Declare an optional parameter with its default.
    pub fn optional_param(
        mut self,
        name: impl Into<String>,
        param_type: ParamType,
        default: impl Into<serde_json::Value>,
    ) -> Self {
        self.params
            .push(TestFunctionArgument::optional(name, param_type, default.into()));
        self
    }

    pub(crate) fn with_kind(mut self, kind: DefinitionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    /// Identity of the declared definition.
    pub fn id(&self) -> TestId {
        TestId::derive(&self.module, &self.name)
    }

    /// Validate the declaration and produce its (unversioned) metadata.
    ///
    /// # Errors
    ///
    /// Returns a `DefinitionError` when the name or module is empty, the
    /// name is not an identifier, the module is not a dotted path of
    /// identifiers, a parameter name is not an identifier or is declared
    /// twice, or a default does not fit its declared scalar type.
    pub fn to_meta(&self) -> DefinitionResult<TestFunctionMeta> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if self.module.trim().is_empty() {
            return Err(DefinitionError::EmptyModule);
        }
        if !PARAM_NAME_REGEX.is_match(&self.name) {
            return Err(DefinitionError::InvalidName(self.name.clone()));
        }
        if !MODULE_PATH_REGEX.is_match(&self.module) {
            return Err(DefinitionError::InvalidModule(self.module.clone()));
        }

        let mut seen = HashSet::new();
        for param in &self.params {
            if !PARAM_NAME_REGEX.is_match(&param.name) {
                return Err(DefinitionError::InvalidParameterName(param.name.clone()));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(DefinitionError::DuplicateParameter(param.name.clone()));
            }
            if let Some(default) = param.default() {
                if !param.param_type.accepts_default(default) {
                    return Err(DefinitionError::DefaultTypeMismatch {
                        name: param.name.clone(),
                        expected: param.param_type.to_string(),
                    });
                }
            }
        }

        let mut tags = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }

        Ok(TestFunctionMeta {
            uuid: self.id(),
            name: self.name.clone(),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| self.name.clone()),
            module: self.module.clone(),
            doc: self.doc.clone(),
            module_doc: self.module_doc.clone(),
            code: self.code.clone(),
            tags,
            args: self.params.clone(),
            kind: self.kind,
            version: None,
        })
    }
}
