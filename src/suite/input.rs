//! Shared suite inputs.

use crate::domain::ParamType;
use serde::{Deserialize, Serialize};

/// A named placeholder whose value is supplied once per suite run and seen by
/// every instance wired to it.
///
/// The value is looked up among the run's global bindings under the input's
/// own name, which may differ from the parameter it is wired to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuiteInput {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
}

impl SuiteInput {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}
