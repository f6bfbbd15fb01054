//! Test instances: a registered definition plus its bound arguments.
//!
//! Function-bound and class-bound definitions are both wrapped in a
//! [`TestInstance`]; the difference is confined to the runner behind it.

mod definition;

pub use definition::{CheckClass, Definition};

use crate::domain::TestId;
use crate::error::{BindingError, BindingResult, StoreResult};
use crate::models::{ArgValue, Arguments, DefinitionKind, TestFunctionMeta, TestResult};
use crate::registry::Registry;
use crate::store::DefinitionStore;
use crate::suite::{resolution, SuiteInput};
use definition::Runner;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a parameter is bound to before a run.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A concrete value.
    Value(ArgValue),
    /// A shared input resolved once per suite run.
    Input(SuiteInput),
}

impl From<ArgValue> for Binding {
    fn from(value: ArgValue) -> Self {
        Self::Value(value)
    }
}

impl From<SuiteInput> for Binding {
    fn from(input: SuiteInput) -> Self {
        Self::Input(input)
    }
}

/// A definition with some (possibly none) of its arguments bound.
///
/// Instances of the same definition share metadata and logic but never
/// bindings.
#[derive(Clone)]
pub struct TestInstance {
    meta: Arc<TestFunctionMeta>,
    runner: Arc<dyn Runner>,
    params: BTreeMap<String, Binding>,
}

impl TestInstance {
    pub(crate) fn new(meta: Arc<TestFunctionMeta>, runner: Arc<dyn Runner>) -> Self {
        Self {
            meta,
            runner,
            params: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &TestId {
        &self.meta.uuid
    }

    pub fn meta(&self) -> &Arc<TestFunctionMeta> {
        &self.meta
    }

    pub fn kind(&self) -> DefinitionKind {
        self.meta.kind
    }

    /// Explicit bindings, keyed by parameter name.
    pub fn params(&self) -> &BTreeMap<String, Binding> {
        &self.params
    }

    /// Shared inputs referenced by this instance.
    pub fn inputs(&self) -> impl Iterator<Item = &SuiteInput> {
        self.params.values().filter_map(|binding| match binding {
            Binding::Input(input) => Some(input),
            Binding::Value(_) => None,
        })
    }

    /// Bind a value to a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.params
            .insert(name.into(), Binding::Value(value.into()));
        self
    }

    /// Wire a parameter to a shared input.
    pub fn with_input(mut self, name: impl Into<String>, input: &SuiteInput) -> Self {
        self.params
            .insert(name.into(), Binding::Input(input.clone()));
        self
    }

    /// A new instance of the same definition with `overrides` merged over
    /// the current bindings.
    pub fn rebuild<I, K>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, Binding)>,
        K: Into<String>,
    {
        let mut params = self.params.clone();
        for (name, binding) in overrides {
            params.insert(name.into(), binding);
        }
        Self {
            meta: self.meta.clone(),
            runner: self.runner.clone(),
            params,
        }
    }

    /// Run this instance on its own, using only its bindings and declared
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `BindingError::Unresolved` if a required parameter is unbound,
    /// wired to a shared input, or an unknown parameter is bound.
    pub fn execute(&self) -> BindingResult<TestResult> {
        let args = resolution::resolve_instance(0, self, &Arguments::new(), &HashMap::new())
            .map_err(|report| BindingError::Unresolved(vec![report]))?;
        Ok(self.execute_with(&args))
    }

    /// Invoke the logic with fully resolved arguments.
    ///
    /// Errors returned by the check and panics raised inside it become an
    /// errored result instead of propagating.
    pub(crate) fn execute_with(&self, args: &Arguments) -> TestResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.runner.run(args)));
        match outcome {
            Ok(Ok(outcome)) => {
                let mut result = outcome.into_result();
                if result.is_error {
                    result.passed = false;
                }
                debug!(test_id = %self.meta.uuid, passed = result.passed, "Test executed");
                result
            }
            Ok(Err(err)) => {
                warn!(test_id = %self.meta.uuid, name = %self.meta.name, error = %err, "Test raised an error");
                TestResult::errored(format!("{:#}", err))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(test_id = %self.meta.uuid, name = %self.meta.name, panic = %message, "Test panicked");
                TestResult::errored(format!("{} panicked: {}", self.meta.name, message))
            }
        }
    }

    /// Persist this instance's definition if it has no version yet.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn upload(&self, registry: &Registry, store: &dyn DefinitionStore) -> StoreResult<u32> {
        if registry.get(self.id()).is_none() {
            registry.adopt(self.meta.as_ref().clone());
        }
        registry.save(store, self.id(), self.meta.code.as_bytes())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl fmt::Debug for TestInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestInstance")
            .field("id", &self.meta.uuid)
            .field("name", &self.meta.name)
            .field("params", &self.params)
            .finish()
    }
}
