//! Executable definitions: a declaration paired with the logic it describes.

use crate::domain::TestId;
use crate::error::{DefinitionError, DefinitionResult};
use crate::models::{Arguments, DefinitionKind, Outcome};
use crate::registry::{Declaration, Registry};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::TestInstance;

/// A stateful check, constructed from its bound arguments and then executed
/// without arguments.
///
/// # Example
///
/// ```
/// use check_suite::domain::ParamType;
/// use check_suite::instance::CheckClass;
/// use check_suite::models::{Arguments, Outcome};
/// use check_suite::registry::Declaration;
///
/// struct AtLeast {
///     value: i64,
///     minimum: i64,
/// }
///
/// impl CheckClass for AtLeast {
///     fn declaration() -> Declaration {
///         Declaration::new("checks", "at_least")
///             .param("value", ParamType::Int)
///             .optional_param("minimum", ParamType::Int, 0)
///     }
///
///     fn from_arguments(args: &Arguments) -> anyhow::Result<Self> {
///         Ok(Self {
///             value: args.i64("value")?,
///             minimum: args.i64("minimum")?,
///         })
///     }
///
///     fn execute(&self) -> anyhow::Result<Outcome> {
///         Ok((self.value >= self.minimum).into())
///     }
/// }
/// ```
pub trait CheckClass: Send + Sync + Sized + 'static {
    /// Declaration registered for this check.
    fn declaration() -> Declaration;

    /// Build the check from its resolved arguments.
    fn from_arguments(args: &Arguments) -> anyhow::Result<Self>;

    /// Run the check.
    fn execute(&self) -> anyhow::Result<Outcome>;
}

/// Invokes the logic behind a definition.
pub(crate) trait Runner: Send + Sync {
    fn run(&self, args: &Arguments) -> anyhow::Result<Outcome>;
}

type CheckFn = dyn Fn(&Arguments) -> anyhow::Result<Outcome> + Send + Sync;

struct FunctionRunner(Box<CheckFn>);

impl Runner for FunctionRunner {
    fn run(&self, args: &Arguments) -> anyhow::Result<Outcome> {
        (self.0)(args)
    }
}

struct ClassRunner<C>(PhantomData<fn() -> C>);

impl<C: CheckClass> Runner for ClassRunner<C> {
    fn run(&self, args: &Arguments) -> anyhow::Result<Outcome> {
        C::from_arguments(args)?.execute()
    }
}

/// A declaration plus the logic it describes.
///
/// Cloning is cheap; clones share the declaration and the logic.
#[derive(Clone)]
pub struct Definition {
    declaration: Arc<Declaration>,
    runner: Arc<dyn Runner>,
}

impl Definition {
    /// A function-bound definition.
    pub fn function<F>(declaration: Declaration, check: F) -> Self
    where
        F: Fn(&Arguments) -> anyhow::Result<Outcome> + Send + Sync + 'static,
    {
        Self {
            declaration: Arc::new(declaration.with_kind(DefinitionKind::Function)),
            runner: Arc::new(FunctionRunner(Box::new(check))),
        }
    }

    /// A class-bound definition.
    pub fn class<C: CheckClass>() -> Self {
        Self {
            declaration: Arc::new(C::declaration().with_kind(DefinitionKind::Class)),
            runner: Arc::new(ClassRunner::<C>(PhantomData)),
        }
    }

    pub fn id(&self) -> TestId {
        self.declaration.id()
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn kind(&self) -> DefinitionKind {
        self.declaration.kind()
    }

    /// Create an instance with no bound arguments, registering the
    /// definition first if its identity is unknown to `registry`.
    ///
    /// # Errors
    ///
    /// Returns a `DefinitionError` if the declaration is malformed, or
    /// `Conflict` if its identity is registered with different metadata.
    pub fn bind(&self, registry: &Registry) -> DefinitionResult<TestInstance> {
        let candidate = self.declaration.to_meta()?;
        let meta = registry.insert_first(candidate.clone());
        if !meta.same_definition(&candidate) {
            return Err(DefinitionError::Conflict {
                id: candidate.uuid,
                module: candidate.module,
                name: candidate.name,
            });
        }
        Ok(TestInstance::new(meta, self.runner.clone()))
    }

    /// `bind` against the process-wide registry.
    ///
    /// # Errors
    ///
    /// Returns a `DefinitionError` if the declaration is malformed.
    pub fn instance(&self) -> DefinitionResult<TestInstance> {
        self.bind(crate::registry::global())
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("module", &self.declaration.module())
            .field("name", &self.declaration.name())
            .field("kind", &self.declaration.kind())
            .finish()
    }
}
