//! Check Suite - a registry of declarative test checks and an engine that runs
//! them as suites.
//!
//! Checks are declared with typed parameters and optional defaults, bound into
//! instances with local values or shared suite inputs, and executed together
//! with global arguments filling whatever remains.
//!
//! # Architecture
//!
//! - **domain**: Validated value objects (test identity, parameter types)
//! - **models**: Definition metadata, argument values and results
//! - **registry**: Process-wide, append-only definition registry
//! - **instance**: Function and class checks and their bound instances
//! - **suite**: Argument resolution and suite execution
//! - **store**: Local and remote persistence for definitions
//! - **error**: Custom error types for precise error handling
//! - **config**: Configuration management from environment variables

pub mod config;
pub mod domain;
pub mod error;
pub mod instance;
pub mod models;
pub mod registry;
pub mod store;
pub mod suite;

pub use config::Config;
pub use domain::{ParamType, TestId};
pub use error::{BindingError, ConfigError, DefinitionError, StoreError};
pub use instance::{Binding, CheckClass, Definition, TestInstance};
pub use models::{
    ArgValue, Arguments, DefinitionKind, Outcome, SuiteResult, SuiteTestResult,
    TestFunctionArgument, TestFunctionMeta, TestMessage, TestMessageLevel, TestResult,
};
pub use registry::{Declaration, Registry};
pub use store::{DefinitionStore, LocalDirStore, RemoteStore};
pub use suite::{Suite, SuiteInput};
