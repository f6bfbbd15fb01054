//! Data models for test definitions, argument values and results.

pub mod metadata;
pub mod result;
pub mod suite_result;
pub mod value;

pub use metadata::{DefinitionKind, TestFunctionArgument, TestFunctionMeta};
pub use result::{Outcome, TestMessage, TestMessageLevel, TestResult};
pub use suite_result::{SuiteResult, SuiteTestResult};
pub use value::{ArgValue, Arguments};
