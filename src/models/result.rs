//! Outcome of a single test execution.

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestMessageLevel {
    Error,
    Info,
}

/// A diagnostic message attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMessage {
    #[serde(rename = "type")]
    pub level: TestMessageLevel,
    pub text: String,
}

impl TestMessage {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: TestMessageLevel::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: TestMessageLevel::Info,
            text: text.into(),
        }
    }
}

/// Structured result of one test.
///
/// `is_error` separates "the check ran and said no" from "the check could
/// not run". An errored result never passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TestResult {
    pub passed: bool,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<TestMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<f64>,
    /// Arbitrary supporting payload, e.g. failing examples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

impl TestResult {
    pub fn passed() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    /// Result synthesized when a check could not run.
    pub fn errored(text: impl Into<String>) -> Self {
        Self {
            passed: false,
            is_error: true,
            messages: vec![TestMessage::error(text)],
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: TestMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_metric(mut self, metric: f64) -> Self {
        self.metric = Some(metric);
        self
    }

    pub fn with_output(mut self, output: serde_json::Value) -> Self {
        self.output = Some(output);
        self
    }
}

impl From<bool> for TestResult {
    fn from(passed: bool) -> Self {
        Self {
            passed,
            ..Default::default()
        }
    }
}

/// What a check body returns: a bare verdict or a full result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Verdict(bool),
    Detailed(TestResult),
}

impl Outcome {
    pub fn into_result(self) -> TestResult {
        match self {
            Self::Verdict(passed) => TestResult::from(passed),
            Self::Detailed(result) => result,
        }
    }
}

impl From<bool> for Outcome {
    fn from(passed: bool) -> Self {
        Self::Verdict(passed)
    }
}

impl From<TestResult> for Outcome {
    fn from(result: TestResult) -> Self {
        Self::Detailed(result)
    }
}
