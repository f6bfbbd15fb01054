//! Aggregated outcome of a suite run.

use super::result::TestResult;
use crate::domain::TestId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one suite entry, reported in add order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteTestResult {
    pub test_id: TestId,
    pub test_name: String,
    pub result: TestResult,
}

/// Outcome of one `Suite::run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_name: Option<String>,
    pub results: Vec<SuiteTestResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SuiteResult {
    /// Logical AND over every entry. An empty suite passes.
    pub fn passed(&self) -> bool {
        self.results.iter().all(|entry| entry.result.passed)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|e| e.result.passed).count()
    }

    /// Entries that ran and reported a negative outcome.
    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|e| !e.result.passed && !e.result.is_error)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|e| e.result.is_error).count()
    }

    pub fn get(&self, position: usize) -> Option<&TestResult> {
        self.results.get(position).map(|entry| &entry.result)
    }
}
