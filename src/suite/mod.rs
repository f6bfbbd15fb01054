//! Test suites.
//!
//! A [`Suite`] holds instances in add order. `run` resolves every argument of
//! every instance before anything executes; a single unresolved parameter
//! aborts the run with a report covering all instances. Once resolution
//! succeeds each instance executes exactly once, and a failure in one never
//! stops the others.

mod input;
pub(crate) mod resolution;

pub use input::SuiteInput;

use crate::error::{BindingResult, StoreResult};
use crate::instance::{Binding, TestInstance};
use crate::models::{Arguments, SuiteResult, SuiteTestResult, TestResult};
use crate::registry::Registry;
use crate::store::DefinitionStore;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// An ordered collection of test instances run together.
#[derive(Debug, Clone, Default)]
pub struct Suite {
    name: Option<String>,
    tests: Vec<TestInstance>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            tests: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Append an instance.
    pub fn add(mut self, instance: TestInstance) -> Self {
        self.tests.push(instance);
        self
    }

    /// Append an instance with extra bindings merged over its own.
    pub fn add_with<I, K>(self, instance: TestInstance, bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, Binding)>,
        K: Into<String>,
    {
        let instance = instance.rebuild(bindings);
        self.add(instance)
    }

    pub fn tests(&self) -> &[TestInstance] {
        &self.tests
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Shared inputs referenced by the suite, one per name.
    ///
    /// # Errors
    ///
    /// `ConflictingInput` when one name is declared with two types.
    pub fn inputs(&self) -> BindingResult<Vec<SuiteInput>> {
        resolution::collect_inputs(&self.tests)
    }

    /// Resolve and execute every instance in add order.
    ///
    /// # Errors
    ///
    /// Returns a `BindingError` before executing anything if any instance
    /// has missing or unexpected parameters.
    pub fn run(&self, globals: &Arguments) -> BindingResult<SuiteResult> {
        let resolved = self.resolve(globals)?;
        let started_at = Utc::now();
        info!(suite = ?self.name, tests = self.tests.len(), "Running suite");

        let results = self
            .tests
            .iter()
            .zip(resolved.iter())
            .map(|(instance, args)| instance.execute_with(args))
            .collect();

        Ok(self.finish(results, started_at))
    }

    /// Like [`Suite::run`], but executes instances on up to `workers`
    /// blocking threads. Results are still reported in add order.
    ///
    /// # Errors
    ///
    /// Returns a `BindingError` before executing anything if any instance
    /// has missing or unexpected parameters.
    pub async fn run_parallel(
        &self,
        globals: &Arguments,
        workers: usize,
    ) -> BindingResult<SuiteResult> {
        let resolved = self.resolve(globals)?;
        let started_at = Utc::now();
        info!(suite = ?self.name, tests = self.tests.len(), workers, "Running suite in parallel");

        let permits = Arc::new(Semaphore::new(workers.max(1)));
        let tasks = self
            .tests
            .iter()
            .cloned()
            .zip(resolved)
            .map(|(instance, args)| {
                let permits = permits.clone();
                async move {
                    let _permit = match permits.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => return TestResult::errored(format!("Worker pool closed: {}", e)),
                    };
                    let name = instance.meta().name.clone();
                    tokio::task::spawn_blocking(move || instance.execute_with(&args))
                        .await
                        .unwrap_or_else(|e| {
                            warn!(name = %name, error = %e, "Test worker failed");
                            TestResult::errored(format!("Test worker failed: {}", e))
                        })
                }
            });

        let results = join_all(tasks).await;
        Ok(self.finish(results, started_at))
    }

    /// Persist every definition in the suite that has no version yet.
    ///
    /// Returns the version of each instance's definition, in add order.
    ///
    /// # Errors
    ///
    /// Stops at the first store failure.
    pub fn upload(&self, registry: &Registry, store: &dyn DefinitionStore) -> StoreResult<Vec<u32>> {
        self.tests
            .iter()
            .map(|instance| instance.upload(registry, store))
            .collect()
    }

    fn resolve(&self, globals: &Arguments) -> BindingResult<Vec<Arguments>> {
        resolution::resolve_all(&self.tests, globals).map_err(|e| {
            error!(suite = ?self.name, error = %e, "Suite arguments could not be resolved");
            e
        })
    }

    fn finish(&self, results: Vec<TestResult>, started_at: chrono::DateTime<Utc>) -> SuiteResult {
        let results: Vec<SuiteTestResult> = self
            .tests
            .iter()
            .zip(results)
            .map(|(instance, result)| SuiteTestResult {
                test_id: instance.id().clone(),
                test_name: instance.meta().display_name.clone(),
                result,
            })
            .collect();

        let suite_result = SuiteResult {
            suite_name: self.name.clone(),
            results,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            suite = ?self.name,
            passed = suite_result.passed(),
            passed_count = suite_result.passed_count(),
            failed_count = suite_result.failed_count(),
            error_count = suite_result.error_count(),
            "Suite finished"
        );
        suite_result
    }
}
