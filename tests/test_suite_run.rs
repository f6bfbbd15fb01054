//! Integration tests for suite execution: argument resolution, failure
//! isolation and result ordering.

use anyhow::anyhow;
use check_suite::error::BindingError;
use check_suite::models::{ArgValue, Arguments, Outcome, TestMessageLevel, TestResult};
use check_suite::{CheckClass, Declaration, Definition, ParamType, Registry, Suite, SuiteInput};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const MODULE: &str = "suite_run_tests";

fn greater() -> Definition {
    Definition::function(
        Declaration::new(MODULE, "greater")
            .param("a", ParamType::Int)
            .param("b", ParamType::Int),
        |args| Ok((args.i64("a")? > args.i64("b")?).into()),
    )
}

fn counting(name: &str, calls: Arc<AtomicUsize>) -> Definition {
    Definition::function(
        Declaration::new(MODULE, name).param("value", ParamType::Int),
        move |args| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok((args.i64("value")? >= 0).into())
        },
    )
}

/// A model collaborator shared between checks.
struct Model {
    threshold: i64,
}

#[test]
fn test_bound_arguments_fail() {
    let registry = Registry::new();
    let instance = greater().bind(&registry).unwrap().with("a", 1).with("b", 2);

    let result = Suite::new().add(instance).run(&Arguments::new()).unwrap();

    assert!(!result.passed());
    assert_eq!(result.len(), 1);
    assert!(!result.results[0].result.passed);
    assert!(!result.results[0].result.is_error);
}

#[test]
fn test_bound_arguments_pass() {
    let registry = Registry::new();
    let instance = greater().bind(&registry).unwrap().with("a", 2).with("b", 1);

    let result = Suite::new().add(instance).run(&Arguments::new()).unwrap();

    assert!(result.passed());
    assert_eq!(result.passed_count(), 1);
}

#[test]
fn test_missing_parameter_reported() {
    let registry = Registry::new();
    let instance = greater().bind(&registry).unwrap();

    let err = Suite::new()
        .add(instance)
        .run(&Arguments::new().with("a", 2))
        .unwrap_err();

    let reports = err.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].position, 0);
    assert_eq!(reports[0].missing.len(), 1);
    assert_eq!(reports[0].missing[0].name, "b");
    assert_eq!(reports[0].missing[0].declared_type, "int");
    assert_eq!(
        err.to_string(),
        "#0 greater: Missing 1 required parameters: {'b': int}"
    );
}

#[test]
fn test_all_missing_parameters_reported_together() {
    let registry = Registry::new();
    let suite = Suite::new()
        .add(greater().bind(&registry).unwrap())
        .add(greater().bind(&registry).unwrap().with("a", 1));

    let err = suite.run(&Arguments::new()).unwrap_err();

    let reports = err.reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(
        reports[0].to_string(),
        "#0 greater: Missing 2 required parameters: {'a': int, 'b': int}"
    );
    assert_eq!(reports[1].position, 1);
    assert_eq!(reports[1].missing[0].name, "b");
}

#[test]
fn test_global_arguments_fill_every_instance() {
    let registry = Registry::new();
    let suite = Suite::new()
        .add(greater().bind(&registry).unwrap())
        .add(greater().bind(&registry).unwrap());

    let result = suite
        .run(&Arguments::new().with("a", 2).with("b", 1))
        .unwrap();

    assert!(result.passed());
    assert_eq!(result.passed_count(), 2);
}

#[test]
fn test_local_binding_overrides_global() {
    let registry = Registry::new();
    let instance = greater().bind(&registry).unwrap().with("a", 1);

    let result = Suite::new()
        .add(instance)
        .run(&Arguments::new().with("a", 5).with("b", 2))
        .unwrap();

    assert!(!result.passed());
}

#[test]
fn test_global_overrides_default() {
    let registry = Registry::new();
    let definition = Definition::function(
        Declaration::new(MODULE, "at_least")
            .param("value", ParamType::Int)
            .optional_param("minimum", ParamType::Int, 10),
        |args| Ok((args.i64("value")? >= args.i64("minimum")?).into()),
    );

    let with_default = Suite::new()
        .add(definition.bind(&registry).unwrap().with("value", 5))
        .run(&Arguments::new())
        .unwrap();
    assert!(!with_default.passed());

    let with_global = Suite::new()
        .add(definition.bind(&registry).unwrap().with("value", 5))
        .run(&Arguments::new().with("minimum", 3))
        .unwrap();
    assert!(with_global.passed());
}

#[test]
fn test_shared_input_gives_every_instance_the_same_object() {
    let registry = Registry::new();
    let seen: Arc<Mutex<Vec<ArgValue>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let definition = Definition::function(
        Declaration::new(MODULE, "model_threshold")
            .param("model", ParamType::object("Model"))
            .param("value", ParamType::Int),
        move |args| {
            recorder.lock().unwrap().push(args.value("model")?.clone());
            let model = args.object::<Model>("model")?;
            Ok((args.i64("value")? >= model.threshold).into())
        },
    );

    let model = SuiteInput::new("model", ParamType::object("Model"));
    let suite = Suite::new()
        .add(
            definition
                .bind(&registry)
                .unwrap()
                .with_input("model", &model)
                .with("value", 5),
        )
        .add(
            definition
                .bind(&registry)
                .unwrap()
                .with_input("model", &model)
                .with("value", 1),
        );

    assert_eq!(suite.inputs().unwrap(), vec![model.clone()]);

    let result = suite
        .run(&Arguments::new().with("model", ArgValue::object(Model { threshold: 3 })))
        .unwrap();

    assert!(result.results[0].result.passed);
    assert!(!result.results[1].result.passed);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_same(&seen[1]));
}

#[test]
fn test_shared_input_wired_under_another_name() {
    let registry = Registry::new();
    let limit = SuiteInput::new("limit", ParamType::Int);
    let instance = greater()
        .bind(&registry)
        .unwrap()
        .with("a", 5)
        .with_input("b", &limit);

    let result = Suite::new()
        .add(instance)
        .run(&Arguments::new().with("limit", 3))
        .unwrap();

    assert!(result.passed());
}

#[test]
fn test_unresolved_shared_input_does_not_fall_back_to_globals() {
    let registry = Registry::new();
    let limit = SuiteInput::new("limit", ParamType::Int);
    let instance = greater()
        .bind(&registry)
        .unwrap()
        .with("a", 5)
        .with_input("b", &limit);

    let err = Suite::new()
        .add(instance)
        .run(&Arguments::new().with("b", 3))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "#0 greater: Missing 1 required parameters: {'b' (shared input 'limit'): int}"
    );
}

#[test]
fn test_conflicting_shared_inputs() {
    let registry = Registry::new();
    let as_int = SuiteInput::new("limit", ParamType::Int);
    let as_float = SuiteInput::new("limit", ParamType::Float);
    let suite = Suite::new()
        .add(greater().bind(&registry).unwrap().with("a", 1).with_input("b", &as_int))
        .add(greater().bind(&registry).unwrap().with("a", 1).with_input("b", &as_float));

    let err = suite.run(&Arguments::new().with("limit", 0)).unwrap_err();

    assert_eq!(
        err,
        BindingError::ConflictingInput {
            name: "limit".to_string(),
            first: "int".to_string(),
            second: "float".to_string(),
        }
    );
    assert!(err.reports().is_empty());
}

#[test]
fn test_unexpected_parameter_reported() {
    let registry = Registry::new();
    let instance = greater()
        .bind(&registry)
        .unwrap()
        .with("a", 2)
        .with("b", 1)
        .with("c", 0);

    let err = Suite::new().add(instance).run(&Arguments::new()).unwrap_err();

    let reports = err.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].missing.is_empty());
    assert_eq!(reports[0].unexpected, vec!["c".to_string()]);
}

#[test]
fn test_binding_error_executes_nothing() {
    let registry = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let definition = counting("counted", calls.clone());

    let suite = Suite::new()
        .add(definition.bind(&registry).unwrap().with("value", 1))
        .add(greater().bind(&registry).unwrap());

    assert!(suite.run(&Arguments::new()).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_same_definition_executes_once_per_instance() {
    let registry = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let definition = counting("counted_twice", calls.clone());

    let suite = Suite::new()
        .add(definition.bind(&registry).unwrap().with("value", 1))
        .add(definition.bind(&registry).unwrap().with("value", -1));

    let result = suite.run(&Arguments::new()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(registry.len(), 1);
    assert!(result.results[0].result.passed);
    assert!(!result.results[1].result.passed);
    assert_eq!(result.results[0].test_id, result.results[1].test_id);
}

#[test]
fn test_error_in_one_check_does_not_stop_others() {
    let registry = Registry::new();
    let failing = Definition::function(Declaration::new(MODULE, "raises"), |_| {
        Err(anyhow!("dataset has no rows"))
    });

    let suite = Suite::new()
        .add(failing.bind(&registry).unwrap())
        .add(greater().bind(&registry).unwrap().with("a", 2).with("b", 1));

    let result = suite.run(&Arguments::new()).unwrap();

    assert!(!result.passed());
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.passed_count(), 1);

    let errored = &result.results[0].result;
    assert!(errored.is_error);
    assert!(!errored.passed);
    assert_eq!(errored.messages[0].level, TestMessageLevel::Error);
    assert!(errored.messages[0].text.contains("dataset has no rows"));
}

#[test]
fn test_panic_in_one_check_does_not_stop_others() {
    let registry = Registry::new();
    let panicking = Definition::function(Declaration::new(MODULE, "explodes"), |_| {
        panic!("index out of range")
    });

    let suite = Suite::new()
        .add(panicking.bind(&registry).unwrap())
        .add(greater().bind(&registry).unwrap().with("a", 2).with("b", 1));

    let result = suite.run(&Arguments::new()).unwrap();

    let errored = &result.results[0].result;
    assert!(errored.is_error);
    assert!(errored.messages[0].text.contains("explodes panicked: index out of range"));
    assert!(result.results[1].result.passed);
}

#[test]
fn test_detailed_result_is_kept() {
    let registry = Registry::new();
    let definition = Definition::function(
        Declaration::new(MODULE, "metric_check").param("value", ParamType::Float),
        |args| {
            let value = args.f64("value")?;
            Ok(Outcome::Detailed(
                TestResult::from(value < 0.5)
                    .with_metric(value)
                    .with_message(check_suite::TestMessage::info("drift measured")),
            ))
        },
    );

    let result = Suite::new()
        .add(definition.bind(&registry).unwrap().with("value", 0.25))
        .run(&Arguments::new())
        .unwrap();

    let detailed = result.get(0).unwrap();
    assert!(detailed.passed);
    assert_eq!(detailed.metric, Some(0.25));
    assert_eq!(detailed.messages[0].text, "drift measured");
}

struct AtLeast {
    value: i64,
    minimum: i64,
}

impl CheckClass for AtLeast {
    fn declaration() -> Declaration {
        Declaration::new(MODULE, "AtLeast")
            .param("value", ParamType::Int)
            .optional_param("minimum", ParamType::Int, 0)
    }

    fn from_arguments(args: &Arguments) -> anyhow::Result<Self> {
        Ok(Self {
            value: args.i64("value")?,
            minimum: args.i64("minimum")?,
        })
    }

    fn execute(&self) -> anyhow::Result<Outcome> {
        Ok((self.value >= self.minimum).into())
    }
}

#[test]
fn test_class_checks_run_like_functions() {
    let registry = Registry::new();
    let definition = Definition::class::<AtLeast>();

    let suite = Suite::new()
        .add(definition.bind(&registry).unwrap().with("value", 1))
        .add(definition.bind(&registry).unwrap().with("value", 1).with("minimum", 2))
        .add(greater().bind(&registry).unwrap().with("a", 2).with("b", 1));

    let result = suite.run(&Arguments::new()).unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.results[0].result.passed);
    assert!(!result.results[1].result.passed);
    assert!(result.results[2].result.passed);
    assert_eq!(
        registry.get(&definition.id()).unwrap().kind,
        check_suite::DefinitionKind::Class
    );
}

/// Records its name in `log` on every execution.
fn logging(name: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Definition {
    Definition::function(
        Declaration::new(MODULE, name).param("value", ParamType::Int),
        move |args| {
            log.lock().unwrap().push(name);
            Ok((args.i64("value")? >= 0).into())
        },
    )
}

#[test]
fn test_executes_once_each_in_add_order() {
    let registry = Registry::new();
    let log: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let suite = Suite::named("ordering")
        .add(logging("zeta", log.clone()).bind(&registry).unwrap())
        .add(logging("alpha", log.clone()).bind(&registry).unwrap())
        .add(logging("middle", log.clone()).bind(&registry).unwrap().with("value", -1))
        .add(logging("alpha", log.clone()).bind(&registry).unwrap().with("value", 2));

    let result = suite.run(&Arguments::new().with("value", 1)).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["zeta", "alpha", "middle", "alpha"]
    );

    let names: Vec<&str> = result
        .results
        .iter()
        .map(|r| r.test_name.as_str())
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "middle", "alpha"]);
    assert!(!result.results[2].result.passed);
    assert_eq!(result.suite_name.as_deref(), Some("ordering"));
    assert!(result.started_at <= result.finished_at);
}

#[test]
fn test_empty_suite_passes() {
    let result = Suite::new().run(&Arguments::new()).unwrap();

    assert!(result.passed());
    assert!(result.is_empty());
}

#[test]
fn test_standalone_execute_uses_defaults() {
    let registry = Registry::new();
    let instance = Definition::class::<AtLeast>()
        .bind(&registry)
        .unwrap()
        .with("value", 0);

    assert!(instance.execute().unwrap().passed);

    let unbound = greater().bind(&registry).unwrap();
    assert!(matches!(
        unbound.execute(),
        Err(BindingError::Unresolved(_))
    ));
}
