//! Argument resolution.
//!
//! Every declared parameter of every instance gets its value from, in order:
//! the binding made on the instance, the run's global binding of the same
//! name, then the declared default. Shared inputs are resolved once up front
//! so every instance wired to one sees the same value.

use super::SuiteInput;
use crate::error::{BindingError, BindingResult, InstanceBindings, MissingParameter};
use crate::instance::{Binding, TestInstance};
use crate::models::{ArgValue, Arguments};
use std::collections::HashMap;

/// Distinct shared inputs referenced by `instances`, in first-use order.
///
/// # Errors
///
/// `ConflictingInput` when one name is declared with two types.
pub(crate) fn collect_inputs(instances: &[TestInstance]) -> BindingResult<Vec<SuiteInput>> {
    let mut inputs: Vec<SuiteInput> = Vec::new();
    for input in instances.iter().flat_map(TestInstance::inputs) {
        match inputs.iter().find(|known| known.name == input.name) {
            Some(known) if known.param_type != input.param_type => {
                return Err(BindingError::ConflictingInput {
                    name: input.name.clone(),
                    first: known.param_type.to_string(),
                    second: input.param_type.to_string(),
                });
            }
            Some(_) => {}
            None => inputs.push(input.clone()),
        }
    }
    Ok(inputs)
}

/// Values of the shared inputs supplied in `globals`.
pub(crate) fn resolve_inputs(
    inputs: &[SuiteInput],
    globals: &Arguments,
) -> HashMap<String, ArgValue> {
    inputs
        .iter()
        .filter_map(|input| {
            globals
                .get(&input.name)
                .map(|value| (input.name.clone(), value.clone()))
        })
        .collect()
}

/// Resolve the arguments of one instance.
///
/// A parameter wired to a shared input takes only that input's value; it
/// does not fall back to globals or defaults.
pub(crate) fn resolve_instance(
    position: usize,
    instance: &TestInstance,
    globals: &Arguments,
    shared: &HashMap<String, ArgValue>,
) -> Result<Arguments, InstanceBindings> {
    let meta = instance.meta();
    let mut args = Arguments::new();
    let mut missing = Vec::new();

    for arg in &meta.args {
        let resolved = match instance.params().get(&arg.name) {
            Some(Binding::Value(value)) => Some(value.clone()),
            Some(Binding::Input(input)) => {
                let value = shared.get(&input.name).cloned();
                if value.is_none() {
                    missing.push(MissingParameter {
                        name: arg.name.clone(),
                        declared_type: arg.param_type.to_string(),
                        input: Some(input.name.clone()),
                    });
                    continue;
                }
                value
            }
            None => globals
                .get(&arg.name)
                .cloned()
                .or_else(|| arg.default().cloned().map(ArgValue::Json)),
        };

        match resolved {
            Some(value) => args.insert(arg.name.clone(), value),
            None => missing.push(MissingParameter {
                name: arg.name.clone(),
                declared_type: arg.param_type.to_string(),
                input: None,
            }),
        }
    }

    let unexpected: Vec<String> = instance
        .params()
        .keys()
        .filter(|name| meta.arg(name).is_none())
        .cloned()
        .collect();

    let report = InstanceBindings {
        position,
        test_id: meta.uuid.clone(),
        test_name: meta.display_name.clone(),
        missing,
        unexpected,
    };

    if report.is_empty() {
        Ok(args)
    } else {
        Err(report)
    }
}

/// Resolve every instance, or report every problem at once.
///
/// # Errors
///
/// `ConflictingInput` for inconsistent shared inputs; `Unresolved` listing
/// each instance with missing or unexpected parameters.
pub(crate) fn resolve_all(
    instances: &[TestInstance],
    globals: &Arguments,
) -> BindingResult<Vec<Arguments>> {
    let inputs = collect_inputs(instances)?;
    let shared = resolve_inputs(&inputs, globals);

    let mut resolved = Vec::with_capacity(instances.len());
    let mut reports = Vec::new();
    for (position, instance) in instances.iter().enumerate() {
        match resolve_instance(position, instance, globals, &shared) {
            Ok(args) => resolved.push(args),
            Err(report) => reports.push(report),
        }
    }

    if reports.is_empty() {
        Ok(resolved)
    } else {
        Err(BindingError::Unresolved(reports))
    }
}
