//! Deterministic step selection for interactive elicitation.

use crate::core::readiness::{dependency_context, specified_values, unmet_requires};
use crate::core::types::{
    Domain, OptionChoice, Parameter, ParameterOptions, ParameterState, Params,
};
use crate::spec::FlowSpec;

/// The single next action of an elicitation session.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowStep {
    /// Every field is specified.
    Done,
    /// A provided value has an empty candidate set.
    RefuseEmptyOptions { key: String },
    /// Resolve provided raw text against known candidates.
    NeedSpecify {
        key: String,
        raw: String,
        options: Vec<OptionChoice>,
    },
    /// A provided value is waiting for candidates; dependencies are ready.
    NeedFetchForUpdate { key: String, context: Domain },
    /// An empty field is ready to be asked for.
    NeedFetchForAsk { key: String, context: Domain },
}

/// Pick the next step.
///
/// `Done` when every field is specified. Otherwise fields are scanned in
/// declared order and the first one that matches a rule wins:
/// - provided with an empty candidate set: `RefuseEmptyOptions`
/// - provided with candidates: `NeedSpecify`
/// - provided without candidates, all `requires` specified: `NeedFetchForUpdate`
/// - empty, all `requires` specified: `NeedFetchForAsk`
///
/// Returns `None` if no rule applies (the session is stuck).
pub fn next_flow_step(spec: &FlowSpec, params: &Params) -> Option<FlowStep> {
    if pending_fields(spec, params).is_empty() {
        return Some(FlowStep::Done);
    }

    let specified = specified_values(params);
    let empty = Parameter::default();
    for (key, field) in spec.fields() {
        let param = params.get(key).unwrap_or(&empty);
        let ready = unmet_requires(field, &specified).is_empty();
        match (&param.state, &param.options) {
            (ParameterState::Specified(_), _) => {}
            (ParameterState::Provided(_), ParameterOptions::Available(options))
                if options.is_empty() =>
            {
                return Some(FlowStep::RefuseEmptyOptions {
                    key: key.to_string(),
                });
            }
            (ParameterState::Provided(raw), ParameterOptions::Available(options)) => {
                return Some(FlowStep::NeedSpecify {
                    key: key.to_string(),
                    raw: raw.clone(),
                    options: options.clone(),
                });
            }
            (ParameterState::Provided(_), ParameterOptions::Unknown) if ready => {
                return Some(FlowStep::NeedFetchForUpdate {
                    key: key.to_string(),
                    context: dependency_context(field, &specified),
                });
            }
            (ParameterState::Empty, _) if ready => {
                return Some(FlowStep::NeedFetchForAsk {
                    key: key.to_string(),
                    context: dependency_context(field, &specified),
                });
            }
            _ => {}
        }
    }
    None
}

/// Fields not specified yet, in declared order.
pub fn pending_fields(spec: &FlowSpec, params: &Params) -> Vec<String> {
    spec.names()
        .filter(|name| !params.get(*name).is_some_and(Parameter::is_specified))
        .map(str::to_string)
        .collect()
}
