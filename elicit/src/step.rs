//! Single-step execution for interactive elicitation.
//!
//! A step selects the next action with [`next_flow_step`] and performs it
//! against the session's parameters: fetch options, ask, specify, or recover
//! from an empty candidate set. Every external call goes through the
//! [`Asker`] / [`Specifier`] seams and the field's own [`FieldCheck`].
//!
//! [`FieldCheck`]: crate::spec::FieldCheck

use std::collections::BTreeMap;

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::readiness::specified_values;
use crate::core::selector::{FlowStep, next_flow_step, pending_fields};
use crate::core::types::{
    Domain, FieldContext, OptionChoice, Parameter, ParameterOptions, ParameterState, Params,
    display_value,
};
use crate::error::ElicitError;
use crate::io::asker::Asker;
use crate::io::config::{ElicitConfig, EmptyOptionsPolicy};
use crate::io::prompt::{AskPrompt, PromptEngine};
use crate::io::specifier::Specifier;
use crate::spec::{FieldSpec, FlowSpec};

/// Knobs for step execution, derived from [`ElicitConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    pub max_steps: u32,
    pub empty_options: EmptyOptionsPolicy,
    pub max_backtracks: u32,
    pub max_listed_options: usize,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self::from(&ElicitConfig::default())
    }
}

impl From<&ElicitConfig> for StepConfig {
    fn from(cfg: &ElicitConfig) -> Self {
        Self {
            max_steps: cfg.max_steps,
            empty_options: cfg.empty_options,
            max_backtracks: cfg.max_backtracks,
            max_listed_options: cfg.prompt.max_listed_options,
        }
    }
}

/// What one executed step did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Every field is specified; carries the resolved domain object.
    Done(Domain),
    /// Options were fetched for a provided value.
    Fetched { key: String, options: usize },
    /// The asker was consulted. `specified` is set when the answer was
    /// resolved in the same step.
    Asked {
        key: String,
        raw: String,
        specified: Option<Value>,
    },
    /// A provided value was resolved to a candidate.
    Specified { key: String, value: Value },
    /// `refused` had no candidates; `cleared` were reset to empty.
    Backtracked { refused: String, cleared: Vec<String> },
}

/// Mutable state of one elicitation session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub params: Params,
    excluded: BTreeMap<String, Vec<Value>>,
    backtracks: u32,
}

impl Session {
    /// Fresh session with every field empty.
    pub fn new(spec: &FlowSpec) -> Result<Self, ElicitError> {
        Ok(Self {
            params: init_params(spec)?,
            ..Self::default()
        })
    }

    /// Session seeded with raw text for some fields. Seeded fields are
    /// resolved against their options instead of being asked.
    pub fn with_provided<I, K, V>(spec: &FlowSpec, provided: I) -> Result<Self, ElicitError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut session = Self::new(spec)?;
        for (key, raw) in provided {
            let key = key.into();
            let Some(param) = session.params.get_mut(&key) else {
                return Err(ElicitError::UnknownField { field: key });
            };
            param.state = ParameterState::Provided(raw.into());
        }
        Ok(session)
    }

    pub fn backtracks(&self) -> u32 {
        self.backtracks
    }

    /// Values excluded from a field's options by earlier backtracking.
    pub fn excluded(&self, key: &str) -> &[Value] {
        self.excluded.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// The resolved domain object, once every field is specified.
    pub fn resolved(&self, spec: &FlowSpec) -> Option<Domain> {
        pending_fields(spec, &self.params)
            .is_empty()
            .then(|| specified_values(&self.params))
    }

    fn fetch_options(
        &self,
        key: &str,
        field: &FieldSpec,
        context: Domain,
    ) -> Result<Vec<OptionChoice>, ElicitError> {
        let ctx = FieldContext::new(context, specified_values(&self.params));
        let mut options = field
            .check
            .fetch_options(&ctx)
            .with_context(|| format!("fetch options for '{key}'"))?;
        let excluded = self.excluded(key);
        if !excluded.is_empty() {
            options.retain(|option| !excluded.contains(&option.value));
        }
        debug!(field = key, options = options.len(), "fetched options");
        Ok(options)
    }

    fn param_mut(&mut self, key: &str) -> &mut Parameter {
        self.params.entry(key.to_string()).or_default()
    }
}

/// Every field empty; fields without `requires` get their options right away.
pub fn init_params(spec: &FlowSpec) -> Result<Params, ElicitError> {
    let mut params = Params::new();
    for (key, field) in spec.fields() {
        let options = if field.requires.is_empty() {
            let ctx = FieldContext::default();
            let options = field
                .check
                .fetch_options(&ctx)
                .with_context(|| format!("fetch options for '{key}'"))?;
            ParameterOptions::Available(options)
        } else {
            ParameterOptions::Unknown
        };
        params.insert(
            key.to_string(),
            Parameter {
                state: ParameterState::Empty,
                options,
            },
        );
    }
    Ok(params)
}

/// Select and execute one step.
#[instrument(skip_all, fields(backtracks = session.backtracks))]
pub fn run_step<A, S>(
    spec: &FlowSpec,
    session: &mut Session,
    asker: &A,
    specifier: &S,
    config: &StepConfig,
) -> Result<StepOutcome, ElicitError>
where
    A: Asker + ?Sized,
    S: Specifier + ?Sized,
{
    let Some(step) = next_flow_step(spec, &session.params) else {
        return Err(ElicitError::Stuck {
            pending: pending_fields(spec, &session.params),
        });
    };

    match step {
        FlowStep::Done => Ok(StepOutcome::Done(specified_values(&session.params))),
        FlowStep::RefuseEmptyOptions { key } => recover_empty_options(spec, session, &key, config),
        FlowStep::NeedSpecify { key, raw, options } => {
            let value = specify(specifier, &key, &raw, &options)?;
            session.param_mut(&key).state = ParameterState::Specified(value.clone());
            info!(field = %key, value = %display_value(&value), "specified");
            Ok(StepOutcome::Specified { key, value })
        }
        FlowStep::NeedFetchForUpdate { key, context } => {
            let field = field_of(spec, &key)?;
            let options = session.fetch_options(&key, field, context)?;
            let count = options.len();
            session.param_mut(&key).options = ParameterOptions::Available(options);
            Ok(StepOutcome::Fetched {
                key,
                options: count,
            })
        }
        FlowStep::NeedFetchForAsk { key, context } => {
            let field = field_of(spec, &key)?;
            let options = session.fetch_options(&key, field, context)?;
            let prompt = PromptEngine::new(config.max_listed_options)
                .render_ask(&AskPrompt {
                    field: &key,
                    description: &field.description,
                    options: &options,
                })
                .with_context(|| format!("render prompt for '{key}'"))?;
            let raw = asker
                .ask(&key, &prompt)
                .with_context(|| format!("ask for '{key}'"))?;
            debug!(field = %key, raw = %raw, "asked");

            let specified = if options.is_empty() {
                None
            } else {
                Some(specify(specifier, &key, &raw, &options)?)
            };
            let param = session.param_mut(&key);
            param.state = match &specified {
                Some(value) => ParameterState::Specified(value.clone()),
                None => ParameterState::Provided(raw.clone()),
            };
            param.options = ParameterOptions::Available(options);
            Ok(StepOutcome::Asked {
                key,
                raw,
                specified,
            })
        }
    }
}

fn field_of<'a>(spec: &'a FlowSpec, key: &str) -> Result<&'a FieldSpec, ElicitError> {
    spec.field(key).ok_or_else(|| ElicitError::UnknownField {
        field: key.to_string(),
    })
}

fn specify<S: Specifier + ?Sized>(
    specifier: &S,
    key: &str,
    raw: &str,
    options: &[OptionChoice],
) -> Result<Value, ElicitError> {
    let choice = specifier
        .specify(raw, options)
        .with_context(|| format!("specify '{key}'"))?;
    if !options.contains(&choice) {
        return Err(ElicitError::SpecifierOutOfRange {
            field: key.to_string(),
            chosen: choice.id,
        });
    }
    Ok(choice.value)
}

/// Apply the empty-options policy for `key`.
///
/// Backtracking clears the latest-declared specified field among everything
/// `key` transitively requires, excludes its value from later fetches, and
/// resets every field downstream of it.
fn recover_empty_options(
    spec: &FlowSpec,
    session: &mut Session,
    key: &str,
    config: &StepConfig,
) -> Result<StepOutcome, ElicitError> {
    let refuse = || ElicitError::EmptyOptions {
        field: key.to_string(),
    };
    if config.empty_options == EmptyOptionsPolicy::Fail {
        return Err(refuse());
    }
    if session.backtracks >= config.max_backtracks {
        warn!(field = key, backtracks = session.backtracks, "backtrack limit reached");
        return Err(refuse());
    }

    let upstream = spec.upstream_of(key);
    let Some(target) = upstream
        .iter()
        .rev()
        .find(|name| session.params.get(**name).is_some_and(Parameter::is_specified))
        .copied()
    else {
        return Err(refuse());
    };

    let rejected = session
        .params
        .get(target)
        .and_then(Parameter::specified_value)
        .cloned();
    let downstream = spec.downstream_of(target);
    let cleared: Vec<String> = spec
        .names()
        .filter(|name| *name == target || downstream.contains(name))
        .map(str::to_string)
        .collect();

    for name in &cleared {
        session.params.insert(name.clone(), Parameter::default());
        if name != target {
            session.excluded.remove(name);
        }
    }
    if let Some(rejected) = rejected {
        session
            .excluded
            .entry(target.to_string())
            .or_default()
            .push(rejected);
    }
    session.backtracks += 1;
    info!(field = key, upstream = target, cleared = cleared.len(), "backtracking");

    Ok(StepOutcome::Backtracked {
        refused: key.to_string(),
        cleared,
    })
}
