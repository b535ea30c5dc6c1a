//! Shared deterministic types for the resolution engines.
//!
//! These types define stable contracts between the fixup compiler, the
//! elicitation engine and their callers. They carry no behavior beyond
//! construction and inspection.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// A resolved (or partially resolved) domain object: field name to value.
pub type Domain = BTreeMap<String, Value>;

/// A candidate value for a field, paired with the identifier used to resolve
/// free-text input against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionChoice {
    pub id: String,
    pub value: Value,
}

impl OptionChoice {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    /// Build a choice whose id is the display form of `value`.
    pub fn from_value(value: Value) -> Self {
        Self {
            id: display_value(&value),
            value,
        }
    }
}

/// Render a value the way a person would type it: strings without quotes,
/// everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Values visible to a field's validation logic.
///
/// `deps` holds every `requires` value plus the `influenced_by` values that
/// are present and valid. `input` is the whole normalized input (batch mode)
/// or every specified value (interactive mode).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldContext {
    pub deps: Domain,
    pub input: Domain,
}

impl FieldContext {
    pub fn new(deps: Domain, input: Domain) -> Self {
        Self { deps, input }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.deps.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.deps.get(field).and_then(Value::as_str)
    }

    pub fn get_u64(&self, field: &str) -> Option<u64> {
        self.deps.get(field).and_then(Value::as_u64)
    }
}

/// Result of validating one field value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Value absent; nothing to validate yet. Options are shown for guidance.
    Skip { allowed_options: Option<Vec<Value>> },
    /// Value accepted, possibly normalized.
    Ok {
        value: Value,
        allowed_options: Option<Vec<Value>>,
    },
    /// Value refused.
    Err {
        refusal_reason: String,
        allowed_options: Option<Vec<Value>>,
    },
}

impl ValidationResult {
    pub fn allowed_options(&self) -> Option<&[Value]> {
        match self {
            Self::Skip { allowed_options }
            | Self::Ok {
                allowed_options, ..
            }
            | Self::Err {
                allowed_options, ..
            } => allowed_options.as_deref(),
        }
    }
}

/// Why a field is invalid, in wire form (`refusalReason` or `needsValidFields`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Refusal {
    RefusalReason(String),
    NeedsValidFields(Vec<String>),
}

/// Per-field feedback returned by the fixup compiler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFeedback {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_options: Option<Vec<Value>>,
    #[serde(flatten)]
    pub refusal: Option<Refusal>,
}

impl FieldFeedback {
    pub fn valid(allowed_options: Option<Vec<Value>>) -> Self {
        Self {
            valid: true,
            allowed_options,
            refusal: None,
        }
    }

    /// Invalid without a reason: the value is missing and options are attached.
    pub fn missing(allowed_options: Option<Vec<Value>>) -> Self {
        Self {
            valid: false,
            allowed_options,
            refusal: None,
        }
    }

    pub fn refused(reason: impl Into<String>, allowed_options: Option<Vec<Value>>) -> Self {
        Self {
            valid: false,
            allowed_options,
            refusal: Some(Refusal::RefusalReason(reason.into())),
        }
    }

    pub fn needs(fields: Vec<String>) -> Self {
        Self {
            valid: false,
            allowed_options: None,
            refusal: Some(Refusal::NeedsValidFields(fields)),
        }
    }

    pub fn refusal_reason(&self) -> Option<&str> {
        match &self.refusal {
            Some(Refusal::RefusalReason(reason)) => Some(reason),
            _ => None,
        }
    }

    pub fn needs_valid_fields(&self) -> Option<&[String]> {
        match &self.refusal {
            Some(Refusal::NeedsValidFields(fields)) => Some(fields),
            _ => None,
        }
    }
}

/// Outcome of one fixup pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum FixupOutcome {
    Accepted {
        value: Domain,
    },
    /// Feedback for every field, in declared field order.
    Rejected {
        #[serde(rename = "validationResults")]
        validation_results: IndexMap<String, FieldFeedback>,
    },
}

/// Interactive acquisition state of one parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParameterState {
    #[default]
    Empty,
    /// Raw text supplied by the user/agent, not yet resolved to an option.
    Provided(String),
    Specified(Value),
}

/// Candidate options known for one parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParameterOptions {
    #[default]
    Unknown,
    Available(Vec<OptionChoice>),
}

/// A parameter slot tracked by an elicitation session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameter {
    pub state: ParameterState,
    pub options: ParameterOptions,
}

impl Parameter {
    pub fn is_specified(&self) -> bool {
        matches!(self.state, ParameterState::Specified(_))
    }

    pub fn specified_value(&self) -> Option<&Value> {
        match &self.state {
            ParameterState::Specified(value) => Some(value),
            _ => None,
        }
    }
}

/// Per-field parameter state for one session.
pub type Params = BTreeMap<String, Parameter>;
