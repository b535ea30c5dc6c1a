//! Batch validation: turn loose input into an accepted domain object or
//! per-field feedback.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::core::readiness::{dependency_context, unmet_requires};
use crate::core::types::{Domain, FieldContext, FieldFeedback, FixupOutcome, ValidationResult};
use crate::spec::FlowSpec;

/// A fixup function bound to one spec. Cheap to create and reusable.
#[derive(Debug, Clone, Copy)]
pub struct Fixup<'a> {
    spec: &'a FlowSpec,
}

/// Bind a fixup function to `spec`.
pub fn compile_fixup(spec: &FlowSpec) -> Fixup<'_> {
    Fixup { spec }
}

impl Fixup<'_> {
    /// Validate `input` in one pass.
    ///
    /// Raw values are normalized first; unusable values and unknown keys are
    /// treated as absent. Fields are then visited in evaluation order. A field
    /// whose `requires` are not all valid yet is reported with
    /// `needsValidFields` and not validated. Only a fully valid input is
    /// accepted; collaborator errors propagate. Feedback is listed in declared
    /// field order.
    #[instrument(skip_all, fields(keys = input.len()))]
    pub fn run(&self, input: &Domain) -> Result<FixupOutcome> {
        let normalized = self.normalize(input);
        let mut valid = Domain::new();
        let mut feedback = BTreeMap::new();

        for (key, field) in self.spec.evaluation_fields() {
            let unmet = unmet_requires(field, &valid);
            if !unmet.is_empty() {
                debug!(field = key, ?unmet, "dependencies not valid");
                feedback.insert(key.to_string(), FieldFeedback::needs(unmet));
                continue;
            }

            let ctx = FieldContext::new(dependency_context(field, &valid), normalized.clone());
            let result = field
                .check
                .validate(normalized.get(key), &ctx)
                .with_context(|| format!("validate field '{key}'"))?;
            let entry = match result {
                ValidationResult::Skip { allowed_options } => {
                    FieldFeedback::missing(allowed_options)
                }
                ValidationResult::Ok {
                    value,
                    allowed_options,
                } => {
                    valid.insert(key.to_string(), value);
                    FieldFeedback::valid(allowed_options)
                }
                ValidationResult::Err {
                    refusal_reason,
                    allowed_options,
                } => FieldFeedback::refused(refusal_reason, allowed_options),
            };
            debug!(field = key, valid = entry.valid, "validated");
            feedback.insert(key.to_string(), entry);
        }

        if feedback.values().all(|entry| entry.valid) {
            return Ok(FixupOutcome::Accepted { value: valid });
        }
        let validation_results: IndexMap<String, FieldFeedback> = self
            .spec
            .names()
            .filter_map(|name| feedback.remove(name).map(|entry| (name.to_string(), entry)))
            .collect();
        Ok(FixupOutcome::Rejected { validation_results })
    }

    fn normalize(&self, input: &Domain) -> Domain {
        let mut normalized = Domain::new();
        for (key, raw) in input {
            let Some(field) = self.spec.field(key) else {
                debug!(field = %key, "ignoring unknown input key");
                continue;
            };
            match field.check.normalize(raw) {
                Some(value) => {
                    normalized.insert(key.clone(), value);
                }
                None => debug!(field = %key, "raw value could not be normalized"),
            }
        }
        normalized
    }
}
