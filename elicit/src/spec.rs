//! Field spec registry.
//!
//! A [`FlowSpec`] declares, per field, its hard dependencies (`requires`),
//! soft dependencies (`influenced_by`), a description, and a [`FieldCheck`]
//! that validates values and produces candidate options. The registry is
//! contract- and cycle-checked once at construction and immutable afterwards.

use std::fmt;

use anyhow::Result;
use serde_json::Value;

use crate::core::candidates::judge_candidates;
use crate::core::graph::{detect_requires_cycles, toposort_fields};
use crate::core::invariants::{DeclaredField, validate_contract};
use crate::core::types::{Domain, FieldContext, OptionChoice, ValidationResult};
use crate::error::SpecError;

/// Produces the candidate options for a field given its dependency context.
pub trait OptionFetcher: Send + Sync {
    fn fetch(&self, ctx: &FieldContext) -> Result<Vec<OptionChoice>>;
}

impl<F> OptionFetcher for F
where
    F: Fn(&FieldContext) -> Result<Vec<OptionChoice>> + Send + Sync,
{
    fn fetch(&self, ctx: &FieldContext) -> Result<Vec<OptionChoice>> {
        self(ctx)
    }
}

/// Validation logic for one field.
///
/// Implementations must be idempotent for a given context but may perform
/// external lookups.
pub trait FieldCheck: Send + Sync {
    /// Turn a raw input value into the field's value type. `None` means the
    /// raw value is unusable and is treated as absent.
    fn normalize(&self, raw: &Value) -> Option<Value> {
        Some(raw.clone())
    }

    fn validate(&self, value: Option<&Value>, ctx: &FieldContext) -> Result<ValidationResult>;

    /// Candidate options used for prompting. Defaults to the options reported
    /// when validating an absent value.
    fn fetch_options(&self, ctx: &FieldContext) -> Result<Vec<OptionChoice>> {
        let result = self.validate(None, ctx)?;
        Ok(result
            .allowed_options()
            .unwrap_or_default()
            .iter()
            .cloned()
            .map(OptionChoice::from_value)
            .collect())
    }
}

type NormalizeFn = Box<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
type ValidateFnBox =
    Box<dyn Fn(Option<&Value>, &FieldContext) -> Result<ValidationResult> + Send + Sync>;
type RefusalFn = Box<dyn Fn(&Value, &CheckContext<'_>) -> Option<String> + Send + Sync>;

/// Single-stage field logic: one closure validates the (possibly absent) value.
pub struct ValidateFn {
    validate: ValidateFnBox,
    normalize: Option<NormalizeFn>,
}

impl ValidateFn {
    pub fn new<F>(validate: F) -> Self
    where
        F: Fn(Option<&Value>, &FieldContext) -> Result<ValidationResult> + Send + Sync + 'static,
    {
        Self {
            validate: Box::new(validate),
            normalize: None,
        }
    }

    pub fn with_normalize<N>(mut self, normalize: N) -> Self
    where
        N: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.normalize = Some(Box::new(normalize));
        self
    }
}

impl FieldCheck for ValidateFn {
    fn normalize(&self, raw: &Value) -> Option<Value> {
        match &self.normalize {
            Some(normalize) => normalize(raw),
            None => Some(raw.clone()),
        }
    }

    fn validate(&self, value: Option<&Value>, ctx: &FieldContext) -> Result<ValidationResult> {
        (self.validate)(value, ctx)
    }
}

/// What a supplementary check sees besides the value itself.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub options_for_field: &'a [OptionChoice],
    pub whole_input: &'a Domain,
}

/// Three-stage field logic: fetch candidates, normalize, then check.
///
/// The same fetcher drives batch validation and interactive prompting.
pub struct OptionsPipeline {
    fetcher: Box<dyn OptionFetcher>,
    normalize: Option<NormalizeFn>,
    check: Option<RefusalFn>,
}

impl OptionsPipeline {
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn(&FieldContext) -> Result<Vec<OptionChoice>> + Send + Sync + 'static,
    {
        Self::from_fetcher(fetch)
    }

    pub fn from_fetcher(fetcher: impl OptionFetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            normalize: None,
            check: None,
        }
    }

    pub fn with_normalize<N>(mut self, normalize: N) -> Self
    where
        N: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.normalize = Some(Box::new(normalize));
        self
    }

    /// Add a check that runs on values already in the candidate set. A
    /// non-empty return value refuses the value with that reason.
    pub fn with_check<C>(mut self, check: C) -> Self
    where
        C: Fn(&Value, &CheckContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.check = Some(Box::new(check));
        self
    }
}

impl FieldCheck for OptionsPipeline {
    fn normalize(&self, raw: &Value) -> Option<Value> {
        match &self.normalize {
            Some(normalize) => normalize(raw),
            None => Some(raw.clone()),
        }
    }

    fn validate(&self, value: Option<&Value>, ctx: &FieldContext) -> Result<ValidationResult> {
        let options = self.fetcher.fetch(ctx)?;
        Ok(judge_candidates(value, &options, |value| {
            let check = self.check.as_ref()?;
            check(
                value,
                &CheckContext {
                    options_for_field: &options,
                    whole_input: &ctx.input,
                },
            )
        }))
    }

    fn fetch_options(&self, ctx: &FieldContext) -> Result<Vec<OptionChoice>> {
        self.fetcher.fetch(ctx)
    }
}

/// Declaration of one field.
pub struct FieldSpec {
    pub requires: Vec<String>,
    pub influenced_by: Vec<String>,
    pub description: String,
    pub check: Box<dyn FieldCheck>,
}

impl FieldSpec {
    pub fn new(check: impl FieldCheck + 'static) -> Self {
        Self {
            requires: Vec::new(),
            influenced_by: Vec::new(),
            description: String::new(),
            check: Box::new(check),
        }
    }

    pub fn requires<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn influenced_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.influenced_by = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("requires", &self.requires)
            .field("influenced_by", &self.influenced_by)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Immutable, validated field spec registry.
#[derive(Debug)]
pub struct FlowSpec {
    fields: Vec<(String, FieldSpec)>,
    evaluation_order: Vec<usize>,
}

impl FlowSpec {
    /// Start a builder for the given field names, in declared order.
    pub fn builder<I, S>(declared: I) -> FlowSpecBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FlowSpecBuilder {
            declared: declared.into_iter().map(Into::into).collect(),
            fields: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Build a registry from fields in declared order.
    ///
    /// Fails on contract violations or any cycle in the `requires` graph.
    pub fn from_fields(fields: Vec<(String, FieldSpec)>) -> Result<Self, SpecError> {
        let spec = Self {
            fields,
            evaluation_order: Vec::new(),
        };
        let order = spec.checked_order()?;
        Ok(Self {
            evaluation_order: order,
            ..spec
        })
    }

    /// Re-run the construction checks.
    pub fn recheck(&self) -> Result<(), SpecError> {
        self.checked_order().map(|_| ())
    }

    fn checked_order(&self) -> Result<Vec<usize>, SpecError> {
        let declared: Vec<DeclaredField<'_>> = self
            .fields
            .iter()
            .map(|(name, field)| DeclaredField {
                name,
                requires: &field.requires,
                influenced_by: &field.influenced_by,
            })
            .collect();
        let errors = validate_contract(&declared);
        if !errors.is_empty() {
            return Err(SpecError::Contract(errors));
        }

        let edges = self.requires_edges();
        let cycles = detect_requires_cycles(&edges);
        if !cycles.is_empty() {
            return Err(SpecError::Cycle(cycles));
        }

        let order = toposort_fields(&edges).ok_or_else(|| SpecError::Cycle(Vec::new()))?;
        Ok(order
            .iter()
            .filter_map(|name| self.index_of(name))
            .collect())
    }

    /// `(name, requires)` pairs in declared order.
    pub fn requires_edges(&self) -> Vec<(String, Vec<String>)> {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.requires.clone()))
            .collect()
    }

    /// Fields in declared order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields
            .iter()
            .map(|(name, field)| (name.as_str(), field))
    }

    /// Fields in evaluation order: every field after the fields it requires,
    /// declared order otherwise.
    pub fn evaluation_fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.evaluation_order.iter().map(|&index| {
            let (name, field) = &self.fields[index];
            (name.as_str(), field)
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index_of(name).map(|index| &self.fields[index].1)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(field, _)| field == name)
    }

    /// Every field `name` transitively requires, in declared order.
    pub fn upstream_of(&self, name: &str) -> Vec<&str> {
        let mut reached = vec![name];
        let mut frontier = vec![name];
        while let Some(current) = frontier.pop() {
            let Some(field) = self.field(current) else {
                continue;
            };
            for dep in &field.requires {
                if !reached.contains(&dep.as_str()) {
                    reached.push(dep);
                    frontier.push(dep);
                }
            }
        }
        self.names()
            .filter(|candidate| *candidate != name && reached.contains(candidate))
            .collect()
    }

    /// Every field that transitively requires `name`, in declared order.
    pub fn downstream_of(&self, name: &str) -> Vec<&str> {
        self.names()
            .filter(|candidate| *candidate != name && self.upstream_of(candidate).contains(&name))
            .collect()
    }
}

/// Collects one [`FieldSpec`] per declared field before building a
/// [`FlowSpec`]. Building fails while any declared field is still missing.
#[derive(Debug)]
pub struct FlowSpecBuilder {
    declared: Vec<String>,
    fields: Vec<(String, FieldSpec)>,
    errors: Vec<String>,
}

impl FlowSpecBuilder {
    pub fn field(mut self, name: &str, spec: FieldSpec) -> Self {
        if !self.declared.iter().any(|declared| declared == name) {
            self.errors
                .push(format!("field '{name}' was added but never declared"));
        } else if self.fields.iter().any(|(added, _)| added == name) {
            self.errors.push(format!("field '{name}' was added twice"));
        } else {
            self.fields.push((name.to_string(), spec));
        }
        self
    }

    /// Fields declared but not added yet.
    pub fn missing(&self) -> Vec<&str> {
        self.declared
            .iter()
            .filter(|name| !self.fields.iter().any(|(added, _)| added == *name))
            .map(String::as_str)
            .collect()
    }

    pub fn build(mut self) -> Result<FlowSpec, SpecError> {
        if !self.errors.is_empty() {
            return Err(SpecError::Contract(self.errors));
        }
        let missing: Vec<String> = self.missing().into_iter().map(str::to_string).collect();
        if !missing.is_empty() {
            return Err(SpecError::MissingFields(missing));
        }

        let mut ordered = Vec::with_capacity(self.declared.len());
        for name in &self.declared {
            if let Some(index) = self.fields.iter().position(|(added, _)| added == name) {
                ordered.push(self.fields.swap_remove(index));
            }
        }
        FlowSpec::from_fields(ordered)
    }
}
