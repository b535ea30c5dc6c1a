//! Test-only helpers: static field specs and scripted collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::core::types::{FieldContext, OptionChoice};
use crate::io::asker::Asker;
use crate::io::specifier::Specifier;
use crate::spec::{FieldSpec, OptionsPipeline};

/// String options whose ids equal their values.
pub fn static_options(values: &[&str]) -> Vec<OptionChoice> {
    values
        .iter()
        .map(|value| OptionChoice::from_value(Value::from(*value)))
        .collect()
}

/// A field whose candidates never depend on context.
pub fn fixed_field(values: &[&str]) -> FieldSpec {
    let options = static_options(values);
    FieldSpec::new(OptionsPipeline::new(move |_ctx: &FieldContext| {
        Ok(options.clone())
    }))
}

/// Asker that replays queued answers and records every prompt it was shown.
#[derive(Debug, Default)]
pub struct ScriptedAsker {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<(String, String)>>,
}

impl ScriptedAsker {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: RefCell::new(answers.into_iter().map(Into::into).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// `(field, prompt)` pairs in the order they were asked.
    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.borrow().clone()
    }

    /// Field names in the order they were asked.
    pub fn asked_fields(&self) -> Vec<String> {
        self.asked
            .borrow()
            .iter()
            .map(|(field, _)| field.clone())
            .collect()
    }
}

impl Asker for ScriptedAsker {
    fn ask(&self, field: &str, prompt: &str) -> Result<String> {
        self.asked
            .borrow_mut()
            .push((field.to_string(), prompt.to_string()));
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted answer left for '{field}'"))
    }
}

/// Specifier that picks queued option ids regardless of the raw text.
///
/// A queued id outside the candidate list is returned as-is so out-of-range
/// handling can be tested.
#[derive(Debug, Default)]
pub struct ScriptedSpecifier {
    picks: RefCell<VecDeque<String>>,
}

impl ScriptedSpecifier {
    pub fn new<I, S>(picks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            picks: RefCell::new(picks.into_iter().map(Into::into).collect()),
        }
    }
}

impl Specifier for ScriptedSpecifier {
    fn specify(&self, raw: &str, candidates: &[OptionChoice]) -> Result<OptionChoice> {
        let pick = self
            .picks
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted pick left for '{raw}'"))?;
        Ok(candidates
            .iter()
            .find(|candidate| candidate.id == pick)
            .cloned()
            .unwrap_or_else(|| OptionChoice::from_value(Value::from(pick))))
    }
}
