//! Specifier abstraction: resolving raw text to one candidate option.

use anyhow::{Result, bail};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::debug;

use crate::core::types::{OptionChoice, display_value};
use crate::io::config::{SpecifierConfig, SpecifierStrategy};

/// Maps raw user text onto one of the given candidates.
///
/// Sessions verify the returned choice is among `candidates`.
pub trait Specifier {
    fn specify(&self, raw: &str, candidates: &[OptionChoice]) -> Result<OptionChoice>;
}

impl<T: Specifier + ?Sized> Specifier for Box<T> {
    fn specify(&self, raw: &str, candidates: &[OptionChoice]) -> Result<OptionChoice> {
        (**self).specify(raw, candidates)
    }
}

/// Build the specifier selected in config.
pub fn specifier_from_config(cfg: &SpecifierConfig) -> Box<dyn Specifier> {
    match cfg.strategy {
        SpecifierStrategy::Exact => Box::new(ExactSpecifier),
        SpecifierStrategy::Fuzzy => Box::new(FuzzySpecifier::new(cfg.min_score)),
    }
}

/// Case-sensitive match on option id or displayed value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSpecifier;

impl Specifier for ExactSpecifier {
    fn specify(&self, raw: &str, candidates: &[OptionChoice]) -> Result<OptionChoice> {
        match exact_match(raw, candidates) {
            Some(choice) => Ok(choice.clone()),
            None => bail!(
                "'{}' does not match any option ({})",
                raw.trim(),
                list_ids(candidates)
            ),
        }
    }
}

fn exact_match<'a>(raw: &str, candidates: &'a [OptionChoice]) -> Option<&'a OptionChoice> {
    let raw = raw.trim();
    candidates
        .iter()
        .find(|candidate| candidate.id == raw)
        .or_else(|| {
            candidates
                .iter()
                .find(|candidate| display_value(&candidate.value) == raw)
        })
}

fn list_ids(candidates: &[OptionChoice]) -> String {
    candidates
        .iter()
        .map(|candidate| candidate.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Exact match first, then the highest-scoring fuzzy match on option ids.
///
/// Ties go to the earlier candidate.
pub struct FuzzySpecifier {
    matcher: SkimMatcherV2,
    min_score: i64,
}

impl FuzzySpecifier {
    pub fn new(min_score: i64) -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
            min_score,
        }
    }
}

impl Specifier for FuzzySpecifier {
    fn specify(&self, raw: &str, candidates: &[OptionChoice]) -> Result<OptionChoice> {
        if let Some(choice) = exact_match(raw, candidates) {
            return Ok(choice.clone());
        }

        let pattern = raw.trim();
        let mut best: Option<(i64, &OptionChoice)> = None;
        for candidate in candidates {
            let Some(score) = self.matcher.fuzzy_match(&candidate.id, pattern) else {
                continue;
            };
            if score < self.min_score {
                continue;
            }
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((score, choice)) => {
                debug!(raw = pattern, chosen = %choice.id, score, "fuzzy match");
                Ok(choice.clone())
            }
            None => bail!(
                "'{}' does not match any option ({})",
                pattern,
                list_ids(candidates)
            ),
        }
    }
}
