//! Judging a value against a fetched candidate set.

use serde_json::Value;

use crate::core::types::{OptionChoice, ValidationResult};

/// Refusal reason for values outside the candidate set (and for empty sets).
pub const NO_MATCHING_OPTIONS: &str = "no matching options";

/// Combine a value, its candidates and a supplementary check into one result.
///
/// Priority order:
/// 1. no candidates at all: refused, empty `allowed_options`
/// 2. value absent: skipped, candidates attached
/// 3. value not strictly equal to any candidate: refused
/// 4. `check` returns a non-empty refusal: refused with that reason
/// 5. otherwise accepted
///
/// `check` only runs in case 4.
pub fn judge_candidates<F>(
    value: Option<&Value>,
    options: &[OptionChoice],
    check: F,
) -> ValidationResult
where
    F: FnOnce(&Value) -> Option<String>,
{
    let allowed: Vec<Value> = options.iter().map(|option| option.value.clone()).collect();

    if allowed.is_empty() {
        return ValidationResult::Err {
            refusal_reason: NO_MATCHING_OPTIONS.to_string(),
            allowed_options: Some(allowed),
        };
    }

    let Some(value) = value else {
        return ValidationResult::Skip {
            allowed_options: Some(allowed),
        };
    };

    if !allowed.iter().any(|candidate| candidate == value) {
        return ValidationResult::Err {
            refusal_reason: NO_MATCHING_OPTIONS.to_string(),
            allowed_options: Some(allowed),
        };
    }

    match check(value).filter(|reason| !reason.trim().is_empty()) {
        Some(reason) => ValidationResult::Err {
            refusal_reason: reason,
            allowed_options: Some(allowed),
        },
        None => ValidationResult::Ok {
            value: value.clone(),
            allowed_options: Some(allowed),
        },
    }
}
