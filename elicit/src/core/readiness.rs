//! Dependency readiness shared by both engines.
//!
//! Both engines track a map of values that are currently known to be valid:
//! the fixup compiler fills it as fields pass validation, and an elicitation
//! session derives it from its specified parameters.

use crate::core::types::{Domain, Params};
use crate::spec::FieldSpec;

/// `requires` entries that are not valid yet, in `requires` order.
pub fn unmet_requires(field: &FieldSpec, valid: &Domain) -> Vec<String> {
    field
        .requires
        .iter()
        .filter(|dep| !valid.contains_key(dep.as_str()))
        .cloned()
        .collect()
}

/// Dependency values handed to a field's logic: every `requires` value plus
/// the `influenced_by` values that are valid. Missing soft dependencies are
/// omitted.
pub fn dependency_context(field: &FieldSpec, valid: &Domain) -> Domain {
    field
        .requires
        .iter()
        .chain(&field.influenced_by)
        .filter_map(|dep| {
            valid
                .get(dep)
                .map(|value| (dep.clone(), value.clone()))
        })
        .collect()
}

/// Every specified parameter value.
pub fn specified_values(params: &Params) -> Domain {
    params
        .iter()
        .filter_map(|(name, param)| {
            param
                .specified_value()
                .map(|value| (name.clone(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Parameter, ParameterState};
    use crate::test_support::fixed_field;
    use serde_json::json;

    #[test]
    fn unmet_requires_keeps_declared_order() {
        let field = fixed_field(&["x"]).requires(["b", "a", "c"]);
        let valid = Domain::from([("a".to_string(), json!(1))]);
        assert_eq!(unmet_requires(&field, &valid), vec!["b", "c"]);
    }

    #[test]
    fn context_includes_only_valid_soft_dependencies() {
        let field = fixed_field(&["x"])
            .requires(["a"])
            .influenced_by(["b", "c"]);
        let valid = Domain::from([
            ("a".to_string(), json!("A")),
            ("c".to_string(), json!("C")),
            ("unrelated".to_string(), json!("U")),
        ]);
        assert_eq!(
            dependency_context(&field, &valid),
            Domain::from([
                ("a".to_string(), json!("A")),
                ("c".to_string(), json!("C")),
            ])
        );
    }

    #[test]
    fn specified_values_skip_provided_and_empty() {
        let params = Params::from([
            (
                "a".to_string(),
                Parameter {
                    state: ParameterState::Specified(json!(1)),
                    ..Parameter::default()
                },
            ),
            (
                "b".to_string(),
                Parameter {
                    state: ParameterState::Provided("raw".to_string()),
                    ..Parameter::default()
                },
            ),
            ("c".to_string(), Parameter::default()),
        ]);
        assert_eq!(
            specified_values(&params),
            Domain::from([("a".to_string(), json!(1))])
        );
    }
}
