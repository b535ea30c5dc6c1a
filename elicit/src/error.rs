//! Typed failures of spec construction and elicitation.
//!
//! Fixup rejections are not errors: they are reported as
//! [`FixupOutcome::Rejected`](crate::core::types::FixupOutcome) feedback.

use crate::core::graph::describe_cycles;

/// A field spec registry that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The `requires` graph is not a DAG. Every cycle found is listed.
    #[error("cycle detected in requires graph: {}", describe_cycles(.0))]
    Cycle(Vec<Vec<String>>),

    /// Dependency lists name unknown fields, the field itself, or repeat names.
    #[error("invalid field spec:\n- {}", .0.join("\n- "))]
    Contract(Vec<String>),

    /// The builder was finalized before every declared field had a rule.
    #[error("declared fields without a rule: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

/// Fatal conditions of an interactive elicitation session.
#[derive(Debug, thiserror::Error)]
pub enum ElicitError {
    /// A provided value has no candidate options and cannot be recovered.
    #[error("no options available for '{field}': the provided value cannot be resolved")]
    EmptyOptions { field: String },

    /// No step applies although some fields are not specified yet.
    #[error("elicitation stuck with pending fields: {}", .pending.join(", "))]
    Stuck { pending: Vec<String> },

    #[error("elicitation did not finish within {max_steps} steps")]
    StepLimitExceeded { max_steps: u32 },

    #[error("specifier chose '{chosen}' for '{field}', which is not one of its candidates")]
    SpecifierOutOfRange { field: String, chosen: String },

    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// An option fetcher, validator, asker or specifier failed.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_lists_every_cycle() {
        let err = SpecError::Cycle(vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string(), "d".to_string()],
        ]);
        assert_eq!(
            err.to_string(),
            "cycle detected in requires graph: a -> b -> a; c -> d -> c"
        );
    }

    #[test]
    fn collaborator_error_is_transparent() {
        let err = ElicitError::from(anyhow::anyhow!("lookup failed"));
        assert_eq!(err.to_string(), "lookup failed");
    }
}
