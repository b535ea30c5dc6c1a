//! Multi-step driver for an elicitation session.

use tracing::{info, instrument};

use crate::core::types::Domain;
use crate::error::ElicitError;
use crate::io::asker::Asker;
use crate::io::specifier::Specifier;
use crate::spec::FlowSpec;
use crate::step::{Session, StepConfig, StepOutcome, run_step};

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    pub value: Domain,
    /// Steps executed, not counting the final `Done` check.
    pub steps_executed: u32,
    pub backtracks: u32,
}

/// Run steps until every field is specified.
///
/// Stops on the first error, or with [`ElicitError::StepLimitExceeded`]
/// after `config.max_steps` steps. `on_step` sees every executed step.
#[instrument(skip_all, fields(max_steps = config.max_steps))]
pub fn run_loop<A, S, F>(
    spec: &FlowSpec,
    session: &mut Session,
    asker: &A,
    specifier: &S,
    config: &StepConfig,
    mut on_step: F,
) -> Result<LoopOutcome, ElicitError>
where
    A: Asker + ?Sized,
    S: Specifier + ?Sized,
    F: FnMut(&StepOutcome),
{
    let mut steps_executed = 0u32;
    loop {
        match run_step(spec, session, asker, specifier, config)? {
            StepOutcome::Done(value) => {
                info!(steps_executed, backtracks = session.backtracks(), "elicitation complete");
                return Ok(LoopOutcome {
                    value,
                    steps_executed,
                    backtracks: session.backtracks(),
                });
            }
            step => {
                steps_executed += 1;
                on_step(&step);
            }
        }
        if steps_executed >= config.max_steps {
            if let Some(value) = session.resolved(spec) {
                return Ok(LoopOutcome {
                    value,
                    steps_executed,
                    backtracks: session.backtracks(),
                });
            }
            return Err(ElicitError::StepLimitExceeded {
                max_steps: config.max_steps,
            });
        }
    }
}

/// Start a fresh session and run it to completion.
pub fn resolve_all<A, S>(
    spec: &FlowSpec,
    asker: &A,
    specifier: &S,
    config: &StepConfig,
) -> Result<Domain, ElicitError>
where
    A: Asker + ?Sized,
    S: Specifier + ?Sized,
{
    let mut session = Session::new(spec)?;
    run_loop(spec, &mut session, asker, specifier, config, |_| {}).map(|outcome| outcome.value)
}
