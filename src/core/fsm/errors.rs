//=========================================================================
// Flow Errors
//=========================================================================
//
// Error taxonomy for the flow machine:
//
//   FlowError  - raised by StateMachine operations (programmer errors and
//                failed transition executions). Blocked transitions are
//                NOT errors; they are reported as structured outcomes.
//   StateError - raised by a lifecycle step of a state, a module, or a
//                scene collaborator; carries the original cause.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::error::Error;

use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::types::{EventKey, StateKey};

//=== StateError ==========================================================

/// A failure inside a state's attach/enter/exit sequence.
///
/// Produced by states, modules and scene collaborators; the flow machine
/// wraps it into [`FlowError::TransitionFailed`] together with the target
/// state id.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StateError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + 'static>>,
}

impl StateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Error + 'static) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

//=== FlowError ===========================================================

/// Errors surfaced by [`crate::core::fsm::StateMachine`] operations.
///
/// `UnhandledEvent` is a programmer error: an event was wired to fire
/// that has no transition reachable from the current configuration.
/// `TransitionFailed` leaves the machine's bookkeeping as reached; no
/// rollback is attempted and callers treat it as fatal to the current flow.
#[derive(Debug, Error)]
pub enum FlowError<S: StateKey, E: EventKey> {
    #[error("state machine is not initialized")]
    NotInitialized,

    #[error("no transition reachable for event {event:?}")]
    UnhandledEvent { event: E },

    #[error("no state factory registered for {state_id:?}")]
    MissingStateFactory { state_id: S },

    #[error("transition to state {state_id:?} failed: {message}")]
    TransitionFailed {
        state_id: S,
        message: String,
        #[source]
        source: StateError,
    },
}
