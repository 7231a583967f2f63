//=========================================================================
// Replace Transition
//=========================================================================
//
// The plain state-to-state transition: the whole active set is closed
// (overlays unwinding before their host), then the new base state is
// attached, entered and started.
//
//=========================================================================

use async_trait::async_trait;

use crate::core::fsm::errors::StateError;
use crate::core::fsm::types::{StateKey, StateRef};

use super::{close_states, open_state, TransitionStrategy};

pub struct ReplaceTransition;

#[async_trait(?Send)]
impl<S: StateKey, P> TransitionStrategy<S, P> for ReplaceTransition {
    async fn run(
        &self,
        closing: &[StateRef<S, P>],
        opening: &StateRef<S, P>,
        payload: &P,
    ) -> Result<(), StateError> {
        close_states(closing).await?;

        open_state(opening, payload).await
    }
}
