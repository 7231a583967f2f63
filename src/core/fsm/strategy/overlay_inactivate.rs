//=========================================================================
// Overlay Through Inactivate
//=========================================================================
//
// Heavier than pause: the covered states are stopped (live sub-systems
// deactivated) but not exited. Restoring calls `start` to bring the
// sub-systems back up.
//
//=========================================================================

use async_trait::async_trait;

use crate::core::fsm::errors::StateError;
use crate::core::fsm::state::FlowState;
use crate::core::fsm::types::{StateKey, StateRef};

use super::{open_state, TransitionStrategy};

pub struct OverlayThroughInactivate;

#[async_trait(?Send)]
impl<S: StateKey, P> TransitionStrategy<S, P> for OverlayThroughInactivate {
    async fn run(
        &self,
        closing: &[StateRef<S, P>],
        opening: &StateRef<S, P>,
        payload: &P,
    ) -> Result<(), StateError> {
        for state in closing {
            state.stop();
        }

        open_state(opening, payload).await
    }
}
