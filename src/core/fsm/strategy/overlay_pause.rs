//=========================================================================
// Overlay Through Pause
//=========================================================================
//
// Cheapest overlay mode: the covered states are paused in place (no
// stop, no exit) and simply resume when the overlay closes. Appropriate
// when the underlying logic can freeze as-is, e.g. gameplay under a
// pause menu.
//
//=========================================================================

use async_trait::async_trait;

use crate::core::fsm::errors::StateError;
use crate::core::fsm::state::FlowState;
use crate::core::fsm::types::{StateKey, StateRef};

use super::{open_state, TransitionStrategy};

pub struct OverlayThroughPause;

#[async_trait(?Send)]
impl<S: StateKey, P> TransitionStrategy<S, P> for OverlayThroughPause {
    async fn run(
        &self,
        closing: &[StateRef<S, P>],
        opening: &StateRef<S, P>,
        payload: &P,
    ) -> Result<(), StateError> {
        for state in closing {
            state.pause();
        }

        open_state(opening, payload).await
    }
}
