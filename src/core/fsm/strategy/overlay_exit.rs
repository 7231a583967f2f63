//=========================================================================
// Overlay Through Exit
//=========================================================================
//
// The most expensive overlay mode: the covered states are stopped and
// fully exited (entered data invalidated) but stay attached. Restoring
// requires a fresh `enter` with the closing payload plus `start`.
//
//=========================================================================

use async_trait::async_trait;

use crate::core::fsm::errors::StateError;
use crate::core::fsm::state::FlowState;
use crate::core::fsm::types::{StateKey, StateRef};

use super::{open_state, TransitionStrategy};

pub struct OverlayThroughExit;

#[async_trait(?Send)]
impl<S: StateKey, P> TransitionStrategy<S, P> for OverlayThroughExit {
    async fn run(
        &self,
        closing: &[StateRef<S, P>],
        opening: &StateRef<S, P>,
        payload: &P,
    ) -> Result<(), StateError> {
        for state in closing {
            state.stop();
        }
        for state in closing {
            state.exit().await?;
        }

        open_state(opening, payload).await
    }
}
