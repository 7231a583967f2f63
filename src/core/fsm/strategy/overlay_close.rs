//=========================================================================
// Overlay Close
//=========================================================================
//
// Closes one or more overlays (stop, exit, detach in top-down list
// order) and restores the state they covered according to that state's
// own overlay mode:
//
//   Forbidden → nothing further
//   Pause     → resume()
//   Inactive  → start()
//   Exit      → enter(payload) + start()
//
//=========================================================================

use async_trait::async_trait;

use crate::core::fsm::errors::StateError;
use crate::core::fsm::state::{FlowState, OverlayMode};
use crate::core::fsm::types::{StateKey, StateRef};

use super::TransitionStrategy;

pub struct OverlayClose;

#[async_trait(?Send)]
impl<S: StateKey, P> TransitionStrategy<S, P> for OverlayClose {
    async fn run(
        &self,
        closing: &[StateRef<S, P>],
        opening: &StateRef<S, P>,
        payload: &P,
    ) -> Result<(), StateError> {
        for overlay in closing {
            overlay.stop();
        }
        for overlay in closing {
            overlay.exit().await?;
        }
        for overlay in closing {
            overlay.detach();
        }

        match opening.overlay_mode() {
            OverlayMode::Forbidden => {}

            OverlayMode::Pause => {
                opening.resume();
            }

            OverlayMode::Inactive => {
                opening.start();
            }

            OverlayMode::Exit => {
                opening.enter(payload).await?;
                opening.start();
            }
        }

        Ok(())
    }
}
