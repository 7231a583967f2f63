//=========================================================================
// Overlay Forbidden
//=========================================================================
//
// The covered state declared it cannot be overlaid at all. A correct
// permit check never routes here; the strategy stays a warning no-op so
// a mis-resolved transition cannot damage lifecycle state.
//
//=========================================================================

use async_trait::async_trait;
use log::warn;

use crate::core::fsm::errors::StateError;
use crate::core::fsm::state::FlowState;
use crate::core::fsm::types::{StateKey, StateRef};

use super::TransitionStrategy;

pub struct OverlayForbidden;

#[async_trait(?Send)]
impl<S: StateKey, P> TransitionStrategy<S, P> for OverlayForbidden {
    async fn run(
        &self,
        closing: &[StateRef<S, P>],
        opening: &StateRef<S, P>,
        _payload: &P,
    ) -> Result<(), StateError> {
        warn!(
            "Overlay {:?} requested above {:?}, which forbids overlays; nothing was done",
            opening.state_id(),
            closing.first().map(|s| s.state_id())
        );

        Ok(())
    }
}
