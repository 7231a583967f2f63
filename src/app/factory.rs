//=========================================================================
// Application State Factories
//=========================================================================
//
// Builds the ManagedState for every flow-state kind: scene-bound context
// on the state's scene, a fresh pause slot under the root scope, and a
// detach hook that gives the slot back.
//
// States are created on demand and discarded after detach; the factory
// runs again the next time the kind is needed.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::fsm::{ManagedState, StateContext, StateHooks, StateRef};
use crate::core::pause::PauseScope;
use crate::core::scene::SceneDirector;

use super::events::AppPayload;
use super::flow::AppMachine;
use super::scenes::{AppLayerId, AppSceneId};
use super::states::AppStateId;

//=== Pause Slot Release ==================================================

/// Detach hook: hands a state's pause slot back to the root scope.
struct PauseSlotRelease {
    root: Rc<PauseScope>,
    slot: Rc<PauseScope>,
}

#[async_trait::async_trait(?Send)]
impl StateHooks for PauseSlotRelease {
    fn detach_started(&self) {
        self.root.remove_child(&self.slot);
    }
}

//=== AppStatesFactory ====================================================

pub struct AppStatesFactory {
    scenes: Rc<dyn SceneDirector<AppSceneId, AppLayerId>>,
    pause_root: Rc<PauseScope>,
}

impl AppStatesFactory {
    pub fn new(
        scenes: Rc<dyn SceneDirector<AppSceneId, AppLayerId>>,
        pause_root: Rc<PauseScope>,
    ) -> Self {
        Self { scenes, pause_root }
    }

    /// Registers a factory for every application state kind.
    pub fn register_all(&self, machine: &mut AppMachine) {
        for state_id in AppStateId::ALL {
            machine.register_state(state_id, self.state_factory(state_id));
        }
    }

    fn state_factory(
        &self,
        state_id: AppStateId,
    ) -> impl Fn() -> StateRef<AppStateId, AppPayload> + 'static {
        let scenes = Rc::clone(&self.scenes);
        let pause_root = Rc::clone(&self.pause_root);

        move || {
            let slot = pause_root.child(format!("state:{state_id:?}"));

            let context = StateContext::new(
                state_id.scene_id(),
                Rc::clone(&slot),
                Vec::new(),
                Rc::clone(&scenes),
            )
            .with_hooks(Rc::new(PauseSlotRelease {
                root: Rc::clone(&pause_root),
                slot: Rc::clone(&slot),
            }));

            ManagedState::new(state_id, state_id.meta())
                .with_scope(Rc::new(context))
                .with_pause_scope(slot)
                .into_ref()
        }
    }
}
