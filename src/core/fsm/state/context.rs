//=========================================================================
// State Context
//=========================================================================
//
// Scene-bound lifecycle delegate for a ManagedState.
//
// Responsibilities per phase:
//   attach - obtain the scene host from the director, attach modules
//   enter  - enter modules, then await the enter-finish hook (fade-in)
//   start  - activate modules
//   stop   - deactivate modules
//   exit   - await the exit-start hook (fade-out), then exit modules
//   detach - fire the detach hook, strip and dispose modules, hide scene
//
// The context is owned by its state; pause/resume calls travel down into
// the state's pause scope, never back up.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::fsm::errors::StateError;
use crate::core::module::{ActivePhase, DisposePhase, EnterPhase, SceneAttachable, SceneModule};
use crate::core::pause::{Pausable, PauseScope};
use crate::core::scene::{SceneDirector, SceneHost, SceneKey, SceneLayerKey};

use super::StateScope;

//=== State Hooks =========================================================

/// Optional effects a state context fires at phase boundaries.
///
/// The default implementations do nothing; states override only what
/// they need (a fade-in on enter, releasing a pause-manager slot on
/// detach).
#[async_trait(?Send)]
pub trait StateHooks {
    /// Awaited after all modules have entered.
    async fn enter_finished(&self) {}

    /// Awaited before modules start exiting.
    async fn exit_started(&self) {}

    /// Fired first thing on detach.
    fn detach_started(&self) {}
}

//=== StateContext ========================================================

/// Scene-bound [`StateScope`] implementation.
pub struct StateContext<Sc: SceneKey, L: SceneLayerKey, P> {
    scene_id: Sc,
    pause: Rc<PauseScope>,
    modules: RefCell<Vec<Rc<dyn SceneModule<L, P>>>>,
    director: Rc<dyn SceneDirector<Sc, L>>,
    scene: RefCell<Option<Rc<dyn SceneHost<L>>>>,
    hooks: Option<Rc<dyn StateHooks>>,
}

impl<Sc: SceneKey, L: SceneLayerKey, P> StateContext<Sc, L, P> {
    pub fn new(
        scene_id: Sc,
        pause: Rc<PauseScope>,
        modules: Vec<Rc<dyn SceneModule<L, P>>>,
        director: Rc<dyn SceneDirector<Sc, L>>,
    ) -> Self {
        Self {
            scene_id,
            pause,
            modules: RefCell::new(modules),
            director,
            scene: RefCell::new(None),
            hooks: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Rc<dyn StateHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn scene_id(&self) -> Sc {
        self.scene_id
    }

    fn modules(&self) -> Vec<Rc<dyn SceneModule<L, P>>> {
        self.modules.borrow().clone()
    }
}

#[async_trait(?Send)]
impl<Sc: SceneKey, L: SceneLayerKey, P> StateScope<P> for StateContext<Sc, L, P> {
    async fn attach(&self) -> Result<(), StateError> {
        let scene = self.director.show(self.scene_id).await.map_err(|e| {
            StateError::with_source(
                format!("cannot show scene {:?}", self.scene_id),
                e,
            )
        })?;

        for module in self.modules().iter() {
            module.attach_to_scene(scene.as_ref());
        }

        *self.scene.borrow_mut() = Some(scene);
        Ok(())
    }

    async fn enter(&self, payload: &P) -> Result<(), StateError> {
        let modules = self.modules();
        try_join_all(modules.iter().map(|m| m.enter(payload))).await?;

        if let Some(hooks) = &self.hooks {
            hooks.enter_finished().await;
        }
        Ok(())
    }

    fn start(&self) {
        for module in self.modules().iter() {
            if !module.active() {
                module.activate();
            }
        }
    }

    fn stop(&self) {
        for module in self.modules().iter() {
            if module.active() {
                module.deactivate();
            }
        }
    }

    async fn exit(&self) -> Result<(), StateError> {
        if let Some(hooks) = &self.hooks {
            hooks.exit_started().await;
        }

        let modules = self.modules();
        try_join_all(modules.iter().map(|m| m.exit())).await?;
        Ok(())
    }

    fn detach(&self) {
        if let Some(hooks) = &self.hooks {
            hooks.detach_started();
        }

        let Some(scene) = self.scene.borrow_mut().take() else {
            warn!(
                "State context for scene {:?} detached without an attached scene",
                self.scene_id
            );
            return;
        };

        let modules = std::mem::take(&mut *self.modules.borrow_mut());
        for module in &modules {
            module.detach_from_scene(scene.as_ref());
            module.dispose();
        }

        self.director.hide(scene);
    }

    fn pause(&self) {
        self.pause.pause();
    }

    fn resume(&self) {
        self.pause.resume();
    }

    fn paused(&self) -> bool {
        self.pause.paused()
    }
}

//=== Tests ===============================================================
