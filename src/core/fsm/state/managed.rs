//=========================================================================
// Managed State
//=========================================================================
//
// The reusable FlowState implementation. Application states are built by
// wiring a ManagedState with their metadata, scene scope and modules
// instead of writing lifecycle sequencing by hand.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::try_join_all;
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::fsm::errors::StateError;
use crate::core::fsm::types::{StateKey, StateRef};
use crate::core::module::{ActivePhase, EnterPhase, StateModule};
use crate::core::pause::{Pausable, PauseScope};

use super::overlay::OverlayMode;
use super::phase::StatePhase;
use super::{FlowState, StateScope};

//=== State Metadata ======================================================

/// Static metadata of a state kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMeta {
    pub critical: bool,
    pub is_overlay: bool,
    pub overlay_mode: OverlayMode,
}

//=== ManagedState ========================================================

/// A state assembled from parts:
///
/// - an optional [`StateScope`] (scene acquisition, scene modules),
/// - enter-phase modules, which participate in enter/exit and
///   activation but not in scene attachment,
/// - active-only modules, which participate in activation only,
/// - an optional pause scope propagated by `pause`/`resume`.
///
/// Phase transitions are enforced here: a lifecycle call issued out of
/// phase logs a warning and returns without effect.
pub struct ManagedState<S: StateKey, P> {
    state_id: S,
    meta: StateMeta,
    phase: Cell<StatePhase>,
    scope: Option<Rc<dyn StateScope<P>>>,
    enter_modules: Vec<Rc<dyn StateModule<P>>>,
    active_modules: Vec<Rc<dyn ActivePhase>>,
    pause_scope: Option<Rc<PauseScope>>,
}

impl<S: StateKey, P> ManagedState<S, P> {
    //--- Construction -----------------------------------------------------

    pub fn new(state_id: S, meta: StateMeta) -> Self {
        Self {
            state_id,
            meta,
            phase: Cell::new(StatePhase::Created),
            scope: None,
            enter_modules: Vec::new(),
            active_modules: Vec::new(),
            pause_scope: None,
        }
    }

    pub fn with_scope(mut self, scope: Rc<dyn StateScope<P>>) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_enter_module(mut self, module: Rc<dyn StateModule<P>>) -> Self {
        self.enter_modules.push(module);
        self
    }

    pub fn with_active_module(mut self, module: Rc<dyn ActivePhase>) -> Self {
        self.active_modules.push(module);
        self
    }

    pub fn with_pause_scope(mut self, pause_scope: Rc<PauseScope>) -> Self {
        self.pause_scope = Some(pause_scope);
        self
    }

    /// Finishes assembly into the shared handle the machine works with.
    pub fn into_ref(self) -> StateRef<S, P>
    where
        P: 'static,
    {
        Rc::new(self)
    }

    //--- Phase Guard ------------------------------------------------------

    fn guard_phase(&self, expected: StatePhase, operation: &str) -> bool {
        let current = self.phase.get();
        if current != expected {
            warn!(
                "State {:?} is in phase {:?} and cannot {}",
                self.state_id, current, operation
            );
            return false;
        }
        true
    }
}

#[async_trait(?Send)]
impl<S: StateKey, P> FlowState<S, P> for ManagedState<S, P> {
    //--- Metadata ---------------------------------------------------------

    fn state_id(&self) -> S {
        self.state_id
    }

    fn critical(&self) -> bool {
        self.meta.critical
    }

    fn is_overlay(&self) -> bool {
        self.meta.is_overlay
    }

    fn overlay_mode(&self) -> OverlayMode {
        self.meta.overlay_mode
    }

    fn phase(&self) -> StatePhase {
        self.phase.get()
    }

    fn paused(&self) -> bool {
        self.pause_scope
            .as_ref()
            .map(|scope| scope.paused())
            .unwrap_or(false)
    }

    //--- Lifecycle --------------------------------------------------------

    async fn attach(&self) -> Result<(), StateError> {
        if !self.guard_phase(StatePhase::Created, "attach") {
            return Ok(());
        }

        self.phase.set(StatePhase::Attaching);

        if let Some(scope) = &self.scope {
            scope.attach().await?;
        }

        self.phase.set(StatePhase::Attached);
        Ok(())
    }

    async fn enter(&self, payload: &P) -> Result<(), StateError> {
        if !self.guard_phase(StatePhase::Attached, "enter") {
            return Ok(());
        }

        self.phase.set(StatePhase::Entering);

        let scope_entering = async {
            match &self.scope {
                Some(scope) => scope.enter(payload).await,
                None => Ok(()),
            }
        };
        let modules_entering = try_join_all(self.enter_modules.iter().map(|m| m.enter(payload)));

        let (scope_result, modules_result) = futures::join!(scope_entering, modules_entering);
        scope_result?;
        modules_result?;

        self.phase.set(StatePhase::Entered);
        Ok(())
    }

    fn start(&self) {
        if !self.guard_phase(StatePhase::Entered, "start") {
            return;
        }

        if let Some(scope) = &self.scope {
            scope.start();
        }

        for module in &self.enter_modules {
            if !module.active() {
                module.activate();
            }
        }
        for module in &self.active_modules {
            if !module.active() {
                module.activate();
            }
        }

        self.phase.set(StatePhase::Active);
    }

    fn stop(&self) {
        if !self.guard_phase(StatePhase::Active, "stop") {
            return;
        }

        for module in &self.enter_modules {
            if module.active() {
                module.deactivate();
            }
        }
        for module in &self.active_modules {
            if module.active() {
                module.deactivate();
            }
        }

        if let Some(scope) = &self.scope {
            scope.stop();
        }

        self.phase.set(StatePhase::Entered);
    }

    async fn exit(&self) -> Result<(), StateError> {
        if !self.guard_phase(StatePhase::Entered, "exit") {
            return Ok(());
        }

        self.phase.set(StatePhase::Exiting);

        let scope_exiting = async {
            match &self.scope {
                Some(scope) => scope.exit().await,
                None => Ok(()),
            }
        };
        let modules_exiting = try_join_all(self.enter_modules.iter().map(|m| m.exit()));

        let (scope_result, modules_result) = futures::join!(scope_exiting, modules_exiting);
        scope_result?;
        modules_result?;

        self.phase.set(StatePhase::Attached);
        Ok(())
    }

    fn detach(&self) {
        if !self.guard_phase(StatePhase::Attached, "detach") {
            return;
        }

        if let Some(scope) = &self.scope {
            scope.detach();
        }

        self.phase.set(StatePhase::Created);
    }

    fn pause(&self) {
        if let Some(pause_scope) = &self.pause_scope {
            pause_scope.pause();
        }
        if let Some(scope) = &self.scope {
            scope.pause();
        }
    }

    fn resume(&self) {
        if let Some(pause_scope) = &self.pause_scope {
            pause_scope.resume();
        }
        if let Some(scope) = &self.scope {
            scope.resume();
        }
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestState {
        Menu,
    }

    impl StateKey for TestState {}

    fn plain_meta() -> StateMeta {
        StateMeta {
            critical: false,
            is_overlay: false,
            overlay_mode: OverlayMode::Pause,
        }
    }

    struct RecordingModule {
        active: Cell<bool>,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl RecordingModule {
        fn new(log: Rc<RefCell<Vec<&'static str>>>) -> Rc<Self> {
            Rc::new(Self {
                active: Cell::new(false),
                log,
            })
        }
    }

    #[async_trait(?Send)]
    impl crate::core::module::EnterPhase<u32> for RecordingModule {
        async fn enter(&self, _payload: &u32) -> Result<(), StateError> {
            self.log.borrow_mut().push("enter");
            Ok(())
        }

        async fn exit(&self) -> Result<(), StateError> {
            self.log.borrow_mut().push("exit");
            Ok(())
        }
    }

    impl ActivePhase for RecordingModule {
        fn active(&self) -> bool {
            self.active.get()
        }

        fn activate(&self) {
            self.active.set(true);
            self.log.borrow_mut().push("activate");
        }

        fn deactivate(&self) {
            self.active.set(false);
            self.log.borrow_mut().push("deactivate");
        }
    }

    #[tokio::test]
    async fn full_lifecycle_walks_all_phases() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let module = RecordingModule::new(log.clone());
        let state = ManagedState::<TestState, u32>::new(TestState::Menu, plain_meta())
            .with_enter_module(module);

        assert_eq!(state.phase(), StatePhase::Created);

        state.attach().await.unwrap();
        assert_eq!(state.phase(), StatePhase::Attached);

        state.enter(&7).await.unwrap();
        assert_eq!(state.phase(), StatePhase::Entered);

        state.start();
        assert_eq!(state.phase(), StatePhase::Active);

        state.stop();
        assert_eq!(state.phase(), StatePhase::Entered);

        state.exit().await.unwrap();
        assert_eq!(state.phase(), StatePhase::Attached);

        state.detach();
        assert_eq!(state.phase(), StatePhase::Created);

        assert_eq!(
            *log.borrow(),
            vec!["enter", "activate", "deactivate", "exit"]
        );
    }

    #[tokio::test]
    async fn out_of_phase_calls_are_noops() {
        let state = ManagedState::<TestState, u32>::new(TestState::Menu, plain_meta());

        // start before enter: rejected, phase untouched
        state.start();
        assert_eq!(state.phase(), StatePhase::Created);

        // enter before attach: rejected
        state.enter(&0).await.unwrap();
        assert_eq!(state.phase(), StatePhase::Created);

        state.attach().await.unwrap();

        // double attach: rejected
        state.attach().await.unwrap();
        assert_eq!(state.phase(), StatePhase::Attached);
    }

    #[tokio::test]
    async fn pause_propagates_to_pause_scope() {
        let pause_scope = PauseScope::root("state");
        let state = ManagedState::<TestState, u32>::new(TestState::Menu, plain_meta())
            .with_pause_scope(pause_scope.clone());

        assert!(!state.paused());

        state.pause();
        assert!(state.paused());
        assert!(pause_scope.paused());

        state.resume();
        assert!(!state.paused());
    }
}
