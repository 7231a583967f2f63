//=========================================================================
// Probe State (test support)
//=========================================================================
//
// A scripted FlowState that records every lifecycle call into a shared
// log and mirrors the phase bookkeeping of a real state. Used by the
// fsm unit tests; integration tests assemble real ManagedStates instead.
//
//=========================================================================

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::errors::StateError;
use super::state::{FlowState, OverlayMode, StateMeta, StatePhase};
use super::types::{StateKey, StateRef};

pub(crate) type SharedLog = Rc<RefCell<Vec<String>>>;

pub(crate) fn new_log() -> SharedLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) struct ProbeState<S: StateKey, P: 'static> {
    state_id: S,
    meta: StateMeta,
    phase: Cell<StatePhase>,
    paused: Cell<bool>,
    log: SharedLog,
    attach_gate: RefCell<Option<Rc<Notify>>>,
    fail_enter: Cell<bool>,
    _payload: PhantomData<P>,
}

impl<S: StateKey, P: 'static> ProbeState<S, P> {
    pub fn new(state_id: S, meta: StateMeta, log: SharedLog) -> Rc<Self> {
        Rc::new(Self {
            state_id,
            meta,
            phase: Cell::new(StatePhase::Created),
            paused: Cell::new(false),
            log,
            attach_gate: RefCell::new(None),
            fail_enter: Cell::new(false),
            _payload: PhantomData,
        })
    }

    /// Plain base state: not critical, not an overlay.
    pub fn base(state_id: S, log: SharedLog) -> Rc<Self> {
        Self::new(
            state_id,
            StateMeta {
                critical: false,
                is_overlay: false,
                overlay_mode: OverlayMode::Pause,
            },
            log,
        )
    }

    /// Overlay state with the given mode for what it overlays.
    pub fn overlay(state_id: S, overlay_mode: OverlayMode, log: SharedLog) -> Rc<Self> {
        Self::new(
            state_id,
            StateMeta {
                critical: false,
                is_overlay: true,
                overlay_mode,
            },
            log,
        )
    }

    pub fn critical(state_id: S, is_overlay: bool, log: SharedLog) -> Rc<Self> {
        Self::new(
            state_id,
            StateMeta {
                critical: true,
                is_overlay,
                overlay_mode: OverlayMode::Forbidden,
            },
            log,
        )
    }

    /// Makes the next `attach` wait until the returned Notify is woken.
    pub fn gate_attach(self: &Rc<Self>) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.attach_gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn fail_next_enter(&self) {
        self.fail_enter.set(true);
    }

    pub fn as_state(self: Rc<Self>) -> StateRef<S, P> {
        self
    }

    fn record(&self, call: &str) {
        self.log
            .borrow_mut()
            .push(format!("{:?}.{}", self.state_id, call));
    }
}

#[async_trait(?Send)]
impl<S: StateKey, P: 'static> FlowState<S, P> for ProbeState<S, P> {
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
        self.paused.get()
    }

    async fn attach(&self) -> Result<(), StateError> {
        self.record("attach");
        self.phase.set(StatePhase::Attaching);
        let gate = self.attach_gate.borrow_mut().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.phase.set(StatePhase::Attached);
        Ok(())
    }

    async fn enter(&self, _payload: &P) -> Result<(), StateError> {
        self.record("enter");
        if self.fail_enter.take() {
            return Err(StateError::new("scripted enter failure"));
        }
        self.phase.set(StatePhase::Entered);
        Ok(())
    }

    fn start(&self) {
        self.record("start");
        self.phase.set(StatePhase::Active);
    }

    fn stop(&self) {
        self.record("stop");
        self.phase.set(StatePhase::Entered);
    }

    async fn exit(&self) -> Result<(), StateError> {
        self.record("exit");
        self.phase.set(StatePhase::Attached);
        Ok(())
    }

    fn detach(&self) {
        self.record("detach");
        self.phase.set(StatePhase::Created);
    }

    fn pause(&self) {
        self.record("pause");
        self.paused.set(true);
    }

    fn resume(&self) {
        self.record("resume");
        self.paused.set(false);
    }
}
