//=========================================================================
// Flow Controller
//=========================================================================
//
// Drives a StateMachine from a host-side event feed.
//
// Architecture:
//   producers (input, timers, gameplay) ──FlowHandle::emit──► channel
//                                                               │
//   host tick ──► FlowController::pump ──► StateMachine::handle ┘
//                      │
//                      └─► FlowObserver (completed / blocked / fatal)
//
// Events drain strictly serialized and in FIFO order: the pump awaits
// the settlement of one `handle` before taking the next event, which is
// what the machine's single-in-flight bookkeeping requires.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::error::Error;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::fsm::{
    EventKey, HandleReport, StateError, StateKey, StateMachine, TransitionOutcome,
};

//=== Flow Observer =======================================================

/// Receives the user-visible outcomes of handled events.
///
/// Blocked transitions arrive here as notifications, not crashes;
/// execution failures arrive as fatal errors for top-level handling.
/// All methods default to no-ops.
pub trait FlowObserver<S: StateKey, E: EventKey> {
    fn transition_completed(&self, _event: E) {}

    fn transition_blocked(
        &self,
        _event: E,
        _from_state: Option<S>,
        _to_state: Option<S>,
        _info: &str,
    ) {
    }

    fn transition_interrupted(
        &self,
        _event: E,
        _from_state: Option<S>,
        _to_state: Option<S>,
        _interrupted_by: Option<S>,
    ) {
    }

    fn fatal_error(&self, _error: &(dyn Error + 'static)) {}
}

//=== Flow Handle =========================================================

/// Cloneable producer side of the event feed.
pub struct FlowHandle<E, P> {
    sender: Sender<(E, P)>,
}

impl<E, P> Clone for FlowHandle<E, P> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E: EventKey, P> FlowHandle<E, P> {
    /// Queues an event for the next pump. Returns `false` when the feed
    /// is full or the controller is gone.
    pub fn emit(&self, event: E, payload: P) -> bool {
        match self.sender.try_send((event, payload)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Event feed is full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Event feed is disconnected, dropping {:?}", event);
                false
            }
        }
    }
}

//=== Builder =============================================================

/// Builder for [`FlowController`].
///
/// # Default Values
///
/// - **Channel capacity**: 128 events
pub struct FlowControllerBuilder<S: StateKey, E: EventKey, P, C> {
    machine: StateMachine<S, E, P, C>,
    observer: Option<Box<dyn FlowObserver<S, E>>>,
    channel_capacity: usize,
}

impl<S: StateKey, E: EventKey, P, C> FlowControllerBuilder<S, E, P, C> {
    pub fn new(machine: StateMachine<S, E, P, C>) -> Self {
        Self {
            machine,
            observer: None,
            channel_capacity: 128,
        }
    }

    pub fn with_observer(mut self, observer: impl FlowObserver<S, E> + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Sets the event feed capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Builds the controller and the producer handle for its event feed.
    pub fn build(self) -> (FlowController<S, E, P, C>, FlowHandle<E, P>) {
        let (sender, receiver) = bounded(self.channel_capacity);

        (
            FlowController {
                machine: self.machine,
                events: receiver,
                observer: self.observer,
                running: Cell::new(false),
            },
            FlowHandle { sender },
        )
    }
}

//=== FlowController ======================================================

/// Owns the machine and pumps events into it at tick boundaries.
pub struct FlowController<S: StateKey, E: EventKey, P, C> {
    machine: StateMachine<S, E, P, C>,
    events: Receiver<(E, P)>,
    observer: Option<Box<dyn FlowObserver<S, E>>>,
    running: Cell<bool>,
}

impl<S: StateKey, E: EventKey, P, C> FlowController<S, E, P, C> {
    //--- Queries ----------------------------------------------------------

    pub fn machine(&self) -> &StateMachine<S, E, P, C> {
        &self.machine
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    //--- Lifecycle --------------------------------------------------------

    /// Switches the machine into its initial state. Returns `false` (and
    /// reports a fatal error) when initialization fails.
    pub async fn start(&self, initial_state: S, payload: &P) -> bool {
        if self.running.get() {
            warn!("Double start of flow controller");
            return true;
        }

        match self.machine.init(initial_state, payload).await {
            Ok(true) => {
                info!("Flow controller started in state {:?}", initial_state);
                self.running.set(true);
                true
            }
            Ok(false) => {
                self.report_fatal(&StateError::new(format!(
                    "cannot initialize the state machine with {:?}",
                    initial_state
                )));
                false
            }
            Err(e) => {
                self.report_fatal(&e);
                false
            }
        }
    }

    /// Tears the machine down. Idempotent.
    pub async fn stop(&self) {
        if !self.running.get() {
            warn!("Double stop of flow controller");
            return;
        }
        self.running.set(false);

        if let Err(e) = self.machine.destroy().await {
            self.report_fatal(&e);
        }
    }

    //--- Event Pump -------------------------------------------------------

    /// Drains all currently queued events, one at a time, and routes each
    /// outcome to the observer. Called by the host at tick boundaries.
    pub async fn pump(&self) {
        while let Ok((event, payload)) = self.events.try_recv() {
            self.dispatch(event, &payload).await;
        }
    }

    /// Runs a single event through the machine.
    pub async fn dispatch(&self, event: E, payload: &P) {
        match self.machine.handle(event, payload).await {
            Ok(report) => self.report(report),
            Err(e) => {
                error!("Event {:?} failed: {}", event, e);
                self.report_fatal(&e);
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn report(&self, report: HandleReport<S, E>) {
        let Some(observer) = &self.observer else {
            return;
        };

        match report.outcome {
            TransitionOutcome::Success => {
                observer.transition_completed(report.trigger_event);
            }
            TransitionOutcome::Blocked {
                from_state,
                to_state,
                ref info,
            } => {
                warn!(
                    "Transition on {:?} blocked: {}",
                    report.trigger_event, info
                );
                observer.transition_blocked(report.trigger_event, from_state, to_state, info);
            }
            TransitionOutcome::Interrupted {
                from_state,
                to_state,
                interrupted_by,
            } => {
                observer.transition_interrupted(
                    report.trigger_event,
                    Some(from_state),
                    Some(to_state),
                    Some(interrupted_by),
                );
            }
        }
    }

    fn report_fatal(&self, error: &(dyn Error + 'static)) {
        if let Some(observer) = &self.observer {
            observer.fatal_error(error);
        }
    }
}

//=== Tests ===============================================================
