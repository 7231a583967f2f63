//=========================================================================
// Flow Machine Types
//=========================================================================
//
// Key marker traits, the transition record, and the structured result
// contract of `StateMachine::handle`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::state::FlowState;

//=== Key Traits ==========================================================

/// Marker trait for state identifiers.
///
/// Implemented by application-specific enums; each registered state kind
/// carries a unique key.
pub trait StateKey: Copy + Eq + Hash + Debug + 'static {}

/// Marker trait for event kinds.
///
/// The kind selects a transition; event data travels separately as the
/// payload type `P` (a tagged union with a unit variant for data-less
/// events).
pub trait EventKey: Copy + Eq + Debug + 'static {}

//=== Shared Aliases ======================================================

/// Shared handle to a live state instance.
pub type StateRef<S, P> = Rc<dyn FlowState<S, P>>;

/// Factory invoked each time a state kind is needed; instances are
/// discarded after detach, never pooled.
pub type StateFactory<S, P> = Box<dyn Fn() -> StateRef<S, P>>;

/// Pure predicate deciding whether a transition may fire.
pub type GuardFn<C> = Box<dyn Fn(&C) -> bool>;

/// Side effect executed right before a permitted transition starts.
pub type ActionFn<C, P> = Box<dyn Fn(&C, &P)>;

//=== Transition ==========================================================

/// A single record of the declarative transition table.
///
/// `to_state: None` means "close the current overlay without entering a
/// new state".
pub struct Transition<S: StateKey, E: EventKey, P, C> {
    pub from_state: S,
    pub to_state: Option<S>,
    pub on_event: E,
    pub guard: Option<GuardFn<C>>,
    pub action: Option<ActionFn<C, P>>,
    /// Whether a later event may interrupt this transition while it is in
    /// flight. Stored and reported, but cancellation itself is an
    /// unimplemented extension: in-flight transitions block everything.
    pub can_interrupt: bool,
}

impl<S: StateKey, E: EventKey, P, C> Transition<S, E, P, C> {
    /// Transition into a target state.
    pub fn new(from_state: S, on_event: E, to_state: S) -> Self {
        Self {
            from_state,
            to_state: Some(to_state),
            on_event,
            guard: None,
            action: None,
            can_interrupt: false,
        }
    }

    /// Close-the-overlay transition: no target state.
    pub fn close(from_state: S, on_event: E) -> Self {
        Self {
            from_state,
            to_state: None,
            on_event,
            guard: None,
            action: None,
            can_interrupt: false,
        }
    }

    pub fn with_guard(mut self, guard: impl Fn(&C) -> bool + 'static) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    pub fn with_action(mut self, action: impl Fn(&C, &P) + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn interruptible(mut self) -> Self {
        self.can_interrupt = true;
        self
    }
}

impl<S: StateKey, E: EventKey, P, C> Debug for Transition<S, E, P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from_state", &self.from_state)
            .field("to_state", &self.to_state)
            .field("on_event", &self.on_event)
            .field("guarded", &self.guard.is_some())
            .field("can_interrupt", &self.can_interrupt)
            .finish()
    }
}

//=== Active Transition ===================================================

/// Snapshot of the transition currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTransition<S: StateKey, E: EventKey> {
    pub from_state: S,
    pub to_state: Option<S>,
    pub on_event: E,
    pub can_interrupt: bool,
}

impl<S: StateKey, E: EventKey> ActiveTransition<S, E> {
    pub(crate) fn snapshot<P, C>(transition: &Transition<S, E, P, C>) -> Self {
        Self {
            from_state: transition.from_state,
            to_state: transition.to_state,
            on_event: transition.on_event,
            can_interrupt: transition.can_interrupt,
        }
    }
}

//=== Handle Report =======================================================

/// Outcome of a handled event.
///
/// `Interrupted` is the reserved reporting shape for transition
/// cancellation; it is never produced while cancellation remains
/// unimplemented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome<S: StateKey> {
    Success,

    Blocked {
        from_state: Option<S>,
        to_state: Option<S>,
        info: String,
    },

    Interrupted {
        from_state: S,
        to_state: S,
        interrupted_by: S,
    },
}

/// Structured result of `StateMachine::handle`.
///
/// A blocked transition is a normal, expected outcome (a UI-driven
/// invalid action), never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleReport<S: StateKey, E: EventKey> {
    pub trigger_event: E,
    pub outcome: TransitionOutcome<S>,
}

impl<S: StateKey, E: EventKey> HandleReport<S, E> {
    pub fn success(trigger_event: E) -> Self {
        Self {
            trigger_event,
            outcome: TransitionOutcome::Success,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TransitionOutcome::Success)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self.outcome, TransitionOutcome::Blocked { .. })
    }
}
