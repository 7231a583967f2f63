//=========================================================================
// Flow Machine Tools
//=========================================================================
//
// Pure functions behind StateMachine::handle:
//
//   priority_sorted_states - who can currently receive events, in order
//   resolve_dominant_state - who owns events right now
//   find_transition        - locate the first matching transition
//   check_transition_permit - may the located transition actually fire
//
// None of these touch machine state; they take snapshots and return
// values, which keeps every rule independently testable.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::state::FlowState;
use super::types::{
    ActiveTransition, EventKey, StateKey, StateRef, Transition, TransitionOutcome,
};

//=== Priority Resolution =================================================

/// Returns all active states sorted by priority, highest first.
///
/// The overlay stack is walked bottom to top; a later (higher) overlay
/// outranks everything before it. A critical state cuts off every state
/// below it: a critical overlay resets the list to itself, and a critical
/// base state refuses to let non-critical overlays outrank it.
pub fn priority_sorted_states<S: StateKey, P>(
    base: &StateRef<S, P>,
    overlays: &[StateRef<S, P>],
) -> Vec<StateRef<S, P>> {
    let mut result = vec![Rc::clone(base)];

    for overlay in overlays {
        if overlay.critical() {
            result.clear();
            result.push(Rc::clone(overlay));
            continue;
        }

        let cut_off_by_critical_base =
            base.critical() && result.len() == 1 && Rc::ptr_eq(&result[0], base);
        if !cut_off_by_critical_base {
            result.insert(0, Rc::clone(overlay));
        }
    }

    result
}

/// The single state that currently owns incoming events.
pub fn resolve_dominant_state<S: StateKey, P>(
    base: &StateRef<S, P>,
    overlays: &[StateRef<S, P>],
) -> StateRef<S, P> {
    // The priority list is never empty: it starts from the base state and
    // criticals replace rather than drop.
    priority_sorted_states(base, overlays)
        .into_iter()
        .next()
        .expect("priority list cannot be empty")
}

//=== Transition Locator ==================================================

/// Walks the priority-sorted states and returns the first transition
/// registered for `event`, together with the state it was found on.
///
/// `None` means the event is unhandled in the current configuration; the
/// caller surfaces that as an error rather than dropping it.
pub fn find_transition<'t, S: StateKey, E: EventKey, P, C>(
    event: E,
    states_by_priority: &[StateRef<S, P>],
    table: &'t HashMap<S, Vec<Transition<S, E, P, C>>>,
) -> Option<(&'t Transition<S, E, P, C>, StateRef<S, P>)> {
    for state in states_by_priority {
        let Some(transitions) = table.get(&state.state_id()) else {
            continue;
        };

        for transition in transitions {
            if transition.on_event == event {
                return Some((transition, Rc::clone(state)));
            }
        }
    }

    None
}

//=== Permit Checker ======================================================

/// Validates a located transition against the dominant state.
///
/// Returns `None` when the transition may proceed, or the structured
/// blocked outcome explaining why not. Check order:
///
/// 1. the transition's source must be the dominant state (guards against
///    stale lookups),
/// 2. no transition may be in flight (unconditionally: interrupting an
///    in-flight transition is an unimplemented extension, so
///    `can_interrupt` does not open this gate),
/// 3. closing without a target requires the dominant state to be an
///    overlay,
/// 4. the target state must have a registered factory,
/// 5. the guard, if present, must pass.
pub fn check_transition_permit<S, E, P, C>(
    dominant: &StateRef<S, P>,
    trigger_event: E,
    transition: &Transition<S, E, P, C>,
    is_state_registered: impl Fn(S) -> bool,
    context: &C,
    active_transition: Option<&ActiveTransition<S, E>>,
) -> Option<TransitionOutcome<S>>
where
    S: StateKey,
    E: EventKey,
{
    if dominant.state_id() != transition.from_state {
        return Some(TransitionOutcome::Blocked {
            from_state: Some(dominant.state_id()),
            to_state: transition.to_state,
            info: format!(
                "transition source {:?} does not match the dominant state {:?}",
                transition.from_state,
                dominant.state_id()
            ),
        });
    }

    if let Some(active) = active_transition {
        return Some(TransitionOutcome::Blocked {
            from_state: active.to_state,
            to_state: transition.to_state,
            info: format!(
                "a transition from {:?} to {:?} is in flight and cannot be interrupted by {:?}",
                active.from_state, active.to_state, trigger_event
            ),
        });
    }

    let Some(to_state) = transition.to_state else {
        if dominant.is_overlay() {
            // the dominant overlay closes without entering a new state
            return None;
        }

        return Some(TransitionOutcome::Blocked {
            from_state: Some(dominant.state_id()),
            to_state: None,
            info: format!(
                "state {:?} is not an overlay and cannot close without a target state",
                dominant.state_id()
            ),
        });
    };

    if !is_state_registered(to_state) {
        return Some(TransitionOutcome::Blocked {
            from_state: Some(dominant.state_id()),
            to_state: Some(to_state),
            info: format!("target state {:?} is not registered", to_state),
        });
    }

    if let Some(guard) = &transition.guard {
        if !guard(context) {
            return Some(TransitionOutcome::Blocked {
                from_state: Some(dominant.state_id()),
                to_state: Some(to_state),
                info: format!("transition to {:?} blocked by guard", to_state),
            });
        }
    }

    None
}

//=== Tests ===============================================================
