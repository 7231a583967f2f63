//=========================================================================
// Flow State Machine
//=========================================================================
//
// Hierarchical, overlay-aware finite state machine for application flow.
//
// Architecture:
//   StateMachine
//     ├─ factories: HashMap<S, StateFactory>        (register_state)
//     ├─ transitions: HashMap<S, Vec<Transition>>   (register_transitions)
//     ├─ base_state + overlay_states                (the active set)
//     └─ active_transition                          (at most one in flight)
//
// Flow:
//   handle(event) → tools::find_transition → tools::check_transition_permit
//                 → strategy::strategy_for(kind) → lifecycle calls on states
//                 → HandleReport { success | blocked }
//
//=========================================================================

//=== Module Declarations =================================================

mod errors;
mod machine;
mod types;

pub mod state;
pub mod strategy;
pub mod tools;

#[cfg(test)]
pub(crate) mod probe;

//=== Public API ==========================================================

pub use errors::{FlowError, StateError};
pub use machine::StateMachine;
pub use state::{
    FlowState, ManagedState, OverlayMode, StateContext, StateHooks, StateMeta, StatePhase,
    StateScope,
};
pub use types::{
    ActionFn, ActiveTransition, EventKey, GuardFn, HandleReport, StateFactory, StateKey, StateRef,
    Transition, TransitionOutcome,
};
