//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use brickfall::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Flow machine core
pub use crate::core::fsm::{
    EventKey, FlowError, FlowState, HandleReport, ManagedState, OverlayMode, StateContext,
    StateError, StateHooks, StateKey, StateMachine, StateMeta, StatePhase, Transition,
    TransitionOutcome,
};

// Flow controller
pub use crate::core::flow::{FlowController, FlowControllerBuilder, FlowHandle, FlowObserver};

// Pause scopes
pub use crate::core::pause::{Pausable, PauseScope};

// Scene contracts
pub use crate::core::scene::{SceneDirector, SceneError, SceneHost, SceneKey, SceneLayerKey};

// Module capabilities
pub use crate::core::module::{ActivePhase, DisposePhase, EnterPhase, SceneModule, StateModule};

// Game loop contracts
pub use crate::core::gameloop::{GameLoopPhase, GameTime, Updatable};

// Application flow
pub use crate::app::{AppContext, AppEvent, AppFlow, AppPayload, AppStateId};
