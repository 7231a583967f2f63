//=========================================================================
// Flow States
//=========================================================================
//
// The state lifecycle contract and its reusable implementation.
//
// Architecture:
//   FlowState (trait)  - metadata + ordered lifecycle, consumed by the
//                        machine and the transition strategies
//   ManagedState       - concrete state: phase enforcement, module
//                        fan-out, pause wiring
//   StateScope (trait) - the slice of lifecycle a scene-bound context
//                        implements on the state's behalf
//   StateContext       - scene-bound StateScope: scene acquisition,
//                        module attachment, enter/exit effects
//
//=========================================================================

//=== External Dependencies ===============================================

use async_trait::async_trait;

//=== Internal Dependencies ===============================================

use super::errors::StateError;
use super::types::StateKey;

//=== Module Declarations =================================================

mod context;
mod managed;
mod overlay;
mod phase;

//=== Public API ==========================================================

pub use context::{StateContext, StateHooks};
pub use managed::{ManagedState, StateMeta};
pub use overlay::OverlayMode;
pub use phase::StatePhase;

//=== FlowState Trait =====================================================

/// A single named mode of the application (main menu, gameplay, a
/// settings popup).
///
/// Carries static metadata and exposes the ordered lifecycle
/// `attach → enter → start` / `stop → exit → detach`, plus `pause` /
/// `resume` which bypass the transition machinery entirely (they only
/// flip a flag and propagate to owned sub-systems).
///
/// `attach` performs preload/setup and must complete before `enter`;
/// `enter` applies payload data and awaits entry effects before `start`
/// activates the live sub-systems. Teardown mirrors this. A call issued
/// out of phase is a logged no-op, keeping the orchestrator robust to
/// double-invocation bugs in strategies.
#[async_trait(?Send)]
pub trait FlowState<S: StateKey, P> {
    //--- Metadata ---------------------------------------------------------

    fn state_id(&self) -> S;

    /// Critical states monopolize transition lookups while dominant.
    fn critical(&self) -> bool;

    /// Overlay states sit on a stack above a base state rather than
    /// replacing it.
    fn is_overlay(&self) -> bool;

    /// How this state reacts when something else overlays *it*.
    fn overlay_mode(&self) -> OverlayMode;

    fn phase(&self) -> StatePhase;

    fn paused(&self) -> bool;

    //--- Lifecycle --------------------------------------------------------

    async fn attach(&self) -> Result<(), StateError>;

    async fn enter(&self, payload: &P) -> Result<(), StateError>;

    fn start(&self);

    fn stop(&self);

    async fn exit(&self) -> Result<(), StateError>;

    fn detach(&self);

    fn pause(&self);

    fn resume(&self);
}

//=== StateScope Trait ====================================================

/// Lifecycle delegate owned by a [`ManagedState`].
///
/// A scope receives every phase call the state itself receives and is
/// where scene acquisition and scene-module control live. The state owns
/// its scope; calls only ever flow downward.
#[async_trait(?Send)]
pub trait StateScope<P> {
    async fn attach(&self) -> Result<(), StateError>;

    async fn enter(&self, payload: &P) -> Result<(), StateError>;

    fn start(&self);

    fn stop(&self);

    async fn exit(&self) -> Result<(), StateError>;

    fn detach(&self);

    fn pause(&self);

    fn resume(&self);

    fn paused(&self) -> bool;
}
