//=========================================================================
// Module Capabilities
//=========================================================================
//
// Capability traits for the units of behavior a flow state coordinates
// (view/control/model triples in the application layer).
//
// Capabilities are explicit and chosen at registration time: a state owns
// modules through the exact trait set they implement, so the flow core
// never probes an object's shape at runtime.
//
//   EnterPhase      - apply payload data, run entry/exit effects (async)
//   ActivePhase     - switch input/animation/sound sub-systems on and off
//   DisposePhase    - final teardown
//   SceneAttachable - put views on / take views off a scene host
//
//=========================================================================

//=== External Dependencies ===============================================

use async_trait::async_trait;

//=== Internal Dependencies ===============================================

use crate::core::fsm::StateError;
use crate::core::scene::{SceneHost, SceneLayerKey};

//=== Capability Traits ===================================================

/// Enter/exit phase: payload application and awaited transition effects
/// (fades, intro animations).
#[async_trait(?Send)]
pub trait EnterPhase<P> {
    /// Applies payload data and runs the entry effect to completion.
    async fn enter(&self, payload: &P) -> Result<(), StateError>;

    /// Runs the exit effect to completion.
    async fn exit(&self) -> Result<(), StateError>;
}

/// Active phase: live sub-systems that can be switched on and off.
pub trait ActivePhase {
    fn active(&self) -> bool;

    fn activate(&self);

    fn deactivate(&self);
}

/// Final teardown of a module's owned resources.
pub trait DisposePhase {
    fn dispose(&self);
}

/// Presence on a scene: attach views and updatables to a host.
pub trait SceneAttachable<L: SceneLayerKey> {
    fn attach_to_scene(&self, scene: &dyn SceneHost<L>);

    fn detach_from_scene(&self, scene: &dyn SceneHost<L>);
}

//=== Composite Contracts =================================================

/// A module owned directly by a state: participates in the enter and
/// active phases but has no scene presence of its own.
pub trait StateModule<P>: EnterPhase<P> + ActivePhase {}

impl<P, T: EnterPhase<P> + ActivePhase> StateModule<P> for T {}

/// A module owned by a state's scene context: full lifecycle including
/// scene attachment and disposal.
pub trait SceneModule<L: SceneLayerKey, P>:
    SceneAttachable<L> + EnterPhase<P> + ActivePhase + DisposePhase
{
}

impl<L: SceneLayerKey, P, T> SceneModule<L, P> for T where
    T: SceneAttachable<L> + EnterPhase<P> + ActivePhase + DisposePhase
{
}
