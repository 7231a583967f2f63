//=========================================================================
// Scene Contracts
//=========================================================================
//
// Narrow collaborator contracts between flow states and the presentation
// layer. The flow core only needs three promises from a renderer:
//
//   SceneDirector - "give me a (preloaded) scene host for this id"
//   SceneHost     - "add/remove a view on a named layer, add/remove an
//                    updatable from the per-frame loop"
//   SceneView     - "this view belongs on that layer"
//
// Concrete renderers live outside this crate.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use async_trait::async_trait;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::gameloop::Updatable;

//=== Key Traits ==========================================================

/// Marker trait for scene identifiers.
///
/// Typically implemented by application-specific enums.
pub trait SceneKey: Copy + Eq + Hash + Debug + 'static {}

/// Marker trait for scene layer identifiers.
pub trait SceneLayerKey: Copy + Eq + Hash + Debug + 'static {}

//=== Scene Errors ========================================================

/// Failures raised by a scene director.
///
/// Carries the offending scene id; retry policy, if any, belongs to the
/// director implementation, not to callers.
#[derive(Debug, Error)]
pub enum SceneError<Id: Debug> {
    #[error("preloading assets for scene {scene_id:?} failed: {reason}")]
    PreloadFailed { scene_id: Id, reason: String },

    #[error("scene {scene_id:?} is not known to the scene director")]
    UnknownScene { scene_id: Id },
}

//=== Scene View ==========================================================

/// A presentable object that declares which layer it belongs to.
pub trait SceneView<L: SceneLayerKey> {
    fn target_layer(&self) -> L;
}

//=== Scene Host ==========================================================

/// A live scene that flow-state modules attach their views to.
///
/// View and updatable registration is identity-based: the same `Rc`
/// handle used to add removes again.
pub trait SceneHost<L: SceneLayerKey> {
    fn add_view(&self, view: Rc<dyn SceneView<L>>);

    fn remove_view(&self, view: &Rc<dyn SceneView<L>>);

    fn add_updatable(&self, updatable: Rc<dyn Updatable>);

    fn remove_updatable(&self, updatable: &Rc<dyn Updatable>);
}

//=== Scene Director ======================================================

/// Produces and retires scene hosts on demand.
///
/// `show` may take time (asset preloading); it resolves once the scene is
/// ready to have views attached.
#[async_trait(?Send)]
pub trait SceneDirector<Sc: SceneKey, L: SceneLayerKey> {
    /// Whether a scene is currently shown.
    fn is_active(&self, scene_id: Sc) -> bool;

    /// Brings the scene up (creating and preloading it if needed) and
    /// returns its host.
    async fn show(&self, scene_id: Sc) -> Result<Rc<dyn SceneHost<L>>, SceneError<Sc>>;

    /// Retires a scene host previously obtained from [`Self::show`].
    /// Returns `false` when the host is not active.
    fn hide(&self, scene: Rc<dyn SceneHost<L>>) -> bool;
}
