//=========================================================================
// Application Scenes
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::scene::{SceneKey, SceneLayerKey};

//=== Scene Ids ===========================================================

/// One scene per top-level screen or popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppSceneId {
    Menu,
    Settings,
    Loading,
    Game,
    Pause,
    Win,
    Lose,
}

impl SceneKey for AppSceneId {}

//=== Scene Layers ========================================================

/// The named layers every application scene exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppLayerId {
    Background,
    Content,
    Hud,
    Popup,
}

impl SceneLayerKey for AppLayerId {}
