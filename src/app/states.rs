//=========================================================================
// Application States
//=========================================================================
//
// The flow-state kinds of the game and their static metadata.
//
// Metadata summary:
//   - overlays: Settings, PauseMenu, LoseScreen. They stack above a
//     base screen instead of replacing it
//   - criticals: everything except MainMenu and Settings. While they
//     are dominant no lower state can initiate a transition
//   - overlay mode describes how a state reacts to being covered, e.g.
//     gameplay freezes under the pause popup (Pause), the menu shuts its
//     interactions down under a full screen change (Inactive)
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::fsm::{OverlayMode, StateKey, StateMeta};

use super::scenes::AppSceneId;

//=== State Ids ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppStateId {
    MainMenu,
    Settings,
    LoadingGame,
    Game,
    PauseMenu,
    LoseScreen,
    WinScreen,
}

impl StateKey for AppStateId {}

impl AppStateId {
    pub const ALL: [AppStateId; 7] = [
        AppStateId::MainMenu,
        AppStateId::Settings,
        AppStateId::LoadingGame,
        AppStateId::Game,
        AppStateId::PauseMenu,
        AppStateId::LoseScreen,
        AppStateId::WinScreen,
    ];

    /// How this state reacts when another state overlays it.
    pub fn overlay_mode(self) -> OverlayMode {
        match self {
            AppStateId::MainMenu => OverlayMode::Inactive,
            AppStateId::Settings => OverlayMode::Pause,
            AppStateId::LoadingGame => OverlayMode::Forbidden,
            AppStateId::Game => OverlayMode::Pause,
            AppStateId::PauseMenu => OverlayMode::Forbidden,
            AppStateId::LoseScreen => OverlayMode::Pause,
            AppStateId::WinScreen => OverlayMode::Inactive,
        }
    }

    /// Whether this state stacks above a base screen.
    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            AppStateId::Settings | AppStateId::PauseMenu | AppStateId::LoseScreen
        )
    }

    /// Critical states monopolize transitions while dominant.
    pub fn critical(self) -> bool {
        !matches!(self, AppStateId::MainMenu | AppStateId::Settings)
    }

    pub fn meta(self) -> StateMeta {
        StateMeta {
            critical: self.critical(),
            is_overlay: self.is_overlay(),
            overlay_mode: self.overlay_mode(),
        }
    }

    /// The scene presenting this state.
    pub fn scene_id(self) -> AppSceneId {
        match self {
            AppStateId::MainMenu => AppSceneId::Menu,
            AppStateId::Settings => AppSceneId::Settings,
            AppStateId::LoadingGame => AppSceneId::Loading,
            AppStateId::Game => AppSceneId::Game,
            AppStateId::PauseMenu => AppSceneId::Pause,
            AppStateId::LoseScreen => AppSceneId::Lose,
            AppStateId::WinScreen => AppSceneId::Win,
        }
    }
}

//=== Tests ===============================================================
