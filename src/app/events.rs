//=========================================================================
// Application Events
//=========================================================================
//
// The event kinds wired into the flow machine and the payload union that
// travels with them. Kinds and payloads are separate: a transition is
// selected by kind alone, payload data is applied by the entered states.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::fsm::EventKey;

//=== Event Kinds =========================================================

/// Flow-relevant application events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEvent {
    /// Enter or return to the main menu.
    ReturnMainMenu,

    /// Settings popup.
    ShowSettings,
    HideSettings,

    /// Start loading a level.
    GotoGame,

    /// Loading finished, the level can start.
    GameLoaded,

    /// Round finished (lose/win popups).
    GameFail,
    GameSuccess,

    /// Pause popup over gameplay.
    GamePause,
    GameResume,
}

impl EventKey for AppEvent {}

//=== Event Payload =======================================================

/// Payload union for [`AppEvent`].
///
/// `None` is the unit case for data-less events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppPayload {
    #[default]
    None,

    /// A level to load or play.
    Level { level_id: String },
}

impl AppPayload {
    pub fn level(level_id: impl Into<String>) -> Self {
        Self::Level {
            level_id: level_id.into(),
        }
    }
}
