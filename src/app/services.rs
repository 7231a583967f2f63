//=========================================================================
// Startup Services
//=========================================================================
//
// Persistence collaborators consumed once during flow start: load the
// player's progress and, when a restore key is present, the interrupted
// game to continue. Storage itself lives outside this crate.
//
//=========================================================================

//=== External Dependencies ===============================================

use async_trait::async_trait;

//=== Internal Dependencies ===============================================

use crate::core::fsm::StateError;

//=== Data ================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserProgress {
    pub completed_levels: u32,
    pub last_level_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub level_id: String,
}

//=== Contracts ===========================================================

#[async_trait(?Send)]
pub trait UserProgressSource {
    /// Loads the player's progress plus an optional key of a game to
    /// restore.
    async fn load_user_progress(&self) -> Result<(UserProgress, Option<String>), StateError>;
}

#[async_trait(?Send)]
pub trait GameRestoreSource {
    /// Restores the interrupted game stored under `restore_key`.
    async fn restore_game_process(&self, restore_key: &str) -> Result<GameSnapshot, StateError>;
}
