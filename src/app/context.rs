//=========================================================================
// Application Context
//=========================================================================
//
// The flow context handed to transition guards and actions, bundling the
// narrow collaborator handles the flow needs: music control, startup
// persistence, the scene director and the pause root.
//
// The context is owned by the state machine and only ever borrowed out;
// anything mutable inside uses cells.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::pause::PauseScope;
use crate::core::scene::SceneDirector;

use super::scenes::{AppLayerId, AppSceneId};
use super::services::{GameRestoreSource, UserProgressSource};

//=== Music Contract ======================================================

/// One track per flow destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Loading,
    Gameplay,
    Victory,
}

/// Narrow handle to the music player. Playback is fire-and-forget from
/// the flow's point of view.
pub trait MusicDeck {
    fn start(&self, track: MusicTrack);

    fn stop(&self);

    fn pause(&self);
}

//=== AppContext ==========================================================

pub struct AppContext {
    music: Rc<dyn MusicDeck>,
    user_progress: Rc<dyn UserProgressSource>,
    game_restore: Rc<dyn GameRestoreSource>,
    scenes: Rc<dyn SceneDirector<AppSceneId, AppLayerId>>,
    pause_root: Rc<PauseScope>,
    levels_ready: Cell<bool>,
}

impl AppContext {
    pub fn new(
        music: Rc<dyn MusicDeck>,
        user_progress: Rc<dyn UserProgressSource>,
        game_restore: Rc<dyn GameRestoreSource>,
        scenes: Rc<dyn SceneDirector<AppSceneId, AppLayerId>>,
        pause_root: Rc<PauseScope>,
    ) -> Self {
        Self {
            music,
            user_progress,
            game_restore,
            scenes,
            pause_root,
            levels_ready: Cell::new(false),
        }
    }

    pub fn music(&self) -> &dyn MusicDeck {
        self.music.as_ref()
    }

    pub fn user_progress(&self) -> &dyn UserProgressSource {
        self.user_progress.as_ref()
    }

    pub fn game_restore(&self) -> &dyn GameRestoreSource {
        self.game_restore.as_ref()
    }

    pub fn scenes(&self) -> Rc<dyn SceneDirector<AppSceneId, AppLayerId>> {
        Rc::clone(&self.scenes)
    }

    pub fn pause_root(&self) -> Rc<PauseScope> {
        Rc::clone(&self.pause_root)
    }

    /// Whether the level catalog is loaded and a game can be started.
    /// Set by the flow controller once user progress arrives.
    pub fn levels_ready(&self) -> bool {
        self.levels_ready.get()
    }

    pub fn set_levels_ready(&self, ready: bool) {
        self.levels_ready.set(ready);
    }
}
