//=========================================================================
// Application Flow
//=========================================================================
//
// Assembles the flow machine for the game: state factories, the
// transition table, the event feed and the notification observer.
//
// Startup sequence:
//   1. load user progress (levels become available)
//   2. restore key present? → straight into LoadingGame with that level
//      otherwise              → MainMenu
//   3. controller takes over; the host pumps events each tick
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{error, warn};

//=== Internal Dependencies ===============================================

use crate::core::flow::{FlowController, FlowControllerBuilder, FlowHandle, FlowObserver};
use crate::core::fsm::{StateMachine, Transition};

use super::context::AppContext;
use super::events::{AppEvent, AppPayload};
use super::factory::AppStatesFactory;
use super::states::AppStateId;
use super::transitions::register_app_transitions;

//=== Aliases =============================================================

pub type AppMachine = StateMachine<AppStateId, AppEvent, AppPayload, AppContext>;
pub type AppTransition = Transition<AppStateId, AppEvent, AppPayload, AppContext>;

//=== Observer ============================================================

/// Routes flow outcomes into the log; a UI layer would hang its
/// notifications here.
struct AppFlowObserver;

impl FlowObserver<AppStateId, AppEvent> for AppFlowObserver {
    fn transition_blocked(
        &self,
        event: AppEvent,
        from_state: Option<AppStateId>,
        to_state: Option<AppStateId>,
        info: &str,
    ) {
        warn!(
            "Transition from {:?} to {:?} by event {:?} is blocked: {}",
            from_state, to_state, event, info
        );
    }

    fn fatal_error(&self, error: &(dyn std::error::Error + 'static)) {
        error!("Fatal flow error: {error}");
    }
}

//=== AppFlow =============================================================

/// The game's top-level flow: a fully wired controller plus the producer
/// handle collaborators emit events through.
pub struct AppFlow {
    controller: FlowController<AppStateId, AppEvent, AppPayload, AppContext>,
    events: FlowHandle<AppEvent, AppPayload>,
}

impl AppFlow {
    //--- Assembly ---------------------------------------------------------

    pub fn new(context: AppContext) -> Self {
        let scenes = context.scenes();
        let pause_root = context.pause_root();

        let mut machine = AppMachine::new(context);
        AppStatesFactory::new(scenes, pause_root).register_all(&mut machine);
        register_app_transitions(&mut machine);

        let (controller, events) = FlowControllerBuilder::new(machine)
            .with_observer(AppFlowObserver)
            .build();

        Self { controller, events }
    }

    //--- Accessors --------------------------------------------------------

    pub fn events(&self) -> FlowHandle<AppEvent, AppPayload> {
        self.events.clone()
    }

    pub fn machine(&self) -> &AppMachine {
        self.controller.machine()
    }

    //--- Lifecycle --------------------------------------------------------

    /// Loads user progress, decides the initial state and starts the
    /// controller.
    pub async fn start(&self) -> bool {
        let context = self.controller.machine().context();

        let (initial_state, payload) = match context.user_progress().load_user_progress().await {
            Ok((_progress, restore_key)) => {
                context.set_levels_ready(true);

                match restore_key {
                    Some(key) => match context.game_restore().restore_game_process(&key).await {
                        Ok(snapshot) => (
                            AppStateId::LoadingGame,
                            AppPayload::level(snapshot.level_id),
                        ),
                        Err(e) => {
                            warn!("Cannot restore the interrupted game: {e}");
                            (AppStateId::MainMenu, AppPayload::None)
                        }
                    },
                    None => (AppStateId::MainMenu, AppPayload::None),
                }
            }
            Err(e) => {
                warn!("Cannot load user progress: {e}");
                (AppStateId::MainMenu, AppPayload::None)
            }
        };

        self.controller.start(initial_state, &payload).await
    }

    /// Drains queued events; called by the host at tick boundaries.
    pub async fn pump(&self) {
        self.controller.pump().await;
    }

    pub async fn stop(&self) {
        self.controller.stop().await;
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::context::{MusicDeck, MusicTrack};
    use crate::app::scenes::{AppLayerId, AppSceneId};
    use crate::app::services::{GameRestoreSource, GameSnapshot, UserProgress, UserProgressSource};
    use crate::core::fsm::StateError;
    use crate::core::gameloop::Updatable;
    use crate::core::pause::PauseScope;
    use crate::core::scene::{SceneDirector, SceneError, SceneHost, SceneView};
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::rc::Rc;

    //--- Stub collaborators -----------------------------------------------

    #[derive(Default)]
    struct StubMusic {
        calls: RefCell<Vec<String>>,
    }

    impl MusicDeck for StubMusic {
        fn start(&self, track: MusicTrack) {
            self.calls.borrow_mut().push(format!("start:{track:?}"));
        }

        fn stop(&self) {
            self.calls.borrow_mut().push("stop".into());
        }

        fn pause(&self) {
            self.calls.borrow_mut().push("pause".into());
        }
    }

    struct StubProgress {
        restore_key: Option<String>,
    }

    #[async_trait(?Send)]
    impl UserProgressSource for StubProgress {
        async fn load_user_progress(
            &self,
        ) -> Result<(UserProgress, Option<String>), StateError> {
            Ok((UserProgress::default(), self.restore_key.clone()))
        }
    }

    struct StubRestore;

    #[async_trait(?Send)]
    impl GameRestoreSource for StubRestore {
        async fn restore_game_process(&self, restore_key: &str) -> Result<GameSnapshot, StateError> {
            Ok(GameSnapshot {
                level_id: format!("level-from-{restore_key}"),
            })
        }
    }

    struct StubHost;

    impl SceneHost<AppLayerId> for StubHost {
        fn add_view(&self, _view: Rc<dyn SceneView<AppLayerId>>) {}
        fn remove_view(&self, _view: &Rc<dyn SceneView<AppLayerId>>) {}
        fn add_updatable(&self, _updatable: Rc<dyn Updatable>) {}
        fn remove_updatable(&self, _updatable: &Rc<dyn Updatable>) {}
    }

    #[derive(Default)]
    struct StubDirector {
        shown: RefCell<Vec<AppSceneId>>,
        hidden: RefCell<u32>,
    }

    #[async_trait(?Send)]
    impl SceneDirector<AppSceneId, AppLayerId> for StubDirector {
        fn is_active(&self, _scene_id: AppSceneId) -> bool {
            false
        }

        async fn show(
            &self,
            scene_id: AppSceneId,
        ) -> Result<Rc<dyn SceneHost<AppLayerId>>, SceneError<AppSceneId>> {
            self.shown.borrow_mut().push(scene_id);
            Ok(Rc::new(StubHost))
        }

        fn hide(&self, _scene: Rc<dyn SceneHost<AppLayerId>>) -> bool {
            *self.hidden.borrow_mut() += 1;
            true
        }
    }

    fn app_flow(restore_key: Option<String>) -> (AppFlow, Rc<StubMusic>, Rc<StubDirector>) {
        let music = Rc::new(StubMusic::default());
        let director = Rc::new(StubDirector::default());

        let context = AppContext::new(
            music.clone(),
            Rc::new(StubProgress { restore_key }),
            Rc::new(StubRestore),
            director.clone(),
            PauseScope::root("app"),
        );

        (AppFlow::new(context), music, director)
    }

    #[tokio::test]
    async fn starts_in_the_main_menu_without_a_restore_key() {
        let (flow, _music, director) = app_flow(None);

        assert!(flow.start().await);
        assert_eq!(flow.machine().base_state(), Some(AppStateId::MainMenu));
        assert_eq!(*director.shown.borrow(), vec![AppSceneId::Menu]);
    }

    #[tokio::test]
    async fn resumes_an_interrupted_game_through_loading() {
        let (flow, music, director) = app_flow(Some("save-1".into()));

        assert!(flow.start().await);
        assert_eq!(flow.machine().base_state(), Some(AppStateId::LoadingGame));
        assert_eq!(*director.shown.borrow(), vec![AppSceneId::Loading]);
        // restoring goes straight to loading; no music action fires
        // because init bypasses the transition table
        assert!(music.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn full_round_from_menu_to_game_and_back() {
        let (flow, music, _director) = app_flow(None);
        flow.start().await;

        let events = flow.events();
        events.emit(AppEvent::GotoGame, AppPayload::level("level-1"));
        events.emit(AppEvent::GameLoaded, AppPayload::level("level-1"));
        flow.pump().await;

        assert_eq!(flow.machine().base_state(), Some(AppStateId::Game));
        assert_eq!(
            *music.calls.borrow(),
            vec!["start:Loading", "start:Gameplay"]
        );

        events.emit(AppEvent::GamePause, AppPayload::None);
        flow.pump().await;
        assert_eq!(
            flow.machine().overlay_states(),
            vec![AppStateId::PauseMenu]
        );
        assert_eq!(music.calls.borrow().last().unwrap(), "pause");

        events.emit(AppEvent::GameResume, AppPayload::None);
        flow.pump().await;
        assert!(flow.machine().overlay_states().is_empty());
        assert_eq!(flow.machine().dominant_state(), Some(AppStateId::Game));
    }

    #[tokio::test]
    async fn goto_game_is_guarded_by_level_availability() {
        let (flow, _music, _director) = app_flow(None);
        flow.start().await;
        flow.machine().context().set_levels_ready(false);

        let events = flow.events();
        events.emit(AppEvent::GotoGame, AppPayload::level("level-1"));
        flow.pump().await;

        // guard refused: still in the menu
        assert_eq!(flow.machine().base_state(), Some(AppStateId::MainMenu));
    }

    #[tokio::test]
    async fn stop_tears_the_whole_flow_down() {
        let (flow, _music, director) = app_flow(None);
        flow.start().await;

        flow.events().emit(AppEvent::ShowSettings, AppPayload::None);
        flow.pump().await;
        assert_eq!(
            flow.machine().overlay_states(),
            vec![AppStateId::Settings]
        );

        flow.stop().await;
        assert_eq!(flow.machine().base_state(), None);
        assert_eq!(*director.hidden.borrow(), 2);
    }
}
