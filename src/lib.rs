//=========================================================================
// Brickfall — Library Root
//
// A brick-breaker game client built around an overlay-aware application
// flow state machine.
//
// Responsibilities:
// - Expose the flow core (state machine, strategies, lifecycle contract)
// - Expose the application flow assembled on top of it
// - Keep presentation, audio and persistence behind narrow contracts
//
// Typical usage:
// ```no_run
// use std::rc::Rc;
// use brickfall::app::{AppContext, AppFlow};
// use brickfall::core::pause::PauseScope;
// # use brickfall::app::{MusicDeck, MusicTrack, AppSceneId, AppLayerId};
// # use brickfall::app::services::{GameRestoreSource, GameSnapshot, UserProgress, UserProgressSource};
// # use brickfall::core::fsm::StateError;
// # use brickfall::core::scene::{SceneDirector, SceneError, SceneHost};
// # struct Music; impl MusicDeck for Music { fn start(&self, _: MusicTrack) {} fn stop(&self) {} fn pause(&self) {} }
// # struct Store;
// # #[async_trait::async_trait(?Send)]
// # impl UserProgressSource for Store { async fn load_user_progress(&self) -> Result<(UserProgress, Option<String>), StateError> { Ok((UserProgress::default(), None)) } }
// # #[async_trait::async_trait(?Send)]
// # impl GameRestoreSource for Store { async fn restore_game_process(&self, _: &str) -> Result<GameSnapshot, StateError> { unimplemented!() } }
// # struct Scenes;
// # #[async_trait::async_trait(?Send)]
// # impl SceneDirector<AppSceneId, AppLayerId> for Scenes {
// #     fn is_active(&self, _: AppSceneId) -> bool { false }
// #     async fn show(&self, id: AppSceneId) -> Result<Rc<dyn SceneHost<AppLayerId>>, SceneError<AppSceneId>> { Err(SceneError::UnknownScene { scene_id: id }) }
// #     fn hide(&self, _: Rc<dyn SceneHost<AppLayerId>>) -> bool { false }
// # }
//
// # async fn run() {
// let context = AppContext::new(
//     Rc::new(Music),
//     Rc::new(Store),
//     Rc::new(Store),
//     Rc::new(Scenes),
//     PauseScope::root("app"),
// );
//
// let flow = AppFlow::new(context);
// flow.start().await;
// // host loop: flow.events().emit(...); flow.pump().await each tick
// # }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the reusable flow machinery (fsm, pause, scene and
// module contracts). `app` is the game's concrete flow assembled on top
// of it.
//
pub mod app;
pub mod core;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the prelude for ergonomic imports. Application code mostly
// uses `brickfall::prelude::*` or the `AppFlow` facade directly.
//
pub mod prelude;
