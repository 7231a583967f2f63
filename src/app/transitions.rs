//=========================================================================
// Application Transition Table
//=========================================================================
//
// The declarative flow of the game:
//
//   MainMenu ──GotoGame──► LoadingGame ──GameLoaded──► Game
//      │  ▲                                             │
//      │  └──────────ReturnMainMenu──────────┐          │
//   ShowSettings                             │     GamePause / GameFail /
//      ▼                                     │     GameSuccess
//   Settings (overlay, closes on HideSettings)      ▼
//                                      PauseMenu / LoseScreen / WinScreen
//
// Music control rides on the transitions as actions, keyed by the
// target state, the way the rest of the flow is declared.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::context::{AppContext, MusicTrack};
use super::events::AppEvent;
use super::flow::{AppMachine, AppTransition};
use super::states::AppStateId;

//=== Registration ========================================================

/// Registers the full transition table on the machine.
pub fn register_app_transitions(machine: &mut AppMachine) {
    machine.register_transitions(
        AppStateId::MainMenu,
        vec![
            decorate(
                AppTransition::new(
                    AppStateId::MainMenu,
                    AppEvent::GotoGame,
                    AppStateId::LoadingGame,
                )
                .with_guard(|context: &AppContext| context.levels_ready()),
            ),
            decorate(AppTransition::new(
                AppStateId::MainMenu,
                AppEvent::ShowSettings,
                AppStateId::Settings,
            )),
        ],
    );

    machine.register_transitions(
        AppStateId::Settings,
        vec![AppTransition::close(
            AppStateId::Settings,
            AppEvent::HideSettings,
        )],
    );

    machine.register_transitions(
        AppStateId::LoadingGame,
        vec![decorate(AppTransition::new(
            AppStateId::LoadingGame,
            AppEvent::GameLoaded,
            AppStateId::Game,
        ))],
    );

    machine.register_transitions(
        AppStateId::Game,
        vec![
            decorate(AppTransition::new(
                AppStateId::Game,
                AppEvent::GamePause,
                AppStateId::PauseMenu,
            )),
            decorate(AppTransition::new(
                AppStateId::Game,
                AppEvent::GameFail,
                AppStateId::LoseScreen,
            )),
            decorate(AppTransition::new(
                AppStateId::Game,
                AppEvent::GameSuccess,
                AppStateId::WinScreen,
            )),
        ],
    );

    machine.register_transitions(
        AppStateId::PauseMenu,
        vec![
            AppTransition::close(AppStateId::PauseMenu, AppEvent::GameResume),
            decorate(AppTransition::new(
                AppStateId::PauseMenu,
                AppEvent::ShowSettings,
                AppStateId::Settings,
            )),
            decorate(AppTransition::new(
                AppStateId::PauseMenu,
                AppEvent::ReturnMainMenu,
                AppStateId::MainMenu,
            )),
        ],
    );

    machine.register_transitions(
        AppStateId::LoseScreen,
        vec![
            decorate(AppTransition::new(
                AppStateId::LoseScreen,
                AppEvent::ReturnMainMenu,
                AppStateId::MainMenu,
            )),
            decorate(AppTransition::new(
                AppStateId::LoseScreen,
                AppEvent::GotoGame,
                AppStateId::LoadingGame,
            )),
        ],
    );

    machine.register_transitions(
        AppStateId::WinScreen,
        vec![
            decorate(AppTransition::new(
                AppStateId::WinScreen,
                AppEvent::ReturnMainMenu,
                AppStateId::MainMenu,
            )),
            decorate(AppTransition::new(
                AppStateId::WinScreen,
                AppEvent::GotoGame,
                AppStateId::LoadingGame,
            )),
        ],
    );
}

//=== Decoration ==========================================================

/// Attaches music actions and interruptibility by target state.
fn decorate(transition: AppTransition) -> AppTransition {
    match transition.to_state {
        Some(AppStateId::MainMenu) => {
            transition.with_action(|context: &AppContext, _| context.music().stop())
        }

        Some(AppStateId::LoadingGame) => transition
            .interruptible()
            .with_action(|context: &AppContext, _| context.music().start(MusicTrack::Loading)),

        Some(AppStateId::Game) => {
            transition.with_action(|context: &AppContext, _| context.music().start(MusicTrack::Gameplay))
        }

        Some(AppStateId::WinScreen) => {
            transition.with_action(|context: &AppContext, _| context.music().start(MusicTrack::Victory))
        }

        Some(AppStateId::LoseScreen) => transition
            .interruptible()
            .with_action(|context: &AppContext, _| context.music().stop()),

        Some(AppStateId::PauseMenu) => {
            transition.with_action(|context: &AppContext, _| context.music().pause())
        }

        Some(AppStateId::Settings) | None => transition,
    }
}

//=== Tests ===============================================================
