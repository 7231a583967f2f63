//=========================================================================
// Transition Strategies
//=========================================================================
//
// The closed family of transition-execution strategies. A strategy is
// pure sequencing: it receives the states to close and the state to open
// and drives their lifecycles; membership bookkeeping stays in the
// machine.
//
// Selection:
//   no target state          → OverlayClose
//   target is an overlay     → by the overlaid state's OverlayMode
//   otherwise                → ReplaceTransition
//
// The selector is a sum type dispatched through one exhaustive match, so
// adding an overlay mode without a strategy fails to compile.
//
//=========================================================================

//=== External Dependencies ===============================================

use async_trait::async_trait;
use futures::future::try_join_all;

//=== Internal Dependencies ===============================================

use super::errors::StateError;
use super::state::{FlowState, OverlayMode};
use super::types::{StateKey, StateRef};

//=== Module Declarations =================================================

mod overlay_close;
mod overlay_exit;
mod overlay_forbidden;
mod overlay_inactivate;
mod overlay_pause;
mod replace;

//=== Public API ==========================================================

pub use overlay_close::OverlayClose;
pub use overlay_exit::OverlayThroughExit;
pub use overlay_forbidden::OverlayForbidden;
pub use overlay_inactivate::OverlayThroughInactivate;
pub use overlay_pause::OverlayThroughPause;
pub use replace::ReplaceTransition;

//=== Strategy Trait ======================================================

/// Executes the lifecycle sequencing of one transition.
///
/// `closing` holds the states being left (meaning depends on the
/// strategy: fully closed, paused, stopped or exited); `opening` is the
/// state being entered or restored. Strategies receive the states as
/// parameters and must not retain them across calls.
#[async_trait(?Send)]
pub trait TransitionStrategy<S: StateKey, P> {
    async fn run(
        &self,
        closing: &[StateRef<S, P>],
        opening: &StateRef<S, P>,
        payload: &P,
    ) -> Result<(), StateError>;
}

//=== Strategy Selection ==================================================

/// Which execution strategy a transition resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Close the whole active set and enter a new base state.
    Replace,

    /// Put an overlay above the dominant state; the mode is the
    /// *overlaid* state's.
    Overlay(OverlayMode),

    /// Close the dominant overlay and restore what it covered.
    CloseOverlay,
}

/// Resolves the strategy for a transition from its target and the state
/// being left.
pub fn resolve_strategy_kind<S: StateKey, P>(
    target: Option<&StateRef<S, P>>,
    from_state: &StateRef<S, P>,
) -> StrategyKind {
    match target {
        None => StrategyKind::CloseOverlay,
        Some(target) if target.is_overlay() => StrategyKind::Overlay(from_state.overlay_mode()),
        Some(_) => StrategyKind::Replace,
    }
}

/// The lookup table from kind to strategy instance.
pub fn strategy_for<S: StateKey, P>(kind: StrategyKind) -> Box<dyn TransitionStrategy<S, P>> {
    match kind {
        StrategyKind::Replace => Box::new(ReplaceTransition),
        StrategyKind::Overlay(OverlayMode::Forbidden) => Box::new(OverlayForbidden),
        StrategyKind::Overlay(OverlayMode::Pause) => Box::new(OverlayThroughPause),
        StrategyKind::Overlay(OverlayMode::Inactive) => Box::new(OverlayThroughInactivate),
        StrategyKind::Overlay(OverlayMode::Exit) => Box::new(OverlayThroughExit),
        StrategyKind::CloseOverlay => Box::new(OverlayClose),
    }
}

//=== Shared Sequencing ===================================================

/// Fully closes a set of states, in list order.
///
/// Overlays are exited and detached before non-overlays, so overlays
/// always unwind before their host. Overlay exits run one at a time;
/// non-overlay exits run concurrently.
pub(crate) async fn close_states<S: StateKey, P>(
    states: &[StateRef<S, P>],
) -> Result<(), StateError> {
    for state in states {
        state.stop();
    }

    for state in states {
        if state.is_overlay() {
            state.exit().await?;
        }
    }
    for state in states {
        if state.is_overlay() {
            state.detach();
        }
    }

    try_join_all(states.iter().filter(|s| !s.is_overlay()).map(|s| s.exit())).await?;
    for state in states {
        if !state.is_overlay() {
            state.detach();
        }
    }

    Ok(())
}

/// Brings a freshly created state all the way up.
pub(crate) async fn open_state<S: StateKey, P>(
    state: &StateRef<S, P>,
    payload: &P,
) -> Result<(), StateError> {
    state.attach().await?;
    state.enter(payload).await?;
    state.start();
    Ok(())
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fsm::probe::{new_log, ProbeState};
    use crate::core::fsm::state::StatePhase;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestState {
        Menu,
        Game,
        Settings,
    }

    impl StateKey for TestState {}

    type Probe = ProbeState<TestState, u32>;

    #[test]
    fn kind_resolution_is_driven_by_target_and_overlaid_mode() {
        let log = new_log();
        let menu = Probe::base(TestState::Menu, log.clone()).as_state();
        let game = Probe::base(TestState::Game, log.clone()).as_state();
        let settings = Probe::overlay(TestState::Settings, OverlayMode::Pause, log).as_state();

        assert_eq!(
            resolve_strategy_kind(None, &settings),
            StrategyKind::CloseOverlay
        );
        assert_eq!(
            resolve_strategy_kind(Some(&game), &menu),
            StrategyKind::Replace
        );
        assert_eq!(
            resolve_strategy_kind(Some(&settings), &menu),
            StrategyKind::Overlay(OverlayMode::Pause)
        );
    }

    #[tokio::test]
    async fn replace_closes_everything_then_opens() {
        let log = new_log();
        let settings =
            Probe::overlay(TestState::Settings, OverlayMode::Pause, log.clone()).as_state();
        let menu = Probe::base(TestState::Menu, log.clone()).as_state();
        let game = Probe::base(TestState::Game, log.clone()).as_state();

        ReplaceTransition
            .run(&[settings, menu], &game, &0)
            .await
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "Settings.stop",
                "Menu.stop",
                "Settings.exit",
                "Settings.detach",
                "Menu.exit",
                "Menu.detach",
                "Game.attach",
                "Game.enter",
                "Game.start",
            ]
        );
    }

    #[tokio::test]
    async fn overlay_through_pause_only_pauses_the_covered_state() {
        let log = new_log();
        let game = Probe::base(TestState::Game, log.clone()).as_state();
        let settings =
            Probe::overlay(TestState::Settings, OverlayMode::Pause, log.clone()).as_state();

        OverlayThroughPause
            .run(&[game.clone()], &settings, &0)
            .await
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "Game.pause",
                "Settings.attach",
                "Settings.enter",
                "Settings.start",
            ]
        );
        assert!(game.paused());
    }

    #[tokio::test]
    async fn overlay_through_inactivate_stops_without_exiting() {
        let log = new_log();
        let menu = Probe::base(TestState::Menu, log.clone()).as_state();
        let settings =
            Probe::overlay(TestState::Settings, OverlayMode::Pause, log.clone()).as_state();

        OverlayThroughInactivate
            .run(&[menu.clone()], &settings, &0)
            .await
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "Menu.stop",
                "Settings.attach",
                "Settings.enter",
                "Settings.start",
            ]
        );
    }

    #[tokio::test]
    async fn overlay_through_exit_stops_and_exits_but_keeps_attached() {
        let log = new_log();
        let menu = Probe::base(TestState::Menu, log.clone()).as_state();
        let settings =
            Probe::overlay(TestState::Settings, OverlayMode::Pause, log.clone()).as_state();

        OverlayThroughExit
            .run(&[menu.clone()], &settings, &0)
            .await
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "Menu.stop",
                "Menu.exit",
                "Settings.attach",
                "Settings.enter",
                "Settings.start",
            ]
        );
        assert_eq!(menu.phase(), StatePhase::Attached);
    }

    #[tokio::test]
    async fn overlay_forbidden_does_nothing() {
        let log = new_log();
        let menu = Probe::base(TestState::Menu, log.clone()).as_state();
        let settings =
            Probe::overlay(TestState::Settings, OverlayMode::Pause, log.clone()).as_state();

        OverlayForbidden.run(&[menu], &settings, &0).await.unwrap();

        assert!(log.borrow().is_empty());
    }

    #[tokio::test]
    async fn close_restores_by_the_covered_states_own_mode() {
        for (mode, expected_restore) in [
            (OverlayMode::Pause, vec!["Menu.resume"]),
            (OverlayMode::Inactive, vec!["Menu.start"]),
            (OverlayMode::Exit, vec!["Menu.enter", "Menu.start"]),
            (OverlayMode::Forbidden, vec![]),
        ] {
            let log = new_log();
            let menu = Probe::new(
                TestState::Menu,
                crate::core::fsm::state::StateMeta {
                    critical: false,
                    is_overlay: false,
                    overlay_mode: mode,
                },
                log.clone(),
            )
            .as_state();
            let settings =
                Probe::overlay(TestState::Settings, OverlayMode::Pause, log.clone()).as_state();

            OverlayClose
                .run(&[settings.clone()], &menu, &0)
                .await
                .unwrap();

            let mut expected = vec!["Settings.stop", "Settings.exit", "Settings.detach"];
            expected.extend(expected_restore);
            assert_eq!(*log.borrow(), expected, "mode {mode:?}");
        }
    }
}
