//=========================================================================
// State Machine
//=========================================================================
//
// The application flow orchestrator. Owns the base state, the overlay
// stack and the in-flight transition marker; everything else is
// delegated to the pure tools and the strategy family.
//
// Flow per handled event:
//   priority sort → locate transition → permit check → action →
//   create target → pick strategy → update stack membership →
//   run strategy → clear in-flight marker → report
//
// Runtime state lives behind RefCells: `handle` takes `&self` so a
// second call issued while a transition is pending can still observe the
// in-flight marker and resolve to a blocked report. The machine is a
// single-thread type; callers serialize events (FIFO) and no borrow is
// held across an await point, so the cells are only locked between
// awaits.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::errors::{FlowError, StateError};
use super::state::FlowState;
use super::strategy::{resolve_strategy_kind, strategy_for, StrategyKind};
use super::tools::{check_transition_permit, find_transition, priority_sorted_states};
use super::types::{
    ActiveTransition, EventKey, HandleReport, StateFactory, StateKey, StateRef, Transition,
};

//=== StateMachine ========================================================

/// Hierarchical, overlay-aware flow machine.
///
/// Generic over the state key `S`, the event kind `E`, the event payload
/// `P` and the flow context `C` handed to guards and actions.
pub struct StateMachine<S: StateKey, E: EventKey, P, C> {
    factories: HashMap<S, StateFactory<S, P>>,
    transitions: HashMap<S, Vec<Transition<S, E, P, C>>>,
    context: C,
    base_state: RefCell<Option<StateRef<S, P>>>,
    overlay_states: RefCell<Vec<StateRef<S, P>>>,
    active_transition: RefCell<Option<ActiveTransition<S, E>>>,
}

impl<S: StateKey, E: EventKey, P, C> StateMachine<S, E, P, C> {
    //--- Construction -----------------------------------------------------

    pub fn new(context: C) -> Self {
        Self {
            factories: HashMap::new(),
            transitions: HashMap::new(),
            context,
            base_state: RefCell::new(None),
            overlay_states: RefCell::new(Vec::new()),
            active_transition: RefCell::new(None),
        }
    }

    /// The flow context guards and actions receive.
    pub fn context(&self) -> &C {
        &self.context
    }

    //--- Registration -----------------------------------------------------

    /// Registers a state factory. A duplicate id is ignored with a
    /// warning; the first registration wins.
    pub fn register_state(&mut self, state_id: S, factory: impl Fn() -> StateRef<S, P> + 'static) {
        if self.factories.contains_key(&state_id) {
            warn!("State {:?} is already registered, ignoring", state_id);
            return;
        }
        self.factories.insert(state_id, Box::new(factory));
    }

    /// Appends transitions for a source state. A record whose event is
    /// already covered for that source, or whose `from_state` does not
    /// match, is skipped with a warning. Order is preserved: the locator
    /// takes the first match.
    pub fn register_transitions(&mut self, from_state: S, transitions: Vec<Transition<S, E, P, C>>) {
        let list = self.transitions.entry(from_state).or_default();

        for transition in transitions {
            if transition.from_state != from_state {
                warn!(
                    "Transition {:?} registered under state {:?} names a different source, skipping",
                    transition, from_state
                );
                continue;
            }
            if list.iter().any(|t| t.on_event == transition.on_event) {
                warn!(
                    "Transition for event {:?} from state {:?} is already registered, skipping",
                    transition.on_event, from_state
                );
                continue;
            }
            list.push(transition);
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn base_state(&self) -> Option<S> {
        self.base_state.borrow().as_ref().map(|s| s.state_id())
    }

    /// Overlay state ids, bottom to top.
    pub fn overlay_states(&self) -> Vec<S> {
        self.overlay_states
            .borrow()
            .iter()
            .map(|s| s.state_id())
            .collect()
    }

    pub fn dominant_state(&self) -> Option<S> {
        let base = self.base_state.borrow().clone()?;
        let overlays = self.overlay_states.borrow().clone();
        Some(
            super::tools::resolve_dominant_state(&base, &overlays).state_id(),
        )
    }

    pub fn is_transitioning(&self) -> bool {
        self.active_transition.borrow().is_some()
    }

    //--- Lifecycle --------------------------------------------------------

    /// Activates the initial base state. Only the first call has an
    /// effect; later calls report whether the requested id matches the
    /// current base state.
    pub async fn init(&self, state_id: S, payload: &P) -> Result<bool, FlowError<S, E>> {
        if let Some(base) = self.base_state.borrow().clone() {
            return Ok(base.state_id() == state_id);
        }

        debug!("Initializing flow machine with state {:?}", state_id);

        let initial = self.create_state(state_id)?;

        strategy_for::<S, P>(StrategyKind::Replace)
            .run(&[], &initial, payload)
            .await
            .map_err(|source| FlowError::TransitionFailed {
                state_id,
                message: format!("cannot activate the initial state {:?}", state_id),
                source,
            })?;

        *self.base_state.borrow_mut() = Some(initial);
        Ok(true)
    }

    /// Closes every active state (overlays top-down, then the base) and
    /// clears all runtime bookkeeping. Idempotent.
    pub async fn destroy(&self) -> Result<(), StateError> {
        let Some(base) = self.base_state.borrow().clone() else {
            return Ok(());
        };

        debug!("Destroying flow machine");

        let mut closing: Vec<StateRef<S, P>> =
            self.overlay_states.borrow().iter().rev().cloned().collect();
        closing.push(base);

        super::strategy::close_states(&closing).await?;

        self.overlay_states.borrow_mut().clear();
        self.base_state.borrow_mut().take();
        self.active_transition.borrow_mut().take();
        Ok(())
    }

    //--- Event Handling ---------------------------------------------------

    /// Runs one event through locate → permit → strategy and reports the
    /// outcome.
    ///
    /// Blocked transitions are a normal result; errors are reserved for
    /// an uninitialized machine, events with no reachable transition, and
    /// failed strategy executions (after which no rollback is attempted).
    pub async fn handle(&self, event: E, payload: &P) -> Result<HandleReport<S, E>, FlowError<S, E>> {
        let base = self
            .base_state
            .borrow()
            .clone()
            .ok_or(FlowError::NotInitialized)?;
        let overlays = self.overlay_states.borrow().clone();

        let states_by_priority = priority_sorted_states(&base, &overlays);

        let Some((transition, from_state)) =
            find_transition(event, &states_by_priority, &self.transitions)
        else {
            return Err(FlowError::UnhandledEvent { event });
        };

        let dominant = Rc::clone(&states_by_priority[0]);
        let active = *self.active_transition.borrow();
        if let Some(blocked) = check_transition_permit(
            &dominant,
            event,
            transition,
            |id| self.factories.contains_key(&id),
            &self.context,
            active.as_ref(),
        ) {
            debug!("Event {:?} blocked: {:?}", event, blocked);
            return Ok(HandleReport {
                trigger_event: event,
                outcome: blocked,
            });
        }

        // The transition is on its way: mark it before the first await so
        // a second event observes it.
        *self.active_transition.borrow_mut() = Some(ActiveTransition::snapshot(transition));

        if let Some(action) = &transition.action {
            action(&self.context, payload);
        }

        let target = match transition.to_state {
            Some(to_state) => Some(self.create_state(to_state)?),
            None => None,
        };

        let kind = resolve_strategy_kind(target.as_ref(), &from_state);
        let (closing, opening) = self.stage_transition(kind, &base, &from_state, target);

        debug!(
            "Transition {:?} -> {:?} via {:?}",
            from_state.state_id(),
            opening.state_id(),
            kind
        );

        if let Err(source) = strategy_for::<S, P>(kind).run(&closing, &opening, payload).await {
            return Err(FlowError::TransitionFailed {
                state_id: opening.state_id(),
                message: format!(
                    "the transition from {:?} to {:?} was permitted, but its execution failed",
                    from_state.state_id(),
                    opening.state_id()
                ),
                source,
            });
        }

        self.active_transition.borrow_mut().take();

        Ok(HandleReport::success(event))
    }

    //--- Internal Helpers -------------------------------------------------

    fn create_state(&self, state_id: S) -> Result<StateRef<S, P>, FlowError<S, E>> {
        let factory = self
            .factories
            .get(&state_id)
            .ok_or(FlowError::MissingStateFactory { state_id })?;
        Ok(factory())
    }

    /// Updates stack membership for the staged transition and returns the
    /// closing set plus the state to open or restore.
    ///
    /// Membership is updated before the strategy runs; on a strategy
    /// failure the machine keeps whatever was reached.
    fn stage_transition(
        &self,
        kind: StrategyKind,
        base: &StateRef<S, P>,
        from_state: &StateRef<S, P>,
        target: Option<StateRef<S, P>>,
    ) -> (Vec<StateRef<S, P>>, StateRef<S, P>) {
        match kind {
            // The whole active set closes; the target becomes the base.
            StrategyKind::Replace => {
                let mut closing: Vec<StateRef<S, P>> =
                    self.overlay_states.borrow_mut().drain(..).collect();
                closing.push(Rc::clone(base));

                let opening = target.expect("a replace transition always has a target");
                *self.base_state.borrow_mut() = Some(Rc::clone(&opening));
                (closing, opening)
            }

            // Overlays above the source are closed with it; the target
            // goes on top of the stack.
            StrategyKind::Overlay(_) => {
                let opening = target.expect("an overlay transition always has a target");

                let mut closing = Vec::new();
                {
                    let mut overlays = self.overlay_states.borrow_mut();
                    while let Some(top) = overlays.last() {
                        if Rc::ptr_eq(top, from_state) {
                            break;
                        }
                        closing.insert(0, overlays.pop().expect("last() was Some"));
                    }
                    overlays.push(Rc::clone(&opening));
                }
                closing.push(Rc::clone(from_state));
                (closing, opening)
            }

            // The dominant overlay (and anything stacked above it) pops;
            // what it covered is restored.
            StrategyKind::CloseOverlay => {
                let mut closing = Vec::new();
                {
                    let mut overlays = self.overlay_states.borrow_mut();
                    while let Some(popped) = overlays.pop() {
                        let found = Rc::ptr_eq(&popped, from_state);
                        closing.push(popped);
                        if found {
                            break;
                        }
                    }
                }

                let opening = self
                    .overlay_states
                    .borrow()
                    .last()
                    .cloned()
                    .unwrap_or_else(|| Rc::clone(base));
                (closing, opening)
            }
        }
    }
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fsm::probe::{new_log, ProbeState, SharedLog};
    use crate::core::fsm::state::OverlayMode;
    use crate::core::fsm::types::TransitionOutcome;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestState {
        Menu,
        Settings,
        Loading,
        Game,
        Pause,
    }

    impl StateKey for TestState {}

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestEvent {
        ShowSettings,
        HideSettings,
        GotoGame,
        Loaded,
        PauseGame,
    }

    impl EventKey for TestEvent {}

    struct TestContext {
        allow_game: bool,
    }

    type Machine = StateMachine<TestState, TestEvent, u32, TestContext>;
    type Probe = ProbeState<TestState, u32>;

    fn machine_with(log: &SharedLog, allow_game: bool) -> Machine {
        let mut machine = Machine::new(TestContext { allow_game });

        let menu_log = log.clone();
        machine.register_state(TestState::Menu, move || {
            Probe::base(TestState::Menu, menu_log.clone()).as_state()
        });

        let settings_log = log.clone();
        machine.register_state(TestState::Settings, move || {
            Probe::overlay(TestState::Settings, OverlayMode::Pause, settings_log.clone()).as_state()
        });

        let loading_log = log.clone();
        machine.register_state(TestState::Loading, move || {
            Probe::critical(TestState::Loading, false, loading_log.clone()).as_state()
        });

        let game_log = log.clone();
        machine.register_state(TestState::Game, move || {
            Probe::base(TestState::Game, game_log.clone()).as_state()
        });

        machine.register_transitions(
            TestState::Menu,
            vec![
                Transition::new(TestState::Menu, TestEvent::ShowSettings, TestState::Settings),
                Transition::new(TestState::Menu, TestEvent::GotoGame, TestState::Loading)
                    .with_guard(|ctx: &TestContext| ctx.allow_game),
            ],
        );
        machine.register_transitions(
            TestState::Settings,
            vec![Transition::close(TestState::Settings, TestEvent::HideSettings)],
        );
        machine.register_transitions(
            TestState::Loading,
            vec![Transition::new(
                TestState::Loading,
                TestEvent::Loaded,
                TestState::Game,
            )],
        );

        machine
    }

    #[tokio::test]
    async fn init_activates_the_initial_state_once() {
        let log = new_log();
        let machine = machine_with(&log, true);

        assert!(machine.init(TestState::Menu, &0).await.unwrap());
        assert_eq!(machine.base_state(), Some(TestState::Menu));
        assert_eq!(
            *log.borrow(),
            vec!["Menu.attach", "Menu.enter", "Menu.start"]
        );

        // Second init is a no-op that reports whether the id matches.
        assert!(machine.init(TestState::Menu, &0).await.unwrap());
        assert!(!machine.init(TestState::Game, &0).await.unwrap());
        assert_eq!(log.borrow().len(), 3);
    }

    #[tokio::test]
    async fn handle_before_init_is_an_error() {
        let log = new_log();
        let machine = machine_with(&log, true);

        let error = machine.handle(TestEvent::ShowSettings, &0).await.unwrap_err();
        assert!(matches!(error, FlowError::NotInitialized));
    }

    #[tokio::test]
    async fn overlay_opens_and_closes_around_the_base() {
        let log = new_log();
        let machine = machine_with(&log, true);
        machine.init(TestState::Menu, &0).await.unwrap();

        let report = machine.handle(TestEvent::ShowSettings, &0).await.unwrap();
        assert!(report.is_success());
        assert_eq!(machine.base_state(), Some(TestState::Menu));
        assert_eq!(machine.overlay_states(), vec![TestState::Settings]);
        assert_eq!(machine.dominant_state(), Some(TestState::Settings));

        let report = machine.handle(TestEvent::HideSettings, &0).await.unwrap();
        assert!(report.is_success());
        assert!(machine.overlay_states().is_empty());
        assert_eq!(machine.dominant_state(), Some(TestState::Menu));

        assert_eq!(
            *log.borrow(),
            vec![
                "Menu.attach",
                "Menu.enter",
                "Menu.start",
                "Menu.pause",
                "Settings.attach",
                "Settings.enter",
                "Settings.start",
                "Settings.stop",
                "Settings.exit",
                "Settings.detach",
                "Menu.resume",
            ]
        );
    }

    #[tokio::test]
    async fn unknown_event_for_the_configuration_is_an_error() {
        let log = new_log();
        let machine = machine_with(&log, true);
        machine.init(TestState::Menu, &0).await.unwrap();

        let error = machine.handle(TestEvent::Loaded, &0).await.unwrap_err();
        assert!(matches!(
            error,
            FlowError::UnhandledEvent {
                event: TestEvent::Loaded
            }
        ));
    }

    #[tokio::test]
    async fn guard_refusal_blocks_and_mutates_nothing() {
        let log = new_log();
        let machine = machine_with(&log, false);
        machine.init(TestState::Menu, &0).await.unwrap();
        let lifecycle_calls = log.borrow().len();

        let report = machine.handle(TestEvent::GotoGame, &0).await.unwrap();
        assert!(report.is_blocked());
        assert_eq!(machine.base_state(), Some(TestState::Menu));
        assert!(machine.overlay_states().is_empty());
        assert_eq!(log.borrow().len(), lifecycle_calls);
    }

    #[tokio::test]
    async fn close_from_a_non_overlay_state_is_blocked() {
        let log = new_log();
        let mut machine = machine_with(&log, true);
        // a close transition registered on the base state itself
        machine.register_transitions(
            TestState::Menu,
            vec![Transition::close(TestState::Menu, TestEvent::HideSettings)],
        );
        machine.init(TestState::Menu, &0).await.unwrap();

        let report = machine.handle(TestEvent::HideSettings, &0).await.unwrap();
        match &report.outcome {
            TransitionOutcome::Blocked { info, .. } => {
                assert!(info.contains("not an overlay"), "info: {info}")
            }
            other => panic!("expected blocked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unregistered_target_is_blocked() {
        let log = new_log();
        let mut machine = machine_with(&log, true);
        machine.register_transitions(
            TestState::Menu,
            vec![Transition::new(
                TestState::Menu,
                TestEvent::PauseGame,
                TestState::Pause,
            )],
        );
        machine.init(TestState::Menu, &0).await.unwrap();

        let report = machine.handle(TestEvent::PauseGame, &0).await.unwrap();
        match &report.outcome {
            TransitionOutcome::Blocked { to_state, info, .. } => {
                assert_eq!(*to_state, Some(TestState::Pause));
                assert!(info.contains("not registered"), "info: {info}");
            }
            other => panic!("expected blocked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_event_during_a_pending_transition_is_blocked() {
        let log = new_log();
        let mut machine = Machine::new(TestContext { allow_game: true });

        let menu_log = log.clone();
        machine.register_state(TestState::Menu, move || {
            Probe::base(TestState::Menu, menu_log.clone()).as_state()
        });

        // The Game factory returns a pre-built probe whose attach waits
        // on a gate, so the first transition stays in flight.
        let game = Probe::base(TestState::Game, log.clone());
        let gate = game.gate_attach();
        let game_state = game.as_state();
        machine.register_state(TestState::Game, move || Rc::clone(&game_state));

        machine.register_transitions(
            TestState::Menu,
            vec![Transition::new(
                TestState::Menu,
                TestEvent::GotoGame,
                TestState::Game,
            )],
        );
        machine.register_transitions(
            TestState::Game,
            vec![Transition::new(
                TestState::Game,
                TestEvent::PauseGame,
                TestState::Game,
            )],
        );
        machine.init(TestState::Menu, &0).await.unwrap();

        let first = machine.handle(TestEvent::GotoGame, &1);
        let second = async {
            // let the first transition reach its gated attach
            tokio::task::yield_now().await;
            assert!(machine.is_transitioning());
            let report = machine.handle(TestEvent::PauseGame, &2).await.unwrap();
            gate.notify_one();
            report
        };

        let (first_report, second_report) = tokio::join!(first, second);

        assert!(first_report.unwrap().is_success());
        assert!(!machine.is_transitioning());
        match second_report.outcome {
            TransitionOutcome::Blocked { ref info, .. } => {
                assert!(!info.is_empty());
            }
            other => panic!("expected blocked, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn destroy_closes_overlays_top_down_then_the_base() {
        let log = new_log();
        let machine = machine_with(&log, true);
        machine.init(TestState::Menu, &0).await.unwrap();
        machine.handle(TestEvent::ShowSettings, &0).await.unwrap();
        log.borrow_mut().clear();

        machine.destroy().await.unwrap();

        assert_eq!(machine.base_state(), None);
        assert!(machine.overlay_states().is_empty());
        assert_eq!(
            *log.borrow(),
            vec![
                "Settings.stop",
                "Menu.stop",
                "Settings.exit",
                "Settings.detach",
                "Menu.exit",
                "Menu.detach",
            ]
        );

        // idempotent
        machine.destroy().await.unwrap();
    }

    #[tokio::test]
    async fn failed_strategy_execution_surfaces_and_keeps_bookkeeping() {
        let log = new_log();
        let mut machine = Machine::new(TestContext { allow_game: true });

        let menu_log = log.clone();
        machine.register_state(TestState::Menu, move || {
            Probe::base(TestState::Menu, menu_log.clone()).as_state()
        });

        let game = Probe::base(TestState::Game, log.clone());
        game.fail_next_enter();
        let game_state = game.as_state();
        machine.register_state(TestState::Game, move || Rc::clone(&game_state));

        machine.register_transitions(
            TestState::Menu,
            vec![Transition::new(
                TestState::Menu,
                TestEvent::GotoGame,
                TestState::Game,
            )],
        );
        machine.init(TestState::Menu, &0).await.unwrap();

        let error = machine.handle(TestEvent::GotoGame, &0).await.unwrap_err();
        match error {
            FlowError::TransitionFailed { state_id, .. } => {
                assert_eq!(state_id, TestState::Game)
            }
            other => panic!("expected TransitionFailed, got {other:?}"),
        }

        // no rollback: the target already became the base and the
        // in-flight marker is still set
        assert_eq!(machine.base_state(), Some(TestState::Game));
        assert!(machine.is_transitioning());
    }

    #[tokio::test]
    async fn overlay_round_trip_leaves_the_base_active() {
        let log = new_log();
        let machine = machine_with(&log, true);
        machine.init(TestState::Menu, &0).await.unwrap();

        machine.handle(TestEvent::ShowSettings, &0).await.unwrap();
        machine.handle(TestEvent::HideSettings, &0).await.unwrap();

        // paused-then-resumed base state ends up active again
        let last = log.borrow().last().cloned().unwrap();
        assert_eq!(last, "Menu.resume");
    }
}
