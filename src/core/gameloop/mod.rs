//=========================================================================
// Game Loop Contracts
//=========================================================================
//
// Minimal per-frame update contracts consumed by scene hosts.
//
// The loop itself (frame pacing, requestAnimationFrame-style driving) is
// the host platform's concern; this module only defines what it means to
// participate in the loop.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

//=== Game Time ===========================================================

/// Timing data handed to every updatable each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameTime {
    /// Time since the previous frame, in milliseconds.
    pub delta_ms: f64,

    /// Time since loop start, in milliseconds.
    pub elapsed_ms: f64,
}

//=== Update Phase ========================================================

/// Ordering bucket for updatables within a frame.
///
/// Logic updatables run before view updatables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameLoopPhase {
    Logic,
    View,
}

//=== Updatable Trait =====================================================

/// A participant in the per-frame update loop.
pub trait Updatable {
    /// The phase this updatable runs in. Defaults to [`GameLoopPhase::Logic`].
    fn update_phase(&self) -> GameLoopPhase {
        GameLoopPhase::Logic
    }

    /// Called once per frame while registered.
    fn update(&self, time: GameTime);
}

//=== UpdateContainer =====================================================

/// Groups updatables of one phase and fans `update` out to them.
///
/// Registration is identity-based: the same `Rc` handle used to add an
/// updatable removes it again.
pub struct UpdateContainer {
    phase: GameLoopPhase,
    updatables: RefCell<Vec<Rc<dyn Updatable>>>,
}

impl UpdateContainer {
    pub fn new(phase: GameLoopPhase) -> Self {
        Self {
            phase,
            updatables: RefCell::new(Vec::new()),
        }
    }

    pub fn has(&self, updatable: &Rc<dyn Updatable>) -> bool {
        self.updatables
            .borrow()
            .iter()
            .any(|u| Rc::ptr_eq(u, updatable))
    }

    /// Adds an updatable. Returns `false` when it is already registered.
    pub fn add(&self, updatable: Rc<dyn Updatable>) -> bool {
        if self.has(&updatable) {
            return false;
        }
        self.updatables.borrow_mut().push(updatable);
        true
    }

    /// Removes an updatable. Returns `false` when it was not registered.
    pub fn remove(&self, updatable: &Rc<dyn Updatable>) -> bool {
        let mut updatables = self.updatables.borrow_mut();
        match updatables.iter().position(|u| Rc::ptr_eq(u, updatable)) {
            Some(index) => {
                updatables.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.updatables.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.updatables.borrow().is_empty()
    }
}

impl Updatable for UpdateContainer {
    fn update_phase(&self) -> GameLoopPhase {
        self.phase
    }

    fn update(&self, time: GameTime) {
        let updatables: Vec<_> = self.updatables.borrow().clone();
        for updatable in updatables {
            updatable.update(time);
        }
    }
}

//=== Tests ===============================================================
