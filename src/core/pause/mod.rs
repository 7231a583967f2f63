//=========================================================================
// Pause Scopes
//=========================================================================
//
// Hierarchical pause control for application subsystems.
//
// Architecture:
//   PauseScope (root)
//     ├─ systems: Vec<Rc<dyn Pausable>>
//     └─ children: Vec<Rc<PauseScope>>   (one per flow state, input, audio…)
//
// Pausing a scope pauses its registered systems and every child scope.
// Scopes are passed down explicitly; there is no global pause state.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;

//=== Pausable Trait ======================================================

/// Capability of being paused and resumed.
///
/// Both leaf systems (input, animation, audio) and [`PauseScope`] subtrees
/// implement this. `pause`/`resume` are idempotent: repeated calls in the
/// same direction are no-ops.
pub trait Pausable {
    /// Current pause flag.
    fn paused(&self) -> bool;

    /// Pauses the system. No-op when already paused.
    fn pause(&self);

    /// Resumes the system. No-op when not paused.
    fn resume(&self);
}

//=== PauseScope ==========================================================

/// A named node in the pause hierarchy.
///
/// Systems register themselves as explicit [`Pausable`] handles at
/// registration time; the scope never inspects what a system is beyond
/// that capability. Child scopes are created per owner (a flow state, an
/// input manager) and released when the owner goes away.
pub struct PauseScope {
    name: String,
    paused: Cell<bool>,
    systems: RefCell<Vec<Rc<dyn Pausable>>>,
    children: RefCell<Vec<Rc<PauseScope>>>,
}

impl PauseScope {
    //--- Construction -----------------------------------------------------

    /// Creates a root scope.
    pub fn root(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            paused: Cell::new(false),
            systems: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
        })
    }

    /// Creates a child scope attached to this one.
    ///
    /// The child inherits the current pause flag, so a scope created under
    /// an already-paused parent starts paused.
    pub fn child(self: &Rc<Self>, name: impl Into<String>) -> Rc<PauseScope> {
        let child = Rc::new(PauseScope {
            name: name.into(),
            paused: Cell::new(self.paused.get()),
            systems: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
        });

        self.children.borrow_mut().push(Rc::clone(&child));
        child
    }

    /// Scope name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    //--- System Registration ----------------------------------------------

    /// Registers a system under this scope.
    ///
    /// A system added to a paused scope is paused immediately to keep the
    /// subtree consistent.
    pub fn add_system(&self, system: Rc<dyn Pausable>) {
        if self.paused.get() && !system.paused() {
            system.pause();
        }
        self.systems.borrow_mut().push(system);
    }

    /// Removes a previously registered system. Returns `false` when the
    /// system was not registered here.
    pub fn remove_system(&self, system: &Rc<dyn Pausable>) -> bool {
        let mut systems = self.systems.borrow_mut();
        match systems.iter().position(|s| Rc::ptr_eq(s, system)) {
            Some(index) => {
                systems.remove(index);
                true
            }
            None => false,
        }
    }

    /// Detaches a child scope from this one. Returns `false` when the
    /// scope was not a child of this one.
    pub fn remove_child(&self, child: &Rc<PauseScope>) -> bool {
        let mut children = self.children.borrow_mut();
        match children.iter().position(|c| Rc::ptr_eq(c, child)) {
            Some(index) => {
                children.remove(index);
                true
            }
            None => false,
        }
    }
}

impl Pausable for PauseScope {
    fn paused(&self) -> bool {
        self.paused.get()
    }

    fn pause(&self) {
        if self.paused.get() {
            return;
        }
        self.paused.set(true);

        debug!("Pausing scope '{}'", self.name);

        for system in self.systems.borrow().iter() {
            if !system.paused() {
                system.pause();
            }
        }
        for child in self.children.borrow().iter() {
            child.pause();
        }
    }

    fn resume(&self) {
        if !self.paused.get() {
            return;
        }
        self.paused.set(false);

        debug!("Resuming scope '{}'", self.name);

        for system in self.systems.borrow().iter() {
            if system.paused() {
                system.resume();
            }
        }
        for child in self.children.borrow().iter() {
            child.resume();
        }
    }
}

//=== Tests ===============================================================
