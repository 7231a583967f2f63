//=========================================================================
// State Lifecycle Phase
//=========================================================================

/// The linear lifecycle of a single state instance.
///
/// ```text
/// Created ──attach──> Attaching ──> Attached ──enter──> Entering ──> Entered
///                                      ▲                                │
///                                      │                             start
///                                   Exiting <──exit── Entered <─stop─ Active
///                                      │
///  Created <──────detach─────── Attached
/// ```
///
/// Only the forward edges drawn above are legal; a lifecycle call issued
/// in any other phase is rejected with a warning instead of a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatePhase {
    Created,
    Attaching,
    Attached,
    Entering,
    Entered,
    Active,
    Exiting,
}
