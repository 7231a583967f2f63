//=========================================================================
// Overlay Mode
//=========================================================================

/// How a state reacts when another state is layered on top of it.
///
/// The mode belongs to the state *being overlaid* and selects the
/// transition strategy used to put the overlay up and, symmetrically,
/// the restore steps when the overlay closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayMode {
    /// The state cannot be overlaid at all.
    Forbidden,

    /// Freeze everything: logic, actions, animations and sound playback
    /// (music keeps going). Cheapest to restore: a single `resume`.
    Pause,

    /// Deactivate interaction and logic sub-systems. Restoring requires a
    /// full `start` to bring them back up.
    Inactive,

    /// Run the full stop/exit path: cancel actions and animations, stop
    /// sounds. Restoring requires `enter` with the closing payload plus
    /// `start`, since the overlay invalidated the entered data.
    Exit,
}
