//=========================================================================
// Application Layer
//=========================================================================
//
// The brick-breaker's concrete flow built on the core: state kinds and
// their metadata, the event vocabulary, the transition table, state
// factories and the assembled AppFlow.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod context;
pub mod events;
pub mod factory;
pub mod flow;
pub mod scenes;
pub mod services;
pub mod states;
pub mod transitions;

//=== Public API ==========================================================

pub use context::{AppContext, MusicDeck, MusicTrack};
pub use events::{AppEvent, AppPayload};
pub use flow::{AppFlow, AppMachine, AppTransition};
pub use scenes::{AppLayerId, AppSceneId};
pub use states::AppStateId;
