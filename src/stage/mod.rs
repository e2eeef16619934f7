//! Game stage state machine
//!
//! A tagged-union stage tree folded by a pure reducer. All run mutation goes
//! through `reduce`; the UI layer only reads the resulting stage.

pub mod reducer;
pub mod state;

pub use reducer::{Action, reduce};
pub use state::{
    ActiveEvent, DropNotification, EventKind, GameStage, LevelUpPrompt, Rarity, Resources,
    RunState, RunStats, RunSummary, Substate, WaveState,
};
