//! Stage tree and run state types
//!
//! Only the `Gameplay` variant carries mutable run state; everything else is
//! a thin marker with the data its screen needs.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tutorial length; advancing past the last step enters gameplay
pub const TUTORIAL_STEPS: u32 = 3;

/// Top-level game stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameStage {
    Boot { progress: f32 },
    StartMenu { can_continue: bool },
    Tutorial { step: u32 },
    Gameplay(RunState),
    Results(RunSummary),
}

/// Gameplay sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Substate {
    Running,
    Paused,
    GameOver,
}

/// Run counters shown on the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub time: f32,
    pub score: u64,
    pub kills: u32,
    pub level: u32,
    /// Rolling damage-per-second estimate, maintained by combat code
    pub dps: f32,
}

/// Wave progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveState {
    pub index: u32,
    /// Fraction of the current wave elapsed, in [0, 1) before rollover
    pub progress: f32,
    /// Seconds of progress required to roll the wave
    pub goal: f32,
    /// Waves remaining until the next boss, floored at 0
    pub boss_countdown: u32,
}

/// Player resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub hp: f32,
    pub max_hp: f32,
    pub shield: f32,
    pub xp: f32,
    pub xp_goal: f32,
    pub credits: u32,
}

/// Pending level-up prompt. Options are populated by the upgrade system,
/// an external collaborator; the reducer only opens and closes the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelUpPrompt {
    pub options: Vec<String>,
}

/// Environmental event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Storm,
    Fog,
    Hazard,
    Blessing,
}

/// An active environmental event with its remaining duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub kind: EventKind,
    pub duration: f32,
}

/// Drop/wave notification rarity, drives HUD styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

/// Transient HUD notification with a time-to-live in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropNotification {
    pub text: String,
    pub rarity: Rarity,
    pub ttl: f32,
}

/// Mutable state of a live run. Created on run start, mutated exclusively by
/// the reducer, replaced by a `RunSummary` on finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub substate: Substate,
    pub stats: RunStats,
    pub wave: WaveState,
    pub resources: Resources,
    pub level_up: Option<LevelUpPrompt>,
    pub event: Option<ActiveEvent>,
    pub notifications: Vec<DropNotification>,
    /// Resume countdown value published by the pause layer, if any
    pub countdown: Option<u8>,
}

impl RunState {
    /// Fresh run with the starting loadout
    pub fn new() -> Self {
        Self {
            substate: Substate::Running,
            stats: RunStats {
                time: 0.0,
                score: 0,
                kills: 0,
                level: 1,
                dps: 0.0,
            },
            wave: WaveState {
                index: 1,
                progress: 0.0,
                goal: FIRST_WAVE_GOAL,
                boss_countdown: BOSS_COUNTDOWN_START,
            },
            resources: Resources {
                hp: STARTING_HP,
                max_hp: STARTING_HP,
                shield: STARTING_SHIELD,
                xp: 0.0,
                xp_goal: STARTING_XP_GOAL,
                credits: 0,
            },
            level_up: None,
            event: None,
            notifications: Vec::new(),
            countdown: None,
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen summary of a finished run, shown on the results screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub time: f32,
    pub score: u64,
    pub kills: u32,
    pub level: u32,
    pub wave: u32,
}

impl RunSummary {
    pub fn from_run(run: &RunState) -> Self {
        Self {
            time: run.stats.time,
            score: run.stats.score,
            kills: run.stats.kills,
            level: run.stats.level,
            wave: run.wave.index,
        }
    }
}
