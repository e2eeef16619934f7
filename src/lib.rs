//! Neon Horde - wave-survival arena shooter simulation core
//!
//! Core modules:
//! - `spatial`: Uniform-grid spatial hash for collision/targeting queries
//! - `blueprint`: Enemy archetypes and per-wave stat scaling (pure)
//! - `wave`: Weighted per-wave enemy selection
//! - `stage`: Game stage state machine (boot/menu/tutorial/gameplay/results)
//! - `pause`: Pause menu + resume countdown controller
//! - `overlay`: Off-thread particle/minimap overlay renderer
//! - `host`: Capability interface the pause layer calls on the host session
//! - `audio`: Sound-event contract
//! - `settings`: Flat key-value settings persistence

pub mod audio;
pub mod blueprint;
pub mod host;
pub mod overlay;
pub mod pause;
pub mod settings;
pub mod spatial;
pub mod stage;
pub mod wave;

pub use spatial::SpatialHash;
pub use stage::{Action, GameStage, reduce};

/// RGBA color, straight alpha
pub type Rgba = [u8; 4];

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz gameplay tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Starting resources for a fresh run
    pub const STARTING_HP: f32 = 120.0;
    pub const STARTING_SHIELD: f32 = 40.0;
    pub const STARTING_XP_GOAL: f32 = 100.0;
    /// Seconds of wave progress required to roll the first wave
    pub const FIRST_WAVE_GOAL: f32 = 60.0;
    /// Wave goal growth per rollover
    pub const WAVE_GOAL_GROWTH: f32 = 1.2;
    /// Xp goal growth per level
    pub const XP_GOAL_GROWTH: f32 = 1.35;
    /// Waves until the first boss
    pub const BOSS_COUNTDOWN_START: u32 = 5;
    /// Incoming damage multiplier while an environmental event is active
    pub const EVENT_PRESSURE: f32 = 1.35;

    /// Elite stat adjustments
    pub const ELITE_HP_MULT: f32 = 1.5;
    pub const ELITE_RADIUS_BONUS: f32 = 3.0;

    /// Largest expected enemy radius plus bullet radius; used to size
    /// spatial hash cells so typical entities touch at most 9 cells
    pub const MAX_ENEMY_RADIUS: f32 = 34.0;
    pub const BULLET_RADIUS: f32 = 4.0;
}
