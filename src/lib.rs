//! The Green Dino Game - an endless-runner mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (jump physics, spawning, collisions, scoring)
//! - `tuning`: Data-driven game rules and variant presets
//! - `session`: Three-round session controller and score aggregation
//! - `leaderboard`: Score store collaborator and nickname submission
//! - `renderer`: Draw-command scene and Canvas 2D backend
//! - `platform`: Browser input capture
//! - `audio`: Injected audio output capability
//! - `settings`, `text`: Player preferences and display copy

pub mod audio;
pub mod leaderboard;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod text;
pub mod tuning;

pub use leaderboard::{LeaderboardError, LeaderboardStore, MemoryLeaderboard};
pub use session::{ScoreAggregate, Session, SessionSummary};
pub use settings::Settings;
pub use text::Language;
pub use tuning::{Rules, Variant};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Logical play field size
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 200.0;
    /// Top edge of the ground strip drawn under the lane
    pub const GROUND_LINE: f32 = 190.0;

    /// Actor defaults - fixed column, y measured at the top of the box
    pub const ACTOR_X: f32 = 50.0;
    pub const ACTOR_WIDTH: f32 = 40.0;
    pub const ACTOR_HEIGHT: f32 = 40.0;
    /// Actor y when standing on the ground
    pub const GROUND_Y: f32 = 150.0;

    /// Jump physics (per tick units)
    pub const JUMP_IMPULSE: f32 = -12.0;
    pub const GRAVITY: f32 = 0.8;

    /// Item defaults
    pub const ITEM_SIZE: f32 = 30.0;
    /// Hazards sit on the lane
    pub const HAZARD_Y: f32 = 160.0;
    /// Rewards float at jump height
    pub const REWARD_Y: f32 = 85.0;

    /// Starting scroll speed (units per tick)
    pub const START_SPEED: f32 = 3.0;

    /// Rounds in a session
    pub const ROUNDS_PER_SESSION: usize = 3;
}
