//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One call to `tick` per frame, per-tick units only
//! - Randomness only through the injected RNG
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Hitbox;
pub use spawn::{SpawnAttempt, has_clearance, try_spawn};
pub use state::{
    Actor, Collection, EpisodeState, GameEvent, ItemCategory, ItemKind, MovingItem,
};
pub use tick::{StepOutcome, TickInput, tick};
