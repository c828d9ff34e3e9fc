//! Data-driven game rules
//!
//! Every constant that differs between game variants lives in [`Rules`]. The
//! two shipped presets are the classic one-hit runner and the collector
//! variant with double jump, hit points and collectible rewards. Custom rule
//! sets can be loaded from JSON and are validated before use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::ItemKind;

/// Errors raised while loading or validating a rule set
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse rules: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid rule `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Named rule presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Single jump, first hazard ends the round, survival-time score
    #[default]
    Classic,
    /// Double jump, three hits, collectible rewards and hit penalties
    Collector,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Collector => "collector",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "collector" | "collect" => Some(Variant::Collector),
            _ => None,
        }
    }
}

/// How spawn attempts are triggered once the cooldown has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnPolicy {
    /// Roll once per tick with the given probability
    Chance { per_tick: f32 },
    /// Attempt every `ticks` ticks since the last spawn
    Interval { ticks: u32 },
}

/// Survival-time scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScore {
    /// Award `points` every `every_ticks` ticks survived
    pub every_ticks: u32,
    pub points: u64,
}

/// Speed increase applied each time the score crosses a multiple of `every_points`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRatchet {
    pub every_points: u64,
    pub increment: f32,
}

/// Hitbox insets per side (visual box shrunk by this much on each edge)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub actor: f32,
    pub hazard: f32,
    pub reward: f32,
}

/// Complete rule set for an episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// Upward velocity set by a jump (negative = up)
    pub jump_impulse: f32,
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Jumps allowed before touching the ground again
    pub max_jumps: u8,
    /// Actor y when standing on the ground
    pub ground_y: f32,
    /// Right edge of the play field, where items spawn
    pub field_width: f32,
    /// Initial scroll speed
    pub start_speed: f32,
    /// Hazard hits that end the episode
    pub hit_limit: u32,
    /// Points lost per hazard hit (score floors at zero)
    pub hazard_penalty: u64,
    /// Points gained per reward collected
    pub reward_points: u64,
    #[serde(default)]
    pub time_score: Option<TimeScore>,
    #[serde(default)]
    pub speed_ratchet: Option<SpeedRatchet>,
    pub spawn: SpawnPolicy,
    /// Minimum ticks between two spawns
    pub spawn_cooldown_ticks: u32,
    /// Minimum horizontal gap between a new item and any existing item
    pub min_clearance: f32,
    #[serde(default)]
    pub insets: Insets,
    /// Items drawn uniformly at random on spawn
    pub catalog: Vec<ItemKind>,
}

impl Default for Rules {
    fn default() -> Self {
        Self::preset(Variant::Classic)
    }
}

impl Rules {
    /// Build the rules for a named preset
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self {
                jump_impulse: JUMP_IMPULSE,
                gravity: GRAVITY,
                max_jumps: 1,
                ground_y: GROUND_Y,
                field_width: FIELD_WIDTH,
                start_speed: START_SPEED,
                hit_limit: 1,
                hazard_penalty: 0,
                reward_points: 0,
                time_score: Some(TimeScore {
                    every_ticks: 10,
                    points: 1,
                }),
                // +0.5 every 300 ticks of survival
                speed_ratchet: Some(SpeedRatchet {
                    every_points: 30,
                    increment: 0.5,
                }),
                spawn: SpawnPolicy::Chance { per_tick: 0.005 },
                spawn_cooldown_ticks: 40,
                min_clearance: 150.0,
                insets: Insets::default(),
                catalog: ItemKind::HAZARDS.to_vec(),
            },
            Variant::Collector => Self {
                jump_impulse: -11.0,
                gravity: 0.6,
                max_jumps: 2,
                ground_y: GROUND_Y,
                field_width: FIELD_WIDTH,
                start_speed: 4.0,
                hit_limit: 3,
                hazard_penalty: 100,
                reward_points: 100,
                time_score: Some(TimeScore {
                    every_ticks: 10,
                    points: 1,
                }),
                speed_ratchet: Some(SpeedRatchet {
                    every_points: 500,
                    increment: 0.5,
                }),
                spawn: SpawnPolicy::Chance { per_tick: 0.02 },
                spawn_cooldown_ticks: 45,
                min_clearance: 120.0,
                // Forgiving pickups, fair hazards
                insets: Insets {
                    actor: 4.0,
                    hazard: 6.0,
                    reward: 0.0,
                },
                catalog: ItemKind::HAZARDS
                    .iter()
                    .chain(ItemKind::REWARDS.iter())
                    .copied()
                    .collect(),
            },
        }
    }

    /// Parse and validate a rule set from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let rules: Rules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check that the rules describe a playable episode
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if !(self.jump_impulse < 0.0) {
            return invalid("jump_impulse", "must be negative (upward)");
        }
        if !(self.gravity > 0.0) {
            return invalid("gravity", "must be positive");
        }
        if self.max_jumps == 0 {
            return invalid("max_jumps", "must allow at least one jump");
        }
        if self.hit_limit == 0 {
            return invalid("hit_limit", "must be at least 1");
        }
        // Items must scroll towards the actor or no hazard ever arrives
        if !(self.start_speed > 0.0) {
            return invalid("start_speed", "must be positive");
        }
        if !(self.field_width > 0.0) {
            return invalid("field_width", "must be positive");
        }
        if !(self.min_clearance >= 0.0) {
            return invalid("min_clearance", "must not be negative");
        }
        match self.spawn {
            SpawnPolicy::Chance { per_tick } if !(0.0..=1.0).contains(&per_tick) => {
                return invalid("spawn", "chance must be within [0, 1]");
            }
            SpawnPolicy::Interval { ticks: 0 } => {
                return invalid("spawn", "interval must be at least one tick");
            }
            _ => {}
        }
        if let Some(ts) = self.time_score {
            if ts.every_ticks == 0 {
                return invalid("time_score", "every_ticks must be at least 1");
            }
        }
        if let Some(ratchet) = self.speed_ratchet {
            if ratchet.every_points == 0 {
                return invalid("speed_ratchet", "every_points must be at least 1");
            }
            if !(ratchet.increment >= 0.0) {
                return invalid("speed_ratchet", "increment must not be negative");
            }
        }
        if self.catalog.is_empty() {
            return invalid("catalog", "must contain at least one item");
        }
        // Hazards are the only way an episode ends
        if !self.catalog.iter().any(|kind| kind.is_hazard()) {
            return invalid("catalog", "must contain at least one hazard");
        }
        Ok(())
    }

    /// Upper bound on how far above the ground the actor can rise
    pub fn max_jump_height(&self) -> f32 {
        let single = self.jump_impulse * self.jump_impulse / (2.0 * self.gravity);
        single * self.max_jumps as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        assert!(Rules::preset(Variant::Classic).validate().is_ok());
        assert!(Rules::preset(Variant::Collector).validate().is_ok());
    }

    #[test]
    fn classic_matches_one_hit_runner() {
        let rules = Rules::preset(Variant::Classic);
        assert_eq!(rules.max_jumps, 1);
        assert_eq!(rules.hit_limit, 1);
        assert_eq!(rules.hazard_penalty, 0);
        assert!(rules.catalog.iter().all(|k| k.is_hazard()));
    }

    #[test]
    fn collector_has_both_categories() {
        let rules = Rules::preset(Variant::Collector);
        assert!(rules.catalog.iter().any(|k| k.is_hazard()));
        assert!(rules.catalog.iter().any(|k| !k.is_hazard()));
        assert!(rules.insets.reward < rules.insets.hazard);
    }

    #[test]
    fn json_round_trip_keeps_rules() {
        let rules = Rules::preset(Variant::Collector);
        let json = serde_json::to_string(&rules).unwrap();
        assert_eq!(Rules::from_json(&json).unwrap(), rules);
    }

    #[test]
    fn rejects_downward_jump() {
        let mut rules = Rules::default();
        rules.jump_impulse = 4.0;
        let err = rules.validate().unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "jump_impulse", .. }));
    }

    #[test]
    fn rejects_empty_catalog_and_zero_interval() {
        let mut rules = Rules::default();
        rules.catalog.clear();
        assert!(rules.validate().is_err());

        let mut rules = Rules::default();
        rules.spawn = SpawnPolicy::Interval { ticks: 0 };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn rejects_catalog_without_hazards() {
        let mut rules = Rules::preset(Variant::Collector);
        rules.catalog = vec![ItemKind::Tree, ItemKind::Bicycle];
        let err = rules.validate().unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "catalog",
                reason: "must contain at least one hazard"
            }
        ));

        let json = serde_json::to_string(&rules).unwrap();
        assert!(Rules::from_json(&json).is_err());
    }

    #[test]
    fn rejects_standing_field() {
        let mut rules = Rules::default();
        rules.start_speed = 0.0;
        let err = rules.validate().unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "start_speed", .. }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Rules::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }

    #[test]
    fn jump_height_scales_with_jumps() {
        let single = Rules::preset(Variant::Classic);
        assert!((single.max_jump_height() - 90.0).abs() < 1e-3);

        let mut double = single.clone();
        double.max_jumps = 2;
        assert!((double.max_jump_height() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn variant_parsing() {
        assert_eq!(Variant::from_str("Collector"), Some(Variant::Collector));
        assert_eq!(Variant::from_str("classic"), Some(Variant::Classic));
        assert_eq!(Variant::from_str("arcade"), None);
    }
}
