//! Episode state and core simulation types
//!
//! One `EpisodeState` is one round from start to termination. It is owned
//! exclusively by whoever drives the tick loop and is never shared.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Hitbox;
use crate::consts::*;
use crate::tuning::Rules;

/// Whether touching an item helps or hurts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCategory {
    /// Costs a hit (or ends the episode)
    Hazard,
    /// Adds score and joins the inventory
    Reward,
}

/// Item identities in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    // Hazards
    TrashBin,
    Paper,
    Bottle,
    Cup,
    Bag,
    // Rewards
    Recycling,
    SolarPanel,
    WindTurbine,
    Tree,
    Bicycle,
}

impl ItemKind {
    pub const HAZARDS: [ItemKind; 5] = [
        ItemKind::TrashBin,
        ItemKind::Paper,
        ItemKind::Bottle,
        ItemKind::Cup,
        ItemKind::Bag,
    ];

    pub const REWARDS: [ItemKind; 5] = [
        ItemKind::Recycling,
        ItemKind::SolarPanel,
        ItemKind::WindTurbine,
        ItemKind::Tree,
        ItemKind::Bicycle,
    ];

    pub fn category(&self) -> ItemCategory {
        match self {
            ItemKind::TrashBin
            | ItemKind::Paper
            | ItemKind::Bottle
            | ItemKind::Cup
            | ItemKind::Bag => ItemCategory::Hazard,
            ItemKind::Recycling
            | ItemKind::SolarPanel
            | ItemKind::WindTurbine
            | ItemKind::Tree
            | ItemKind::Bicycle => ItemCategory::Reward,
        }
    }

    #[inline]
    pub fn is_hazard(&self) -> bool {
        self.category() == ItemCategory::Hazard
    }

    /// Stable identity key (also the image asset name)
    pub fn key(&self) -> &'static str {
        match self {
            ItemKind::TrashBin => "trash-bin",
            ItemKind::Paper => "paper",
            ItemKind::Bottle => "bottle",
            ItemKind::Cup => "cup",
            ItemKind::Bag => "bag",
            ItemKind::Recycling => "recycling",
            ItemKind::SolarPanel => "solar-panel",
            ItemKind::WindTurbine => "wind-turbine",
            ItemKind::Tree => "tree",
            ItemKind::Bicycle => "bicycle",
        }
    }

    /// Emoji drawn for the item
    pub fn glyph(&self) -> &'static str {
        match self {
            ItemKind::TrashBin => "🗑️",
            ItemKind::Paper => "📄",
            ItemKind::Bottle => "🍶",
            ItemKind::Cup => "🥤",
            ItemKind::Bag => "🛍️",
            ItemKind::Recycling => "♻️",
            ItemKind::SolarPanel => "☀️",
            ItemKind::WindTurbine => "🌬️",
            ItemKind::Tree => "🌳",
            ItemKind::Bicycle => "🚲",
        }
    }

    /// Lane height for the item's category
    pub fn spawn_y(&self) -> f32 {
        match self.category() {
            ItemCategory::Hazard => HAZARD_Y,
            ItemCategory::Reward => REWARD_Y,
        }
    }
}

/// Insertion-ordered set of item identities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection(Vec<ItemKind>);

impl Collection {
    /// Add `kind` if not present; returns true if it was new
    pub fn insert(&mut self, kind: ItemKind) -> bool {
        if self.0.contains(&kind) {
            return false;
        }
        self.0.push(kind);
        true
    }

    pub fn contains(&self, kind: ItemKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[ItemKind] {
        &self.0
    }
}

/// The player-controlled dinosaur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub x: f32,
    /// Top of the box; equals the ground baseline when standing
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Vertical speed (negative = upward)
    pub velocity_y: f32,
    pub airborne: bool,
    /// Jumps used since the last ground contact
    pub jump_count: u8,
}

impl Actor {
    /// Standing on the ground at the fixed column
    pub fn new(ground_y: f32) -> Self {
        Self {
            x: ACTOR_X,
            y: ground_y,
            width: ACTOR_WIDTH,
            height: ACTOR_HEIGHT,
            velocity_y: 0.0,
            airborne: false,
            jump_count: 0,
        }
    }

    /// Visual box
    pub fn bounds(&self) -> Hitbox {
        Hitbox::new(self.x, self.y, self.width, self.height)
    }

    /// Collision box
    pub fn hitbox(&self, inset: f32) -> Hitbox {
        self.bounds().inset(inset)
    }
}

/// An obstacle or collectible scrolling toward the actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingItem {
    pub id: u32,
    pub kind: ItemKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl MovingItem {
    pub fn bounds(&self) -> Hitbox {
        Hitbox {
            min: self.pos,
            size: self.size,
        }
    }

    pub fn hitbox(&self, inset: f32) -> Hitbox {
        self.bounds().inset(inset)
    }

    /// x of the trailing (right) edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }
}

/// Things that happened during a tick, drained by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A jump started; `extra` is true for jumps made in mid-air
    Jumped { extra: bool },
    Spawned(ItemKind),
    /// Reward picked up; `first` is true when it joined the inventory
    Collected { kind: ItemKind, first: bool },
    /// Hazard hit; `hits_left` is zero when the episode ended
    Hit { kind: ItemKind, hits_left: u32 },
    /// Hazard scrolled off-screen untouched
    Avoided(ItemKind),
    SpeedUp { speed: f32 },
    EpisodeOver { score: u64 },
}

/// Complete state of one episode (deterministic given the RNG stream)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeState {
    /// Rules this episode plays under
    pub rules: Rules,
    pub actor: Actor,
    /// Active items (ordered by id)
    pub items: Vec<MovingItem>,
    pub score: u64,
    pub hit_count: u32,
    /// Current scroll speed
    pub speed: f32,
    /// False once the episode has ended
    pub running: bool,
    /// Distinct rewards collected, in pickup order
    pub inventory: Collection,
    /// Distinct hazards that left the field untouched
    pub avoided_hazards: Collection,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks since the last successful spawn
    pub ticks_since_spawn: u32,
    /// Speed ratchet steps already applied
    pub speed_steps: u64,
    /// Pending events for the presentation layer
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl EpisodeState {
    /// Fresh running episode
    pub fn new(rules: Rules) -> Self {
        Self {
            actor: Actor::new(rules.ground_y),
            items: Vec::new(),
            score: 0,
            hit_count: 0,
            speed: rules.start_speed,
            running: true,
            inventory: Collection::default(),
            avoided_hazards: Collection::default(),
            time_ticks: 0,
            ticks_since_spawn: 0,
            speed_steps: 0,
            events: Vec::new(),
            next_id: 1,
            rules,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Place an item of `kind` with its left edge at `x`
    pub fn push_item(&mut self, kind: ItemKind, x: f32) -> u32 {
        let id = self.next_entity_id();
        self.items.push(MovingItem {
            id,
            kind,
            pos: Vec2::new(x, kind.spawn_y()),
            size: Vec2::splat(ITEM_SIZE),
        });
        id
    }

    /// Hits remaining before the episode ends
    pub fn hits_left(&self) -> u32 {
        self.rules.hit_limit.saturating_sub(self.hit_count)
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Variant;

    #[test]
    fn test_new_episode_on_ground() {
        let state = EpisodeState::new(Rules::preset(Variant::Classic));
        assert!(state.running);
        assert_eq!(state.actor.y, GROUND_Y);
        assert_eq!(state.actor.jump_count, 0);
        assert!(!state.actor.airborne);
        assert_eq!(state.speed, START_SPEED);
        assert_eq!(state.hits_left(), 1);
    }

    #[test]
    fn test_collection_dedups_in_order() {
        let mut c = Collection::default();
        assert!(c.insert(ItemKind::Tree));
        assert!(c.insert(ItemKind::Recycling));
        assert!(!c.insert(ItemKind::Tree));
        assert_eq!(c.as_slice(), &[ItemKind::Tree, ItemKind::Recycling]);
    }

    #[test]
    fn test_catalog_categories() {
        assert!(ItemKind::HAZARDS.iter().all(|k| k.is_hazard()));
        assert!(ItemKind::REWARDS.iter().all(|k| !k.is_hazard()));
        assert_eq!(ItemKind::Bottle.spawn_y(), HAZARD_Y);
        assert_eq!(ItemKind::Tree.spawn_y(), REWARD_Y);
    }

    #[test]
    fn test_push_item_assigns_ids() {
        let mut state = EpisodeState::new(Rules::default());
        let a = state.push_item(ItemKind::Cup, 400.0);
        let b = state.push_item(ItemKind::Bag, 600.0);
        assert!(b > a);
        assert_eq!(state.items[0].right(), 400.0 + ITEM_SIZE);
    }

    #[test]
    fn test_events_skip_serialization() {
        let mut state = EpisodeState::new(Rules::default());
        state.events.push(GameEvent::Spawned(ItemKind::Cup));
        let json = serde_json::to_string(&state).unwrap();
        let restored: EpisodeState = serde_json::from_str(&json).unwrap();
        assert!(restored.events.is_empty());
        assert_eq!(restored.actor, state.actor);
    }
}
