//! Per-frame simulation step
//!
//! Advances an episode by one tick: jump, gravity, ground clamp, spawn,
//! scroll and cull, collisions, time score, speed ratchet. All units are per
//! tick; the caller decides how ticks map to wall-clock time.

use rand::Rng;

use super::spawn::try_spawn;
use super::state::{EpisodeState, GameEvent, ItemCategory};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Jump requested since the previous tick (edge-triggered)
    pub jump: bool,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Episode continues
    Running,
    /// Episode ended during this tick
    Ended,
    /// Episode was already over; nothing changed
    Inactive,
}

impl StepOutcome {
    pub fn ended(&self) -> bool {
        *self == StepOutcome::Ended
    }
}

/// Advance the episode by one tick
pub fn tick<R: Rng + ?Sized>(
    state: &mut EpisodeState,
    input: &TickInput,
    rng: &mut R,
) -> StepOutcome {
    if !state.running {
        return StepOutcome::Inactive;
    }

    state.time_ticks += 1;

    if input.jump {
        try_jump(state);
    }
    integrate_actor(state);

    try_spawn(state, rng);
    advance_items(state);

    if resolve_collisions(state) {
        state.running = false;
        state.events.push(GameEvent::EpisodeOver { score: state.score });
        log::info!(
            "Episode over at tick {}: score {}, hits {}",
            state.time_ticks,
            state.score,
            state.hit_count
        );
        return StepOutcome::Ended;
    }

    apply_time_score(state);
    apply_speed_ratchet(state);

    StepOutcome::Running
}

/// Start a jump if any are left; extra requests are dropped
fn try_jump(state: &mut EpisodeState) {
    let actor = &mut state.actor;
    if actor.jump_count >= state.rules.max_jumps {
        return;
    }
    let extra = actor.airborne;
    actor.velocity_y = state.rules.jump_impulse;
    actor.airborne = true;
    actor.jump_count += 1;
    state.events.push(GameEvent::Jumped { extra });
}

/// Gravity, then clamp to the ground baseline
fn integrate_actor(state: &mut EpisodeState) {
    let ground_y = state.rules.ground_y;
    let actor = &mut state.actor;
    actor.velocity_y += state.rules.gravity;
    actor.y += actor.velocity_y;

    if actor.y >= ground_y {
        actor.y = ground_y;
        actor.velocity_y = 0.0;
        actor.airborne = false;
        actor.jump_count = 0;
    }
}

/// Scroll items left and drop the ones past the left edge
fn advance_items(state: &mut EpisodeState) {
    let speed = state.speed;
    for item in &mut state.items {
        item.pos.x -= speed;
    }

    let (avoided, events) = (&mut state.avoided_hazards, &mut state.events);
    state.items.retain(|item| {
        if item.right() >= 0.0 {
            return true;
        }
        if item.kind.is_hazard() {
            avoided.insert(item.kind);
            events.push(GameEvent::Avoided(item.kind));
        }
        false
    });
}

/// Apply every actor/item contact; returns true if the hit limit was reached
fn resolve_collisions(state: &mut EpisodeState) -> bool {
    let insets = state.rules.insets;
    let actor_box = state.actor.hitbox(insets.actor);

    let mut i = 0;
    while i < state.items.len() {
        let category = state.items[i].kind.category();
        let inset = match category {
            ItemCategory::Hazard => insets.hazard,
            ItemCategory::Reward => insets.reward,
        };
        if !actor_box.overlaps(&state.items[i].hitbox(inset)) {
            i += 1;
            continue;
        }

        let item = state.items.remove(i);
        match category {
            ItemCategory::Reward => {
                let first = state.inventory.insert(item.kind);
                state.score = state.score.saturating_add(state.rules.reward_points);
                state.events.push(GameEvent::Collected {
                    kind: item.kind,
                    first,
                });
            }
            ItemCategory::Hazard => {
                state.hit_count += 1;
                state.score = state.score.saturating_sub(state.rules.hazard_penalty);
                let hits_left = state.hits_left();
                state.events.push(GameEvent::Hit {
                    kind: item.kind,
                    hits_left,
                });
                if state.hit_count >= state.rules.hit_limit {
                    return true;
                }
            }
        }
    }
    false
}

fn apply_time_score(state: &mut EpisodeState) {
    if let Some(ts) = state.rules.time_score {
        if ts.every_ticks > 0 && state.time_ticks % ts.every_ticks as u64 == 0 {
            state.score = state.score.saturating_add(ts.points);
        }
    }
}

/// Raise speed once per threshold crossed; never lowers it
fn apply_speed_ratchet(state: &mut EpisodeState) {
    let Some(ratchet) = state.rules.speed_ratchet else {
        return;
    };
    if ratchet.every_points == 0 {
        return;
    }
    let level = state.score / ratchet.every_points;
    if level > state.speed_steps {
        state.speed += ratchet.increment * (level - state.speed_steps) as f32;
        state.speed_steps = level;
        state.events.push(GameEvent::SpeedUp { speed: state.speed });
    }
}
