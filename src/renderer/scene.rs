//! Draw-command generation
//!
//! Everything is expressed in logical field units (800 wide, y down). The
//! backend scales to the real canvas size.

use crate::consts::*;
use crate::sim::{EpisodeState, Hitbox, ItemCategory, ItemKind};
use crate::text::Language;

pub const SKY_COLOR: &str = "#BFDBFE";
pub const GROUND_COLOR: &str = "#8B5CF6";
pub const ACTOR_COLOR: &str = "#22C55E";
pub const HAZARD_FALLBACK: &str = "#EF4444";
pub const REWARD_FALLBACK: &str = "#FACC15";
pub const HUD_COLOR: &str = "#1F2937";

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill a rectangle
    Rect { bounds: Hitbox, color: &'static str },
    /// Draw an emoji inside `bounds`, or fill `fallback` if it cannot be drawn
    Glyph {
        glyph: &'static str,
        bounds: Hitbox,
        fallback: &'static str,
    },
    /// HUD text anchored at its baseline
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        color: &'static str,
        right_aligned: bool,
    },
}

/// Draw list for one frame
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    /// Build the frame for an episode
    pub fn build(state: &EpisodeState, language: Language) -> Self {
        let mut scene = Self {
            commands: Vec::with_capacity(state.items.len() + 8),
        };
        scene.rect(Hitbox::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT), SKY_COLOR);
        scene.rect(
            Hitbox::new(0.0, GROUND_LINE, FIELD_WIDTH, FIELD_HEIGHT - GROUND_LINE),
            GROUND_COLOR,
        );
        scene.actor(state);

        for item in &state.items {
            scene.commands.push(DrawCommand::Glyph {
                glyph: item.kind.glyph(),
                bounds: item.bounds(),
                fallback: fallback_color(item.kind),
            });
        }

        scene.hud(state, language);
        scene
    }

    fn rect(&mut self, bounds: Hitbox, color: &'static str) {
        self.commands.push(DrawCommand::Rect { bounds, color });
    }

    fn text(&mut self, text: String, x: f32, y: f32, right_aligned: bool) {
        self.commands.push(DrawCommand::Text {
            text,
            x,
            y,
            size: 16.0,
            color: HUD_COLOR,
            right_aligned,
        });
    }

    /// Green block with an eye
    fn actor(&mut self, state: &EpisodeState) {
        let a = &state.actor;
        self.rect(a.bounds(), ACTOR_COLOR);
        self.rect(Hitbox::new(a.x + 25.0, a.y + 8.0, 8.0, 8.0), "#FFFFFF");
        self.rect(Hitbox::new(a.x + 27.0, a.y + 10.0, 4.0, 4.0), "#000000");
    }

    fn hud(&mut self, state: &EpisodeState, language: Language) {
        let t = language.strings();
        self.text(format!("{}: {}", t.score, state.score), 10.0, 20.0, false);

        if state.rules.hit_limit > 1 {
            let hearts = "❤️".repeat(state.hits_left() as usize);
            self.text(
                format!("{}: {}", t.hits_left, hearts),
                FIELD_WIDTH - 10.0,
                20.0,
                true,
            );
        }

        if !state.inventory.is_empty() {
            let glyphs: String = state.inventory.as_slice().iter().map(|k| k.glyph()).collect();
            self.text(format!("{}: {}", t.collected, glyphs), 10.0, 40.0, false);
        }
    }
}

pub fn fallback_color(kind: ItemKind) -> &'static str {
    match kind.category() {
        ItemCategory::Hazard => HAZARD_FALLBACK,
        ItemCategory::Reward => REWARD_FALLBACK,
    }
}

/// Backing-store size and field scale for a canvas shown at `client` CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Device pixels per field unit
    pub scale: f64,
}

impl Viewport {
    pub fn fit(client_width: i32, client_height: i32, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let w = client_width.max(1) as f64 * dpr;
        let h = client_height.max(1) as f64 * dpr;
        Self {
            width: w as u32,
            height: h as u32,
            scale: w / FIELD_WIDTH as f64,
        }
    }
}

/// A measured width of zero means the font has no glyph to draw
pub fn glyph_renders(measured_width: f64) -> bool {
    measured_width > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{Rules, Variant};

    fn texts(scene: &Scene) -> Vec<&str> {
        scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_items_become_glyphs() {
        let mut state = EpisodeState::new(Rules::preset(Variant::Collector));
        state.push_item(ItemKind::Cup, 300.0);
        state.push_item(ItemKind::Tree, 500.0);

        let scene = Scene::build(&state, Language::En);
        let glyphs: Vec<_> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Glyph {
                    glyph, fallback, ..
                } => Some((*glyph, *fallback)),
                _ => None,
            })
            .collect();
        assert_eq!(
            glyphs,
            vec![("🥤", HAZARD_FALLBACK), ("🌳", REWARD_FALLBACK)]
        );
    }

    #[test]
    fn test_actor_drawn_at_state_position() {
        let mut state = EpisodeState::new(Rules::default());
        state.actor.y = 100.0;
        let scene = Scene::build(&state, Language::En);
        assert!(scene.commands.contains(&DrawCommand::Rect {
            bounds: Hitbox::new(ACTOR_X, 100.0, ACTOR_WIDTH, ACTOR_HEIGHT),
            color: ACTOR_COLOR,
        }));
    }

    #[test]
    fn test_hud_hides_hits_for_one_hit_rules() {
        let state = EpisodeState::new(Rules::preset(Variant::Classic));
        let scene = Scene::build(&state, Language::Nl);
        assert_eq!(texts(&scene), vec!["Score: 0"]);
    }

    #[test]
    fn test_hud_shows_hits_and_inventory() {
        let mut state = EpisodeState::new(Rules::preset(Variant::Collector));
        state.hit_count = 1;
        state.inventory.insert(ItemKind::Recycling);
        let scene = Scene::build(&state, Language::En);
        let texts = texts(&scene);
        assert!(texts.contains(&"Hits left: ❤️❤️"));
        assert!(texts.contains(&"Collected: ♻️"));
    }

    #[test]
    fn test_viewport_follows_display_size() {
        let vp = Viewport::fit(800, 200, 1.0);
        assert_eq!((vp.width, vp.height, vp.scale), (800, 200, 1.0));

        // A narrower window after a resize shrinks the scale
        let vp = Viewport::fit(400, 100, 2.0);
        assert_eq!((vp.width, vp.height), (800, 200));
        assert_eq!(vp.scale, 1.0);
        let vp = Viewport::fit(400, 100, 1.0);
        assert_eq!(vp.scale, 0.5);

        // Hidden canvases still get a usable backing store
        let vp = Viewport::fit(0, 0, 0.0);
        assert_eq!((vp.width, vp.height), (1, 1));
    }

    #[test]
    fn test_missing_glyph_uses_fallback() {
        assert!(!glyph_renders(0.0));
        assert!(!glyph_renders(f64::NAN));
        assert!(glyph_renders(24.0));
    }
}
