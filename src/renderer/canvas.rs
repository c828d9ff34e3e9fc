//! Canvas 2D backend

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::scene::{DrawCommand, Scene, Viewport, glyph_renders};
use crate::sim::Hitbox;

/// Replays [`Scene`]s onto a canvas
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Device pixels per field unit
    scale: f64,
}

impl CanvasRenderer {
    /// `None` if the canvas has no 2D context
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        let mut renderer = Self {
            canvas,
            ctx,
            scale: 1.0,
        };
        renderer.resize();
        Some(renderer)
    }

    /// Match the backing store to the displayed size
    pub fn resize(&mut self) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let vp = Viewport::fit(self.canvas.client_width(), self.canvas.client_height(), dpr);
        self.canvas.set_width(vp.width);
        self.canvas.set_height(vp.height);
        self.scale = vp.scale;
    }

    pub fn render(&self, scene: &Scene) {
        let ctx = &self.ctx;
        ctx.set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0).ok();

        for command in &scene.commands {
            match command {
                DrawCommand::Rect { bounds, color } => self.fill_rect(bounds, color),
                DrawCommand::Glyph {
                    glyph,
                    bounds,
                    fallback,
                } => {
                    if !self.draw_glyph(glyph, bounds) {
                        self.fill_rect(bounds, fallback);
                    }
                }
                DrawCommand::Text {
                    text,
                    x,
                    y,
                    size,
                    color,
                    right_aligned,
                } => {
                    ctx.set_font(&format!("{}px sans-serif", size));
                    ctx.set_fill_style_str(color);
                    ctx.set_text_align(if *right_aligned { "right" } else { "left" });
                    ctx.set_text_baseline("alphabetic");
                    ctx.fill_text(text, *x as f64, *y as f64).ok();
                }
            }
        }
    }

    /// False if the font has nothing to show for `glyph`
    fn draw_glyph(&self, glyph: &str, bounds: &Hitbox) -> bool {
        let ctx = &self.ctx;
        ctx.set_font(&format!("{}px sans-serif", bounds.size.y));
        ctx.set_fill_style_str("#000000");
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");

        // Missing glyphs measure as zero width in browsers without emoji fonts
        let width = ctx.measure_text(glyph).map(|m| m.width()).unwrap_or(0.0);
        if !glyph_renders(width) {
            log::debug!("No glyph for {}, using fallback", glyph);
            return false;
        }
        ctx.fill_text(glyph, bounds.min.x as f64, bounds.min.y as f64)
            .is_ok()
    }

    fn fill_rect(&self, bounds: &Hitbox, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(
            bounds.min.x as f64,
            bounds.min.y as f64,
            bounds.size.x as f64,
            bounds.size.y as f64,
        );
    }
}
