//! Canvas 2D renderer
//!
//! Reads the simulation and draws it; never mutates it. Browser only.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::LANES;
use crate::hud;
use crate::sim::{Competitor, Obstacle, ObstacleKind, RandomSource, SimPhase, SimulationState};

/// Obstacles this far outside the viewport are skipped
const CULL_MARGIN: f64 = 80.0;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the element size and pixel ratio
    pub fn resize(&self, device_pixel_ratio: f64) -> Result<(), JsValue> {
        let dpr = device_pixel_ratio.clamp(1.0, 2.0);
        let (w, h) = self.css_size();
        self.canvas.set_width((w * dpr) as u32);
        self.canvas.set_height((h * dpr) as u32);
        self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
    }

    /// Element size in CSS pixels (never smaller than 320x240)
    fn css_size(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        (rect.width().max(320.0), rect.height().max(240.0))
    }

    pub fn render<R: RandomSource>(&self, state: &SimulationState<R>) -> Result<(), JsValue> {
        let (width, height) = self.css_size();
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, width, height);
        if state.phase() == SimPhase::Idle {
            return Ok(());
        }

        ctx.set_fill_style_str("rgba(0,0,0,0.18)");
        ctx.fill_rect(0.0, 0.0, width, height);

        let geometry = state.tuning().geometry;
        let scale_y = height / geometry.track_height() as f64;
        let camera_x = state.camera_x() as f64;

        for lane in 0..LANES {
            let top = geometry.top(lane) as f64 * scale_y;
            ctx.set_fill_style_str("rgba(255,255,255,0.04)");
            ctx.fill_rect(0.0, top, width, geometry.lane_height as f64 * scale_y);
            if lane != 0 {
                ctx.set_stroke_style_str("rgba(255,255,255,0.12)");
                ctx.set_line_width(2.0);
                ctx.begin_path();
                ctx.move_to(0.0, top);
                ctx.line_to(width, top);
                ctx.stroke();
            }
            ctx.set_fill_style_str("rgba(255,255,255,0.75)");
            ctx.set_font("12px system-ui");
            ctx.fill_text(&format!("P{}", lane + 1), 10.0, top + 16.0)?;
        }

        ctx.set_fill_style_str("rgba(255,90,90,0.95)");
        for obstacle in state.obstacles() {
            let sx = obstacle.pos.x as f64 - camera_x;
            if sx > -CULL_MARGIN && sx < width + CULL_MARGIN {
                self.draw_obstacle(obstacle, sx, obstacle.pos.y as f64 * scale_y, scale_y)?;
            }
        }

        for competitor in state.competitors() {
            let sx = competitor.pos.x as f64 - camera_x;
            let sy = competitor.pos.y as f64 * scale_y;
            self.draw_competitor(competitor, sx, sy, scale_y)?;
        }
        Ok(())
    }

    fn draw_obstacle(&self, o: &Obstacle, sx: f64, sy: f64, scale_y: f64) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let w = o.size.x as f64;
        let h = o.size.y as f64 * scale_y;
        ctx.save();
        ctx.translate(sx, sy)?;
        match o.kind {
            ObstacleKind::Spike => {
                ctx.begin_path();
                ctx.move_to(0.0, h);
                ctx.line_to(w / 2.0, 0.0);
                ctx.line_to(w, h);
                ctx.close_path();
                ctx.fill();
            }
            ObstacleKind::Knife => {
                ctx.fill_rect(0.0, 0.0, w, h);
                // Hilt guard
                ctx.fill_rect(-6.0, h - 14.0, w + 12.0, 6.0);
            }
        }
        ctx.restore();
        Ok(())
    }

    fn draw_competitor(&self, c: &Competitor, sx: f64, sy: f64, scale_y: f64) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let w = c.size.x as f64;
        let h = c.size.y as f64 * scale_y;
        let color = hud::lane_color(c.lane);

        ctx.save();
        if !c.alive {
            ctx.set_global_alpha(0.45);
        }
        ctx.set_fill_style_str(color);
        ctx.fill_rect(sx + 12.0, sy + 18.0, w - 24.0, h - 18.0);
        ctx.begin_path();
        ctx.arc(sx + w / 2.0, sy + 16.0, 12.0, 0.0, std::f64::consts::TAU)?;
        ctx.fill();
        // Sword
        ctx.fill_rect(sx + w / 2.0 - 2.0, sy + 26.0, 4.0, 16.0);
        ctx.fill_rect(sx + w - 10.0, sy + 30.0, 26.0, 4.0);
        ctx.restore();

        ctx.set_fill_style_str("rgba(0,0,0,0.55)");
        ctx.fill_rect(sx - 6.0, sy - 18.0, 160.0, 16.0);
        ctx.set_fill_style_str(color);
        ctx.set_font("12px system-ui");
        ctx.fill_text(&hud::competitor_label(c), sx, sy - 6.0)?;
        Ok(())
    }
}
