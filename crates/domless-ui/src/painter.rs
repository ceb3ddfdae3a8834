use domless_engine::coords::{Rect, Vec2};
use domless_engine::paint::Color;
use domless_engine::scene::{DrawList, TextureId, ZIndex};
use domless_engine::text::TextStyle;

/// Drawing surface passed to [`Component::paint`](crate::widget::Component::paint).
///
/// Wraps the engine's `DrawList` with the current paint layer (a widget's
/// depth) and a stack of group opacities. Draws at zero effective opacity are
/// skipped.
pub struct Painter<'a> {
    pub(crate) draw_list: &'a mut DrawList,
    layer: i32,
    opacity: Vec<f32>,
}

impl<'a> Painter<'a> {
    pub fn new(draw_list: &'a mut DrawList) -> Self {
        Self { draw_list, layer: 0, opacity: Vec::new() }
    }

    // ── layers ────────────────────────────────────────────────────────────

    #[inline]
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Switches the paint layer and returns the previous one, so callers can
    /// restore it once their subtree is painted.
    pub fn set_layer(&mut self, layer: i32) -> i32 {
        std::mem::replace(&mut self.layer, layer)
    }

    /// Paints with the higher of the current layer and `depth`.
    pub fn raise_to(&mut self, depth: i32) -> i32 {
        let layer = self.layer.max(depth);
        self.set_layer(layer)
    }

    // ── opacity ───────────────────────────────────────────────────────────

    /// Multiplies every following draw by `alpha` until [`pop_opacity`](Self::pop_opacity).
    pub fn push_opacity(&mut self, alpha: f32) {
        self.opacity.push(alpha.clamp(0.0, 1.0));
    }

    pub fn pop_opacity(&mut self) {
        debug_assert!(!self.opacity.is_empty(), "pop_opacity called without matching push_opacity");
        self.opacity.pop();
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity.iter().product()
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// A generated primitive stretched over `rect`.
    pub fn sprite(&mut self, texture: TextureId, rect: Rect, alpha: f32) {
        let alpha = alpha * self.opacity();
        if alpha > 0.0 {
            self.draw_list.push_sprite(self.z(), texture, rect, alpha);
        }
    }

    /// Solid rounded rectangle.
    pub fn rect(&mut self, rect: Rect, radius: f32, color: Color) {
        let color = color.with_alpha(self.opacity());
        if color.a > 0.0 {
            self.draw_list.push_rect(self.z(), rect, radius, color);
        }
    }

    /// Text at `origin` (top-left of the first line).
    pub fn text(&mut self, text: &str, style: &TextStyle, origin: Vec2, alpha: f32) {
        let alpha = alpha * self.opacity();
        if alpha > 0.0 && !text.is_empty() {
            self.draw_list.push_text(self.z(), text, style, origin, alpha);
        }
    }

    // ── clipping ──────────────────────────────────────────────────────────

    /// Begin a scissor region. Must be paired with [`pop_clip`](Self::pop_clip).
    pub fn push_clip(&mut self, rect: Rect) {
        self.draw_list.push_clip(rect);
    }

    /// End the most recent scissor region.
    pub fn pop_clip(&mut self) {
        self.draw_list.pop_clip();
    }

    #[inline]
    fn z(&self) -> ZIndex {
        ZIndex::new(self.layer)
    }
}
