//! Vertical camera scrolling with a viewport-fixed scrollbar.

use domless_engine::coords::Vec2;
use domless_engine::input::Key;
use domless_engine::paint::Color;
use domless_engine::scene::Camera;

use crate::context::UiCtx;
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Component, Widget, WidgetConfig};

pub const SCROLLBAR_WIDTH: f32 = 5.0;
pub const SCROLLBAR_RADIUS: f32 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScrollableConfig {
    pub min_scroll: f32,
    pub max_scroll: f32,
    /// Distance per ArrowUp / ArrowDown.
    pub key_step: f32,
    /// Factor applied to wheel deltas inside the range.
    pub wheel_damping: f32,
}

impl Default for ScrollableConfig {
    fn default() -> Self {
        Self { min_scroll: 0.0, max_scroll: 0.0, key_step: 50.0, wheel_damping: 0.5 }
    }
}

impl ScrollableConfig {
    pub fn range(min_scroll: f32, max_scroll: f32) -> Self {
        Self { min_scroll, max_scroll, ..Self::default() }
    }
}

/// Scrolls the camera between `min_scroll` and `max_scroll` on wheel, drag
/// and arrow keys.
///
/// While a bottom drawer reserves part of the viewport the upper bound grows
/// by the reserved height. The scrollbar is the component's own widget,
/// fixed to the viewport and kept above everything else.
pub struct Scrollable {
    base: Widget,
    min_scroll: f32,
    max_scroll: f32,
    key_step: f32,
    wheel_damping: f32,
}

impl Scrollable {
    pub fn new(config: ScrollableConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let scrollable_height = ctx.camera.height - config.min_scroll + config.max_scroll;
        let bar_height = ctx.camera.height / scrollable_height * ctx.camera.height - SCROLLBAR_RADIUS;
        let mut base = Widget::new(
            WidgetConfig::default()
                .at(ctx.camera.width - SCROLLBAR_WIDTH, 0.0)
                .sized(SCROLLBAR_WIDTH, bar_height.max(1.0))
                .radius(SCROLLBAR_RADIUS)
                .outline(false)
                .fill(true),
            ctx.textures,
        )?;
        base.scroll_factor = 0.0;
        base.depth = ctx.depth.bring_to_top();
        let mut scrollable = Self {
            base,
            min_scroll: config.min_scroll,
            max_scroll: config.max_scroll,
            key_step: config.key_step,
            wheel_damping: config.wheel_damping,
        };
        scrollable.reposition(ctx.camera);
        Ok(scrollable)
    }

    /// Total content height the camera travels over.
    pub fn scrollable_height(&self, camera: &Camera) -> f32 {
        camera.height - self.min_scroll + self.max_scroll
    }

    #[inline]
    pub fn scrollbar(&self) -> &Widget {
        &self.base
    }

    /// Moves the camera by `delta`, snapping to the nearest bound when the
    /// move would leave the range. `damping` scales moves inside the range.
    pub fn scroll_by(&mut self, delta: f32, damping: f32, camera: &mut Camera) {
        let max = self.max_scroll + camera.reserved_bottom;
        let next = camera.scroll_y + delta;
        camera.scroll_y = if next < self.min_scroll {
            self.min_scroll
        } else if next > max {
            max
        } else {
            camera.scroll_y + delta * damping
        };
        self.reposition(camera);
    }

    fn reposition(&mut self, camera: &Camera) {
        let percent = (camera.scroll_y - self.min_scroll) / self.scrollable_height(camera);
        self.base.x = camera.width - SCROLLBAR_WIDTH;
        self.base.y = percent * camera.height;
    }
}

impl Component for Scrollable {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        if self.base.depth < ctx.depth.top() {
            self.base.depth = ctx.depth.bring_to_top();
        }
        self.reposition(ctx.camera);
        self.base.tick(dt, ctx.textures);
    }

    fn on_event(&mut self, event: &UiEvent, _origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        match event {
            UiEvent::Wheel { delta } => {
                self.scroll_by(*delta, self.wheel_damping, ctx.camera);
                EventResult::Consumed
            }
            UiEvent::Drag { delta, .. } => {
                self.scroll_by(-delta.y, 1.0, ctx.camera);
                EventResult::Consumed
            }
            UiEvent::KeyDown { key: Key::ArrowDown, .. } => {
                self.scroll_by(self.key_step, 1.0, ctx.camera);
                EventResult::Ignored
            }
            UiEvent::KeyDown { key: Key::ArrowUp, .. } => {
                self.scroll_by(-self.key_step, 1.0, ctx.camera);
                EventResult::Ignored
            }
            _ => EventResult::Ignored,
        }
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        let prev = painter.raise_to(self.base.depth);
        painter.rect(self.base.rect(origin), SCROLLBAR_RADIUS, Color::WHITE.with_alpha(self.base.alpha));
        painter.set_layer(prev);
    }
}

#[cfg(test)]
mod tests {
    use domless_engine::input::Modifiers;

    use super::*;
    use crate::scene::UiScene;

    fn scrollable(scene: &mut UiScene) -> Scrollable {
        Scrollable::new(ScrollableConfig::range(0.0, 1000.0), &mut scene.ctx()).unwrap()
    }

    fn wheel(s: &mut Scrollable, scene: &mut UiScene, delta: f32) {
        s.on_event(&UiEvent::Wheel { delta }, Vec2::ZERO, &mut scene.ctx());
    }

    #[test]
    fn wheel_is_damped_inside_the_range() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut s = scrollable(&mut scene);
        wheel(&mut s, &mut scene, 100.0);
        assert_eq!(scene.camera.scroll_y, 50.0);
    }

    #[test]
    fn leaving_the_range_snaps_to_the_bound() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut s = scrollable(&mut scene);
        wheel(&mut s, &mut scene, -100.0);
        assert_eq!(scene.camera.scroll_y, 0.0);
        wheel(&mut s, &mut scene, 5000.0);
        assert_eq!(scene.camera.scroll_y, 1000.0);
    }

    #[test]
    fn reserved_bottom_extends_the_range() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut s = scrollable(&mut scene);
        scene.camera.reserved_bottom = 300.0;
        wheel(&mut s, &mut scene, 5000.0);
        assert_eq!(scene.camera.scroll_y, 1300.0);
    }

    #[test]
    fn arrows_step_and_drag_follows_the_pointer() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut s = scrollable(&mut scene);
        let down = UiEvent::KeyDown { key: Key::ArrowDown, modifiers: Modifiers::default() };
        let result = s.on_event(&down, Vec2::ZERO, &mut scene.ctx());
        assert!(!result.is_consumed());
        assert_eq!(scene.camera.scroll_y, 50.0);

        let drag = UiEvent::Drag { pos: Vec2::new(10.0, 10.0), delta: Vec2::new(0.0, -40.0) };
        assert!(s.on_event(&drag, Vec2::ZERO, &mut scene.ctx()).is_consumed());
        assert_eq!(scene.camera.scroll_y, 90.0);
    }

    #[test]
    fn scrollbar_size_and_position_follow_the_camera() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut s = scrollable(&mut scene);
        assert_eq!(s.scrollbar().height, 600.0 / 1600.0 * 600.0 - 3.0);
        assert_eq!(s.scrollbar().x, 795.0);
        scene.camera.scroll_y = 800.0;
        s.tick(16.0, &mut scene.ctx());
        assert_eq!(s.scrollbar().y, 300.0);
    }

    #[test]
    fn scrollbar_stays_on_top() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut s = scrollable(&mut scene);
        let raised = scene.depth.bring_to_top();
        s.tick(16.0, &mut scene.ctx());
        assert!(s.scrollbar().depth > raised);
    }
}
