use domless_engine::coords::{Rect, Vec2};
use domless_engine::scene::Camera;
use domless_engine::tween::{Ease, Tween, TweenProp};

use crate::context::{KeyboardRequest, UiCtx};
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::transition::{TransitionState, Transitionable};
use crate::widget::{Component, WidgetId};
use crate::widgets::drawer::{Drawer, DrawerConfig, Edge};
use crate::widgets::keyboard::{Keyboard, KeyboardConfig};

pub const PUSH_MS: f32 = 250.0;
pub const REFOCUS_MS: f32 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardDrawerConfig {
    pub enter_label: String,
    /// Gap kept between the focused element and the top of the drawer.
    pub element_padding: f32,
}

impl Default for KeyboardDrawerConfig {
    fn default() -> Self {
        Self { enter_label: "⏎".to_string(), element_padding: 20.0 }
    }
}

struct CameraPush {
    tween: Tween,
    distance: f32,
    applied: f32,
    focus: Option<WidgetId>,
}

/// Bottom drawer holding the on-screen keyboard.
///
/// While it slides in, the camera is pushed up so the element being edited
/// stays visible above it. Every push is accumulated and closing reverses
/// exactly that net shift.
pub struct KeyboardDrawer {
    drawer: Drawer<Keyboard>,
    element_padding: f32,
    push: Option<CameraPush>,
    net_shift: f32,
    /// Close requested mid-opening; carried out once the drawer is open.
    close_pending: bool,
    typed: Vec<UiEvent>,
}

impl KeyboardDrawer {
    pub fn new(config: KeyboardDrawerConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let keyboard_config = KeyboardConfig {
            width: ctx.camera.width,
            enter_label: config.enter_label,
            ..KeyboardConfig::default()
        };
        let mut keyboard = Keyboard::new(keyboard_config, ctx)?;
        keyboard.activate(false);
        let size = keyboard.base().height;
        let drawer = Drawer::new(DrawerConfig::default().edge(Edge::Bottom).size(size), keyboard, ctx)?;
        Ok(Self { drawer, element_padding: config.element_padding, push: None, net_shift: 0.0, close_pending: false, typed: Vec::new() })
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.drawer.size()
    }

    #[inline]
    pub fn drawer(&self) -> &Drawer<Keyboard> {
        &self.drawer
    }

    #[inline]
    pub fn keyboard(&self) -> &Keyboard {
        self.drawer.content()
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        self.drawer.content_mut()
    }

    /// Camera distance currently applied by this drawer.
    #[inline]
    pub fn net_shift(&self) -> f32 {
        self.net_shift
    }

    /// The drawer is sliding.
    pub fn is_busy(&self) -> bool {
        !self.drawer.state().is_settled()
    }

    /// Carries out one request from a text field. Returns a field to focus
    /// right away.
    pub fn handle(&mut self, request: KeyboardRequest, ctx: &mut UiCtx<'_>) -> Option<WidgetId> {
        match request {
            KeyboardRequest::Open { target, max_push } => {
                self.open(target, max_push, ctx);
                None
            }
            KeyboardRequest::Refocus { to, target } => self.refocus(to, target, ctx.camera),
            KeyboardRequest::Close => {
                self.close(ctx.camera);
                None
            }
        }
    }

    /// Slides in, pushing the camera by at most `max_push` so `target`
    /// (screen space) clears the drawer by the element padding. On an open
    /// drawer this only brings `target` into view.
    pub fn open(&mut self, target: Rect, max_push: f32, ctx: &mut UiCtx<'_>) -> bool {
        if !self.drawer.is_closed() {
            self.close_pending = false;
            self.reveal(None, target, REFOCUS_MS, ctx.camera);
            return false;
        }
        if !self.drawer.activate(ctx) {
            return false;
        }
        ctx.camera.reserved_bottom = self.height();
        let below = ctx.camera.height - target.bottom();
        let push = (self.height() + self.element_padding - below).min(max_push);
        if push > 0.0 {
            self.start_push(push, PUSH_MS, None);
        }
        log::debug!("keyboard drawer opening, camera push {push}");
        true
    }

    /// Keeps the drawer open and scrolls `target` into the area above it,
    /// then reports `to` as ready from [`tick`](Self::tick). A closed drawer
    /// hands focus over at once.
    pub fn refocus(&mut self, to: WidgetId, target: Rect, camera: &mut Camera) -> Option<WidgetId> {
        if matches!(self.drawer.state(), TransitionState::Closed | TransitionState::Closing) {
            return Some(to);
        }
        self.reveal(Some(to), target, REFOCUS_MS, camera)
    }

    /// Slides out and reverses the net camera shift. While opening, the
    /// close is deferred until the drawer is open.
    pub fn close(&mut self, camera: &mut Camera) -> bool {
        if self.drawer.state() == TransitionState::Opening {
            log::debug!("keyboard drawer close deferred until open");
            self.close_pending = true;
            return true;
        }
        if !self.drawer.deactivate() {
            return false;
        }
        camera.reserved_bottom = 0.0;
        self.start_push(-self.net_shift, PUSH_MS, None);
        log::debug!("keyboard drawer closing, reversing {}", self.net_shift);
        true
    }

    /// Visible content area between the top of the screen and the drawer.
    fn visible_height(&self, camera: &Camera) -> f32 {
        camera.height - (self.height() + self.element_padding)
    }

    fn reveal(&mut self, focus: Option<WidgetId>, target: Rect, ms: f32, camera: &Camera) -> Option<WidgetId> {
        let visible = self.visible_height(camera);
        let push = if target.top() < 0.0 {
            target.top() - self.element_padding
        } else if target.bottom() > visible {
            target.bottom() - visible
        } else {
            0.0
        };
        if push == 0.0 {
            return focus;
        }
        self.start_push(push, ms, focus);
        None
    }

    fn start_push(&mut self, distance: f32, ms: f32, focus: Option<WidgetId>) {
        if let Some(mut old) = self.push.take() {
            old.tween.cancel();
        }
        let tween = Tween::new(ms).by(TweenProp::ScrollY, distance).ease(Ease::CubicInOut);
        self.push = Some(CameraPush { tween, distance, applied: 0.0, focus });
    }

    /// Advances the slide and camera push. Returns the field whose refocus
    /// push completed this tick.
    pub fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) -> Option<WidgetId> {
        self.drawer.tick(dt, ctx);
        if self.close_pending && self.drawer.is_open() {
            self.close_pending = false;
            self.close(ctx.camera);
        }

        let push = self.push.as_mut()?;
        let step = push.tween.advance(dt);
        let mut moved = step.get(TweenProp::ScrollY);
        push.applied += moved;
        if step.completed {
            moved += push.distance - push.applied;
        }
        ctx.camera.scroll_y += moved;
        self.net_shift += moved;
        if !step.completed {
            return None;
        }
        let done = self.push.take()?;
        if self.drawer.is_closed() || self.drawer.state() == TransitionState::Closing {
            self.net_shift = 0.0;
        }
        done.focus
    }

    /// Routes input to the keys. Pointer events over the drawer stop here.
    pub fn on_event(&mut self, event: &UiEvent, ctx: &mut UiCtx<'_>) -> EventResult {
        let result = self.drawer.on_event(event, Vec2::ZERO, ctx);
        for (value, key) in self.drawer.content_mut().take_pressed() {
            self.typed.push(UiEvent::VirtualKey { value, key });
        }
        result
    }

    /// Keys typed since the last call, as events for the focused field.
    pub fn take_typed(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.typed)
    }

    pub fn paint(&self, painter: &mut Painter<'_>) {
        self.drawer.paint(painter, Vec2::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::UiScene;

    // 800 wide: 67px keys, 10.05px spacing, 375.2px drawer.
    const HEIGHT: f32 = 5.0 * 67.0 + 4.0 * 10.05;

    fn drawer(scene: &mut UiScene) -> KeyboardDrawer {
        KeyboardDrawer::new(KeyboardDrawerConfig::default(), &mut scene.ctx()).unwrap()
    }

    fn run(kd: &mut KeyboardDrawer, scene: &mut UiScene, ms: f32) -> Vec<WidgetId> {
        let mut ready = Vec::new();
        let mut left = ms;
        while left > 0.0 {
            ready.extend(kd.tick(16.0, &mut scene.ctx()));
            left -= 16.0;
        }
        ready
    }

    #[test]
    fn opening_pushes_target_above_the_drawer() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        assert!((kd.height() - HEIGHT).abs() < 1e-3);
        let target = Rect::new(50.0, 400.0, 400.0, 110.0);
        assert!(kd.open(target, 400.0, &mut scene.ctx()));
        run(&mut kd, &mut scene, 600.0);
        let expected = HEIGHT + 20.0 - 90.0;
        assert!((scene.camera.scroll_y - expected).abs() < 1e-3);
        assert!((scene.camera.reserved_bottom - HEIGHT).abs() < 1e-3);
        assert!(kd.drawer().is_open());
    }

    #[test]
    fn push_is_clamped_by_max_push() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        kd.open(Rect::new(0.0, 100.0, 400.0, 480.0), 100.0, &mut scene.ctx());
        run(&mut kd, &mut scene, 600.0);
        assert!((scene.camera.scroll_y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn target_already_clear_is_not_pushed() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        kd.open(Rect::new(0.0, 10.0, 400.0, 100.0), 10.0, &mut scene.ctx());
        run(&mut kd, &mut scene, 600.0);
        assert_eq!(scene.camera.scroll_y, 0.0);
    }

    #[test]
    fn closing_reverses_only_the_net_shift() {
        let mut scene = UiScene::headless(800.0, 600.0);
        scene.camera.scroll_y = 50.0;
        let mut kd = drawer(&mut scene);
        kd.open(Rect::new(50.0, 400.0, 400.0, 110.0), 400.0, &mut scene.ctx());
        run(&mut kd, &mut scene, 600.0);
        assert!(kd.close(&mut scene.camera));
        assert_eq!(scene.camera.reserved_bottom, 0.0);
        run(&mut kd, &mut scene, 600.0);
        assert!(kd.drawer().is_closed());
        assert!((scene.camera.scroll_y - 50.0).abs() < 1e-3);
        assert_eq!(kd.net_shift(), 0.0);
    }

    #[test]
    fn close_while_opening_runs_once_open() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        kd.open(Rect::new(50.0, 400.0, 400.0, 110.0), 400.0, &mut scene.ctx());
        run(&mut kd, &mut scene, 96.0);
        assert_eq!(kd.drawer().state(), TransitionState::Opening);

        assert!(kd.handle(KeyboardRequest::Close, &mut scene.ctx()).is_none());
        assert_eq!(kd.drawer().state(), TransitionState::Opening);
        run(&mut kd, &mut scene, 1200.0);
        assert!(kd.drawer().is_closed());
        assert!(scene.camera.scroll_y.abs() < 1e-3);
        assert_eq!(scene.camera.reserved_bottom, 0.0);
        assert_eq!(kd.net_shift(), 0.0);
    }

    #[test]
    fn reopening_cancels_a_deferred_close() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        let target = Rect::new(0.0, 10.0, 100.0, 50.0);
        kd.open(target, 0.0, &mut scene.ctx());
        run(&mut kd, &mut scene, 96.0);
        kd.close(&mut scene.camera);
        assert!(!kd.open(target, 0.0, &mut scene.ctx()));
        run(&mut kd, &mut scene, 1200.0);
        assert!(kd.drawer().is_open());
    }

    #[test]
    fn refocus_scrolls_then_reports_the_field() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        kd.open(Rect::new(0.0, 50.0, 100.0, 50.0), 0.0, &mut scene.ctx());
        run(&mut kd, &mut scene, 600.0);

        let next = WidgetId::new();
        let below = Rect::new(0.0, 300.0, 100.0, 50.0);
        assert_eq!(kd.refocus(next, below, &mut scene.camera), None);
        let ready = run(&mut kd, &mut scene, 200.0);
        assert_eq!(ready, vec![next]);
        let visible = 600.0 - (HEIGHT + 20.0);
        assert!((scene.camera.scroll_y - (350.0 - visible)).abs() < 1e-3);
    }

    #[test]
    fn refocus_above_the_top_scrolls_back() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        kd.open(Rect::new(0.0, 50.0, 100.0, 50.0), 0.0, &mut scene.ctx());
        run(&mut kd, &mut scene, 600.0);
        let prev = WidgetId::new();
        kd.refocus(prev, Rect::new(0.0, -40.0, 100.0, 50.0), &mut scene.camera);
        run(&mut kd, &mut scene, 200.0);
        assert!((scene.camera.scroll_y - (-60.0)).abs() < 1e-3);
    }

    #[test]
    fn refocus_on_a_closed_drawer_is_immediate() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        let id = WidgetId::new();
        assert_eq!(kd.refocus(id, Rect::new(0.0, 0.0, 1.0, 1.0), &mut scene.camera), Some(id));
    }

    #[test]
    fn taps_become_virtual_keys_and_never_fall_through() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kd = drawer(&mut scene);
        kd.open(Rect::new(0.0, 10.0, 100.0, 50.0), 0.0, &mut scene.ctx());
        run(&mut kd, &mut scene, 600.0);

        let origin = Vec2::new(0.0, 600.0 - HEIGHT);
        let q = kd.keyboard().key_rect("q", origin).unwrap();
        let down = UiEvent::PointerDown { pos: q.center() };
        assert!(kd.on_event(&down, &mut scene.ctx()).is_consumed());
        assert_eq!(kd.take_typed(), vec![UiEvent::VirtualKey { value: "q".into(), key: Some(domless_engine::input::Key::Q) }]);

        let gap = UiEvent::PointerUp { pos: Vec2::new(1.0, 599.0), was_dragged: false };
        assert!(kd.on_event(&gap, &mut scene.ctx()).is_consumed());
        let above = UiEvent::PointerUp { pos: Vec2::new(1.0, 10.0), was_dragged: false };
        assert!(!kd.on_event(&above, &mut scene.ctx()).is_consumed());
    }
}
