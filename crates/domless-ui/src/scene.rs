use std::cmp::Reverse;

use domless_engine::coords::{Vec2, Viewport};
use domless_engine::input::{
    InputEvent,
    InputFrame,
    InputState,
    KeyState,
    MouseButton,
    MouseButtonState,
    PointerButtonEvent,
    PointerMoveEvent,
};
use domless_engine::scene::{Camera, DepthStack, DrawList, PrimitiveCache};
use domless_engine::text::{MonospaceMetrics, TextMeasure};
use domless_engine::time::{FrameClock, FrameTime};

use crate::context::{KeyboardRequest, UiCtx};
use crate::error::WidgetError;
use crate::event::{EventQueue, EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Component, WidgetId};
use crate::widgets::keyboard_drawer::{KeyboardDrawer, KeyboardDrawerConfig};

/// Pixels per wheel "line".
pub const WHEEL_LINE_PX: f32 = 40.0;

// ── UiScene ───────────────────────────────────────────────────────────────

/// Top-level coordinator that owns the resources widgets share.
///
/// The host keeps its root components and passes them to [`dispatch`],
/// [`tick`] and [`paint`] each frame. The scene translates platform input
/// into [`UiEvent`]s, routes them top-most first, and carries out the
/// keyboard requests text fields leave behind.
///
/// [`dispatch`]: UiScene::dispatch
/// [`tick`]: UiScene::tick
/// [`paint`]: UiScene::paint
pub struct UiScene {
    pub camera: Camera,
    pub textures: PrimitiveCache,
    pub depth: DepthStack,
    /// Text metrics; public so callers can pass `scene.text.as_ref()` to
    /// widget methods that lay text out.
    pub text: Box<dyn TextMeasure>,
    /// Published widget events, drained by the host.
    pub events: EventQueue,
    pub input: InputState,
    pub frame: InputFrame,
    /// Requests queued by text fields during the current dispatch.
    pub keyboard_requests: Vec<KeyboardRequest>,
    /// The on-screen keyboard, if the host installed one.
    pub keyboard: Option<KeyboardDrawer>,
    /// Draw list populated by the most recent [`paint`](Self::paint).
    pub draw_list: DrawList,
}

impl UiScene {
    pub fn new(viewport: Viewport, text: Box<dyn TextMeasure>) -> Self {
        Self {
            camera: Camera::new(viewport),
            textures: PrimitiveCache::new(),
            depth: DepthStack::new(),
            text,
            events: EventQueue::new(),
            input: InputState::default(),
            frame: InputFrame::default(),
            keyboard_requests: Vec::new(),
            keyboard: None,
            draw_list: DrawList::new(),
        }
    }

    /// A scene with fixed-advance text metrics and no keyboard.
    pub fn headless(width: f32, height: f32) -> Self {
        Self::new(Viewport::new(width, height), Box::new(MonospaceMetrics::default()))
    }

    /// Installs the on-screen keyboard drawer along the bottom edge.
    pub fn with_keyboard(mut self, config: KeyboardDrawerConfig) -> Result<Self, WidgetError> {
        let drawer = KeyboardDrawer::new(config, &mut self.ctx())?;
        self.keyboard = Some(drawer);
        Ok(self)
    }

    /// Borrows the shared resources for one widget call.
    pub fn ctx(&mut self) -> UiCtx<'_> {
        self.split().0
    }

    fn split(&mut self) -> (UiCtx<'_>, Option<&mut KeyboardDrawer>) {
        let keyboard_busy = self.keyboard.as_ref().is_some_and(KeyboardDrawer::is_busy);
        let ctx = UiCtx {
            camera: &mut self.camera,
            textures: &mut self.textures,
            depth: &mut self.depth,
            text: self.text.as_ref(),
            events: &mut self.events,
            input: &self.input,
            keyboard: &mut self.keyboard_requests,
            keyboard_busy,
        };
        (ctx, self.keyboard.as_mut())
    }

    // ── input ─────────────────────────────────────────────────────────────

    /// Feeds one platform event through the widget tree.
    ///
    /// The keyboard drawer sees events first; whatever it does not consume
    /// goes to `roots` in descending depth order until one consumes it.
    pub fn dispatch(&mut self, event: InputEvent, roots: &mut [&mut dyn Component]) -> EventResult {
        let before = self.input.pointer_pos;
        self.input.apply_event(&mut self.frame, event.clone());
        let Some(ui_event) = self.translate(&event, before) else {
            return EventResult::Ignored;
        };
        log::trace!("dispatch {ui_event:?}");

        let mut result = {
            let (mut ctx, keyboard) = self.split();
            match keyboard {
                Some(kd) => kd.on_event(&ui_event, &mut ctx),
                None => EventResult::Ignored,
            }
        };
        if !result.is_consumed() {
            result = self.route(&ui_event, roots);
        }

        let typed = self.keyboard.as_mut().map(KeyboardDrawer::take_typed).unwrap_or_default();
        for key in typed {
            self.route(&key, roots);
        }
        self.process_keyboard_requests(roots);
        result
    }

    fn translate(&self, event: &InputEvent, before: Option<(f32, f32)>) -> Option<UiEvent> {
        match event {
            InputEvent::PointerButton(PointerButtonEvent { button: MouseButton::Left, state, x, y, .. }) => {
                let pos = Vec2::new(*x, *y);
                Some(match state {
                    MouseButtonState::Pressed => UiEvent::PointerDown { pos },
                    MouseButtonState::Released => UiEvent::PointerUp { pos, was_dragged: self.input.was_dragged() },
                })
            }
            InputEvent::PointerMoved(PointerMoveEvent { x, y }) if self.input.is_dragging => {
                let (px, py) = before.unwrap_or((*x, *y));
                Some(UiEvent::Drag { pos: Vec2::new(*x, *y), delta: Vec2::new(x - px, y - py) })
            }
            InputEvent::Key { key, state: KeyState::Pressed, modifiers, .. } => {
                Some(UiEvent::KeyDown { key: *key, modifiers: *modifiers })
            }
            InputEvent::Text(text) => Some(UiEvent::TextInput { text: text.text.clone() }),
            // Platform wheels report "up" as positive.
            InputEvent::MouseWheel { delta, .. } => Some(UiEvent::Wheel { delta: -delta.pixels_y(WHEEL_LINE_PX) }),
            _ => None,
        }
    }

    fn route(&mut self, event: &UiEvent, roots: &mut [&mut dyn Component]) -> EventResult {
        let mut order: Vec<usize> = (0..roots.len()).collect();
        order.sort_by_key(|&i| Reverse(roots[i].base().depth));
        let scroll_y = self.camera.scroll_y;
        let mut ctx = self.ctx();
        for i in order {
            let root = &mut *roots[i];
            let origin = Vec2::new(0.0, -scroll_y * root.base().scroll_factor);
            if root.on_event(event, origin, &mut ctx).is_consumed() {
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }

    fn process_keyboard_requests(&mut self, roots: &mut [&mut dyn Component]) {
        while !self.keyboard_requests.is_empty() {
            let requests = std::mem::take(&mut self.keyboard_requests);
            for request in requests {
                let focus = {
                    let (mut ctx, keyboard) = self.split();
                    match (keyboard, request) {
                        (Some(kd), request) => kd.handle(request, &mut ctx),
                        (None, KeyboardRequest::Refocus { to, .. }) => Some(to),
                        (None, _) => None,
                    }
                };
                if let Some(id) = focus {
                    self.focus(id, roots);
                }
            }
        }
    }

    fn focus(&mut self, id: WidgetId, roots: &mut [&mut dyn Component]) {
        log::debug!("focusing field {id}");
        self.route(&UiEvent::FocusField { id }, roots);
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Advances animations and input timers by `dt` milliseconds.
    pub fn tick(&mut self, dt: f32, roots: &mut [&mut dyn Component]) {
        self.input.advance(dt);
        let focus = {
            let (mut ctx, keyboard) = self.split();
            keyboard.and_then(|kd| kd.tick(dt, &mut ctx))
        };
        if let Some(id) = focus {
            self.focus(id, roots);
        }
        let mut ctx = self.ctx();
        for root in roots.iter_mut() {
            root.tick(dt, &mut ctx);
        }
        self.process_keyboard_requests(roots);
        self.frame.clear();
    }

    /// Ticks the clock and runs one [`tick`](Self::tick) with its delta.
    pub fn advance(&mut self, clock: &mut FrameClock, roots: &mut [&mut dyn Component]) -> FrameTime {
        let frame = clock.tick();
        self.tick(frame.dt_ms(), roots);
        frame
    }

    /// Paints `roots` and the keyboard drawer into the scene's draw list.
    pub fn paint(&mut self, roots: &mut [&mut dyn Component]) -> &DrawList {
        self.draw_list.clear();
        let scroll_y = self.camera.scroll_y;
        {
            let mut painter = Painter::new(&mut self.draw_list);
            for root in roots.iter() {
                let origin = Vec2::new(0.0, -scroll_y * root.base().scroll_factor);
                root.paint(&mut painter, origin);
            }
            if let Some(kd) = &self.keyboard {
                kd.paint(&mut painter);
            }
        }
        &self.draw_list
    }
}
