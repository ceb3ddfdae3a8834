use domless_engine::coords::{Rect, Vec2};
use domless_engine::input::Key;
use domless_engine::paint::Color;
use domless_engine::tween::Ease;

use crate::context::UiCtx;
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent, WidgetEvent};
use crate::painter::Painter;
use crate::transition::{Transition, TransitionState, Transitionable};
use crate::widget::{Component, Widget, WidgetConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    /// Dimmer opacity once open.
    pub dim_alpha: f32,
    pub duration_ms: f32,
    /// Close on a tap or Space that the content does not consume.
    pub close_on_tap: bool,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self { dim_alpha: 0.8, duration_ms: 250.0, close_on_tap: true }
    }
}

/// Full-screen dimmer with content on top.
///
/// The dimmer fades in through a [`Transition`] whose offset is its opacity.
/// Content shows once the fade completes and hides as soon as closing starts.
/// While not closed the modal swallows all input and reports the host as
/// paused.
pub struct Modal<C: Component> {
    base: Widget,
    transition: Transition,
    close_on_tap: bool,
    content: C,
}

impl<C: Component> Modal<C> {
    pub fn new(config: ModalConfig, mut content: C, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let mut base = Widget::new(
            WidgetConfig::default().sized(ctx.camera.width, ctx.camera.height).outline(false),
            ctx.textures,
        )?;
        base.scroll_factor = 0.0;
        content.base_mut().alpha = 0.0;
        Ok(Self {
            base,
            transition: Transition::new(config.dim_alpha.clamp(0.0, 1.0), config.duration_ms, Ease::Linear),
            close_on_tap: config.close_on_tap,
            content,
        })
    }

    #[inline]
    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// Current dimmer opacity.
    #[inline]
    pub fn dim_alpha(&self) -> f32 {
        self.transition.offset()
    }

    /// The host should hold its own simulation while this is set.
    pub fn is_paused(&self) -> bool {
        !self.transition.is_closed()
    }

    /// Raises the modal above everything and starts the fade.
    pub fn activate(&mut self, ctx: &mut UiCtx<'_>) -> bool {
        if !self.transition.activate() {
            return false;
        }
        self.base.depth = ctx.depth.bring_to_top();
        log::debug!("modal {} opening", self.base.id());
        true
    }

    pub fn deactivate(&mut self) -> bool {
        if !self.transition.deactivate() {
            return false;
        }
        self.base.deactivate(false, true, false);
        self.content.base_mut().alpha = 0.0;
        log::debug!("modal {} closing", self.base.id());
        true
    }

    fn screen(&self, origin: Vec2) -> Rect {
        self.base.rect(origin)
    }
}

impl<C: Component> Transitionable for Modal<C> {
    fn transition(&self) -> &Transition {
        &self.transition
    }
}

impl<C: Component> Component for Modal<C> {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base.width = ctx.camera.width;
        self.base.height = ctx.camera.height;
        self.base.tick(dt, ctx.textures);
        match self.transition.advance(dt) {
            Some(TransitionState::Open) => {
                self.base.activate(false);
                self.content.base_mut().alpha = 1.0;
            }
            Some(TransitionState::Closed) => {
                ctx.events.emit(WidgetEvent::ModalClosed { modal: self.base.id() });
                log::debug!("modal {} closed", self.base.id());
            }
            _ => {}
        }
        self.content.tick(dt, ctx);
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        if self.transition.is_closed() || self.base.is_destroyed() {
            return EventResult::Ignored;
        }
        if !self.base.is_active() {
            return EventResult::Consumed;
        }
        if self.content.on_event(event, self.base.child_origin(origin), ctx).is_consumed() {
            return EventResult::Consumed;
        }
        let dismiss = match event {
            UiEvent::PointerUp { was_dragged, .. } => !was_dragged,
            UiEvent::KeyDown { key, .. } => *key == Key::Space,
            _ => false,
        };
        if dismiss && self.close_on_tap {
            self.deactivate();
        }
        EventResult::Consumed
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.transition.is_closed() || self.base.is_destroyed() {
            return;
        }
        let prev = painter.raise_to(self.base.depth);
        painter.rect(self.screen(origin), 0.0, Color::BLACK.with_alpha(self.dim_alpha()));
        if self.content.base().alpha > 0.0 {
            self.content.paint(painter, self.base.child_origin(origin));
        }
        painter.set_layer(prev);
    }

    fn destroy(&mut self) {
        self.transition.cancel();
        self.content.destroy();
        self.base.destroy();
    }
}
