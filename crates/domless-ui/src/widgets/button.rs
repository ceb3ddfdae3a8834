use domless_engine::coords::Vec2;
use domless_engine::input::Key;
use domless_engine::text::{TextMeasure, TextStyle};
use domless_engine::tween::{Tween, TweenProp};

use crate::context::UiCtx;
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent, WidgetEvent};
use crate::painter::Painter;
use crate::widget::{Component, Widget, WidgetConfig};

/// Half-period of the fill flash.
pub const FLASH_MS: f32 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
    pub label: String,
    /// Key that presses the button while it is active.
    pub key: Option<Key>,
    /// Value published with the press event. `None` uses the label.
    pub value: Option<String>,
    pub has_fill: bool,
    pub has_outline: bool,
    /// Publish [`WidgetEvent::ButtonPress`] on every press.
    pub emit: bool,
    pub stop_propagation: bool,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 60.0,
            height: 60.0,
            font_size: 24.0,
            label: "OK".to_string(),
            key: None,
            value: None,
            has_fill: true,
            has_outline: true,
            emit: true,
            stop_propagation: true,
        }
    }
}

impl ButtonConfig {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self { label: label.into(), ..Self::default() }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// A labeled, optionally key-bound push button that flashes its fill when
/// pressed.
///
/// # Example
/// ```rust,ignore
/// let mut ok = Button::new(ButtonConfig::labeled("OK").key(Key::ArrowRight), &mut ctx)?
///     .on_press(|value, _key| log::info!("pressed {value}"));
/// ok.activate(false);
/// ```
pub struct Button {
    base: Widget,
    label: String,
    value: String,
    style: TextStyle,
    label_size: Vec2,
    emit: bool,
    stop_propagation: bool,
    flash: Option<Tween>,
    on_press: Option<Box<dyn FnMut(&str, Option<Key>)>>,
    presses: u32,
    pressed: bool,
}

impl Button {
    pub fn new(config: ButtonConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let widget = WidgetConfig {
            x: config.x,
            y: config.y,
            width: config.width,
            height: config.height,
            has_outline: config.has_outline,
            has_fill: config.has_fill,
            fill_alpha: 0.0,
            ..WidgetConfig::default()
        };
        let mut base = Widget::new(widget, ctx.textures)?;
        base.bind_key(config.key);

        let style = TextStyle::default().with_font_size(config.font_size);
        let label_size = ctx.text.measure(&config.label, &style);
        Ok(Self {
            base,
            value: config.value.unwrap_or_else(|| config.label.clone()),
            label: config.label,
            style,
            label_size,
            emit: config.emit,
            stop_propagation: config.stop_propagation,
            flash: None,
            on_press: None,
            presses: 0,
            pressed: false,
        })
    }

    /// Callback invoked with `(value, key)` on every press.
    pub fn on_press(mut self, f: impl FnMut(&str, Option<Key>) + 'static) -> Self {
        self.on_press = Some(Box::new(f));
        self
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>, text: &dyn TextMeasure) {
        self.label = label.into();
        self.label_size = text.measure(&self.label, &self.style);
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn presses(&self) -> u32 {
        self.presses
    }

    /// True once after each press; used by owners that react to their
    /// child buttons.
    pub fn take_pressed(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }

    pub fn activate(&mut self, force: bool) -> bool {
        self.base.activate(force)
    }

    pub fn deactivate(&mut self, hide: bool) -> bool {
        self.base.deactivate(hide, true, false)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.base.is_active()
    }

    /// Runs the press: event, flash and callback.
    pub fn press(&mut self, ctx: &mut UiCtx<'_>) {
        let key = self.base.key();
        if self.emit {
            ctx.events.emit(WidgetEvent::ButtonPress { source: self.base.id(), value: self.value.clone(), key });
        }
        self.flash_fill();
        if let Some(f) = &mut self.on_press {
            f(&self.value, key);
        }
        self.presses += 1;
        self.pressed = true;
        log::debug!("button {} pressed ({:?})", self.base.id(), self.value);
    }

    /// Kills any running flash, blanks the fill and fades it in and back out.
    pub fn flash_fill(&mut self) {
        if !self.base.has_fill {
            return;
        }
        if let Some(mut old) = self.flash.take() {
            old.cancel();
        }
        self.base.fill_alpha = 0.0;
        self.flash = Some(Tween::new(FLASH_MS).by(TweenProp::FillAlpha, 1.0).yoyo(true));
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn consumed(&self) -> EventResult {
        if self.stop_propagation { EventResult::Consumed } else { EventResult::Ignored }
    }
}

impl Component for Button {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base.tick(dt, ctx.textures);
        if let Some(flash) = self.flash.as_mut() {
            let step = flash.advance(dt);
            self.base.fill_alpha = (self.base.fill_alpha + step.get(TweenProp::FillAlpha)).clamp(0.0, 1.0);
            if step.completed {
                self.flash = None;
            }
        }
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        match event {
            UiEvent::PointerDown { pos } if self.base.hit(origin, *pos) => {
                self.press(ctx);
                self.consumed()
            }
            UiEvent::KeyDown { key, .. } if self.base.bound_key() == Some(*key) => {
                self.press(ctx);
                self.consumed()
            }
            _ => EventResult::Ignored,
        }
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        self.base.paint(painter, origin);
        if self.base.alpha <= 0.0 || self.base.is_destroyed() {
            return;
        }
        let center = self.base.rect(origin).center();
        let at = Vec2::new(center.x - self.label_size.x / 2.0, center.y - self.label_size.y / 2.0);
        painter.text(&self.label, &self.style, at, self.base.alpha);
    }

    fn destroy(&mut self) {
        if let Some(mut flash) = self.flash.take() {
            flash.cancel();
        }
        self.on_press = None;
        self.base.destroy();
    }
}
