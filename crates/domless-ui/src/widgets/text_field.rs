use domless_engine::coords::{Rect, Vec2};
use domless_engine::input::{Key, Modifiers};
use domless_engine::paint::Color;
use domless_engine::text::{TextMeasure, TextStyle};
use domless_engine::tween::{Repeat, Tween, TweenProp};

use crate::context::{KeyboardRequest, UiCtx};
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent, WidgetEvent};
use crate::focus::{FocusMove, Focusable};
use crate::painter::Painter;
use crate::text_flow::TextFlow;
use crate::widget::{Component, Widget, WidgetId};
use crate::widgets::text_display::{TextDisplay, TextDisplayConfig};

/// Cursor blink half-period.
pub const CURSOR_BLINK_MS: f32 = 250.0;

const CURSOR_GLYPH: char = '_';

/// Where typed characters come from while the field is active.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum EditMode {
    /// On-screen keyboard drawer; activation asks the scene to open it.
    #[default]
    Drawer,
    /// Physical keyboard only.
    Physical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextFieldConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub style: TextStyle,
    /// Grey hint shown while the field is empty and inactive.
    pub help_text: String,
    pub edit_mode: EditMode,
    /// Enter hands focus on instead of inserting a newline.
    pub submit_on_enter: bool,
}

impl Default for TextFieldConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 400.0,
            height: 200.0,
            text: String::new(),
            style: TextStyle::default(),
            help_text: "This is the help text".to_string(),
            edit_mode: EditMode::Drawer,
            submit_on_enter: false,
        }
    }
}

impl TextFieldConfig {
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

    pub fn help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    pub fn physical(mut self) -> Self {
        self.edit_mode = EditMode::Physical;
        self
    }
}

/// Editable, paginated text area with a blinking cursor.
///
/// A tap inside activates the field, a tap elsewhere deactivates it. In
/// [`EditMode::Drawer`] activation requests the on-screen keyboard and
/// deactivation either closes it or hands it to the next field.
pub struct TextField {
    display: TextDisplay,
    help_text: String,
    help_style: TextStyle,
    edit_mode: EditMode,
    submit_on_enter: bool,
    blink: Option<Tween>,
    cursor_alpha: f32,
    in_form: bool,
    focus_move: Option<FocusMove>,
}

impl TextField {
    pub fn new(config: TextFieldConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let help_style = config.style.clone().with_color(Color::GRAY);
        let display_config = TextDisplayConfig {
            x: config.x,
            y: config.y,
            width: config.width,
            height: config.height,
            text: config.text,
            style: config.style,
        };
        let mut display = TextDisplay::build(display_config, Some(CURSOR_GLYPH), ctx)?;
        display.base_mut().set_interactive(true);
        Ok(Self {
            display,
            help_text: config.help_text,
            help_style,
            edit_mode: config.edit_mode,
            submit_on_enter: config.submit_on_enter,
            blink: None,
            cursor_alpha: 0.0,
            in_form: false,
            focus_move: None,
        })
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn text(&self) -> &str {
        self.display.text()
    }

    pub fn set_text(&mut self, text: &str, measure: &dyn TextMeasure) {
        self.display.set_text(text, measure);
    }

    /// Appends without moving the view.
    pub fn append(&mut self, fragment: &str, measure: &dyn TextMeasure) {
        self.display.append(fragment, measure);
    }

    pub fn clear_text(&mut self, measure: &dyn TextMeasure) {
        self.display.clear(measure);
    }

    #[inline]
    pub fn display(&self) -> &TextDisplay {
        &self.display
    }

    #[inline]
    pub fn flow(&self) -> &TextFlow {
        self.display.flow()
    }

    #[inline]
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    /// 1 while the hint is showing, 0 otherwise.
    pub fn help_alpha(&self) -> f32 {
        if !self.is_active() && self.text().is_empty() { 1.0 } else { 0.0 }
    }

    #[inline]
    pub fn cursor_alpha(&self) -> f32 {
        self.cursor_alpha
    }

    #[inline]
    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.display.base().is_active()
    }

    pub(crate) fn set_in_form(&mut self, in_form: bool) {
        self.in_form = in_form;
    }

    // ── focus ─────────────────────────────────────────────────────────────

    /// Starts editing and, in drawer mode, asks for the keyboard.
    pub fn activate(&mut self, origin: Vec2, ctx: &mut UiCtx<'_>) -> bool {
        self.focus(origin, ctx, true)
    }

    /// Stops editing. With `to`, the keyboard stays open and scrolls to the
    /// `(field, screen rect)` that takes over; otherwise it closes.
    pub fn deactivate(&mut self, to: Option<(WidgetId, Rect)>, ctx: &mut UiCtx<'_>) -> bool {
        if !self.display.base_mut().deactivate(false, false, false) {
            return false;
        }
        self.stop_blink();
        self.focus_move = None;
        match to {
            Some((id, target)) => ctx.keyboard.push(KeyboardRequest::Refocus { to: id, target }),
            None if self.edit_mode == EditMode::Drawer => ctx.keyboard.push(KeyboardRequest::Close),
            None => {}
        }
        ctx.events.emit(WidgetEvent::FieldDeactivated { field: self.id() });
        log::debug!("text field {} deactivated", self.id());
        true
    }

    fn focus(&mut self, origin: Vec2, ctx: &mut UiCtx<'_>, open_keyboard: bool) -> bool {
        if !self.display.base_mut().activate(false) {
            return false;
        }
        self.start_blink();
        if open_keyboard && self.edit_mode == EditMode::Drawer {
            let target = self.bounds(origin);
            ctx.keyboard.push(KeyboardRequest::Open { target, max_push: target.top().max(0.0) });
        }
        ctx.events.emit(WidgetEvent::FieldActivated { field: self.id() });
        log::debug!("text field {} activated", self.id());
        true
    }

    /// Hands focus on: to the form's neighbour when inside a form,
    /// otherwise just deactivates.
    pub fn submit(&mut self, reverse: bool, ctx: &mut UiCtx<'_>) {
        if self.in_form {
            self.focus_move = Some(FocusMove::from_reverse(reverse));
        } else {
            self.deactivate(None, ctx);
        }
    }

    // ── editing ───────────────────────────────────────────────────────────

    fn insert(&mut self, text: &str, ctx: &mut UiCtx<'_>) {
        if text.is_empty() {
            return;
        }
        self.display.append(text, ctx.text);
        self.display.jump_to_last_page();
    }

    fn backspace(&mut self, ctx: &mut UiCtx<'_>) {
        if self.display.backspace(ctx.text) {
            self.display.jump_to_last_page();
        }
    }

    fn enter(&mut self, ctx: &mut UiCtx<'_>) {
        if self.submit_on_enter {
            self.submit(false, ctx);
        } else {
            self.insert("\n", ctx);
        }
    }

    fn copy_to_clipboard(&self) {
        if let Ok(mut cb) = arboard::Clipboard::new() {
            let _ = cb.set_text(self.text().to_string());
        }
    }

    fn paste_from_clipboard(&mut self, ctx: &mut UiCtx<'_>) {
        match arboard::Clipboard::new().and_then(|mut cb| cb.get_text()) {
            Ok(text) => {
                let text: String = text.chars().filter(|c| !c.is_control() || *c == '\n').collect();
                self.insert(&text, ctx);
            }
            Err(err) => log::debug!("clipboard unavailable: {err}"),
        }
    }

    fn on_key(&mut self, key: Key, modifiers: Modifiers, ctx: &mut UiCtx<'_>) -> EventResult {
        match key {
            Key::Backspace => self.backspace(ctx),
            Key::Enter => self.enter(ctx),
            Key::Tab => self.submit(modifiers.shift || ctx.input.shift_down(), ctx),
            Key::C if modifiers.ctrl => self.copy_to_clipboard(),
            Key::V if modifiers.ctrl => self.paste_from_clipboard(ctx),
            _ => return EventResult::Ignored,
        }
        EventResult::Consumed
    }

    fn on_pointer_up(&mut self, pos: Vec2, was_dragged: bool, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        if was_dragged || ctx.keyboard_busy {
            return EventResult::Ignored;
        }
        let base = self.display.base();
        let inside = base.is_interactive() && self.bounds(origin).contains(pos);
        if inside {
            if !self.is_active() {
                self.activate(origin, ctx);
            }
            return EventResult::Consumed;
        }
        if self.is_active() {
            self.deactivate(None, ctx);
        }
        EventResult::Ignored
    }

    // ── blink ─────────────────────────────────────────────────────────────

    fn start_blink(&mut self) {
        self.cursor_alpha = 1.0;
        self.blink = Some(
            Tween::new(CURSOR_BLINK_MS)
                .by(TweenProp::Alpha, -1.0)
                .yoyo(true)
                .repeat(Repeat::Forever),
        );
    }

    fn stop_blink(&mut self) {
        if let Some(mut blink) = self.blink.take() {
            blink.cancel();
        }
        self.cursor_alpha = 0.0;
    }
}

impl Component for TextField {
    fn base(&self) -> &Widget {
        self.display.base()
    }

    fn base_mut(&mut self) -> &mut Widget {
        self.display.base_mut()
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.display.tick(dt, ctx);
        if let Some(blink) = self.blink.as_mut() {
            let step = blink.advance(dt);
            self.cursor_alpha = (self.cursor_alpha + step.get(TweenProp::Alpha)).clamp(0.0, 1.0);
        }
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        if self.display.base().is_destroyed() {
            return EventResult::Ignored;
        }
        let active = self.is_active();
        match event {
            UiEvent::PointerUp { pos, was_dragged } => self.on_pointer_up(*pos, *was_dragged, origin, ctx),
            UiEvent::FocusField { id } if *id == self.id() => {
                self.focus(origin, ctx, false);
                EventResult::Consumed
            }
            UiEvent::KeyDown { key, modifiers } if active => self
                .on_key(*key, *modifiers, ctx)
                .or_else(|| self.display.on_event(event, origin, ctx)),
            UiEvent::TextInput { text } if active => {
                let text: String = text.chars().filter(|c| !c.is_control()).collect();
                self.insert(&text, ctx);
                EventResult::Consumed
            }
            UiEvent::VirtualKey { value, key } if active => {
                match key {
                    Some(Key::Backspace) => self.backspace(ctx),
                    Some(Key::Enter) => self.enter(ctx),
                    _ => self.insert(value, ctx),
                }
                EventResult::Consumed
            }
            _ => self.display.on_event(event, origin, ctx),
        }
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.display.base().is_destroyed() {
            return;
        }
        self.display.paint(painter, origin);

        let rect = self.bounds(origin);
        let alpha = self.display.base().alpha;
        if self.is_active() && self.cursor_alpha > 0.0 {
            let at = rect.origin + self.flow().cursor_position();
            painter.push_clip(rect);
            painter.text(CURSOR_GLYPH.encode_utf8(&mut [0; 4]), self.flow().style(), at, alpha * self.cursor_alpha);
            painter.pop_clip();
        }
        if self.help_alpha() > 0.0 {
            let pad = self.help_style.padding;
            let at = Vec2::new(rect.origin.x + pad.left, rect.origin.y + pad.top);
            painter.text(&self.help_text, &self.help_style, at, alpha);
        }
    }

    fn destroy(&mut self) {
        self.stop_blink();
        self.display.destroy();
    }
}

impl Focusable for TextField {
    fn is_focused(&self) -> bool {
        self.is_active()
    }

    fn take_focus_move(&mut self) -> Option<FocusMove> {
        self.focus_move.take()
    }
}
