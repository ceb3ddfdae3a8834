use domless_engine::coords::Vec2;
use domless_engine::input::Key;
use domless_engine::text::{TextMeasure, TextStyle};

use crate::context::UiCtx;
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::text_flow::{PageDirection, TextFlow};
use crate::widget::{Component, Widget, WidgetConfig};
use crate::widgets::button::{Button, ButtonConfig};

const PAGE_BUTTON_SIZE: f32 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextDisplayConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub style: TextStyle,
}

impl Default for TextDisplayConfig {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, width: 400.0, height: 200.0, text: String::new(), style: TextStyle::default() }
    }
}

impl TextDisplayConfig {
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

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Bordered, clipped, paginated text box with ▲/▼ page buttons.
///
/// Each page button is shown and active only while content lies beyond the
/// view in its direction.
pub struct TextDisplay {
    base: Widget,
    flow: TextFlow,
    up: Button,
    down: Button,
    more_below: bool,
    beyond_end: bool,
    last_turn: Option<PageDirection>,
}

impl TextDisplay {
    pub fn new(config: TextDisplayConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        Self::build(config, None, ctx)
    }

    /// Builds a display whose text flow reserves room for `cursor_glyph`.
    pub(crate) fn build(
        config: TextDisplayConfig,
        cursor_glyph: Option<char>,
        ctx: &mut UiCtx<'_>,
    ) -> Result<Self, WidgetError> {
        let base = Widget::new(
            WidgetConfig::default().at(config.x, config.y).sized(config.width, config.height),
            ctx.textures,
        )?;
        let flow = TextFlow::new(&config.text, config.style, config.width, config.height, cursor_glyph, ctx.text);
        let page_button = |label: &str, key: Key, y: f32| ButtonConfig {
            x: config.width - 13.0,
            y,
            width: PAGE_BUTTON_SIZE,
            height: PAGE_BUTTON_SIZE,
            label: label.to_string(),
            key: Some(key),
            has_fill: false,
            has_outline: false,
            emit: false,
            ..ButtonConfig::default()
        };
        let up = Button::new(page_button("⮭", Key::ArrowUp, -7.0), ctx)?;
        let down = Button::new(page_button("⮯", Key::ArrowDown, config.height - 22.0), ctx)?;

        let mut display = Self { base, flow, up, down, more_below: false, beyond_end: false, last_turn: None };
        display.sync_page_buttons();
        Ok(display)
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn text(&self) -> &str {
        self.flow.content()
    }

    #[inline]
    pub fn flow(&self) -> &TextFlow {
        &self.flow
    }

    #[inline]
    pub fn flow_mut(&mut self) -> &mut TextFlow {
        &mut self.flow
    }

    pub fn set_text(&mut self, text: &str, measure: &dyn TextMeasure) {
        self.flow.set_text(text, measure);
        self.sync_page_buttons();
    }

    pub fn append(&mut self, fragment: &str, measure: &dyn TextMeasure) {
        self.flow.append(fragment, measure);
        self.sync_page_buttons();
    }

    pub fn backspace(&mut self, measure: &dyn TextMeasure) -> bool {
        let removed = self.flow.backspace(measure);
        self.sync_page_buttons();
        removed
    }

    pub fn clear(&mut self, measure: &dyn TextMeasure) {
        self.flow.clear(measure);
        self.sync_page_buttons();
    }

    // ── paging ────────────────────────────────────────────────────────────

    pub fn page_up(&mut self) -> bool {
        self.flow.page_up()
    }

    pub fn page_down(&mut self) -> bool {
        self.flow.page_down()
    }

    pub fn jump_to_last_page(&mut self) {
        self.flow.jump_to_last_page();
        self.sync_page_buttons();
    }

    #[inline]
    pub fn up_button(&self) -> &Button {
        &self.up
    }

    #[inline]
    pub fn down_button(&self) -> &Button {
        &self.down
    }

    pub(crate) fn down_button_mut(&mut self) -> &mut Button {
        &mut self.down
    }

    /// Keeps the down button available even when the flow has nothing
    /// below; pressing it then raises [`take_beyond_end`](Self::take_beyond_end).
    pub(crate) fn set_more_below(&mut self, more: bool) {
        self.more_below = more;
        self.sync_page_buttons();
    }

    /// True once after the down button was pressed with no content below.
    pub(crate) fn take_beyond_end(&mut self) -> bool {
        std::mem::take(&mut self.beyond_end)
    }

    /// Direction of a page turn completed during the last tick.
    pub(crate) fn last_turn(&self) -> Option<PageDirection> {
        self.last_turn
    }

    pub fn activate(&mut self, force: bool) -> bool {
        self.base.activate(force)
    }

    pub fn deactivate(&mut self, hide: bool) -> bool {
        self.base.deactivate(hide, false, false)
    }

    /// Shows each page button that has somewhere to go and hides the rest.
    pub(crate) fn sync_page_buttons(&mut self) {
        let down = self.flow.can_page_down() || self.more_below;
        show_page_button(&mut self.up, self.flow.can_page_up());
        show_page_button(&mut self.down, down);
    }
}

/// Buttons start inactive but visible, so hiding one is forced.
fn show_page_button(button: &mut Button, available: bool) {
    if available {
        button.activate(false);
    } else {
        button.base_mut().deactivate(true, true, true);
    }
}

impl Component for TextDisplay {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base.tick(dt, ctx.textures);
        self.flow.width = self.base.width;
        self.flow.height = self.base.height;
        self.last_turn = self.flow.tick(dt, ctx.text);
        if self.last_turn.is_some() {
            self.sync_page_buttons();
        }
        self.up.tick(dt, ctx);
        self.down.tick(dt, ctx);
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        let inner = self.base.child_origin(origin);
        let result = self.up.on_event(event, inner, ctx).or_else(|| self.down.on_event(event, inner, ctx));
        if self.up.take_pressed() {
            self.flow.page_up();
        }
        if self.down.take_pressed() && !self.flow.page_down() && self.more_below {
            self.beyond_end = true;
        }
        result
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.base.is_destroyed() {
            return;
        }
        self.base.paint(painter, origin);
        let rect = self.base.rect(origin);
        painter.push_clip(rect);
        self.flow.paint(painter, rect.origin, self.base.alpha);
        painter.pop_clip();

        let inner = self.base.child_origin(origin);
        painter.push_opacity(self.base.alpha);
        self.up.paint(painter, inner);
        self.down.paint(painter, inner);
        painter.pop_opacity();
    }

    fn destroy(&mut self) {
        self.flow.cancel_scroll();
        self.up.destroy();
        self.down.destroy();
        self.base.destroy();
    }
}
