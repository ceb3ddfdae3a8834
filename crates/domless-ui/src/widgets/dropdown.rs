//! Single-select dropdown and the clip-masked option list it shares with
//! [`MultiSelectField`](crate::widgets::multiselect::MultiSelectField).

use domless_engine::coords::{Rect, Vec2};
use domless_engine::input::Key;
use domless_engine::paint::Color;
use domless_engine::text::{TextMeasure, TextStyle};
use domless_engine::tween::{Ease, Tween, TweenProp};

use crate::context::UiCtx;
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent, WidgetEvent};
use crate::painter::Painter;
use crate::transition::{Transition, TransitionState, Transitionable};
use crate::widget::{Component, Widget, WidgetConfig};
use crate::widgets::button::{Button, ButtonConfig};

/// Gap between the field and its option list.
pub const OPTION_GAP: f32 = 5.0;
pub const CARAT: &str = "⯈";
const CARAT_OPEN: &str = "⯆";
/// Fill opacity of even and odd option rows.
const ROW_FILL: [f32; 2] = [0.1, 0.2];

#[derive(Debug, Clone, PartialEq)]
pub struct DropDownConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Field and option row height. `None` fits one line of text.
    pub height: Option<f32>,
    pub help_text: String,
    pub expand_ms: f32,
    pub style: TextStyle,
    pub options: Vec<String>,
    /// Prepend a blank row that clears the selection.
    pub include_none: bool,
    pub selected: Option<String>,
}

impl Default for DropDownConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: None,
            help_text: "Help Text".to_string(),
            expand_ms: 375.0,
            style: TextStyle::default(),
            options: vec!["Option 1".to_string(), "Option 2".to_string(), "Option 3".to_string()],
            include_none: true,
            selected: None,
        }
    }
}

impl DropDownConfig {
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    pub fn selected(mut self, value: impl Into<String>) -> Self {
        self.selected = Some(value.into());
        self
    }

    /// Row height: the configured one or a single padded line.
    pub(crate) fn row_height(&self, text: &dyn TextMeasure) -> f32 {
        self.height.unwrap_or_else(|| text.line_height(&self.style) + self.style.padding.vertical())
    }
}

// ── OptionList ────────────────────────────────────────────────────────────

struct OptionRow {
    value: Option<String>,
    button: Button,
    alpha: f32,
    fade: Option<Tween>,
}

/// Option buttons under a field, revealed by growing a clip mask.
///
/// The transition offset is the mask extent. Rows fade in one after another,
/// row `i` delayed by `(i + 0.5) * expand_ms / rows`, and only take input
/// once the mask is fully open.
pub(crate) struct OptionList {
    rows: Vec<OptionRow>,
    transition: Transition,
    carat_angle: f32,
    carat: Option<Tween>,
    width: f32,
    row_height: f32,
    style: TextStyle,
    depth: i32,
}

impl OptionList {
    pub(crate) fn new(
        values: Vec<Option<String>>,
        width: f32,
        row_height: f32,
        style: TextStyle,
        expand_ms: f32,
        ctx: &mut UiCtx<'_>,
    ) -> Result<Self, WidgetError> {
        let mut list = Self {
            rows: Vec::new(),
            transition: Transition::new(0.0, expand_ms, Ease::CubicInOut),
            carat_angle: 0.0,
            carat: None,
            width,
            row_height,
            style,
            depth: 0,
        };
        list.rows = list.build_rows(values, ctx)?;
        list.transition.set_travel(list.extent());
        Ok(list)
    }

    fn build_rows(&self, values: Vec<Option<String>>, ctx: &mut UiCtx<'_>) -> Result<Vec<OptionRow>, WidgetError> {
        let mut rows = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            let config = ButtonConfig {
                x: 0.0,
                y: i as f32 * self.row_height,
                width: self.width,
                height: self.row_height,
                font_size: self.style.font_size,
                label: value.clone().unwrap_or_default(),
                has_fill: false,
                has_outline: false,
                emit: false,
                ..ButtonConfig::default()
            };
            let mut button = Button::new(config, ctx)?;
            button.base_mut().alpha = 0.0;
            rows.push(OptionRow { value, button, alpha: 0.0, fade: None });
        }
        Ok(rows)
    }

    /// Full mask extent.
    fn extent(&self) -> f32 {
        self.rows.len() as f32 * self.row_height + 2.0
    }

    /// Replaces the rows. Only applies while closed.
    pub(crate) fn rebuild(&mut self, values: Vec<Option<String>>, ctx: &mut UiCtx<'_>) -> Result<bool, WidgetError> {
        if !self.transition.is_closed() {
            return Ok(false);
        }
        let rows = self.build_rows(values, ctx)?;
        for mut old in std::mem::replace(&mut self.rows, rows) {
            old.button.destroy();
        }
        self.transition.set_travel(self.extent());
        Ok(true)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(|r| r.value.as_deref())
    }

    pub(crate) fn row_height(&self) -> f32 {
        self.row_height
    }

    pub(crate) fn carat_angle(&self) -> f32 {
        self.carat_angle
    }

    pub(crate) fn row_alpha(&self, index: usize) -> Option<f32> {
        self.rows.get(index).map(|r| r.alpha)
    }

    pub(crate) fn transition(&self) -> &Transition {
        &self.transition
    }

    pub(crate) fn open(&mut self, ctx: &mut UiCtx<'_>) -> bool {
        if !self.transition.activate() {
            return false;
        }
        self.depth = ctx.depth.bring_to_top();
        self.turn_carat(90.0);
        let duration = self.transition.duration();
        let step = duration / self.rows.len().max(1) as f32;
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.alpha = 0.0;
            row.fade = Some(
                Tween::new(duration)
                    .by(TweenProp::Alpha, 1.0)
                    .ease(Ease::CubicInOut)
                    .delay((i as f32 + 0.5) * step),
            );
        }
        true
    }

    pub(crate) fn close(&mut self) -> bool {
        if !self.transition.deactivate() {
            return false;
        }
        self.turn_carat(0.0);
        let duration = self.transition.duration();
        for row in &mut self.rows {
            row.button.deactivate(false);
            row.fade = Some(Tween::new(duration).by(TweenProp::Alpha, -row.alpha).ease(Ease::CubicInOut));
        }
        true
    }

    fn turn_carat(&mut self, to: f32) {
        if let Some(mut old) = self.carat.take() {
            old.cancel();
        }
        let duration = self.transition.duration();
        self.carat = Some(Tween::new(duration).by(TweenProp::Angle, to - self.carat_angle).ease(Ease::CubicInOut));
    }

    pub(crate) fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) -> Option<TransitionState> {
        let settled = self.transition.advance(dt);
        match settled {
            Some(TransitionState::Open) => {
                for row in &mut self.rows {
                    row.button.activate(false);
                }
            }
            Some(TransitionState::Closed) => {
                for row in &mut self.rows {
                    row.alpha = 0.0;
                    row.fade = None;
                }
            }
            _ => {}
        }
        if let Some(carat) = self.carat.as_mut() {
            let step = carat.advance(dt);
            self.carat_angle += step.get(TweenProp::Angle);
            if step.completed {
                self.carat = None;
            }
        }
        for row in &mut self.rows {
            row.button.tick(dt, ctx);
            if let Some(fade) = row.fade.as_mut() {
                let step = fade.advance(dt);
                row.alpha = (row.alpha + step.get(TweenProp::Alpha)).clamp(0.0, 1.0);
                if step.completed {
                    row.fade = None;
                }
            }
            row.button.base_mut().alpha = row.alpha;
        }
        settled
    }

    /// Value of the row pressed by `event`, if any. `origin` is the top-left
    /// of the list.
    pub(crate) fn route(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> Option<Option<String>> {
        if !self.transition.is_open() {
            return None;
        }
        for row in &mut self.rows {
            row.button.on_event(event, origin, ctx);
            if row.button.take_pressed() {
                return Some(row.value.clone());
            }
        }
        None
    }

    /// Currently revealed part of the list.
    pub(crate) fn visible_rect(&self, origin: Vec2) -> Rect {
        Rect::new(origin.x, origin.y, self.width, self.transition.offset())
    }

    pub(crate) fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.transition.is_closed() {
            return;
        }
        let prev = painter.raise_to(self.depth);
        let mask = self.visible_rect(origin);
        painter.push_clip(Rect::new(mask.origin.x - 1.0, mask.origin.y, mask.size.x + 2.0, mask.size.y));
        painter.rect(Rect::new(origin.x, origin.y, self.width, self.extent()), 0.0, Color::BLACK);
        for (i, row) in self.rows.iter().enumerate() {
            let rect = row.button.bounds(origin);
            painter.rect(rect, 0.0, Color::WHITE.with_alpha(ROW_FILL[i % 2] * row.alpha));
            row.button.paint(painter, origin);
        }
        painter.pop_clip();
        painter.set_layer(prev);
    }

    pub(crate) fn destroy(&mut self) {
        self.transition.cancel();
        if let Some(mut carat) = self.carat.take() {
            carat.cancel();
        }
        for row in &mut self.rows {
            row.fade = None;
            row.button.destroy();
        }
    }
}

/// Release handling shared by list-backed fields: a tap on the field toggles
/// the list, a tap anywhere else closes it.
pub(crate) fn toggle_on_tap(
    list: &mut OptionList,
    field: Rect,
    pos: Vec2,
    was_dragged: bool,
    ctx: &mut UiCtx<'_>,
) -> EventResult {
    if was_dragged || list.transition.in_flight() || ctx.keyboard_busy {
        return EventResult::Ignored;
    }
    if field.contains(pos) {
        if list.transition.is_closed() {
            list.open(ctx);
        } else {
            list.close();
        }
        return EventResult::Consumed;
    }
    list.close();
    EventResult::Ignored
}

// ── DropDownField ─────────────────────────────────────────────────────────

/// Field showing one selected option, with a list that slides open beneath
/// it when tapped.
pub struct DropDownField {
    base: Widget,
    style: TextStyle,
    help_style: TextStyle,
    help_text: String,
    help_alpha: f32,
    selected: Option<String>,
    carat_width: f32,
    list: OptionList,
}

impl DropDownField {
    pub fn new(config: DropDownConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let height = config.row_height(ctx.text);
        let mut base = Widget::new(
            WidgetConfig::default().at(config.x, config.y).sized(config.width, height),
            ctx.textures,
        )?;
        base.set_interactive(true);

        let mut values: Vec<Option<String>> = Vec::with_capacity(config.options.len() + 1);
        if config.include_none {
            values.push(None);
        }
        values.extend(config.options.into_iter().map(Some));
        let list = OptionList::new(values, config.width, height, config.style.clone(), config.expand_ms, ctx)?;

        let carat_width = ctx.text.measure(CARAT, &config.style).x + config.style.padding.horizontal();
        let mut field = Self {
            base,
            help_style: config.style.clone().with_color(Color::GRAY),
            style: config.style,
            help_text: config.help_text,
            help_alpha: 1.0,
            selected: None,
            carat_width,
            list,
        };
        if let Some(value) = config.selected {
            field.set_selected(Some(&value))?;
        }
        Ok(field)
    }

    #[inline]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selectable values, the blank row excluded.
    pub fn options(&self) -> Vec<&str> {
        self.list.values().flatten().collect()
    }

    #[inline]
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    #[inline]
    pub fn help_alpha(&self) -> f32 {
        self.help_alpha
    }

    #[inline]
    pub fn carat_angle(&self) -> f32 {
        self.list.carat_angle()
    }

    /// Local x of the line between the label and the carat.
    pub fn divider_x(&self) -> f32 {
        self.base.width - self.carat_width
    }

    /// Opacity of option row `index` (the blank row is 0 when present).
    pub fn option_alpha(&self, index: usize) -> Option<f32> {
        self.list.row_alpha(index)
    }

    /// Top-left of the option list for a field at `origin`.
    pub fn list_origin(&self, origin: Vec2) -> Vec2 {
        let inner = self.base.child_origin(origin);
        Vec2::new(inner.x, inner.y + self.base.height + OPTION_GAP)
    }

    /// Opens the option list. Ignored unless closed.
    pub fn activate(&mut self, ctx: &mut UiCtx<'_>) -> bool {
        let opened = self.list.open(ctx);
        if opened {
            log::debug!("dropdown {} opening", self.base.id());
        }
        opened
    }

    /// Closes the option list. Ignored unless open.
    pub fn deactivate(&mut self) -> bool {
        let closed = self.list.close();
        if closed {
            log::debug!("dropdown {} closing", self.base.id());
        }
        closed
    }

    /// Shows `value` (or the help text for `None`), closes the list and
    /// publishes the selection.
    pub fn select_option(&mut self, value: Option<&str>, ctx: &mut UiCtx<'_>) -> Result<(), WidgetError> {
        self.set_selected(value)?;
        self.deactivate();
        ctx.events.emit(WidgetEvent::OptionSelected { field: self.base.id(), value: self.selected.clone() });
        Ok(())
    }

    fn set_selected(&mut self, value: Option<&str>) -> Result<(), WidgetError> {
        match value {
            Some(v) if !self.list.values().any(|o| o == Some(v)) => {
                log::warn!("dropdown {} has no option {v:?}", self.base.id());
                return Err(WidgetError::UnknownOption(v.to_string()));
            }
            _ => {}
        }
        self.selected = value.map(str::to_string);
        self.help_alpha = if self.selected.is_some() { 0.0 } else { 1.0 };
        Ok(())
    }
}

impl Transitionable for DropDownField {
    fn transition(&self) -> &Transition {
        self.list.transition()
    }
}

impl Component for DropDownField {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base.tick(dt, ctx.textures);
        self.list.tick(dt, ctx);
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        if self.base.is_destroyed() || !self.base.is_interactive() {
            return EventResult::Ignored;
        }
        let list_origin = self.list_origin(origin);
        if let Some(value) = self.list.route(event, list_origin, ctx) {
            if let Err(e) = self.select_option(value.as_deref(), ctx) {
                log::warn!("dropdown {}: {e}", self.base.id());
            }
            return EventResult::Consumed;
        }
        match event {
            UiEvent::PointerUp { pos, was_dragged } => {
                let over_list = !self.list.transition().is_closed() && self.list.visible_rect(list_origin).contains(*pos);
                if over_list {
                    return EventResult::Consumed;
                }
                toggle_on_tap(&mut self.list, self.base.rect(origin), *pos, *was_dragged, ctx)
            }
            UiEvent::KeyDown { key: Key::Escape, .. } if self.list.transition().is_open() => {
                self.deactivate();
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.base.is_destroyed() {
            return;
        }
        self.base.paint(painter, origin);
        let inner = self.base.child_origin(origin);
        let pad = self.style.padding;
        let text_at = Vec2::new(inner.x + pad.left, inner.y + pad.top);
        let alpha = self.base.alpha;
        match &self.selected {
            Some(label) => painter.text(label, &self.style, text_at, alpha),
            None => painter.text(&self.help_text, &self.help_style, text_at, alpha * self.help_alpha),
        }
        let divider = self.divider_x();
        painter.rect(Rect::new(inner.x + divider, inner.y, 0.5, self.base.height), 0.0, Color::WHITE.with_alpha(alpha));
        let glyph = if self.carat_angle() >= 45.0 { CARAT_OPEN } else { CARAT };
        painter.text(glyph, &self.style, Vec2::new(inner.x + divider + pad.left, inner.y + pad.top), alpha);
        self.list.paint(painter, self.list_origin(origin));
    }

    fn destroy(&mut self) {
        self.list.destroy();
        self.base.destroy();
    }
}
