use domless_engine::coords::{Rect, Vec2};
use domless_engine::input::Key;
use domless_engine::paint::Color;
use domless_engine::text::{Padding, TextStyle};

use crate::context::UiCtx;
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent, WidgetEvent};
use crate::painter::Painter;
use crate::transition::{Transition, Transitionable};
use crate::widget::{Component, Widget, WidgetConfig};
use crate::widgets::button::{Button, ButtonConfig};
use crate::widgets::dropdown::{toggle_on_tap, OptionList, CARAT, OPTION_GAP};

/// Space around and between chips.
pub const CHIP_PADDING: f32 = 5.0;
const CHIP_FILL_ALPHA: f32 = 0.25;
const CHIP_RADIUS: f32 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MultiSelectConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Height of one chip row and of each option row. `None` fits one line.
    pub height: Option<f32>,
    pub help_text: String,
    pub expand_ms: f32,
    pub style: TextStyle,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

impl Default for MultiSelectConfig {
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
            selected: Vec::new(),
        }
    }
}

impl MultiSelectConfig {
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
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
}

struct Chip {
    value: String,
    button: Button,
}

/// Field collecting any number of options as removable chips.
///
/// Selected options leave the list and come back when their chip is tapped.
/// Chips flow left to right up to the carat divider and wrap onto new rows;
/// the field grows one row height per chip row.
pub struct MultiSelectField {
    base: Widget,
    style: TextStyle,
    help_style: TextStyle,
    chip_style: TextStyle,
    help_text: String,
    help_alpha: f32,
    available: Vec<String>,
    chips: Vec<Chip>,
    chip_rows: usize,
    row_height: f32,
    carat_width: f32,
    list: OptionList,
    stale: bool,
}

impl MultiSelectField {
    pub fn new(config: MultiSelectConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let row_height = config
            .height
            .unwrap_or_else(|| ctx.text.line_height(&config.style) + config.style.padding.vertical());
        let mut base = Widget::new(
            WidgetConfig::default().at(config.x, config.y).sized(config.width, row_height),
            ctx.textures,
        )?;
        base.set_interactive(true);

        let pad = config.style.padding;
        let chip_style = chip_style(&config.style);
        let values = config.options.iter().cloned().map(Some).collect();
        let list = OptionList::new(values, config.width, row_height, config.style.clone(), config.expand_ms, ctx)?;
        let carat_width = ctx.text.measure(CARAT, &config.style).x + pad.horizontal();

        let mut field = Self {
            base,
            help_style: config.style.clone().with_color(Color::GRAY),
            style: config.style,
            chip_style,
            help_text: config.help_text,
            help_alpha: 1.0,
            available: config.options,
            chips: Vec::new(),
            chip_rows: 1,
            row_height,
            carat_width,
            list,
            stale: false,
        };
        for value in config.selected {
            field.add_chip(&value, ctx)?;
        }
        field.refresh_list(ctx)?;
        Ok(field)
    }

    /// Selected values in selection order.
    pub fn selected(&self) -> Vec<&str> {
        self.chips.iter().map(|c| c.value.as_str()).collect()
    }

    /// Values still offered by the list.
    pub fn options(&self) -> Vec<&str> {
        self.available.iter().map(String::as_str).collect()
    }

    /// Values the option list currently shows. Catches up with
    /// [`options`](Self::options) once the list is closed.
    pub fn listed(&self) -> Vec<&str> {
        self.list.values().flatten().collect()
    }

    #[inline]
    pub fn help_alpha(&self) -> f32 {
        self.help_alpha
    }

    #[inline]
    pub fn chip_rows(&self) -> usize {
        self.chip_rows
    }

    pub fn divider_x(&self) -> f32 {
        self.base.width - self.carat_width
    }

    /// Screen rect of the chip for `value`.
    pub fn chip_rect(&self, value: &str, origin: Vec2) -> Option<Rect> {
        let inner = self.base.child_origin(origin);
        self.chips.iter().find(|c| c.value == value).map(|c| c.button.bounds(inner))
    }

    pub fn list_origin(&self, origin: Vec2) -> Vec2 {
        let inner = self.base.child_origin(origin);
        Vec2::new(inner.x, inner.y + self.base.height + OPTION_GAP)
    }

    pub fn activate(&mut self, ctx: &mut UiCtx<'_>) -> bool {
        let opened = self.list.open(ctx);
        if opened {
            log::debug!("multiselect {} opening", self.base.id());
        }
        opened
    }

    pub fn deactivate(&mut self) -> bool {
        let closed = self.list.close();
        if closed {
            log::debug!("multiselect {} closing", self.base.id());
        }
        closed
    }

    /// Moves `value` from the list to a new chip and closes the list.
    pub fn select_option(&mut self, value: &str, ctx: &mut UiCtx<'_>) -> Result<(), WidgetError> {
        self.add_chip(value, ctx)?;
        self.deactivate();
        self.refresh_list(ctx)?;
        ctx.events.emit(WidgetEvent::OptionSelected { field: self.base.id(), value: Some(value.to_string()) });
        Ok(())
    }

    /// Removes the chip for `value` and offers it in the list again.
    pub fn deselect_option(&mut self, value: &str, ctx: &mut UiCtx<'_>) -> Result<String, WidgetError> {
        let Some(index) = self.chips.iter().position(|c| c.value == value) else {
            log::warn!("multiselect {} has no selected {value:?}", self.base.id());
            return Err(WidgetError::UnknownOption(value.to_string()));
        };
        let mut chip = self.chips.remove(index);
        chip.button.destroy();
        self.available.push(chip.value.clone());
        self.place_chips();
        if self.chips.is_empty() {
            self.help_alpha = 1.0;
        }
        self.stale = true;
        self.refresh_list(ctx)?;
        ctx.events.emit(WidgetEvent::OptionDeselected { field: self.base.id(), value: chip.value.clone() });
        Ok(chip.value)
    }

    fn add_chip(&mut self, value: &str, ctx: &mut UiCtx<'_>) -> Result<(), WidgetError> {
        let Some(index) = self.available.iter().position(|o| o == value) else {
            log::warn!("multiselect {} has no option {value:?}", self.base.id());
            return Err(WidgetError::UnknownOption(value.to_string()));
        };
        let width = ctx.text.measure(value, &self.chip_style).x + self.chip_style.padding.horizontal();
        let config = ButtonConfig {
            width,
            height: (self.row_height - 2.0 * CHIP_PADDING).max(1.0),
            font_size: self.chip_style.font_size,
            label: value.to_string(),
            has_outline: false,
            emit: false,
            ..ButtonConfig::default()
        };
        let mut button = Button::new(config, ctx)?;
        button.base_mut().fill_alpha = CHIP_FILL_ALPHA;
        button.base_mut().radius = CHIP_RADIUS;
        button.activate(false);

        let value = self.available.remove(index);
        self.chips.push(Chip { value, button });
        self.help_alpha = 0.0;
        self.stale = true;
        self.place_chips();
        Ok(())
    }

    /// Flows chips left to right, wrapping at the carat divider, and sizes
    /// the field to the number of chip rows.
    fn place_chips(&mut self) {
        let limit = self.divider_x();
        let (mut x, mut y, mut rows) = (CHIP_PADDING, CHIP_PADDING, 1);
        for (i, chip) in self.chips.iter_mut().enumerate() {
            let width = chip.button.base().width;
            if i > 0 && x + width > limit {
                x = CHIP_PADDING;
                y += self.row_height;
                rows += 1;
            }
            chip.button.base_mut().x = x;
            chip.button.base_mut().y = y;
            x += width + CHIP_PADDING;
        }
        self.chip_rows = rows;
        self.base.height = rows as f32 * self.row_height;
    }

    fn refresh_list(&mut self, ctx: &mut UiCtx<'_>) -> Result<(), WidgetError> {
        if !self.stale {
            return Ok(());
        }
        let values = self.available.iter().cloned().map(Some).collect();
        if self.list.rebuild(values, ctx)? {
            self.stale = false;
        }
        Ok(())
    }
}

impl Transitionable for MultiSelectField {
    fn transition(&self) -> &Transition {
        self.list.transition()
    }
}

impl Component for MultiSelectField {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base.tick(dt, ctx.textures);
        for chip in &mut self.chips {
            chip.button.tick(dt, ctx);
        }
        self.list.tick(dt, ctx);
        if let Err(e) = self.refresh_list(ctx) {
            log::warn!("multiselect {}: {e}", self.base.id());
        }
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        if self.base.is_destroyed() || !self.base.is_interactive() {
            return EventResult::Ignored;
        }
        let inner = self.base.child_origin(origin);
        let mut tapped = None;
        for chip in &mut self.chips {
            chip.button.on_event(event, inner, ctx);
            if chip.button.take_pressed() {
                tapped = Some(chip.value.clone());
                break;
            }
        }
        if let Some(value) = tapped {
            if let Err(e) = self.deselect_option(&value, ctx) {
                log::warn!("multiselect {}: {e}", self.base.id());
            }
            return EventResult::Consumed;
        }

        let list_origin = self.list_origin(origin);
        if let Some(Some(value)) = self.list.route(event, list_origin, ctx) {
            if let Err(e) = self.select_option(&value, ctx) {
                log::warn!("multiselect {}: {e}", self.base.id());
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
        let alpha = self.base.alpha;
        let pad = self.style.padding;
        if self.help_alpha > 0.0 {
            let at = Vec2::new(inner.x + pad.left, inner.y + pad.top);
            painter.text(&self.help_text, &self.help_style, at, alpha * self.help_alpha);
        }
        for chip in &self.chips {
            chip.button.paint(painter, inner);
        }
        let divider = self.divider_x();
        painter.rect(Rect::new(inner.x + divider, inner.y, 0.5, self.base.height), 0.0, Color::WHITE.with_alpha(alpha));
        let carat_y = inner.y + (self.base.height - self.list.row_height()) / 2.0 + pad.top;
        painter.text(CARAT, &self.style, Vec2::new(inner.x + divider + pad.left, carat_y), alpha);
        self.list.paint(painter, self.list_origin(origin));
    }

    fn destroy(&mut self) {
        for chip in &mut self.chips {
            chip.button.destroy();
        }
        self.list.destroy();
        self.base.destroy();
    }
}

/// The field style shrunk for chip labels, floored so small styles stay
/// drawable.
fn chip_style(style: &TextStyle) -> TextStyle {
    let pad = style.padding;
    style.clone().with_font_size((style.font_size - 5.0).max(1.0)).with_padding(Padding {
        top: (pad.top - 5.0).max(0.0),
        left: (pad.left - 2.0).max(0.0),
        right: (pad.right - 2.0).max(0.0),
        bottom: (pad.bottom - 5.0).max(0.0),
    })
}
