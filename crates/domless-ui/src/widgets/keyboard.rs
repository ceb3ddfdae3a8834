use domless_engine::coords::{Rect, Vec2};
use domless_engine::input::Key;

use crate::context::UiCtx;
use crate::error::{positive, WidgetError};
use crate::event::{EventResult, UiEvent, WidgetEvent};
use crate::painter::Painter;
use crate::widget::{Component, Widget, WidgetConfig};
use crate::widgets::button::{Button, ButtonConfig};

const NUMBER_ROW: &str = "1234567890";
const LETTER_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub enter_label: String,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, width: 800.0, enter_label: "⏎".to_string() }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum KeyCase {
    #[default]
    Lower,
    Upper,
}

/// One key cap: what it shows, what it types and how many key widths it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySpec {
    pub label: String,
    pub value: String,
    pub key: Option<Key>,
    pub units: f32,
}

impl KeySpec {
    fn glyph(c: char) -> Self {
        Self { label: c.to_string(), value: c.to_string(), key: Key::from_char(c), units: 1.0 }
    }

    fn wide(label: &str, value: &str, key: Key, units: f32) -> Self {
        Self { label: label.to_string(), value: value.to_string(), key: Some(key), units }
    }
}

/// Rows of key caps for one case.
pub fn key_rows(case: KeyCase, enter_label: &str) -> Vec<Vec<KeySpec>> {
    let mut rows = vec![NUMBER_ROW.chars().map(KeySpec::glyph).collect::<Vec<_>>()];
    for letters in LETTER_ROWS {
        rows.push(
            letters
                .chars()
                .map(|c| match case {
                    KeyCase::Lower => c,
                    KeyCase::Upper => c.to_ascii_uppercase(),
                })
                .map(KeySpec::glyph)
                .collect(),
        );
    }
    rows.push(vec![
        KeySpec::wide("⌫", "", Key::Backspace, 1.5),
        KeySpec::glyph(','),
        KeySpec::wide("", " ", Key::Space, 4.0),
        KeySpec::glyph('.'),
        KeySpec::wide(enter_label, "\n", Key::Enter, 1.5),
    ]);
    rows
}

struct KeyButton {
    spec: KeySpec,
    button: Button,
}

/// On-screen keyboard.
///
/// Keys are square, `round(width / 12)` wide, spaced by 15% of a key, and
/// every row is centred. Only the keys of the current case accept input.
pub struct Keyboard {
    base: Widget,
    lower: Vec<KeyButton>,
    upper: Vec<KeyButton>,
    case: KeyCase,
    key_width: f32,
    spacing: f32,
    pressed: Vec<(String, Option<Key>)>,
}

impl Keyboard {
    pub fn new(config: KeyboardConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let width = positive("keyboard width", config.width)?;
        let key_width = (width / 12.0).round().max(1.0);
        let spacing = 0.15 * key_width;
        let rows = key_rows(KeyCase::Lower, &config.enter_label).len() as f32;
        let height = rows * key_width + (rows - 1.0) * spacing;

        let base = Widget::new(
            WidgetConfig::default().at(config.x, config.y).sized(width, height).outline(false),
            ctx.textures,
        )?;
        let mut keyboard = Self {
            base,
            lower: Vec::new(),
            upper: Vec::new(),
            case: KeyCase::Lower,
            key_width,
            spacing,
            pressed: Vec::new(),
        };
        keyboard.lower = keyboard.build_keys(KeyCase::Lower, &config.enter_label, ctx)?;
        keyboard.upper = keyboard.build_keys(KeyCase::Upper, &config.enter_label, ctx)?;
        Ok(keyboard)
    }

    fn build_keys(&self, case: KeyCase, enter_label: &str, ctx: &mut UiCtx<'_>) -> Result<Vec<KeyButton>, WidgetError> {
        let (kw, gap) = (self.key_width, self.spacing);
        let cap = |units: f32| kw * units + gap * (units - 1.0);
        let mut keys = Vec::new();
        for (row, specs) in key_rows(case, enter_label).into_iter().enumerate() {
            let row_width: f32 = specs.iter().map(|s| cap(s.units)).sum::<f32>() + gap * (specs.len() as f32 - 1.0);
            let mut x = (self.base.width - row_width) / 2.0;
            let y = row as f32 * (kw + gap);
            for spec in specs {
                let config = ButtonConfig {
                    x,
                    y,
                    width: cap(spec.units),
                    height: kw,
                    font_size: (kw * 0.45).round(),
                    label: spec.label.clone(),
                    emit: false,
                    ..ButtonConfig::default()
                };
                x += cap(spec.units) + gap;
                keys.push(KeyButton { button: Button::new(config, ctx)?, spec });
            }
        }
        Ok(keys)
    }

    #[inline]
    pub fn key_width(&self) -> f32 {
        self.key_width
    }

    #[inline]
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    #[inline]
    pub fn case(&self) -> KeyCase {
        self.case
    }

    /// Screen rect of the cap typing `value` in the current case.
    pub fn key_rect(&self, value: &str, origin: Vec2) -> Option<Rect> {
        let inner = self.base.child_origin(origin);
        self.keys().iter().find(|k| k.spec.value == value).map(|k| k.button.bounds(inner))
    }

    /// Switches case; the other case's keys stop accepting input.
    pub fn set_case(&mut self, case: KeyCase) {
        self.case = case;
        if self.base.is_active() {
            self.sync_keys();
        }
    }

    pub fn toggle_case(&mut self) {
        self.set_case(match self.case {
            KeyCase::Lower => KeyCase::Upper,
            KeyCase::Upper => KeyCase::Lower,
        });
    }

    pub fn activate(&mut self, force: bool) -> bool {
        let activated = self.base.activate(force);
        self.sync_keys();
        activated
    }

    pub fn deactivate(&mut self) -> bool {
        let deactivated = self.base.deactivate(false, true, false);
        for k in self.lower.iter_mut().chain(self.upper.iter_mut()) {
            k.button.deactivate(false);
        }
        deactivated
    }

    /// Keys pressed since the last call, as `(value, key)`.
    pub fn take_pressed(&mut self) -> Vec<(String, Option<Key>)> {
        std::mem::take(&mut self.pressed)
    }

    fn keys(&self) -> &[KeyButton] {
        match self.case {
            KeyCase::Lower => &self.lower,
            KeyCase::Upper => &self.upper,
        }
    }

    fn sync_keys(&mut self) {
        let (on, off) = match self.case {
            KeyCase::Lower => (&mut self.lower, &mut self.upper),
            KeyCase::Upper => (&mut self.upper, &mut self.lower),
        };
        for k in on {
            k.button.activate(false);
        }
        for k in off {
            k.button.deactivate(true);
        }
    }
}

impl Component for Keyboard {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base.tick(dt, ctx.textures);
        for k in self.lower.iter_mut().chain(self.upper.iter_mut()) {
            k.button.tick(dt, ctx);
        }
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        if !self.base.is_active() {
            return EventResult::Ignored;
        }
        let inner = self.base.child_origin(origin);
        let keyboard = self.base.id();
        let keys = match self.case {
            KeyCase::Lower => &mut self.lower,
            KeyCase::Upper => &mut self.upper,
        };
        for k in keys.iter_mut() {
            let result = k.button.on_event(event, inner, ctx);
            if k.button.take_pressed() {
                ctx.events.emit(WidgetEvent::ButtonPress { source: keyboard, value: k.spec.value.clone(), key: k.spec.key });
                self.pressed.push((k.spec.value.clone(), k.spec.key));
            }
            if result.is_consumed() {
                return result;
            }
        }
        EventResult::Ignored
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.base.is_destroyed() {
            return;
        }
        let inner = self.base.child_origin(origin);
        for k in self.keys() {
            k.button.paint(painter, inner);
        }
    }

    fn destroy(&mut self) {
        for k in self.lower.iter_mut().chain(self.upper.iter_mut()) {
            k.button.destroy();
        }
        self.base.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::UiScene;

    fn keyboard(scene: &mut UiScene) -> Keyboard {
        let mut kb = Keyboard::new(KeyboardConfig::default(), &mut scene.ctx()).unwrap();
        kb.activate(false);
        kb
    }

    fn tap(kb: &mut Keyboard, scene: &mut UiScene, value: &str) -> EventResult {
        let rect = kb.key_rect(value, Vec2::ZERO).unwrap();
        let down = UiEvent::PointerDown { pos: rect.center() };
        kb.on_event(&down, Vec2::ZERO, &mut scene.ctx())
    }

    #[test]
    fn geometry_follows_width() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let kb = keyboard(&mut scene);
        assert_eq!(kb.key_width(), 67.0);
        assert!((kb.spacing() - 10.05).abs() < 1e-4);
        assert!((kb.base().height - (5.0 * 67.0 + 4.0 * 10.05)).abs() < 1e-3);
    }

    #[test]
    fn rows_are_centred() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let kb = keyboard(&mut scene);
        let one = kb.key_rect("1", Vec2::ZERO).unwrap();
        let zero = kb.key_rect("0", Vec2::ZERO).unwrap();
        assert!((one.origin.x - (800.0 - zero.right())).abs() < 1e-3);
        let space = kb.key_rect(" ", Vec2::ZERO).unwrap();
        assert!((space.size.x - (4.0 * 67.0 + 3.0 * 10.05)).abs() < 1e-3);
        assert!((space.origin.y - 4.0 * (67.0 + 10.05)).abs() < 1e-3);
    }

    #[test]
    fn tapping_a_key_records_value_and_key() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kb = keyboard(&mut scene);
        assert!(tap(&mut kb, &mut scene, "q").is_consumed());
        assert!(tap(&mut kb, &mut scene, "").is_consumed());
        assert_eq!(kb.take_pressed(), vec![("q".to_string(), Some(Key::Q)), (String::new(), Some(Key::Backspace))]);
        assert!(kb.take_pressed().is_empty());
        assert_eq!(scene.events.count("domlessButtonPress"), 2);
    }

    #[test]
    fn only_the_current_case_types() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kb = keyboard(&mut scene);
        kb.toggle_case();
        assert_eq!(kb.case(), KeyCase::Upper);
        assert!(kb.key_rect("q", Vec2::ZERO).is_none());
        tap(&mut kb, &mut scene, "Q");
        assert_eq!(kb.take_pressed(), vec![("Q".to_string(), Some(Key::Q))]);
    }

    #[test]
    fn inactive_keyboard_ignores_taps() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut kb = keyboard(&mut scene);
        kb.deactivate();
        assert!(!tap(&mut kb, &mut scene, "a").is_consumed());
        assert!(kb.take_pressed().is_empty());
    }

    #[test]
    fn rejects_zero_width() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let config = KeyboardConfig { width: 0.0, ..KeyboardConfig::default() };
        assert!(matches!(Keyboard::new(config, &mut scene.ctx()), Err(WidgetError::InvalidSize { .. })));
    }
}
