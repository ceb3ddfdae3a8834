use std::collections::VecDeque;

use domless_engine::coords::Vec2;
use domless_engine::input::Key;
use domless_engine::text::{TextMeasure, TextStyle};
use domless_engine::tween::{Repeat, Tween, TweenProp};

use crate::context::UiCtx;
use crate::error::WidgetError;
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::text_flow::{PageDirection, TextFlow};
use crate::widget::{Component, Widget};
use crate::widgets::text_display::{TextDisplay, TextDisplayConfig};

const PROMPT_BLINK_MS: f32 = 500.0;

/// Progressive reveal granularity.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Reveal {
    Words,
    Letters,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub pages: Vec<String>,
    pub style: TextStyle,
    /// `None` shows each page at once.
    pub reveal: Option<Reveal>,
    pub reveal_delay_ms: f32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 400.0,
            height: 200.0,
            pages: Vec::new(),
            style: TextStyle::default(),
            reveal: None,
            reveal_delay_ms: 75.0,
        }
    }
}

/// A text display fed from a queue of pages.
///
/// Every page starts at the top of a display page. The next page is laid out
/// only when the reader turns to it, and while pages remain the ▼ button
/// blinks as a prompt.
pub struct Dialogue {
    display: TextDisplay,
    pages: VecDeque<String>,
    reveal: Option<Reveal>,
    delay: f32,
    pending: VecDeque<String>,
    queued: Option<String>,
    timer: f32,
    prompt: Option<Tween>,
    prompt_alpha: f32,
}

impl Dialogue {
    pub fn new(config: DialogueConfig, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let display_config = TextDisplayConfig {
            x: config.x,
            y: config.y,
            width: config.width,
            height: config.height,
            text: String::new(),
            style: config.style,
        };
        let display = TextDisplay::new(display_config, ctx)?;
        let mut dialogue = Self {
            display,
            pages: config.pages.into(),
            reveal: config.reveal,
            delay: config.reveal_delay_ms.max(0.0),
            pending: VecDeque::new(),
            queued: None,
            timer: 0.0,
            prompt: None,
            prompt_alpha: 1.0,
        };
        if let Some(first) = dialogue.pages.pop_front() {
            dialogue.start_page(first, ctx.text);
        }
        dialogue.sync_prompt();
        Ok(dialogue)
    }

    #[inline]
    pub fn text(&self) -> &str {
        self.display.text()
    }

    #[inline]
    pub fn display(&self) -> &TextDisplay {
        &self.display
    }

    #[inline]
    pub fn flow(&self) -> &TextFlow {
        self.display.flow()
    }

    /// Pages not yet shown.
    #[inline]
    pub fn pages_left(&self) -> usize {
        self.pages.len()
    }

    /// A page is still being revealed.
    #[inline]
    pub fn is_revealing(&self) -> bool {
        !self.pending.is_empty() || self.queued.is_some()
    }

    pub fn push_page(&mut self, page: impl Into<String>) {
        self.pages.push_back(page.into());
        self.sync_prompt();
    }

    pub fn activate(&mut self, force: bool) -> bool {
        self.display.activate(force)
    }

    pub fn deactivate(&mut self, hide: bool) -> bool {
        self.display.deactivate(hide)
    }

    /// Advances the reader: finishes a running reveal, else turns to the
    /// next display page, else lays out and turns to the next queued page.
    pub fn next_page(&mut self, measure: &dyn TextMeasure) -> bool {
        if !self.pending.is_empty() {
            let rest: String = self.pending.drain(..).collect();
            self.display.append(&rest, measure);
            self.sync_prompt();
            return true;
        }
        if self.queued.is_some() || self.display.flow().is_scrolling() {
            return false;
        }
        if self.display.flow().can_page_down() {
            return self.display.page_down();
        }
        let Some(next) = self.pages.pop_front() else {
            return false;
        };
        self.pad_to_page_end(measure);
        let turned = match self.reveal {
            None => self.display.flow_mut().page_down_then(move |flow, m| flow.append(&next, m)),
            Some(_) => {
                self.queued = Some(next);
                self.display.page_down()
            }
        };
        log::debug!("dialogue turning to next page ({} left)", self.pages.len());
        self.sync_prompt();
        turned
    }

    fn start_page(&mut self, page: String, measure: &dyn TextMeasure) {
        match self.reveal {
            None => self.display.append(&page, measure),
            Some(Reveal::Words) => self.pending.extend(page.split_inclusive(' ').map(str::to_string)),
            Some(Reveal::Letters) => self.pending.extend(page.chars().map(String::from)),
        }
        self.timer = 0.0;
    }

    /// Appends newlines until the next line starts a display page.
    fn pad_to_page_end(&mut self, measure: &dyn TextMeasure) {
        let flow = self.display.flow();
        let per_page = flow.lines_per_page().max(1);
        let lines = flow.lines().len().max(1);
        let missing = per_page - (lines - 1) % per_page;
        self.display.append(&"\n".repeat(missing), measure);
    }

    fn sync_prompt(&mut self) {
        let more = !self.pages.is_empty() && !self.is_revealing();
        self.display.set_more_below(more);
        let prompting = more && !self.display.flow().can_page_down();
        match (prompting, self.prompt.is_some()) {
            (true, false) => {
                self.prompt_alpha = 1.0;
                self.prompt = Some(
                    Tween::new(PROMPT_BLINK_MS)
                        .by(TweenProp::Alpha, -1.0)
                        .yoyo(true)
                        .repeat(Repeat::Forever),
                );
            }
            (false, true) => {
                if let Some(mut prompt) = self.prompt.take() {
                    prompt.cancel();
                }
                self.prompt_alpha = 1.0;
                let down = self.display.down_button_mut();
                if down.is_active() {
                    down.base_mut().alpha = 1.0;
                }
            }
            _ => {}
        }
    }

    fn reveal_tick(&mut self, dt: f32, measure: &dyn TextMeasure) {
        if self.pending.is_empty() {
            return;
        }
        self.timer += dt;
        let mut revealed = String::new();
        while self.timer >= self.delay {
            let Some(chunk) = self.pending.pop_front() else { break };
            revealed.push_str(&chunk);
            self.timer -= self.delay;
        }
        self.display.append(&revealed, measure);
        if self.pending.is_empty() {
            self.sync_prompt();
        }
    }
}

impl Component for Dialogue {
    fn base(&self) -> &Widget {
        self.display.base()
    }

    fn base_mut(&mut self) -> &mut Widget {
        self.display.base_mut()
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.display.tick(dt, ctx);
        if self.display.last_turn() == Some(PageDirection::Down) {
            if let Some(page) = self.queued.take() {
                self.start_page(page, ctx.text);
            }
            self.sync_prompt();
        }
        self.reveal_tick(dt, ctx.text);

        if let Some(prompt) = self.prompt.as_mut() {
            let step = prompt.advance(dt);
            self.prompt_alpha = (self.prompt_alpha + step.get(TweenProp::Alpha)).clamp(0.0, 1.0);
            let down = self.display.down_button_mut();
            if down.is_active() {
                down.base_mut().alpha = self.prompt_alpha;
            }
        }
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        let result = self.display.on_event(event, origin, ctx);
        if self.display.take_beyond_end() {
            self.next_page(ctx.text);
            return EventResult::Consumed;
        }
        if result.is_consumed() || !self.display.base().is_active() {
            return result;
        }
        let advance = match event {
            UiEvent::KeyDown { key: Key::Space, .. } => true,
            UiEvent::PointerDown { pos } => self.display.base().hit(origin, *pos),
            _ => false,
        };
        if advance && self.next_page(ctx.text) {
            return EventResult::Consumed;
        }
        result
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        self.display.paint(painter, origin);
    }

    fn destroy(&mut self) {
        if let Some(mut prompt) = self.prompt.take() {
            prompt.cancel();
        }
        self.pending.clear();
        self.queued = None;
        self.display.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::UiScene;
    use domless_engine::input::Modifiers;

    fn dialogue(scene: &mut UiScene, pages: &[&str], reveal: Option<Reveal>) -> Dialogue {
        let config = DialogueConfig {
            width: 400.0,
            height: 110.0,
            pages: pages.iter().map(|p| p.to_string()).collect(),
            reveal,
            ..DialogueConfig::default()
        };
        Dialogue::new(config, &mut scene.ctx()).unwrap()
    }

    fn run(d: &mut Dialogue, scene: &mut UiScene, ms: f32) {
        let mut left = ms;
        while left > 0.0 {
            d.tick(16.0, &mut scene.ctx());
            left -= 16.0;
        }
    }

    #[test]
    fn next_page_is_laid_out_on_its_own_display_page() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut d = dialogue(&mut scene, &["first", "second"], None);
        assert_eq!(d.text(), "first");
        assert!(d.display().down_button().is_active());

        assert!(d.next_page(scene.text.as_ref()));
        assert!(!d.text().contains("second"));
        run(&mut d, &mut scene, 600.0);

        assert_eq!(d.flow().scroll_offset(), 90.0);
        assert_eq!(d.flow().line_texts()[3], "second");
        assert_eq!(d.pages_left(), 0);
        assert!(!d.display().down_button().is_active());
        assert!(d.display().up_button().is_active());
    }

    #[test]
    fn arrow_down_past_the_end_loads_the_next_page() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut d = dialogue(&mut scene, &["one", "two"], None);
        let down = UiEvent::KeyDown { key: Key::ArrowDown, modifiers: Modifiers::default() };
        assert!(d.on_event(&down, Vec2::ZERO, &mut scene.ctx()).is_consumed());
        assert_eq!(d.pages_left(), 0);
        run(&mut d, &mut scene, 600.0);
        assert!(d.text().ends_with("two"));
    }

    #[test]
    fn words_are_revealed_on_a_timer() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut d = dialogue(&mut scene, &["hello big world"], Some(Reveal::Words));
        assert_eq!(d.text(), "");
        d.tick(75.0, &mut scene.ctx());
        assert_eq!(d.text(), "hello ");
        d.tick(150.0, &mut scene.ctx());
        assert_eq!(d.text(), "hello big world");
        assert!(!d.is_revealing());
    }

    #[test]
    fn letters_reveal_one_by_one() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut d = dialogue(&mut scene, &["abc"], Some(Reveal::Letters));
        d.tick(75.0, &mut scene.ctx());
        d.tick(75.0, &mut scene.ctx());
        assert_eq!(d.text(), "ab");
    }

    #[test]
    fn next_page_while_revealing_finishes_the_page() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut d = dialogue(&mut scene, &["a b c", "d"], Some(Reveal::Words));
        d.tick(75.0, &mut scene.ctx());
        assert!(d.next_page(scene.text.as_ref()));
        assert_eq!(d.text(), "a b c");
        assert_eq!(d.pages_left(), 1);
    }

    #[test]
    fn queued_page_reveals_after_the_turn() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut d = dialogue(&mut scene, &["x", "y z"], Some(Reveal::Words));
        d.tick(75.0, &mut scene.ctx());
        assert!(d.next_page(scene.text.as_ref()));
        assert!(d.is_revealing());
        run(&mut d, &mut scene, 800.0);
        assert!(d.text().ends_with("y z"));
        assert!(!d.is_revealing());
    }

    #[test]
    fn nothing_left_means_no_turn() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut d = dialogue(&mut scene, &["only"], None);
        assert!(!d.next_page(scene.text.as_ref()));
        assert!(!d.display().down_button().is_active());
    }
}
