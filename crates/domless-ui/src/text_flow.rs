//! Wrapped, paginated text with cursor placement.
//!
//! A [`TextFlow`] is owned by every text-bearing widget. It keeps the laid-out
//! lines of its content, the position of a trailing cursor glyph and the
//! vertical offsets of page boundaries, and scrolls between those boundaries
//! with an animated page turn.
//!
//! All positions are in the owner's local space (top-left of the text box).

use std::fmt;

use domless_engine::coords::{Rect, Vec2};
use domless_engine::text::{wrap_text, TextAlign, TextMeasure, TextStyle, WrappedLine};
use domless_engine::tween::{Ease, Tween, TweenProp};

use crate::dirty::{DirtyTracker, Regeneratable};
use crate::painter::Painter;

/// Page turn animation length.
pub const PAGE_SCROLL_MS: f32 = 500.0;

const EPSILON: f32 = 1e-3;

/// Callback run when a page turn completes.
pub type PageCallback = Box<dyn FnOnce(&mut TextFlow, &dyn TextMeasure)>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PageDirection {
    Up,
    Down,
}

struct PageScroll {
    tween: Tween,
    target: f32,
    direction: PageDirection,
    on_done: Option<PageCallback>,
}

pub struct TextFlow {
    content: String,
    style: TextStyle,
    /// Size of the text box, padding included.
    pub width: f32,
    pub height: f32,

    line_height: f32,
    space_width: f32,
    glyph_width: f32,
    cursor_glyph: Option<char>,

    lines: Vec<WrappedLine>,
    line_widths: Vec<f32>,
    cursor: Vec2,
    cursor_overflow: bool,

    page_breaks: Vec<f32>,
    scroll_offset: f32,
    scroll: Option<PageScroll>,

    tracker: DirtyTracker<TextFlow>,
}

impl TextFlow {
    /// Lays out `content` inside a `width`×`height` box. With a cursor glyph
    /// every line reserves room for it.
    pub fn new(
        content: &str,
        style: TextStyle,
        width: f32,
        height: f32,
        cursor_glyph: Option<char>,
        measure: &dyn TextMeasure,
    ) -> Self {
        let mut flow = Self {
            content: content.to_string(),
            style,
            width,
            height,
            line_height: 0.0,
            space_width: 0.0,
            glyph_width: 0.0,
            cursor_glyph,
            lines: Vec::new(),
            line_widths: Vec::new(),
            cursor: Vec2::ZERO,
            cursor_overflow: false,
            page_breaks: Vec::new(),
            scroll_offset: 0.0,
            scroll: None,
            tracker: DirtyTracker::<TextFlow>::new()
                .watch("width", |t| t.width.into())
                .watch("height", |t| t.height.into())
                .watch("font_size", |t| t.style.font_size.into())
                .watch("font_family", |t| t.style.font_family.as_str().into())
                .watch("padding", |t| {
                    let p = t.style.padding;
                    vec![p.top, p.left, p.right, p.bottom].into()
                })
                .watch("wrap_width", |t| t.style.wrap_width.unwrap_or(-1.0).into()),
        };
        flow.dirty_check(measure);
        flow
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Style changes are picked up by the next [`tick`](Self::tick).
    #[inline]
    pub fn style_mut(&mut self) -> &mut TextStyle {
        &mut self.style
    }

    #[inline]
    pub fn lines(&self) -> &[WrappedLine] {
        &self.lines
    }

    pub fn line_texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    #[inline]
    pub fn space_width(&self) -> f32 {
        self.space_width
    }

    /// Wrapped lines, plus one when the cursor spilled onto a line of its own.
    pub fn total_lines(&self) -> usize {
        self.lines.len() + usize::from(self.cursor_overflow)
    }

    pub fn wrap_width(&self) -> f32 {
        self.style.wrap_width.unwrap_or(self.width - self.style.padding.horizontal()).max(0.0)
    }

    pub fn lines_per_page(&self) -> usize {
        if self.line_height <= 0.0 {
            return 1;
        }
        let inner = self.height - self.style.padding.vertical();
        ((inner / self.line_height).floor() as usize).max(1)
    }

    pub fn page_height(&self) -> f32 {
        self.lines_per_page() as f32 * self.line_height
    }

    #[inline]
    pub fn page_breaks(&self) -> &[f32] {
        &self.page_breaks
    }

    #[inline]
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Cursor in content space (unaffected by scrolling).
    #[inline]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Cursor in the owner's local space.
    #[inline]
    pub fn cursor_position(&self) -> Vec2 {
        Vec2::new(self.cursor.x, self.cursor.y - self.scroll_offset)
    }

    #[inline]
    pub fn cursor_glyph(&self) -> Option<char> {
        self.cursor_glyph
    }

    /// Right edge the cursor must stay left of.
    pub fn right_edge(&self) -> f32 {
        self.width - self.style.padding.right
    }

    // ── mutation ──────────────────────────────────────────────────────────

    /// Replaces the content and lays everything out again.
    pub fn set_text(&mut self, text: &str, measure: &dyn TextMeasure) {
        self.content.clear();
        self.content.push_str(text);
        self.relayout_from(0, measure);
        self.rebuild_breaks();
    }

    /// Appends at the end, re-wrapping only the tail. Page breaks only grow.
    pub fn append(&mut self, fragment: &str, measure: &dyn TextMeasure) {
        if fragment.is_empty() {
            return;
        }
        let from = self.lines.len().saturating_sub(3);
        self.content.push_str(fragment);
        self.relayout_from(from, measure);
        self.extend_breaks();
    }

    /// Removes the last character. Returns false when already empty.
    pub fn backspace(&mut self, measure: &dyn TextMeasure) -> bool {
        if self.content.pop().is_none() {
            return false;
        }
        let from = self.lines.len().saturating_sub(3);
        self.relayout_from(from, measure);
        self.rebuild_breaks();
        true
    }

    pub fn clear(&mut self, measure: &dyn TextMeasure) {
        self.cancel_scroll();
        self.scroll_offset = 0.0;
        self.set_text("", measure);
    }

    // ── paging ────────────────────────────────────────────────────────────

    /// A page turn is animating.
    pub fn is_scrolling(&self) -> bool {
        self.scroll.as_ref().is_some_and(|s| !s.tween.is_finished())
    }

    pub fn can_page_up(&self) -> bool {
        self.scroll_offset > EPSILON
    }

    pub fn can_page_down(&self) -> bool {
        self.page_breaks.last().is_some_and(|&b| b > self.scroll_offset + EPSILON)
    }

    /// Scrolls to the nearest break above. Ignored while a turn is animating
    /// or when already at the top.
    pub fn page_up(&mut self) -> bool {
        self.page(PageDirection::Up, None)
    }

    pub fn page_down(&mut self) -> bool {
        self.page(PageDirection::Down, None)
    }

    /// [`page_up`](Self::page_up) with a completion callback.
    pub fn page_up_then(&mut self, done: impl FnOnce(&mut TextFlow, &dyn TextMeasure) + 'static) -> bool {
        self.page(PageDirection::Up, Some(Box::new(done)))
    }

    /// [`page_down`](Self::page_down) with a completion callback, run on the
    /// tick the turn completes.
    pub fn page_down_then(&mut self, done: impl FnOnce(&mut TextFlow, &dyn TextMeasure) + 'static) -> bool {
        self.page(PageDirection::Down, Some(Box::new(done)))
    }

    /// Snaps to the last page without animating.
    pub fn jump_to_last_page(&mut self) {
        self.cancel_scroll();
        self.scroll_offset = self.max_scroll();
    }

    /// Cancels an animating page turn; its callback is dropped unrun.
    pub fn cancel_scroll(&mut self) {
        if let Some(mut s) = self.scroll.take() {
            s.tween.cancel();
            self.scroll_offset = s.target;
        }
    }

    /// One frame: relayout if a watched attribute changed, then advance the
    /// page turn. Returns the direction of a turn completed this tick.
    pub fn tick(&mut self, dt: f32, measure: &dyn TextMeasure) -> Option<PageDirection> {
        self.dirty_check(measure);

        let scroll = self.scroll.as_mut()?;
        let step = scroll.tween.advance(dt);
        self.scroll_offset += step.get(TweenProp::ScrollY);
        if !step.completed {
            return None;
        }
        let mut done = self.scroll.take()?;
        self.scroll_offset = done.target;
        if let Some(callback) = done.on_done.take() {
            callback(self, measure);
        }
        Some(done.direction)
    }

    // ── paint ─────────────────────────────────────────────────────────────

    /// Paints the visible lines. `origin` is the screen top-left of the text
    /// box; the caller clips to the box.
    pub fn paint(&self, painter: &mut Painter<'_>, origin: Vec2, alpha: f32) {
        let pad = self.style.padding;
        for (i, line) in self.lines.iter().enumerate() {
            let y = pad.top + i as f32 * self.line_height - self.scroll_offset;
            if y + self.line_height <= 0.0 || y >= self.height {
                continue;
            }
            let x = self.aligned_x(i, pad.left);
            painter.text(&line.text, &self.style, Vec2::new(origin.x + x, origin.y + y), alpha);
        }
    }

    /// Screen rect of the text box.
    pub fn rect(&self, origin: Vec2) -> Rect {
        Rect::new(origin.x, origin.y, self.width, self.height)
    }

    // ── internal ──────────────────────────────────────────────────────────

    fn aligned_x(&self, line: usize, left: f32) -> f32 {
        let free = self.wrap_width() - self.line_widths.get(line).copied().unwrap_or(0.0);
        match self.style.align {
            TextAlign::Left => left,
            TextAlign::Center => left + free / 2.0,
            TextAlign::Right => left + free,
        }
    }

    fn max_scroll(&self) -> f32 {
        self.page_breaks.last().copied().unwrap_or(0.0)
    }

    fn page(&mut self, direction: PageDirection, on_done: Option<PageCallback>) -> bool {
        if self.is_scrolling() {
            log::trace!("page turn ignored while scrolling");
            return false;
        }
        let offset = self.scroll_offset;
        let target = match direction {
            PageDirection::Down => self
                .page_breaks
                .iter()
                .copied()
                .find(|&b| b > offset + EPSILON)
                .unwrap_or_else(|| self.max_scroll()),
            PageDirection::Up => {
                self.page_breaks.iter().rev().copied().find(|&b| b < offset - EPSILON).unwrap_or(0.0)
            }
        };
        if (target - offset).abs() <= EPSILON {
            return false;
        }
        let tween = Tween::new(PAGE_SCROLL_MS)
            .by(TweenProp::ScrollY, target - offset)
            .ease(Ease::CubicInOut);
        self.scroll = Some(PageScroll { tween, target, direction, on_done });
        true
    }

    /// Re-wraps from line `from` to the end and places the cursor.
    fn relayout_from(&mut self, from: usize, measure: &dyn TextMeasure) {
        let mut source = self.content.clone();
        if let Some(glyph) = self.cursor_glyph {
            source.push(glyph);
        }
        let mut start = self.lines.get(from).map_or(0, |l| l.start).min(self.content.len());
        if !source.is_char_boundary(start) {
            start = 0;
        }
        let first = if start == 0 { 0 } else { from };

        let wrap_width = self.wrap_width();
        let tail = wrap_text(measure, &self.style, &source[start..], wrap_width);
        self.lines.truncate(first);
        self.lines.extend(tail.into_iter().map(|l| WrappedLine { start: l.start + start, text: l.text }));

        if self.cursor_glyph.is_some() {
            if let Some(last) = self.lines.last_mut() {
                last.text.pop();
            }
        }
        self.line_widths.truncate(first);
        for line in &self.lines[first..] {
            self.line_widths.push(measure.measure(&line.text, &self.style).x);
        }
        self.place_cursor(measure);
    }

    fn place_cursor(&mut self, measure: &dyn TextMeasure) {
        let pad = self.style.padding;
        let last = self.lines.last().map_or("", |l| l.text.as_str());
        let body = last.trim_end();
        let trailing: f32 = last[body.len()..].chars().map(|c| self.whitespace_width(c, measure)).sum();

        let x = pad.left + measure.measure(body, &self.style).x + trailing;
        let row = self.lines.len().saturating_sub(1) as f32;
        let y = pad.top + row * self.line_height;

        self.cursor_overflow = x + self.glyph_width > self.right_edge() + EPSILON;
        self.cursor = if self.cursor_overflow {
            Vec2::new(pad.left, y + self.line_height)
        } else {
            Vec2::new(x, y)
        };
    }

    /// Advance of one whitespace char, measured between two glyphs since
    /// trailing whitespace measures as zero.
    fn whitespace_width(&self, c: char, measure: &dyn TextMeasure) -> f32 {
        if c == ' ' {
            return self.space_width;
        }
        let mut buf = [0; 4];
        let between = format!("I{}I", c.encode_utf8(&mut buf));
        measure.measure(&between, &self.style).x - measure.measure("II", &self.style).x
    }

        fn rebuild_breaks(&mut self) {
        self.page_breaks.clear();
        self.extend_breaks();
        let max = self.max_scroll();
        if self.scroll_offset > max {
            self.cancel_scroll();
            self.scroll_offset = max;
        }
    }

    /// Records every page boundary known from the current line count.
    fn extend_breaks(&mut self) {
        let per_page = self.lines_per_page();
        let page_height = self.page_height();
        let total = self.total_lines();
        let mut k = self.page_breaks.len() + 1;
        while k * per_page < total {
            self.page_breaks.push(k as f32 * page_height);
            k += 1;
        }
    }
}

impl<'m> Regeneratable<&'m dyn TextMeasure> for TextFlow {
    fn tracker(&self) -> &DirtyTracker<Self> {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut DirtyTracker<Self> {
        &mut self.tracker
    }

    fn regenerate(&mut self, measure: &'m dyn TextMeasure) {
        self.line_height = measure.line_height(&self.style);
        self.space_width = measure.space_width(&self.style);
        self.glyph_width = self
            .cursor_glyph
            .map_or(0.0, |g| measure.measure(g.encode_utf8(&mut [0; 4]), &self.style).x);
        self.relayout_from(0, measure);
        self.rebuild_breaks();
    }
}

impl fmt::Debug for TextFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFlow")
            .field("content", &self.content)
            .field("lines", &self.lines.len())
            .field("page_breaks", &self.page_breaks)
            .field("scroll_offset", &self.scroll_offset)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use domless_engine::text::MonospaceMetrics;

    use super::*;

    // 24px text with monospace metrics: 12px glyphs, 30px lines, padding 10.
    const M: MonospaceMetrics = MonospaceMetrics { advance: 0.5, leading: 1.25 };

    fn field(width_glyphs: usize, lines: usize) -> TextFlow {
        let width = width_glyphs as f32 * 12.0 + 20.0;
        let height = lines as f32 * 30.0 + 20.0;
        TextFlow::new("", TextStyle::default(), width, height, Some('_'), &M)
    }

    fn ten_lines() -> String {
        (1..=10).map(|i| i.to_string()).collect::<Vec<_>>().join("\n")
    }

    fn settle(flow: &mut TextFlow) -> Vec<PageDirection> {
        (0..40).filter_map(|_| flow.tick(16.0, &M)).collect()
    }

    // ── cursor ────────────────────────────────────────────────────────────

    #[test]
    fn cursor_follows_last_glyph() {
        let mut flow = field(20, 3);
        flow.set_text("abc", &M);
        assert_eq!(flow.cursor_position(), Vec2::new(10.0 + 36.0, 10.0));
    }

    #[test]
    fn trailing_spaces_move_the_cursor() {
        let mut flow = field(20, 3);
        flow.set_text("ab  ", &M);
        assert_eq!(flow.cursor_position().x, 10.0 + 24.0 + 24.0);
    }

    #[test]
    fn trailing_tabs_and_wide_spaces_move_the_cursor() {
        let mut flow = field(20, 3);
        flow.set_text("ab\t", &M);
        assert_eq!(flow.cursor_position().x, 10.0 + 24.0 + 12.0);
        flow.set_text("ab \t\u{3000}", &M);
        assert_eq!(flow.cursor_position().x, 10.0 + 24.0 + 36.0);
    }

        #[test]
    fn newline_puts_cursor_on_next_line() {
        let mut flow = field(20, 3);
        flow.set_text("ab\n", &M);
        assert_eq!(flow.cursor_position(), Vec2::new(10.0, 40.0));
        assert_eq!(flow.line_texts(), ["ab", ""]);
    }

    #[test]
    fn glyph_is_reserved_on_full_line() {
        let mut flow = field(5, 3);
        flow.set_text("abcde", &M);
        assert_eq!(flow.line_texts(), ["abcde", ""]);
        assert_eq!(flow.cursor_position(), Vec2::new(10.0, 40.0));
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let samples = [
            "",
            "a",
            "hello world",
            "word    ",
            "a very long sentence that wraps over several lines of text",
            "supercalifragilisticexpialidocious",
            "trailing spaces after wrap                      ",
            "x\n\ny\n",
        ];
        for glyphs in [1, 3, 5, 8, 13] {
            for text in samples {
                let mut flow = field(glyphs, 4);
                flow.set_text(text, &M);
                let edge = flow.right_edge();
                assert!(
                    flow.cursor().x + 12.0 <= edge + 1e-3,
                    "{text:?} at {glyphs} glyphs: cursor {:?}",
                    flow.cursor()
                );
            }
        }
    }

    #[test]
    fn overflow_without_glyph_moves_cursor_down() {
        let mut flow = TextFlow::new("", TextStyle::default(), 5.0 * 12.0 + 20.0, 200.0, None, &M);
        flow.set_text("ab          ", &M);
        assert_eq!(flow.line_texts(), ["ab          "]);
        assert_eq!(flow.cursor(), Vec2::new(10.0, 40.0));
        assert_eq!(flow.total_lines(), 2);
    }

    // ── pagination ────────────────────────────────────────────────────────

    #[test]
    fn ten_lines_at_three_per_page_give_three_breaks() {
        let mut flow = field(20, 3);
        flow.append(&ten_lines(), &M);
        assert_eq!(flow.lines_per_page(), 3);
        assert_eq!(flow.page_breaks(), [90.0, 180.0, 270.0]);
        assert!(flow.can_page_down());
        assert!(!flow.can_page_up());
    }

    #[test]
    fn page_breaks_grow_monotonically() {
        let fragments = ["one two ", "three\nfour ", "five six seven", "\n\n", "eight nine ten eleven"];
        let mut flow = field(6, 2);
        for _ in 0..4 {
            for frag in fragments {
                flow.append(frag, &M);
                let breaks = flow.page_breaks();
                assert!(breaks.windows(2).all(|w| w[0] < w[1]), "{breaks:?}");
            }
        }
        assert!(flow.page_breaks().len() > 3);
    }

    #[test]
    fn incremental_append_matches_full_layout() {
        let fragments = ["lorem ", "ipsum dolor", " sit", " amet,\nconsectetur ", "adipiscing", "elit  ", "x"];
        for glyphs in [4, 7, 11] {
            let mut incremental = field(glyphs, 2);
            let mut text = String::new();
            for frag in fragments {
                incremental.append(frag, &M);
                text.push_str(frag);
                let mut full = field(glyphs, 2);
                full.set_text(&text, &M);
                assert_eq!(incremental.lines(), full.lines(), "{text:?} at {glyphs}");
                assert_eq!(incremental.cursor(), full.cursor());
                assert_eq!(incremental.page_breaks(), full.page_breaks());
            }
        }
    }

    #[test]
    fn backspace_matches_full_layout() {
        let mut flow = field(5, 2);
        flow.set_text("abc defgh ij\nk", &M);
        let mut text = flow.content().to_string();
        while flow.backspace(&M) {
            text.pop();
            let mut full = field(5, 2);
            full.set_text(&text, &M);
            assert_eq!(flow.lines(), full.lines());
            assert_eq!(flow.cursor(), full.cursor());
        }
        assert!(flow.content().is_empty());
        assert!(flow.page_breaks().is_empty());
    }

    // ── page turns ────────────────────────────────────────────────────────

    #[test]
    fn page_down_scrolls_to_next_break() {
        let mut flow = field(20, 3);
        flow.set_text(&ten_lines(), &M);
        assert!(flow.page_down());
        assert!(!flow.page_down());
        assert_eq!(settle(&mut flow), vec![PageDirection::Down]);
        assert_eq!(flow.scroll_offset(), 90.0);
        assert!(flow.can_page_up());
    }

    #[test]
    fn page_up_returns_to_top() {
        let mut flow = field(20, 3);
        flow.set_text(&ten_lines(), &M);
        flow.page_down();
        settle(&mut flow);
        assert!(flow.page_up());
        settle(&mut flow);
        assert_eq!(flow.scroll_offset(), 0.0);
        assert!(!flow.page_up());
    }

    #[test]
    fn last_page_cannot_page_down() {
        let mut flow = field(20, 3);
        flow.set_text(&ten_lines(), &M);
        flow.jump_to_last_page();
        assert_eq!(flow.scroll_offset(), 270.0);
        assert!(!flow.can_page_down());
        assert!(!flow.page_down());
    }

    #[test]
    fn completion_callback_runs_once() {
        let mut flow = field(20, 3);
        flow.set_text(&ten_lines(), &M);
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        assert!(flow.page_down_then(move |flow, m| {
            seen.set(seen.get() + 1);
            flow.append("\nmore", m);
        }));
        settle(&mut flow);
        assert_eq!(calls.get(), 1);
        assert!(flow.content().ends_with("more"));
    }

    #[test]
    fn scroll_position_of_cursor_tracks_offset() {
        let mut flow = field(20, 3);
        flow.set_text(&ten_lines(), &M);
        let before = flow.cursor_position().y;
        flow.jump_to_last_page();
        assert_eq!(flow.cursor_position().y, before - 270.0);
    }

    // ── dirty check ───────────────────────────────────────────────────────

    #[test]
    fn font_size_change_relayouts_on_tick() {
        let mut flow = field(20, 3);
        flow.set_text("abc", &M);
        flow.style_mut().font_size = 48.0;
        flow.tick(16.0, &M);
        assert_eq!(flow.line_height(), 60.0);
        assert_eq!(flow.cursor_position().x, 10.0 + 72.0);
    }

    #[test]
    fn shrinking_content_clamps_scroll() {
        let mut flow = field(20, 3);
        flow.set_text(&ten_lines(), &M);
        flow.jump_to_last_page();
        flow.set_text("short", &M);
        assert_eq!(flow.scroll_offset(), 0.0);
    }
}
