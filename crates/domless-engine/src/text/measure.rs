use crate::coords::Vec2;

use super::TextStyle;

/// Text metrics supplied by the host.
///
/// `measure` returns the width of the widest line and the height of all
/// lines. Trailing whitespace on a line is not charged any width, matching
/// how renderers lay out line ends.
pub trait TextMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> Vec2;

    /// Height of one rendered line.
    fn line_height(&self, style: &TextStyle) -> f32 {
        self.measure("foobar", style).y
    }

    /// Width of a single space between two glyphs.
    fn space_width(&self, style: &TextStyle) -> f32 {
        self.measure("I I", style).x - self.measure("II", style).x
    }
}

/// Deterministic fixed-advance metrics.
///
/// Every glyph advances `font_size * advance` and every line is
/// `font_size * leading` tall.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f32,
    pub leading: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { advance: 0.5, leading: 1.25 }
    }
}

impl TextMeasure for MonospaceMetrics {
    fn measure(&self, text: &str, style: &TextStyle) -> Vec2 {
        let glyph = style.font_size * self.advance;
        let mut widest = 0usize;
        let mut lines = 0usize;
        for line in text.split('\n') {
            widest = widest.max(line.trim_end().chars().count());
            lines += 1;
        }
        Vec2::new(widest as f32 * glyph, lines as f32 * style.font_size * self.leading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_line_metrics() {
        let m = MonospaceMetrics::default();
        let style = TextStyle::default();
        assert_eq!(m.line_height(&style), 30.0);
        assert_eq!(m.space_width(&style), 12.0);
    }

    #[test]
    fn trailing_spaces_are_free() {
        let m = MonospaceMetrics::default();
        let style = TextStyle::default();
        assert_eq!(m.measure("ab   ", &style).x, m.measure("ab", &style).x);
        assert_eq!(m.measure("  ab", &style).x, 48.0);
    }

    #[test]
    fn multi_line_height_and_widest_width() {
        let m = MonospaceMetrics::default();
        let style = TextStyle::default();
        assert_eq!(m.measure("a\nabc\n", &style), Vec2::new(36.0, 90.0));
    }
}
