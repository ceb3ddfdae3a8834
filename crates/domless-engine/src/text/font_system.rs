use std::collections::HashMap;
use std::fmt;

use crate::coords::Vec2;

use super::{TextMeasure, TextStyle};

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Owns a collection of loaded fonts, addressable by family name.
///
/// Fonts are immutable after loading. The first font loaded is the fallback
/// for families that were never registered.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
    families: HashMap<String, FontId>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new(), families: HashMap::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes under `family`.
    pub fn load_font(&mut self, family: &str, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        self.families.insert(family.to_string(), id);
        log::debug!("loaded font family {family:?} as {id:?}");
        Ok(id)
    }

    /// Resolves a family name, falling back to the first loaded font.
    pub fn font_for(&self, family: &str) -> Option<FontId> {
        self.families
            .get(family)
            .copied()
            .or_else(|| (!self.fonts.is_empty()).then_some(FontId(0)))
    }

    fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    fn line_size(&self, id: FontId, size: f32) -> f32 {
        self.get(id)
            .and_then(|f| f.horizontal_line_metrics(size))
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2)
    }

    /// Width of a single unwrapped line, measured by pen advance.
    fn line_width(&self, text: &str, id: FontId, size: f32) -> f32 {
        use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle as FontStyle};

        let Some(font) = self.get(id) else {
            return 0.0;
        };
        if text.is_empty() {
            return 0.0;
        }

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &FontStyle::new(text, size, 0));

        // Pen position after each glyph rather than the bitmap right edge, so
        // a width measured here is never narrower than the renderer's advance.
        layout
            .glyphs()
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max)
    }
}

impl TextMeasure for FontSystem {
    fn measure(&self, text: &str, style: &TextStyle) -> Vec2 {
        let Some(id) = self.font_for(&style.font_family) else {
            return Vec2::new(0.0, style.font_size * 1.2);
        };
        let mut width = 0.0f32;
        let mut lines = 0usize;
        for line in text.split('\n') {
            width = width.max(self.line_width(line.trim_end(), id, style.font_size));
            lines += 1;
        }
        Vec2::new(width, lines as f32 * self.line_size(id, style.font_size))
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}
