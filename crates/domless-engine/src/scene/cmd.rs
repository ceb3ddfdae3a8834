use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::text::TextStyle;

use super::TextureId;

/// A generated primitive (outline or fill) stretched over `rect`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteCmd {
    pub texture: TextureId,
    pub rect: Rect,
    pub alpha: f32,
}

/// Solid rectangle (drawer backgrounds, modal dimmer, scrollbar).
#[derive(Debug, Clone, PartialEq)]
pub struct RectCmd {
    pub rect: Rect,
    pub radius: f32,
    pub color: Color,
}

/// One block of text. `origin` is the top-left of the first line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCmd {
    pub text: String,
    pub style: TextStyle,
    pub origin: Vec2,
    pub alpha: f32,
}

/// Renderer-agnostic draw command stream.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Sprite(SpriteCmd),
    Rect(RectCmd),
    Text(TextCmd),
}
