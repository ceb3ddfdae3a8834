use std::collections::HashMap;

use crate::paint::Color;

/// Kind of generated rounded-rectangle primitive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Shape {
    /// 1.2px stroked outline.
    Outline,
    /// Solid fill.
    Fill,
}

/// Structural identity of a generated primitive.
///
/// Float dimensions are keyed by bit pattern so equal geometry always maps
/// to the same texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PrimitiveKey {
    pub shape: Shape,
    width: u32,
    height: u32,
    radius: u32,
    color: [u8; 4],
}

impl PrimitiveKey {
    pub fn new(shape: Shape, width: f32, height: f32, radius: f32, color: Color) -> Self {
        Self {
            shape,
            width: width.to_bits(),
            height: height.to_bits(),
            radius: radius.to_bits(),
            color: color.to_srgb_u8(),
        }
    }

    pub fn width(&self) -> f32 {
        f32::from_bits(self.width)
    }

    pub fn height(&self) -> f32 {
        f32::from_bits(self.height)
    }

    pub fn radius(&self) -> f32 {
        f32::from_bits(self.radius)
    }
}

/// Handle to a primitive texture generated by the host.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub u32);

/// Append-only cache of generated primitives.
///
/// Many widgets of identical geometry share one texture. Entries live for
/// the lifetime of the cache; the cache is owned by the UI scene, not global.
#[derive(Debug, Default)]
pub struct PrimitiveCache {
    textures: HashMap<PrimitiveKey, TextureId>,
}

impl PrimitiveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the texture for `key`, generating it on first request.
    pub fn get_or_generate(&mut self, key: PrimitiveKey) -> TextureId {
        let next = TextureId(self.textures.len() as u32);
        *self.textures.entry(key).or_insert_with(|| {
            log::trace!("generating {:?} {}x{} r{}", key.shape, key.width(), key.height(), key.radius());
            next
        })
    }

    pub fn contains(&self, key: &PrimitiveKey) -> bool {
        self.textures.contains_key(key)
    }

    /// Number of distinct primitives ever generated.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(w: f32, h: f32) -> PrimitiveKey {
        PrimitiveKey::new(Shape::Outline, w, h, 15.0, Color::WHITE)
    }

    #[test]
    fn same_geometry_shares_texture() {
        let mut cache = PrimitiveCache::new();
        let a = cache.get_or_generate(outline(60.0, 60.0));
        let b = cache.get_or_generate(outline(60.0, 60.0));
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn shape_size_and_color_are_distinct_keys() {
        let mut cache = PrimitiveCache::new();
        cache.get_or_generate(outline(60.0, 60.0));
        cache.get_or_generate(outline(60.0, 61.0));
        cache.get_or_generate(PrimitiveKey::new(Shape::Fill, 60.0, 60.0, 15.0, Color::WHITE));
        cache.get_or_generate(PrimitiveKey::new(Shape::Fill, 60.0, 60.0, 15.0, Color::BLACK));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn key_reports_its_geometry() {
        let key = outline(120.0, 45.5);
        assert_eq!(key.width(), 120.0);
        assert_eq!(key.height(), 45.5);
        assert_eq!(key.radius(), 15.0);
    }
}
