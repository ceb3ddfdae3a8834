use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::text::TextStyle;

use super::{DrawCmd, RectCmd, SortKey, SpriteCmd, TextCmd, TextureId, ZIndex};

/// A single draw item: sort key + command + clip rect.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
    /// Scissor rect in logical pixels. `None` = no clipping (draw everywhere).
    pub clip_rect: Option<Rect>,
}

/// Recorded draw stream for a frame.
///
/// # Clipping
///
/// Use [`push_clip`](Self::push_clip) / [`pop_clip`](Self::pop_clip) to scope
/// draw commands to a scissor rect. Clips are intersected with the current
/// parent, so a text area inside a clipped dropdown stays inside both.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,

    /// The top is always the current effective clip, already intersected with all parents.
    clip_stack: Vec<Rect>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items and the clip stack. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted_dirty = true;
        self.sorted_indices.clear();
        self.clip_stack.clear();
    }

    /// Returns items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes a draw command with the given z-index.
    ///
    /// The item inherits the current clip rect from the clip stack.
    #[inline]
    pub fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            cmd,
            clip_rect: self.clip_stack.last().copied(),
        });

        self.sorted_dirty = true;
    }

    pub fn push_sprite(&mut self, z: ZIndex, texture: TextureId, rect: Rect, alpha: f32) {
        self.push(z, DrawCmd::Sprite(SpriteCmd { texture, rect, alpha }));
    }

    pub fn push_rect(&mut self, z: ZIndex, rect: Rect, radius: f32, color: Color) {
        self.push(z, DrawCmd::Rect(RectCmd { rect, radius, color }));
    }

    pub fn push_text(
        &mut self,
        z: ZIndex,
        text: impl Into<String>,
        style: &TextStyle,
        origin: Vec2,
        alpha: f32,
    ) {
        self.push(z, DrawCmd::Text(TextCmd { text: text.into(), style: style.clone(), origin, alpha }));
    }

    /// Begins a scissor region, intersected with any parent clip rect.
    ///
    /// Calls must be balanced with [`pop_clip`](Self::pop_clip).
    #[inline]
    pub fn push_clip(&mut self, rect: Rect) {
        let effective = match self.clip_stack.last() {
            None => rect,
            // No overlap: a zero-area rect makes the renderer skip the draws.
            Some(&parent) => parent.intersect(rect).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0)),
        };
        self.clip_stack.push(effective);
    }

    /// Ends the most recent scissor region.
    #[inline]
    pub fn pop_clip(&mut self) {
        debug_assert!(!self.clip_stack.is_empty(), "pop_clip called without matching push_clip");
        self.clip_stack.pop();
    }

    /// Iterates items in paint order without cloning draw commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        // Stable ordering is ensured by SortKey including insertion order.
        self.sorted_indices
            .sort_by(|&a, &b| self.items[a].key.cmp(&self.items[b].key));

        self.sorted_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_order_is_depth_then_insertion() {
        let mut list = DrawList::new();
        list.push_rect(ZIndex(5), Rect::new(0.0, 0.0, 1.0, 1.0), 0.0, Color::WHITE);
        list.push_rect(ZIndex(0), Rect::new(1.0, 0.0, 1.0, 1.0), 0.0, Color::WHITE);
        list.push_rect(ZIndex(0), Rect::new(2.0, 0.0, 1.0, 1.0), 0.0, Color::WHITE);
        let xs: Vec<f32> = list
            .iter_in_paint_order()
            .map(|item| match &item.cmd {
                DrawCmd::Rect(r) => r.rect.origin.x,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(xs, [1.0, 2.0, 0.0]);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut list = DrawList::new();
        list.push_clip(Rect::new(0.0, 0.0, 100.0, 100.0));
        list.push_clip(Rect::new(50.0, 50.0, 100.0, 100.0));
        list.push_rect(ZIndex(0), Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Color::BLACK);
        list.pop_clip();
        list.pop_clip();
        list.push_rect(ZIndex(0), Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, Color::BLACK);
        assert_eq!(list.items()[0].clip_rect, Some(Rect::new(50.0, 50.0, 50.0, 50.0)));
        assert_eq!(list.items()[1].clip_rect, None);
    }
}
