use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use domless_engine::coords::{Rect, Vec2};
use domless_engine::input::Key;
use domless_engine::paint::Color;
use domless_engine::scene::{PrimitiveCache, PrimitiveKey, Shape, TextureId};
use domless_engine::tween::{Tween, TweenProp};

use crate::context::UiCtx;
use crate::dirty::{DirtyTracker, Regeneratable};
use crate::error::{positive, WidgetError};
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// Stretch animation length: 15 frames at 60 fps.
pub const STRETCH_MS: f32 = 250.0;

// ── WidgetId ──────────────────────────────────────────────────────────────

/// Process-unique widget identity, stable for the widget's lifetime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct WidgetId(u64);

impl WidgetId {
    pub fn new() -> Self {
        WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── WidgetConfig ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub has_outline: bool,
    pub has_fill: bool,
    pub outline_color: Color,
    pub fill_color: Color,
    pub fill_alpha: f32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 60.0,
            height: 60.0,
            radius: 15.0,
            has_outline: true,
            has_fill: false,
            outline_color: Color::WHITE,
            fill_color: Color::WHITE,
            fill_alpha: 1.0,
        }
    }
}

impl WidgetConfig {
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn outline(mut self, on: bool) -> Self {
        self.has_outline = on;
        self
    }

    pub fn fill(mut self, on: bool) -> Self {
        self.has_fill = on;
        self
    }
}

// ── Widget ────────────────────────────────────────────────────────────────

/// A generated primitive owned by one widget.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub key: PrimitiveKey,
    pub texture: TextureId,
}

struct Stretch {
    tween: Tween,
    width: f32,
    height: f32,
    preview: Vec2,
}

/// Base reactive node: geometry, style, activation and the outline/fill
/// primitives generated from them.
///
/// `x`/`y` are the local offset inside the parent. Geometry and style fields
/// are public; changing any watched field is picked up by the next
/// [`tick`](Widget::tick), which regenerates both primitives together.
pub struct Widget {
    id: WidgetId,

    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,

    pub has_outline: bool,
    pub has_fill: bool,
    pub outline_color: Color,
    pub fill_color: Color,
    /// Opacity of the fill sprite alone. Animated (button flash), never watched.
    pub fill_alpha: f32,

    /// Overall opacity; 0 hides the widget without destroying it.
    pub alpha: f32,
    /// Paint-order layer, see [`DepthStack`](domless_engine::scene::DepthStack).
    pub depth: i32,
    /// 1 scrolls with the camera, 0 stays fixed to the viewport.
    pub scroll_factor: f32,

    active: bool,
    interactive: bool,
    key: Option<Key>,
    key_bound: bool,

    outline: Option<Sprite>,
    fill: Option<Sprite>,
    tracker: DirtyTracker<Widget>,
    regenerations: u32,
    stretch: Option<Stretch>,
    destroyed: bool,
}

impl Widget {
    /// Builds the widget and generates its primitives once.
    pub fn new(config: WidgetConfig, textures: &mut PrimitiveCache) -> Result<Self, WidgetError> {
        positive("widget width", config.width)?;
        positive("widget height", config.height)?;

        let mut widget = Self {
            id: WidgetId::new(),
            x: config.x,
            y: config.y,
            width: config.width,
            height: config.height,
            radius: config.radius,
            has_outline: config.has_outline,
            has_fill: config.has_fill,
            outline_color: config.outline_color,
            fill_color: config.fill_color,
            fill_alpha: config.fill_alpha,
            alpha: 1.0,
            depth: 0,
            scroll_factor: 1.0,
            active: false,
            interactive: false,
            key: None,
            key_bound: false,
            outline: None,
            fill: None,
            tracker: DirtyTracker::<Widget>::new()
                .watch("width", |w| w.width.into())
                .watch("height", |w| w.height.into())
                .watch("radius", |w| w.radius.into())
                .watch("has_outline", |w| w.has_outline.into())
                .watch("has_fill", |w| w.has_fill.into())
                .watch("outline_color", |w| w.outline_color.into())
                .watch("fill_color", |w| w.fill_color.into()),
            regenerations: 0,
            stretch: None,
            destroyed: false,
        };
        widget.dirty_check(textures);
        Ok(widget)
    }

    #[inline]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Adds an attribute to the watched set. See [`DirtyTracker::register`].
    pub fn register_watched(&mut self, id: &'static str, accessor: fn(&Widget) -> crate::dirty::WatchValue) {
        self.tracker.register(id, accessor);
    }

    /// Key this widget reacts to while active.
    pub fn bind_key(&mut self, key: Option<Key>) {
        self.key = key;
        self.key_bound = self.active && key.is_some();
    }

    #[inline]
    pub fn key(&self) -> Option<Key> {
        self.key
    }

    /// The bound key, if it is currently subscribed.
    #[inline]
    pub fn bound_key(&self) -> Option<Key> {
        if self.key_bound { self.key } else { None }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Keeps a hit region while inactive, so a tap can activate the widget.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive && !self.destroyed;
    }

    /// Active, interactive and not destroyed.
    #[inline]
    pub fn accepts_input(&self) -> bool {
        self.active && self.interactive && !self.destroyed
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Shows the widget and starts accepting input. Returns false when already
    /// active (and not forced).
    pub fn activate(&mut self, force: bool) -> bool {
        if self.destroyed || (self.active && !force) {
            return false;
        }
        self.active = true;
        self.interactive = true;
        self.alpha = 1.0;
        self.key_bound = self.key.is_some();
        true
    }

    /// Stops accepting input. `hide` zeroes alpha; `disable_interactive` also
    /// drops the hit region.
    pub fn deactivate(&mut self, hide: bool, disable_interactive: bool, force: bool) -> bool {
        if !self.active && !force {
            return false;
        }
        self.active = false;
        self.key_bound = false;
        if hide {
            self.alpha = 0.0;
        }
        if disable_interactive {
            self.interactive = false;
        }
        true
    }

    #[inline]
    pub fn outline(&self) -> Option<&Sprite> {
        self.outline.as_ref()
    }

    #[inline]
    pub fn fill(&self) -> Option<&Sprite> {
        self.fill.as_ref()
    }

    /// Number of regenerations so far, the one at construction included.
    #[inline]
    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    /// Animates the outline to `width`×`height` over [`STRETCH_MS`], then
    /// commits the size. Outline and fill regenerate on the next tick after.
    pub fn stretch(&mut self, width: f32, height: f32) -> Result<(), WidgetError> {
        self.check_resizable("stretch", width, height)?;
        let preview = self.display_size();
        if let Some(mut old) = self.stretch.take() {
            old.tween.cancel();
        }
        let tween = Tween::new(STRETCH_MS)
            .by(TweenProp::Width, width - preview.x)
            .by(TweenProp::Height, height - preview.y);
        self.stretch = Some(Stretch { tween, width, height, preview });
        log::debug!("widget {} stretching to {width}x{height}", self.id);
        Ok(())
    }

    /// Sets the size immediately; regeneration follows on the next tick.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), WidgetError> {
        self.check_resizable("resize", width, height)?;
        if let Some(mut old) = self.stretch.take() {
            old.tween.cancel();
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    #[inline]
    pub fn is_stretching(&self) -> bool {
        self.stretch.is_some()
    }

    /// Size currently shown: the stretch preview while one runs.
    pub fn display_size(&self) -> Vec2 {
        match &self.stretch {
            Some(s) => s.preview,
            None => Vec2::new(self.width, self.height),
        }
    }

    /// One frame: dirty check first, then this widget's own animations.
    pub fn tick(&mut self, dt: f32, textures: &mut PrimitiveCache) {
        if self.destroyed {
            return;
        }
        self.dirty_check(textures);

        let Some(stretch) = self.stretch.as_mut() else { return };
        let step = stretch.tween.advance(dt);
        stretch.preview.x += step.get(TweenProp::Width);
        stretch.preview.y += step.get(TweenProp::Height);
        if step.completed {
            self.width = stretch.width;
            self.height = stretch.height;
            self.stretch = None;
        }
    }

    /// Releases the primitives and cancels in-flight animations.
    pub fn destroy(&mut self) {
        if let Some(mut s) = self.stretch.take() {
            s.tween.cancel();
        }
        self.outline = None;
        self.fill = None;
        self.active = false;
        self.interactive = false;
        self.key_bound = false;
        self.destroyed = true;
    }

    /// Screen rect given the parent's screen origin.
    pub fn rect(&self, origin: Vec2) -> Rect {
        let size = self.display_size();
        Rect::new(origin.x + self.x, origin.y + self.y, size.x, size.y)
    }

    /// Screen-space origin for this widget's children.
    #[inline]
    pub fn child_origin(&self, origin: Vec2) -> Vec2 {
        Vec2::new(origin.x + self.x, origin.y + self.y)
    }

    /// Hit test for input: inside and accepting input.
    pub fn hit(&self, origin: Vec2, pos: Vec2) -> bool {
        self.accepts_input() && self.rect(origin).contains(pos)
    }

    pub fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.destroyed || self.alpha <= 0.0 {
            return;
        }
        let rect = self.rect(origin);
        if let Some(fill) = &self.fill {
            painter.sprite(fill.texture, rect, self.alpha * self.fill_alpha);
        }
        if let Some(outline) = &self.outline {
            painter.sprite(outline.texture, rect, self.alpha);
        }
    }

    fn check_resizable(&self, operation: &'static str, width: f32, height: f32) -> Result<(), WidgetError> {
        if !self.has_outline || self.outline.is_none() {
            log::warn!("widget {} has no outline, cannot {operation}", self.id);
            return Err(WidgetError::NoVisualPrimitive { widget: self.id, operation });
        }
        positive("widget width", width)?;
        positive("widget height", height)?;
        let target = match &self.stretch {
            Some(s) => (s.width, s.height),
            None => (self.width, self.height),
        };
        if target == (width, height) {
            return Err(WidgetError::UnchangedSize { widget: self.id, width, height });
        }
        Ok(())
    }
}

impl<'a> Regeneratable<&'a mut PrimitiveCache> for Widget {
    fn tracker(&self) -> &DirtyTracker<Self> {
        &self.tracker
    }

    fn tracker_mut(&mut self) -> &mut DirtyTracker<Self> {
        &mut self.tracker
    }

    /// Destroys both primitives, then recreates whichever are enabled. The
    /// cache hands back the same texture for the same key.
    fn regenerate(&mut self, textures: &'a mut PrimitiveCache) {
        self.outline = None;
        self.fill = None;

        let mut make = |shape, color| {
            let key = PrimitiveKey::new(shape, self.width, self.height, self.radius, color);
            Sprite { key, texture: textures.get_or_generate(key) }
        };
        if self.has_outline {
            self.outline = Some(make(Shape::Outline, self.outline_color));
        }
        if self.has_fill {
            self.fill = Some(make(Shape::Fill, self.fill_color));
        }
        self.regenerations += 1;
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

// ── Component ─────────────────────────────────────────────────────────────

/// A node in the widget tree.
///
/// Every component is built around one base [`Widget`]. `origin` arguments
/// are the parent's screen-space origin; a component's own rect is
/// `base().rect(origin)`.
pub trait Component {
    fn base(&self) -> &Widget;

    fn base_mut(&mut self) -> &mut Widget;

    fn id(&self) -> WidgetId {
        self.base().id()
    }

    /// One frame. Implementations run the base dirty check before advancing
    /// any of their own tweens.
    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base_mut().tick(dt, ctx.textures);
    }

    /// Route an input event. Return [`EventResult::Consumed`] to stop propagation.
    fn on_event(&mut self, _event: &UiEvent, _origin: Vec2, _ctx: &mut UiCtx<'_>) -> EventResult {
        EventResult::Ignored
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        self.base().paint(painter, origin);
    }

    fn bounds(&self, origin: Vec2) -> Rect {
        self.base().rect(origin)
    }

    /// Destroys this component and everything it owns.
    fn destroy(&mut self) {
        self.base_mut().destroy();
    }
}

impl Component for Widget {
    fn base(&self) -> &Widget {
        self
    }

    fn base_mut(&mut self) -> &mut Widget {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(cache: &mut PrimitiveCache) -> Widget {
        Widget::new(WidgetConfig::default().fill(true), cache).unwrap()
    }

    // ── regenerate ────────────────────────────────────────────────────────

    #[test]
    fn construction_generates_both_primitives() {
        let mut cache = PrimitiveCache::new();
        let w = widget(&mut cache);
        assert!(w.outline().is_some());
        assert!(w.fill().is_some());
        assert_eq!(w.regenerations(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn regenerate_is_idempotent() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        w.regenerate(&mut cache);
        let first = (w.outline().copied(), w.fill().copied());
        w.regenerate(&mut cache);
        assert_eq!((w.outline().copied(), w.fill().copied()), first);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn identical_geometry_shares_textures() {
        let mut cache = PrimitiveCache::new();
        let a = widget(&mut cache);
        let b = widget(&mut cache);
        assert_eq!(a.outline().map(|s| s.texture), b.outline().map(|s| s.texture));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn no_outline_no_fill_has_no_primitives() {
        let mut cache = PrimitiveCache::new();
        let mut w = Widget::new(WidgetConfig::default().outline(false), &mut cache).unwrap();
        assert!(w.outline().is_none() && w.fill().is_none());
        assert!(w.activate(false));
    }

    // ── dirty check ───────────────────────────────────────────────────────

    #[test]
    fn watched_change_regenerates_exactly_once() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        w.width = 120.0;
        w.radius = 5.0;
        w.tick(16.0, &mut cache);
        assert_eq!(w.regenerations(), 2);
        w.tick(16.0, &mut cache);
        assert_eq!(w.regenerations(), 2);
        assert_eq!(w.outline().map(|s| s.key.width()), Some(120.0));
    }

    #[test]
    fn unwatched_change_does_not_regenerate() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        w.x = 40.0;
        w.fill_alpha = 0.3;
        w.tick(16.0, &mut cache);
        assert_eq!(w.regenerations(), 1);
    }

    #[test]
    fn disabling_fill_drops_the_fill_primitive() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        w.has_fill = false;
        w.tick(16.0, &mut cache);
        assert!(w.fill().is_none());
        assert!(w.outline().is_some());
    }

    #[test]
    fn registered_attribute_is_watched() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        w.tick(16.0, &mut cache);
        w.register_watched("x", |w| w.x.into());
        w.tick(16.0, &mut cache);
        assert_eq!(w.regenerations(), 2);
        w.x = 3.0;
        w.tick(16.0, &mut cache);
        assert_eq!(w.regenerations(), 3);
    }

    // ── activation ────────────────────────────────────────────────────────

    #[test]
    fn activate_twice_is_a_no_op_unless_forced() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        assert!(!w.is_active());
        assert!(w.activate(false));
        assert!(!w.activate(false));
        assert!(w.activate(true));
    }

    #[test]
    fn key_binding_follows_activation() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        w.bind_key(Some(Key::ArrowRight));
        assert_eq!(w.bound_key(), None);
        w.activate(false);
        assert_eq!(w.bound_key(), Some(Key::ArrowRight));
        w.deactivate(true, false, false);
        assert_eq!(w.bound_key(), None);
        assert_eq!(w.alpha, 0.0);
        assert!(w.is_interactive());
    }

    // ── stretch / resize ──────────────────────────────────────────────────

    #[test]
    fn stretch_without_outline_fails_without_mutation() {
        let mut cache = PrimitiveCache::new();
        let mut w = Widget::new(WidgetConfig::default().outline(false).fill(true), &mut cache).unwrap();
        let err = w.stretch(100.0, 100.0).unwrap_err();
        assert!(matches!(err, WidgetError::NoVisualPrimitive { operation: "stretch", .. }));
        assert!(!w.is_stretching());
        assert_eq!(w.width, 60.0);
    }

    #[test]
    fn stretch_to_same_size_is_rejected() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        assert!(matches!(w.stretch(60.0, 60.0), Err(WidgetError::UnchangedSize { .. })));
    }

    #[test]
    fn stretch_commits_size_then_regenerates() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        w.stretch(120.0, 90.0).unwrap();
        w.tick(125.0, &mut cache);
        assert!(w.is_stretching());
        assert!((w.display_size().x - 90.0).abs() < 1e-3);
        w.tick(125.0, &mut cache);
        assert!(!w.is_stretching());
        assert_eq!((w.width, w.height), (120.0, 90.0));
        assert_eq!(w.regenerations(), 1);
        w.tick(16.0, &mut cache);
        assert_eq!(w.regenerations(), 2);
        assert_eq!(w.outline().map(|s| s.key.height()), Some(90.0));
    }

    #[test]
    fn resize_rejects_invalid_size() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        assert!(matches!(w.resize(-1.0, 10.0), Err(WidgetError::InvalidSize { .. })));
        w.resize(10.0, 10.0).unwrap();
        assert_eq!(w.width, 10.0);
    }

    #[test]
    fn destroy_cancels_stretch_and_drops_primitives() {
        let mut cache = PrimitiveCache::new();
        let mut w = widget(&mut cache);
        w.stretch(200.0, 60.0).unwrap();
        w.destroy();
        w.tick(500.0, &mut cache);
        assert_eq!(w.width, 60.0);
        assert!(w.outline().is_none());
        assert!(!w.activate(false));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(WidgetId::new(), WidgetId::new());
    }
}
