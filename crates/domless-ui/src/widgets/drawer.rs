use std::fmt;
use std::str::FromStr;

use domless_engine::coords::{Rect, Vec2};
use domless_engine::paint::Color;
use domless_engine::scene::Camera;
use domless_engine::tween::Ease;

use crate::context::UiCtx;
use crate::error::{positive, WidgetError};
use crate::event::{EventResult, UiEvent, WidgetEvent};
use crate::painter::Painter;
use crate::transition::{Transition, TransitionState, Transitionable};
use crate::widget::{Component, Widget, WidgetConfig};

/// Screen edge a drawer slides in from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Edge {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl Edge {
    pub fn is_vertical(self) -> bool {
        matches!(self, Edge::Top | Edge::Bottom)
    }
}

impl FromStr for Edge {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Edge::Top),
            "bottom" => Ok(Edge::Bottom),
            "left" => Ok(Edge::Left),
            "right" => Ok(Edge::Right),
            _ => {
                log::warn!("unknown drawer edge {s:?}");
                Err(WidgetError::InvalidEdge(s.to_string()))
            }
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
            Edge::Right => "right",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawerConfig {
    pub edge: Edge,
    /// Extent along the slide axis.
    pub size: f32,
    pub duration_ms: f32,
    pub ease: Ease,
    pub background: Color,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self { edge: Edge::Bottom, size: 300.0, duration_ms: 500.0, ease: Ease::CubicInOut, background: Color::BLACK }
    }
}

impl DrawerConfig {
    pub fn edge(mut self, edge: Edge) -> Self {
        self.edge = edge;
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

type Hook = Box<dyn FnMut()>;

/// Panel that slides in from a screen edge, fixed to the viewport.
///
/// Input reaches the content only while open. Pointer events over the panel
/// never fall through to what lies beneath, whatever its state.
pub struct Drawer<C: Component> {
    base: Widget,
    edge: Edge,
    size: f32,
    background: Color,
    transition: Transition,
    content: C,
    on_opened: Option<Hook>,
    on_closed: Option<Hook>,
}

impl<C: Component> Drawer<C> {
    pub fn new(config: DrawerConfig, content: C, ctx: &mut UiCtx<'_>) -> Result<Self, WidgetError> {
        let size = positive("drawer size", config.size)?;
        let (x, y, width, height) = closed_geometry(config.edge, size, ctx.camera);
        let mut base = Widget::new(
            WidgetConfig::default().at(x, y).sized(width, height).outline(false),
            ctx.textures,
        )?;
        base.scroll_factor = 0.0;
        Ok(Self {
            base,
            edge: config.edge,
            size,
            background: config.background,
            transition: Transition::new(size, config.duration_ms, config.ease),
            content,
            on_opened: None,
            on_closed: None,
        })
    }

    pub fn on_opened(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_opened = Some(Box::new(f));
        self
    }

    pub fn on_closed(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_closed = Some(Box::new(f));
        self
    }

    #[inline]
    pub fn edge(&self) -> Edge {
        self.edge
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn content(&self) -> &C {
        &self.content
    }

    #[inline]
    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// Raises the drawer above everything painted so far and slides it in.
    /// Ignored unless closed.
    pub fn activate(&mut self, ctx: &mut UiCtx<'_>) -> bool {
        if !self.transition.activate() {
            return false;
        }
        self.base.depth = ctx.depth.bring_to_top();
        log::debug!("drawer {} opening from {}", self.base.id(), self.edge);
        true
    }

    /// Disables input and slides the drawer out. Ignored unless open.
    pub fn deactivate(&mut self) -> bool {
        if !self.transition.deactivate() {
            return false;
        }
        self.base.deactivate(false, true, false);
        log::debug!("drawer {} closing", self.base.id());
        true
    }

    /// Screen rect the drawer covers once open.
    pub fn open_rect(&self, camera: &Camera) -> Rect {
        let (x, y, w, h) = closed_geometry(self.edge, self.size, camera);
        let (dx, dy) = slide_direction(self.edge);
        Rect::new(x + dx * self.size, y + dy * self.size, w, h)
    }

    fn place(&mut self, camera: &Camera) {
        let (x, y, width, height) = closed_geometry(self.edge, self.size, camera);
        let (dx, dy) = slide_direction(self.edge);
        let offset = self.transition.offset();
        self.base.x = x + dx * offset;
        self.base.y = y + dy * offset;
        self.base.width = width;
        self.base.height = height;
    }
}

/// `(x, y, width, height)` of a closed drawer, just outside the viewport.
fn closed_geometry(edge: Edge, size: f32, camera: &Camera) -> (f32, f32, f32, f32) {
    match edge {
        Edge::Top => (0.0, -size, camera.width, size),
        Edge::Bottom => (0.0, camera.height, camera.width, size),
        Edge::Left => (-size, 0.0, size, camera.height),
        Edge::Right => (camera.width, 0.0, size, camera.height),
    }
}

/// Unit vector from the closed position toward the open one.
fn slide_direction(edge: Edge) -> (f32, f32) {
    match edge {
        Edge::Top => (0.0, 1.0),
        Edge::Bottom => (0.0, -1.0),
        Edge::Left => (1.0, 0.0),
        Edge::Right => (-1.0, 0.0),
    }
}

impl<C: Component> Transitionable for Drawer<C> {
    fn transition(&self) -> &Transition {
        &self.transition
    }
}

impl<C: Component> Component for Drawer<C> {
    fn base(&self) -> &Widget {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Widget {
        &mut self.base
    }

    fn tick(&mut self, dt: f32, ctx: &mut UiCtx<'_>) {
        self.base.tick(dt, ctx.textures);
        if let Some(settled) = self.transition.advance(dt) {
            match settled {
                TransitionState::Open => {
                    self.base.activate(false);
                    ctx.events.emit(WidgetEvent::DrawerOpened { drawer: self.base.id() });
                    if let Some(f) = &mut self.on_opened {
                        f();
                    }
                }
                _ => {
                    ctx.events.emit(WidgetEvent::DrawerClosed { drawer: self.base.id() });
                    if let Some(f) = &mut self.on_closed {
                        f();
                    }
                }
            }
        }
        self.place(ctx.camera);
        self.content.tick(dt, ctx);
    }

    fn on_event(&mut self, event: &UiEvent, origin: Vec2, ctx: &mut UiCtx<'_>) -> EventResult {
        if self.transition.is_closed() || self.base.is_destroyed() {
            return EventResult::Ignored;
        }
        let inner = self.base.child_origin(origin);
        let result = if self.base.is_active() {
            self.content.on_event(event, inner, ctx)
        } else {
            EventResult::Ignored
        };
        let over = match event {
            UiEvent::PointerDown { pos } | UiEvent::PointerUp { pos, .. } => self.base.rect(origin).contains(*pos),
            _ => false,
        };
        if over { EventResult::Consumed } else { result }
    }

    fn paint(&self, painter: &mut Painter<'_>, origin: Vec2) {
        if self.transition.is_closed() || self.base.is_destroyed() {
            return;
        }
        let prev = painter.raise_to(self.base.depth);
        painter.rect(self.base.rect(origin), 0.0, self.background);
        self.content.paint(painter, self.base.child_origin(origin));
        painter.set_layer(prev);
    }

    fn destroy(&mut self) {
        self.transition.cancel();
        self.on_opened = None;
        self.on_closed = None;
        self.content.destroy();
        self.base.destroy();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::scene::UiScene;
    use crate::widgets::button::{Button, ButtonConfig};

    fn content(scene: &mut UiScene) -> Widget {
        Widget::new(WidgetConfig::default(), &mut scene.textures).unwrap()
    }

    fn run<C: Component>(d: &mut Drawer<C>, scene: &mut UiScene, ms: f32) {
        let mut left = ms;
        while left > 0.0 {
            d.tick(16.0, &mut scene.ctx());
            left -= 16.0;
        }
    }

    #[test]
    fn edge_names_parse() {
        assert_eq!("Bottom".parse::<Edge>(), Ok(Edge::Bottom));
        assert_eq!("left".parse::<Edge>(), Ok(Edge::Left));
        assert_eq!("middle".parse::<Edge>(), Err(WidgetError::InvalidEdge("middle".into())));
    }

    #[test]
    fn non_positive_size_is_rejected() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let c = content(&mut scene);
        let result = Drawer::new(DrawerConfig::default().size(0.0), c, &mut scene.ctx());
        assert!(matches!(result, Err(WidgetError::InvalidSize { .. })));
    }

    #[test]
    fn double_activate_completes_once() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let opened = Rc::new(Cell::new(0));
        let seen = opened.clone();
        let c = content(&mut scene);
        let mut drawer = Drawer::new(DrawerConfig::default().size(300.0), c, &mut scene.ctx())
            .unwrap()
            .on_opened(move || seen.set(seen.get() + 1));

        assert!(drawer.activate(&mut scene.ctx()));
        drawer.tick(16.0, &mut scene.ctx());
        assert!(!drawer.activate(&mut scene.ctx()));
        run(&mut drawer, &mut scene, 1000.0);

        assert_eq!(opened.get(), 1);
        assert_eq!(drawer.state(), TransitionState::Open);
        assert_eq!(drawer.transition().slides_started(), 1);
        assert_eq!(scene.events.count("domlessDrawerOpened"), 1);
    }

    #[test]
    fn bottom_drawer_slides_into_view() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let c = content(&mut scene);
        let mut drawer = Drawer::new(DrawerConfig::default(), c, &mut scene.ctx()).unwrap();
        assert_eq!(drawer.base().y, 600.0);
        drawer.activate(&mut scene.ctx());
        run(&mut drawer, &mut scene, 600.0);
        assert_eq!(drawer.base().y, 300.0);
        assert_eq!(drawer.open_rect(&scene.camera), Rect::new(0.0, 300.0, 800.0, 300.0));
        assert!(drawer.base().is_active());

        drawer.deactivate();
        assert!(!drawer.base().is_active());
        run(&mut drawer, &mut scene, 600.0);
        assert!(drawer.is_closed());
        assert_eq!(drawer.base().y, 600.0);
        assert_eq!(scene.events.count("domlessDrawerClosed"), 1);
    }

    #[test]
    fn left_and_top_edges_slide_from_negative_offsets() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let c = content(&mut scene);
        let mut left = Drawer::new(DrawerConfig::default().edge(Edge::Left).size(200.0), c, &mut scene.ctx()).unwrap();
        assert_eq!((left.base().x, left.base().height), (-200.0, 600.0));
        left.activate(&mut scene.ctx());
        run(&mut left, &mut scene, 600.0);
        assert_eq!(left.base().x, 0.0);

        let c = content(&mut scene);
        let top = Drawer::new(DrawerConfig::default().edge(Edge::Top).size(100.0), c, &mut scene.ctx()).unwrap();
        assert_eq!(top.base().y, -100.0);
    }

    #[test]
    fn activation_raises_paint_order() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let c = content(&mut scene);
        let mut drawer = Drawer::new(DrawerConfig::default(), c, &mut scene.ctx()).unwrap();
        let before = scene.depth.top();
        drawer.activate(&mut scene.ctx());
        assert!(drawer.base().depth > before);
    }

    #[test]
    fn content_gets_input_only_when_open() {
        let mut scene = UiScene::headless(800.0, 600.0);
        let mut ok = Button::new(ButtonConfig::default().at(10.0, 10.0), &mut scene.ctx()).unwrap();
        ok.activate(false);
        let mut drawer = Drawer::new(DrawerConfig::default(), ok, &mut scene.ctx()).unwrap();
        drawer.activate(&mut scene.ctx());
        drawer.tick(100.0, &mut scene.ctx());

        let y = drawer.base().y;
        assert!(y < 600.0 && y > 300.0);
        let tap_inside = UiEvent::PointerDown { pos: Vec2::new(20.0, y + 5.0) };
        assert!(drawer.on_event(&tap_inside, Vec2::ZERO, &mut scene.ctx()).is_consumed());
        let tap_above = UiEvent::PointerDown { pos: Vec2::new(20.0, y - 5.0) };
        assert!(!drawer.on_event(&tap_above, Vec2::ZERO, &mut scene.ctx()).is_consumed());
        assert_eq!(drawer.content().presses(), 0);

        run(&mut drawer, &mut scene, 600.0);
        let tap = UiEvent::PointerDown { pos: Vec2::new(20.0, 320.0) };
        assert!(drawer.on_event(&tap, Vec2::ZERO, &mut scene.ctx()).is_consumed());
        assert_eq!(drawer.content().presses(), 1);
    }
}
