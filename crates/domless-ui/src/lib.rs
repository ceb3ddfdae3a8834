//! Domless UI: retained, canvas-drawn widgets on top of `domless-engine`.
//!
//! Every widget is a [`Widget`](widget::Widget) base (position, size,
//! depth, generated outline/fill primitives) wrapped by a component that
//! adds behavior. Components are driven by the host through a
//! [`UiScene`](scene::UiScene):
//!
//! ```rust,ignore
//! use domless_ui::prelude::*;
//!
//! let mut scene = UiScene::headless(800.0, 600.0)
//!     .with_keyboard(KeyboardDrawerConfig::default())?;
//! let mut name = TextField::new(TextFieldConfig::default().at(50.0, 300.0), &mut scene.ctx())?;
//!
//! // Each frame:
//! for ev in platform_events {
//!     scene.dispatch(ev, &mut [&mut name]);
//! }
//! scene.tick(dt_ms, &mut [&mut name]);
//! let draw_list = scene.paint(&mut [&mut name]);
//! for event in scene.events.drain() {
//!     // domlessFormSubmit, domlessOptionSelected, ...
//! }
//! ```

pub mod context;
pub mod dirty;
pub mod error;
pub mod event;
pub mod focus;
pub mod painter;
pub mod scene;
pub mod scrollable;
pub mod text_flow;
pub mod transition;
pub mod widget;
pub mod widgets;

/// Everything needed to build screens and custom components.
pub mod prelude {
    pub use crate::context::{KeyboardRequest, UiCtx};
    pub use crate::dirty::{DirtyTracker, Regeneratable, WatchValue};
    pub use crate::error::WidgetError;
    pub use crate::event::{EventQueue, EventResult, UiEvent, WidgetEvent};
    pub use crate::focus::{FocusMove, Focusable};
    pub use crate::painter::Painter;
    pub use crate::scene::UiScene;
    pub use crate::scrollable::{Scrollable, ScrollableConfig};
    pub use crate::text_flow::{PageDirection, TextFlow};
    pub use crate::transition::{Transition, TransitionState, Transitionable};
    pub use crate::widget::{Component, Widget, WidgetConfig, WidgetId};
    pub use crate::widgets::{
        button::{Button, ButtonConfig},
        dialogue::{Dialogue, DialogueConfig},
        drawer::{Drawer, DrawerConfig, Edge},
        dropdown::{DropDownConfig, DropDownField},
        form::{Form, FormConfig, FormField, SubmitConfig},
        keyboard::{Keyboard, KeyboardConfig},
        keyboard_drawer::{KeyboardDrawer, KeyboardDrawerConfig},
        modal::{Modal, ModalConfig},
        multiselect::{MultiSelectConfig, MultiSelectField},
        text_display::{TextDisplay, TextDisplayConfig},
        text_field::{EditMode, TextField, TextFieldConfig},
    };

    // Engine primitives every screen touches.
    pub use domless_engine::coords::{Rect, Vec2};
    pub use domless_engine::input::{InputEvent, Key};
    pub use domless_engine::paint::Color;
    pub use domless_engine::text::{Padding, TextStyle};
    pub use domless_engine::time::FrameClock;
    pub use domless_engine::tween::Ease;
}
