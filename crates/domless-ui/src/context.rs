use domless_engine::coords::Rect;
use domless_engine::input::InputState;
use domless_engine::scene::{Camera, DepthStack, PrimitiveCache};
use domless_engine::text::TextMeasure;

use crate::event::EventQueue;
use crate::widget::WidgetId;

/// Requests from text fields to whichever keyboard drawer the scene owns.
///
/// Rects are screen-space. Without a drawer the requests are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyboardRequest {
    /// Open and keep `target` visible above the drawer, pushing the camera
    /// by at most `max_push`.
    Open { target: Rect, max_push: f32 },
    /// Stay open, bring `target` into view, then focus field `to`.
    Refocus { to: WidgetId, target: Rect },
    Close,
}

/// Shared host resources handed to widgets for one tick or one event.
pub struct UiCtx<'a> {
    pub camera: &'a mut Camera,
    pub textures: &'a mut PrimitiveCache,
    pub depth: &'a mut DepthStack,
    pub text: &'a dyn TextMeasure,
    pub events: &'a mut EventQueue,
    pub input: &'a InputState,
    pub keyboard: &'a mut Vec<KeyboardRequest>,
    /// The keyboard drawer is sliding; taps on fields are ignored meanwhile.
    pub keyboard_busy: bool,
}
