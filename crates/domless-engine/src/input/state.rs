use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    PointerButtonEvent,
    PointerMoveEvent,
};

/// Pointer travel (logical px) after which a press becomes a drag.
pub const DRAG_THRESHOLD: f32 = 4.0;

/// How long `was_dragged` stays set after a drag ends, in milliseconds.
pub const WAS_DRAGGED_MS: f32 = 50.0;

/// Current input state for a single window.
///
/// Holds "is down" information, the pointer position and drag tracking.
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,

    /// Where the primary button went down, while it is held.
    pub press_origin: Option<(f32, f32)>,

    /// True while the primary button is held and the pointer has moved past
    /// [`DRAG_THRESHOLD`].
    pub is_dragging: bool,

    /// Remaining time (ms) during which a just-finished drag still counts.
    was_dragged_ms: f32,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys/buttons when focus changes mid-press.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                    self.press_origin = None;
                    self.is_dragging = false;
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                if let (Some((px, py)), Some((ox, oy))) = (self.pointer_pos, self.press_origin) {
                    if !self.is_dragging {
                        let travel = ((x - ox).powi(2) + (y - oy).powi(2)).sqrt();
                        self.is_dragging = travel > DRAG_THRESHOLD;
                    }
                    if self.is_dragging {
                        frame.drag_delta.0 += x - px;
                        frame.drag_delta.1 += y - py;
                    }
                }
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                x,
                y,
                modifiers,
            }) => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;

                match state {
                    MouseButtonState::Pressed => {
                        if self.buttons_down.insert(*button) {
                            frame.buttons_pressed.insert(*button);
                        }
                        if *button == MouseButton::Left {
                            self.press_origin = Some((*x, *y));
                            self.is_dragging = false;
                        }
                    }
                    MouseButtonState::Released => {
                        if self.buttons_down.remove(button) {
                            frame.buttons_released.insert(*button);
                        }
                        if *button == MouseButton::Left {
                            if self.is_dragging {
                                self.was_dragged_ms = WAS_DRAGGED_MS;
                            }
                            self.is_dragging = false;
                            self.press_origin = None;
                        }
                    }
                }
            }

            InputEvent::MouseWheel { modifiers, .. } => {
                self.modifiers = *modifiers;
            }

            InputEvent::Text(t) => frame.text.push(t.clone()),
        }

        frame.push_event(ev);
    }

    /// Ages time-based flags. Call once per frame with the frame delta.
    pub fn advance(&mut self, dt_ms: f32) {
        self.was_dragged_ms = (self.was_dragged_ms - dt_ms).max(0.0);
    }

    /// True during a drag and for a short window after it ends, so the
    /// release that finishes a drag is not treated as a click.
    pub fn was_dragged(&self) -> bool {
        self.is_dragging || self.was_dragged_ms > 0.0
    }

    /// Helper queries
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn shift_down(&self) -> bool {
        self.modifiers.shift || self.key_down(Key::Shift)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}
