//! Input subsystem.
//!
//! Public API is platform-agnostic. Runtime code translates platform events
//! into `InputEvent`s and feeds them to `InputState::apply_event`.

mod frame;
mod state;
mod types;

pub use frame::InputFrame;
pub use state::{InputState, DRAG_THRESHOLD, WAS_DRAGGED_MS};
pub use types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerMoveEvent,
    TextEvent,
};
